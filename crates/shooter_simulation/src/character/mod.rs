//! Character combat controller.
//!
//! Architecture:
//! - `components` - CombatController (state + timers), ItemTrace
//! - `inventory` - Inventory (6 слотов), AmmoMap, InterpSlots
//! - `camera` - CameraRig (zoom, look rates), Locomotion (crouch, jump)
//! - `crosshair` - аддитивная модель spread
//! - `controller` - CharacterCtx (view на компоненты) + aim / sound debounce / per-frame
//! - `firing` / `reload` / `equip` / `pickup` / `input` - операции над CharacterCtx
//! - `systems` - ECS обвязка

use bevy::prelude::*;

pub mod camera;
pub mod components;
pub mod controller;
pub mod crosshair;
pub mod equip;
pub mod firing;
pub mod input;
pub mod inventory;
pub mod pickup;
pub mod reload;
pub mod systems;


pub use camera::{CameraRig, Locomotion};
pub use components::{CharacterTimer, CombatController, CombatState, ItemTrace};
pub use controller::{CharacterBundle, CharacterCtx, CharacterQueryData};
pub use crosshair::{CrosshairSpread, SpreadInputs};
pub use firing::BeamResult;
pub use input::{InputAction, PlayerInput};
pub use inventory::{AmmoMap, InterpSlot, InterpSlots, Inventory, WEAPON_INTERP_SLOT};

use crate::config::CharacterConfig;
use crate::items::{build_weapon, ItemRarity, ItemState, WeaponType};
use crate::services::{PhysicsRequest, UiEvent};
use crate::ShooterSet;

pub struct CharacterPlugin;

impl Plugin for CharacterPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PlayerInput>();

        app.add_systems(
            FixedUpdate,
            (
                systems::handle_player_input,
                systems::handle_item_overlaps,
                systems::handle_character_notifies,
            )
                .chain()
                .in_set(ShooterSet::Input),
        )
        .add_systems(
            FixedUpdate,
            // Выстрел этого tick'а успевает запустить slide до tick'а item'ов
            systems::tick_character_timers
                .in_set(ShooterSet::Timers)
                .before(crate::items::systems::tick_item_timers),
        )
        .add_systems(
            FixedUpdate,
            systems::finish_item_pickups.in_set(ShooterSet::Pickup),
        )
        .add_systems(
            FixedUpdate,
            // Камера двигается раньше, чем item'ы пересчитают anchors
            systems::update_characters
                .in_set(ShooterSet::Frame)
                .before(crate::items::systems::update_items),
        );
    }
}

/// Spawn персонажа (+ default weapon в руках, slot 0)
pub fn spawn_character(
    world: &mut World,
    transform: Transform,
    default_weapon: Option<WeaponType>,
) -> Entity {
    let config = world.get_resource::<CharacterConfig>().cloned().unwrap_or_default();
    let character = world.spawn((CharacterBundle::new(&config), transform)).id();

    let Some(weapon_type) = default_weapon else {
        crate::logger::log(&format!("🧍 Character {:?} spawned unarmed", character));
        return character;
    };
    let Some(mut weapon) = build_weapon(world, weapon_type, ItemRarity::Common) else {
        return character;
    };

    weapon.disable_custom_depth();
    weapon.disable_glow_material();
    weapon.slot_index = 0;
    weapon.bind_character(character);
    weapon.set_state(ItemState::Equipped);
    let weapon_entity = world.spawn((weapon, transform)).id();

    if let Some(mut inventory) = world.get_mut::<Inventory>(character) {
        inventory.push(weapon_entity);
    }
    if let Some(mut controller) = world.get_mut::<CombatController>(character) {
        controller.equipped_weapon = Some(weapon_entity);
    }

    world.send_event(PhysicsRequest::AttachToSocket {
        item: weapon_entity,
        parent: character,
        socket: config.hand_socket.clone(),
    });
    world.send_event(UiEvent::EquipSlotChanged {
        character,
        old_slot: None,
        new_slot: 0,
    });

    crate::logger::log_info(&format!(
        "🧍 Character {:?} spawned with {:?} ({:?})",
        character, weapon_type, weapon_entity
    ));
    character
}
