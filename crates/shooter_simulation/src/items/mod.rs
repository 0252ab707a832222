//! Items: pickup/equip lifecycle (weapon + ammo).
//!
//! Architecture:
//! - `components` - Item (tagged variant), ItemState + collision/visibility bundle
//! - `interp` - полёт к персонажу по кривой
//! - `pulse` - glow pulse
//! - `weapon` / `ammo` - kind-специфичные payload'ы
//! - `systems` - tick таймеров, per-frame interp, публикация collision флагов

use std::sync::Arc;

use bevy::ecs::query::QueryFilter;
use bevy::prelude::*;

pub mod ammo;
pub mod components;
pub mod interp;
pub mod pulse;
pub mod systems;
pub mod weapon;


pub use ammo::{AmmoData, AmmoType};
pub use components::{
    yaw_degrees, ChannelResponses, CollisionMode, CollisionResponse, FinishedInterp, GlowMaterial,
    Item, ItemKind, ItemProperties, ItemRarity, ItemState, ItemTimer, MeshProperties,
    RarityPresentation, ShapeProperties,
};
pub use weapon::{SlideState, WeaponData, WeaponType};

use crate::config::{ItemTuning, RarityTable, WeaponTable};
use crate::ShooterSet;

/// Event: item долетел, персонаж должен его забрать (Item → Character)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemPickupFinished {
    pub item: Entity,
    pub character: Entity,
    pub slot_index: usize,
}

/// Мутабельный доступ к item'ам по Entity.
///
/// Логика персонажа работает через этот trait, а не напрямую через Query,
/// чтобы её можно было гонять в unit тестах без World.
pub trait ItemAccess {
    fn item_mut(&mut self, entity: Entity) -> Option<(&mut Item, &mut Transform)>;
}

impl<'a, 'b, F: QueryFilter> ItemAccess for Query<'_, '_, (&'a mut Item, &'b mut Transform), F> {
    fn item_mut(&mut self, entity: Entity) -> Option<(&mut Item, &mut Transform)> {
        let (item, transform) = self.get_mut(entity).ok()?;
        Some((item.into_inner(), transform.into_inner()))
    }
}

pub struct ItemPlugin;

impl Plugin for ItemPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ItemPickupFinished>();

        app.add_systems(
            FixedUpdate,
            systems::tick_item_timers.in_set(ShooterSet::Timers),
        )
        .add_systems(
            FixedUpdate,
            systems::update_items.in_set(ShooterSet::Frame),
        )
        .add_systems(
            FixedUpdate,
            systems::publish_item_properties.in_set(ShooterSet::Publish),
        );
    }
}

fn shared_tuning(world: &World) -> Arc<ItemTuning> {
    Arc::new(world.get_resource::<ItemTuning>().cloned().unwrap_or_default())
}

/// Spawn оружия из WeaponTable. None если типа нет в таблице.
pub fn spawn_weapon(
    world: &mut World,
    weapon_type: WeaponType,
    rarity: ItemRarity,
    transform: Transform,
) -> Option<Entity> {
    let item = build_weapon(world, weapon_type, rarity)?;
    Some(world.spawn((item, transform)).id())
}

pub(crate) fn build_weapon(world: &World, weapon_type: WeaponType, rarity: ItemRarity) -> Option<Item> {
    let weapons = world.get_resource::<WeaponTable>().cloned().unwrap_or_default();
    let rarities = world.get_resource::<RarityTable>().cloned().unwrap_or_default();

    let Some(row) = weapons.get(weapon_type) else {
        crate::logger::log_error(&format!("❌ Weapon {:?} not found in WeaponTable", weapon_type));
        return None;
    };

    Some(Item::new_weapon(row, rarity, shared_tuning(world), &rarities))
}

pub fn spawn_ammo(world: &mut World, ammo_type: AmmoType, count: u32, transform: Transform) -> Entity {
    let rarities = world.get_resource::<RarityTable>().cloned().unwrap_or_default();
    let item = Item::new_ammo(ammo_type, count, shared_tuning(world), &rarities);
    world.spawn((item, transform)).id()
}
