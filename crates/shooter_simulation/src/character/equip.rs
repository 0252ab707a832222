//! Equip / drop / swap / inventory exchange.

use rand::Rng;

use super::components::CombatState;
use super::controller::CharacterCtx;
use crate::items::{ItemAccess, ItemState};
use crate::services::{Outbox, PhysicsRequest, UiEvent};

impl CharacterCtx<'_> {
    /// Attach к руке + Equipped.
    ///
    /// HUD получает EquipSlotChanged (old = None если руки были пусты),
    /// кроме swap'а - там слот не меняется.
    pub fn equip_weapon(
        &mut self,
        weapon_entity: bevy::prelude::Entity,
        swapping: bool,
        items: &mut impl ItemAccess,
        outbox: &mut Outbox,
    ) -> bool {
        let Some(new_slot) = items
            .item_mut(weapon_entity)
            .filter(|(item, _)| item.is_weapon())
            .map(|(item, _)| item.slot_index)
        else {
            crate::logger::log_warning(&format!(
                "⚠️ {:?} tried to equip non-weapon {:?}",
                self.entity, weapon_entity
            ));
            return false;
        };

        outbox.physics.push(PhysicsRequest::AttachToSocket {
            item: weapon_entity,
            parent: self.entity,
            socket: self.config.hand_socket.clone(),
        });

        if !swapping {
            let old_slot = self
                .controller
                .equipped_weapon
                .and_then(|old| items.item_mut(old))
                .map(|(item, _)| item.slot_index);
            outbox.ui.push(UiEvent::EquipSlotChanged {
                character: self.entity,
                old_slot,
                new_slot,
            });
        }

        self.controller.equipped_weapon = Some(weapon_entity);
        if let Some((item, _)) = items.item_mut(weapon_entity) {
            item.set_state(ItemState::Equipped);
        }
        true
    }

    /// Detach + бросок с физикой. Руки пустеют.
    pub fn drop_weapon(
        &mut self,
        items: &mut impl ItemAccess,
        outbox: &mut Outbox,
        rng: &mut impl Rng,
    ) -> Option<bevy::prelude::Entity> {
        let weapon_entity = self.controller.equipped_weapon?;
        let (item, transform) = items.item_mut(weapon_entity)?;

        outbox.physics.push(PhysicsRequest::Detach {
            item: weapon_entity,
        });
        if let Some(impulse) = item.throw_weapon(transform, rng) {
            outbox.physics.push(PhysicsRequest::Impulse {
                entity: weapon_entity,
                impulse,
            });
        }

        self.controller.equipped_weapon = None;
        crate::logger::log(&format!("🔫 {:?} dropped {:?}", self.entity, weapon_entity));
        Some(weapon_entity)
    }

    /// Новое оружие занимает слот экипированного, старое выбрасывается
    pub fn swap_weapon(
        &mut self,
        new_weapon: bevy::prelude::Entity,
        items: &mut impl ItemAccess,
        outbox: &mut Outbox,
        rng: &mut impl Rng,
    ) -> bool {
        let Some(old_slot) = self
            .controller
            .equipped_weapon
            .and_then(|old| items.item_mut(old))
            .map(|(item, _)| item.slot_index)
        else {
            crate::logger::log_warning(&format!(
                "⚠️ {:?} has nothing equipped to swap for {:?}, returning it to the world",
                self.entity, new_weapon
            ));
            if let Some((item, _)) = items.item_mut(new_weapon) {
                item.set_state(ItemState::Pickup);
                item.start_pulse_timer();
            }
            return false;
        };

        if old_slot < self.inventory.len() {
            self.inventory.replace(old_slot, new_weapon);
            if let Some((item, _)) = items.item_mut(new_weapon) {
                item.slot_index = old_slot;
            }
        }

        self.drop_weapon(items, outbox, rng);
        self.equip_weapon(new_weapon, true, items, outbox);

        self.trace.trace_hit_item = None;
        self.trace.trace_hit_item_last_frame = None;

        crate::logger::log_info(&format!(
            "🔁 {:?} swapped slot {} to {:?}",
            self.entity, old_slot, new_weapon
        ));
        true
    }

    /// Смена оружия из inventory. Разрешено в Unoccupied и Equipping.
    pub fn exchange_inventory_items(
        &mut self,
        current_index: usize,
        new_index: usize,
        items: &mut impl ItemAccess,
        outbox: &mut Outbox,
    ) -> bool {
        let can_exchange = current_index != new_index
            && new_index < self.inventory.len()
            && matches!(
                self.controller.state,
                CombatState::Unoccupied | CombatState::Equipping
            );
        if !can_exchange {
            return false;
        }
        let Some(new_weapon) = self.inventory.get(new_index) else {
            return false;
        };

        if self.controller.aiming {
            self.stop_aiming();
        }

        let old_weapon = self.controller.equipped_weapon;
        if !self.equip_weapon(new_weapon, false, items, outbox) {
            return false;
        }

        if let Some((old, _)) = old_weapon
            .filter(|old| *old != new_weapon)
            .and_then(|old| items.item_mut(old))
        {
            old.set_state(ItemState::PickedUp);
        }

        self.controller.state = CombatState::Equipping;
        outbox.play_montage(
            self.entity,
            self.config.equip_montage.clone(),
            self.config.equip_section.clone(),
            1.0,
        );

        let equip_cue = items
            .item_mut(new_weapon)
            .map(|(item, _)| item.equip_sound.clone())
            .unwrap_or_default();
        self.play_equip_sound(&equip_cue, true, outbox);

        crate::logger::log(&format!(
            "🔫 {:?} equipping slot {} (from {})",
            self.entity, new_index, current_index
        ));
        true
    }

    /// Hotkey: F → 0, 1..5 → 1..5
    pub fn select_slot(&mut self, slot: usize, items: &mut impl ItemAccess, outbox: &mut Outbox) -> bool {
        let Some(current) = self
            .controller
            .equipped_weapon
            .and_then(|entity| items.item_mut(entity))
            .map(|(item, _)| item.slot_index)
        else {
            return false;
        };
        if current == slot {
            return false;
        }
        self.exchange_inventory_items(current, slot, items, outbox)
    }

    /// Animation notify: equip montage закончился
    pub fn finish_equipping(&mut self) -> bool {
        if self.controller.state != CombatState::Equipping {
            return false;
        }
        self.controller.state = CombatState::Unoccupied;
        if self.controller.aiming_button_pressed {
            self.aim();
        }
        true
    }
}
