//! Item pickup: trace → select → interp полёт → finalize.
//!
//! Flow:
//! 1. `trace_for_items` каждый tick (пока пересекаем pickup сферы) находит item под прицелом
//! 2. `select_button_pressed` / ammo auto-pickup → `begin_item_pickup` (резерв interp slot'а)
//! 3. Item долетает (`ItemPickupFinished`) → `finish_item_pickup`: слот освобождается,
//!    оружие в inventory (или swap), патроны в AmmoMap

use bevy::prelude::*;
use rand::Rng;

use super::controller::CharacterCtx;
use super::inventory::WEAPON_INTERP_SLOT;
use crate::items::{AmmoType, ItemAccess, ItemState};
use crate::services::{LineTracer, Outbox, UiEvent};

impl CharacterCtx<'_> {
    // ========================================================================
    // Tracing
    // ========================================================================

    /// Item под прицелом. Летящие к персонажу item'ы не считаются.
    pub fn trace_for_items(
        &mut self,
        items: &mut impl ItemAccess,
        tracer: &dyn LineTracer,
        outbox: &mut Outbox,
    ) {
        if !self.trace.should_trace {
            if let Some(last) = self.trace.trace_hit_item_last_frame.take() {
                self.hide_pickup_affordance(last, items, outbox);
            }
            self.trace.trace_hit_item = None;
            self.unhighlight_inventory_slot(outbox);
            return;
        }

        let (hit, _) = self.trace_under_crosshairs(tracer);
        let sighted = hit.and_then(|hit| hit.entity).filter(|entity| {
            items.item_mut(*entity).is_some_and(|(item, _)| {
                !item.is_interping() && matches!(item.state(), ItemState::Pickup | ItemState::Falling)
            })
        });
        self.trace.trace_hit_item = sighted;

        let sighted_weapon = match sighted {
            Some(entity) => {
                let inventory_full = self.inventory.is_full();
                let is_weapon = items
                    .item_mut(entity)
                    .map(|(item, _)| {
                        item.character_inventory_full = inventory_full;
                        item.is_weapon()
                    })
                    .unwrap_or(false);
                self.show_pickup_affordance(entity, items, outbox);
                is_weapon
            }
            None => false,
        };

        if sighted_weapon {
            if self.trace.highlighted_slot.is_none() {
                self.highlight_inventory_slot(outbox);
            }
        } else {
            self.unhighlight_inventory_slot(outbox);
        }

        if let Some(last) = self.trace.trace_hit_item_last_frame {
            if Some(last) != sighted {
                self.hide_pickup_affordance(last, items, outbox);
            }
        }
        self.trace.trace_hit_item_last_frame = sighted;
    }

    /// Pickup widget + outline. UI event только при смене флага.
    fn show_pickup_affordance(&mut self, entity: Entity, items: &mut impl ItemAccess, outbox: &mut Outbox) {
        let Some((item, _)) = items.item_mut(entity) else {
            return;
        };
        let was_visible = item.pickup_widget_visible();
        item.set_pickup_widget_visible(true);
        item.enable_custom_depth();
        if !was_visible && item.pickup_widget_visible() {
            outbox.ui.push(UiEvent::PickupWidget {
                item: entity,
                visible: true,
            });
        }
    }

    pub fn hide_pickup_affordance(&mut self, entity: Entity, items: &mut impl ItemAccess, outbox: &mut Outbox) {
        let Some((item, _)) = items.item_mut(entity) else {
            return;
        };
        let was_visible = item.pickup_widget_visible();
        item.set_pickup_widget_visible(false);
        item.disable_custom_depth();
        if was_visible {
            outbox.ui.push(UiEvent::PickupWidget {
                item: entity,
                visible: false,
            });
        }
    }

    /// HUD: подсветка слота, куда ляжет оружие под прицелом
    pub fn highlight_inventory_slot(&mut self, outbox: &mut Outbox) {
        let Some(slot) = self.inventory.empty_slot() else {
            return;
        };
        self.trace.highlighted_slot = Some(slot);
        outbox.ui.push(UiEvent::HighlightSlot {
            character: self.entity,
            slot,
            start: true,
        });
    }

    pub fn unhighlight_inventory_slot(&mut self, outbox: &mut Outbox) {
        let Some(slot) = self.trace.highlighted_slot.take() else {
            return;
        };
        outbox.ui.push(UiEvent::HighlightSlot {
            character: self.entity,
            slot,
            start: false,
        });
    }

    // ========================================================================
    // Pickup start
    // ========================================================================

    /// Старт полёта item'а к персонажу. Оружие летит к weapon anchor'у,
    /// остальное к наименее загруженному generic anchor'у.
    pub fn begin_item_pickup(
        &mut self,
        item_entity: Entity,
        force_sound: bool,
        items: &mut impl ItemAccess,
        outbox: &mut Outbox,
    ) -> bool {
        let pickable = items
            .item_mut(item_entity)
            .is_some_and(|(item, _)| matches!(item.state(), ItemState::Pickup | ItemState::Falling));
        if !pickable {
            return false;
        }

        self.hide_pickup_affordance(item_entity, items, outbox);
        if self.trace.trace_hit_item == Some(item_entity) {
            self.trace.trace_hit_item = None;
        }
        if self.trace.trace_hit_item_last_frame == Some(item_entity) {
            self.trace.trace_hit_item_last_frame = None;
        }

        let camera_yaw = self.camera.yaw_degrees();
        let Some((item, transform)) = items.item_mut(item_entity) else {
            return false;
        };

        let slot = if item.is_weapon() {
            WEAPON_INTERP_SLOT
        } else {
            self.slots.interp_location_index()
        };
        if !self.slots.reserve(slot) {
            crate::logger::log_warning(&format!(
                "⚠️ {:?} has no interp slot {} for '{}'",
                self.entity, slot, item.name
            ));
            return false;
        }

        item.start_item_curve(transform, self.entity, slot, camera_yaw);
        let pickup_cue = item.pickup_sound.clone();
        crate::logger::log(&format!(
            "🧲 {:?} picking up '{}' → slot {}",
            self.entity, item.name, slot
        ));

        self.play_pickup_sound(&pickup_cue, force_sound, outbox);
        true
    }

    /// Select (E): подобрать item под прицелом
    pub fn select_button_pressed(&mut self, items: &mut impl ItemAccess, outbox: &mut Outbox) -> bool {
        if !self.controller.is_unoccupied() {
            return false;
        }
        let Some(item_entity) = self.trace.trace_hit_item.take() else {
            return false;
        };
        self.begin_item_pickup(item_entity, true, items, outbox)
    }

    /// Касание ammo collision сферы: auto-pickup (звук без force).
    /// Сфера выключается сразу, повторный overlap игнорируется.
    pub fn auto_pickup_ammo(&mut self, item_entity: Entity, items: &mut impl ItemAccess, outbox: &mut Outbox) -> bool {
        let Some(ammo) = items
            .item_mut(item_entity)
            .and_then(|(item, _)| item.ammo_data_mut())
        else {
            return false;
        };
        if !ammo.collision_sphere_enabled {
            return false;
        }
        ammo.collision_sphere_enabled = false;

        self.begin_item_pickup(item_entity, false, items, outbox)
    }

    // ========================================================================
    // Pickup finalize
    // ========================================================================

    /// Item долетел: освобождаем слот, кладём в inventory / AmmoMap
    pub fn finish_item_pickup(
        &mut self,
        item_entity: Entity,
        slot_index: usize,
        items: &mut impl ItemAccess,
        outbox: &mut Outbox,
        rng: &mut impl Rng,
    ) -> bool {
        self.slots.release(slot_index);
        self.unhighlight_inventory_slot(outbox);

        let Some((item, _)) = items.item_mut(item_entity) else {
            crate::logger::log_warning(&format!(
                "⚠️ {:?} finished pickup of missing item {:?}",
                self.entity, item_entity
            ));
            return false;
        };
        let equip_cue = item.equip_sound.clone();
        let ammo = item.ammo_data().map(|ammo| (ammo.ammo_type, item.count));
        let is_weapon = item.is_weapon();

        self.play_equip_sound(&equip_cue, false, outbox);

        if let Some((ammo_type, count)) = ammo {
            self.pickup_ammo(item_entity, ammo_type, count, items, outbox);
            return true;
        }
        if is_weapon {
            return self.store_weapon(item_entity, items, outbox, rng);
        }
        false
    }

    /// Свободный слот → PickedUp (или в руки, если руки пусты); полный inventory → swap
    fn store_weapon(
        &mut self,
        weapon_entity: Entity,
        items: &mut impl ItemAccess,
        outbox: &mut Outbox,
        rng: &mut impl Rng,
    ) -> bool {
        let Some(slot) = self.inventory.push(weapon_entity) else {
            return self.swap_weapon(weapon_entity, items, outbox, rng);
        };

        if let Some((item, _)) = items.item_mut(weapon_entity) {
            item.slot_index = slot;
        }

        if self.controller.equipped_weapon.is_none() {
            self.equip_weapon(weapon_entity, false, items, outbox);
        } else if let Some((item, _)) = items.item_mut(weapon_entity) {
            item.set_state(ItemState::PickedUp);
        }

        crate::logger::log_info(&format!(
            "🎒 {:?} stored {:?} in slot {} ({}/{})",
            self.entity,
            weapon_entity,
            slot,
            self.inventory.len(),
            self.inventory.capacity()
        ));
        true
    }

    /// Патроны в reserve; пустое оружие того же типа сразу перезаряжается
    fn pickup_ammo(
        &mut self,
        ammo_entity: Entity,
        ammo_type: AmmoType,
        count: u32,
        items: &mut impl ItemAccess,
        outbox: &mut Outbox,
    ) {
        self.ammo.add(ammo_type, count);

        let needs_reload = self
            .controller
            .equipped_weapon
            .and_then(|entity| items.item_mut(entity))
            .and_then(|(item, _)| item.weapon().map(|weapon| weapon.ammo_type == ammo_type && weapon.ammo() == 0))
            .unwrap_or(false);
        if needs_reload {
            self.reload_weapon(items, outbox);
        }

        outbox.despawns.push(ammo_entity);
        crate::logger::log_info(&format!(
            "🎯 {:?} picked up {} {} (reserve {})",
            self.entity,
            count,
            ammo_type.display_name(),
            self.ammo.get(ammo_type)
        ));
    }
}
