//! Pickup interpolation: item летит по кривой к anchor'у персонажа.
//!
//! Слот и звук - ответственность персонажа (он владеет InterpSlots и debounce),
//! здесь только движение item'а и его таймер.

use bevy::prelude::*;

use crate::curves::{finterp_to, SampledCurve};
use crate::items::components::{yaw_degrees, FinishedInterp, Item, ItemState, ItemTimer};

impl Item {
    /// Старт pickup полёта. `slot_index` уже зарезервирован персонажем.
    pub fn start_item_curve(
        &mut self,
        transform: &Transform,
        character: Entity,
        slot_index: usize,
        camera_yaw: f32,
    ) {
        self.interp.character = Some(character);
        self.interp.slot_index = slot_index;
        self.interp.start_location = transform.translation;
        self.set_state(ItemState::EquipInterping);
        self.interp.interping = true;

        self.timers.clear(&mut self.pulse_handle);
        self.clear_throw_timer();
        // Повторный старт не должен дать второй FinishInterping
        self.timers.clear(&mut self.interp.handle);
        self.interp.handle = Some(
            self.timers
                .schedule(self.tuning.z_curve_time, ItemTimer::InterpFinished),
        );

        self.interp.yaw_offset = yaw_degrees(transform.rotation) - camera_yaw;
        self.set_can_change_custom_depth(false);
    }

    /// Владелец без полёта (default weapon при spawn персонажа)
    pub(crate) fn bind_character(&mut self, character: Entity) {
        self.interp.character = Some(character);
    }

    /// Per-tick движение к `target` (world позиция anchor'а, пересчитывается каждый кадр)
    pub fn item_interp(&mut self, transform: &mut Transform, delta: f32, target: Vec3, camera_yaw: f32) {
        if !self.interp.interping {
            return;
        }
        let Some(elapsed) = self.interp.handle.and_then(|handle| self.timers.elapsed(handle)) else {
            return;
        };

        let start = self.interp.start_location;
        let curve_value = self.tuning.curves.item_z.sample(elapsed);
        let delta_z = target.z - start.z;

        let current = transform.translation;
        let speed = self.tuning.interp_speed;
        // Teleport: пишем transform напрямую, physics не участвует
        transform.translation = Vec3::new(
            finterp_to(current.x, target.x, delta, speed),
            finterp_to(current.y, target.y, delta, speed),
            start.z + curve_value * delta_z,
        );
        transform.rotation = Quat::from_rotation_z((camera_yaw + self.interp.yaw_offset).to_radians());

        if let Some(scale_curve) = &self.tuning.curves.item_scale {
            transform.scale = Vec3::splat(scale_curve.sample(elapsed));
        }
    }

    /// Timer callback. Возвращает (character, slot) для финализации на стороне персонажа.
    pub(crate) fn finish_interping(&mut self, transform: &mut Transform) -> Option<FinishedInterp> {
        self.interp.interping = false;
        transform.scale = Vec3::ONE;
        self.disable_glow_material();
        self.set_can_change_custom_depth(true);
        self.disable_custom_depth();

        let Some(character) = self.interp.character else {
            crate::logger::log_warning(&format!(
                "⚠️ '{}' finished interp without a character",
                self.name
            ));
            return None;
        };

        Some(FinishedInterp {
            character,
            slot_index: self.interp.slot_index,
        })
    }
}
