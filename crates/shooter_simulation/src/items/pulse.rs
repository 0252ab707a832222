//! Glow pulse (чисто косметика): материал "дышит" пока item лежит в мире.

use bevy::prelude::*;

use crate::curves::SampledCurve;
use crate::items::components::{Item, ItemState, ItemTimer};

impl Item {
    /// Перезапуск цикла pulse. Работает только в Pickup.
    pub fn start_pulse_timer(&mut self) {
        if self.state() != ItemState::Pickup {
            return;
        }
        self.timers.clear(&mut self.pulse_handle);
        self.pulse_handle = Some(
            self.timers
                .schedule(self.tuning.pulse_curve_time, ItemTimer::PulseReset),
        );
    }

    pub fn pulse_active(&self) -> bool {
        self.pulse_handle
            .is_some_and(|handle| self.timers.is_active(handle))
    }

    /// Сэмплирует pulse кривую в параметры материала
    pub fn update_pulse(&mut self) {
        let curves = &self.tuning.curves;
        let value = match self.state() {
            ItemState::Pickup => self
                .pulse_handle
                .and_then(|handle| self.timers.elapsed(handle))
                .map(|elapsed| curves.pulse.sample(elapsed)),
            ItemState::EquipInterping => self
                .interp
                .handle
                .and_then(|handle| self.timers.elapsed(handle))
                .map(|elapsed| curves.interp_pulse.sample(elapsed)),
            _ => None,
        }
        .unwrap_or(Vec3::ZERO);

        self.glow.glow_amount = value.x * self.tuning.glow_amount;
        self.glow.fresnel_exponent = value.y * self.tuning.fresnel_exponent;
        self.glow.fresnel_reflect_fraction = value.z * self.tuning.fresnel_reflect_fraction;
    }
}
