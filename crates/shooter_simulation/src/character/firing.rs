//! Fire cycle: Unoccupied → FireTimerInProgress → Unoccupied.
//!
//! Hit resolution - два луча:
//! 1. От камеры вдоль взгляда (что под прицелом)
//! 2. От muzzle к точке первого луча × overshoot (геометрия у ствола перекрывает прицел)
//!
//! Авторитетна только точка второго луча → `BulletImpact`.

use bevy::prelude::*;

use super::components::{CharacterTimer, CombatState};
use super::controller::CharacterCtx;
use crate::items::ItemAccess;
use crate::services::{BulletImpact, LineTracer, Outbox, TraceChannel, TraceHit};

/// Результат двух лучей
#[derive(Debug, Clone, PartialEq)]
pub struct BeamResult {
    /// Конец beam эффекта (точка hit'а или конец луча)
    pub end: Vec3,
    /// Блокирующий hit второго луча
    pub hit: Option<TraceHit>,
}

impl CharacterCtx<'_> {
    pub fn weapon_has_ammo(&self, items: &mut impl ItemAccess) -> bool {
        self.controller
            .equipped_weapon
            .and_then(|entity| items.item_mut(entity))
            .and_then(|(item, _)| item.weapon().map(|weapon| weapon.ammo() > 0))
            .unwrap_or(false)
    }

    /// Выстрел. false = guarded no-op (не Unoccupied, нет оружия, пустой магазин).
    pub fn fire_weapon(
        &mut self,
        items: &mut impl ItemAccess,
        tracer: &dyn LineTracer,
        outbox: &mut Outbox,
    ) -> bool {
        if self.controller.state != CombatState::Unoccupied {
            return false;
        }
        let Some(weapon_entity) = self.controller.equipped_weapon else {
            return false;
        };
        let Some((item, transform)) = items.item_mut(weapon_entity) else {
            crate::logger::log_warning(&format!(
                "⚠️ Equipped weapon {:?} has no Item component",
                weapon_entity
            ));
            return false;
        };
        let Some(weapon) = item.weapon_mut() else {
            return false;
        };
        if weapon.ammo() == 0 {
            return false;
        }

        outbox.play_sound(self.entity, weapon.fire_sound.clone(), None);

        let muzzle = transform.transform_point(weapon.muzzle_offset);
        let damage = weapon.damage;
        let headshot_damage = weapon.headshot_damage;
        self.send_bullet(muzzle, damage, headshot_damage, tracer, outbox);

        outbox.play_montage(
            self.entity,
            self.config.hip_fire_montage.clone(),
            self.config.hip_fire_section.clone(),
            1.0,
        );

        weapon.decrement_ammo();
        let fire_rate = weapon.auto_fire_rate;
        let is_pistol = weapon.is_pistol();

        self.start_fire_timer(fire_rate);

        if is_pistol {
            item.start_slide_timer();
        }

        self.start_crosshair_bullet_fire();
        true
    }

    fn send_bullet(
        &mut self,
        muzzle: Vec3,
        damage: f32,
        headshot_damage: f32,
        tracer: &dyn LineTracer,
        outbox: &mut Outbox,
    ) {
        outbox.spawn_effect(self.config.muzzle_flash_effect.clone(), muzzle, None);

        let beam = self.beam_end_location(muzzle, tracer);
        let Some(hit) = beam.hit else {
            return;
        };

        outbox.spawn_effect(self.config.impact_effect.clone(), beam.end, None);
        outbox.spawn_effect(self.config.beam_effect.clone(), muzzle, Some(beam.end));
        outbox.impacts.push(BulletImpact {
            shooter: self.entity,
            target: hit.entity,
            location: hit.location,
            bone: hit.bone,
            damage,
            headshot_damage,
        });
    }

    /// Луч из центра экрана вдоль камеры. Без hit'а - конец луча.
    pub fn trace_under_crosshairs(&self, tracer: &dyn LineTracer) -> (Option<TraceHit>, Vec3) {
        let start = self.camera.position;
        let end = start + self.camera.forward() * self.config.trace_range;

        match tracer.line_trace(start, end, TraceChannel::Visibility) {
            Some(hit) => {
                let location = hit.location;
                (Some(hit), location)
            }
            None => (None, end),
        }
    }

    /// Два луча: crosshair → muzzle с overshoot
    pub fn beam_end_location(&self, muzzle: Vec3, tracer: &dyn LineTracer) -> BeamResult {
        let (_, crosshair_end) = self.trace_under_crosshairs(tracer);

        let start_to_end = crosshair_end - muzzle;
        let weapon_trace_end = muzzle + start_to_end * self.config.beam_overshoot;

        match tracer.line_trace(muzzle, weapon_trace_end, TraceChannel::Visibility) {
            Some(hit) => BeamResult {
                end: hit.location,
                hit: Some(hit),
            },
            None => BeamResult {
                end: crosshair_end,
                hit: None,
            },
        }
    }

    fn start_fire_timer(&mut self, fire_rate: f32) {
        let controller = &mut *self.controller;
        controller.state = CombatState::FireTimerInProgress;
        controller.timers.clear(&mut controller.auto_fire_handle);
        controller.auto_fire_handle = Some(
            controller
                .timers
                .schedule(fire_rate, CharacterTimer::AutoFireReset),
        );
    }

    /// Окно shooting factor'а crosshair spread
    fn start_crosshair_bullet_fire(&mut self) {
        let controller = &mut *self.controller;
        controller.firing_bullet = true;
        controller.timers.clear(&mut controller.crosshair_handle);
        controller.crosshair_handle = Some(controller.timers.schedule(
            self.config.shoot_time_duration,
            CharacterTimer::CrosshairBulletFinished,
        ));
    }

    /// Fire timer истёк: всегда Unoccupied, затем auto re-fire или auto reload
    pub(crate) fn auto_fire_reset(
        &mut self,
        items: &mut impl ItemAccess,
        tracer: &dyn LineTracer,
        outbox: &mut Outbox,
    ) {
        self.controller.state = CombatState::Unoccupied;

        let Some(automatic) = self
            .controller
            .equipped_weapon
            .and_then(|entity| items.item_mut(entity))
            .and_then(|(item, _)| item.weapon().map(|weapon| weapon.automatic))
        else {
            return;
        };

        if self.weapon_has_ammo(items) {
            if self.controller.fire_button_pressed && automatic {
                self.fire_weapon(items, tracer, outbox);
            }
        } else {
            self.reload_weapon(items, outbox);
        }
    }

    pub fn fire_button_pressed(
        &mut self,
        items: &mut impl ItemAccess,
        tracer: &dyn LineTracer,
        outbox: &mut Outbox,
    ) -> bool {
        self.controller.fire_button_pressed = true;
        self.fire_weapon(items, tracer, outbox)
    }

    pub fn fire_button_released(&mut self) {
        self.controller.fire_button_pressed = false;
    }
}
