//! CharacterCtx: mutable view на все компоненты одного персонажа.
//!
//! Вся логика персонажа - методы `CharacterCtx` (fire/reload/equip/pickup
//! в соседних файлах). Системы собирают ctx из Query row, unit тесты - из
//! `CharacterBundle`, поэтому логика не зависит от World.

use bevy::ecs::query::QueryItem;
use bevy::prelude::*;

use super::camera::{CameraRig, Locomotion};
use super::components::{CharacterTimer, CombatController, CombatState, ItemTrace};
use super::crosshair::{CrosshairSpread, SpreadInputs};
use super::inventory::{AmmoMap, Inventory, InterpSlots};
use crate::config::CharacterConfig;
use crate::items::ItemAccess;
use crate::services::{LineTracer, Outbox};

/// Query data персонажа (Transform только читаем - им владеет physics хоста)
pub type CharacterQueryData = (
    Entity,
    &'static mut CombatController,
    &'static mut Inventory,
    &'static mut AmmoMap,
    &'static mut InterpSlots,
    &'static mut ItemTrace,
    &'static mut CameraRig,
    &'static mut Locomotion,
    &'static mut CrosshairSpread,
    &'static Transform,
);

/// Все компоненты персонажа (spawn + unit тесты)
#[derive(Bundle, Debug, Clone)]
pub struct CharacterBundle {
    pub controller: CombatController,
    pub inventory: Inventory,
    pub ammo: AmmoMap,
    pub slots: InterpSlots,
    pub trace: ItemTrace,
    pub camera: CameraRig,
    pub locomotion: Locomotion,
    pub crosshair: CrosshairSpread,
}

impl CharacterBundle {
    pub fn new(config: &CharacterConfig) -> Self {
        Self {
            controller: CombatController::default(),
            inventory: Inventory::new(config.inventory_capacity),
            ammo: AmmoMap::with_starting(config.starting_9mm_ammo, config.starting_ar_ammo),
            slots: InterpSlots::default(),
            trace: ItemTrace::default(),
            camera: CameraRig::new(config.camera_default_fov),
            locomotion: Locomotion::new(config),
            crosshair: CrosshairSpread::default(),
        }
    }

    pub fn as_ctx<'a>(
        &'a mut self,
        entity: Entity,
        location: Vec3,
        config: &'a CharacterConfig,
    ) -> CharacterCtx<'a> {
        CharacterCtx {
            entity,
            location,
            config,
            controller: &mut self.controller,
            inventory: &mut self.inventory,
            ammo: &mut self.ammo,
            slots: &mut self.slots,
            trace: &mut self.trace,
            camera: &mut self.camera,
            locomotion: &mut self.locomotion,
            crosshair: &mut self.crosshair,
        }
    }
}

pub struct CharacterCtx<'a> {
    pub entity: Entity,
    pub location: Vec3,
    pub config: &'a CharacterConfig,
    pub controller: &'a mut CombatController,
    pub inventory: &'a mut Inventory,
    pub ammo: &'a mut AmmoMap,
    pub slots: &'a mut InterpSlots,
    pub trace: &'a mut ItemTrace,
    pub camera: &'a mut CameraRig,
    pub locomotion: &'a mut Locomotion,
    pub crosshair: &'a mut CrosshairSpread,
}

impl<'a> CharacterCtx<'a> {
    pub fn from_row(row: QueryItem<'a, CharacterQueryData>, config: &'a CharacterConfig) -> Self {
        let (entity, controller, inventory, ammo, slots, trace, camera, locomotion, crosshair, transform) =
            row;
        Self {
            entity,
            location: transform.translation,
            config,
            controller: controller.into_inner(),
            inventory: inventory.into_inner(),
            ammo: ammo.into_inner(),
            slots: slots.into_inner(),
            trace: trace.into_inner(),
            camera: camera.into_inner(),
            locomotion: locomotion.into_inner(),
            crosshair: crosshair.into_inner(),
        }
    }

    // ========================================================================
    // Aiming
    // ========================================================================

    pub fn aim(&mut self) {
        self.controller.aiming = true;
        self.locomotion.max_walk_speed = self.config.crouch_movement_speed;
    }

    pub fn stop_aiming(&mut self) {
        self.controller.aiming = false;
        if !self.locomotion.crouching {
            self.locomotion.max_walk_speed = self.config.base_movement_speed;
        }
    }

    /// Во время reload/equip кнопка запоминается, aim включится по завершении
    pub fn aiming_button_pressed(&mut self) {
        self.controller.aiming_button_pressed = true;
        if !matches!(
            self.controller.state,
            CombatState::Reloading | CombatState::Equipping
        ) {
            self.aim();
        }
    }

    pub fn aiming_button_released(&mut self) {
        self.controller.aiming_button_pressed = false;
        self.stop_aiming();
    }

    // ========================================================================
    // Sound debounce
    // ========================================================================

    /// Первый звук в окне проигрывается, остальные глушатся (кроме forced)
    pub fn play_pickup_sound(&mut self, cue: &str, force: bool, outbox: &mut Outbox) {
        if force {
            outbox.play_sound(self.entity, cue, None);
        } else if self.controller.should_play_pickup_sound {
            self.start_pickup_sound_timer();
            outbox.play_sound(self.entity, cue, None);
        }
    }

    pub fn play_equip_sound(&mut self, cue: &str, force: bool, outbox: &mut Outbox) {
        if force {
            outbox.play_sound(self.entity, cue, None);
        } else if self.controller.should_play_equip_sound {
            self.start_equip_sound_timer();
            outbox.play_sound(self.entity, cue, None);
        }
    }

    fn start_pickup_sound_timer(&mut self) {
        let controller = &mut *self.controller;
        controller.should_play_pickup_sound = false;
        controller.timers.clear(&mut controller.pickup_sound_handle);
        controller.pickup_sound_handle = Some(controller.timers.schedule(
            self.config.pickup_sound_reset_time,
            CharacterTimer::PickupSoundReset,
        ));
    }

    fn start_equip_sound_timer(&mut self) {
        let controller = &mut *self.controller;
        controller.should_play_equip_sound = false;
        controller.timers.clear(&mut controller.equip_sound_handle);
        controller.equip_sound_handle = Some(controller.timers.schedule(
            self.config.equip_sound_reset_time,
            CharacterTimer::EquipSoundReset,
        ));
    }

    // ========================================================================
    // Timers
    // ========================================================================

    /// Tick scheduler'а персонажа и dispatch сработавших callbacks
    pub fn advance_timers(
        &mut self,
        delta: f32,
        items: &mut impl ItemAccess,
        tracer: &dyn LineTracer,
        outbox: &mut Outbox,
    ) {
        for timer in self.controller.timers.tick(delta) {
            match timer {
                CharacterTimer::AutoFireReset => {
                    self.controller.auto_fire_handle = None;
                    self.auto_fire_reset(items, tracer, outbox);
                }
                CharacterTimer::CrosshairBulletFinished => {
                    self.controller.crosshair_handle = None;
                    self.controller.firing_bullet = false;
                }
                CharacterTimer::PickupSoundReset => {
                    self.controller.pickup_sound_handle = None;
                    self.controller.should_play_pickup_sound = true;
                }
                CharacterTimer::EquipSoundReset => {
                    self.controller.equip_sound_handle = None;
                    self.controller.should_play_equip_sound = true;
                }
            }
        }
    }

    // ========================================================================
    // Per-frame
    // ========================================================================

    /// Фиксированный порядок: zoom → look rates → spread → item trace → capsule
    pub fn update_frame(
        &mut self,
        delta: f32,
        items: &mut impl ItemAccess,
        tracer: &dyn LineTracer,
        outbox: &mut Outbox,
    ) {
        let aiming = self.controller.aiming;

        self.camera.follow(self.location);
        self.camera.interp_zoom(aiming, delta, self.config);
        self.camera.set_look_rates(aiming, self.config);

        let inputs = SpreadInputs {
            ground_speed: self.locomotion.ground_speed(),
            airborne: self.locomotion.airborne,
            aiming,
            firing_bullet: self.controller.firing_bullet,
        };
        self.crosshair
            .update(delta, inputs, self.config.max_spread_ground_speed);

        self.trace_for_items(items, tracer, outbox);

        self.locomotion.interp_capsule_half_height(delta, self.config);
    }
}
