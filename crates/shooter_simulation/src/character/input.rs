//! Player input (хост → ECS).
//!
//! Binding/mapping устройств - забота хоста, сюда приходят уже
//! готовые actions.

use bevy::prelude::*;

use super::controller::CharacterCtx;
use crate::items::ItemAccess;
use crate::services::{LineTracer, Outbox, PhysicsRequest};

/// Event: input action для конкретного персонажа
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PlayerInput {
    pub character: Entity,
    pub action: InputAction,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    FirePressed,
    FireReleased,
    AimPressed,
    AimReleased,
    SelectPressed,
    ReloadPressed,
    CrouchPressed,
    Jump,
    /// F → 0, 1..5 → 1..5
    SelectSlot(usize),
    /// Mouse (scaled по hip/aiming)
    Turn(f32),
    LookUp(f32),
    /// Gamepad, [-1, 1] × rate × delta
    TurnAtRate(f32),
    LookUpAtRate(f32),
}

impl CharacterCtx<'_> {
    pub fn handle_input(
        &mut self,
        action: InputAction,
        delta: f32,
        items: &mut impl ItemAccess,
        tracer: &dyn LineTracer,
        outbox: &mut Outbox,
    ) {
        let aiming = self.controller.aiming;

        match action {
            InputAction::FirePressed => {
                self.fire_button_pressed(items, tracer, outbox);
            }
            InputAction::FireReleased => self.fire_button_released(),
            InputAction::AimPressed => self.aiming_button_pressed(),
            InputAction::AimReleased => self.aiming_button_released(),
            InputAction::SelectPressed => {
                self.select_button_pressed(items, outbox);
            }
            InputAction::ReloadPressed => {
                self.reload_weapon(items, outbox);
            }
            InputAction::CrouchPressed => self.locomotion.crouch_button_pressed(self.config),
            InputAction::Jump => {
                if self.locomotion.jump(self.config) {
                    outbox.physics.push(PhysicsRequest::Jump {
                        entity: self.entity,
                    });
                }
            }
            InputAction::SelectSlot(slot) => {
                self.select_slot(slot, items, outbox);
            }
            InputAction::Turn(value) => self.camera.turn(value, aiming, self.config),
            InputAction::LookUp(value) => self.camera.look_up(value, aiming, self.config),
            InputAction::TurnAtRate(rate) => self.camera.turn_at_rate(rate, delta),
            InputAction::LookUpAtRate(rate) => self.camera.look_up_at_rate(rate, delta),
        }
    }
}
