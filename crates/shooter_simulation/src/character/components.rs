//! Character компоненты
//!
//! # Архитектура
//!
//! **CombatController** - exclusive action mode (fire/reload/equip) + таймеры:
//! - `state` гейтит все input actions
//! - `timers` - per-character scheduler (auto fire, crosshair, sound debounce)
//!
//! **ItemTrace** - какой item сейчас под прицелом, сколько pickup сфер пересекаем
//!
//! Inventory/ammo/interp slots - в `inventory.rs`, камера/движение - в `camera.rs`.

use bevy::prelude::*;

use crate::timer::{Scheduler, TimerHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum CombatState {
    #[default]
    Unoccupied,
    FireTimerInProgress,
    Reloading,
    Equipping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterTimer {
    AutoFireReset,
    CrosshairBulletFinished,
    PickupSoundReset,
    EquipSoundReset,
}

/// Combat state machine персонажа
#[derive(Component, Debug, Clone)]
pub struct CombatController {
    pub state: CombatState,
    pub aiming: bool,
    pub aiming_button_pressed: bool,
    pub fire_button_pressed: bool,
    /// true в окне `shoot_time_duration` после выстрела (crosshair shooting factor)
    pub firing_bullet: bool,
    pub equipped_weapon: Option<Entity>,
    pub should_play_pickup_sound: bool,
    pub should_play_equip_sound: bool,
    pub timers: Scheduler<CharacterTimer>,
    pub(crate) auto_fire_handle: Option<TimerHandle>,
    pub(crate) crosshair_handle: Option<TimerHandle>,
    pub(crate) pickup_sound_handle: Option<TimerHandle>,
    pub(crate) equip_sound_handle: Option<TimerHandle>,
}

impl Default for CombatController {
    fn default() -> Self {
        Self {
            state: CombatState::Unoccupied,
            aiming: false,
            aiming_button_pressed: false,
            fire_button_pressed: false,
            firing_bullet: false,
            equipped_weapon: None,
            should_play_pickup_sound: true,
            should_play_equip_sound: true,
            timers: Scheduler::new(),
            auto_fire_handle: None,
            crosshair_handle: None,
            pickup_sound_handle: None,
            equip_sound_handle: None,
        }
    }
}

impl CombatController {
    pub fn is_unoccupied(&self) -> bool {
        self.state == CombatState::Unoccupied
    }
}

/// Item под прицелом + счётчик overlap'ов pickup сфер
#[derive(Component, Debug, Clone, Default)]
pub struct ItemTrace {
    /// Трейсим только пока пересекаем хотя бы одну pickup сферу
    pub should_trace: bool,
    pub overlapped_item_count: u32,
    pub trace_hit_item: Option<Entity>,
    pub trace_hit_item_last_frame: Option<Entity>,
    /// Слот inventory, подсвеченный в HUD (куда ляжет оружие под прицелом)
    pub highlighted_slot: Option<usize>,
}

impl ItemTrace {
    /// Счётчик не уходит ниже 0; tracing включён пока count > 0
    pub fn increment_overlapped_item_count(&mut self, amount: i32) {
        let count = i64::from(self.overlapped_item_count) + i64::from(amount);
        if count <= 0 {
            self.overlapped_item_count = 0;
            self.should_trace = false;
        } else {
            self.overlapped_item_count = u32::try_from(count).unwrap_or(u32::MAX);
            self.should_trace = true;
        }
    }
}
