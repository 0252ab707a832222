//! Enemy компоненты
//!
//! # Архитектура
//!
//! **Enemy** - health + флаги (stunned / in attack range / can hit react) + таймеры
//! **Blackboard** - то, что читает внешний behavior tree (target, stunned, patrol)
//! **MeleeWeaponBoxes** - левый/правый hitbox, включаются animation notifies
//! **HitNumbers** - floating damage numbers (world позиция → screen каждый tick)

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::config::EnemyConfig;
use crate::timer::{Scheduler, TimerHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyTimer {
    HideHealthBar,
    ResetHitReact,
    DestroyHitNumber(u32),
}

#[derive(Component, Debug, Clone)]
pub struct Enemy {
    pub health: f32,
    pub max_health: f32,
    pub stunned: bool,
    pub in_attack_range: bool,
    /// Сбрасывается на случайное время после каждого hit react
    pub can_hit_react: bool,
    pub dead: bool,
    pub timers: Scheduler<EnemyTimer>,
    pub(crate) health_bar_handle: Option<TimerHandle>,
    pub(crate) hit_react_handle: Option<TimerHandle>,
}

impl Enemy {
    pub fn new(config: &EnemyConfig) -> Self {
        Self {
            health: config.max_health,
            max_health: config.max_health,
            stunned: false,
            in_attack_range: false,
            can_hit_react: true,
            dead: false,
            timers: Scheduler::new(),
            health_bar_handle: None,
            hit_react_handle: None,
        }
    }

    pub fn health_percent(&self) -> f32 {
        if self.max_health > 0.0 {
            self.health / self.max_health
        } else {
            0.0
        }
    }
}

/// AI blackboard (пишет enemy, читает behavior tree хоста)
#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Blackboard {
    pub target: Option<Entity>,
    pub stunned: bool,
    pub in_attack_range: bool,
    /// World позиции
    pub patrol_point: Vec3,
    pub patrol_point_2: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeaponBoxSide {
    Left,
    Right,
}

/// Melee hitboxes. Активны только между Activate/Deactivate notifies атаки.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeleeWeaponBoxes {
    pub left_active: bool,
    pub right_active: bool,
}

impl MeleeWeaponBoxes {
    pub fn set_active(&mut self, side: WeaponBoxSide, active: bool) {
        match side {
            WeaponBoxSide::Left => self.left_active = active,
            WeaponBoxSide::Right => self.right_active = active,
        }
    }

    pub fn is_active(&self, side: WeaponBoxSide) -> bool {
        match side {
            WeaponBoxSide::Left => self.left_active,
            WeaponBoxSide::Right => self.right_active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitNumber {
    pub damage: f32,
    pub location: Vec3,
    pub headshot: bool,
    /// Последняя опубликованная screen позиция
    pub screen: Option<Vec2>,
}

/// Живые hit numbers по id
#[derive(Component, Debug, Clone, Default)]
pub struct HitNumbers {
    next_id: u32,
    entries: BTreeMap<u32, HitNumber>,
}

impl HitNumbers {
    pub fn store(&mut self, damage: f32, location: Vec3, headshot: bool) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.insert(
            id,
            HitNumber {
                damage,
                location,
                headshot,
                screen: None,
            },
        );
        id
    }

    pub fn remove(&mut self, id: u32) -> Option<HitNumber> {
        self.entries.remove(&id)
    }

    pub fn get(&self, id: u32) -> Option<&HitNumber> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut HitNumber)> {
        self.entries.iter_mut().map(|(id, entry)| (*id, entry))
    }
}
