//! Enemy: health, hit react / stun, melee, hit numbers + explosive props.
//!
//! Architecture:
//! - `components` - Enemy, Blackboard (для behavior tree хоста), weapon boxes, hit numbers
//! - `health_bar` - presenter capability (рисует хост)
//! - `controller` - EnemyCtx: урон, stun, melee, таймеры
//! - `explosive` - взрывается от пули
//! - `systems` - ECS обвязка

use bevy::prelude::*;

pub mod components;
pub mod controller;
pub mod explosive;
pub mod health_bar;
pub mod systems;

#[cfg(test)]
mod enemy_tests;

pub use components::{
    Blackboard, Enemy, EnemyTimer, HitNumber, HitNumbers, MeleeWeaponBoxes, WeaponBoxSide,
};
pub use controller::{EnemyBundle, EnemyCtx, EnemyQueryData};
pub use explosive::Explosive;
pub use health_bar::{HealthBar, HealthBarPresenter, SilentHealthBar};

use crate::config::EnemyConfig;
use crate::ShooterSet;

/// Event: behavior tree хоста просит атаку (BT → ECS)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct EnemyAttackRequest {
    pub enemy: Entity,
    pub play_rate: f32,
}

pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<EnemyAttackRequest>();

        app.add_systems(
            FixedUpdate,
            (
                systems::handle_enemy_overlaps,
                systems::handle_enemy_notifies,
                systems::handle_attack_requests,
            )
                .chain()
                .in_set(ShooterSet::Input)
                .after(crate::character::systems::handle_character_notifies),
        )
        .add_systems(
            FixedUpdate,
            systems::tick_enemy_timers
                .in_set(ShooterSet::Timers)
                .after(crate::items::systems::tick_item_timers),
        )
        .add_systems(
            FixedUpdate,
            systems::update_hit_numbers
                .in_set(ShooterSet::Frame)
                .after(crate::items::systems::update_items),
        )
        .add_systems(
            FixedUpdate,
            systems::handle_bullet_impacts.in_set(ShooterSet::Impacts),
        );
    }
}

/// Spawn enemy без визуального health bar'а
pub fn spawn_enemy(world: &mut World, transform: Transform) -> Entity {
    spawn_enemy_with(world, transform, SilentHealthBar)
}

/// Spawn enemy; patrol points сразу переводятся в world и пишутся в blackboard
pub fn spawn_enemy_with(
    world: &mut World,
    transform: Transform,
    presenter: impl HealthBarPresenter,
) -> Entity {
    let config = world.get_resource::<EnemyConfig>().cloned().unwrap_or_default();

    let mut bundle = EnemyBundle::new(&config, presenter);
    bundle
        .as_ctx(Entity::PLACEHOLDER, transform.translation, &config)
        .publish_patrol_points(&transform);

    let enemy = world.spawn((bundle, transform)).id();
    crate::logger::log_info(&format!(
        "👹 Enemy {:?} spawned at {:?} (health {})",
        enemy, transform.translation, config.max_health
    ));
    enemy
}

pub fn spawn_explosive(world: &mut World, transform: Transform) -> Entity {
    let explosive = world.spawn((Explosive::default(), transform)).id();
    crate::logger::log(&format!(
        "🛢️ Explosive {:?} spawned at {:?}",
        explosive, transform.translation
    ));
    explosive
}
