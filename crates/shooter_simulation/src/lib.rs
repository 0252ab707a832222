//! Shooter Simulation Core
//!
//! Gameplay ядро third-person shooter'а на Bevy 0.16 ECS:
//! items (weapon / ammo), combat controller персонажа, enemy, explosive.
//!
//! HYBRID ARCHITECTURE:
//! - ECS = правила (state machines, ammo, урон, таймеры, inventory)
//! - Хост = physics, animation, audio, UI (общение только через events, см. `services`)

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub mod character;
pub mod config;
pub mod curves;
pub mod enemy;
pub mod items;
pub mod logger;
pub mod services;
pub mod timer;

pub use character::{spawn_character, CharacterPlugin, CombatController, CombatState, InputAction, PlayerInput};
pub use config::{ConfigError, GameConfig};
pub use enemy::{spawn_enemy, spawn_explosive, Enemy, EnemyAttackRequest, EnemyPlugin};
pub use items::{spawn_ammo, spawn_weapon, Item, ItemPlugin, ItemState};
pub use services::ServicesPlugin;

/// Порядок внутри FixedUpdate tick'а
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShooterSet {
    /// Inbound events: input, overlaps, animation notifies
    Input,
    /// Per-entity scheduler'ы
    Timers,
    /// Item долетел → inventory
    Pickup,
    /// Camera, crosshair, item trace, item interp
    Frame,
    /// BulletImpact этого tick'а → enemy / explosive
    Impacts,
    /// Collision/visibility флаги item'ов → хост
    Publish,
}

/// Главный plugin симуляции (конфиг + все подсистемы)
#[derive(Default)]
pub struct SimulationPlugin {
    pub config: GameConfig,
}

impl SimulationPlugin {
    pub fn with_config(config: GameConfig) -> Self {
        Self { config }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let config = self.config.clone();

        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .insert_resource(config.rarities.clone())
            .insert_resource(config.weapons.clone())
            .insert_resource(config.character.clone())
            .insert_resource(config.enemy.clone())
            .insert_resource(config.item.clone())
            .insert_resource(config);

        // Seed мог задать create_headless_app
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app.configure_sets(
            FixedUpdate,
            (
                ShooterSet::Input,
                ShooterSet::Timers,
                ShooterSet::Pickup,
                ShooterSet::Frame,
                ShooterSet::Impacts,
                ShooterSet::Publish,
            )
                .chain(),
        );

        app.add_plugins((ServicesPlugin, ItemPlugin, CharacterPlugin, EnemyPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции (дефолтный конфиг)
pub fn create_headless_app(seed: u64) -> App {
    create_headless_app_with(seed, GameConfig::default())
}

pub fn create_headless_app_with(seed: u64, config: GameConfig) -> App {
    let mut app = App::new();
    logger::init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .add_plugins(SimulationPlugin::with_config(config));

    app
}

/// Один fixed tick: продвигает `Time<Fixed>` на timestep и гоняет FixedUpdate.
///
/// Не зависит от wall clock (в отличие от `app.update()`), поэтому тесты
/// и headless прогоны детерминированы.
pub fn run_fixed_tick(app: &mut App) {
    let timestep = app.world().resource::<Time<Fixed>>().timestep();
    app.world_mut()
        .resource_mut::<Time<Fixed>>()
        .advance_by(timestep);
    app.world_mut().run_schedule(FixedUpdate);
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
