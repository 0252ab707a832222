//! Headless прогон shooter симуляции
//!
//! Персонаж с SMG стреляет очередью по enemy, затем подбирает ammo.
//! Опционально: путь к JSON конфигу первым аргументом.

use bevy::prelude::*;
use shooter_simulation::character::InputAction;
use shooter_simulation::config::GameConfig;
use shooter_simulation::enemy::Enemy;
use shooter_simulation::items::{AmmoType, WeaponType};
use shooter_simulation::services::{
    OverlapEvent, OverlapPhase, OverlapShape, PhysicsWorld, SphereWorld,
};
use shooter_simulation::{
    create_headless_app_with, run_fixed_tick, spawn_ammo, spawn_character, spawn_enemy,
    PlayerInput,
};

fn main() {
    let seed = 42;
    let config = match std::env::args().nth(1) {
        Some(path) => match GameConfig::from_json_file(&path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Failed to load config {}: {}", path, err);
                std::process::exit(1);
            }
        },
        None => GameConfig::default(),
    };
    println!("Starting shooter headless simulation (seed: {})", seed);

    let mut app = create_headless_app_with(seed, config);
    let world = app.world_mut();

    let character = spawn_character(world, Transform::default(), Some(WeaponType::SubmachineGun));
    let enemy = spawn_enemy(world, Transform::from_xyz(800.0, 0.0, 0.0));
    let ammo = spawn_ammo(world, AmmoType::NineMm, 30, Transform::from_xyz(150.0, 0.0, 0.0));

    // Enemy - сфера на линии прицела
    world.insert_resource(PhysicsWorld::new(
        SphereWorld::new()
            .with_sphere(Some(enemy), Vec3::new(800.0, 0.0, 0.0), 120.0)
            .with_bone("spine_02"),
    ));

    world.send_event(PlayerInput {
        character,
        action: InputAction::FirePressed,
    });

    for tick in 0..600 {
        if tick == 90 {
            app.world_mut().send_event(PlayerInput {
                character,
                action: InputAction::FireReleased,
            });
        }
        if tick == 120 {
            // Персонаж дошёл до коробки
            app.world_mut().send_event(OverlapEvent {
                phase: OverlapPhase::Began,
                shape: OverlapShape::AmmoCollision,
                owner: ammo,
                other: character,
            });
        }
        run_fixed_tick(&mut app);

        if tick % 60 == 0 {
            let health = app
                .world()
                .get::<Enemy>(enemy)
                .map(|enemy| enemy.health)
                .unwrap_or(0.0);
            println!(
                "Tick {}: {} entities, enemy health {}",
                tick,
                app.world().entities().len(),
                health
            );
        }
    }

    println!("Simulation complete!");
}
