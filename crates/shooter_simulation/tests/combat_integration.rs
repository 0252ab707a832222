//! Combat integration test
//!
//! Полный App (все plugins) headless, tick'и гоняются через `run_fixed_tick`.
//!
//! Проверяем:
//! - Стрельба очередью по enemy → урон, смерть ровно один раз
//! - Ammo auto-pickup долетает и пополняет запас
//! - Explosive, melee, agro blackboard

use bevy::prelude::*;
use shooter_simulation::character::{AmmoMap, Inventory};
use shooter_simulation::enemy::Blackboard;
use shooter_simulation::items::{AmmoType, WeaponType};
use shooter_simulation::services::{
    AnimNotify, CharacterDamaged, Dead, EntityDied, NotifyKind, OverlapEvent, OverlapPhase,
    OverlapShape, PhysicsWorld, SoundCue, SphereWorld,
};
use shooter_simulation::*;

const ENEMY_LOCATION: Vec3 = Vec3::new(800.0, 0.0, 0.0);

/// Helper: App + персонаж с SMG + enemy на линии прицела
fn create_combat_app(seed: u64) -> (App, Entity, Entity) {
    let mut app = create_headless_app(seed);
    let world = app.world_mut();

    let character = spawn_character(world, Transform::default(), Some(WeaponType::SubmachineGun));
    let enemy = spawn_enemy(world, Transform::from_translation(ENEMY_LOCATION));
    world.insert_resource(PhysicsWorld::new(
        SphereWorld::new()
            .with_sphere(Some(enemy), ENEMY_LOCATION, 120.0)
            .with_bone("spine_02"),
    ));

    (app, character, enemy)
}

fn run_ticks(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        run_fixed_tick(app);
    }
}

fn input(app: &mut App, character: Entity, action: InputAction) {
    app.world_mut().send_event(PlayerInput { character, action });
}

/// Все events типа с начала прогона (`app.update()` не вызываем, буферы не ротируются)
fn sent<E: Event + Clone>(app: &App) -> Vec<E> {
    app.world()
        .resource::<Events<E>>()
        .iter_current_update_events()
        .cloned()
        .collect()
}

fn equipped_ammo(app: &App, character: Entity) -> u32 {
    app.world()
        .get::<CombatController>(character)
        .and_then(|controller| controller.equipped_weapon)
        .and_then(|weapon| app.world().get::<Item>(weapon))
        .and_then(|item| item.weapon().map(|weapon| weapon.ammo()))
        .unwrap_or(0)
}

#[test]
fn test_smg_burst_kills_enemy_once() {
    let (mut app, character, enemy) = create_combat_app(42);

    input(&mut app, character, InputAction::FirePressed);
    run_ticks(&mut app, 120);

    let enemy_state = app.world().get::<Enemy>(enemy).expect("enemy stays spawned");
    assert!(enemy_state.dead);
    assert_eq!(enemy_state.health, 0.0);
    assert!(app.world().get::<Dead>(enemy).is_some());

    let died: Vec<EntityDied> = sent(&app);
    assert_eq!(died.iter().filter(|event| event.entity == enemy).count(), 1);
    assert_eq!(died[0].killer, Some(character));

    // Пули по мёртвому enemy урона не наносят, но магазин тратят
    assert!(equipped_ammo(&app, character) < 25);
}

#[test]
fn test_release_stops_automatic_fire() {
    let (mut app, character, _) = create_combat_app(42);

    input(&mut app, character, InputAction::FirePressed);
    run_ticks(&mut app, 30);
    input(&mut app, character, InputAction::FireReleased);
    run_ticks(&mut app, 1);

    let after_release = equipped_ammo(&app, character);
    assert!(after_release < 30);
    assert!(after_release > 0);

    run_ticks(&mut app, 60);
    assert_eq!(equipped_ammo(&app, character), after_release);
}

#[test]
fn test_ammo_auto_pickup_reaches_character() {
    let (mut app, character, _) = create_combat_app(7);
    let ammo = spawn_ammo(
        app.world_mut(),
        AmmoType::NineMm,
        30,
        Transform::from_xyz(150.0, 0.0, 0.0),
    );
    let carried_before = app
        .world()
        .get::<AmmoMap>(character)
        .map(|ammo| ammo.get(AmmoType::NineMm))
        .unwrap_or(0);

    app.world_mut().send_event(OverlapEvent {
        phase: OverlapPhase::Began,
        shape: OverlapShape::AmmoCollision,
        owner: ammo,
        other: character,
    });
    run_ticks(&mut app, 2);
    assert_eq!(
        app.world().get::<Item>(ammo).map(|item| item.state()),
        Some(ItemState::EquipInterping)
    );

    // Полёт 0.7s
    run_ticks(&mut app, 60);

    let carried_after = app
        .world()
        .get::<AmmoMap>(character)
        .map(|ammo| ammo.get(AmmoType::NineMm))
        .unwrap_or(0);
    assert_eq!(carried_after, carried_before + 30);
    assert!(app.world().get_entity(ammo).is_err());

    // Ammo не занимает слот inventory
    let inventory = app.world().get::<Inventory>(character).expect("character");
    assert_eq!(inventory.len(), 1);
}

#[test]
fn test_explosive_detonates_on_hit() {
    let mut app = create_headless_app(42);
    let world = app.world_mut();
    let character = spawn_character(world, Transform::default(), Some(WeaponType::Pistol));
    let barrel = spawn_explosive(world, Transform::from_translation(ENEMY_LOCATION));
    world.insert_resource(PhysicsWorld::new(
        SphereWorld::new().with_sphere(Some(barrel), ENEMY_LOCATION, 120.0),
    ));

    input(&mut app, character, InputAction::FirePressed);
    input(&mut app, character, InputAction::FireReleased);
    run_ticks(&mut app, 2);

    assert!(app.world().get_entity(barrel).is_err());
    let sounds: Vec<SoundCue> = sent(&app);
    assert_eq!(sounds.iter().filter(|sound| sound.cue == "Explosion").count(), 1);
}

#[test]
fn test_melee_box_damages_character_only_when_active() {
    let (mut app, character, enemy) = create_combat_app(42);
    let hit = OverlapEvent {
        phase: OverlapPhase::Began,
        shape: OverlapShape::LeftWeaponBox,
        owner: enemy,
        other: character,
    };

    app.world_mut().send_event(hit);
    run_ticks(&mut app, 1);
    assert!(sent::<CharacterDamaged>(&app).is_empty());

    app.world_mut().send_event(AnimNotify {
        entity: enemy,
        notify: NotifyKind::ActivateLeftWeapon,
    });
    run_ticks(&mut app, 1);
    app.world_mut().send_event(hit);
    run_ticks(&mut app, 1);

    let damage: Vec<CharacterDamaged> = sent(&app);
    assert_eq!(damage.len(), 1);
    assert_eq!(damage[0].victim, character);
    assert_eq!(damage[0].attacker, enemy);
    assert_eq!(damage[0].amount, 20.0);
}

#[test]
fn test_agro_sphere_targets_character() {
    let (mut app, character, enemy) = create_combat_app(42);

    app.world_mut().send_event(OverlapEvent {
        phase: OverlapPhase::Began,
        shape: OverlapShape::AgroSphere,
        owner: enemy,
        other: character,
    });
    run_ticks(&mut app, 1);

    let blackboard = app.world().get::<Blackboard>(enemy).expect("enemy");
    assert_eq!(blackboard.target, Some(character));
    assert_eq!(blackboard.patrol_point, ENEMY_LOCATION + Vec3::new(500.0, 0.0, 0.0));

    // Не персонаж (нет CombatController) - игнорируется
    app.world_mut().send_event(OverlapEvent {
        phase: OverlapPhase::Ended,
        shape: OverlapShape::AgroSphere,
        owner: enemy,
        other: enemy,
    });
    run_ticks(&mut app, 1);
    assert_eq!(
        app.world().get::<Blackboard>(enemy).and_then(|bb| bb.target),
        Some(character)
    );
}
