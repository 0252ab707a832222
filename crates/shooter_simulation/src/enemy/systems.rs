//! Enemy systems (FixedUpdate).
//!
//! - Input: overlaps (agro / combat range / weapon boxes), notifies, attack requests
//! - Timers: health bar, hit react reset, hit numbers
//! - Frame: hit numbers → screen
//! - Impacts: BulletImpact от стрельбы этого же tick'а

use bevy::prelude::*;

use super::components::WeaponBoxSide;
use super::controller::{EnemyCtx, EnemyQueryData};
use super::explosive::Explosive;
use super::EnemyAttackRequest;
use crate::character::CombatController;
use crate::config::EnemyConfig;
use crate::services::{
    AnimNotify, BulletImpact, NotifyKind, OverlapEvent, OverlapPhase, OverlapShape, Outbound,
    Outbox, ScreenSpace,
};
use crate::DeterministicRng;

/// Система: пули → enemy (урон, stun, hit numbers) или explosive
pub fn handle_bullet_impacts(
    config: Res<EnemyConfig>,
    mut rng: ResMut<DeterministicRng>,
    mut impacts: EventReader<BulletImpact>,
    mut enemies: Query<EnemyQueryData, Without<Explosive>>,
    mut explosives: Query<(&mut Explosive, &Transform)>,
    mut out: Outbound,
) {
    let mut outbox = Outbox::new();

    for impact in impacts.read() {
        let Some(target) = impact.target else {
            continue;
        };

        if let Ok(row) = enemies.get_mut(target) {
            let mut ctx = EnemyCtx::from_row(row, &config);
            ctx.receive_bullet(impact, &mut rng.rng, &mut outbox);
        } else if let Ok((mut explosive, transform)) = explosives.get_mut(target) {
            explosive.bullet_hit(target, transform.translation, impact, &mut outbox);
        }
    }

    out.flush(outbox);
}

/// Система: overlaps enemy shapes (owner - enemy, other - персонаж)
pub fn handle_enemy_overlaps(
    config: Res<EnemyConfig>,
    mut overlaps: EventReader<OverlapEvent>,
    mut enemies: Query<EnemyQueryData>,
    characters: Query<&Transform, (With<CombatController>, Without<super::Enemy>)>,
    mut out: Outbound,
) {
    let mut outbox = Outbox::new();

    for overlap in overlaps.read() {
        let side = match overlap.shape {
            OverlapShape::LeftWeaponBox => Some(WeaponBoxSide::Left),
            OverlapShape::RightWeaponBox => Some(WeaponBoxSide::Right),
            OverlapShape::AgroSphere | OverlapShape::CombatRange => None,
            _ => continue,
        };
        // Реагируем только на персонажей
        let Ok(victim_transform) = characters.get(overlap.other) else {
            continue;
        };
        let Ok(row) = enemies.get_mut(overlap.owner) else {
            continue;
        };
        let mut ctx = EnemyCtx::from_row(row, &config);
        let began = overlap.phase == OverlapPhase::Began;

        match (overlap.shape, side) {
            (OverlapShape::AgroSphere, _) => ctx.agro_overlap(overlap.other, began),
            (OverlapShape::CombatRange, _) => ctx.combat_range_overlap(began),
            (_, Some(side)) if began => {
                ctx.weapon_box_overlap(
                    side,
                    overlap.other,
                    victim_transform.translation,
                    &mut outbox,
                );
            }
            _ => {}
        }
    }

    out.flush(outbox);
}

/// Система: animation notifies enemy (weapon boxes, конец hit react)
pub fn handle_enemy_notifies(
    config: Res<EnemyConfig>,
    mut notifies: EventReader<AnimNotify>,
    mut enemies: Query<EnemyQueryData>,
) {
    for notify in notifies.read() {
        if !matches!(
            notify.notify,
            NotifyKind::ActivateLeftWeapon
                | NotifyKind::DeactivateLeftWeapon
                | NotifyKind::ActivateRightWeapon
                | NotifyKind::DeactivateRightWeapon
                | NotifyKind::EndHitReact
        ) {
            continue;
        }
        let Ok(row) = enemies.get_mut(notify.entity) else {
            continue;
        };
        let mut ctx = EnemyCtx::from_row(row, &config);

        match notify.notify {
            NotifyKind::ActivateLeftWeapon => ctx.activate_weapon_box(WeaponBoxSide::Left),
            NotifyKind::DeactivateLeftWeapon => ctx.deactivate_weapon_box(WeaponBoxSide::Left),
            NotifyKind::ActivateRightWeapon => ctx.activate_weapon_box(WeaponBoxSide::Right),
            NotifyKind::DeactivateRightWeapon => ctx.deactivate_weapon_box(WeaponBoxSide::Right),
            NotifyKind::EndHitReact => ctx.end_hit_react(),
            _ => {}
        }
    }
}

/// Система: behavior tree просит атаку
pub fn handle_attack_requests(
    config: Res<EnemyConfig>,
    mut rng: ResMut<DeterministicRng>,
    mut requests: EventReader<EnemyAttackRequest>,
    mut enemies: Query<EnemyQueryData>,
    mut out: Outbound,
) {
    let mut outbox = Outbox::new();

    for request in requests.read() {
        let Ok(row) = enemies.get_mut(request.enemy) else {
            crate::logger::log_warning(&format!(
                "⚠️ Attack request for unknown enemy {:?}",
                request.enemy
            ));
            continue;
        };
        let mut ctx = EnemyCtx::from_row(row, &config);
        ctx.start_attack(request.play_rate, &mut rng.rng, &mut outbox);
    }

    out.flush(outbox);
}

/// Система: tick per-enemy scheduler'ов
pub fn tick_enemy_timers(
    time: Res<Time<Fixed>>,
    config: Res<EnemyConfig>,
    mut enemies: Query<EnemyQueryData>,
    mut out: Outbound,
) {
    let delta = time.delta_secs();
    let mut outbox = Outbox::new();

    for row in enemies.iter_mut() {
        if row.1.timers.active_count() == 0 {
            continue;
        }
        let mut ctx = EnemyCtx::from_row(row, &config);
        ctx.advance_timers(delta, &mut outbox);
    }

    out.flush(outbox);
}

/// Система: hit numbers следуют за world позицией на экране
pub fn update_hit_numbers(
    config: Res<EnemyConfig>,
    screen: Res<ScreenSpace>,
    mut enemies: Query<EnemyQueryData>,
    mut out: Outbound,
) {
    let mut outbox = Outbox::new();

    for row in enemies.iter_mut() {
        if row.4.is_empty() {
            continue;
        }
        let mut ctx = EnemyCtx::from_row(row, &config);
        ctx.update_hit_numbers(screen.projector(), &mut outbox);
    }

    out.flush(outbox);
}
