//! Character systems (FixedUpdate).
//!
//! Каждая система собирает `CharacterCtx` из Query row, вызывает domain логику
//! и flush'ит `Outbox` в events. Item'ы доступны через `ItemAccess` (Query).
//!
//! Порядок (`ShooterSet`):
//! - Input: player input, overlaps, animation notifies
//! - Timers: auto fire, crosshair window, sound debounce
//! - Pickup: финализация долетевших item'ов
//! - Frame: camera → zoom → look rates → spread → item trace → capsule

use bevy::prelude::*;

use super::controller::{CharacterCtx, CharacterQueryData};
use super::input::PlayerInput;
use crate::config::CharacterConfig;
use crate::items::{Item, ItemPickupFinished};
use crate::services::{
    AnimNotify, NotifyKind, OverlapEvent, OverlapPhase, OverlapShape, Outbox, PhysicsWorld,
    ShooterOutbound,
};
use crate::DeterministicRng;

/// Система: input actions → controller
pub fn handle_player_input(
    time: Res<Time<Fixed>>,
    config: Res<CharacterConfig>,
    physics: Res<PhysicsWorld>,
    mut inputs: EventReader<PlayerInput>,
    mut characters: Query<CharacterQueryData, Without<Item>>,
    mut items: Query<(&mut Item, &mut Transform)>,
    mut out: ShooterOutbound,
) {
    let delta = time.delta_secs();
    let mut outbox = Outbox::new();

    for input in inputs.read() {
        let Ok(row) = characters.get_mut(input.character) else {
            crate::logger::log_warning(&format!(
                "⚠️ Input {:?} for unknown character {:?}",
                input.action, input.character
            ));
            continue;
        };
        let mut ctx = CharacterCtx::from_row(row, &config);
        ctx.handle_input(input.action, delta, &mut items, physics.tracer(), &mut outbox);
    }

    out.flush(outbox);
}

/// Система: pickup сферы item'ов (счётчик overlap'ов) + ammo auto-pickup
///
/// owner - item (владелец сферы), other - персонаж.
pub fn handle_item_overlaps(
    config: Res<CharacterConfig>,
    mut overlaps: EventReader<OverlapEvent>,
    mut characters: Query<CharacterQueryData, Without<Item>>,
    mut items: Query<(&mut Item, &mut Transform)>,
    mut out: ShooterOutbound,
) {
    let mut outbox = Outbox::new();

    for overlap in overlaps.read() {
        if !matches!(overlap.shape, OverlapShape::ItemArea | OverlapShape::AmmoCollision) {
            continue;
        }
        let Ok(row) = characters.get_mut(overlap.other) else {
            continue;
        };
        let mut ctx = CharacterCtx::from_row(row, &config);

        match (overlap.shape, overlap.phase) {
            (OverlapShape::ItemArea, OverlapPhase::Began) => {
                ctx.trace.increment_overlapped_item_count(1);
            }
            (OverlapShape::ItemArea, OverlapPhase::Ended) => {
                ctx.trace.increment_overlapped_item_count(-1);
                // Ушли от item'а: его widget больше не нужен
                ctx.hide_pickup_affordance(overlap.owner, &mut items, &mut outbox);
            }
            (OverlapShape::AmmoCollision, OverlapPhase::Began) => {
                ctx.auto_pickup_ammo(overlap.owner, &mut items, &mut outbox);
            }
            _ => {}
        }
    }

    out.flush(outbox);
}

/// Система: animation notifies персонажа (reload/equip/clip)
pub fn handle_character_notifies(
    config: Res<CharacterConfig>,
    mut notifies: EventReader<AnimNotify>,
    mut characters: Query<CharacterQueryData, Without<Item>>,
    mut items: Query<(&mut Item, &mut Transform)>,
) {
    for notify in notifies.read() {
        if !matches!(
            notify.notify,
            NotifyKind::FinishReloading
                | NotifyKind::FinishEquipping
                | NotifyKind::GrabClip
                | NotifyKind::ReleaseClip
        ) {
            continue;
        }
        let Ok(row) = characters.get_mut(notify.entity) else {
            continue;
        };
        let mut ctx = CharacterCtx::from_row(row, &config);

        match notify.notify {
            NotifyKind::FinishReloading => {
                ctx.finish_reloading(&mut items);
            }
            NotifyKind::FinishEquipping => {
                ctx.finish_equipping();
            }
            NotifyKind::GrabClip => ctx.grab_clip(&mut items),
            NotifyKind::ReleaseClip => ctx.release_clip(&mut items),
            _ => {}
        }
    }
}

/// Система: tick per-character scheduler'ов
pub fn tick_character_timers(
    time: Res<Time<Fixed>>,
    config: Res<CharacterConfig>,
    physics: Res<PhysicsWorld>,
    mut characters: Query<CharacterQueryData, Without<Item>>,
    mut items: Query<(&mut Item, &mut Transform)>,
    mut out: ShooterOutbound,
) {
    let delta = time.delta_secs();
    let mut outbox = Outbox::new();

    for row in characters.iter_mut() {
        if row.1.timers.active_count() == 0 {
            continue;
        }
        let mut ctx = CharacterCtx::from_row(row, &config);
        ctx.advance_timers(delta, &mut items, physics.tracer(), &mut outbox);
    }

    out.flush(outbox);
}

/// Система: item долетел → inventory / ammo map / swap
pub fn finish_item_pickups(
    config: Res<CharacterConfig>,
    mut rng: ResMut<DeterministicRng>,
    mut finished: EventReader<ItemPickupFinished>,
    mut characters: Query<CharacterQueryData, Without<Item>>,
    mut items: Query<(&mut Item, &mut Transform)>,
    mut out: ShooterOutbound,
) {
    let mut outbox = Outbox::new();

    for event in finished.read() {
        let Ok(row) = characters.get_mut(event.character) else {
            crate::logger::log_warning(&format!(
                "⚠️ Item {:?} finished pickup for missing character {:?}",
                event.item, event.character
            ));
            continue;
        };
        let mut ctx = CharacterCtx::from_row(row, &config);
        ctx.finish_item_pickup(event.item, event.slot_index, &mut items, &mut outbox, &mut rng.rng);
    }

    out.flush(outbox);
}

/// Система: per-frame обновление персонажей (фиксированный порядок внутри ctx)
pub fn update_characters(
    time: Res<Time<Fixed>>,
    config: Res<CharacterConfig>,
    physics: Res<PhysicsWorld>,
    mut characters: Query<CharacterQueryData, Without<Item>>,
    mut items: Query<(&mut Item, &mut Transform)>,
    mut out: ShooterOutbound,
) {
    let delta = time.delta_secs();
    let mut outbox = Outbox::new();

    for row in characters.iter_mut() {
        let mut ctx = CharacterCtx::from_row(row, &config);
        ctx.update_frame(delta, &mut items, physics.tracer(), &mut outbox);
    }

    out.flush(outbox);
}
