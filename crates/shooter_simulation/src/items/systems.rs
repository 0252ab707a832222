//! Item systems (FixedUpdate).
//!
//! Порядок внутри tick'а задаётся `ShooterSet`:
//! 1. Timers - таймеры item'ов (interp finish, pulse reset, throw, slide)
//! 2. Frame - полёт к anchor'у, pulse, slide, upright
//! 3. Publish - изменившиеся collision/visibility флаги → хосту

use bevy::prelude::*;

use super::{Item, ItemPickupFinished};
use crate::character::{CameraRig, InterpSlots};
use crate::services::PhysicsRequest;

/// Система: tick per-item scheduler'ов
///
/// Завершённый полёт публикуется как `ItemPickupFinished` -
/// финализация (inventory, ammo map) на стороне персонажа.
pub fn tick_item_timers(
    time: Res<Time<Fixed>>,
    mut items: Query<(Entity, &mut Item, &mut Transform)>,
    mut finished: EventWriter<ItemPickupFinished>,
) {
    let delta = time.delta_secs();

    for (entity, mut item, mut transform) in items.iter_mut() {
        if item.timers.active_count() == 0 {
            continue;
        }

        let Some(done) = item.advance_timers(&mut transform, delta) else {
            continue;
        };

        crate::logger::log(&format!(
            "📦 '{}' ({:?}) reached slot {} of {:?}",
            item.name, entity, done.slot_index, done.character
        ));
        finished.write(ItemPickupFinished {
            item: entity,
            character: done.character,
            slot_index: done.slot_index,
        });
    }
}

/// Система: per-frame обновление item'ов
///
/// Target для полёта пересчитывается каждый tick: персонаж (и камера) двигаются.
/// Оружие летит к weapon anchor'у (slot 0), остальное - к своему slot'у.
pub fn update_items(
    time: Res<Time<Fixed>>,
    mut items: Query<(&mut Item, &mut Transform)>,
    characters: Query<(&CameraRig, &InterpSlots)>,
) {
    let delta = time.delta_secs();

    for (mut item, mut transform) in items.iter_mut() {
        if item.is_interping() {
            let target = item
                .character()
                .and_then(|character| characters.get(character).ok())
                .and_then(|(camera, slots)| {
                    let index = if item.is_weapon() { 0 } else { item.interp_slot() };
                    slots
                        .location(index, camera)
                        .map(|location| (location, camera.yaw_degrees()))
                });

            match target {
                Some((location, camera_yaw)) => {
                    item.item_interp(&mut transform, delta, location, camera_yaw);
                }
                None => {
                    crate::logger::log_warning(&format!(
                        "⚠️ '{}' is interping but its character has no camera/slots",
                        item.name
                    ));
                }
            }
        }

        item.update_pulse();
        item.update_slide_displacement();
        item.keep_upright(&mut transform);
    }
}

/// Система: публикация collision/visibility флагов после смены state
pub fn publish_item_properties(
    mut items: Query<(Entity, &mut Item)>,
    mut physics: EventWriter<PhysicsRequest>,
) {
    for (entity, mut item) in items.iter_mut() {
        if !item.properties_dirty() {
            continue;
        }
        item.take_properties_dirty();

        physics.write(PhysicsRequest::ConfigureItem {
            item: entity,
            properties: *item.properties(),
        });
    }
}
