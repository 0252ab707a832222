//! Outbound очередь.
//!
//! Domain логика не знает про EventWriter: складывает всё в `Outbox`,
//! система в конце flush'ит его в Bevy events (и despawn через Commands).

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::events::{
    AnimationRequest, BulletImpact, CharacterDamaged, Dead, EffectRequest, EntityDied,
    PhysicsRequest, SocketRef, SoundCue, UiEvent,
};

#[derive(Debug, Default)]
pub struct Outbox {
    pub sounds: Vec<SoundCue>,
    pub animations: Vec<AnimationRequest>,
    pub physics: Vec<PhysicsRequest>,
    pub effects: Vec<EffectRequest>,
    pub ui: Vec<UiEvent>,
    pub impacts: Vec<BulletImpact>,
    pub damage: Vec<CharacterDamaged>,
    pub died: Vec<EntityDied>,
    pub despawns: Vec<Entity>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn play_sound(&mut self, source: Entity, cue: impl Into<String>, location: Option<Vec3>) {
        let cue = cue.into();
        if cue.is_empty() {
            return;
        }
        self.sounds.push(SoundCue {
            source,
            cue,
            location,
        });
    }

    pub fn play_montage(
        &mut self,
        entity: Entity,
        montage: impl Into<String>,
        section: impl Into<String>,
        play_rate: f32,
    ) {
        self.animations.push(AnimationRequest {
            entity,
            montage: montage.into(),
            section: section.into(),
            play_rate,
        });
    }

    pub fn spawn_effect(&mut self, effect: impl Into<String>, location: Vec3, beam_end: Option<Vec3>) {
        self.effects.push(EffectRequest {
            effect: effect.into(),
            location,
            beam_end,
            socket: None,
        });
    }

    pub fn spawn_effect_at_socket(
        &mut self,
        effect: impl Into<String>,
        owner: Entity,
        socket: impl Into<String>,
        fallback: Vec3,
    ) {
        self.effects.push(EffectRequest {
            effect: effect.into(),
            location: fallback,
            beam_end: None,
            socket: Some(SocketRef {
                owner,
                socket: socket.into(),
            }),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
            && self.animations.is_empty()
            && self.physics.is_empty()
            && self.effects.is_empty()
            && self.ui.is_empty()
            && self.impacts.is_empty()
            && self.damage.is_empty()
            && self.died.is_empty()
            && self.despawns.is_empty()
    }
}

/// Writers для всего, кроме BulletImpact
/// (его читает enemy система, у которой тоже есть Outbound)
#[derive(SystemParam)]
pub struct Outbound<'w, 's> {
    commands: Commands<'w, 's>,
    sounds: EventWriter<'w, SoundCue>,
    animations: EventWriter<'w, AnimationRequest>,
    physics: EventWriter<'w, PhysicsRequest>,
    effects: EventWriter<'w, EffectRequest>,
    ui: EventWriter<'w, UiEvent>,
    damage: EventWriter<'w, CharacterDamaged>,
    died: EventWriter<'w, EntityDied>,
}

impl Outbound<'_, '_> {
    pub fn flush(&mut self, outbox: Outbox) {
        if !outbox.impacts.is_empty() {
            crate::logger::log_error(&format!(
                "❌ {} bullet impacts dropped: flushed through Outbound instead of ShooterOutbound",
                outbox.impacts.len()
            ));
        }
        self.flush_common(outbox);
    }

    fn flush_common(&mut self, outbox: Outbox) {
        for sound in outbox.sounds {
            self.sounds.write(sound);
        }
        for animation in outbox.animations {
            self.animations.write(animation);
        }
        for request in outbox.physics {
            self.physics.write(request);
        }
        for effect in outbox.effects {
            self.effects.write(effect);
        }
        for event in outbox.ui {
            self.ui.write(event);
        }
        for event in outbox.damage {
            self.damage.write(event);
        }
        for event in outbox.died {
            if let Ok(mut entity_commands) = self.commands.get_entity(event.entity) {
                entity_commands.insert(Dead);
            }
            self.died.write(event);
        }
        for entity in outbox.despawns {
            if let Ok(mut entity_commands) = self.commands.get_entity(entity) {
                entity_commands.despawn();
            }
        }
    }
}

/// Outbound для систем персонажа (стрельба производит BulletImpact)
#[derive(SystemParam)]
pub struct ShooterOutbound<'w, 's> {
    out: Outbound<'w, 's>,
    impacts: EventWriter<'w, BulletImpact>,
}

impl ShooterOutbound<'_, '_> {
    pub fn flush(&mut self, mut outbox: Outbox) {
        for impact in outbox.impacts.drain(..) {
            self.impacts.write(impact);
        }
        self.out.flush_common(outbox);
    }
}
