//! Explosive: реагирует на пулю взрывом (звук + эффект) и исчезает.

use bevy::prelude::*;

use crate::services::{BulletImpact, Outbox};

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Explosive {
    pub explode_sound: String,
    pub explode_effect: String,
    /// Несколько пуль в одном tick'е взрывают один раз
    pub detonated: bool,
}

impl Default for Explosive {
    fn default() -> Self {
        Self {
            explode_sound: "Explosion".to_string(),
            explode_effect: "ExplosionParticles".to_string(),
            detonated: false,
        }
    }
}

impl Explosive {
    pub fn bullet_hit(
        &mut self,
        entity: Entity,
        location: Vec3,
        impact: &BulletImpact,
        outbox: &mut Outbox,
    ) -> bool {
        if self.detonated {
            return false;
        }
        self.detonated = true;

        outbox.play_sound(entity, self.explode_sound.clone(), Some(location));
        outbox.spawn_effect(self.explode_effect.clone(), impact.location, None);
        outbox.despawns.push(entity);

        crate::logger::log_info(&format!(
            "💥 Explosive {:?} detonated by {:?}",
            entity, impact.shooter
        ));
        true
    }
}
