//! Внешние коллабораторы ядра.
//!
//! ECS ответственность:
//! - Combat rules, item lifecycle, timers
//! - Публикация намерений (звук, анимация, impulse, UI) через events
//!
//! Хост ответственность:
//! - Physics: overlaps (`OverlapEvent`) + line traces (`PhysicsWorld`)
//! - Animation: montages (`AnimationRequest`) + notifies (`AnimNotify`)
//! - Audio / FX / UI: читают outbound events каждый кадр

use bevy::prelude::*;

pub mod events;
pub mod outbox;
pub mod physics;

pub use events::{
    AnimNotify, AnimationRequest, BulletImpact, CharacterDamaged, Dead, EffectRequest, EntityDied,
    NotifyKind, OverlapEvent, OverlapPhase, OverlapShape, PhysicsRequest, SocketRef, SoundCue,
    UiEvent,
};
pub use outbox::{Outbound, Outbox, ShooterOutbound};
pub use physics::{
    EmptyWorld, LineTracer, OffscreenProjector, PhysicsWorld, ScreenProjector, ScreenSpace,
    SphereWorld, TraceChannel, TraceHit, TraceSphere,
};

/// Регистрирует boundary events + дефолтные query сервисы (если хост не вставил свои)
pub struct ServicesPlugin;

impl Plugin for ServicesPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<OverlapEvent>()
            .add_event::<AnimNotify>()
            .add_event::<SoundCue>()
            .add_event::<AnimationRequest>()
            .add_event::<PhysicsRequest>()
            .add_event::<EffectRequest>()
            .add_event::<UiEvent>()
            .add_event::<BulletImpact>()
            .add_event::<CharacterDamaged>()
            .add_event::<EntityDied>();

        app.init_resource::<PhysicsWorld>()
            .init_resource::<ScreenSpace>();
    }
}
