//! Events на границе ядра.
//!
//! Inbound (хост → ECS): overlaps, animation notifies.
//! Outbound (ECS → хост): звук, анимация, physics requests, FX, UI, урон.

use bevy::prelude::*;

use crate::items::ItemProperties;

// ============================================================================
// Inbound
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapPhase {
    Began,
    Ended,
}

/// Какая shape сообщила overlap (owner - владелец shape)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapShape {
    /// Pickup сфера item'а
    ItemArea,
    /// Auto-pickup сфера ammo
    AmmoCollision,
    /// Большая сфера enemy (target)
    AgroSphere,
    /// Малая сфера enemy (attack range)
    CombatRange,
    LeftWeaponBox,
    RightWeaponBox,
}

/// Event: physics сообщает overlap begin/end (Physics → ECS)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapEvent {
    pub phase: OverlapPhase,
    pub shape: OverlapShape,
    pub owner: Entity,
    pub other: Entity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyKind {
    // Character
    FinishReloading,
    FinishEquipping,
    GrabClip,
    ReleaseClip,
    // Enemy
    ActivateLeftWeapon,
    DeactivateLeftWeapon,
    ActivateRightWeapon,
    DeactivateRightWeapon,
    EndHitReact,
}

/// Event: анимация дошла до notify (Animation → ECS)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimNotify {
    pub entity: Entity,
    pub notify: NotifyKind,
}

// ============================================================================
// Outbound
// ============================================================================

#[derive(Event, Debug, Clone, PartialEq)]
pub struct SoundCue {
    pub source: Entity,
    pub cue: String,
    /// None = 2D звук
    pub location: Option<Vec3>,
}

/// Event: montage play + jump to section
#[derive(Event, Debug, Clone, PartialEq)]
pub struct AnimationRequest {
    pub entity: Entity,
    pub montage: String,
    pub section: String,
    pub play_rate: f32,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub enum PhysicsRequest {
    Impulse { entity: Entity, impulse: Vec3 },
    AttachToSocket { item: Entity, parent: Entity, socket: String },
    Detach { item: Entity },
    Jump { entity: Entity },
    /// Item сменил state → новый набор collision/visibility флагов
    ConfigureItem { item: Entity, properties: ItemProperties },
}

/// Socket на skeletal mesh (позицию знает только хост)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketRef {
    pub owner: Entity,
    pub socket: String,
}

/// Event: particle эффект (beam если задан `beam_end`).
/// `socket` задан → хост берёт позицию socket'а, `location` - fallback.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct EffectRequest {
    pub effect: String,
    pub location: Vec3,
    pub beam_end: Option<Vec3>,
    pub socket: Option<SocketRef>,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// old = None когда в руках ничего не было
    EquipSlotChanged {
        character: Entity,
        old_slot: Option<usize>,
        new_slot: usize,
    },
    HighlightSlot {
        character: Entity,
        slot: usize,
        start: bool,
    },
    PickupWidget {
        item: Entity,
        visible: bool,
    },
    HitNumberShown {
        enemy: Entity,
        id: u32,
        damage: f32,
        location: Vec3,
        headshot: bool,
    },
    HitNumberMoved {
        enemy: Entity,
        id: u32,
        screen: Vec2,
    },
    HitNumberRemoved {
        enemy: Entity,
        id: u32,
    },
}

/// Event: пуля попала (блокирующий hit второго луча)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct BulletImpact {
    pub shooter: Entity,
    pub target: Option<Entity>,
    pub location: Vec3,
    pub bone: Option<String>,
    pub damage: f32,
    pub headshot_damage: f32,
}

/// Event: enemy melee попал по персонажу
#[derive(Event, Debug, Clone, PartialEq)]
pub struct CharacterDamaged {
    pub victim: Entity,
    pub attacker: Entity,
    pub amount: f32,
}

/// Event: entity умер
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Marker: entity мёртв (вешается при flush'е `EntityDied`)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dead;
