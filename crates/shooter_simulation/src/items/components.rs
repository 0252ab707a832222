//! Item component: state machine + presentation flags.
//!
//! `Item` - tagged variant (`ItemKind::Weapon | ItemKind::Ammo`), общая логика
//! state machine живёт здесь, kind-специфичная - в `weapon.rs` / `ammo.rs`.
//!
//! Инвариант: physics/collision/visibility флаги меняются ТОЛЬКО через `set_state`.

use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{ItemTuning, RarityTable, Rgba};
use crate::items::ammo::AmmoData;
use crate::items::weapon::WeaponData;
use crate::timer::{Scheduler, TimerHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum ItemRarity {
    Damaged,
    #[default]
    Common,
    UnCommon,
    Rare,
    Legendary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum ItemState {
    /// Лежит в мире, можно подобрать
    #[default]
    Pickup,
    /// Летит к персонажу по кривой
    EquipInterping,
    /// В inventory, не в руках
    PickedUp,
    /// В руках
    Equipped,
    /// Выброшен, падает с физикой
    Falling,
}

// ============================================================================
// Collision / visibility bundle
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionResponse {
    Ignore,
    Overlap,
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionMode {
    NoCollision,
    QueryOnly,
    QueryAndPhysics,
}

/// Ответы на каналы: общий default + явные overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelResponses {
    pub default: CollisionResponse,
    pub visibility: CollisionResponse,
    pub world_static: CollisionResponse,
}

impl ChannelResponses {
    pub const fn all(response: CollisionResponse) -> Self {
        Self {
            default: response,
            visibility: response,
            world_static: response,
        }
    }

    pub const fn with_visibility(mut self, response: CollisionResponse) -> Self {
        self.visibility = response;
        self
    }

    pub const fn with_world_static(mut self, response: CollisionResponse) -> Self {
        self.world_static = response;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeProperties {
    pub collision: CollisionMode,
    pub responses: ChannelResponses,
}

impl ShapeProperties {
    pub const DISABLED: Self = Self {
        collision: CollisionMode::NoCollision,
        responses: ChannelResponses::all(CollisionResponse::Ignore),
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshProperties {
    pub simulate_physics: bool,
    pub gravity: bool,
    pub visible: bool,
    pub shape: ShapeProperties,
}

/// Полный набор physics/collision/visibility флагов item'а
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemProperties {
    pub mesh: MeshProperties,
    /// Сфера детекта pickup (overlap с персонажем)
    pub area_sphere: ShapeProperties,
    /// Box для трейса прицела (visibility channel)
    pub collision_box: ShapeProperties,
    /// Состояние принудительно прячет pickup widget
    pub hides_pickup_widget: bool,
}

impl ItemProperties {
    pub fn for_state(state: ItemState) -> Self {
        use CollisionResponse::*;

        let static_mesh = MeshProperties {
            simulate_physics: false,
            gravity: false,
            visible: true,
            shape: ShapeProperties::DISABLED,
        };
        let pickup_area = ShapeProperties {
            collision: CollisionMode::QueryOnly,
            responses: ChannelResponses::all(Overlap),
        };
        let traceable_box = ShapeProperties {
            collision: CollisionMode::QueryAndPhysics,
            responses: ChannelResponses::all(Ignore).with_visibility(Block),
        };

        match state {
            ItemState::Pickup => Self {
                mesh: static_mesh,
                area_sphere: pickup_area,
                collision_box: traceable_box,
                hides_pickup_widget: false,
            },
            ItemState::Equipped | ItemState::EquipInterping => Self {
                mesh: static_mesh,
                area_sphere: ShapeProperties::DISABLED,
                collision_box: ShapeProperties::DISABLED,
                hides_pickup_widget: true,
            },
            ItemState::Falling => Self {
                mesh: MeshProperties {
                    simulate_physics: true,
                    gravity: true,
                    visible: true,
                    shape: ShapeProperties {
                        collision: CollisionMode::QueryAndPhysics,
                        responses: ChannelResponses::all(Ignore).with_world_static(Block),
                    },
                },
                area_sphere: pickup_area,
                collision_box: traceable_box,
                hides_pickup_widget: false,
            },
            ItemState::PickedUp => Self {
                mesh: MeshProperties {
                    visible: false,
                    ..static_mesh
                },
                area_sphere: ShapeProperties::DISABLED,
                collision_box: ShapeProperties::DISABLED,
                hides_pickup_widget: true,
            },
        }
    }
}

// ============================================================================
// Presentation
// ============================================================================

/// Визуал по rarity (из RarityTable)
#[derive(Debug, Clone, PartialEq)]
pub struct RarityPresentation {
    pub active_stars: [bool; 5],
    pub glow_color: Rgba,
    pub light_color: Rgba,
    pub dark_color: Rgba,
    pub custom_depth_stencil: i32,
}

impl Default for RarityPresentation {
    fn default() -> Self {
        Self {
            active_stars: [true, false, false, false, false],
            glow_color: [1.0; 4],
            light_color: [1.0; 4],
            dark_color: [0.0, 0.0, 0.0, 1.0],
            custom_depth_stencil: 0,
        }
    }
}

/// Параметры glow материала (что уходит в рендер)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlowMaterial {
    pub glow_amount: f32,
    pub fresnel_exponent: f32,
    pub fresnel_reflect_fraction: f32,
    /// 0 = glow включён, 1 = выключен
    pub glow_blend_alpha: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemTimer {
    InterpFinished,
    PulseReset,
    ThrowFinished,
    SlideFinished,
}

#[derive(Debug, Clone)]
pub enum ItemKind {
    Weapon(WeaponData),
    Ammo(AmmoData),
}

/// Интерполяция к персонажу
#[derive(Debug, Clone, Default)]
pub(crate) struct InterpState {
    pub interping: bool,
    pub character: Option<Entity>,
    pub slot_index: usize,
    pub start_location: Vec3,
    pub yaw_offset: f32,
    pub handle: Option<TimerHandle>,
}

/// Pickup завершён: персонаж должен освободить slot и забрать item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishedInterp {
    pub character: Entity,
    pub slot_index: usize,
}

// ============================================================================
// Item
// ============================================================================

#[derive(Component, Debug, Clone)]
pub struct Item {
    pub name: String,
    /// Для ammo - количество патронов в пачке
    pub count: u32,
    rarity: ItemRarity,
    state: ItemState,
    properties: ItemProperties,
    properties_dirty: bool,
    pub kind: ItemKind,
    /// Слот в inventory персонажа
    pub slot_index: usize,
    /// Персонаж не может принять item (UI показывает)
    pub character_inventory_full: bool,
    pickup_widget_visible: bool,
    custom_depth_enabled: bool,
    can_change_custom_depth: bool,
    pub presentation: RarityPresentation,
    pub glow: GlowMaterial,
    pub pickup_sound: String,
    pub equip_sound: String,
    pub(crate) interp: InterpState,
    pub(crate) pulse_handle: Option<TimerHandle>,
    pub timers: Scheduler<ItemTimer>,
    pub(crate) tuning: Arc<ItemTuning>,
}

impl Item {
    /// Новый item в состоянии Pickup: rarity визуал применён, glow включён, pulse идёт
    pub fn new(
        name: impl Into<String>,
        rarity: ItemRarity,
        kind: ItemKind,
        tuning: Arc<ItemTuning>,
        rarities: &RarityTable,
    ) -> Self {
        let mut item = Self {
            name: name.into(),
            count: 0,
            rarity,
            state: ItemState::Pickup,
            properties: ItemProperties::for_state(ItemState::Pickup),
            properties_dirty: true,
            kind,
            slot_index: 0,
            character_inventory_full: false,
            pickup_widget_visible: false,
            custom_depth_enabled: false,
            can_change_custom_depth: true,
            presentation: RarityPresentation::default(),
            glow: GlowMaterial {
                glow_amount: tuning.glow_amount,
                fresnel_exponent: tuning.fresnel_exponent,
                fresnel_reflect_fraction: tuning.fresnel_reflect_fraction,
                glow_blend_alpha: 1.0,
            },
            pickup_sound: String::new(),
            equip_sound: String::new(),
            interp: InterpState::default(),
            pulse_handle: None,
            timers: Scheduler::new(),
            tuning,
        };

        item.apply_rarity(rarities);
        item.enable_glow_material();
        item.start_pulse_timer();
        item
    }

    fn apply_rarity(&mut self, rarities: &RarityTable) {
        let Some(row) = rarities.get(self.rarity) else {
            crate::logger::log_warning(&format!(
                "⚠️ Rarity {:?} not in table, '{}' keeps default visuals",
                self.rarity, self.name
            ));
            return;
        };

        let stars = usize::from(row.number_of_stars).min(5);
        let mut active_stars = [false; 5];
        for star in active_stars.iter_mut().take(stars) {
            *star = true;
        }

        self.presentation = RarityPresentation {
            active_stars,
            glow_color: row.glow_color,
            light_color: row.light_color,
            dark_color: row.dark_color,
            custom_depth_stencil: row.custom_depth_stencil,
        };
    }

    pub fn rarity(&self) -> ItemRarity {
        self.rarity
    }

    pub fn state(&self) -> ItemState {
        self.state
    }

    pub fn properties(&self) -> &ItemProperties {
        &self.properties
    }

    /// Единственная точка смены physics/collision/visibility
    pub fn set_state(&mut self, state: ItemState) {
        self.state = state;
        self.properties = ItemProperties::for_state(state);
        self.properties_dirty = true;

        if self.properties.hides_pickup_widget {
            self.pickup_widget_visible = false;
        }
        if state != ItemState::EquipInterping {
            self.interp.interping = false;
        }
    }

    /// Забирает флаг "properties изменились с последней публикации"
    pub fn take_properties_dirty(&mut self) -> bool {
        std::mem::take(&mut self.properties_dirty)
    }

    pub fn properties_dirty(&self) -> bool {
        self.properties_dirty
    }

    pub fn is_weapon(&self) -> bool {
        matches!(self.kind, ItemKind::Weapon(_))
    }

    pub fn is_ammo(&self) -> bool {
        matches!(self.kind, ItemKind::Ammo(_))
    }

    pub fn is_interping(&self) -> bool {
        self.interp.interping
    }

    /// Персонаж, к которому летит/принадлежит item
    pub fn character(&self) -> Option<Entity> {
        self.interp.character
    }

    /// Interp slot, зарезервированный на время полёта
    pub fn interp_slot(&self) -> usize {
        self.interp.slot_index
    }

    pub fn pickup_widget_visible(&self) -> bool {
        self.pickup_widget_visible
    }

    /// Игнорируется, если текущее состояние прячет widget
    pub fn set_pickup_widget_visible(&mut self, visible: bool) {
        self.pickup_widget_visible = visible && !self.properties.hides_pickup_widget;
    }

    pub fn custom_depth_enabled(&self) -> bool {
        self.custom_depth_enabled
    }

    pub fn can_change_custom_depth(&self) -> bool {
        self.can_change_custom_depth
    }

    pub(crate) fn set_can_change_custom_depth(&mut self, can_change: bool) {
        self.can_change_custom_depth = can_change;
    }

    pub fn enable_custom_depth(&mut self) {
        if self.can_change_custom_depth {
            self.custom_depth_enabled = true;
        }
    }

    pub fn disable_custom_depth(&mut self) {
        if self.can_change_custom_depth {
            self.custom_depth_enabled = false;
        }
    }

    pub fn enable_glow_material(&mut self) {
        self.glow.glow_blend_alpha = 0.0;
    }

    pub fn disable_glow_material(&mut self) {
        self.glow.glow_blend_alpha = 1.0;
    }

    pub fn glow_enabled(&self) -> bool {
        self.glow.glow_blend_alpha < 0.5
    }

    pub fn tuning(&self) -> &ItemTuning {
        &self.tuning
    }

    /// Обрабатывает сработавшие таймеры. Возвращает завершённый pickup, если был.
    pub fn advance_timers(&mut self, transform: &mut Transform, delta: f32) -> Option<FinishedInterp> {
        let mut finished = None;

        for timer in self.timers.tick(delta) {
            match timer {
                ItemTimer::InterpFinished => {
                    self.interp.handle = None;
                    finished = self.finish_interping(transform);
                }
                ItemTimer::PulseReset => {
                    self.pulse_handle = None;
                    self.start_pulse_timer();
                }
                ItemTimer::ThrowFinished => self.stop_falling(),
                ItemTimer::SlideFinished => {
                    if let Some(weapon) = self.weapon_mut() {
                        weapon.finish_slide();
                    }
                }
            }
        }

        finished
    }
}

/// Yaw (градусы) из rotation, Z-up
pub fn yaw_degrees(rotation: Quat) -> f32 {
    let (yaw, _, _) = rotation.to_euler(EulerRot::ZYX);
    yaw.to_degrees()
}
