//! Tuning constants для controller'ов.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::curves::{FloatCurve, VectorCurve};

// ============================================================================
// Item
// ============================================================================

/// Кривые item'а (pickup arc, scale, glow pulse, pistol slide)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemCurves {
    /// Z offset во время pickup interp (множитель вертикальной дельты)
    pub item_z: FloatCurve,
    /// Uniform scale во время interp (None = scale не трогаем)
    pub item_scale: Option<FloatCurve>,
    /// (glow amount, fresnel exponent, fresnel reflect fraction) множители в Pickup
    pub pulse: VectorCurve,
    /// То же во время EquipInterping
    pub interp_pulse: VectorCurve,
    /// Pistol slide: 0..1, масштабируется max displacement / max recoil
    pub slide_displacement: FloatCurve,
}

impl Default for ItemCurves {
    fn default() -> Self {
        Self {
            item_z: FloatCurve::new([(0.0, 0.0), (0.35, 1.4), (0.7, 1.0)]),
            item_scale: None,
            pulse: VectorCurve::new([
                (0.0, Vec3::new(0.2, 1.0, 1.0)),
                (2.5, Vec3::new(1.0, 0.4, 0.6)),
                (5.0, Vec3::new(0.2, 1.0, 1.0)),
            ]),
            interp_pulse: VectorCurve::new([
                (0.0, Vec3::new(1.0, 1.0, 1.0)),
                (0.7, Vec3::new(3.0, 0.2, 0.3)),
            ]),
            slide_displacement: FloatCurve::new([(0.0, 0.0), (0.05, 1.0), (0.2, 0.0)]),
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemTuning {
    /// Длительность pickup interp
    pub z_curve_time: f32,
    /// Период idle pulse
    pub pulse_curve_time: f32,
    pub glow_amount: f32,
    pub fresnel_exponent: f32,
    pub fresnel_reflect_fraction: f32,
    /// Скорость XY сглаживания к anchor
    pub interp_speed: f32,
    pub throw_weapon_time: f32,
    pub throw_impulse: f32,
    /// Поворот right-vector вокруг forward при броске (градусы)
    pub throw_roll_degrees: f32,
    /// Случайный поворот вокруг world up: [0, max] градусов
    pub throw_max_yaw_degrees: f32,
    pub slide_displacement_time: f32,
    pub max_slide_displacement: f32,
    pub max_recoil_rotation: f32,
    pub curves: ItemCurves,
}

impl Default for ItemTuning {
    fn default() -> Self {
        Self {
            z_curve_time: 0.7,
            pulse_curve_time: 5.0,
            glow_amount: 150.0,
            fresnel_exponent: 3.0,
            fresnel_reflect_fraction: 4.0,
            interp_speed: 30.0,
            throw_weapon_time: 0.7,
            throw_impulse: 20_000.0,
            throw_roll_degrees: -20.0,
            throw_max_yaw_degrees: 30.0,
            slide_displacement_time: 0.2,
            max_slide_displacement: 4.0,
            max_recoil_rotation: 20.0,
            curves: ItemCurves::default(),
        }
    }
}

impl ItemTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("item.z_curve_time", self.z_curve_time)?;
        positive("item.pulse_curve_time", self.pulse_curve_time)?;
        positive("item.throw_weapon_time", self.throw_weapon_time)?;
        positive("item.slide_displacement_time", self.slide_displacement_time)?;

        self.curves.item_z.validate("item_z")?;
        if let Some(scale) = &self.curves.item_scale {
            scale.validate("item_scale")?;
        }
        self.curves.pulse.validate("pulse")?;
        self.curves.interp_pulse.validate("interp_pulse")?;
        self.curves.slide_displacement.validate("slide_displacement")?;
        Ok(())
    }
}

// ============================================================================
// Character
// ============================================================================

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterConfig {
    // Look rates (deg/sec) для gamepad и множители для мыши
    pub hip_turn_rate: f32,
    pub hip_look_up_rate: f32,
    pub aiming_turn_rate: f32,
    pub aiming_look_up_rate: f32,
    pub mouse_hip_turn_rate: f32,
    pub mouse_hip_look_up_rate: f32,
    pub mouse_aiming_turn_rate: f32,
    pub mouse_aiming_look_up_rate: f32,

    // Camera zoom
    pub camera_default_fov: f32,
    pub camera_zoomed_fov: f32,
    pub zoom_interp_speed: f32,

    // Movement / crouch
    pub base_movement_speed: f32,
    pub crouch_movement_speed: f32,
    pub standing_capsule_half_height: f32,
    pub crouching_capsule_half_height: f32,
    pub capsule_interp_speed: f32,
    pub base_ground_friction: f32,
    pub crouching_ground_friction: f32,

    // Crosshair
    /// Окно после выстрела, когда shooting factor тянется к 0.3
    pub shoot_time_duration: f32,
    /// Ground speed, соответствующая velocity factor = 1
    pub max_spread_ground_speed: f32,

    // Sounds
    pub pickup_sound_reset_time: f32,
    pub equip_sound_reset_time: f32,

    // Inventory / traces
    pub inventory_capacity: usize,
    pub trace_range: f32,
    /// Второй луч (от muzzle) идёт на 1.25 × дистанции до точки первого попадания
    pub beam_overshoot: f32,
    pub starting_9mm_ammo: u32,
    pub starting_ar_ammo: u32,

    // Animation cues
    pub hand_socket: String,
    pub hip_fire_montage: String,
    pub hip_fire_section: String,
    pub reload_montage: String,
    pub equip_montage: String,
    pub equip_section: String,

    // FX
    pub muzzle_flash_effect: String,
    pub impact_effect: String,
    pub beam_effect: String,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            hip_turn_rate: 90.0,
            hip_look_up_rate: 90.0,
            aiming_turn_rate: 20.0,
            aiming_look_up_rate: 20.0,
            mouse_hip_turn_rate: 1.0,
            mouse_hip_look_up_rate: 1.0,
            mouse_aiming_turn_rate: 0.6,
            mouse_aiming_look_up_rate: 0.6,
            camera_default_fov: 90.0,
            camera_zoomed_fov: 25.0,
            zoom_interp_speed: 20.0,
            base_movement_speed: 650.0,
            crouch_movement_speed: 300.0,
            standing_capsule_half_height: 88.0,
            crouching_capsule_half_height: 44.0,
            capsule_interp_speed: 20.0,
            base_ground_friction: 2.0,
            crouching_ground_friction: 100.0,
            shoot_time_duration: 0.05,
            max_spread_ground_speed: 600.0,
            pickup_sound_reset_time: 0.2,
            equip_sound_reset_time: 0.2,
            inventory_capacity: 6,
            trace_range: 50_000.0,
            beam_overshoot: 1.25,
            starting_9mm_ammo: 85,
            starting_ar_ammo: 120,
            hand_socket: "RightHandSocket".to_string(),
            hip_fire_montage: "HipFireMontage".to_string(),
            hip_fire_section: "StartFire".to_string(),
            reload_montage: "ReloadMontage".to_string(),
            equip_montage: "EquipMontage".to_string(),
            equip_section: "Equip".to_string(),
            muzzle_flash_effect: "MuzzleFlash".to_string(),
            impact_effect: "ImpactParticles".to_string(),
            beam_effect: "BeamParticles".to_string(),
        }
    }
}

impl CharacterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.inventory_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "character.inventory_capacity",
                reason: "inventory needs at least one slot".to_string(),
            });
        }
        positive("character.trace_range", self.trace_range)?;
        positive("character.max_spread_ground_speed", self.max_spread_ground_speed)?;
        if self.beam_overshoot < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "character.beam_overshoot",
                reason: format!("{} would stop short of the crosshair hit", self.beam_overshoot),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Enemy
// ============================================================================

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub max_health: f32,
    pub health_bar_display_time: f32,
    pub hit_react_time_min: f32,
    pub hit_react_time_max: f32,
    pub hit_number_destroy_time: f32,
    /// Вероятность hit react на попадание, [0, 1]
    pub stun_chance: f32,
    pub base_damage: f32,

    pub hit_montage: String,
    pub hit_react_section: String,
    pub attack_montage: String,
    /// Варианты секций атаки, выбираются равновероятно
    pub attack_sections: Vec<String>,
    pub left_weapon_socket: String,
    pub right_weapon_socket: String,
    pub head_bone: String,

    /// Patrol points в локальных координатах enemy
    pub patrol_point: Vec3,
    pub patrol_point_2: Vec3,

    pub impact_sound: String,
    pub impact_effect: String,
    pub melee_impact_sound: String,
    pub blood_effect: String,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            health_bar_display_time: 4.0,
            hit_react_time_min: 0.5,
            hit_react_time_max: 3.0,
            hit_number_destroy_time: 1.5,
            stun_chance: 0.5,
            base_damage: 20.0,
            hit_montage: "HitMontage".to_string(),
            hit_react_section: "HitReactFront".to_string(),
            attack_montage: "AttackMontage".to_string(),
            attack_sections: vec![
                "AttackLFast".to_string(),
                "AttackRFast".to_string(),
                "AttackL".to_string(),
                "AttackR".to_string(),
            ],
            left_weapon_socket: "FX_Trail_L_01".to_string(),
            right_weapon_socket: "FX_Trail_R_01".to_string(),
            head_bone: "head".to_string(),
            patrol_point: Vec3::new(500.0, 0.0, 0.0),
            patrol_point_2: Vec3::new(-500.0, 0.0, 0.0),
            impact_sound: "EnemyImpact".to_string(),
            impact_effect: "EnemyImpactParticles".to_string(),
            melee_impact_sound: "MeleeImpact".to_string(),
            blood_effect: "BloodParticles".to_string(),
        }
    }
}

impl EnemyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("enemy.max_health", self.max_health)?;
        if !(0.0..=1.0).contains(&self.stun_chance) {
            return Err(ConfigError::InvalidValue {
                field: "enemy.stun_chance",
                reason: format!("{} is not a probability", self.stun_chance),
            });
        }
        if self.hit_react_time_min < 0.0 || self.hit_react_time_min > self.hit_react_time_max {
            return Err(ConfigError::InvalidValue {
                field: "enemy.hit_react_time",
                reason: format!(
                    "window [{}, {}] is empty",
                    self.hit_react_time_min, self.hit_react_time_max
                ),
            });
        }
        if self.attack_sections.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "enemy.attack_sections",
                reason: "at least one attack section required".to_string(),
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            reason: format!("{} must be > 0", value),
        })
    }
}
