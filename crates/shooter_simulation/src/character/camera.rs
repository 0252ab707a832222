//! Camera rig + locomotion state.
//!
//! Камера и движение - внешние системы (рендер/physics), ядро хранит только то,
//! что влияет на бой: FOV zoom, look rates, скорость/airborne для spread, crouch capsule.

use bevy::prelude::*;

use crate::config::CharacterConfig;
use crate::curves::finterp_to;
use crate::items::yaw_degrees;

const MAX_PITCH_DEGREES: f32 = 89.0;

/// Follow camera (spring arm за плечом)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct CameraRig {
    pub position: Vec3,
    pub rotation: Quat,
    /// Смещение от персонажа в его yaw-пространстве (назад, вбок, вверх)
    pub boom_offset: Vec3,
    pub default_fov: f32,
    pub current_fov: f32,
    /// Gamepad rates (deg/sec), переключаются hip ↔ aiming
    pub base_turn_rate: f32,
    pub base_look_up_rate: f32,
}

impl CameraRig {
    pub fn new(default_fov: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            boom_offset: Vec3::new(-180.0, 50.0, 70.0),
            default_fov,
            current_fov: default_fov,
            base_turn_rate: 45.0,
            base_look_up_rate: 45.0,
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn yaw_degrees(&self) -> f32 {
        yaw_degrees(self.rotation)
    }

    pub fn pitch_degrees(&self) -> f32 {
        let (_, pitch, _) = self.rotation.to_euler(EulerRot::ZYX);
        // +Y rotation опускает X вниз, наружу отдаём "вверх = плюс"
        -pitch.to_degrees()
    }

    /// Позиция камеры следует за персонажем
    pub fn follow(&mut self, character_location: Vec3) {
        let yaw = Quat::from_rotation_z(self.yaw_degrees().to_radians());
        self.position = character_location + yaw * self.boom_offset;
    }

    pub fn interp_zoom(&mut self, aiming: bool, delta: f32, config: &CharacterConfig) {
        let target = if aiming {
            config.camera_zoomed_fov
        } else {
            self.default_fov
        };
        self.current_fov = finterp_to(self.current_fov, target, delta, config.zoom_interp_speed);
    }

    pub fn set_look_rates(&mut self, aiming: bool, config: &CharacterConfig) {
        if aiming {
            self.base_turn_rate = config.aiming_turn_rate;
            self.base_look_up_rate = config.aiming_look_up_rate;
        } else {
            self.base_turn_rate = config.hip_turn_rate;
            self.base_look_up_rate = config.hip_look_up_rate;
        }
    }

    /// Gamepad: rate ∈ [-1, 1] (доля от максимальной скорости)
    pub fn turn_at_rate(&mut self, rate: f32, delta: f32) {
        self.add_yaw(rate * self.base_turn_rate * delta);
    }

    pub fn look_up_at_rate(&mut self, rate: f32, delta: f32) {
        self.add_pitch(rate * self.base_look_up_rate * delta);
    }

    /// Mouse: value уже в градусах, масштабируем по aiming
    pub fn turn(&mut self, value: f32, aiming: bool, config: &CharacterConfig) {
        let scale = if aiming {
            config.mouse_aiming_turn_rate
        } else {
            config.mouse_hip_turn_rate
        };
        self.add_yaw(value * scale);
    }

    pub fn look_up(&mut self, value: f32, aiming: bool, config: &CharacterConfig) {
        let scale = if aiming {
            config.mouse_aiming_look_up_rate
        } else {
            config.mouse_hip_look_up_rate
        };
        self.add_pitch(value * scale);
    }

    pub fn add_yaw(&mut self, degrees: f32) {
        self.rotation = (Quat::from_rotation_z(degrees.to_radians()) * self.rotation).normalize();
    }

    /// Положительное значение - взгляд вверх. Pitch зажат в ±89°.
    pub fn add_pitch(&mut self, degrees: f32) {
        let yaw = self.yaw_degrees();
        let pitch = (self.pitch_degrees() + degrees).clamp(-MAX_PITCH_DEGREES, MAX_PITCH_DEGREES);
        self.rotation = Quat::from_euler(EulerRot::ZYX, yaw.to_radians(), -pitch.to_radians(), 0.0);
    }
}

/// Состояние движения (velocity/airborne пишет physics хоста)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Locomotion {
    pub velocity: Vec3,
    pub airborne: bool,
    pub crouching: bool,
    pub max_walk_speed: f32,
    pub ground_friction: f32,
    pub capsule_half_height: f32,
    /// Компенсация mesh'а при изменении капсулы (ноги остаются на земле)
    pub mesh_offset_z: f32,
}

impl Locomotion {
    pub fn new(config: &CharacterConfig) -> Self {
        Self {
            velocity: Vec3::ZERO,
            airborne: false,
            crouching: false,
            max_walk_speed: config.base_movement_speed,
            ground_friction: config.base_ground_friction,
            capsule_half_height: config.standing_capsule_half_height,
            mesh_offset_z: 0.0,
        }
    }

    /// Скорость по земле (без Z)
    pub fn ground_speed(&self) -> f32 {
        Vec2::new(self.velocity.x, self.velocity.y).length()
    }

    /// Toggle crouch (в воздухе нельзя), скорость/трение пересчитываются всегда
    pub fn crouch_button_pressed(&mut self, config: &CharacterConfig) {
        if !self.airborne {
            self.crouching = !self.crouching;
        }

        if self.crouching {
            self.max_walk_speed = config.crouch_movement_speed;
            self.ground_friction = config.crouching_ground_friction;
        } else {
            self.max_walk_speed = config.base_movement_speed;
            self.ground_friction = config.base_ground_friction;
        }
    }

    /// Из crouch - встаём вместо прыжка. true = нужен физический прыжок.
    pub fn jump(&mut self, config: &CharacterConfig) -> bool {
        if self.crouching {
            self.crouching = false;
            self.max_walk_speed = config.base_movement_speed;
            return false;
        }
        true
    }

    pub fn interp_capsule_half_height(&mut self, delta: f32, config: &CharacterConfig) {
        let target = if self.crouching {
            config.crouching_capsule_half_height
        } else {
            config.standing_capsule_half_height
        };

        let interp_half_height = finterp_to(
            self.capsule_half_height,
            target,
            delta,
            config.capsule_interp_speed,
        );
        // Crouch: delta < 0 → mesh поднимается на столько же
        let delta_half_height = interp_half_height - self.capsule_half_height;
        self.mesh_offset_z -= delta_half_height;
        self.capsule_half_height = interp_half_height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_converges_to_zoomed_fov() {
        let config = CharacterConfig::default();
        let mut camera = CameraRig::new(config.camera_default_fov);

        for _ in 0..120 {
            camera.interp_zoom(true, 1.0 / 60.0, &config);
        }
        assert!((camera.current_fov - config.camera_zoomed_fov).abs() < 0.01);

        for _ in 0..120 {
            camera.interp_zoom(false, 1.0 / 60.0, &config);
        }
        assert!((camera.current_fov - config.camera_default_fov).abs() < 0.01);
    }

    #[test]
    fn test_look_rates_switch_with_aiming() {
        let config = CharacterConfig::default();
        let mut camera = CameraRig::new(90.0);

        camera.set_look_rates(true, &config);
        assert_eq!(camera.base_turn_rate, 20.0);

        camera.set_look_rates(false, &config);
        assert_eq!(camera.base_turn_rate, 90.0);
        assert_eq!(camera.base_look_up_rate, 90.0);
    }

    #[test]
    fn test_turn_and_pitch() {
        let config = CharacterConfig::default();
        let mut camera = CameraRig::new(90.0);

        camera.turn(90.0, false, &config);
        assert!((camera.yaw_degrees() - 90.0).abs() < 1e-3);

        // Aiming mouse scale 0.6
        camera.turn(10.0, true, &config);
        assert!((camera.yaw_degrees() - 96.0).abs() < 1e-3);

        camera.add_pitch(200.0);
        assert!((camera.pitch_degrees() - MAX_PITCH_DEGREES).abs() < 1e-2);
        assert!((camera.yaw_degrees() - 96.0).abs() < 1e-2);
        assert!(camera.forward().z > 0.9);
    }

    #[test]
    fn test_follow_uses_boom_offset() {
        let mut camera = CameraRig::new(90.0);
        camera.follow(Vec3::new(100.0, 0.0, 0.0));
        assert!((camera.position - Vec3::new(-80.0, 50.0, 70.0)).length() < 1e-3);
    }

    #[test]
    fn test_crouch_toggle_blocked_in_air() {
        let config = CharacterConfig::default();
        let mut locomotion = Locomotion::new(&config);

        locomotion.airborne = true;
        locomotion.crouch_button_pressed(&config);
        assert!(!locomotion.crouching);

        locomotion.airborne = false;
        locomotion.crouch_button_pressed(&config);
        assert!(locomotion.crouching);
        assert_eq!(locomotion.max_walk_speed, 300.0);
        assert_eq!(locomotion.ground_friction, 100.0);

        // Прыжок из crouch только встаёт
        assert!(!locomotion.jump(&config));
        assert!(!locomotion.crouching);
        assert_eq!(locomotion.max_walk_speed, 650.0);
        assert!(locomotion.jump(&config));
    }

    #[test]
    fn test_capsule_interp_compensates_mesh() {
        let config = CharacterConfig::default();
        let mut locomotion = Locomotion::new(&config);
        locomotion.crouching = true;

        for _ in 0..120 {
            locomotion.interp_capsule_half_height(1.0 / 60.0, &config);
        }

        assert!((locomotion.capsule_half_height - 44.0).abs() < 0.01);
        // Капсула уменьшилась на 44 → mesh поднят на 44
        assert!((locomotion.mesh_offset_z - 44.0).abs() < 0.01);
    }
}
