//! Weapon payload: ammo, throw, pistol slide.
//!
//! Инвариант: `0 <= ammo <= magazine_capacity`. `reload_ammo` сверх ёмкости -
//! баг вызывающего (он обязан посчитать `min(empty_space, carried)`), поэтому panic.

use std::sync::Arc;

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{ItemTuning, RarityTable, WeaponRow};
use crate::curves::SampledCurve;
use crate::items::ammo::AmmoType;
use crate::items::components::{yaw_degrees, Item, ItemKind, ItemRarity, ItemState, ItemTimer};
use crate::timer::TimerHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum WeaponType {
    #[default]
    SubmachineGun,
    AssaultRifle,
    Pistol,
}

/// Pistol slide/recoil
#[derive(Debug, Clone, Default)]
pub struct SlideState {
    pub moving: bool,
    pub displacement: f32,
    pub recoil_rotation: f32,
    handle: Option<TimerHandle>,
}

#[derive(Debug, Clone)]
pub struct WeaponData {
    ammo: u32,
    magazine_capacity: u32,
    pub weapon_type: WeaponType,
    pub ammo_type: AmmoType,
    pub reload_montage_section: String,
    pub clip_bone_name: String,
    pub bone_to_hide: String,
    pub material_index: i32,
    pub auto_fire_rate: f32,
    pub automatic: bool,
    pub damage: f32,
    pub headshot_damage: f32,
    pub fire_sound: String,
    pub muzzle_offset: Vec3,
    /// Летит после броска (держим upright)
    pub falling: bool,
    /// Обойма в руке во время reload (grab/release clip notifies)
    pub moving_clip: bool,
    pub slide: SlideState,
    throw_handle: Option<TimerHandle>,
}

impl WeaponData {
    pub fn from_row(row: &WeaponRow) -> Self {
        Self {
            ammo: row.weapon_ammo.min(row.magazine_capacity),
            magazine_capacity: row.magazine_capacity,
            weapon_type: row.weapon_type,
            ammo_type: row.ammo_type,
            reload_montage_section: row.reload_montage_section.clone(),
            clip_bone_name: row.clip_bone_name.clone(),
            bone_to_hide: row.bone_to_hide.clone(),
            material_index: row.material_index,
            auto_fire_rate: row.auto_fire_rate,
            automatic: row.automatic,
            damage: row.damage,
            headshot_damage: row.headshot_damage,
            fire_sound: row.fire_sound.clone(),
            muzzle_offset: row.muzzle_offset,
            falling: false,
            moving_clip: false,
            slide: SlideState::default(),
            throw_handle: None,
        }
    }

    pub fn ammo(&self) -> u32 {
        self.ammo
    }

    pub fn magazine_capacity(&self) -> u32 {
        self.magazine_capacity
    }

    pub fn decrement_ammo(&mut self) {
        self.ammo = self.ammo.saturating_sub(1);
    }

    /// Panics если `ammo + amount > magazine_capacity`
    pub fn reload_ammo(&mut self, amount: u32) {
        assert!(
            self.ammo
                .checked_add(amount)
                .is_some_and(|total| total <= self.magazine_capacity),
            "attempted to reload {} rounds into {}/{} magazine",
            amount,
            self.ammo,
            self.magazine_capacity
        );
        self.ammo += amount;
    }

    pub fn clip_is_full(&self) -> bool {
        self.ammo >= self.magazine_capacity
    }

    pub fn magazine_empty_space(&self) -> u32 {
        self.magazine_capacity.saturating_sub(self.ammo)
    }

    pub fn is_pistol(&self) -> bool {
        self.weapon_type == WeaponType::Pistol
    }

    pub(crate) fn finish_slide(&mut self) {
        self.slide.moving = false;
        self.slide.handle = None;
        self.slide.displacement = 0.0;
        self.slide.recoil_rotation = 0.0;
    }
}

impl Item {
    pub fn new_weapon(
        row: &WeaponRow,
        rarity: ItemRarity,
        tuning: Arc<ItemTuning>,
        rarities: &RarityTable,
    ) -> Self {
        let mut item = Item::new(
            row.item_name.clone(),
            rarity,
            ItemKind::Weapon(WeaponData::from_row(row)),
            tuning,
            rarities,
        );
        item.pickup_sound = row.pickup_sound.clone();
        item.equip_sound = row.equip_sound.clone();
        item
    }

    pub fn weapon(&self) -> Option<&WeaponData> {
        match &self.kind {
            ItemKind::Weapon(weapon) => Some(weapon),
            ItemKind::Ammo(_) => None,
        }
    }

    pub fn weapon_mut(&mut self) -> Option<&mut WeaponData> {
        match &mut self.kind {
            ItemKind::Weapon(weapon) => Some(weapon),
            ItemKind::Ammo(_) => None,
        }
    }

    /// Бросок при drop. Возвращает impulse для physics (None для не-оружия).
    pub fn throw_weapon(&mut self, transform: &mut Transform, rng: &mut impl Rng) -> Option<Vec3> {
        if !self.is_weapon() {
            return None;
        }

        // Только yaw: pitch/roll сбрасываем перед броском
        transform.rotation = Quat::from_rotation_z(yaw_degrees(transform.rotation).to_radians());
        let forward = transform.rotation * Vec3::X;
        let right = transform.rotation * Vec3::Y;

        let tuning = &self.tuning;
        let mut direction = Quat::from_axis_angle(forward, tuning.throw_roll_degrees.to_radians()) * right;
        let max_yaw = tuning.throw_max_yaw_degrees.max(0.0);
        let random_yaw: f32 = rng.gen_range(0.0..=max_yaw);
        direction = Quat::from_axis_angle(Vec3::Z, random_yaw.to_radians()) * direction;
        let impulse = direction * tuning.throw_impulse;
        let throw_time = tuning.throw_weapon_time;

        self.set_state(ItemState::Falling);
        if let ItemKind::Weapon(weapon) = &mut self.kind {
            weapon.falling = true;
            // Повторный бросок: старый таймер не должен приземлить item посреди полёта
            self.timers.clear(&mut weapon.throw_handle);
            weapon.throw_handle = Some(self.timers.schedule(throw_time, ItemTimer::ThrowFinished));
        }
        self.enable_glow_material();

        Some(impulse)
    }

    /// Подобран в полёте: landing таймер больше не нужен
    pub(crate) fn clear_throw_timer(&mut self) {
        if let ItemKind::Weapon(weapon) = &mut self.kind {
            self.timers.clear(&mut weapon.throw_handle);
        }
    }

    /// Приземлился: обратно в Pickup + pulse.
    /// Подобранный в полёте item уже не Falling, его state не трогаем.
    pub fn stop_falling(&mut self) {
        if let Some(weapon) = self.weapon_mut() {
            weapon.falling = false;
            weapon.throw_handle = None;
        }
        if self.state() != ItemState::Falling {
            return;
        }
        self.set_state(ItemState::Pickup);
        self.start_pulse_timer();
    }

    /// Пока падает - держим pure yaw
    pub fn keep_upright(&self, transform: &mut Transform) {
        let falling = self.weapon().is_some_and(|weapon| weapon.falling);
        if self.state() == ItemState::Falling && falling {
            transform.rotation = Quat::from_rotation_z(yaw_degrees(transform.rotation).to_radians());
        }
    }

    /// Pistol slide: таймер на slide_displacement_time
    pub fn start_slide_timer(&mut self) {
        let duration = self.tuning.slide_displacement_time;
        let ItemKind::Weapon(weapon) = &mut self.kind else {
            return;
        };
        weapon.slide.moving = true;
        self.timers.clear(&mut weapon.slide.handle);
        weapon.slide.handle = Some(self.timers.schedule(duration, ItemTimer::SlideFinished));
    }

    pub fn update_slide_displacement(&mut self) {
        let ItemKind::Weapon(weapon) = &mut self.kind else {
            return;
        };
        if !weapon.slide.moving {
            return;
        }
        let Some(elapsed) = weapon.slide.handle.and_then(|handle| self.timers.elapsed(handle)) else {
            return;
        };

        let curve_value = self.tuning.curves.slide_displacement.sample(elapsed);
        weapon.slide.displacement = curve_value * self.tuning.max_slide_displacement;
        weapon.slide.recoil_rotation = curve_value * self.tuning.max_recoil_rotation;
    }
}
