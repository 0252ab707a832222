//! EnemyCtx: mutable view на компоненты одного enemy.
//!
//! Та же схема, что у персонажа: системы собирают ctx из Query row,
//! тесты из `EnemyBundle`.

use bevy::ecs::query::QueryItem;
use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

use super::components::{
    Blackboard, Enemy, EnemyTimer, HitNumbers, MeleeWeaponBoxes, WeaponBoxSide,
};
use super::health_bar::{HealthBar, HealthBarPresenter};
use crate::config::EnemyConfig;
use crate::services::{BulletImpact, CharacterDamaged, EntityDied, Outbox, ScreenProjector, UiEvent};

pub type EnemyQueryData = (
    Entity,
    &'static mut Enemy,
    &'static mut Blackboard,
    &'static mut MeleeWeaponBoxes,
    &'static mut HitNumbers,
    &'static mut HealthBar,
    &'static Transform,
);

#[derive(Bundle, Debug)]
pub struct EnemyBundle {
    pub enemy: Enemy,
    pub blackboard: Blackboard,
    pub boxes: MeleeWeaponBoxes,
    pub hit_numbers: HitNumbers,
    pub health_bar: HealthBar,
}

impl EnemyBundle {
    pub fn new(config: &EnemyConfig, presenter: impl HealthBarPresenter) -> Self {
        Self {
            enemy: Enemy::new(config),
            blackboard: Blackboard::default(),
            boxes: MeleeWeaponBoxes::default(),
            hit_numbers: HitNumbers::default(),
            health_bar: HealthBar::new(presenter),
        }
    }

    pub fn as_ctx<'a>(
        &'a mut self,
        entity: Entity,
        location: Vec3,
        config: &'a EnemyConfig,
    ) -> EnemyCtx<'a> {
        EnemyCtx {
            entity,
            location,
            config,
            enemy: &mut self.enemy,
            blackboard: &mut self.blackboard,
            boxes: &mut self.boxes,
            hit_numbers: &mut self.hit_numbers,
            health_bar: &mut self.health_bar,
        }
    }
}

pub struct EnemyCtx<'a> {
    pub entity: Entity,
    pub location: Vec3,
    pub config: &'a EnemyConfig,
    pub enemy: &'a mut Enemy,
    pub blackboard: &'a mut Blackboard,
    pub boxes: &'a mut MeleeWeaponBoxes,
    pub hit_numbers: &'a mut HitNumbers,
    pub health_bar: &'a mut HealthBar,
}

impl<'a> EnemyCtx<'a> {
    pub fn from_row(row: QueryItem<'a, EnemyQueryData>, config: &'a EnemyConfig) -> Self {
        let (entity, enemy, blackboard, boxes, hit_numbers, health_bar, transform) = row;
        Self {
            entity,
            location: transform.translation,
            config,
            enemy: enemy.into_inner(),
            blackboard: blackboard.into_inner(),
            boxes: boxes.into_inner(),
            hit_numbers: hit_numbers.into_inner(),
            health_bar: health_bar.into_inner(),
        }
    }

    // ========================================================================
    // Damage
    // ========================================================================

    /// Вычитает урон (health не уходит ниже 0). Возвращает применённый урон.
    pub fn take_damage(&mut self, amount: f32, instigator: Option<Entity>, outbox: &mut Outbox) -> f32 {
        if self.enemy.dead {
            return 0.0;
        }

        let applied = amount.max(0.0).min(self.enemy.health);
        self.enemy.health -= applied;

        if self.enemy.health <= 0.0 {
            self.die(instigator, outbox);
        }
        applied
    }

    /// Die срабатывает ровно один раз
    pub fn die(&mut self, killer: Option<Entity>, outbox: &mut Outbox) {
        if self.enemy.dead {
            return;
        }
        self.enemy.dead = true;
        self.enemy.health = 0.0;
        self.hide_health_bar();
        self.set_in_attack_range(false);
        self.boxes.set_active(WeaponBoxSide::Left, false);
        self.boxes.set_active(WeaponBoxSide::Right, false);

        outbox.died.push(EntityDied {
            entity: self.entity,
            killer,
        });
        crate::logger::log_info(&format!(
            "💀 Enemy {:?} died (killer: {:?})",
            self.entity, killer
        ));
    }

    /// Попадание пули: звук + эффект, health bar, бросок на hit react
    pub fn bullet_hit(&mut self, hit_location: Vec3, rng: &mut impl Rng, outbox: &mut Outbox) {
        outbox.play_sound(self.entity, self.config.impact_sound.clone(), Some(self.location));
        outbox.spawn_effect(self.config.impact_effect.clone(), hit_location, None);

        if self.enemy.dead {
            return;
        }
        self.show_health_bar();

        // [0, 1): chance 0 никогда, chance 1 всегда
        let roll: f32 = rng.gen();
        if roll < self.config.stun_chance {
            let section = self.config.hit_react_section.clone();
            self.play_hit_montage(&section, 1.0, rng, outbox);
        }
    }

    /// Полная обработка пули: headshot → bullet_hit → урон → hit number
    pub fn receive_bullet(
        &mut self,
        impact: &BulletImpact,
        rng: &mut impl Rng,
        outbox: &mut Outbox,
    ) -> f32 {
        let headshot = impact.bone.as_deref() == Some(self.config.head_bone.as_str());
        let damage = if headshot {
            impact.headshot_damage
        } else {
            impact.damage
        };

        let was_dead = self.enemy.dead;
        self.bullet_hit(impact.location, rng, outbox);
        if was_dead {
            return 0.0;
        }

        let applied = self.take_damage(damage, Some(impact.shooter), outbox);
        self.store_hit_number(damage, impact.location, headshot, outbox);

        crate::logger::log(&format!(
            "🎯 Enemy {:?} hit for {} ({}), health {}/{}",
            self.entity,
            damage,
            if headshot { "headshot" } else { "body" },
            self.enemy.health,
            self.enemy.max_health
        ));
        applied
    }

    // ========================================================================
    // Hit react / stun
    // ========================================================================

    /// Hit react montage. После него реакции закрыты на случайное время
    /// из [hit_react_time_min, hit_react_time_max].
    pub fn play_hit_montage(
        &mut self,
        section: &str,
        play_rate: f32,
        rng: &mut impl Rng,
        outbox: &mut Outbox,
    ) -> bool {
        if !self.enemy.can_hit_react || self.enemy.dead {
            return false;
        }

        outbox.play_montage(self.entity, self.config.hit_montage.clone(), section, play_rate);
        self.set_stunned(true);
        self.enemy.can_hit_react = false;

        let reset_time = rng.gen_range(self.config.hit_react_time_min..=self.config.hit_react_time_max);
        self.enemy.timers.clear(&mut self.enemy.hit_react_handle);
        self.enemy.hit_react_handle = Some(
            self.enemy
                .timers
                .schedule(reset_time, EnemyTimer::ResetHitReact),
        );
        true
    }

    pub fn set_stunned(&mut self, stunned: bool) {
        self.enemy.stunned = stunned;
        self.blackboard.stunned = stunned;
    }

    /// Notify: hit react анимация закончилась
    pub fn end_hit_react(&mut self) {
        self.set_stunned(false);
    }

    // ========================================================================
    // Health bar
    // ========================================================================

    /// Показывает bar и перезапускает таймер скрытия
    pub fn show_health_bar(&mut self) {
        self.health_bar.show(self.entity);
        self.enemy.timers.clear(&mut self.enemy.health_bar_handle);
        self.enemy.health_bar_handle = Some(self.enemy.timers.schedule(
            self.config.health_bar_display_time,
            EnemyTimer::HideHealthBar,
        ));
    }

    pub fn hide_health_bar(&mut self) {
        self.enemy.timers.clear(&mut self.enemy.health_bar_handle);
        self.health_bar.hide(self.entity);
    }

    // ========================================================================
    // Hit numbers
    // ========================================================================

    pub fn store_hit_number(
        &mut self,
        damage: f32,
        location: Vec3,
        headshot: bool,
        outbox: &mut Outbox,
    ) -> u32 {
        let id = self.hit_numbers.store(damage, location, headshot);
        self.enemy.timers.schedule(
            self.config.hit_number_destroy_time,
            EnemyTimer::DestroyHitNumber(id),
        );
        outbox.ui.push(UiEvent::HitNumberShown {
            enemy: self.entity,
            id,
            damage,
            location,
            headshot,
        });
        id
    }

    pub fn destroy_hit_number(&mut self, id: u32, outbox: &mut Outbox) {
        if self.hit_numbers.remove(id).is_some() {
            outbox.ui.push(UiEvent::HitNumberRemoved {
                enemy: self.entity,
                id,
            });
        }
    }

    /// World → screen для живых hit numbers. Публикует только изменения,
    /// вне экрана оставляет прежнюю позицию.
    pub fn update_hit_numbers(&mut self, projector: &dyn ScreenProjector, outbox: &mut Outbox) {
        let entity = self.entity;
        for (id, entry) in self.hit_numbers.iter_mut() {
            let Some(screen) = projector.project(entry.location) else {
                continue;
            };
            if entry.screen == Some(screen) {
                continue;
            }
            entry.screen = Some(screen);
            outbox.ui.push(UiEvent::HitNumberMoved {
                enemy: entity,
                id,
                screen,
            });
        }
    }

    // ========================================================================
    // Blackboard / overlaps
    // ========================================================================

    /// Agro сфера: персонаж вошёл → target; вышел → target сбрасывается,
    /// если это был он.
    pub fn agro_overlap(&mut self, character: Entity, began: bool) {
        if began {
            if self.enemy.dead {
                return;
            }
            self.blackboard.target = Some(character);
            crate::logger::log(&format!(
                "👁️ Enemy {:?} targets {:?}",
                self.entity, character
            ));
        } else if self.blackboard.target == Some(character) {
            self.blackboard.target = None;
        }
    }

    pub fn combat_range_overlap(&mut self, began: bool) {
        self.set_in_attack_range(began && !self.enemy.dead);
    }

    fn set_in_attack_range(&mut self, in_range: bool) {
        self.enemy.in_attack_range = in_range;
        self.blackboard.in_attack_range = in_range;
    }

    /// Local patrol points → world, в blackboard
    pub fn publish_patrol_points(&mut self, transform: &Transform) {
        self.blackboard.patrol_point = transform.transform_point(self.config.patrol_point);
        self.blackboard.patrol_point_2 = transform.transform_point(self.config.patrol_point_2);
    }

    // ========================================================================
    // Melee
    // ========================================================================

    pub fn activate_weapon_box(&mut self, side: WeaponBoxSide) {
        self.boxes.set_active(side, true);
    }

    pub fn deactivate_weapon_box(&mut self, side: WeaponBoxSide) {
        self.boxes.set_active(side, false);
    }

    /// Weapon box задел персонажа. Урон только пока box активен.
    pub fn weapon_box_overlap(
        &mut self,
        side: WeaponBoxSide,
        victim: Entity,
        victim_location: Vec3,
        outbox: &mut Outbox,
    ) -> bool {
        if !self.boxes.is_active(side) || self.enemy.dead {
            return false;
        }

        outbox.damage.push(CharacterDamaged {
            victim,
            attacker: self.entity,
            amount: self.config.base_damage,
        });
        outbox.play_sound(
            self.entity,
            self.config.melee_impact_sound.clone(),
            Some(victim_location),
        );

        let socket = match side {
            WeaponBoxSide::Left => self.config.left_weapon_socket.clone(),
            WeaponBoxSide::Right => self.config.right_weapon_socket.clone(),
        };
        outbox.spawn_effect_at_socket(
            self.config.blood_effect.clone(),
            self.entity,
            socket,
            victim_location,
        );

        crate::logger::log(&format!(
            "🗡️ Enemy {:?} ({:?} box) hit {:?} for {}",
            self.entity, side, victim, self.config.base_damage
        ));
        true
    }

    /// Случайная секция атаки (равновероятно)
    pub fn attack_section_name(&self, rng: &mut impl Rng) -> Option<&'a str> {
        let config: &'a EnemyConfig = self.config;
        config.attack_sections.choose(rng).map(String::as_str)
    }

    pub fn play_attack_montage(&mut self, section: &str, play_rate: f32, outbox: &mut Outbox) {
        outbox.play_montage(
            self.entity,
            self.config.attack_montage.clone(),
            section,
            play_rate,
        );
    }

    /// Запрос атаки от behavior tree
    pub fn start_attack(&mut self, play_rate: f32, rng: &mut impl Rng, outbox: &mut Outbox) -> bool {
        if self.enemy.dead || self.enemy.stunned {
            return false;
        }
        let Some(section) = self.attack_section_name(rng) else {
            crate::logger::log_warning(&format!(
                "⚠️ Enemy {:?} has no attack sections",
                self.entity
            ));
            return false;
        };
        self.play_attack_montage(section, play_rate, outbox);
        true
    }

    // ========================================================================
    // Timers
    // ========================================================================

    pub fn advance_timers(&mut self, delta: f32, outbox: &mut Outbox) {
        for fired in self.enemy.timers.tick(delta) {
            match fired {
                EnemyTimer::HideHealthBar => {
                    self.enemy.health_bar_handle = None;
                    self.health_bar.hide(self.entity);
                }
                EnemyTimer::ResetHitReact => {
                    self.enemy.hit_react_handle = None;
                    self.enemy.can_hit_react = true;
                }
                EnemyTimer::DestroyHitNumber(id) => self.destroy_hit_number(id, outbox),
            }
        }
    }
}
