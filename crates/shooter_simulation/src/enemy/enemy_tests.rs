//! Tests for enemy controller + explosive.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    use bevy::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::super::{EnemyBundle, EnemyCtx, Explosive, HealthBarPresenter, WeaponBoxSide};
    use crate::config::EnemyConfig;
    use crate::services::{BulletImpact, Outbox, ScreenProjector, UiEvent};

    /// Пишет show/hide вызовы в общий лог
    #[derive(Clone, Default)]
    struct RecordingHealthBar {
        calls: Arc<Mutex<Vec<bool>>>,
    }

    impl RecordingHealthBar {
        fn calls(&self) -> Vec<bool> {
            self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
        }
    }

    impl HealthBarPresenter for RecordingHealthBar {
        fn show_health_bar(&mut self, _enemy: Entity) {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(true);
            }
        }

        fn hide_health_bar(&mut self, _enemy: Entity) {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(false);
            }
        }
    }

    struct FixedProjector(Vec2);

    impl ScreenProjector for FixedProjector {
        fn project(&self, _world: Vec3) -> Option<Vec2> {
            Some(self.0)
        }
    }

    fn enemy() -> Entity {
        Entity::from_raw(7)
    }

    fn shooter() -> Entity {
        Entity::from_raw(1)
    }

    struct Fixture {
        bundle: EnemyBundle,
        config: EnemyConfig,
        presenter: RecordingHealthBar,
        outbox: Outbox,
        rng: ChaCha8Rng,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_config(EnemyConfig::default())
        }

        fn with_config(config: EnemyConfig) -> Self {
            let presenter = RecordingHealthBar::default();
            Self {
                bundle: EnemyBundle::new(&config, presenter.clone()),
                config,
                presenter,
                outbox: Outbox::new(),
                rng: ChaCha8Rng::seed_from_u64(42),
            }
        }

        fn with_ctx<R>(
            &mut self,
            f: impl FnOnce(&mut EnemyCtx<'_>, &mut Outbox, &mut ChaCha8Rng) -> R,
        ) -> R {
            let mut ctx = self.bundle.as_ctx(enemy(), Vec3::ZERO, &self.config);
            f(&mut ctx, &mut self.outbox, &mut self.rng)
        }

        fn shoot(&mut self, bone: &str) -> f32 {
            let impact = impact(bone);
            self.with_ctx(|ctx, outbox, rng| ctx.receive_bullet(&impact, rng, outbox))
        }

        fn advance(&mut self, delta: f32) {
            self.with_ctx(|ctx, outbox, _| ctx.advance_timers(delta, outbox));
        }

        fn hit_react_montages(&self) -> usize {
            self.outbox
                .animations
                .iter()
                .filter(|anim| anim.montage == self.config.hit_montage)
                .count()
        }
    }

    fn impact(bone: &str) -> BulletImpact {
        BulletImpact {
            shooter: shooter(),
            target: Some(enemy()),
            location: Vec3::new(0.0, 0.0, 150.0),
            bone: Some(bone.to_string()),
            damage: 20.0,
            headshot_damage: 40.0,
        }
    }

    #[test]
    fn test_lethal_damage_dies_exactly_once() {
        let mut fixture = Fixture::new();
        assert_eq!(fixture.bundle.enemy.health, 100.0);

        let applied = fixture.with_ctx(|ctx, outbox, _| ctx.take_damage(150.0, Some(shooter()), outbox));
        assert_eq!(applied, 100.0);
        assert_eq!(fixture.bundle.enemy.health, 0.0);
        assert!(fixture.bundle.enemy.dead);
        assert_eq!(fixture.outbox.died.len(), 1);
        assert_eq!(fixture.outbox.died[0].killer, Some(shooter()));

        let applied = fixture.with_ctx(|ctx, outbox, _| ctx.take_damage(10.0, None, outbox));
        assert_eq!(applied, 0.0);
        assert_eq!(fixture.bundle.enemy.health, 0.0);
        assert_eq!(fixture.outbox.died.len(), 1);
    }

    #[test]
    fn test_partial_damage_keeps_enemy_alive() {
        let mut fixture = Fixture::new();
        fixture.with_ctx(|ctx, outbox, _| ctx.take_damage(30.0, None, outbox));

        assert_eq!(fixture.bundle.enemy.health, 70.0);
        assert!(!fixture.bundle.enemy.dead);
        assert!(fixture.outbox.died.is_empty());
    }

    #[test]
    fn test_headshot_uses_headshot_damage() {
        let mut fixture = Fixture::new();
        fixture.shoot("head");

        assert_eq!(fixture.bundle.enemy.health, 60.0);
        assert!(fixture.outbox.ui.iter().any(|event| matches!(
            event,
            UiEvent::HitNumberShown { damage, headshot: true, .. } if *damage == 40.0
        )));
        assert_eq!(fixture.outbox.sounds[0].cue, "EnemyImpact");
        assert_eq!(fixture.outbox.effects[0].effect, "EnemyImpactParticles");
    }

    #[test]
    fn test_body_shot_uses_base_damage() {
        let mut fixture = Fixture::new();
        fixture.shoot("spine_02");

        assert_eq!(fixture.bundle.enemy.health, 80.0);
        assert!(fixture.outbox.ui.iter().any(|event| matches!(
            event,
            UiEvent::HitNumberShown { headshot: false, .. }
        )));
    }

    #[test]
    fn test_guaranteed_stun_is_gated_by_reset_timer() {
        let mut fixture = Fixture::with_config(EnemyConfig {
            stun_chance: 1.0,
            max_health: 1000.0,
            ..Default::default()
        });

        fixture.shoot("spine_02");
        assert_eq!(fixture.hit_react_montages(), 1);
        assert_eq!(fixture.outbox.animations[0].section, "HitReactFront");
        assert!(fixture.bundle.enemy.stunned);
        assert!(fixture.bundle.blackboard.stunned);
        assert!(!fixture.bundle.enemy.can_hit_react);

        // Окно закрыто: вторая пуля без реакции
        fixture.shoot("spine_02");
        assert_eq!(fixture.hit_react_montages(), 1);

        fixture.with_ctx(|ctx, _, _| ctx.end_hit_react());
        assert!(!fixture.bundle.blackboard.stunned);

        fixture.advance(fixture.config.hit_react_time_max + 0.01);
        assert!(fixture.bundle.enemy.can_hit_react);

        fixture.shoot("spine_02");
        assert_eq!(fixture.hit_react_montages(), 2);
    }

    #[test]
    fn test_zero_stun_chance_never_reacts() {
        let mut fixture = Fixture::with_config(EnemyConfig {
            stun_chance: 0.0,
            max_health: 10_000.0,
            ..Default::default()
        });

        for _ in 0..50 {
            fixture.shoot("spine_02");
            fixture.advance(5.0);
        }
        assert_eq!(fixture.hit_react_montages(), 0);
        assert!(!fixture.bundle.enemy.stunned);
    }

    #[test]
    fn test_hit_react_window_is_random_within_bounds() {
        let mut fixture = Fixture::with_config(EnemyConfig {
            hit_react_time_min: 1.0,
            hit_react_time_max: 2.0,
            ..Default::default()
        });
        let section = fixture.config.hit_react_section.clone();
        assert!(fixture.with_ctx(|ctx, outbox, rng| ctx.play_hit_montage(&section, 1.0, rng, outbox)));

        fixture.advance(0.99);
        assert!(!fixture.bundle.enemy.can_hit_react);
        fixture.advance(1.02);
        assert!(fixture.bundle.enemy.can_hit_react);
    }

    #[test]
    fn test_health_bar_timer_restarts_on_each_hit() {
        let mut fixture = Fixture::new();

        fixture.shoot("spine_02");
        assert!(fixture.bundle.health_bar.visible());
        fixture.advance(3.0);

        fixture.shoot("spine_02");
        fixture.advance(3.0);
        assert!(fixture.bundle.health_bar.visible());

        fixture.advance(1.1);
        assert!(!fixture.bundle.health_bar.visible());
        assert_eq!(fixture.presenter.calls(), vec![true, true, false]);
    }

    #[test]
    fn test_hit_numbers_expire() {
        let mut fixture = Fixture::new();
        let id = fixture
            .with_ctx(|ctx, outbox, _| ctx.store_hit_number(25.0, Vec3::new(10.0, 0.0, 0.0), false, outbox));

        fixture.advance(1.4);
        assert!(fixture.bundle.hit_numbers.get(id).is_some());

        fixture.advance(0.2);
        assert!(fixture.bundle.hit_numbers.is_empty());
        assert!(fixture
            .outbox
            .ui
            .contains(&UiEvent::HitNumberRemoved { enemy: enemy(), id }));
    }

    #[test]
    fn test_hit_numbers_publish_only_screen_changes() {
        let mut fixture = Fixture::new();
        let id = fixture.with_ctx(|ctx, outbox, _| ctx.store_hit_number(25.0, Vec3::ZERO, false, outbox));
        fixture.outbox = Outbox::new();

        let projector = FixedProjector(Vec2::new(320.0, 240.0));
        fixture.with_ctx(|ctx, outbox, _| ctx.update_hit_numbers(&projector, outbox));
        fixture.with_ctx(|ctx, outbox, _| ctx.update_hit_numbers(&projector, outbox));

        assert_eq!(
            fixture.outbox.ui,
            vec![UiEvent::HitNumberMoved {
                enemy: enemy(),
                id,
                screen: Vec2::new(320.0, 240.0),
            }]
        );
    }

    #[test]
    fn test_melee_damages_only_while_box_active() {
        let mut fixture = Fixture::new();
        let victim = Entity::from_raw(2);
        let at = Vec3::new(50.0, 0.0, 0.0);

        assert!(!fixture.with_ctx(|ctx, outbox, _| ctx.weapon_box_overlap(WeaponBoxSide::Left, victim, at, outbox)));
        assert!(fixture.outbox.damage.is_empty());

        fixture.with_ctx(|ctx, _, _| ctx.activate_weapon_box(WeaponBoxSide::Left));
        assert!(fixture.with_ctx(|ctx, outbox, _| ctx.weapon_box_overlap(WeaponBoxSide::Left, victim, at, outbox)));
        // Правый box не активен
        assert!(!fixture.with_ctx(|ctx, outbox, _| ctx.weapon_box_overlap(WeaponBoxSide::Right, victim, at, outbox)));

        assert_eq!(fixture.outbox.damage.len(), 1);
        assert_eq!(fixture.outbox.damage[0].amount, 20.0);
        assert_eq!(fixture.outbox.damage[0].victim, victim);
        assert_eq!(fixture.outbox.sounds[0].cue, "MeleeImpact");
        let blood = &fixture.outbox.effects[0];
        assert_eq!(blood.effect, "BloodParticles");
        assert_eq!(
            blood.socket.as_ref().map(|socket| socket.socket.as_str()),
            Some("FX_Trail_L_01")
        );

        fixture.with_ctx(|ctx, _, _| ctx.deactivate_weapon_box(WeaponBoxSide::Left));
        assert!(!fixture.with_ctx(|ctx, outbox, _| ctx.weapon_box_overlap(WeaponBoxSide::Left, victim, at, outbox)));
    }

    #[test]
    fn test_attack_sections_are_all_reachable() {
        let mut fixture = Fixture::new();
        let mut seen = HashSet::new();

        for _ in 0..200 {
            let section = fixture.with_ctx(|ctx, _, rng| ctx.attack_section_name(rng).map(str::to_string));
            if let Some(section) = section {
                seen.insert(section);
            }
        }

        let expected: HashSet<String> = fixture.config.attack_sections.iter().cloned().collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_start_attack_plays_attack_montage() {
        let mut fixture = Fixture::new();
        assert!(fixture.with_ctx(|ctx, outbox, rng| ctx.start_attack(1.5, rng, outbox)));

        let anim = &fixture.outbox.animations[0];
        assert_eq!(anim.montage, "AttackMontage");
        assert_eq!(anim.play_rate, 1.5);
        assert!(fixture.config.attack_sections.contains(&anim.section));
    }

    #[test]
    fn test_agro_target_cleared_only_by_same_character() {
        let mut fixture = Fixture::new();
        let first = Entity::from_raw(2);
        let second = Entity::from_raw(3);

        fixture.with_ctx(|ctx, _, _| ctx.agro_overlap(first, true));
        assert_eq!(fixture.bundle.blackboard.target, Some(first));

        fixture.with_ctx(|ctx, _, _| ctx.agro_overlap(second, false));
        assert_eq!(fixture.bundle.blackboard.target, Some(first));

        fixture.with_ctx(|ctx, _, _| ctx.agro_overlap(first, false));
        assert_eq!(fixture.bundle.blackboard.target, None);

        fixture.with_ctx(|ctx, _, _| ctx.combat_range_overlap(true));
        assert!(fixture.bundle.blackboard.in_attack_range);
        fixture.with_ctx(|ctx, _, _| ctx.combat_range_overlap(false));
        assert!(!fixture.bundle.enemy.in_attack_range);
    }

    #[test]
    fn test_dead_enemy_ignores_reactions() {
        let mut fixture = Fixture::with_config(EnemyConfig {
            stun_chance: 1.0,
            ..Default::default()
        });
        fixture.with_ctx(|ctx, outbox, _| ctx.die(None, outbox));
        let calls_before = fixture.presenter.calls().len();

        let applied = fixture.shoot("head");
        assert_eq!(applied, 0.0);
        assert_eq!(fixture.hit_react_montages(), 0);
        assert!(!fixture.bundle.health_bar.visible());
        assert_eq!(fixture.presenter.calls().len(), calls_before);
        assert!(fixture.bundle.hit_numbers.is_empty());
        assert!(!fixture.with_ctx(|ctx, outbox, rng| ctx.start_attack(1.0, rng, outbox)));
        assert_eq!(fixture.outbox.died.len(), 1);
    }

    #[test]
    fn test_patrol_points_follow_spawn_transform() {
        let mut fixture = Fixture::new();
        let transform = Transform::from_xyz(100.0, 50.0, 0.0);
        fixture.with_ctx(|ctx, _, _| ctx.publish_patrol_points(&transform));

        assert_eq!(fixture.bundle.blackboard.patrol_point, Vec3::new(600.0, 50.0, 0.0));
        assert_eq!(fixture.bundle.blackboard.patrol_point_2, Vec3::new(-400.0, 50.0, 0.0));
    }

    #[test]
    fn test_explosive_detonates_once() {
        let mut explosive = Explosive::default();
        let mut outbox = Outbox::new();
        let barrel = Entity::from_raw(9);
        let hit = BulletImpact {
            target: Some(barrel),
            ..impact("")
        };

        assert!(explosive.bullet_hit(barrel, Vec3::ZERO, &hit, &mut outbox));
        assert!(!explosive.bullet_hit(barrel, Vec3::ZERO, &hit, &mut outbox));

        assert_eq!(outbox.sounds.len(), 1);
        assert_eq!(outbox.sounds[0].cue, "Explosion");
        assert_eq!(outbox.effects.len(), 1);
        assert_eq!(outbox.effects[0].location, hit.location);
        assert_eq!(outbox.despawns, vec![barrel]);
    }
}
