//! Crosshair spread: аддитивная модель из независимо сглаженных факторов.
//!
//! spread = 0.5 + velocity + in_air − aim + shooting
//!
//! Никаких дискретных переходов - только per-frame FInterpTo каждого фактора.

use bevy::prelude::*;

use crate::curves::{finterp_to, mapped_range_clamped};

const BASE_SPREAD: f32 = 0.5;

const IN_AIR_TARGET: f32 = 2.25;
const IN_AIR_RATE: f32 = 2.25;
const LANDING_RATE: f32 = 30.0;

const AIM_TARGET: f32 = 0.6;
const AIM_RATE: f32 = 30.0;

const SHOOTING_TARGET: f32 = 0.3;
const SHOOTING_RATE: f32 = 60.0;

/// Что влияет на spread в этом кадре
#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadInputs {
    pub ground_speed: f32,
    pub airborne: bool,
    pub aiming: bool,
    pub firing_bullet: bool,
}

#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct CrosshairSpread {
    pub multiplier: f32,
    pub velocity_factor: f32,
    pub in_air_factor: f32,
    pub aim_factor: f32,
    pub shooting_factor: f32,
}

impl CrosshairSpread {
    /// `max_ground_speed` - скорость, дающая velocity factor = 1
    pub fn update(&mut self, delta: f32, inputs: SpreadInputs, max_ground_speed: f32) {
        self.velocity_factor =
            mapped_range_clamped((0.0, max_ground_speed), (0.0, 1.0), inputs.ground_speed);

        self.in_air_factor = if inputs.airborne {
            // Медленно расходится в воздухе
            finterp_to(self.in_air_factor, IN_AIR_TARGET, delta, IN_AIR_RATE)
        } else {
            // На земле сразу сжимается
            finterp_to(self.in_air_factor, 0.0, delta, LANDING_RATE)
        };

        let aim_target = if inputs.aiming { AIM_TARGET } else { 0.0 };
        self.aim_factor = finterp_to(self.aim_factor, aim_target, delta, AIM_RATE);

        let shooting_target = if inputs.firing_bullet {
            SHOOTING_TARGET
        } else {
            0.0
        };
        self.shooting_factor = finterp_to(self.shooting_factor, shooting_target, delta, SHOOTING_RATE);

        let spread = BASE_SPREAD + self.velocity_factor + self.in_air_factor - self.aim_factor
            + self.shooting_factor;
        // Aim (0.6) перекрывает base (0.5) у стоящего персонажа
        self.multiplier = spread.max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn run(spread: &mut CrosshairSpread, inputs: SpreadInputs, seconds: f32) {
        let steps = (seconds / DT).round() as usize;
        for _ in 0..steps {
            spread.update(DT, inputs, 600.0);
        }
    }

    #[test]
    fn test_idle_spread_is_base() {
        let mut spread = CrosshairSpread::default();
        run(&mut spread, SpreadInputs::default(), 1.0);
        assert!((spread.multiplier - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_velocity_factor_clamped() {
        let mut spread = CrosshairSpread::default();
        let inputs = SpreadInputs {
            ground_speed: 1200.0,
            ..Default::default()
        };
        run(&mut spread, inputs, 0.1);
        assert_eq!(spread.velocity_factor, 1.0);

        let inputs = SpreadInputs {
            ground_speed: 300.0,
            ..Default::default()
        };
        run(&mut spread, inputs, 0.1);
        assert!((spread.velocity_factor - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_in_air_grows_slowly_and_snaps_back() {
        let mut spread = CrosshairSpread::default();
        let airborne = SpreadInputs {
            airborne: true,
            ..Default::default()
        };

        run(&mut spread, airborne, 0.1);
        let after_short_jump = spread.in_air_factor;
        assert!(after_short_jump > 0.0 && after_short_jump < 1.0);

        run(&mut spread, airborne, 5.0);
        assert!((spread.in_air_factor - 2.25).abs() < 0.01);

        run(&mut spread, SpreadInputs::default(), 0.25);
        assert!(spread.in_air_factor < 0.01);
    }

    #[test]
    fn test_spread_never_negative_for_any_flag_combination() {
        for mask in 0..8u8 {
            let inputs = SpreadInputs {
                ground_speed: 0.0,
                airborne: mask & 1 != 0,
                aiming: mask & 2 != 0,
                firing_bullet: mask & 4 != 0,
            };
            let mut spread = CrosshairSpread::default();
            run(&mut spread, inputs, 1.0);
            assert!(spread.multiplier >= 0.0, "mask {} → {}", mask, spread.multiplier);
        }
    }

    #[test]
    fn test_shooting_factor_follows_fire_window() {
        let mut spread = CrosshairSpread::default();
        let firing = SpreadInputs {
            firing_bullet: true,
            ..Default::default()
        };
        run(&mut spread, firing, 0.1);
        assert!((spread.shooting_factor - 0.3).abs() < 0.01);

        run(&mut spread, SpreadInputs::default(), 0.1);
        assert!(spread.shooting_factor < 0.01);
    }
}
