//! Sampled curves + interpolation helpers.
//!
//! Ядру нужен только контракт `sample(t)`; keyframe таблица - одна из реализаций
//! (грузится из JSON вместе с остальной конфигурацией).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Абстрактная функция времени
pub trait SampledCurve {
    type Value;

    fn sample(&self, t: f32) -> Self::Value;
}

/// Значения, которые умеет интерполировать keyframe curve
pub trait Lerp: Copy {
    fn lerp_to(self, other: Self, alpha: f32) -> Self;
    fn zero() -> Self;
}

impl Lerp for f32 {
    fn lerp_to(self, other: Self, alpha: f32) -> Self {
        self + (other - self) * alpha
    }

    fn zero() -> Self {
        0.0
    }
}

impl Lerp for Vec3 {
    fn lerp_to(self, other: Self, alpha: f32) -> Self {
        self.lerp(other, alpha)
    }

    fn zero() -> Self {
        Vec3::ZERO
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe<T> {
    pub time: f32,
    pub value: T,
}

/// Piecewise-linear curve. Вне диапазона ключей значение clamp'ится к крайним.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyframeCurve<T> {
    keys: Vec<Keyframe<T>>,
}

pub type FloatCurve = KeyframeCurve<f32>;
pub type VectorCurve = KeyframeCurve<Vec3>;

impl<T: Lerp> KeyframeCurve<T> {
    /// Ключи сортируются по времени
    pub fn new(keys: impl IntoIterator<Item = (f32, T)>) -> Self {
        let mut keys: Vec<Keyframe<T>> = keys
            .into_iter()
            .map(|(time, value)| Keyframe { time, value })
            .collect();
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    pub fn keys(&self) -> &[Keyframe<T>] {
        &self.keys
    }

    /// Время последнего ключа (0 для пустой кривой)
    pub fn duration(&self) -> f32 {
        self.keys.last().map(|key| key.time).unwrap_or(0.0)
    }

    /// Для кривых из конфигурации: хотя бы один ключ, времена строго растут
    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if self.keys.is_empty() {
            return Err(ConfigError::EmptyCurve(name.to_string()));
        }
        let increasing = self.keys.windows(2).all(|pair| pair[0].time < pair[1].time);
        if !increasing {
            return Err(ConfigError::UnorderedCurve(name.to_string()));
        }
        Ok(())
    }
}

impl<T: Lerp> SampledCurve for KeyframeCurve<T> {
    type Value = T;

    fn sample(&self, t: f32) -> T {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return T::zero();
        };

        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        // Первый ключ строго правее t
        let upper = self.keys.partition_point(|key| key.time <= t);
        let a = &self.keys[upper - 1];
        let b = &self.keys[upper];
        let span = b.time - a.time;
        if span <= f32::EPSILON {
            return b.value;
        }
        a.value.lerp_to(b.value, (t - a.time) / span)
    }
}

/// Экспоненциальное сглаживание: `current += (target - current) * min(1, speed * dt)`.
/// `speed <= 0` → мгновенно target.
pub fn finterp_to(current: f32, target: f32, delta: f32, speed: f32) -> f32 {
    if speed <= 0.0 {
        return target;
    }
    let distance = target - current;
    if distance * distance < 1e-8 {
        return target;
    }
    current + distance * (delta * speed).clamp(0.0, 1.0)
}

/// Линейный remap `value` из `input` в `output` с clamp'ом по output
pub fn mapped_range_clamped(input: (f32, f32), output: (f32, f32), value: f32) -> f32 {
    let span = input.1 - input.0;
    if span.abs() <= f32::EPSILON {
        return output.0;
    }
    let alpha = ((value - input.0) / span).clamp(0.0, 1.0);
    output.0 + (output.1 - output.0) * alpha
}
