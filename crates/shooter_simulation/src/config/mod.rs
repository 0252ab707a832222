//! Configuration: data tables + tuning.
//!
//! Architecture:
//! - `tables` - keyed lookup (rarity → visuals, weapon type → stats), read-only после загрузки
//! - `tuning` - числовые константы controller'ов (character, enemy, item)
//! - `GameConfig` - агрегат для загрузки из JSON одним файлом
//!
//! Всё имеет hardcoded `Default`, JSON может переопределить любую секцию частично.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod tables;
pub mod tuning;


pub use tables::{RarityRow, RarityTable, Rgba, WeaponRow, WeaponTable};
pub use tuning::{CharacterConfig, EnemyConfig, ItemCurves, ItemTuning};

/// Ошибки загрузки конфигурации (единственный fallible API ядра)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate table row for key {0}")]
    DuplicateRow(String),

    #[error("weapon {0} has zero magazine capacity")]
    ZeroMagazine(String),

    #[error("weapon {weapon} starts with {ammo} rounds but holds only {capacity}")]
    StartingAmmoOverflow {
        weapon: String,
        ammo: u32,
        capacity: u32,
    },

    #[error("curve {0} has no keys")]
    EmptyCurve(String),

    #[error("curve {0} key times must strictly increase")]
    UnorderedCurve(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: String,
    },
}

/// Вся конфигурация симуляции
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub rarities: RarityTable,
    pub weapons: WeaponTable,
    pub character: CharacterConfig,
    pub enemy: EnemyConfig,
    pub item: ItemTuning,
}

impl GameConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Семантические проверки (таблицы проверяются уже при десериализации)
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.item.validate()?;
        self.enemy.validate()?;
        self.character.validate()?;
        Ok(())
    }
}
