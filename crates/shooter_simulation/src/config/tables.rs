//! Data tables: rarity → visuals, weapon type → stats.
//!
//! В JSON таблица - просто массив строк, ключ внутри строки.
//! Дубликаты ключей отклоняются при загрузке.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::items::{AmmoType, ItemRarity, WeaponType};

/// Linear RGBA
pub type Rgba = [f32; 4];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RarityRow {
    pub rarity: ItemRarity,
    pub glow_color: Rgba,
    pub light_color: Rgba,
    pub dark_color: Rgba,
    pub number_of_stars: u8,
    /// Stencil value для custom depth outline
    pub custom_depth_stencil: i32,
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RarityRow>", into = "Vec<RarityRow>")]
pub struct RarityTable {
    rows: Vec<RarityRow>,
}

impl RarityTable {
    pub fn get(&self, rarity: ItemRarity) -> Option<&RarityRow> {
        self.rows.iter().find(|row| row.rarity == rarity)
    }

    pub fn rows(&self) -> &[RarityRow] {
        &self.rows
    }
}

impl TryFrom<Vec<RarityRow>> for RarityTable {
    type Error = ConfigError;

    fn try_from(rows: Vec<RarityRow>) -> Result<Self, Self::Error> {
        for (index, row) in rows.iter().enumerate() {
            if rows[..index].iter().any(|other| other.rarity == row.rarity) {
                return Err(ConfigError::DuplicateRow(format!("{:?}", row.rarity)));
            }
        }
        Ok(Self { rows })
    }
}

impl From<RarityTable> for Vec<RarityRow> {
    fn from(table: RarityTable) -> Self {
        table.rows
    }
}

impl Default for RarityTable {
    fn default() -> Self {
        let row = |rarity, glow: Rgba, light: Rgba, dark: Rgba, stars, stencil| RarityRow {
            rarity,
            glow_color: glow,
            light_color: light,
            dark_color: dark,
            number_of_stars: stars,
            custom_depth_stencil: stencil,
        };

        Self {
            rows: vec![
                row(
                    ItemRarity::Damaged,
                    [0.6, 0.6, 0.6, 1.0],
                    [0.8, 0.8, 0.8, 1.0],
                    [0.2, 0.2, 0.2, 1.0],
                    1,
                    250,
                ),
                row(
                    ItemRarity::Common,
                    [0.9, 0.9, 0.9, 1.0],
                    [1.0, 1.0, 1.0, 1.0],
                    [0.3, 0.3, 0.3, 1.0],
                    2,
                    251,
                ),
                row(
                    ItemRarity::UnCommon,
                    [0.1, 0.9, 0.2, 1.0],
                    [0.4, 1.0, 0.5, 1.0],
                    [0.0, 0.3, 0.05, 1.0],
                    3,
                    252,
                ),
                row(
                    ItemRarity::Rare,
                    [0.1, 0.4, 1.0, 1.0],
                    [0.5, 0.7, 1.0, 1.0],
                    [0.0, 0.1, 0.4, 1.0],
                    4,
                    253,
                ),
                row(
                    ItemRarity::Legendary,
                    [1.0, 0.6, 0.0, 1.0],
                    [1.0, 0.8, 0.4, 1.0],
                    [0.4, 0.2, 0.0, 1.0],
                    5,
                    254,
                ),
            ],
        }
    }
}

// ============================================================================
// Weapon table
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponRow {
    pub weapon_type: WeaponType,
    pub ammo_type: AmmoType,
    /// Патроны в магазине при спавне
    pub weapon_ammo: u32,
    pub magazine_capacity: u32,
    pub item_name: String,
    pub material_index: i32,
    pub clip_bone_name: String,
    pub reload_montage_section: String,
    /// Секунды между выстрелами (длительность FireTimerInProgress)
    pub auto_fire_rate: f32,
    pub automatic: bool,
    pub bone_to_hide: String,
    pub damage: f32,
    pub headshot_damage: f32,
    pub pickup_sound: String,
    pub equip_sound: String,
    pub fire_sound: String,
    /// Muzzle socket в локальных координатах оружия
    pub muzzle_offset: Vec3,
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<WeaponRow>", into = "Vec<WeaponRow>")]
pub struct WeaponTable {
    rows: Vec<WeaponRow>,
}

impl WeaponTable {
    pub fn get(&self, weapon_type: WeaponType) -> Option<&WeaponRow> {
        self.rows.iter().find(|row| row.weapon_type == weapon_type)
    }

    pub fn rows(&self) -> &[WeaponRow] {
        &self.rows
    }
}

impl TryFrom<Vec<WeaponRow>> for WeaponTable {
    type Error = ConfigError;

    fn try_from(rows: Vec<WeaponRow>) -> Result<Self, Self::Error> {
        for (index, row) in rows.iter().enumerate() {
            if rows[..index]
                .iter()
                .any(|other| other.weapon_type == row.weapon_type)
            {
                return Err(ConfigError::DuplicateRow(format!("{:?}", row.weapon_type)));
            }
            if row.magazine_capacity == 0 {
                return Err(ConfigError::ZeroMagazine(row.item_name.clone()));
            }
            if row.weapon_ammo > row.magazine_capacity {
                return Err(ConfigError::StartingAmmoOverflow {
                    weapon: row.item_name.clone(),
                    ammo: row.weapon_ammo,
                    capacity: row.magazine_capacity,
                });
            }
        }
        Ok(Self { rows })
    }
}

impl From<WeaponTable> for Vec<WeaponRow> {
    fn from(table: WeaponTable) -> Self {
        table.rows
    }
}

impl Default for WeaponTable {
    fn default() -> Self {
        Self {
            rows: vec![
                WeaponRow {
                    weapon_type: WeaponType::SubmachineGun,
                    ammo_type: AmmoType::NineMm,
                    weapon_ammo: 30,
                    magazine_capacity: 30,
                    item_name: "SubmachineGun".to_string(),
                    material_index: 0,
                    clip_bone_name: "smg_clip".to_string(),
                    reload_montage_section: "ReloadSMG".to_string(),
                    auto_fire_rate: 0.1,
                    automatic: true,
                    bone_to_hide: String::new(),
                    damage: 20.0,
                    headshot_damage: 40.0,
                    pickup_sound: "SMG_Pickup".to_string(),
                    equip_sound: "SMG_Equip".to_string(),
                    fire_sound: "SMG_Fire".to_string(),
                    muzzle_offset: Vec3::new(45.0, 0.0, 8.0),
                },
                WeaponRow {
                    weapon_type: WeaponType::AssaultRifle,
                    ammo_type: AmmoType::AssaultRifle,
                    weapon_ammo: 30,
                    magazine_capacity: 30,
                    item_name: "AssaultRifle".to_string(),
                    material_index: 0,
                    clip_bone_name: "AR_clip".to_string(),
                    reload_montage_section: "ReloadAR".to_string(),
                    auto_fire_rate: 0.12,
                    automatic: true,
                    bone_to_hide: String::new(),
                    damage: 30.0,
                    headshot_damage: 60.0,
                    pickup_sound: "AR_Pickup".to_string(),
                    equip_sound: "AR_Equip".to_string(),
                    fire_sound: "AR_Fire".to_string(),
                    muzzle_offset: Vec3::new(60.0, 0.0, 10.0),
                },
                WeaponRow {
                    weapon_type: WeaponType::Pistol,
                    ammo_type: AmmoType::NineMm,
                    weapon_ammo: 12,
                    magazine_capacity: 12,
                    item_name: "Pistol".to_string(),
                    material_index: 0,
                    clip_bone_name: "pistol_clip".to_string(),
                    reload_montage_section: "ReloadPistol".to_string(),
                    auto_fire_rate: 0.2,
                    automatic: false,
                    bone_to_hide: String::new(),
                    damage: 25.0,
                    headshot_damage: 50.0,
                    pickup_sound: "Pistol_Pickup".to_string(),
                    equip_sound: "Pistol_Equip".to_string(),
                    fire_sound: "Pistol_Fire".to_string(),
                    muzzle_offset: Vec3::new(25.0, 0.0, 6.0),
                },
            ],
        }
    }
}
