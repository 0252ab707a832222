//! Ammo pickup: пачка патронов одного типа.

use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{ItemTuning, RarityTable};
use crate::items::components::{Item, ItemKind, ItemRarity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect, Serialize, Deserialize)]
pub enum AmmoType {
    #[serde(rename = "9mm")]
    NineMm,
    #[serde(rename = "AR")]
    AssaultRifle,
}

impl AmmoType {
    pub fn display_name(&self) -> &'static str {
        match self {
            AmmoType::NineMm => "9mm",
            AmmoType::AssaultRifle => "AR",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AmmoData {
    pub ammo_type: AmmoType,
    /// Сфера auto-pickup (касание персонажем). Выключается после срабатывания.
    pub collision_sphere_enabled: bool,
}

impl Item {
    pub fn new_ammo(
        ammo_type: AmmoType,
        count: u32,
        tuning: Arc<ItemTuning>,
        rarities: &RarityTable,
    ) -> Self {
        let mut item = Item::new(
            format!("{} Ammo", ammo_type.display_name()),
            ItemRarity::Common,
            ItemKind::Ammo(AmmoData {
                ammo_type,
                collision_sphere_enabled: true,
            }),
            tuning,
            rarities,
        );
        item.count = count;
        item.pickup_sound = "Ammo_Pickup".to_string();
        item.equip_sound = "Ammo_Equip".to_string();
        item
    }

    pub fn ammo_data(&self) -> Option<&AmmoData> {
        match &self.kind {
            ItemKind::Ammo(ammo) => Some(ammo),
            ItemKind::Weapon(_) => None,
        }
    }

    pub fn ammo_data_mut(&mut self) -> Option<&mut AmmoData> {
        match &mut self.kind {
            ItemKind::Ammo(ammo) => Some(ammo),
            ItemKind::Weapon(_) => None,
        }
    }
}
