//! Reload: Unoccupied → Reloading → (FinishReloading notify) → Unoccupied.
//!
//! Перенос патронов = min(пустое место в магазине, reserve). Сумма
//! магазин + reserve сохраняется.

use super::components::CombatState;
use super::controller::CharacterCtx;
use crate::items::{AmmoType, ItemAccess};
use crate::services::Outbox;

impl CharacterCtx<'_> {
    /// Есть reserve патроны под тип экипированного оружия
    pub fn carrying_ammo(&self, items: &mut impl ItemAccess) -> bool {
        self.equipped_ammo_type(items)
            .is_some_and(|ammo_type| self.ammo.get(ammo_type) > 0)
    }

    fn equipped_ammo_type(&self, items: &mut impl ItemAccess) -> Option<AmmoType> {
        let entity = self.controller.equipped_weapon?;
        let (item, _) = items.item_mut(entity)?;
        item.weapon().map(|weapon| weapon.ammo_type)
    }

    /// Старт reload. false = guarded no-op.
    pub fn reload_weapon(&mut self, items: &mut impl ItemAccess, outbox: &mut Outbox) -> bool {
        if self.controller.state != CombatState::Unoccupied {
            return false;
        }
        let Some(weapon_entity) = self.controller.equipped_weapon else {
            return false;
        };
        let Some((item, _)) = items.item_mut(weapon_entity) else {
            return false;
        };
        let Some(weapon) = item.weapon() else {
            return false;
        };
        if self.ammo.get(weapon.ammo_type) == 0 || weapon.clip_is_full() {
            return false;
        }
        let section = weapon.reload_montage_section.clone();

        if self.controller.aiming {
            self.stop_aiming();
        }

        self.controller.state = CombatState::Reloading;
        outbox.play_montage(self.entity, self.config.reload_montage.clone(), section, 1.0);

        crate::logger::log(&format!("🔄 {:?} reloading {:?}", self.entity, weapon_entity));
        true
    }

    /// Animation notify: магазин заполнен. Возвращает перенесённое количество.
    pub fn finish_reloading(&mut self, items: &mut impl ItemAccess) -> u32 {
        if self.controller.state != CombatState::Reloading {
            crate::logger::log_warning(&format!(
                "⚠️ FinishReloading for {:?} in state {:?}, ignored",
                self.entity, self.controller.state
            ));
            return 0;
        }

        self.controller.state = CombatState::Unoccupied;
        if self.controller.aiming_button_pressed {
            self.aim();
        }

        let Some(weapon) = self
            .controller
            .equipped_weapon
            .and_then(|entity| items.item_mut(entity))
            .and_then(|(item, _)| item.weapon_mut())
        else {
            return 0;
        };

        let ammo_type = weapon.ammo_type;
        let carried = self.ammo.get(ammo_type);
        let transferred = weapon.magazine_empty_space().min(carried);

        weapon.reload_ammo(transferred);
        self.ammo.set(ammo_type, carried - transferred);

        crate::logger::log_info(&format!(
            "✅ {:?} reloaded +{} ({} {}/{}), reserve {}",
            self.entity,
            transferred,
            ammo_type.display_name(),
            weapon.ammo(),
            weapon.magazine_capacity(),
            carried - transferred
        ));
        transferred
    }

    /// Notify: рука взяла обойму
    pub fn grab_clip(&mut self, items: &mut impl ItemAccess) {
        self.set_moving_clip(items, true);
    }

    /// Notify: обойма вставлена
    pub fn release_clip(&mut self, items: &mut impl ItemAccess) {
        self.set_moving_clip(items, false);
    }

    fn set_moving_clip(&mut self, items: &mut impl ItemAccess, moving: bool) {
        let Some(weapon) = self
            .controller
            .equipped_weapon
            .and_then(|entity| items.item_mut(entity))
            .and_then(|(item, _)| item.weapon_mut())
        else {
            return;
        };
        weapon.moving_clip = moving;
    }
}
