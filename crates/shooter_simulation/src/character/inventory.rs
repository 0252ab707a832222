//! Inventory, ammo reserve, interp anchors.
//!
//! Все три мутирует только контроллер своего персонажа.

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::character::camera::CameraRig;
use crate::items::AmmoType;

/// Slot 0 interp anchors зарезервирован под оружие
pub const WEAPON_INTERP_SLOT: usize = 0;

// ============================================================================
// Inventory
// ============================================================================

/// Оружие персонажа по слотам (ordered, без дыр)
#[derive(Component, Debug, Clone)]
pub struct Inventory {
    items: Vec<Entity>,
    capacity: usize,
}

impl Inventory {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn items(&self) -> &[Entity] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn get(&self, slot: usize) -> Option<Entity> {
        self.items.get(slot).copied()
    }

    /// Слот, куда ляжет следующий item (None = inventory полон)
    pub fn empty_slot(&self) -> Option<usize> {
        (!self.is_full()).then_some(self.items.len())
    }

    /// Добавляет в конец. None если полон.
    pub fn push(&mut self, item: Entity) -> Option<usize> {
        let slot = self.empty_slot()?;
        self.items.push(item);
        Some(slot)
    }

    /// Заменяет item в слоте, возвращает старый
    pub fn replace(&mut self, slot: usize, item: Entity) -> Option<Entity> {
        let entry = self.items.get_mut(slot)?;
        Some(std::mem::replace(entry, item))
    }

    pub fn slot_of(&self, item: Entity) -> Option<usize> {
        self.items.iter().position(|entity| *entity == item)
    }
}

// ============================================================================
// AmmoMap
// ============================================================================

/// Reserve патроны по типам (независимо от магазинов)
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct AmmoMap(BTreeMap<AmmoType, u32>);

impl AmmoMap {
    pub fn with_starting(nine_mm: u32, assault_rifle: u32) -> Self {
        let mut map = BTreeMap::new();
        map.insert(AmmoType::NineMm, nine_mm);
        map.insert(AmmoType::AssaultRifle, assault_rifle);
        Self(map)
    }

    /// 0 для отсутствующего ключа
    pub fn get(&self, ammo_type: AmmoType) -> u32 {
        self.0.get(&ammo_type).copied().unwrap_or(0)
    }

    pub fn set(&mut self, ammo_type: AmmoType, amount: u32) {
        self.0.insert(ammo_type, amount);
    }

    pub fn add(&mut self, ammo_type: AmmoType, amount: u32) {
        let entry = self.0.entry(ammo_type).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }
}

// ============================================================================
// InterpSlots
// ============================================================================

/// Anchor, к которому летит подобранный item
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpSlot {
    /// Смещение в пространстве камеры (X вперёд, Y влево, Z вверх)
    pub offset: Vec3,
    /// Сколько item'ов сейчас летит к этому anchor'у
    pub reservations: u32,
}

impl InterpSlot {
    pub fn new(offset: Vec3) -> Self {
        Self {
            offset,
            reservations: 0,
        }
    }
}

/// Weapon anchor + generic anchors (load balancing одновременных pickup'ов)
#[derive(Component, Debug, Clone)]
pub struct InterpSlots {
    slots: Vec<InterpSlot>,
}

impl Default for InterpSlots {
    /// Weapon anchor перед камерой + 6 generic anchors веером
    fn default() -> Self {
        let mut slots = vec![InterpSlot::new(Vec3::new(150.0, 0.0, -20.0))];
        for row in 0..2 {
            for column in 0..3 {
                let lateral = (column as f32 - 1.0) * 60.0;
                let vertical = 30.0 - row as f32 * 60.0;
                slots.push(InterpSlot::new(Vec3::new(200.0, lateral, vertical)));
            }
        }
        Self { slots }
    }
}

impl InterpSlots {
    pub fn new(slots: Vec<InterpSlot>) -> Self {
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn reservations(&self, index: usize) -> Option<u32> {
        self.slots.get(index).map(|slot| slot.reservations)
    }

    pub fn total_reservations(&self) -> u32 {
        self.slots.iter().map(|slot| slot.reservations).sum()
    }

    /// Generic anchor с минимумом резерваций; ничья → меньший индекс.
    /// Без generic anchors - weapon slot.
    pub fn interp_location_index(&self) -> usize {
        let mut lowest_index = WEAPON_INTERP_SLOT;
        let mut lowest_count = u32::MAX;

        for (index, slot) in self.slots.iter().enumerate().skip(1) {
            if slot.reservations < lowest_count {
                lowest_index = index;
                lowest_count = slot.reservations;
            }
        }

        lowest_index
    }

    pub fn reserve(&mut self, index: usize) -> bool {
        let Some(slot) = self.slots.get_mut(index) else {
            return false;
        };
        slot.reservations += 1;
        true
    }

    /// Снятие резервации; двойное снятие не уводит счётчик в минус
    pub fn release(&mut self, index: usize) -> bool {
        let Some(slot) = self.slots.get_mut(index) else {
            return false;
        };
        if slot.reservations == 0 {
            crate::logger::log_warning(&format!(
                "⚠️ Interp slot {} released without reservation",
                index
            ));
            return false;
        }
        slot.reservations -= 1;
        true
    }

    /// World позиция anchor'а (None для индекса вне диапазона)
    pub fn location(&self, index: usize, camera: &CameraRig) -> Option<Vec3> {
        if index < self.slots.len() {
            Some(camera.position + camera.rotation * self.slots[index].offset)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_push_until_full() {
        let mut inventory = Inventory::new(2);

        assert_eq!(inventory.push(Entity::from_raw(1)), Some(0));
        assert_eq!(inventory.empty_slot(), Some(1));
        assert_eq!(inventory.push(Entity::from_raw(2)), Some(1));

        assert!(inventory.is_full());
        assert_eq!(inventory.empty_slot(), None);
        assert_eq!(inventory.push(Entity::from_raw(3)), None);
        assert_eq!(inventory.len(), 2);
    }

    #[test]
    fn test_inventory_replace() {
        let mut inventory = Inventory::new(6);
        inventory.push(Entity::from_raw(1));

        assert_eq!(inventory.replace(0, Entity::from_raw(9)), Some(Entity::from_raw(1)));
        assert_eq!(inventory.get(0), Some(Entity::from_raw(9)));
        assert_eq!(inventory.replace(3, Entity::from_raw(5)), None);
        assert_eq!(inventory.slot_of(Entity::from_raw(9)), Some(0));
    }

    #[test]
    fn test_ammo_map() {
        let mut ammo = AmmoMap::with_starting(85, 120);
        assert_eq!(ammo.get(AmmoType::NineMm), 85);
        assert_eq!(ammo.get(AmmoType::AssaultRifle), 120);

        ammo.add(AmmoType::NineMm, 15);
        assert_eq!(ammo.get(AmmoType::NineMm), 100);
        assert_eq!(ammo.total(), 220);

        assert_eq!(AmmoMap::default().get(AmmoType::NineMm), 0);
    }

    #[test]
    fn test_interp_location_index_load_balances() {
        let mut slots = InterpSlots::default();
        assert_eq!(slots.len(), 7);

        // Пусто → первый generic
        assert_eq!(slots.interp_location_index(), 1);

        // Две одновременных резервации → разные anchors
        let first = slots.interp_location_index();
        slots.reserve(first);
        let second = slots.interp_location_index();
        slots.reserve(second);
        assert_ne!(first, second);
        assert_eq!(second, 2);

        // Weapon slot никогда не выдаётся generic item'ам
        slots.reserve(WEAPON_INTERP_SLOT);
        for index in 3..7 {
            slots.reserve(index);
        }
        // Все generic по 1 → ничья к наименьшему
        assert_eq!(slots.interp_location_index(), 1);
    }

    #[test]
    fn test_release_never_underflows() {
        let mut slots = InterpSlots::default();
        slots.reserve(3);

        assert!(slots.release(3));
        assert!(!slots.release(3));
        assert_eq!(slots.reservations(3), Some(0));
        assert!(!slots.release(42));
    }

    #[test]
    fn test_location_strict_bounds() {
        let slots = InterpSlots::default();
        let camera = CameraRig::new(90.0);

        assert!(slots.location(slots.len() - 1, &camera).is_some());
        // Индекс == len - вне диапазона
        assert!(slots.location(slots.len(), &camera).is_none());
    }

    #[test]
    fn test_location_follows_camera() {
        let slots = InterpSlots::new(vec![InterpSlot::new(Vec3::new(100.0, 0.0, 0.0))]);
        let mut camera = CameraRig::new(90.0);
        camera.position = Vec3::new(0.0, 0.0, 50.0);
        camera.rotation = Quat::from_rotation_z(90f32.to_radians());

        let location = slots.location(0, &camera).expect("in range");
        assert!((location - Vec3::new(0.0, 100.0, 50.0)).length() < 1e-3, "{:?}", location);
    }
}
