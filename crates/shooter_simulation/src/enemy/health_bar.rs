//! Health bar presenter (визуальный слой хоста).

use std::fmt;

use bevy::prelude::*;

/// Capability: показать/спрятать health bar над enemy.
/// Реализацию подставляет хост при spawn'е.
pub trait HealthBarPresenter: Send + Sync + 'static {
    fn show_health_bar(&mut self, enemy: Entity);
    fn hide_health_bar(&mut self, enemy: Entity);
}

/// Headless: ничего не рисует
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentHealthBar;

impl HealthBarPresenter for SilentHealthBar {
    fn show_health_bar(&mut self, _enemy: Entity) {}

    fn hide_health_bar(&mut self, _enemy: Entity) {}
}

#[derive(Component)]
pub struct HealthBar {
    presenter: Box<dyn HealthBarPresenter>,
    visible: bool,
}

impl HealthBar {
    pub fn new(presenter: impl HealthBarPresenter) -> Self {
        Self {
            presenter: Box::new(presenter),
            visible: false,
        }
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self, enemy: Entity) {
        self.visible = true;
        self.presenter.show_health_bar(enemy);
    }

    pub fn hide(&mut self, enemy: Entity) {
        self.visible = false;
        self.presenter.hide_health_bar(enemy);
    }
}

impl Default for HealthBar {
    fn default() -> Self {
        Self::new(SilentHealthBar)
    }
}

impl fmt::Debug for HealthBar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HealthBar")
            .field("visible", &self.visible)
            .finish_non_exhaustive()
    }
}
