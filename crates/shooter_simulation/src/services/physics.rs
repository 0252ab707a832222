//! Query-сервисы внешнего мира: line trace + world→screen projection.
//!
//! Физика - black box. Ядро только спрашивает "что на луче" и получает
//! первый блокирующий hit. Хост подставляет свою реализацию в `PhysicsWorld`.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceChannel {
    Visibility,
    WorldStatic,
}

/// Блокирующий hit луча
#[derive(Debug, Clone, PartialEq)]
pub struct TraceHit {
    /// Entity, если попали в симулируемый объект (None = статика мира)
    pub entity: Option<Entity>,
    pub location: Vec3,
    /// Кость скелета (для headshot)
    pub bone: Option<String>,
}

pub trait LineTracer: Send + Sync {
    /// Первый блокирующий hit на отрезке [start, end] или None
    fn line_trace(&self, start: Vec3, end: Vec3, channel: TraceChannel) -> Option<TraceHit>;
}

pub trait ScreenProjector: Send + Sync {
    /// None - точка за камерой / вне экрана
    fn project(&self, world: Vec3) -> Option<Vec2>;
}

/// Ничего не блокирует
pub struct EmptyWorld;

impl LineTracer for EmptyWorld {
    fn line_trace(&self, _start: Vec3, _end: Vec3, _channel: TraceChannel) -> Option<TraceHit> {
        None
    }
}

/// Ничего не видно на экране
pub struct OffscreenProjector;

impl ScreenProjector for OffscreenProjector {
    fn project(&self, _world: Vec3) -> Option<Vec2> {
        None
    }
}

#[derive(Resource)]
pub struct PhysicsWorld {
    tracer: Box<dyn LineTracer>,
}

impl PhysicsWorld {
    pub fn new(tracer: impl LineTracer + 'static) -> Self {
        Self {
            tracer: Box::new(tracer),
        }
    }

    pub fn tracer(&self) -> &dyn LineTracer {
        self.tracer.as_ref()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(EmptyWorld)
    }
}

#[derive(Resource)]
pub struct ScreenSpace {
    projector: Box<dyn ScreenProjector>,
}

impl ScreenSpace {
    pub fn new(projector: impl ScreenProjector + 'static) -> Self {
        Self {
            projector: Box::new(projector),
        }
    }

    pub fn projector(&self) -> &dyn ScreenProjector {
        self.projector.as_ref()
    }
}

impl Default for ScreenSpace {
    fn default() -> Self {
        Self::new(OffscreenProjector)
    }
}

// ============================================================================
// SphereWorld: аналитический tracer (headless runs, тесты)
// ============================================================================

#[derive(Debug, Clone)]
pub struct TraceSphere {
    pub entity: Option<Entity>,
    pub center: Vec3,
    pub radius: f32,
    pub bone: Option<String>,
    pub channels: Vec<TraceChannel>,
}

/// Мир из сфер: луч блокируется ближайшей сферой нужного канала
#[derive(Debug, Clone, Default)]
pub struct SphereWorld {
    pub spheres: Vec<TraceSphere>,
}

impl SphereWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sphere(mut self, entity: Option<Entity>, center: Vec3, radius: f32) -> Self {
        self.spheres.push(TraceSphere {
            entity,
            center,
            radius,
            bone: None,
            channels: vec![TraceChannel::Visibility, TraceChannel::WorldStatic],
        });
        self
    }

    pub fn with_bone(mut self, bone: impl Into<String>) -> Self {
        if let Some(last) = self.spheres.last_mut() {
            last.bone = Some(bone.into());
        }
        self
    }

    /// Параметр t ∈ [0, length] первого пересечения луча со сферой
    fn intersect(sphere: &TraceSphere, start: Vec3, direction: Vec3, length: f32) -> Option<f32> {
        let offset = start - sphere.center;
        let b = offset.dot(direction);
        let c = offset.length_squared() - sphere.radius * sphere.radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let root = discriminant.sqrt();
        let near = -b - root;
        let t = if near >= 0.0 { near } else { -b + root };
        (0.0..=length).contains(&t).then_some(t)
    }
}

impl LineTracer for SphereWorld {
    fn line_trace(&self, start: Vec3, end: Vec3, channel: TraceChannel) -> Option<TraceHit> {
        let segment = end - start;
        let length = segment.length();
        if length <= f32::EPSILON {
            return None;
        }
        let direction = segment / length;

        self.spheres
            .iter()
            .filter(|sphere| sphere.channels.contains(&channel))
            .filter_map(|sphere| {
                Self::intersect(sphere, start, direction, length).map(|t| (t, sphere))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(t, sphere)| TraceHit {
                entity: sphere.entity,
                location: start + direction * t,
                bone: sphere.bone.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_world_nearest_hit() {
        let near = Entity::from_raw(1);
        let far = Entity::from_raw(2);
        let world = SphereWorld::new()
            .with_sphere(Some(far), Vec3::new(1000.0, 0.0, 0.0), 50.0)
            .with_sphere(Some(near), Vec3::new(500.0, 0.0, 0.0), 50.0)
            .with_bone("head");

        let hit = world
            .line_trace(Vec3::ZERO, Vec3::new(5000.0, 0.0, 0.0), TraceChannel::Visibility)
            .expect("hit");

        assert_eq!(hit.entity, Some(near));
        assert!((hit.location.x - 450.0).abs() < 1e-2, "location = {:?}", hit.location);
        assert_eq!(hit.bone.as_deref(), Some("head"));
    }

    #[test]
    fn test_sphere_world_miss_and_short_ray() {
        let world = SphereWorld::new().with_sphere(None, Vec3::new(500.0, 0.0, 0.0), 50.0);

        // Мимо
        assert!(world
            .line_trace(Vec3::ZERO, Vec3::new(0.0, 5000.0, 0.0), TraceChannel::Visibility)
            .is_none());
        // Не дотягивается
        assert!(world
            .line_trace(Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0), TraceChannel::Visibility)
            .is_none());
    }

    #[test]
    fn test_empty_world_never_hits() {
        assert!(EmptyWorld
            .line_trace(Vec3::ZERO, Vec3::X * 100.0, TraceChannel::WorldStatic)
            .is_none());
    }
}
