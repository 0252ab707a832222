//! Per-entity timer scheduler.
//!
//! Каждая сущность (item, character, enemy) владеет своим `Scheduler<C>`,
//! где `C` - enum callback'ов этой сущности. Никакого глобального реестра.
//!
//! Порядок срабатывания детерминированный: таймеры, истёкшие в одном tick'е,
//! возвращаются по возрастанию deadline, при равенстве - по порядку schedule().

/// Handle запланированного таймера (уникален в пределах одного Scheduler)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct ScheduledTimer<C> {
    handle: TimerHandle,
    callback: C,
    duration: f32,
    elapsed: f32,
    repeating: bool,
}

#[derive(Debug, Clone)]
pub struct Scheduler<C> {
    timers: Vec<ScheduledTimer<C>>,
    next_handle: u64,
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Self {
            timers: Vec::new(),
            next_handle: 0,
        }
    }
}

impl<C: Copy> Scheduler<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-shot таймер. `duration <= 0` срабатывает на следующем tick.
    pub fn schedule(&mut self, duration: f32, callback: C) -> TimerHandle {
        self.push(duration, callback, false)
    }

    /// Repeating таймер: срабатывает не чаще одного раза за tick
    pub fn schedule_repeating(&mut self, period: f32, callback: C) -> TimerHandle {
        self.push(period, callback, true)
    }

    fn push(&mut self, duration: f32, callback: C, repeating: bool) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.timers.push(ScheduledTimer {
            handle,
            callback,
            duration: duration.max(0.0),
            elapsed: 0.0,
            repeating,
        });
        handle
    }

    /// Returns true если таймер был активен
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.handle != handle);
        self.timers.len() != before
    }

    /// Отменяет handle из слота и обнуляет слот (паттерн "clear timer")
    pub fn clear(&mut self, slot: &mut Option<TimerHandle>) {
        if let Some(handle) = slot.take() {
            self.cancel(handle);
        }
    }

    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|timer| timer.handle == handle)
    }

    /// Время с момента schedule (или последнего срабатывания repeating таймера)
    pub fn elapsed(&self, handle: TimerHandle) -> Option<f32> {
        self.timers
            .iter()
            .find(|timer| timer.handle == handle)
            .map(|timer| timer.elapsed)
    }

    pub fn remaining(&self, handle: TimerHandle) -> Option<f32> {
        self.timers
            .iter()
            .find(|timer| timer.handle == handle)
            .map(|timer| (timer.duration - timer.elapsed).max(0.0))
    }

    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Продвигает все таймеры на `delta` и возвращает сработавшие callbacks.
    pub fn tick(&mut self, delta: f32) -> Vec<C> {
        // (remaining до tick'а, handle, callback)
        let mut fired: Vec<(f32, TimerHandle, C)> = Vec::new();

        for timer in self.timers.iter_mut() {
            let remaining = timer.duration - timer.elapsed;
            timer.elapsed += delta;
            if timer.elapsed >= timer.duration {
                fired.push((remaining, timer.handle, timer.callback));
                if timer.repeating {
                    timer.elapsed = if timer.duration > 0.0 {
                        (timer.elapsed - timer.duration).min(timer.duration)
                    } else {
                        0.0
                    };
                }
            }
        }

        self.timers
            .retain(|timer| timer.repeating || timer.elapsed < timer.duration);

        fired.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        fired.into_iter().map(|(_, _, callback)| callback).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Cb {
        A,
        B,
        C,
    }

    #[test]
    fn test_one_shot_fires_once() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule(0.5, Cb::A);

        assert!(scheduler.tick(0.3).is_empty());
        assert!(scheduler.is_active(handle));
        assert_eq!(scheduler.tick(0.3), vec![Cb::A]);
        assert!(!scheduler.is_active(handle));
        assert!(scheduler.tick(1.0).is_empty());
    }

    #[test]
    fn test_cancel_prevents_fire() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule(0.1, Cb::A);

        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle), "double cancel returns false");
        assert!(scheduler.tick(1.0).is_empty());
    }

    #[test]
    fn test_clear_slot() {
        let mut scheduler = Scheduler::new();
        let mut slot = Some(scheduler.schedule(0.1, Cb::A));

        scheduler.clear(&mut slot);

        assert!(slot.is_none());
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn test_elapsed_tracks_time() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule(1.0, Cb::A);
        scheduler.tick(0.25);
        scheduler.tick(0.25);

        let elapsed = scheduler.elapsed(handle).unwrap();
        assert!((elapsed - 0.5).abs() < 1e-5, "elapsed = {}", elapsed);
        assert!((scheduler.remaining(handle).unwrap() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_fire_order_by_deadline_then_schedule_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(0.3, Cb::A);
        scheduler.schedule(0.1, Cb::B);
        scheduler.schedule(0.3, Cb::C);

        // Все три истекают в одном большом tick'е
        assert_eq!(scheduler.tick(1.0), vec![Cb::B, Cb::A, Cb::C]);
    }

    #[test]
    fn test_repeating_timer_rearms() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule_repeating(0.5, Cb::A);

        assert_eq!(scheduler.tick(0.6), vec![Cb::A]);
        assert!(scheduler.is_active(handle));
        let elapsed = scheduler.elapsed(handle).unwrap();
        assert!((elapsed - 0.1).abs() < 1e-5, "elapsed after rearm = {}", elapsed);
        assert_eq!(scheduler.tick(0.45), vec![Cb::A]);
    }

    #[test]
    fn test_zero_duration_fires_next_tick() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(0.0, Cb::A);
        assert_eq!(scheduler.tick(0.0), vec![Cb::A]);
    }
}
