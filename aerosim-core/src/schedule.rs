//! The ordered plan of publish ticks
//!
//! A schedule is pure data: tick `i` nominally fires `i * interval` after
//! the run starts. Ticks are independent; a slow or failed tick never moves
//! a later one. The scheduler enforces ordering only at scheduling time —
//! completion order of the underlying publishes is deliberately unordered.

use std::time::Duration;

/// One scheduled firing of the publish loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Position in the run, `0..count`.
    pub index: u32,
    /// Nominal delay from run start to this tick.
    pub offset: Duration,
}

/// Fixed-cadence plan for a bounded run of publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishSchedule {
    count: u32,
    interval: Duration,
}

impl PublishSchedule {
    /// Plan `count` ticks spaced `interval` apart.
    pub fn new(count: u32, interval: Duration) -> Self {
        Self { count, interval }
    }

    /// Total number of ticks in the run.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Delay between successive tick firings.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Nominal offset of tick `index` from run start.
    pub fn offset_of(&self, index: u32) -> Duration {
        self.interval * index
    }

    /// Whether `index` is the final tick of the run.
    pub fn is_last(&self, index: u32) -> bool {
        self.count > 0 && index == self.count - 1
    }

    /// Ticks in strictly increasing index order.
    pub fn ticks(&self) -> impl Iterator<Item = Tick> + '_ {
        (0..self.count).map(|index| Tick {
            index,
            offset: self.offset_of(index),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_scale_with_index() {
        let schedule = PublishSchedule::new(4, Duration::from_millis(500));
        assert_eq!(schedule.offset_of(0), Duration::ZERO);
        assert_eq!(schedule.offset_of(3), Duration::from_millis(1_500));
    }

    #[test]
    fn ticks_are_ordered_and_complete() {
        let schedule = PublishSchedule::new(3, Duration::from_millis(10));
        let indices: Vec<u32> = schedule.ticks().map(|t| t.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(schedule.is_last(2));
        assert!(!schedule.is_last(1));
    }

    #[test]
    fn empty_run_has_no_ticks() {
        let schedule = PublishSchedule::new(0, Duration::from_millis(10));
        assert_eq!(schedule.ticks().count(), 0);
        assert!(!schedule.is_last(0));
    }
}
