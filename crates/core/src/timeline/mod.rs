use std::{
    collections::{BTreeMap, HashMap},
    time::Duration,
};

/// Repeating timers never fire more often than this.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Virtual clock shared by every timer of a presentation. It only moves
/// forward.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackClock {
    now: Duration,
}

impl PlaybackClock {
    pub fn start() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Moves the clock to `time` unless it is already past it.
    pub fn advance_to(&mut self, time: Duration) {
        self.now = self.now.max(time);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// A timer that has come due, handed back to the owner for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledEvent<T> {
    pub id: TimerId,
    pub due: Duration,
    pub task: T,
}

#[derive(Debug)]
struct Entry<T> {
    id: TimerId,
    task: T,
    every: Option<Duration>,
}

/// Single-threaded timer queue over a [`PlaybackClock`].
///
/// Timers are keyed by due time and then by the order they were queued, so
/// two timers due at the same instant fire in scheduling order. Nothing runs
/// on its own: the owner pulls due work with [`Scheduler::pop_due`] and
/// dispatches it.
#[derive(Debug)]
pub struct Scheduler<T> {
    clock: PlaybackClock,
    next_seq: u64,
    queue: BTreeMap<(Duration, u64), Entry<T>>,
    index: HashMap<TimerId, (Duration, u64)>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            clock: PlaybackClock::start(),
            next_seq: 0,
            queue: BTreeMap::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Number of outstanding timers, repeating ones included.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.index.contains_key(&id)
    }

    /// Queues `task` to fire once, `delay` from now.
    pub fn after(&mut self, delay: Duration, task: T) -> TimerId {
        let id = TimerId(self.next_seq);
        self.insert(self.now().saturating_add(delay), id, task, None);
        id
    }

    /// Queues `task` to fire every `interval`, first at `now + interval`.
    pub fn every(&mut self, interval: Duration, task: T) -> TimerId {
        let interval = interval.max(MIN_INTERVAL);
        let id = TimerId(self.next_seq);
        self.insert(self.now().saturating_add(interval), id, task, Some(interval));
        id
    }

    /// Cancels a timer. Returns `false` when it already fired or never existed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.index.remove(&id) {
            Some(key) => self.queue.remove(&key).is_some(),
            None => false,
        }
    }

    /// Drops every outstanding timer without firing it.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.index.clear();
    }

    /// Moves the clock to `until` once everything due before it was popped.
    pub fn settle(&mut self, until: Duration) {
        self.clock.advance_to(until);
    }

    fn insert(&mut self, due: Duration, id: TimerId, task: T, every: Option<Duration>) {
        let key = (due, self.next_seq);
        self.next_seq += 1;
        self.index.insert(id, key);
        self.queue.insert(key, Entry { id, task, every });
    }
}

impl<T: Clone> Scheduler<T> {
    /// Removes and returns the earliest timer due at or before `until`,
    /// advancing the clock to its due time. Repeating timers are re-armed
    /// before they are returned.
    pub fn pop_due(&mut self, until: Duration) -> Option<ScheduledEvent<T>> {
        let (&key, _) = self.queue.first_key_value()?;
        let (due, _) = key;
        if due > until {
            return None;
        }

        let entry = self.queue.remove(&key)?;
        self.index.remove(&entry.id);
        self.clock.advance_to(due);

        if let Some(every) = entry.every {
            self.insert(due.saturating_add(every), entry.id, entry.task.clone(), Some(every));
        }

        Some(ScheduledEvent {
            id: entry.id,
            due,
            task: entry.task,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn drain(scheduler: &mut Scheduler<&'static str>, until: Duration) -> Vec<(u128, &'static str)> {
        let mut fired = Vec::new();
        while let Some(event) = scheduler.pop_due(until) {
            fired.push((event.due.as_millis(), event.task));
        }
        scheduler.settle(until);
        fired
    }

    #[test]
    fn fires_in_due_order_then_scheduling_order() {
        let mut scheduler = Scheduler::new();
        scheduler.after(ms(200), "late");
        scheduler.after(ms(100), "first");
        scheduler.after(ms(100), "second");
        scheduler.after(ms(0), "now");

        let fired = drain(&mut scheduler, ms(150));
        assert_eq!(fired, vec![(0, "now"), (100, "first"), (100, "second")]);
        assert_eq!(scheduler.now(), ms(150));
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn repeating_timers_rearm_until_cancelled() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.every(ms(800), "tick");

        let fired = drain(&mut scheduler, ms(4000));
        assert_eq!(fired.len(), 5);
        assert!(scheduler.is_scheduled(id));

        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert!(drain(&mut scheduler, ms(10_000)).is_empty());
    }

    #[test]
    fn delays_are_relative_to_the_current_time() {
        let mut scheduler = Scheduler::new();
        drain(&mut scheduler, ms(1000));
        scheduler.after(ms(500), "later");

        assert!(drain(&mut scheduler, ms(1499)).is_empty());
        assert_eq!(drain(&mut scheduler, ms(1500)), vec![(1500, "later")]);
    }

    #[test]
    fn zero_interval_is_clamped() {
        let mut scheduler = Scheduler::new();
        scheduler.every(Duration::ZERO, "spin");
        assert_eq!(drain(&mut scheduler, ms(5)).len(), 5);
    }

    #[test]
    fn clear_drops_everything() {
        let mut scheduler = Scheduler::new();
        scheduler.after(ms(10), "once");
        scheduler.every(ms(10), "again");
        scheduler.clear();

        assert_eq!(scheduler.pending(), 0);
        assert!(drain(&mut scheduler, ms(100)).is_empty());
    }

    #[test]
    fn clock_never_moves_backwards() {
        let mut clock = PlaybackClock::start();
        clock.advance_to(ms(30));
        clock.advance_to(ms(10));
        assert_eq!(clock.now(), ms(30));

        let mut scheduler = Scheduler::<&'static str>::new();
        scheduler.settle(ms(50));
        scheduler.settle(ms(20));
        assert_eq!(scheduler.now(), ms(50));
    }
}
