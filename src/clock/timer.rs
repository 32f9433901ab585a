use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Handle of an armed timer, used to cancel it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/**
 * Virtual clock with cancellable one-shot timers.
 *
 * Every timer carries a task value of type `T` that is handed back when the timer fires.
 * Simulation time only moves when the owner pops due timers or advances the clock, so the
 * whole simulation runs on a single timeline and is fully deterministic.
 *
 * Timers fire in deadline order. Timers sharing a deadline fire in the order they were
 * scheduled. A cancelled timer never fires.
 *
 * # Fields
 * - `now`:         Current simulation time, measured from the start of the run.
 * - `next_id`:     Sequence used for timer ids, also the tie-breaker between equal deadlines.
 * - `armed`:       Pending timers ordered by (deadline, id).
 * - `deadlines`:   Reverse index from timer id to deadline, used for cancellation.
 */
#[derive(Debug)]
pub struct TimerService<T> {
    now: Duration,
    next_id: u64,
    armed: BTreeMap<(Duration, TimerId), T>,
    deadlines: HashMap<TimerId, Duration>,
}

impl<T> Default for TimerService<T> {
    fn default() -> Self {
        TimerService::new()
    }
}

impl<T> TimerService<T> {
    pub fn new() -> TimerService<T> {
        TimerService {
            now: Duration::ZERO,
            next_id: 0,
            armed: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Arms a timer firing `delay` after the current time.
    pub fn schedule(&mut self, delay: Duration, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        let deadline = self.now + delay;
        self.armed.insert((deadline, id), task);
        self.deadlines.insert(id, deadline);
        id
    }

    /// Returns false if the timer already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id) {
            Some(deadline) => self.armed.remove(&(deadline, id)).is_some(),
            None => false,
        }
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.armed.keys().next().map(|(deadline, _)| *deadline)
    }

    pub fn len(&self) -> usize {
        self.armed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.armed.is_empty()
    }

    /// Removes the earliest timer due at or before `until` and moves the clock to its deadline.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, T)> {
        let (deadline, id) = *self.armed.keys().next()?;
        if deadline > until {
            return None;
        }

        let task = self.armed.remove(&(deadline, id))?;
        self.deadlines.remove(&id);
        if deadline > self.now {
            self.now = deadline;
        }
        Some((id, task))
    }

    /// Moves the clock forward without firing anything. Never moves it backwards.
    pub fn advance_to(&mut self, time: Duration) {
        if time > self.now {
            self.now = time;
        }
    }
}
