//! Per-owner timer registry driven by simulated time.

use std::collections::BTreeMap;
use std::time::Duration;

/// Handle identifying a timer armed in a [`Scheduler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Timer that reached its deadline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fired<T> {
    /// Identifier of the timer that fired.
    pub id: TimerId,
    /// Simulation time the timer was due at.
    pub at: Duration,
    /// Payload supplied when the timer was armed.
    pub payload: T,
}

#[derive(Clone, Debug)]
struct Entry<T> {
    deadline: Duration,
    period: Option<Duration>,
    payload: T,
}

/// Per-owner registry of one-shot and repeating timers driven by ticks.
///
/// Time only moves through [`Scheduler::advance`]. Due timers are drained one
/// at a time through [`Scheduler::pop_due`] in deadline order (ties broken by
/// arming order), so a handler that cancels another timer prevents it from
/// firing within the same tick.
#[derive(Clone, Debug)]
pub struct Scheduler<T> {
    now: Duration,
    horizon: Duration,
    next_id: u64,
    entries: BTreeMap<TimerId, Entry<T>>,
}

impl<T: Clone> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Scheduler<T> {
    /// Creates an empty scheduler positioned at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            horizon: Duration::ZERO,
            next_id: 0,
            entries: BTreeMap::new(),
        }
    }

    /// Current simulation time as seen by the scheduler.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Arms a timer that fires once after `delay`.
    pub fn schedule_once(&mut self, delay: Duration, payload: T) -> TimerId {
        self.insert(self.now + delay, None, payload)
    }

    /// Arms a timer that fires every `period`, first after one period.
    ///
    /// Periods shorter than one millisecond are raised to one millisecond.
    pub fn schedule_repeating(&mut self, period: Duration, payload: T) -> TimerId {
        let period = period.max(Duration::from_millis(1));
        self.insert(self.now + period, Some(period), payload)
    }

    fn insert(&mut self, deadline: Duration, period: Option<Duration>, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let _ = self.entries.insert(
            id,
            Entry {
                deadline,
                period,
                payload,
            },
        );
        id
    }

    /// Disarms a timer. Returns `true` when the timer was still armed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Disarms every timer whose payload matches the predicate.
    ///
    /// Returns the number of timers that were disarmed.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !predicate(&entry.payload));
        before - self.entries.len()
    }

    /// Number of armed timers whose payload matches the predicate.
    #[must_use]
    pub fn count_where(&self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        self.entries
            .values()
            .filter(|entry| predicate(&entry.payload))
            .count()
    }

    /// Disarms every timer.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Reports whether a timer is still armed.
    #[must_use]
    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Deadline of an armed timer.
    #[must_use]
    pub fn deadline(&self, id: TimerId) -> Option<Duration> {
        self.entries.get(&id).map(|entry| entry.deadline)
    }

    /// Number of armed timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no timers are armed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Opens the window of time that [`Scheduler::pop_due`] drains.
    pub fn advance(&mut self, dt: Duration) {
        self.horizon = self.horizon.max(self.now) + dt;
    }

    /// Yields the earliest timer due within the current horizon.
    ///
    /// The scheduler clock moves to the fired timer's deadline, so timers
    /// armed by the handler are measured from the moment their parent fired.
    /// Once nothing remains due the clock settles on the horizon.
    pub fn pop_due(&mut self) -> Option<Fired<T>> {
        let next = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.deadline <= self.horizon)
            .min_by_key(|(id, entry)| (entry.deadline, **id))
            .map(|(id, _)| *id);

        let Some(id) = next else {
            self.now = self.horizon;
            return None;
        };

        let entry = self.entries.remove(&id)?;
        self.now = entry.deadline;
        if let Some(period) = entry.period {
            let _ = self.entries.insert(
                id,
                Entry {
                    deadline: entry.deadline + period,
                    period: entry.period,
                    payload: entry.payload.clone(),
                },
            );
        }

        Some(Fired {
            id,
            at: entry.deadline,
            payload: entry.payload,
        })
    }
}
