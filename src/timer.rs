//! Virtual-time timer queue.
//!
//! The page runs on a single logical thread; timeouts and intervals are kept
//! here and fired by [`crate::page::Page::advance`]. `now` only moves when the
//! host advances it, which makes every delay observable in tests.

use std::time::Duration;

/// Smallest interval period; a zero period would fire forever at one instant.
const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Work a timer hands back to the component that scheduled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    PollSession,
    RedirectToLogin,
    ReloadPage,
    RestoreCopyControl(usize),
}

#[derive(Debug)]
struct Entry {
    id: TimerId,
    due: Duration,
    seq: u64,
    period: Option<Duration>,
    task: Task,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    next_seq: u64,
    entries: Vec<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time since the page was created.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Fire `task` once, `delay` from now.
    pub fn set_timeout(&mut self, delay: Duration, task: Task) -> TimerId {
        self.insert(delay, None, task)
    }

    /// Fire `task` every `period`, first one period from now.
    pub fn set_interval(&mut self, period: Duration, task: Task) -> TimerId {
        let period = period.max(MIN_PERIOD);
        self.insert(period, Some(period), task)
    }

    /// Cancel a timer. Returns false if it already fired or was cleared.
    pub fn clear(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Time until the earliest pending timer, if any.
    pub fn until_next(&self) -> Option<Duration> {
        self.entries
            .iter()
            .map(|entry| entry.due)
            .min()
            .map(|due| due.saturating_sub(self.now))
    }

    /// Pop the earliest timer due at or before `until`, moving `now` to its
    /// due time. Intervals are re-queued behind anything already due at the
    /// same instant.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, Task)> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due <= until)
            .min_by_key(|(_, entry)| (entry.due, entry.seq))
            .map(|(index, _)| index)?;

        let due = self.entries[index].due;
        let period = self.entries[index].period;
        self.now = self.now.max(due);

        match period {
            Some(period) => {
                let seq = self.bump_seq();
                let entry = &mut self.entries[index];
                entry.due = due + period;
                entry.seq = seq;
                Some((entry.id, entry.task))
            }
            None => {
                let entry = self.entries.swap_remove(index);
                Some((entry.id, entry.task))
            }
        }
    }

    /// Move the clock forward without firing anything.
    pub fn advance_to(&mut self, time: Duration) {
        self.now = self.now.max(time);
    }

    fn insert(&mut self, delay: Duration, period: Option<Duration>, task: Task) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let seq = self.bump_seq();
        self.entries.push(Entry {
            id,
            due: self.now + delay,
            seq,
            period,
            task,
        });
        id
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}
