//! Cooperative continuations: "resume after this long" tasks that fire
//! exactly once, in due order, when the owner advances the clock.

use core::cmp::Ordering;
use core::time::Duration;
use std::collections::{BinaryHeap, HashSet};

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug)]
struct Entry<T> {
    due: Duration,
    seq: u64,
    task: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    // Reversed so the max-heap pops the earliest entry first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_seq: u64,
    queue: BinaryHeap<Entry<T>>,
    live: HashSet<u64>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            queue: BinaryHeap::new(),
            live: HashSet::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn now(&self) -> Duration {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.live.len()
    }

    pub fn is_idle(&self) -> bool {
        self.live.is_empty()
    }

    /// Queues `task` to resume once the clock has moved `delay` past now.
    pub fn schedule(&mut self, delay: Duration, task: T) -> TaskHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Entry {
            due: self.now.saturating_add(delay),
            seq,
            task,
        });
        self.live.insert(seq);
        TaskHandle(seq)
    }

    /// Returns `false` when the task already ran or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        self.live.remove(&handle.0)
    }

    /// Drops every pending task. Returns how many were defused.
    pub fn cancel_all(&mut self) -> usize {
        let defused = self.live.len();
        self.queue.clear();
        self.live.clear();
        if defused > 0 {
            debug!("Cancelled {defused} pending continuations");
        }
        defused
    }

    pub fn advance_clock(&mut self, delta: Duration) {
        self.now = self.now.saturating_add(delta);
    }

    /// The next task whose due time has passed, skipping cancelled ones.
    pub fn pop_due(&mut self) -> Option<T> {
        while self.queue.peek().is_some_and(|entry| entry.due <= self.now) {
            let entry = self.queue.pop()?;
            if self.live.remove(&entry.seq) {
                return Some(entry.task);
            }
        }
        None
    }

    /// Advances the clock and drains every task that became due.
    pub fn advance(&mut self, delta: Duration) -> Vec<T> {
        self.advance_clock(delta);
        core::iter::from_fn(|| self.pop_due()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn tasks_fire_once_after_their_delay() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(MS * 250, "resolve");
        assert!(scheduler.advance(MS * 249).is_empty(), "not due yet");
        assert_eq!(scheduler.advance(MS), vec!["resolve"], "due exactly at 250ms");
        assert!(scheduler.advance(MS * 1000).is_empty(), "never fires twice");
        assert!(scheduler.is_idle(), "nothing left");
    }

    #[test]
    fn due_tasks_come_out_in_time_then_insertion_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(MS * 30, 3);
        scheduler.schedule(MS * 10, 1);
        scheduler.schedule(MS * 30, 4);
        scheduler.schedule(MS * 20, 2);
        assert_eq!(scheduler.advance(MS * 100), vec![1, 2, 3, 4], "ordered");
    }

    #[test]
    fn cancelled_tasks_never_fire() {
        let mut scheduler = Scheduler::new();
        let doomed = scheduler.schedule(MS * 5, "doomed");
        scheduler.schedule(MS * 5, "kept");
        assert!(scheduler.cancel(doomed), "pending task cancels");
        assert!(!scheduler.cancel(doomed), "second cancel is a no-op");
        assert_eq!(scheduler.advance(MS * 5), vec!["kept"], "only the kept task");
    }

    #[test]
    fn cancel_all_defuses_everything_in_flight() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(MS * 5, 'a');
        scheduler.schedule(MS * 50, 'b');
        assert_eq!(scheduler.cancel_all(), 2, "both defused");
        assert!(scheduler.advance(MS * 100).is_empty(), "nothing resumes");
        scheduler.schedule(MS, 'c');
        assert_eq!(scheduler.advance(MS), vec!['c'], "new work still runs");
    }
}
