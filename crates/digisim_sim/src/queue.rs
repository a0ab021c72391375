//! The time-ordered event queue.
//!
//! A binary min-heap keyed by `(time, insertion sequence)`. The sequence
//! number gives same-timestamp events FIFO order, which the kernel relies
//! on: a node update scheduled while processing time `T` must fire after
//! everything already queued at `T` and before anything queued later.
//!
//! The queue's one unusual operation is [`EventQueue::purge_node_updates`]:
//! targeted cancellation of pending node updates, the mechanism behind
//! inertial-delay glitch suppression. Purging is linear in queue length;
//! it only runs when an input change invalidates an in-flight gate output,
//! so the cost is bounded by real circuit activity.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use digisim_common::SimTime;
use digisim_netlist::NodeId;

use crate::event::Event;

/// An event with its scheduling key.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Scheduled {
    time: SimTime,
    seq: u64,
    event: Event,
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time.cmp(&other.time).then(self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A priority queue of [`Event`]s ordered by ascending time, FIFO within a
/// timestamp.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<Scheduled>>,
    next_seq: u64,
}

impl EventQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `event` at `time`.
    pub fn push(&mut self, time: SimTime, event: Event) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Scheduled { time, seq, event }));
    }

    /// Removes and returns the earliest event, with its timestamp.
    pub fn pop(&mut self) -> Option<(SimTime, Event)> {
        self.heap.pop().map(|Reverse(s)| (s.time, s.event))
    }

    /// The timestamp of the earliest pending event.
    pub fn peek_time(&self) -> Option<SimTime> {
        self.heap.peek().map(|Reverse(s)| s.time)
    }

    /// Whether any events are pending.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Cancels every pending [`Event::NodeUpdate`] targeting `node` and
    /// returns how many were removed.
    ///
    /// The caller pairs each removal with a `revert()` on the gate driving
    /// `node`, undoing the speculative commit that scheduled the update.
    /// Surviving events keep their original sequence numbers, so FIFO
    /// ordering is unaffected.
    pub fn purge_node_updates(&mut self, node: NodeId) -> usize {
        let before = self.heap.len();
        let kept: Vec<Reverse<Scheduled>> = std::mem::take(&mut self.heap)
            .into_iter()
            .filter(|Reverse(s)| !matches!(s.event, Event::NodeUpdate { node: n, .. } if n == node))
            .collect();
        self.heap = BinaryHeap::from(kept);
        before - self.heap.len()
    }
}
