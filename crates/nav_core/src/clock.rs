use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use bevy_ecs::prelude::Resource;

pub const ONE_SEC_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    /// An operator command or sensor update waiting in [`crate::navigation::PendingInputs`].
    InputReceived,
    SimulationTick,
    RecalculateRoute,
    RouteFetched,
}

/// Identifies one scheduled timer firing so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

/// Identifies one route request in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FetchTicket(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSubject {
    Timer(TimerHandle),
    Fetch(FetchTicket),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub timestamp: u64,
    pub seq: u64,
    pub kind: EventKind,
    pub subject: Option<EventSubject>,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by timestamp, FIFO within a timestamp.
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The event currently being processed by the schedule.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);

/// Virtual millisecond clock plus the pending event queue.
#[derive(Debug, Default, Resource)]
pub struct SimulationClock {
    now: u64,
    next_seq: u64,
    events: BinaryHeap<Event>,
    cancelled: HashSet<TimerHandle>,
}

impl SimulationClock {
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn schedule_at(&mut self, timestamp: u64, kind: EventKind, subject: Option<EventSubject>) {
        debug_assert!(
            timestamp >= self.now,
            "event timestamp must be >= current time"
        );
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(Event {
            timestamp: timestamp.max(self.now),
            seq,
            kind,
            subject,
        });
    }

    pub fn schedule_in(&mut self, delay_ms: u64, kind: EventKind, subject: Option<EventSubject>) {
        self.schedule_at(self.now.saturating_add(delay_ms), kind, subject);
    }

    /// Schedule a cancellable timer firing `delay_ms` from now.
    pub fn schedule_timer_in(&mut self, delay_ms: u64, kind: EventKind) -> TimerHandle {
        // Sequence numbers are unique, so they double as timer identities.
        let handle = TimerHandle(self.next_seq);
        self.schedule_in(delay_ms, kind, Some(EventSubject::Timer(handle)));
        handle
    }

    /// Cancel a timer firing. The event is dropped when it reaches the head of the queue.
    pub fn cancel(&mut self, handle: TimerHandle) {
        let pending = self
            .events
            .iter()
            .any(|e| e.subject == Some(EventSubject::Timer(handle)));
        if pending {
            self.cancelled.insert(handle);
        }
    }

    /// Drop every pending timer firing; other events stay queued.
    pub fn cancel_all_timers(&mut self) {
        let handles: Vec<TimerHandle> = self
            .events
            .iter()
            .filter_map(|e| match e.subject {
                Some(EventSubject::Timer(handle)) => Some(handle),
                _ => None,
            })
            .collect();
        self.cancelled.extend(handles);
    }

    pub fn pop_next(&mut self) -> Option<Event> {
        self.discard_cancelled_head();
        let event = self.events.pop()?;
        self.now = event.timestamp;
        Some(event)
    }

    pub fn next_event_time(&mut self) -> Option<u64> {
        self.discard_cancelled_head();
        self.events.peek().map(|e| e.timestamp)
    }

    /// Move the clock forward without an event (idle time between events).
    pub fn advance_to(&mut self, timestamp: u64) {
        self.now = self.now.max(timestamp);
    }

    pub fn is_empty(&mut self) -> bool {
        self.discard_cancelled_head();
        self.events.is_empty()
    }

    pub fn pending_events(&self) -> usize {
        self.events.len() - self.cancelled.len()
    }

    fn discard_cancelled_head(&mut self) {
        while let Some(head) = self.events.peek() {
            let Some(EventSubject::Timer(handle)) = head.subject else {
                break;
            };
            if !self.cancelled.remove(&handle) {
                break;
            }
            self.events.pop();
        }
    }
}

/// A periodic task on the [`SimulationClock`]: only the most recently armed
/// firing is current, so stale firings can be recognised and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatingTimer {
    kind: EventKind,
    period_ms: u64,
    handle: Option<TimerHandle>,
}

impl RepeatingTimer {
    pub fn new(kind: EventKind, period_ms: u64) -> Self {
        Self {
            kind,
            period_ms: period_ms.max(1),
            handle: None,
        }
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }

    pub fn is_current(&self, handle: TimerHandle) -> bool {
        self.handle == Some(handle)
    }

    /// (Re)start the period from now, dropping any pending firing.
    pub fn arm(&mut self, clock: &mut SimulationClock) {
        self.cancel(clock);
        self.handle = Some(clock.schedule_timer_in(self.period_ms, self.kind));
    }

    /// Schedule the next firing after the current one has been handled.
    pub fn rearm(&mut self, clock: &mut SimulationClock) {
        self.handle = Some(clock.schedule_timer_in(self.period_ms, self.kind));
    }

    /// Change the period; an armed timer restarts with the new period.
    pub fn set_period(&mut self, period_ms: u64, clock: &mut SimulationClock) {
        let period_ms = period_ms.max(1);
        if period_ms == self.period_ms {
            return;
        }
        self.period_ms = period_ms;
        if self.is_armed() {
            self.arm(clock);
        }
    }

    pub fn cancel(&mut self, clock: &mut SimulationClock) {
        if let Some(handle) = self.handle.take() {
            clock.cancel(handle);
        }
    }
}
