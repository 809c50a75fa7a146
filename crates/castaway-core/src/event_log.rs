//! Append-only event chain with a world snapshot per event.
//!
//! Every logged event links to its parent (the event appended just before
//! it unless the caller overrides it) and stores a deep copy of the world
//! taken right after the mutation it describes. The log never mutates an
//! event after appending it; [`EventLog::branch_from`] only ever drops a
//! suffix.
//!
//! Snapshots are full copies. That keeps `jump_to` and `branch_from` trivial
//! at the cost of memory proportional to `events x world size`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use castaway_types::{Event, EventId};
use castaway_world::World;

/// Ordered events and the world as it stood after each of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
    snapshots: BTreeMap<EventId, World>,
}

impl EventLog {
    /// An empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from saved parts.
    pub const fn from_parts(events: Vec<Event>, snapshots: BTreeMap<EventId, World>) -> Self {
        Self { events, snapshots }
    }

    /// Append `event` and snapshot `world`.
    ///
    /// If the event carries no parent it is linked to the last event in
    /// the log. Returns the appended event's id.
    pub fn log_event(&mut self, mut event: Event, world: &World) -> EventId {
        if event.parent_event_id.is_none() {
            event.parent_event_id = self.last_id();
        }
        let id = event.id;
        debug!(
            event_id = %id,
            event_type = ?event.event_type,
            tick = event.tick,
            "event logged"
        );
        self.snapshots.insert(id, world.clone());
        self.events.push(event);
        id
    }

    /// An independent copy of the world after event `id`.
    pub fn jump_to(&self, id: EventId) -> Option<World> {
        self.snapshots.get(&id).cloned()
    }

    /// Drop every event after `id` and return the world at `id`.
    ///
    /// Returns `None` (and leaves the log untouched) if `id` is unknown.
    pub fn branch_from(&mut self, id: EventId) -> Option<World> {
        let position = self.position(id)?;
        let world = self.snapshots.get(&id).cloned()?;
        let dropped = self.events.split_off(position.saturating_add(1));
        for event in &dropped {
            self.snapshots.remove(&event.id);
        }
        debug!(event_id = %id, dropped = dropped.len(), "timeline branched");
        Some(world)
    }

    /// Id of the newest event.
    pub fn last_id(&self) -> Option<EventId> {
        self.events.last().map(|e| e.id)
    }

    /// Look up one event.
    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Index of an event in append order.
    pub fn position(&self, id: EventId) -> Option<usize> {
        self.events.iter().position(|e| e.id == id)
    }

    /// All events, oldest first.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events logged during `tick`.
    pub fn events_at(&self, tick: u64) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.tick == tick)
    }

    /// All snapshots keyed by event id.
    pub const fn snapshots(&self) -> &BTreeMap<EventId, World> {
        &self.snapshots
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Consume the log, yielding its parts.
    pub fn into_parts(self) -> (Vec<Event>, BTreeMap<EventId, World>) {
        (self.events, self.snapshots)
    }
}
