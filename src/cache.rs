use std::collections::HashMap;

use crate::models::Event;

/// Events keyed by id, in display order.
///
/// Writes replace whole entries (last write wins) with two exceptions: ids
/// removed by a successful delete stay dead until a full list requested after
/// the delete arrives, and a response older than the cached copy (by
/// `updated_at`) is ignored.
#[derive(Debug, Default)]
pub struct EventCache {
    events: Vec<Event>,
    deleted: HashMap<String, u64>,
    removals: u64,
}

/// Position in the delete history at the moment a full list was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadMark(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced,
    Stale,
    Deleted,
}

impl EventCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<Event> {
        self.events.clone()
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|event| event.id == id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn reload_mark(&self) -> ReloadMark {
        ReloadMark(self.removals)
    }

    /// Replaces everything with a list that reflects every delete so far.
    pub fn replace_all(&mut self, events: Vec<Event>) {
        let mark = self.reload_mark();
        self.replace_loaded(events, mark);
    }

    /// Replaces everything with a list requested at `mark`. Ids deleted after
    /// the mark are left out of it and keep their tombstones.
    pub fn replace_loaded(&mut self, events: Vec<Event>, mark: ReloadMark) {
        self.deleted.retain(|_, removed_at| *removed_at > mark.0);
        self.events.clear();
        for event in events {
            if self.deleted.contains_key(&event.id) {
                tracing::debug!(event_id = %event.id, "dropping deleted event from list");
                continue;
            }
            match self.position(&event.id) {
                Some(index) => self.events[index] = event,
                None => self.events.push(event),
            }
        }
    }

    pub fn upsert(&mut self, event: Event) -> Upsert {
        if self.deleted.contains_key(&event.id) {
            tracing::debug!(event_id = %event.id, "dropping update for deleted event");
            return Upsert::Deleted;
        }
        match self.position(&event.id) {
            Some(index) => {
                if is_older(&event, &self.events[index]) {
                    tracing::debug!(event_id = %event.id, "dropping stale event response");
                    return Upsert::Stale;
                }
                self.events[index] = event;
                Upsert::Replaced
            }
            None => {
                self.events.push(event);
                Upsert::Inserted
            }
        }
    }

    /// Puts a newly created event at the front.
    pub fn prepend(&mut self, event: Event) -> Upsert {
        if self.deleted.contains_key(&event.id) {
            return Upsert::Deleted;
        }
        let outcome = match self.position(&event.id) {
            Some(index) => {
                self.events.remove(index);
                Upsert::Replaced
            }
            None => Upsert::Inserted,
        };
        self.events.insert(0, event);
        outcome
    }

    pub fn remove(&mut self, id: &str) -> Option<Event> {
        self.removals += 1;
        self.deleted.insert(id.to_string(), self.removals);
        let index = self.position(id)?;
        Some(self.events.remove(index))
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.events.iter().position(|event| event.id == id)
    }
}

fn is_older(incoming: &Event, cached: &Event) -> bool {
    match (incoming.updated_at_utc(), cached.updated_at_utc()) {
        (Some(new), Some(old)) => new < old,
        _ => false,
    }
}
