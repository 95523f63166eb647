//! Placement queue and submission ordering.
//!
//! The scheduler decides *when* an item reaches the layout executor. Ready
//! items go into a queue that is flushed by one batched layout pass; the
//! grid arms that pass on the event loop the first time the queue becomes
//! non-empty.
//!
//! With ordering enabled every submission takes a ticket, and an item that
//! becomes ready is held back until every earlier ticket is ready or
//! released. Without it, items are queued in the order they become ready.

use std::collections::{BTreeMap, HashMap};

use horizon_masonry_core::TaskId;
use horizon_masonry_core::logging::targets;

use crate::model::ItemId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TicketState {
    Waiting(ItemId),
    Ready(ItemId),
    Released,
}

/// Owns the pending-placement queue.
#[derive(Debug, Default)]
pub(crate) struct PlacementScheduler {
    queue: Vec<ItemId>,
    pass: Option<TaskId>,
    ensure_order: bool,
    tickets: BTreeMap<u64, TicketState>,
    ticket_of: HashMap<ItemId, u64>,
    next_ticket: u64,
}

impl PlacementScheduler {
    pub(crate) fn new(ensure_order: bool) -> Self {
        Self {
            ensure_order,
            ..Self::default()
        }
    }

    /// Records a submission. Only meaningful when ordering is enforced.
    pub(crate) fn take_ticket(&mut self, id: ItemId) {
        if !self.ensure_order {
            return;
        }
        if let Some(old) = self.ticket_of.remove(&id) {
            self.tickets.insert(old, TicketState::Released);
        }
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.tickets.insert(ticket, TicketState::Waiting(id));
        self.ticket_of.insert(id, ticket);
    }

    /// Marks `id` ready and returns the items that may now be queued, in order.
    pub(crate) fn mark_ready(&mut self, id: ItemId) -> Vec<ItemId> {
        match self.ticket_of.get(&id) {
            Some(&ticket) if self.ensure_order => {
                self.tickets.insert(ticket, TicketState::Ready(id));
                self.release_front()
            }
            _ => vec![id],
        }
    }

    /// Drops every trace of `id`. Returns items unblocked by its departure.
    pub(crate) fn forget(&mut self, id: ItemId) -> Vec<ItemId> {
        self.queue.retain(|&queued| queued != id);
        match self.ticket_of.remove(&id) {
            Some(ticket) => {
                self.tickets.insert(ticket, TicketState::Released);
                self.release_front()
            }
            None => Vec::new(),
        }
    }

    fn release_front(&mut self) -> Vec<ItemId> {
        let mut released = Vec::new();
        while let Some(entry) = self.tickets.first_entry() {
            match *entry.get() {
                TicketState::Waiting(_) => break,
                TicketState::Ready(id) => {
                    entry.remove();
                    self.ticket_of.remove(&id);
                    released.push(id);
                }
                TicketState::Released => {
                    entry.remove();
                }
            }
        }
        if let Some((&ticket, &TicketState::Waiting(id))) = self.tickets.first_key_value() {
            tracing::trace!(
                target: targets::SCHEDULER,
                ticket,
                item = id.as_u64(),
                behind = self.tickets.len() - 1,
                "placement held for earlier submission"
            );
        }
        released
    }

    /// Appends `id` to the queue. Returns `true` if a layout pass must be armed.
    pub(crate) fn enqueue(&mut self, id: ItemId) -> bool {
        self.queue.push(id);
        self.pass.is_none()
    }

    pub(crate) fn set_pass(&mut self, task: TaskId) {
        self.pass = Some(task);
    }

    pub(crate) fn take_pass(&mut self) -> Option<TaskId> {
        self.pass.take()
    }

    /// Takes the whole queue, disarming the pass so new items arm a fresh one.
    pub(crate) fn take_queue(&mut self) -> Vec<ItemId> {
        self.pass = None;
        std::mem::take(&mut self.queue)
    }

    /// Forgets queued items and tickets. An armed pass stays armed.
    pub(crate) fn reset(&mut self) {
        self.queue.clear();
        self.tickets.clear();
        self.ticket_of.clear();
    }

    pub(crate) fn set_ensure_order(&mut self, ensure_order: bool) {
        self.ensure_order = ensure_order;
    }

    pub(crate) fn queued(&self) -> &[ItemId] {
        &self.queue
    }

    #[cfg(test)]
    pub(crate) fn has_pass(&self) -> bool {
        self.pass.is_some()
    }
}
