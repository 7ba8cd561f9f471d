//! Outstanding-Transaction Tracker.
//!
//! A fixed table indexed directly by AXI id. Each live entry remembers which
//! initiator issued the burst and how many beats are still to come, which is
//! all the router needs to steer an out-of-order response back to its owner.
//! The table never holds two live entries with the same id, so beats that
//! share an id can only ever belong to one burst.

use crate::axi::channels::Channel;
use crate::common::data::Direction;
use crate::common::error::{SimError, TrackerError};

/// One granted burst that has not finished yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutstandingRecord {
    /// AXI id the burst was issued with.
    pub id: u8,
    /// Index of the initiator that owns the burst.
    pub owner: usize,
    /// Direction of the burst.
    pub direction: Direction,
    /// Beats still to transfer: R beats for reads, W beats for writes.
    pub beats_remaining: u32,
    /// Beats the burst was issued with.
    pub beats: u32,
    /// Position of the burst within its logical request.
    pub descriptor: usize,
    /// The burst is the last of its logical request.
    pub is_final: bool,
}

impl OutstandingRecord {
    /// Zero-based index of the next beat to transfer.
    pub fn next_beat(&self) -> u32 {
        self.beats - self.beats_remaining
    }
}

/// Fixed-capacity table of outstanding bursts for one direction of one target.
#[derive(Clone, Debug)]
pub struct OutstandingTracker {
    direction: Direction,
    entries: Vec<Option<OutstandingRecord>>,
    live: usize,
    capacity: usize,
}

impl OutstandingTracker {
    /// Creates an empty table.
    ///
    /// # Arguments
    ///
    /// * `direction` - Direction of every burst tracked here.
    /// * `id_space` - Number of distinct ids (`1 << id_bits`).
    /// * `capacity` - Maximum number of live entries, at most `id_space`.
    pub fn new(direction: Direction, id_space: usize, capacity: usize) -> Self {
        Self {
            direction,
            entries: vec![None; id_space],
            live: 0,
            capacity: capacity.min(id_space),
        }
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.iter_mut().for_each(|e| *e = None);
        self.live = 0;
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn id_space(&self) -> usize {
        self.entries.len()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn is_full(&self) -> bool {
        self.live >= self.capacity
    }

    /// Returns `true` if a live entry uses `id`.
    pub fn is_live(&self, id: u8) -> bool {
        self.get(id).is_some()
    }

    /// Checks whether a burst with `id` could be inserted right now.
    ///
    /// The arbiter calls this before granting so that a refused insert never
    /// has to be undone.
    pub fn can_insert(&self, id: u8) -> Result<(), TrackerError> {
        match self.entries.get(id as usize) {
            None => Err(TrackerError::IdOutOfRange(id)),
            Some(Some(_)) => Err(TrackerError::IdInUse(id)),
            Some(None) if self.is_full() => Err(TrackerError::Full),
            Some(None) => Ok(()),
        }
    }

    /// Records a granted burst.
    pub fn insert(&mut self, record: OutstandingRecord) -> Result<(), TrackerError> {
        self.can_insert(record.id)?;
        self.entries[record.id as usize] = Some(record);
        self.live += 1;
        Ok(())
    }

    /// Returns the live entry for `id`, if any.
    pub fn get(&self, id: u8) -> Option<&OutstandingRecord> {
        self.entries.get(id as usize).and_then(Option::as_ref)
    }

    /// Looks up the entry a response on `channel` belongs to.
    ///
    /// # Returns
    ///
    /// The entry, or [`SimError::UnknownResponseId`] when the target answered
    /// an id the fabric has no burst outstanding for.
    pub fn lookup(&self, channel: Channel, id: u8) -> Result<&OutstandingRecord, SimError> {
        self.get(id)
            .ok_or(SimError::UnknownResponseId { channel, id })
    }

    /// Accounts for one transferred beat of the burst with `id`.
    ///
    /// # Returns
    ///
    /// A copy of the entry after the decrement.
    pub fn consume_beat(&mut self, channel: Channel, id: u8) -> Result<OutstandingRecord, SimError> {
        let record = self
            .entries
            .get_mut(id as usize)
            .and_then(Option::as_mut)
            .ok_or(SimError::UnknownResponseId { channel, id })?;
        record.beats_remaining = record.beats_remaining.saturating_sub(1);
        Ok(*record)
    }

    /// Removes the entry for `id` once all of its beats have transferred.
    ///
    /// # Returns
    ///
    /// The removed entry, or `None` if there is no entry or beats remain.
    pub fn complete(&mut self, id: u8) -> Option<OutstandingRecord> {
        let done = matches!(self.get(id), Some(record) if record.beats_remaining == 0);
        if !done {
            return None;
        }
        self.live -= 1;
        self.entries[id as usize].take()
    }

    /// Iterates over the live entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = &OutstandingRecord> {
        self.entries.iter().flatten()
    }
}
