//! Read path: port acceptance, AR arbitration and R routing.

use super::{CycleDecisions, FabricState, ReadTxn};
use crate::axi::burst::BurstDescriptor;
use crate::axi::channels::{ArChannel, AxiIo, Channel, RChannel};
use crate::common::data::Direction;
use crate::common::error::SimError;
use crate::fabric::ports::{ReadPort, ReadResp};
use crate::fabric::tracker::OutstandingRecord;
use log::{debug, trace, warn};

impl FabricState {
    /// Burst of read initiator `index` waiting for its AR handshake.
    fn next_read_burst(&self, index: usize) -> Option<&BurstDescriptor> {
        self.read_slots[index]
            .as_ref()
            .and_then(|txn| txn.bursts.get(txn.next_issue))
    }

    /// Returns `true` if initiator `index` may be granted AR this cycle.
    fn read_issuable(&self, index: usize) -> bool {
        self.next_read_burst(index)
            .is_some_and(|burst| self.read_table.can_insert(burst.id).is_ok())
    }

    pub(super) fn read_id_blocked(&self, index: usize) -> bool {
        self.next_read_burst(index)
            .is_some_and(|burst| self.read_table.is_live(burst.id))
    }

    /// Drives `req.ready` and clears the response outputs of every read port.
    pub(super) fn drive_read_ports(&self, ports: &mut [ReadPort]) {
        for (index, port) in ports.iter_mut().enumerate() {
            let free = self.read_slots[index].is_none();
            let req = port.req;
            port.req.ready = free
                && (!req.valid || self.request_legal(req.addr, req.total_size, req.id));
            port.resp = ReadResp {
                ready: port.resp.ready,
                ..ReadResp::default()
            };
        }
    }

    /// Steers the beat presented on R, if any, to the initiator that owns its id.
    ///
    /// # Returns
    ///
    /// The owning initiator, or a fatal error for an unknown id or a
    /// misplaced `rlast`.
    pub(super) fn route_r(
        &self,
        r: &mut RChannel,
        ports: &mut [ReadPort],
    ) -> Result<Option<usize>, SimError> {
        if !r.rvalid {
            r.rready = false;
            return Ok(None);
        }

        let record = self.read_table.lookup(Channel::R, r.rid)?;
        let beat = record.next_beat();
        let at_last = record.beats_remaining == 1;
        if r.rlast != at_last {
            return Err(SimError::LastMismatch {
                id: r.rid,
                beat,
                beats: record.beats,
                rlast: r.rlast,
            });
        }

        let txn = self.read_slots[record.owner]
            .as_ref()
            .ok_or(SimError::UnknownResponseId {
                channel: Channel::R,
                id: r.rid,
            })?;
        let burst = &txn.bursts[record.descriptor];
        let port = &mut ports[record.owner];
        port.resp.valid = true;
        port.resp.data = r.rdata;
        port.resp.strb = burst.beat_strb(beat, self.translator.data_bytes());
        port.resp.addr = burst.beat_range(beat).start as u32;
        port.resp.resp = r.rresp;
        port.resp.id = txn.id;
        port.resp.last = at_last && record.is_final;
        r.rready = port.resp.ready;
        Ok(Some(record.owner))
    }

    /// Puts the granted read burst, if any, on AR.
    ///
    /// A burst already presented and not yet accepted keeps the channel, so
    /// `arvalid` and the payload stay stable until the handshake.
    pub(super) fn drive_ar(&self, ar: &mut ArChannel) -> Option<usize> {
        let owner = self
            .ar_hold
            .or_else(|| self.read_arb.pick(|index| self.read_issuable(index)));
        let granted = owner.and_then(|index| self.next_read_burst(index).map(|b| (index, b)));

        match granted {
            Some((index, burst)) => {
                ar.arvalid = true;
                ar.araddr = burst.addr;
                ar.arid = burst.id;
                ar.arlen = burst.len;
                ar.arsize = burst.size;
                ar.arburst = burst.burst;
                Some(index)
            }
            None => {
                ar.arvalid = false;
                ar.araddr = 0;
                ar.arid = 0;
                ar.arlen = 0;
                ar.arsize = 0;
                ar.arburst = Default::default();
                None
            }
        }
    }

    /// Latches read-side state at the clock edge.
    pub(super) fn commit_reads(
        &mut self,
        decisions: &CycleDecisions,
        ports: &[ReadPort],
        io: &AxiIo,
    ) -> Result<(), SimError> {
        for (index, port) in ports.iter().enumerate() {
            let req = &port.req;
            if req.fire() {
                let bursts = self.translator.translate(req.addr, req.total_size, req.id)?;
                debug!(
                    "read port {} accepted id {} {:#010x}+{} as {} burst(s)",
                    index,
                    req.id,
                    req.addr,
                    req.total_size,
                    bursts.len()
                );
                self.read_slots[index] = Some(ReadTxn {
                    id: req.id,
                    bursts,
                    next_issue: 0,
                });
                self.read_rejected[index] = false;
            } else if req.valid && self.read_slots[index].is_none() {
                if !self.read_rejected[index] {
                    warn!(
                        "read port {} request id {} {:#010x}+{} is not expressible, holding ready low",
                        index, req.id, req.addr, req.total_size
                    );
                }
                self.read_rejected[index] = true;
            } else {
                self.read_rejected[index] = false;
            }
        }

        if io.r.fire() {
            let record = self.read_table.consume_beat(Channel::R, io.r.rid)?;
            trace!(
                "R beat id {} -> read port {} ({} left)",
                io.r.rid,
                record.owner,
                record.beats_remaining
            );
            if record.beats_remaining == 0 {
                self.read_table.complete(io.r.rid);
                if record.is_final {
                    self.read_slots[record.owner] = None;
                    debug!("read port {} request id {} complete", record.owner, io.r.rid);
                }
            }
        }

        match decisions.ar_owner {
            Some(owner) if io.ar.fire() => {
                let Some(txn) = self.read_slots[owner].as_mut() else {
                    return Ok(());
                };
                let burst = txn.bursts[txn.next_issue];
                self.read_table.insert(OutstandingRecord {
                    id: burst.id,
                    owner,
                    direction: Direction::Read,
                    beats_remaining: burst.beats(),
                    beats: burst.beats(),
                    descriptor: txn.next_issue,
                    is_final: burst.last,
                })?;
                debug!(
                    "AR grant read port {} id {} {:#010x} len {} size {}",
                    owner, burst.id, burst.addr, burst.len, burst.size
                );
                txn.next_issue += 1;
                self.read_arb.advance(owner);
                self.ar_hold = None;
            }
            owner => self.ar_hold = owner,
        }
        Ok(())
    }
}
