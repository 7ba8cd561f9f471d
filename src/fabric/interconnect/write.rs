//! Write path: port acceptance, AW arbitration, W sequencing and B routing.

use super::{CycleDecisions, FabricState, PendingWrite, WriteTxn};
use crate::axi::burst::BurstDescriptor;
use crate::axi::channels::{AwChannel, AxiIo, BChannel, Channel, Resp, WChannel};
use crate::common::data::Direction;
use crate::common::error::SimError;
use crate::fabric::ports::{WritePort, WriteResp};
use crate::fabric::tracker::OutstandingRecord;
use log::{debug, trace, warn};

impl WriteTxn {
    /// Packs the request bytes of beat `beat` of `burst` onto the data lanes.
    ///
    /// # Returns
    ///
    /// `(wdata, wstrb)` with only the lanes of request bytes set.
    fn beat_lanes(&self, burst: &BurstDescriptor, beat: u32, data_bytes: u32) -> (u64, u8) {
        let mut wdata = 0u64;
        let mut wstrb = 0u8;
        for byte in burst.beat_range(beat) {
            let lane = (byte % data_bytes as u64) as u32;
            let value = self.data[(byte - self.addr as u64) as usize];
            wdata |= (value as u64) << (8 * lane);
            wstrb |= 1 << lane;
        }
        (wdata, wstrb)
    }
}

impl FabricState {
    /// Burst of write initiator `index` waiting for its AW handshake.
    fn next_write_burst(&self, index: usize) -> Option<&BurstDescriptor> {
        self.write_slots[index]
            .as_ref()
            .and_then(|txn| txn.bursts.get(txn.next_issue))
    }

    fn write_issuable(&self, index: usize) -> bool {
        self.next_write_burst(index)
            .is_some_and(|burst| self.write_table.can_insert(burst.id).is_ok())
    }

    pub(super) fn write_id_blocked(&self, index: usize) -> bool {
        self.next_write_burst(index)
            .is_some_and(|burst| self.write_table.is_live(burst.id))
    }

    /// Drives `req.ready` and clears the response outputs of every write port.
    pub(super) fn drive_write_ports(&self, ports: &mut [WritePort]) {
        for (index, port) in ports.iter_mut().enumerate() {
            let free = self.write_slots[index].is_none();
            let req = &port.req;
            let ready = free
                && (!req.valid
                    || (req.data.len() == req.total_size as usize
                        && self.request_legal(req.addr, req.total_size, req.id)));
            port.req.ready = ready;
            port.resp = WriteResp {
                ready: port.resp.ready,
                ..WriteResp::default()
            };
        }
    }

    /// Handles the response presented on B, if any.
    ///
    /// Responses to intermediate bursts of a request are absorbed by the fabric;
    /// the response to the final burst is forwarded to the owning initiator with
    /// the merged response code of all bursts.
    pub(super) fn route_b(
        &self,
        b: &mut BChannel,
        ports: &mut [WritePort],
    ) -> Result<Option<usize>, SimError> {
        if !b.bvalid {
            b.bready = false;
            return Ok(None);
        }

        let record = self.write_table.lookup(Channel::B, b.bid)?;
        if record.beats_remaining > 0 {
            return Err(SimError::PrematureWriteResponse {
                id: b.bid,
                beats_remaining: record.beats_remaining,
            });
        }

        if !record.is_final {
            b.bready = true;
            return Ok(Some(record.owner));
        }

        let txn = self.write_slots[record.owner]
            .as_ref()
            .ok_or(SimError::UnknownResponseId {
                channel: Channel::B,
                id: b.bid,
            })?;
        let port = &mut ports[record.owner];
        port.resp.valid = true;
        port.resp.id = txn.id;
        port.resp.resp = txn.resp.merge(b.bresp);
        b.bready = port.resp.ready;
        Ok(Some(record.owner))
    }

    /// Puts the granted write burst, if any, on AW. Held like AR.
    pub(super) fn drive_aw(&self, aw: &mut AwChannel) -> Option<usize> {
        let owner = self
            .aw_hold
            .or_else(|| self.write_arb.pick(|index| self.write_issuable(index)));
        let granted = owner.and_then(|index| self.next_write_burst(index).map(|b| (index, b)));

        match granted {
            Some((index, burst)) => {
                aw.awvalid = true;
                aw.awaddr = burst.addr;
                aw.awid = burst.id;
                aw.awlen = burst.len;
                aw.awsize = burst.size;
                aw.awburst = burst.burst;
                Some(index)
            }
            None => {
                aw.awvalid = false;
                aw.awaddr = 0;
                aw.awid = 0;
                aw.awlen = 0;
                aw.awsize = 0;
                aw.awburst = Default::default();
                None
            }
        }
    }

    /// Drives the next W beat of the oldest granted write burst.
    pub(super) fn drive_w(&self, w: &mut WChannel) -> Result<Option<usize>, SimError> {
        let Some(head) = self.w_queue.front() else {
            w.wvalid = false;
            w.wid = 0;
            w.wdata = 0;
            w.wstrb = 0;
            w.wlast = false;
            return Ok(None);
        };

        let record = self.write_table.lookup(Channel::W, head.id)?;
        let txn = self.write_slots[head.owner]
            .as_ref()
            .ok_or(SimError::UnknownResponseId {
                channel: Channel::W,
                id: head.id,
            })?;
        let burst = &txn.bursts[record.descriptor];
        let beat = record.next_beat();
        let (wdata, wstrb) = txn.beat_lanes(burst, beat, self.translator.data_bytes());
        w.wvalid = true;
        w.wid = head.id;
        w.wdata = wdata;
        w.wstrb = wstrb;
        w.wlast = record.beats_remaining == 1;
        Ok(Some(head.owner))
    }

    /// Latches write-side state at the clock edge.
    pub(super) fn commit_writes(
        &mut self,
        decisions: &CycleDecisions,
        ports: &[WritePort],
        io: &AxiIo,
    ) -> Result<(), SimError> {
        for (index, port) in ports.iter().enumerate() {
            let req = &port.req;
            if req.fire() {
                let bursts = self.translator.translate(req.addr, req.total_size, req.id)?;
                debug!(
                    "write port {} accepted id {} {:#010x}+{} as {} burst(s)",
                    index,
                    req.id,
                    req.addr,
                    req.total_size,
                    bursts.len()
                );
                self.write_slots[index] = Some(WriteTxn {
                    id: req.id,
                    addr: req.addr,
                    data: req.data.clone(),
                    bursts,
                    next_issue: 0,
                    resp: Resp::Okay,
                });
                self.write_rejected[index] = false;
            } else if req.valid && self.write_slots[index].is_none() {
                if !self.write_rejected[index] {
                    warn!(
                        "write port {} request id {} {:#010x}+{} ({} data bytes) is not expressible, holding ready low",
                        index,
                        req.id,
                        req.addr,
                        req.total_size,
                        req.data.len()
                    );
                }
                self.write_rejected[index] = true;
            } else {
                self.write_rejected[index] = false;
            }
        }

        if io.w.fire() {
            let record = self.write_table.consume_beat(Channel::W, io.w.wid)?;
            trace!(
                "W beat id {} from write port {} ({} left)",
                io.w.wid,
                record.owner,
                record.beats_remaining
            );
            if record.beats_remaining == 0 {
                self.w_queue.pop_front();
            }
        }

        if io.b.fire() {
            let bid = io.b.bid;
            if let Some(record) = self.write_table.complete(bid) {
                if let Some(txn) = self.write_slots[record.owner].as_mut() {
                    txn.resp = txn.resp.merge(io.b.bresp);
                }
                if record.is_final {
                    self.write_slots[record.owner] = None;
                    debug!("write port {} request id {} complete", record.owner, bid);
                }
            }
        }

        match decisions.aw_owner {
            Some(owner) if io.aw.fire() => {
                let Some(txn) = self.write_slots[owner].as_mut() else {
                    return Ok(());
                };
                let burst = txn.bursts[txn.next_issue];
                self.write_table.insert(OutstandingRecord {
                    id: burst.id,
                    owner,
                    direction: Direction::Write,
                    beats_remaining: burst.beats(),
                    beats: burst.beats(),
                    descriptor: txn.next_issue,
                    is_final: burst.last,
                })?;
                self.w_queue.push_back(PendingWrite { owner, id: burst.id });
                debug!(
                    "AW grant write port {} id {} {:#010x} len {} size {}",
                    owner, burst.id, burst.addr, burst.len, burst.size
                );
                txn.next_issue += 1;
                self.write_arb.advance(owner);
                self.aw_hold = None;
            }
            owner => self.aw_hold = owner,
        }
        Ok(())
    }
}
