//! Simulated DDR Target.
//!
//! A byte-addressed AXI3 slave backed by sparse memory. It obeys the same
//! two-phase lifecycle as the fabric:
//!
//! * `comb_outputs` drives every target-side signal from latched state only
//!   (`arready`, `awready`, `wready`, the current R beat and the current B).
//! * `comb_inputs` validates the master-side signals it was just handed.
//! * `seq` accepts addresses, stores W data and retires R and B transfers.
//!
//! Read bursts become eligible once the memory controller's latency has
//! elapsed and are then returned whole, either oldest or youngest first.
//! Write data is accepted strictly in AW order.

use super::controller::{self, MemoryController};
use crate::axi::burst::{BurstDescriptor, BurstType};
use crate::axi::channels::{AxiIo, Channel, Resp};
use crate::common::constants::PAGE_SIZE;
use crate::common::error::{ConfigError, SimError};
use crate::config::{MemoryConfig, ReadOrder};
use crate::sim::component::Component;
use log::{debug, trace};
use std::collections::{BTreeMap, VecDeque};

/// An address-phase transaction accepted by the target.
#[derive(Clone, Copy, Debug)]
struct Burst {
    id: u8,
    addr: u32,
    len: u8,
    size: u8,
    burst: BurstType,
    /// Next beat to transfer.
    beat: u32,
    /// Cycle from which the burst may be served.
    ready_at: u64,
    /// Most severe response among the beats so far.
    resp: Resp,
}

impl Burst {
    fn beats(&self) -> u32 {
        self.len as u32 + 1
    }

    fn beat_addr(&self, n: u32) -> u32 {
        self.burst.beat_addr(self.addr, self.size, self.len, n)
    }

    /// Byte addresses the current beat transfers.
    fn beat_bytes(&self) -> std::ops::Range<u64> {
        let bytes = 1u64 << self.size;
        let start = self.beat_addr(self.beat) as u64;
        start..(start & !(bytes - 1)) + bytes
    }
}

/// A write response waiting to be presented on B.
#[derive(Clone, Copy, Debug)]
struct PendingB {
    id: u8,
    resp: Resp,
    ready_at: u64,
}

/// AXI3 memory target with configurable latency and read service order.
pub struct SimDdr {
    /// Target side of the AXI3 link.
    pub io: AxiIo,

    size: u64,
    data_bytes: u32,
    queue_depth: usize,
    write_latency: u64,
    read_order: ReadOrder,
    controller: Box<dyn MemoryController>,

    /// Sparse backing store, one entry per touched 4 KiB page.
    pages: BTreeMap<u32, Vec<u8>>,

    cycle: u64,
    reads: VecDeque<Burst>,
    /// Read burst currently driving R.
    active_read: Option<Burst>,
    writes: VecDeque<Burst>,
    responses: VecDeque<PendingB>,
}

impl SimDdr {
    /// Creates an empty memory.
    ///
    /// # Arguments
    ///
    /// * `config` - `[memory]` section of the configuration.
    /// * `data_bytes` - Width of the data bus in bytes.
    pub fn new(config: &MemoryConfig, data_bytes: u32) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            io: AxiIo::default(),
            size: config.size,
            data_bytes,
            queue_depth: config.queue_depth,
            write_latency: config.write_latency,
            read_order: config.read_order,
            controller: controller::build(config),
            pages: BTreeMap::new(),
            cycle: 0,
            reads: VecDeque::with_capacity(config.queue_depth),
            active_read: None,
            writes: VecDeque::with_capacity(config.queue_depth),
            responses: VecDeque::new(),
        })
    }

    /// Addressable bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Cycles elapsed since `init`.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Returns `true` when no transaction is queued or in progress.
    pub fn is_idle(&self) -> bool {
        self.reads.is_empty()
            && self.active_read.is_none()
            && self.writes.is_empty()
            && self.responses.is_empty()
    }

    fn in_range(&self, addr: u64) -> bool {
        addr < self.size
    }

    /// Reads one byte. Untouched memory reads as zero.
    pub fn read_byte(&self, addr: u32) -> u8 {
        let offset = (addr % PAGE_SIZE) as usize;
        self.pages
            .get(&(addr / PAGE_SIZE))
            .map_or(0, |page| page[offset])
    }

    /// Writes one byte.
    pub fn write_byte(&mut self, addr: u32, value: u8) {
        let page = self
            .pages
            .entry(addr / PAGE_SIZE)
            .or_insert_with(|| vec![0; PAGE_SIZE as usize]);
        page[(addr % PAGE_SIZE) as usize] = value;
    }

    /// Copies `bytes` into memory starting at `addr`, bypassing the bus.
    pub fn load(&mut self, addr: u32, bytes: &[u8]) {
        for (offset, &byte) in bytes.iter().enumerate() {
            self.write_byte(addr.wrapping_add(offset as u32), byte);
        }
    }

    /// Returns `len` bytes starting at `addr`, bypassing the bus.
    pub fn read_bytes(&self, addr: u32, len: usize) -> Vec<u8> {
        (0..len)
            .map(|offset| self.read_byte(addr.wrapping_add(offset as u32)))
            .collect()
    }

    /// Index in `reads` of the next burst to serve, if any is ready.
    fn next_read(&self, cycle: u64) -> Option<usize> {
        let mut ready = self
            .reads
            .iter()
            .enumerate()
            .filter(|(_, burst)| burst.ready_at <= cycle)
            .map(|(index, _)| index);
        match self.read_order {
            ReadOrder::Fifo => ready.next(),
            ReadOrder::Lifo => ready.last(),
        }
    }

    /// Assembles the data word and response of the current beat of `burst`.
    fn read_beat(&self, burst: &Burst) -> (u64, Resp) {
        let mut data = 0u64;
        for addr in burst.beat_bytes() {
            if !self.in_range(addr) {
                return (0, Resp::SlvErr);
            }
            let lane = (addr % self.data_bytes as u64) as u32;
            data |= (self.read_byte(addr as u32) as u64) << (8 * lane);
        }
        (data, Resp::Okay)
    }

    /// Stores the lanes of the current W beat selected by `wstrb`.
    fn write_beat(&mut self, burst: &Burst, wdata: u64, wstrb: u8) -> Resp {
        let range = burst.beat_bytes();
        if !self.in_range(range.end - 1) {
            return Resp::SlvErr;
        }
        for addr in range {
            let lane = (addr % self.data_bytes as u64) as u32;
            if wstrb & (1 << lane) != 0 {
                self.write_byte(addr as u32, (wdata >> (8 * lane)) as u8);
            }
        }
        Resp::Okay
    }

    /// Rejects an address phase that no AXI3 master may issue.
    fn check_address(
        &self,
        channel: Channel,
        id: u8,
        addr: u32,
        len: u8,
        size: u8,
        burst: BurstType,
    ) -> Result<(), SimError> {
        let descriptor = BurstDescriptor {
            id,
            addr,
            len,
            size,
            burst,
            bytes: 0,
            last: true,
        };
        let aligned = BurstDescriptor {
            addr: addr & !(descriptor.beat_bytes() - 1),
            ..descriptor
        };
        aligned
            .check(self.data_bytes)
            .map_err(|violation| SimError::TargetProtocol {
                channel,
                reason: violation.to_string(),
            })
    }
}

impl Component for SimDdr {
    fn name(&self) -> &str {
        "ddr"
    }

    fn init(&mut self) {
        self.io = AxiIo::default();
        self.cycle = 0;
        self.reads.clear();
        self.active_read = None;
        self.writes.clear();
        self.responses.clear();
    }

    fn comb_outputs(&mut self) -> Result<(), SimError> {
        self.io.ar.arready = self.reads.len() < self.queue_depth;
        self.io.aw.awready = self.writes.len() < self.queue_depth;
        self.io.w.wready = !self.writes.is_empty();

        match self.active_read {
            Some(burst) => {
                let (data, resp) = self.read_beat(&burst);
                self.io.r.rvalid = true;
                self.io.r.rid = burst.id;
                self.io.r.rdata = data;
                self.io.r.rresp = resp;
                self.io.r.rlast = burst.beat + 1 == burst.beats();
            }
            None => {
                self.io.r.rvalid = false;
                self.io.r.rid = 0;
                self.io.r.rdata = 0;
                self.io.r.rresp = Resp::Okay;
                self.io.r.rlast = false;
            }
        }

        match self.responses.front() {
            Some(b) if b.ready_at <= self.cycle => {
                self.io.b.bvalid = true;
                self.io.b.bid = b.id;
                self.io.b.bresp = b.resp;
            }
            _ => {
                self.io.b.bvalid = false;
                self.io.b.bid = 0;
                self.io.b.bresp = Resp::Okay;
            }
        }
        Ok(())
    }

    fn comb_inputs(&mut self) -> Result<(), SimError> {
        let ar = self.io.ar;
        if ar.arvalid {
            self.check_address(Channel::Ar, ar.arid, ar.araddr, ar.arlen, ar.arsize, ar.arburst)?;
        }
        let aw = self.io.aw;
        if aw.awvalid {
            self.check_address(Channel::Aw, aw.awid, aw.awaddr, aw.awlen, aw.awsize, aw.awburst)?;
        }
        let w = self.io.w;
        if w.wvalid {
            if let Some(head) = self.writes.front() {
                if w.wid != head.id {
                    return Err(SimError::TargetProtocol {
                        channel: Channel::W,
                        reason: format!("wid {} while burst id {} owes data", w.wid, head.id),
                    });
                }
                if w.wlast != (head.beat + 1 == head.beats()) {
                    return Err(SimError::TargetProtocol {
                        channel: Channel::W,
                        reason: format!(
                            "wlast={} on beat {} of a {}-beat burst",
                            w.wlast,
                            head.beat,
                            head.beats()
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    fn seq(&mut self) -> Result<(), SimError> {
        let io = self.io;

        if io.r.fire() {
            if let Some(burst) = self.active_read.as_mut() {
                trace!("ddr R beat id {} {}/{}", burst.id, burst.beat + 1, burst.beats());
                burst.beat += 1;
                if burst.beat == burst.beats() {
                    self.active_read = None;
                }
            }
        }

        if io.w.fire() {
            if let Some(mut head) = self.writes.pop_front() {
                let resp = self.write_beat(&head, io.w.wdata, io.w.wstrb);
                head.resp = head.resp.merge(resp);
                head.beat += 1;
                if io.w.wlast {
                    self.responses.push_back(PendingB {
                        id: head.id,
                        resp: head.resp,
                        ready_at: self.cycle + 1 + self.write_latency,
                    });
                    debug!("ddr write id {} done, resp {:?}", head.id, head.resp);
                } else {
                    self.writes.push_front(head);
                }
            }
        }

        if io.b.fire() {
            self.responses.pop_front();
        }

        if io.ar.fire() {
            let latency = self.controller.access_latency(io.ar.araddr);
            self.reads.push_back(Burst {
                id: io.ar.arid,
                addr: io.ar.araddr,
                len: io.ar.arlen,
                size: io.ar.arsize,
                burst: io.ar.arburst,
                beat: 0,
                ready_at: self.cycle + 1 + latency,
                resp: Resp::Okay,
            });
            debug!(
                "ddr AR id {} {:#010x} len {} ready in {} cycles",
                io.ar.arid, io.ar.araddr, io.ar.arlen, latency
            );
        }

        if io.aw.fire() {
            self.writes.push_back(Burst {
                id: io.aw.awid,
                addr: io.aw.awaddr,
                len: io.aw.awlen,
                size: io.aw.awsize,
                burst: io.aw.awburst,
                beat: 0,
                ready_at: self.cycle,
                resp: Resp::Okay,
            });
        }

        self.cycle += 1;

        if self.active_read.is_none() {
            if let Some(index) = self.next_read(self.cycle) {
                self.active_read = self.reads.remove(index);
            }
        }
        Ok(())
    }
}
