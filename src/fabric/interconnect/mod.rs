//! AXI3 Interconnect.
//!
//! This module implements the fabric that sits between the bus initiators and
//! one downstream AXI3 target. Each port accepts one logical request at a time
//! per direction; accepted requests are split into bursts by the
//! [`BurstTranslator`], granted onto the shared address channels by per-direction
//! round-robin arbiters, and recorded in per-direction outstanding tables so that
//! responses, which may come back in any id order, reach the initiator that
//! issued them.
//!
//! All sequential state lives in [`FabricState`]. The combinational halves of the
//! lifecycle only ever see it through `&FabricState`, so the compiler enforces that
//! nothing but `seq` changes it.

mod read;
mod write;

use crate::axi::burst::BurstDescriptor;
use crate::axi::channels::{AxiIo, Resp};
use crate::axi::translator::BurstTranslator;
use crate::common::data::Direction;
use crate::common::error::{ConfigError, SimError};
use crate::config::FabricConfig;
use crate::fabric::arbiter::RoundRobinArbiter;
use crate::fabric::ports::{ReadPort, WritePort};
use crate::fabric::tracker::OutstandingTracker;
use crate::sim::component::Component;
use std::collections::VecDeque;

/// A logical read request accepted from a port.
#[derive(Clone, Debug)]
struct ReadTxn {
    id: u8,
    bursts: Vec<BurstDescriptor>,
    /// Index of the next burst to put on AR.
    next_issue: usize,
}

/// A logical write request accepted from a port, with its payload.
#[derive(Clone, Debug)]
struct WriteTxn {
    id: u8,
    addr: u32,
    data: Vec<u8>,
    bursts: Vec<BurstDescriptor>,
    /// Index of the next burst to put on AW.
    next_issue: usize,
    /// Most severe B response seen so far.
    resp: Resp,
}

/// Entry of the W issue queue: a granted write burst still owing W beats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PendingWrite {
    owner: usize,
    id: u8,
}

/// Everything the fabric latches at the clock edge.
#[derive(Clone, Debug)]
struct FabricState {
    translator: BurstTranslator,
    max_request_bytes: u32,

    read_slots: Vec<Option<ReadTxn>>,
    write_slots: Vec<Option<WriteTxn>>,

    read_arb: RoundRobinArbiter,
    write_arb: RoundRobinArbiter,

    /// Initiator whose burst is on AR without having been accepted yet.
    ar_hold: Option<usize>,
    /// Initiator whose burst is on AW without having been accepted yet.
    aw_hold: Option<usize>,

    read_table: OutstandingTracker,
    write_table: OutstandingTracker,

    /// Granted write bursts in AW order; W beats are sent for the head only.
    w_queue: VecDeque<PendingWrite>,

    /// Ports that presented an unacceptable request last cycle.
    read_rejected: Vec<bool>,
    write_rejected: Vec<bool>,
}

impl FabricState {
    fn new(config: &FabricConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let translator = BurstTranslator::new(config.data_bytes)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let reads = config.read_initiators.len();
        let writes = config.write_initiators.len();
        Ok(Self {
            translator,
            max_request_bytes: config.max_request_bytes,
            read_slots: vec![None; reads],
            write_slots: vec![None; writes],
            read_arb: RoundRobinArbiter::new(reads),
            write_arb: RoundRobinArbiter::new(writes),
            ar_hold: None,
            aw_hold: None,
            read_table: OutstandingTracker::new(
                Direction::Read,
                config.id_space(),
                config.max_outstanding,
            ),
            write_table: OutstandingTracker::new(
                Direction::Write,
                config.id_space(),
                config.max_outstanding,
            ),
            w_queue: VecDeque::with_capacity(config.max_outstanding),
            read_rejected: vec![false; reads],
            write_rejected: vec![false; writes],
        })
    }

    fn reset(&mut self) {
        self.read_slots.iter_mut().for_each(|s| *s = None);
        self.write_slots.iter_mut().for_each(|s| *s = None);
        self.read_arb.reset();
        self.write_arb.reset();
        self.ar_hold = None;
        self.aw_hold = None;
        self.read_table.clear();
        self.write_table.clear();
        self.w_queue.clear();
        self.read_rejected.iter_mut().for_each(|r| *r = false);
        self.write_rejected.iter_mut().for_each(|r| *r = false);
    }

    /// Checks the port-boundary rules shared by both directions.
    fn request_legal(&self, addr: u32, total_size: u32, id: u8) -> bool {
        total_size <= self.max_request_bytes
            && (id as usize) < self.read_table.id_space()
            && self.translator.bursts(addr, total_size, id).is_ok()
    }
}

/// Per-cycle decisions made during the combinational phases and consumed by
/// `seq`. Rebuilt from scratch every cycle.
#[derive(Clone, Copy, Debug, Default)]
struct CycleDecisions {
    ar_owner: Option<usize>,
    aw_owner: Option<usize>,
    w_owner: Option<usize>,
    r_owner: Option<usize>,
    b_owner: Option<usize>,
}

/// AXI3 interconnect between `N` read initiators, `M` write initiators and one
/// downstream target.
///
/// Port and `axi_io` fields are signals: the harness drives the inputs before
/// `comb_outputs` and reads the outputs after `comb_inputs`.
pub struct Interconnect {
    /// Read interface of each read initiator.
    pub read_ports: Vec<ReadPort>,
    /// Write interface of each write initiator.
    pub write_ports: Vec<WritePort>,
    /// Master side of the downstream AXI3 link.
    pub axi_io: AxiIo,

    read_names: Vec<String>,
    write_names: Vec<String>,
    state: FabricState,
    decisions: CycleDecisions,
}

impl Interconnect {
    /// Creates a fabric with the shape described by `config`, already reset.
    ///
    /// # Arguments
    ///
    /// * `config` - Fabric section of the configuration.
    ///
    /// # Returns
    ///
    /// The fabric, or the configuration problem that prevents building it.
    pub fn new(config: &FabricConfig) -> Result<Self, ConfigError> {
        let state = FabricState::new(config)?;
        Ok(Self {
            read_ports: vec![ReadPort::default(); config.read_initiators.len()],
            write_ports: vec![WritePort::default(); config.write_initiators.len()],
            axi_io: AxiIo::default(),
            read_names: config.read_initiators.clone(),
            write_names: config.write_initiators.clone(),
            state,
            decisions: CycleDecisions::default(),
        })
    }

    /// Clears every initiator-driven port input.
    pub fn clear_port_inputs(&mut self) {
        self.read_ports.iter_mut().for_each(ReadPort::clear_inputs);
        self.write_ports.iter_mut().for_each(WritePort::clear_inputs);
    }

    /// Name of read initiator `index`, as configured.
    pub fn read_name(&self, index: usize) -> &str {
        &self.read_names[index]
    }

    /// Name of write initiator `index`, as configured.
    pub fn write_name(&self, index: usize) -> &str {
        &self.write_names[index]
    }

    /// Data bus width in bytes.
    pub fn data_bytes(&self) -> u32 {
        self.state.translator.data_bytes()
    }

    /// Read bursts currently outstanding downstream, as of the last clock edge.
    pub fn outstanding_reads(&self) -> usize {
        self.state.read_table.len()
    }

    /// Write bursts currently outstanding downstream, as of the last clock edge.
    pub fn outstanding_writes(&self) -> usize {
        self.state.write_table.len()
    }

    /// Returns `true` if read port `index` holds an accepted, unfinished request.
    pub fn read_busy(&self, index: usize) -> bool {
        self.state.read_slots[index].is_some()
    }

    /// Returns `true` if write port `index` holds an accepted, unfinished request.
    pub fn write_busy(&self, index: usize) -> bool {
        self.state.write_slots[index].is_some()
    }

    /// Returns `true` when no request is accepted or in flight anywhere.
    pub fn is_idle(&self) -> bool {
        self.state.read_slots.iter().all(Option::is_none)
            && self.state.write_slots.iter().all(Option::is_none)
            && self.state.read_table.is_empty()
            && self.state.write_table.is_empty()
    }

    /// Read initiator that drove AR this cycle, valid after `comb_inputs`.
    pub fn ar_owner(&self) -> Option<usize> {
        self.decisions.ar_owner
    }

    /// Write initiator that drove AW this cycle, valid after `comb_inputs`.
    pub fn aw_owner(&self) -> Option<usize> {
        self.decisions.aw_owner
    }

    /// Write initiator whose data is on W this cycle, valid after `comb_inputs`.
    pub fn w_owner(&self) -> Option<usize> {
        self.decisions.w_owner
    }

    /// Read initiator the beat on R is steered to, valid after `comb_outputs`.
    pub fn r_owner(&self) -> Option<usize> {
        self.decisions.r_owner
    }

    /// Write initiator the response on B belongs to, valid after `comb_outputs`.
    pub fn b_owner(&self) -> Option<usize> {
        self.decisions.b_owner
    }

    /// Returns `true` if read initiator `index` has a burst ready to issue that
    /// is held back only because its id is still outstanding. Valid after
    /// `comb_inputs`.
    pub fn read_id_blocked(&self, index: usize) -> bool {
        self.state.read_id_blocked(index)
    }

    /// Write counterpart of [`read_id_blocked`](Self::read_id_blocked).
    pub fn write_id_blocked(&self, index: usize) -> bool {
        self.state.write_id_blocked(index)
    }
}

impl Component for Interconnect {
    fn name(&self) -> &str {
        "interconnect"
    }

    fn init(&mut self) {
        self.state.reset();
        self.decisions = CycleDecisions::default();
        self.axi_io = AxiIo::default();
        for port in &mut self.read_ports {
            *port = ReadPort::default();
        }
        for port in &mut self.write_ports {
            *port = WritePort::default();
        }
    }

    /// Drives the initiator-facing outputs and the response-channel readies.
    ///
    /// Request `ready` depends only on sequential state and the presented
    /// request; response routing depends on the target's settled R and B
    /// outputs and on the owning initiator's `ready`.
    fn comb_outputs(&mut self) -> Result<(), SimError> {
        self.decisions = CycleDecisions::default();
        let state = &self.state;
        state.drive_read_ports(&mut self.read_ports);
        state.drive_write_ports(&mut self.write_ports);
        self.decisions.r_owner = state.route_r(&mut self.axi_io.r, &mut self.read_ports)?;
        self.decisions.b_owner = state.route_b(&mut self.axi_io.b, &mut self.write_ports)?;
        Ok(())
    }

    /// Drives the downstream AR, AW and W channels.
    ///
    /// Valid on these channels never depends on the target's ready.
    fn comb_inputs(&mut self) -> Result<(), SimError> {
        let state = &self.state;
        self.decisions.ar_owner = state.drive_ar(&mut self.axi_io.ar);
        self.decisions.aw_owner = state.drive_aw(&mut self.axi_io.aw);
        self.decisions.w_owner = state.drive_w(&mut self.axi_io.w)?;
        Ok(())
    }

    fn seq(&mut self) -> Result<(), SimError> {
        let decisions = self.decisions;
        self.state
            .commit_reads(&decisions, &self.read_ports, &self.axi_io)?;
        self.state
            .commit_writes(&decisions, &self.write_ports, &self.axi_io)?;
        Ok(())
    }
}
