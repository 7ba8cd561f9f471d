//! AXI3 Channel Signal Bundles.
//!
//! Each struct here is a plain value holding the wires of one AXI3 channel for
//! the current cycle. Both sides of a link own a copy of the full [`AxiIo`]
//! bundle; the harness copies the master-driven fields one way and the
//! target-driven fields the other way between evaluation phases, so no
//! component ever aliases another component's signals.

use crate::axi::burst::BurstType;
use std::fmt;

/// Identifies one of the five AXI3 channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Read address.
    Ar,
    /// Read data.
    R,
    /// Write address.
    Aw,
    /// Write data.
    W,
    /// Write response.
    B,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Channel::Ar => "AR",
            Channel::R => "R",
            Channel::Aw => "AW",
            Channel::W => "W",
            Channel::B => "B",
        })
    }
}

/// AXI3 response code carried on `rresp` and `bresp`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Resp {
    /// Normal access success.
    #[default]
    Okay = 0,
    /// Exclusive access success.
    ExOkay = 1,
    /// Target error.
    SlvErr = 2,
    /// Decode error.
    DecErr = 3,
}

impl Resp {
    /// Decodes the 2-bit wire encoding.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Resp::Okay,
            1 => Resp::ExOkay,
            2 => Resp::SlvErr,
            _ => Resp::DecErr,
        }
    }

    /// Returns the 2-bit wire encoding.
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Returns `true` for SLVERR and DECERR.
    pub fn is_error(self) -> bool {
        matches!(self, Resp::SlvErr | Resp::DecErr)
    }

    /// Combines the responses of several bursts into the one reported for the
    /// whole logical request: the most severe code wins.
    pub fn merge(self, other: Resp) -> Resp {
        self.max(other)
    }
}

/// Read address channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArChannel {
    pub arvalid: bool,
    pub arready: bool,
    pub araddr: u32,
    pub arid: u8,
    pub arlen: u8,
    pub arsize: u8,
    pub arburst: BurstType,
}

impl ArChannel {
    /// Returns `true` when the address handshake completes this cycle.
    pub fn fire(&self) -> bool {
        self.arvalid && self.arready
    }
}

/// Read data channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RChannel {
    pub rvalid: bool,
    pub rready: bool,
    pub rid: u8,
    pub rdata: u64,
    pub rlast: bool,
    pub rresp: Resp,
}

impl RChannel {
    /// Returns `true` when a read beat transfers this cycle.
    pub fn fire(&self) -> bool {
        self.rvalid && self.rready
    }
}

/// Write address channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AwChannel {
    pub awvalid: bool,
    pub awready: bool,
    pub awaddr: u32,
    pub awid: u8,
    pub awlen: u8,
    pub awsize: u8,
    pub awburst: BurstType,
}

impl AwChannel {
    /// Returns `true` when the address handshake completes this cycle.
    pub fn fire(&self) -> bool {
        self.awvalid && self.awready
    }
}

/// Write data channel. AXI3 still carries `wid`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WChannel {
    pub wvalid: bool,
    pub wready: bool,
    pub wid: u8,
    pub wdata: u64,
    pub wstrb: u8,
    pub wlast: bool,
}

impl WChannel {
    /// Returns `true` when a write beat transfers this cycle.
    pub fn fire(&self) -> bool {
        self.wvalid && self.wready
    }
}

/// Write response channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BChannel {
    pub bvalid: bool,
    pub bready: bool,
    pub bid: u8,
    pub bresp: Resp,
}

impl BChannel {
    /// Returns `true` when a write response transfers this cycle.
    pub fn fire(&self) -> bool {
        self.bvalid && self.bready
    }
}

/// Full set of AXI3 channels between one master and one target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AxiIo {
    pub ar: ArChannel,
    pub r: RChannel,
    pub aw: AwChannel,
    pub w: WChannel,
    pub b: BChannel,
}

impl AxiIo {
    /// Copies every target-driven signal of `target` into this bundle.
    ///
    /// Called on the master's copy after the target's `comb_outputs`.
    pub fn drive_from_target(&mut self, target: &AxiIo) {
        self.ar.arready = target.ar.arready;
        self.r.rvalid = target.r.rvalid;
        self.r.rid = target.r.rid;
        self.r.rdata = target.r.rdata;
        self.r.rlast = target.r.rlast;
        self.r.rresp = target.r.rresp;
        self.aw.awready = target.aw.awready;
        self.w.wready = target.w.wready;
        self.b.bvalid = target.b.bvalid;
        self.b.bid = target.b.bid;
        self.b.bresp = target.b.bresp;
    }

    /// Copies every master-driven signal of `master` into this bundle.
    ///
    /// Called on the target's copy after the master's `comb_inputs`.
    pub fn drive_from_master(&mut self, master: &AxiIo) {
        self.ar.arvalid = master.ar.arvalid;
        self.ar.araddr = master.ar.araddr;
        self.ar.arid = master.ar.arid;
        self.ar.arlen = master.ar.arlen;
        self.ar.arsize = master.ar.arsize;
        self.ar.arburst = master.ar.arburst;

        self.aw.awvalid = master.aw.awvalid;
        self.aw.awaddr = master.aw.awaddr;
        self.aw.awid = master.aw.awid;
        self.aw.awlen = master.aw.awlen;
        self.aw.awsize = master.aw.awsize;
        self.aw.awburst = master.aw.awburst;

        self.w.wvalid = master.w.wvalid;
        self.w.wid = master.w.wid;
        self.w.wdata = master.w.wdata;
        self.w.wstrb = master.w.wstrb;
        self.w.wlast = master.w.wlast;

        self.r.rready = master.r.rready;
        self.b.bready = master.b.bready;
    }
}

/// Extracts the bytes selected by `strb` from a data word, lowest lane first.
pub fn lane_bytes(data: u64, strb: u8) -> impl Iterator<Item = u8> {
    (0..8u32)
        .filter(move |lane| strb & (1 << lane) != 0)
        .map(move |lane| (data >> (8 * lane)) as u8)
}
