//! Initiator-Facing Ports.
//!
//! The simplified request/response interface the fabric exposes to each bus
//! initiator. Fields marked "input" are driven by the initiator before the
//! fabric's `comb_outputs`; fields marked "output" are driven by the fabric and
//! hold their values for the rest of the cycle.

use crate::axi::channels::{lane_bytes, Resp};

/// Read request sub-interface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadReq {
    /// Input: a request is presented.
    pub valid: bool,
    /// Input: first byte to read.
    pub addr: u32,
    /// Input: number of bytes to read.
    pub total_size: u32,
    /// Input: transaction id, also used as the downstream AXI id.
    pub id: u8,
    /// Output: the fabric accepts the request this cycle.
    pub ready: bool,
}

impl ReadReq {
    /// Returns `true` when the request is accepted this cycle.
    pub fn fire(&self) -> bool {
        self.valid && self.ready
    }
}

/// Read response sub-interface. One beat per cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadResp {
    /// Output: a data beat is presented.
    pub valid: bool,
    /// Output: the raw data bus word of this beat.
    pub data: u64,
    /// Output: byte lanes of `data` that belong to the request.
    pub strb: u8,
    /// Output: address of the first request byte in this beat.
    pub addr: u32,
    /// Output: response code of this beat.
    pub resp: Resp,
    /// Output: id of the request this beat belongs to.
    pub id: u8,
    /// Output: final beat of the logical request.
    pub last: bool,
    /// Input: the initiator accepts the beat.
    pub ready: bool,
}

impl ReadResp {
    /// Returns `true` when a beat transfers this cycle.
    pub fn fire(&self) -> bool {
        self.valid && self.ready
    }

    /// Request bytes carried by this beat, in address order.
    pub fn bytes(&self) -> impl Iterator<Item = u8> {
        lane_bytes(self.data, self.strb)
    }
}

/// Both halves of an initiator's read interface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadPort {
    pub req: ReadReq,
    pub resp: ReadResp,
}

/// Write request sub-interface.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteReq {
    /// Input: a request is presented.
    pub valid: bool,
    /// Input: first byte to write.
    pub addr: u32,
    /// Input: number of bytes to write.
    pub total_size: u32,
    /// Input: transaction id, also used as the downstream AXI id.
    pub id: u8,
    /// Input: payload, exactly `total_size` bytes.
    pub data: Vec<u8>,
    /// Output: the fabric accepts the request this cycle.
    pub ready: bool,
}

impl WriteReq {
    /// Returns `true` when the request is accepted this cycle.
    pub fn fire(&self) -> bool {
        self.valid && self.ready
    }
}

/// Write completion sub-interface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriteResp {
    /// Output: the logical write request has completed.
    pub valid: bool,
    /// Output: id of the completed request.
    pub id: u8,
    /// Output: most severe response among the request's bursts.
    pub resp: Resp,
    /// Input: the initiator accepts the completion.
    pub ready: bool,
}

impl WriteResp {
    /// Returns `true` when the completion transfers this cycle.
    pub fn fire(&self) -> bool {
        self.valid && self.ready
    }
}

/// Both halves of an initiator's write interface.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WritePort {
    pub req: WriteReq,
    pub resp: WriteResp,
}

impl ReadPort {
    /// Clears every initiator-driven input.
    pub fn clear_inputs(&mut self) {
        self.req.valid = false;
        self.resp.ready = false;
    }
}

impl WritePort {
    /// Clears every initiator-driven input.
    pub fn clear_inputs(&mut self) {
        self.req.valid = false;
        self.resp.ready = false;
    }
}
