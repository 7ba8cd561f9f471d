//! Traffic Drivers.
//!
//! Simple initiator models that feed logical requests into one fabric port
//! and collect what comes back. They are driven by the harness: `drive`
//! before the fabric evaluates, `observe` after every signal has settled.

use crate::axi::channels::Resp;
use crate::fabric::ports::{ReadPort, ReadReq, WritePort, WriteReq};
use std::collections::VecDeque;

/// A logical read to issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadRequest {
    pub addr: u32,
    pub total_size: u32,
    pub id: u8,
}

/// A finished read with its reassembled bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadCompletion {
    pub id: u8,
    pub addr: u32,
    pub data: Vec<u8>,
    /// Most severe response among the beats.
    pub resp: Resp,
    /// Cycle on which the final beat was accepted.
    pub cycle: u64,
}

/// A logical write to issue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteRequest {
    pub addr: u32,
    pub id: u8,
    pub data: Vec<u8>,
}

/// A finished write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WriteCompletion {
    pub id: u8,
    pub addr: u32,
    pub resp: Resp,
    pub cycle: u64,
}

/// Read initiator: issues queued requests one at a time.
#[derive(Clone, Debug)]
pub struct ReadMaster {
    queue: VecDeque<ReadRequest>,
    in_flight: Option<(ReadRequest, ReadCompletion)>,
    completed: Vec<ReadCompletion>,
    ready_period: u64,
    foreign_beats: u64,
}

impl Default for ReadMaster {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadMaster {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            in_flight: None,
            completed: Vec::new(),
            ready_period: 1,
            foreign_beats: 0,
        }
    }

    /// Accepts response beats only on every `period`-th cycle.
    pub fn with_ready_period(mut self, period: u64) -> Self {
        self.ready_period = period.max(1);
        self
    }

    /// Queues a read.
    pub fn push(&mut self, addr: u32, total_size: u32, id: u8) {
        self.queue.push_back(ReadRequest {
            addr,
            total_size,
            id,
        });
    }

    /// Returns `true` when nothing is queued or in flight.
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.in_flight.is_none()
    }

    pub fn completed(&self) -> &[ReadCompletion] {
        &self.completed
    }

    /// Removes and returns every completion collected so far.
    pub fn take_completed(&mut self) -> Vec<ReadCompletion> {
        std::mem::take(&mut self.completed)
    }

    /// Beats delivered to this port that did not belong to its request.
    pub fn foreign_beats(&self) -> u64 {
        self.foreign_beats
    }

    /// Drives the port inputs for `cycle`.
    pub fn drive(&self, cycle: u64, port: &mut ReadPort) {
        if self.in_flight.is_none() {
            if let Some(req) = self.queue.front() {
                port.req = ReadReq {
                    valid: true,
                    addr: req.addr,
                    total_size: req.total_size,
                    id: req.id,
                    ready: port.req.ready,
                };
            }
        }
        port.resp.ready = cycle % self.ready_period == 0;
    }

    /// Records the handshakes that completed on `port` this cycle.
    pub fn observe(&mut self, cycle: u64, port: &ReadPort) {
        if port.resp.fire() {
            let finished = match self.in_flight.as_mut() {
                Some((req, done)) if req.id == port.resp.id => {
                    done.data.extend(port.resp.bytes());
                    done.resp = done.resp.merge(port.resp.resp);
                    port.resp.last
                }
                _ => {
                    self.foreign_beats += 1;
                    false
                }
            };
            if finished {
                if let Some((_, mut done)) = self.in_flight.take() {
                    done.cycle = cycle;
                    self.completed.push(done);
                }
            }
        }

        if port.req.fire() {
            if let Some(req) = self.queue.pop_front() {
                let done = ReadCompletion {
                    id: req.id,
                    addr: req.addr,
                    data: Vec::with_capacity(req.total_size as usize),
                    resp: Resp::Okay,
                    cycle,
                };
                self.in_flight = Some((req, done));
            }
        }
    }
}

/// Write initiator: issues queued requests one at a time.
#[derive(Clone, Debug)]
pub struct WriteMaster {
    queue: VecDeque<WriteRequest>,
    in_flight: Option<WriteRequest>,
    completed: Vec<WriteCompletion>,
    ready_period: u64,
    foreign_responses: u64,
}

impl Default for WriteMaster {
    fn default() -> Self {
        Self::new()
    }
}

impl WriteMaster {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            in_flight: None,
            completed: Vec::new(),
            ready_period: 1,
            foreign_responses: 0,
        }
    }

    /// Accepts write completions only on every `period`-th cycle.
    pub fn with_ready_period(mut self, period: u64) -> Self {
        self.ready_period = period.max(1);
        self
    }

    /// Queues a write of `data` to `addr`.
    pub fn push(&mut self, addr: u32, data: Vec<u8>, id: u8) {
        self.queue.push_back(WriteRequest { addr, id, data });
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.in_flight.is_none()
    }

    pub fn completed(&self) -> &[WriteCompletion] {
        &self.completed
    }

    pub fn take_completed(&mut self) -> Vec<WriteCompletion> {
        std::mem::take(&mut self.completed)
    }

    /// Completions delivered to this port that did not match its request.
    pub fn foreign_responses(&self) -> u64 {
        self.foreign_responses
    }

    pub fn drive(&self, cycle: u64, port: &mut WritePort) {
        if self.in_flight.is_none() {
            if let Some(req) = self.queue.front() {
                port.req = WriteReq {
                    valid: true,
                    addr: req.addr,
                    total_size: req.data.len() as u32,
                    id: req.id,
                    data: req.data.clone(),
                    ready: port.req.ready,
                };
            }
        }
        port.resp.ready = cycle % self.ready_period == 0;
    }

    pub fn observe(&mut self, cycle: u64, port: &WritePort) {
        if port.resp.fire() {
            match self.in_flight.take() {
                Some(req) if req.id == port.resp.id => self.completed.push(WriteCompletion {
                    id: req.id,
                    addr: req.addr,
                    resp: port.resp.resp,
                    cycle,
                }),
                other => {
                    self.in_flight = other;
                    self.foreign_responses += 1;
                }
            }
        }

        if port.req.fire() {
            self.in_flight = self.queue.pop_front();
        }
    }
}
