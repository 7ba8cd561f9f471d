//! Fabric statistics collection and reporting.
//!
//! Tracks grants, beats, stalls and completions per initiator. The harness
//! samples the fabric once per cycle after every signal has settled and
//! before any component latches, so each handshake is counted exactly once.

use crate::fabric::Interconnect;
use std::time::Instant;

/// Per-run counters of the interconnect.
pub struct FabricStats {
    start_time: Instant,
    pub cycles: u64,

    read_names: Vec<String>,
    write_names: Vec<String>,

    pub ar_grants: Vec<u64>,
    pub aw_grants: Vec<u64>,
    pub reads_completed: Vec<u64>,
    pub writes_completed: Vec<u64>,
    /// R beats delivered to each read initiator.
    pub read_beats: Vec<u64>,
    /// W beats sent for each write initiator.
    pub write_beats: Vec<u64>,

    pub r_beats: u64,
    pub w_beats: u64,
    pub b_responses: u64,
    pub error_responses: u64,

    /// Cycles with `arvalid` high and `arready` low.
    pub ar_stalls: u64,
    /// Cycles with `awvalid` high and `awready` low.
    pub aw_stalls: u64,
    /// Initiator-cycles held back by a live id.
    pub id_stalls: u64,
}

impl FabricStats {
    /// Creates zeroed counters shaped after `fabric`'s ports.
    pub fn new(fabric: &Interconnect) -> Self {
        let reads = fabric.read_ports.len();
        let writes = fabric.write_ports.len();
        Self {
            start_time: Instant::now(),
            cycles: 0,
            read_names: (0..reads).map(|i| fabric.read_name(i).to_string()).collect(),
            write_names: (0..writes).map(|i| fabric.write_name(i).to_string()).collect(),
            ar_grants: vec![0; reads],
            aw_grants: vec![0; writes],
            reads_completed: vec![0; reads],
            writes_completed: vec![0; writes],
            read_beats: vec![0; reads],
            write_beats: vec![0; writes],
            r_beats: 0,
            w_beats: 0,
            b_responses: 0,
            error_responses: 0,
            ar_stalls: 0,
            aw_stalls: 0,
            id_stalls: 0,
        }
    }

    /// Zeroes every counter and restarts the host timer.
    pub fn reset(&mut self) {
        self.start_time = Instant::now();
        self.cycles = 0;
        self.ar_grants.iter_mut().for_each(|c| *c = 0);
        self.aw_grants.iter_mut().for_each(|c| *c = 0);
        self.reads_completed.iter_mut().for_each(|c| *c = 0);
        self.writes_completed.iter_mut().for_each(|c| *c = 0);
        self.read_beats.iter_mut().for_each(|c| *c = 0);
        self.write_beats.iter_mut().for_each(|c| *c = 0);
        self.r_beats = 0;
        self.w_beats = 0;
        self.b_responses = 0;
        self.error_responses = 0;
        self.ar_stalls = 0;
        self.aw_stalls = 0;
        self.id_stalls = 0;
    }

    /// Records one settled cycle of `fabric`.
    pub fn sample(&mut self, fabric: &Interconnect) {
        self.cycles += 1;
        let io = &fabric.axi_io;

        if io.ar.fire() {
            if let Some(owner) = fabric.ar_owner() {
                self.ar_grants[owner] += 1;
            }
        } else if io.ar.arvalid {
            self.ar_stalls += 1;
        }
        if io.aw.fire() {
            if let Some(owner) = fabric.aw_owner() {
                self.aw_grants[owner] += 1;
            }
        } else if io.aw.awvalid {
            self.aw_stalls += 1;
        }

        if io.r.fire() {
            self.r_beats += 1;
            if let Some(owner) = fabric.r_owner() {
                self.read_beats[owner] += 1;
            }
            if io.r.rresp.is_error() {
                self.error_responses += 1;
            }
        }
        if io.w.fire() {
            self.w_beats += 1;
            if let Some(owner) = fabric.w_owner() {
                self.write_beats[owner] += 1;
            }
        }
        if io.b.fire() {
            self.b_responses += 1;
            if io.b.bresp.is_error() {
                self.error_responses += 1;
            }
        }

        for (index, port) in fabric.read_ports.iter().enumerate() {
            if port.resp.fire() && port.resp.last {
                self.reads_completed[index] += 1;
            }
            if fabric.read_id_blocked(index) {
                self.id_stalls += 1;
            }
        }
        for (index, port) in fabric.write_ports.iter().enumerate() {
            if port.resp.fire() {
                self.writes_completed[index] += 1;
            }
            if fabric.write_id_blocked(index) {
                self.id_stalls += 1;
            }
        }
    }

    /// Prints a formatted summary of the run.
    pub fn print(&self) {
        let seconds = self.start_time.elapsed().as_secs_f64();
        let cyc = if self.cycles == 0 { 1 } else { self.cycles };
        let khz = if seconds > 0.0 {
            (self.cycles as f64 / seconds) / 1000.0
        } else {
            0.0
        };

        println!("\n==========================================================");
        println!("AXI3 INTERCONNECT STATISTICS");
        println!("==========================================================");
        println!("host_seconds             {:.4} s", seconds);
        println!("sim_cycles               {}", self.cycles);
        println!("sim_freq                 {:.2} kHz", khz);
        println!("----------------------------------------------------------");
        println!("DATA CHANNELS");
        println!(
            "  r.beats                {} ({:.2}/cycle)",
            self.r_beats,
            self.r_beats as f64 / cyc as f64
        );
        println!(
            "  w.beats                {} ({:.2}/cycle)",
            self.w_beats,
            self.w_beats as f64 / cyc as f64
        );
        println!("  b.responses            {}", self.b_responses);
        println!("  resp.errors            {}", self.error_responses);
        println!("----------------------------------------------------------");
        println!("STALLS");
        println!(
            "  ar.backpressure        {} ({:.2}%)",
            self.ar_stalls,
            (self.ar_stalls as f64 / cyc as f64) * 100.0
        );
        println!(
            "  aw.backpressure        {} ({:.2}%)",
            self.aw_stalls,
            (self.aw_stalls as f64 / cyc as f64) * 100.0
        );
        println!("  id.collision           {}", self.id_stalls);
        println!("----------------------------------------------------------");
        println!("READ INITIATORS");
        for (index, name) in self.read_names.iter().enumerate() {
            println!(
                "  {:<10} ar.grants {:<8} r.beats {:<8} requests {}",
                name, self.ar_grants[index], self.read_beats[index], self.reads_completed[index]
            );
        }
        println!("----------------------------------------------------------");
        println!("WRITE INITIATORS");
        for (index, name) in self.write_names.iter().enumerate() {
            println!(
                "  {:<10} aw.grants {:<8} w.beats {:<8} requests {}",
                name, self.aw_grants[index], self.write_beats[index], self.writes_completed[index]
            );
        }
        println!("==========================================================");
    }
}
