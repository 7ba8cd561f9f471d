//! Simulation Harness.
//!
//! [`System`] owns one fabric, the reference DDR target and one traffic driver
//! per initiator port, and advances them in lock step. Every cycle follows
//! the same order:
//!
//! 1. Drivers present their port inputs.
//! 2. Target `comb_outputs`, then target signals are copied to the fabric.
//! 3. Fabric `comb_outputs` and `comb_inputs`.
//! 4. Fabric signals are copied to the target, target `comb_inputs`.
//! 5. Statistics and drivers sample the settled signals.
//! 6. Target `seq`, then fabric `seq`.

use super::component::Component;
use super::traffic::{ReadMaster, WriteMaster};
use crate::common::error::{ConfigError, SimError};
use crate::config::Config;
use crate::fabric::Interconnect;
use crate::stats::FabricStats;
use crate::target::SimDdr;
use log::info;

/// A fabric, its target and the initiators driving it.
pub struct System {
    pub fabric: Interconnect,
    pub ddr: SimDdr,
    pub stats: FabricStats,
    /// One driver per read port.
    pub readers: Vec<ReadMaster>,
    /// One driver per write port.
    pub writers: Vec<WriteMaster>,
    cycle: u64,
    max_cycles: u64,
}

impl System {
    /// Builds and resets a system shaped after `config`.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let fabric = Interconnect::new(&config.fabric)?;
        let ddr = SimDdr::new(&config.memory, config.fabric.data_bytes)?;
        let stats = FabricStats::new(&fabric);
        let mut system = Self {
            readers: vec![ReadMaster::new(); fabric.read_ports.len()],
            writers: vec![WriteMaster::new(); fabric.write_ports.len()],
            fabric,
            ddr,
            stats,
            cycle: 0,
            max_cycles: config.sim.max_cycles,
        };
        system.init();
        Ok(system)
    }

    /// Resets both components and the statistics. Queued traffic is kept.
    pub fn init(&mut self) {
        self.fabric.init();
        self.ddr.init();
        self.stats.reset();
        self.cycle = 0;
        info!(
            "system reset: {} read / {} write initiators, {}-byte bus",
            self.fabric.read_ports.len(),
            self.fabric.write_ports.len(),
            self.fabric.data_bytes()
        );
    }

    /// Cycles completed since `init`.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn max_cycles(&self) -> u64 {
        self.max_cycles
    }

    /// Runs the combinational phases of one cycle.
    ///
    /// Port inputs must already be driven. Afterwards every signal of the
    /// cycle is settled and can be inspected before [`commit`](Self::commit).
    pub fn evaluate(&mut self) -> Result<(), SimError> {
        self.ddr.comb_outputs()?;
        self.fabric.axi_io.drive_from_target(&self.ddr.io);
        self.fabric.comb_outputs()?;
        self.fabric.comb_inputs()?;
        self.ddr.io.drive_from_master(&self.fabric.axi_io);
        self.ddr.comb_inputs()?;
        self.stats.sample(&self.fabric);
        Ok(())
    }

    /// Clock edge: latches the target, then the fabric.
    pub fn commit(&mut self) -> Result<(), SimError> {
        self.ddr.seq()?;
        self.fabric.seq()?;
        self.cycle += 1;
        Ok(())
    }

    /// Advances one full cycle with the traffic drivers in control of the ports.
    pub fn tick(&mut self) -> Result<(), SimError> {
        self.fabric.clear_port_inputs();
        for (reader, port) in self.readers.iter().zip(self.fabric.read_ports.iter_mut()) {
            reader.drive(self.cycle, port);
        }
        for (writer, port) in self.writers.iter().zip(self.fabric.write_ports.iter_mut()) {
            writer.drive(self.cycle, port);
        }

        self.evaluate()?;

        for (reader, port) in self.readers.iter_mut().zip(self.fabric.read_ports.iter()) {
            reader.observe(self.cycle, port);
        }
        for (writer, port) in self.writers.iter_mut().zip(self.fabric.write_ports.iter()) {
            writer.observe(self.cycle, port);
        }

        self.commit()
    }

    /// Returns `true` when all traffic has completed and nothing is in flight.
    pub fn is_idle(&self) -> bool {
        self.readers.iter().all(ReadMaster::is_idle)
            && self.writers.iter().all(WriteMaster::is_idle)
            && self.fabric.is_idle()
            && self.ddr.is_idle()
    }

    /// Ticks until every queued request has completed.
    ///
    /// # Returns
    ///
    /// The number of cycles taken, or [`SimError::Timeout`] once the cycle
    /// budget is exhausted.
    pub fn run(&mut self) -> Result<u64, SimError> {
        let start = self.cycle;
        while !self.is_idle() {
            if self.cycle - start >= self.max_cycles {
                return Err(SimError::Timeout(self.max_cycles));
            }
            self.tick()?;
        }
        Ok(self.cycle - start)
    }
}
