//! AXI3 Interconnect Simulator CLI.
//!
//! The main executable for the fabric model. It parses the command line,
//! loads the configuration, runs one built-in traffic scenario through the
//! fabric and the reference DDR target, and prints the statistics.
//!
//! # Scenarios
//!
//! 1. **smoke**: One 31-byte read from the first read initiator.
//! 2. **contention**: Every read initiator streams reads at the same time.
//! 3. **split**: A read crossing a 4 KiB boundary.
//! 4. **write**: Writes from every write initiator, read back and compared.

use clap::{Parser, ValueEnum};
use log::info;
use std::process;

use axi_fabric::common::SimError;
use axi_fabric::config::Config;
use axi_fabric::sim::System;

/// Built-in traffic patterns.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Scenario {
    Smoke,
    Contention,
    Split,
    Write,
}

/// Command-line arguments for the interconnect simulator.
#[derive(Parser, Debug)]
#[command(author, version, about = "AXI3 Interconnect Cycle-Accurate Model")]
struct Args {
    /// TOML configuration file; built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<String>,

    #[arg(short, long, value_enum, default_value = "smoke")]
    scenario: Scenario,

    /// Overrides `sim.max_cycles`.
    #[arg(long)]
    cycles: Option<u64>,

    /// Prints the effective configuration as JSON and exits.
    #[arg(long)]
    dump_config: bool,
}

const WRITE_BYTES: usize = 45;

/// Deterministic fill derived from the address.
fn pattern(base: u32, len: usize) -> Vec<u8> {
    (0..len).map(|i| (base as usize + i * 7) as u8).collect()
}

/// Queues the traffic of `scenario` on the system's drivers.
///
/// # Returns
///
/// The expected contents of every read, in `(port, bytes)` form, used to
/// check the run afterwards.
fn setup(system: &mut System, scenario: Scenario) -> Vec<(usize, Vec<u8>)> {
    let mut expected = Vec::new();

    match scenario {
        Scenario::Smoke => {
            let data = pattern(0x2000, 31);
            system.ddr.load(0x2000, &data);
            if let Some(reader) = system.readers.first_mut() {
                reader.push(0x2000, 31, 2);
                expected.push((0, data));
            }
        }
        Scenario::Contention => {
            for (port, reader) in system.readers.iter_mut().enumerate() {
                for n in 0..8u32 {
                    let addr = 0x1_0000 * (port as u32 + 1) + n * 0x40 + port as u32;
                    let data = pattern(addr, 48);
                    system.ddr.load(addr, &data);
                    reader.push(addr, 48, port as u8);
                    expected.push((port, data));
                }
            }
        }
        Scenario::Split => {
            let data = pattern(0x1FF0, 64);
            system.ddr.load(0x1FF0, &data);
            if let Some(reader) = system.readers.first_mut() {
                reader.push(0x1FF0, 64, 1);
                expected.push((0, data));
            }
        }
        Scenario::Write => {
            for (port, writer) in system.writers.iter_mut().enumerate() {
                let addr = 0x4000 + 0x1000 * port as u32 + 3;
                writer.push(addr, pattern(addr, WRITE_BYTES), 8 + port as u8);
            }
        }
    }
    expected
}

/// Checks collected reads against the expected data.
fn verify(system: &mut System, expected: &[(usize, Vec<u8>)]) -> Result<(), String> {
    let mut got: Vec<Vec<Vec<u8>>> = system
        .readers
        .iter_mut()
        .map(|r| r.take_completed().into_iter().map(|c| c.data).collect())
        .collect();
    got.iter_mut().for_each(|per_port| per_port.reverse());

    for (port, data) in expected {
        match got[*port].pop() {
            Some(actual) if actual == *data => {}
            Some(actual) => {
                return Err(format!(
                    "read port {} returned {:02x?}, expected {:02x?}",
                    port, actual, data
                ))
            }
            None => return Err(format!("read port {} is missing a completion", port)),
        }
    }
    Ok(())
}

/// Reads every completed write back through the bus and compares it with
/// what was written.
fn verify_writes(system: &mut System) -> Result<(), String> {
    let addrs: Vec<u32> = system
        .writers
        .iter_mut()
        .flat_map(|w| w.take_completed())
        .map(|done| done.addr)
        .collect();
    if addrs.is_empty() {
        return Err("no write completed".to_string());
    }
    let Some(reader) = system.readers.first_mut() else {
        return Ok(());
    };
    for (n, &addr) in addrs.iter().enumerate() {
        reader.push(addr, WRITE_BYTES as u32, n as u8);
    }
    system.run().map_err(|e| e.to_string())?;

    let completions = system.readers[0].take_completed();
    for (done, &addr) in completions.iter().zip(addrs.iter()) {
        if done.data != pattern(addr, WRITE_BYTES) {
            return Err(format!("write to {:#010x} read back differently", addr));
        }
    }
    Ok(())
}

fn fatal(system: &System, e: &SimError) -> ! {
    eprintln!("\n[!] FATAL: {} (cycle {})", e, system.cycle());
    system.stats.print();
    process::exit(1);
}

/// Main entry point for the interconnect simulator.
///
/// # Behavior
///
/// 1. **Configuration**: Loads the TOML file (or defaults) and applies overrides.
/// 2. **Initialization**: Builds the fabric, the DDR target and the drivers.
/// 3. **Simulation**: Ticks until the scenario's traffic has drained, stopping
///    on the first fatal protocol error.
/// 4. **Teardown**: Verifies the returned data, prints statistics, exits.
fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path).unwrap_or_else(|e| {
            eprintln!("[!] {}", e);
            process::exit(1);
        }),
        None => Config::default(),
    };
    if let Some(cycles) = args.cycles {
        config.sim.max_cycles = cycles;
    }

    if args.dump_config {
        match serde_json::to_string_pretty(&config) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("[!] {}", e);
                process::exit(1);
            }
        }
        return;
    }

    println!("Global Configuration");
    println!("--------------------");
    println!("Fabric:");
    println!("  Read Initiators:    {}", config.fabric.read_initiators.join(", "));
    println!("  Write Initiators:   {}", config.fabric.write_initiators.join(", "));
    println!("  Data Bus:           {} bytes", config.fabric.data_bytes);
    println!("  Id Bits:            {}", config.fabric.id_bits);
    println!("  Max Outstanding:    {}", config.fabric.max_outstanding);
    println!("Memory:");
    println!("  Size:               {} MB", config.memory.size / 1024 / 1024);
    println!("  Controller:         {:?}", config.memory.controller);
    println!("  Read Order:         {:?}", config.memory.read_order);
    println!("Scenario:             {:?}", args.scenario);

    let mut system = System::new(&config).unwrap_or_else(|e| {
        eprintln!("[!] {}", e);
        process::exit(1);
    });

    let expected = setup(&mut system, args.scenario);
    match system.run() {
        Ok(cycles) => info!("scenario drained in {} cycles", cycles),
        Err(e) => fatal(&system, &e),
    }

    let outcome = match args.scenario {
        Scenario::Write => verify_writes(&mut system),
        _ => verify(&mut system, &expected),
    };

    system.stats.print();
    match outcome {
        Ok(()) => println!("\n[*] Scenario {:?} passed", args.scenario),
        Err(msg) => {
            eprintln!("\n[!] Scenario {:?} failed: {}", args.scenario, msg);
            process::exit(1);
        }
    }
}
