//! Test module organization.
//!
//! This module organizes all integration tests for the AXI3 interconnect model.




/// Reference DDR target and memory controller tests.
mod ddr_tests;


/// End-to-end fabric and target integration tests.
mod integration_tests;



/// Burst translator coverage and legality tests.
mod translator_tests;
