//! Two-Phase Evaluation Interface.
//!
//! Defines the lifecycle every simulated block obeys. The harness calls the
//! hooks in a fixed global order once per cycle:
//!
//! 1. `comb_outputs` on every component, in topology order,
//! 2. `comb_inputs` on every component, in topology order,
//! 3. `seq` on every component.
//!
//! The combinational hooks may only write signals and the component's
//! per-cycle decision snapshot. Sequential state is written in `seq` and
//! nowhere else, so the order in which components are committed never
//! changes the result.

use crate::common::error::SimError;

/// A block evaluated with combinational settle followed by a clock edge.
pub trait Component {
    /// Returns the user-friendly name of the component.
    ///
    /// Used for logging and diagnostics.
    fn name(&self) -> &str;

    /// Resets all sequential state to power-on defaults.
    fn init(&mut self);

    /// Computes the signals that depend only on sequential state and on
    /// inputs that have already settled this cycle.
    ///
    /// # Returns
    ///
    /// A fatal error if the settled inputs violate the protocol.
    fn comb_outputs(&mut self) -> Result<(), SimError>;

    /// Computes the signals that depend on the peer's freshly computed outputs.
    fn comb_inputs(&mut self) -> Result<(), SimError>;

    /// Latches the next sequential state from the settled signals.
    fn seq(&mut self) -> Result<(), SimError>;
}
