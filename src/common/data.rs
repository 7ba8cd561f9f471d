//! Transfer Directions.
//!
//! This module defines the classification of bus transactions used throughout
//! the model. Read and write transactions travel on disjoint AXI3 channel
//! groups and own disjoint id spaces, so almost every piece of per-transaction
//! state is keyed by a [`Direction`] as well as an id.

use std::fmt;

/// Direction of a bus transaction.
///
/// Used to select the channel group (AR/R or AW/W/B) and the outstanding
/// transaction table a transaction belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Read transaction.
    ///
    /// Address phase on AR, data returned on R.
    Read,

    /// Write transaction.
    ///
    /// Address phase on AW, data sent on W, completion returned on B.
    Write,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Read => "read",
            Direction::Write => "write",
        })
    }
}
