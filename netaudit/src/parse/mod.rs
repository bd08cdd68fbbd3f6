//! Parsers turning raw CLI output into structured records.
//!
//! Every parser is total over its input: malformed, truncated, or empty
//! text yields an empty record set plus a diagnostic note, never an error.
//! Dispatch is by [`ParserId`], bound to commands in the profile registry.

mod interfaces;
mod neighbors;
mod version;

pub use interfaces::parse_interfaces;
pub use neighbors::parse_neighbors;
pub use version::parse_version;

use serde::Serialize;

use crate::report::{DeviceFacts, InterfaceRecord, NeighborRecord};

/// Identifies which parser applies to a command's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParserId {
    /// `show version`-class output into [`DeviceFacts`].
    Version,

    /// Interface status listings into [`InterfaceRecord`]s.
    Interfaces,

    /// CDP neighbor detail into [`NeighborRecord`]s.
    Neighbors,
}

impl std::fmt::Display for ParserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParserId::Version => f.write_str("version"),
            ParserId::Interfaces => f.write_str("interfaces"),
            ParserId::Neighbors => f.write_str("neighbors"),
        }
    }
}

/// One structured record produced by a parser.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRecord {
    Facts(DeviceFacts),
    Interface(InterfaceRecord),
    Neighbor(NeighborRecord),
}

/// Result of one parse call: records plus diagnostic notes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutput {
    /// Structured records, in input order.
    pub records: Vec<ParsedRecord>,

    /// Diagnostics worth surfacing in the device log (empty input,
    /// unrecognized layout). Notes are not errors.
    pub notes: Vec<String>,
}

impl ParseOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty output carrying a single note.
    pub fn noted(note: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            notes: vec![note.into()],
        }
    }
}

/// Run the parser identified by `id` over raw command output.
pub fn parse(id: ParserId, raw: &str) -> ParseOutput {
    match id {
        ParserId::Version => parse_version(raw),
        ParserId::Interfaces => parse_interfaces(raw),
        ParserId::Neighbors => parse_neighbors(raw),
    }
}
