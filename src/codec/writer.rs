//! Stream writer: [`NodeArena`] → text record
//!
//! Leaves are omitted. Each internal node is written as `<id> ( <links> ) `,
//! preceded for virtual nodes by `<L|R><id> [ <children> ] `. The record
//! ends with a newline.

use std::fmt;
use std::io::{self, Write};

use crate::tree::NodeArena;

/// Display adapter rendering one output record
#[derive(Debug, Clone, Copy)]
pub struct RecordDisplay<'a>(pub &'a NodeArena);

impl fmt::Display for RecordDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in self.0.iter().filter(|n| !n.is_leaf()) {
            if node.is_virtual() {
                write!(f, "{}{} [ ", node.side, node.id)?;
                for child in &node.children {
                    write!(f, "{} ", child)?;
                }
                write!(f, "] ")?;
            }
            write!(f, "{} ( ", node.id)?;
            for partner in &node.alignment {
                write!(f, "{} ", partner)?;
            }
            write!(f, ") ")?;
        }
        writeln!(f)
    }
}

/// Write one record
pub fn write_record<W: Write>(writer: &mut W, arena: &NodeArena) -> io::Result<()> {
    write!(writer, "{}", RecordDisplay(arena))
}

/// Render one record into a string (useful for tests and snapshots)
pub fn render_record(arena: &NodeArena) -> String {
    RecordDisplay(arena).to_string()
}
