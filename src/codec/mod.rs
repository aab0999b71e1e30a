//! Text codec for tree-pair records
//!
//! Input records carry both trees plus seed word alignments on leaves;
//! output records carry the inferred alignment of every internal node and
//! the brackets of virtual nodes.

mod cursor;
mod reader;
mod result;
mod writer;

pub use reader::{read_record, TreeReader};
pub use result::{parse_result_record, ResultEntry, VirtualBracket};
pub use writer::{render_record, write_record, RecordDisplay};

use thiserror::Error;

use crate::AlignError;

/// Errors raised while decoding a record body
///
/// A bad header is not an error: it marks the end of the stream.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Underlying read failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Character that cannot start or continue a node entry
    #[error("unexpected character '{found}' at offset {offset}")]
    UnexpectedChar {
        /// Byte offset within the record body
        offset: usize,
        /// Offending character
        found: char,
    },

    /// Input ended in the middle of a node entry
    #[error("unexpected end of record at offset {offset}")]
    UnexpectedEnd {
        /// Byte offset within the record body
        offset: usize,
    },

    /// Digit expected
    #[error("expected a node id at offset {offset}")]
    ExpectedNumber {
        /// Byte offset within the record body
        offset: usize,
    },

    /// Digits that do not fit a node id
    #[error("invalid node id '{text}' at offset {offset}")]
    InvalidNumber {
        /// Byte offset within the record body
        offset: usize,
        /// Digits as read
        text: String,
    },

    /// `[` or `(` without its closing bracket
    #[error("block opened at offset {offset} is missing '{close}'")]
    UnterminatedBlock {
        /// Offset of the opening bracket
        offset: usize,
        /// Expected closing bracket
        close: char,
    },

    /// Virtual bracket and alignment entry name different ids
    #[error("entry at offset {offset} names node {found}, expected {expected}")]
    MismatchedId {
        /// Byte offset within the record
        offset: usize,
        /// Id from the virtual bracket
        expected: usize,
        /// Id found before the alignment block
        found: usize,
    },

    /// Record parsed but describes an invalid tree pair
    #[error("invalid tree pair: {0}")]
    Structure(#[from] AlignError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_written_record_reads_back() {
        let mut arena = read_record("6\nL0 [1 2] L1 (4) L2 (5) R3 [4 5] R4 R5\n").unwrap();
        arena.link(0, 3).unwrap();

        let entries = parse_result_record(&render_record(&arena)).unwrap();
        let ids: Vec<_> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0, 3]);
        assert_eq!(entries[0].alignment, vec![3]);
        assert_eq!(entries[1].alignment, vec![0]);
    }
}
