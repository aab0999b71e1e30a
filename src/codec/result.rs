//! Reader for written alignment records
//!
//! Downstream consumers (rule extraction) read back what the writer emits:
//! ```text
//! 0 ( 3 ) R10 [ 7 8 ] 10 ( 1 ) 3 ( 0 )
//! ```

use super::cursor::Cursor;
use super::DecodeError;
use crate::tree::{NodeId, Side};

/// Bracket of a synthesized node, as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualBracket {
    /// Tree the virtual node was added to
    pub side: Side,

    /// Grouped children in surface order
    pub children: Vec<NodeId>,
}

/// One internal node of an output record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEntry {
    /// Arena id
    pub id: NodeId,

    /// Present for virtual nodes
    pub virtual_node: Option<VirtualBracket>,

    /// Aligned ids in ascending order
    pub alignment: Vec<NodeId>,
}

/// Parse one written record (a single line; the newline is optional)
pub fn parse_result_record(line: &str) -> Result<Vec<ResultEntry>, DecodeError> {
    let mut cursor = Cursor::new(line);
    let mut entries = Vec::new();

    while !cursor.at_end() {
        let virtual_node = match cursor.peek() {
            Some(b) if b.is_ascii_digit() => None,
            _ => {
                let (side, declared) = cursor.node_tag()?;
                cursor.expect(b'[')?;
                let children = cursor.id_list(b']')?;
                cursor.skip_whitespace();
                let offset = cursor.offset();
                let id = cursor.number()?;
                if id != declared {
                    return Err(DecodeError::MismatchedId {
                        offset,
                        expected: declared,
                        found: id,
                    });
                }
                Some((id, VirtualBracket { side, children }))
            }
        };

        let id = match &virtual_node {
            Some((id, _)) => *id,
            None => cursor.number()?,
        };
        cursor.expect(b'(')?;
        let alignment = cursor.id_list(b')')?;

        entries.push(ResultEntry {
            id,
            virtual_node: virtual_node.map(|(_, bracket)| bracket),
            alignment,
        });
    }

    Ok(entries)
}
