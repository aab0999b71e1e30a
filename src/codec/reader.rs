//! Stream reader: text records → [`NodeArena`]
//!
//! Record layout:
//! ```text
//! <N>\n
//! L0 [1 2] L1 (4) L2 (5) R3 [4 5] R4 R5\n
//! ```
//! The header declares ids `0..N`. The node list is whitespace-insensitive
//! and ends at the first newline outside any `[...]` or `(...)` block.

use std::io::BufRead;

use tracing::{debug, trace};

use super::cursor::Cursor;
use super::DecodeError;
use crate::tree::{ArenaBuilder, NodeArena};

/// Reads tree-pair records one at a time
#[derive(Debug)]
pub struct TreeReader<R> {
    reader: R,
    records: usize,
    finished: bool,
}

impl<R: BufRead> TreeReader<R> {
    /// Wrap a buffered source
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            records: 0,
            finished: false,
        }
    }

    /// Number of records decoded so far
    pub fn records_read(&self) -> usize {
        self.records
    }

    /// Decode the next record
    ///
    /// A missing, empty, zero or non-numeric header is end-of-stream
    /// (`Ok(None)`); a malformed node list is an error.
    pub fn next_pair(&mut self) -> Result<Option<NodeArena>, DecodeError> {
        let mut header = String::new();
        if self.reader.read_line(&mut header)? == 0 {
            return Ok(None);
        }
        let declared = match header.trim().parse::<usize>() {
            Ok(n) if n > 0 => n,
            _ => {
                debug!(header = header.trim(), "no record header, end of stream");
                return Ok(None);
            }
        };

        let body = self.read_body()?;
        let arena = decode_body(&body, declared)?;
        self.records += 1;
        trace!(record = self.records, nodes = declared, "record decoded");
        Ok(Some(arena))
    }

    /// Lines up to the first one that ends outside a block
    fn read_body(&mut self) -> Result<String, DecodeError> {
        let mut body = String::new();
        loop {
            if self.reader.read_line(&mut body)? == 0 || !ends_inside_block(&body) {
                return Ok(body);
            }
        }
    }
}

impl<R: BufRead> Iterator for TreeReader<R> {
    type Item = Result<NodeArena, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let item = self.next_pair().transpose();
        if !matches!(item, Some(Ok(_))) {
            self.finished = true;
        }
        item
    }
}

/// Decode the first record of `text`
///
/// End-of-stream yields an empty arena, the same "empty tree pair" the
/// reader treats as the end marker.
pub fn read_record(text: &str) -> Result<NodeArena, DecodeError> {
    Ok(TreeReader::new(text.as_bytes())
        .next_pair()?
        .unwrap_or_default())
}

fn ends_inside_block(text: &str) -> bool {
    let mut inside = false;
    for b in text.bytes() {
        match b {
            b'[' | b'(' => inside = true,
            b']' | b')' => inside = false,
            _ => {}
        }
    }
    inside
}

/// Parse a node list declaring ids `0..declared`
fn decode_body(body: &str, declared: usize) -> Result<NodeArena, DecodeError> {
    let mut cursor = Cursor::new(body);
    let mut builder = ArenaBuilder::new(declared);

    while !cursor.at_end() {
        let (side, id) = cursor.node_tag()?;
        let mut children = None;
        let mut links = None;

        loop {
            cursor.skip_whitespace();
            match cursor.peek() {
                Some(b'[') if children.is_none() => {
                    cursor.expect(b'[')?;
                    children = Some(cursor.id_list(b']')?);
                }
                Some(b'(') if links.is_none() => {
                    cursor.expect(b'(')?;
                    links = Some(cursor.id_list(b')')?);
                }
                _ => break,
            }
        }

        builder.add_node(
            id,
            side,
            children.unwrap_or_default(),
            links.unwrap_or_default(),
        )?;
    }

    Ok(builder.build()?)
}
