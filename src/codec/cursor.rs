//! Explicit parser state for the record grammars
//!
//! A cursor borrows the text of one record and tracks a byte offset. Each
//! parsing step takes the cursor by `&mut` and leaves it after what it
//! consumed; nothing outlives the decode call.

use super::DecodeError;
use crate::tree::{NodeId, Side};

#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    pub(crate) fn offset(&self) -> usize {
        self.pos
    }

    pub(crate) fn skip_whitespace(&mut self) {
        while self.input.get(self.pos).is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    pub(crate) fn at_end(&mut self) -> bool {
        self.skip_whitespace();
        self.pos >= self.input.len()
    }

    /// Consume `expected` after optional whitespace
    pub(crate) fn expect(&mut self, expected: u8) -> Result<(), DecodeError> {
        self.skip_whitespace();
        match self.peek() {
            Some(b) if b == expected => {
                self.pos += 1;
                Ok(())
            }
            found => Err(self.unexpected(found)),
        }
    }

    /// Side letter immediately followed by an id, e.g. `L12`
    pub(crate) fn node_tag(&mut self) -> Result<(Side, NodeId), DecodeError> {
        self.skip_whitespace();
        let found = self.peek();
        let side = found
            .and_then(|b| Side::from_letter(b as char))
            .ok_or_else(|| self.unexpected(found))?;
        self.pos += 1;
        let id = self.number()?;
        Ok((side, id))
    }

    /// Unsigned integer starting exactly at the cursor
    pub(crate) fn number(&mut self) -> Result<usize, DecodeError> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(DecodeError::ExpectedNumber { offset: start });
        }
        let text = String::from_utf8_lossy(&self.input[start..self.pos]);
        text.parse().map_err(|_| DecodeError::InvalidNumber {
            offset: start,
            text: text.into_owned(),
        })
    }

    /// Whitespace-separated ids up to `close`; the opening byte is already consumed
    pub(crate) fn id_list(&mut self, close: u8) -> Result<Vec<NodeId>, DecodeError> {
        let opened = self.pos.saturating_sub(1);
        let mut ids = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b) if b == close => {
                    self.pos += 1;
                    return Ok(ids);
                }
                Some(b) if b.is_ascii_digit() => ids.push(self.number()?),
                Some(b) => return Err(self.unexpected(Some(b))),
                None => {
                    return Err(DecodeError::UnterminatedBlock {
                        offset: opened,
                        close: close as char,
                    })
                }
            }
        }
    }

    pub(crate) fn unexpected(&self, found: Option<u8>) -> DecodeError {
        match found {
            Some(b) => DecodeError::UnexpectedChar {
                offset: self.pos,
                found: b as char,
            },
            None => DecodeError::UnexpectedEnd { offset: self.pos },
        }
    }
}
