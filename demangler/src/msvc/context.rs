use std::borrow::Cow;

use super::{Grammar, NameComponent, TypeNode};
use crate::{Error, Result};

/// Max recursion depth, low enough for a 2 MiB thread stack in a debug build.
pub(super) const MAX_DEPTH: usize = 96;

/// Up to 10 entries can be memorized for lookup using backref's: 0, 1, ..
#[derive(Debug, Clone)]
pub(super) struct Table<T> {
    entries: Vec<T>,
}

impl<T> Table<T> {
    pub const CAPACITY: usize = 10;

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            entries: Vec::with_capacity(Self::CAPACITY),
        }
    }
}

impl<T: Clone + PartialEq> Table<T> {
    /// Index of `node` in the table, appending it when it isn't present yet.
    /// Returns `None` once the table is full and `node` wasn't seen before.
    pub fn register(&mut self, node: &T) -> Option<usize> {
        if let Some(idx) = self.entries.iter().position(|entry| entry == node) {
            return Some(idx);
        }

        if self.entries.len() == Self::CAPACITY {
            return None;
        }

        self.entries.push(node.clone());
        Some(self.entries.len() - 1)
    }

    /// Clones the entry at `index`, `offset` is where the back-reference digit was read.
    pub fn resolve(&self, index: usize, offset: usize) -> Result<T> {
        self.entries
            .get(index)
            .cloned()
            .ok_or(Error::InvalidBackReference { index, offset })
    }
}

/// Compression state of a single symbol. Symbols embedded in a name share it,
/// template instantiations get a fresh instance.
#[derive(Debug, Default, Clone)]
pub(super) struct Backrefs {
    names: Table<NameComponent>,
    params: Table<TypeNode>,
}

impl Backrefs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn memorize_name(&mut self, name: &NameComponent) {
        self.names.register(name);
    }

    pub fn get_memorized_name(&self, idx: usize, offset: usize) -> Result<NameComponent> {
        self.names.resolve(idx, offset)
    }

    pub fn memorize_param(&mut self, tipe: &TypeNode) {
        self.params.register(tipe);
    }

    pub fn get_memorized_param(&self, idx: usize, offset: usize) -> Result<TypeNode> {
        self.params.resolve(idx, offset)
    }

    #[cfg(test)]
    pub fn counts(&self) -> (usize, usize) {
        (self.names.len(), self.params.len())
    }
}

/// Read position over a mangled symbol.
#[derive(Debug, Clone)]
pub(super) struct Cursor<'a> {
    src: &'a str,
    pub offset: usize,
    pub grammar: Grammar,
    pub verbose: bool,
    depth: usize,
}

impl<'a> Cursor<'a> {
    /// Create an initialized parser that hasn't started parsing yet.
    pub fn new(src: &'a str, grammar: Grammar, verbose: bool) -> Self {
        Self {
            src,
            offset: 0,
            grammar,
            verbose,
            depth: 0,
        }
    }

    /// Entire mangled input, independent of the offset.
    #[inline]
    pub fn input(&self) -> &'a str {
        self.src
    }

    /// Unparsed remainder of the input.
    #[inline]
    pub fn rest(&self) -> &'a [u8] {
        self.src.as_bytes().get(self.offset..).unwrap_or_default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rest().is_empty()
    }

    /// View the current byte in the mangled symbol without incrementing the offset.
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.rest().first().copied()
    }

    /// View the byte `n` positions past the current one.
    #[inline]
    pub fn peek_nth(&self, n: usize) -> Option<u8> {
        self.rest().get(n).copied()
    }

    #[inline]
    pub fn starts_with(&self, slice: &[u8]) -> bool {
        self.rest().starts_with(slice)
    }

    /// View the current byte in the mangled symbol, incrementing the offset.
    pub fn take(&mut self) -> Result<u8> {
        match self.peek() {
            Some(byte) => {
                self.offset += 1;
                Ok(byte)
            }
            None => Err(Error::PrematureEnd {
                offset: self.offset,
            }),
        }
    }

    /// Increment the offset if the current byte equals the byte given, fails otherwise.
    pub fn consume(&mut self, byte: u8) -> Result<()> {
        if self.eat(byte) {
            return Ok(());
        }

        Err(self.error_at(self.offset, format!("'{}'", byte as char)))
    }

    /// Increment the offset if the current byte equals the byte given.
    pub fn eat(&mut self, byte: u8) -> bool {
        let matches = self.peek() == Some(byte);
        self.offset += matches as usize;
        matches
    }

    /// Increment the offset if the slices match.
    pub fn eat_slice(&mut self, slice: &[u8]) -> bool {
        let matches = self.starts_with(slice);
        self.offset += slice.len() * (matches as usize);
        matches
    }

    /// Parses a base10 digit, incrementing the offset.
    pub fn base10(&mut self) -> Option<usize> {
        let n = match self.peek()? {
            c @ b'0'..=b'9' => (c - b'0') as usize,
            _ => return None,
        };

        self.offset += 1;
        Some(n)
    }

    /// Parses a generic number (positive, negative, hex or decimal).
    ///
    /// ```text
    /// <number> = [?] <non-negative integer>
    ///
    /// <non-negative integer> = <decimal digit> // 1..=10
    ///                        | {<hex digit>}+ @ // A = 0, B = 1, ..., P = 15
    /// ```
    pub fn number(&mut self) -> Result<i64> {
        let negative = self.eat(b'?');

        if let Some(digit) = self.base10() {
            let n = digit as i64 + 1;
            return Ok(if negative { -n } else { n });
        }

        let mut n = 0i64;
        loop {
            let start = self.offset;
            match self.take()? {
                chr @ b'A'..=b'P' => {
                    n = n
                        .checked_mul(16)
                        .and_then(|n| n.checked_add((chr - b'A') as i64))
                        .ok_or_else(|| self.error_at(start, "number within 64 bits"))?;
                }
                b'@' => return Ok(if negative { -n } else { n }),
                _ => return Err(self.error_at(start, "encoded number")),
            }
        }
    }

    /// Parses a series of characters up to the character '@', incrementing the offset
    /// by the amount of characters parsed + the terminator.
    pub fn ident(&mut self) -> Result<String> {
        let start = self.offset;
        let len = self
            .rest()
            .iter()
            .position(|&c| c == b'@')
            .ok_or(Error::PrematureEnd {
                offset: self.src.len(),
            })?;

        if len == 0 {
            return Err(self.error_at(start, "identifier"));
        }

        self.offset += len + 1;
        Ok(self.slice(start, start + len))
    }

    /// Copy of the input between two offsets.
    pub fn slice(&self, start: usize, end: usize) -> String {
        let bytes = self.src.as_bytes().get(start..end).unwrap_or_default();
        String::from_utf8_lossy(bytes).into_owned()
    }

    /// Error for an unexpected byte at `offset`, or for running out of input.
    pub fn error_at(&self, offset: usize, expected: impl Into<Cow<'static, str>>) -> Error {
        match self.src.as_bytes().get(offset) {
            Some(&found) => Error::Syntax {
                offset,
                expected: expected.into(),
                found: found as char,
            },
            None => Error::PrematureEnd { offset },
        }
    }

    /// Error for a recognised construct that isn't handled, spanning `start` up to the offset.
    pub fn unsupported(&self, start: usize) -> Error {
        Error::UnsupportedConstruct {
            code: self.slice(start, self.offset.max(start + 1)),
            offset: start,
        }
    }

    /// Increments the depth of the current parser, failing when the depth surpassed [`MAX_DEPTH`].
    #[inline]
    pub fn descent(&mut self) -> Result<()> {
        self.depth += 1;

        if self.depth > MAX_DEPTH {
            return Err(Error::RecursionLimit {
                offset: self.offset,
            });
        }

        Ok(())
    }

    /// Decrements the depth of the current parser.
    #[inline]
    pub fn ascent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
