//! Symbol demangler for the Microsoft Visual C++ mangling scheme.

use std::fmt;

use tokenizing::{Color, Token};

mod error;
pub mod msvc;

pub use error::{Error, ErrorKind};

pub type Result<T> = std::result::Result<T, Error>;

/// Rendered symbol as a sequence of colored tokens.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token<'static>>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self {
            tokens: Vec::with_capacity(128),
        }
    }

    #[inline]
    pub fn push(&mut self, text: &'static str, color: &'static Color) {
        self.tokens.push(Token::from_str(text, color))
    }

    #[inline]
    pub fn push_string(&mut self, text: String, color: &'static Color) {
        self.tokens.push(Token::from_string(text, color))
    }

    #[inline]
    pub fn tokens(&self) -> &[Token<'static>] {
        self.tokens.as_slice()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.iter().all(|t| t.text.is_empty())
    }

    /// Last character written to the stream, skipping empty tokens.
    pub fn last_char(&self) -> Option<char> {
        self.tokens
            .iter()
            .rev()
            .find_map(|t| t.text.chars().next_back())
    }
}

impl fmt::Display for TokenStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            f.write_str(&token.text)?;
        }

        Ok(())
    }
}
