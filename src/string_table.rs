//! String Table: interns canonical DR strings and hands out stable integer
//! tokens. Mirrors the original `StringCheck` class, but with a token newtype
//! instead of a bare integer so "0 means absent" is enforced by the type.

use std::collections::HashMap;
use std::num::NonZeroU32;

/// A stable, dense, non-zero identifier for an interned DR string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(NonZeroU32);

impl Token {
    fn from_index(index: usize) -> Self {
        Token(NonZeroU32::new((index + 1) as u32).expect("index + 1 is never zero"))
    }

    fn to_index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// Bijection between distinct canonical DR strings and tokens. Tokens are
/// assigned monotonically in first-sight order and are stable for the
/// lifetime of the process.
#[derive(Debug, Default)]
pub struct StringTable {
    strings: Vec<Vec<u8>>,
    lookup: HashMap<Vec<u8>, Token>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pure query: returns the token for `s` if it has already been interned.
    pub fn get_token(&self, s: &[u8]) -> Option<Token> {
        self.lookup.get(s).copied()
    }

    /// Intern `s`, returning its token. Idempotent: repeated calls with the
    /// same string return the same token.
    pub fn add_string(&mut self, s: &[u8]) -> Token {
        if let Some(&token) = self.lookup.get(s) {
            return token;
        }
        let token = Token::from_index(self.strings.len());
        self.strings.push(s.to_vec());
        self.lookup.insert(s.to_vec(), token);
        token
    }

    /// The interned string for `token`.
    pub fn string_of(&self, token: Token) -> &[u8] {
        &self.strings[token.to_index()]
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn tokens(&self) -> impl Iterator<Item = Token> + '_ {
        (0..self.strings.len()).map(Token::from_index)
    }
}
