//! Alphabet: ordered set of distinct symbols indexed densely from 0.
//!
//! Every permutation, rotor and machine in a simulation shares one
//! alphabet, handed around as an `Arc<Alphabet>`.

use std::collections::HashMap;
use std::fmt;

use crate::error::EnigmaError;

/// Symbols reserved by the configuration syntax.
pub const RESERVED_SYMBOLS: [char; 3] = ['*', '(', ')'];

/// Default alphabet of upper-case Latin letters.
const UPPER_CASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Bidirectional mapping between symbols and indices in `[0, size)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
    indices: HashMap<char, usize>,
}

impl Default for Alphabet {
    fn default() -> Self {
        let symbols: Vec<char> = UPPER_CASE.chars().collect();
        let indices = symbols.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        Alphabet { symbols, indices }
    }
}

impl Alphabet {
    /// Creates an alphabet whose symbol number `k` is the `k`-th char of
    /// `symbols`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::InvalidAlphabet`] if `symbols` is empty,
    /// repeats a symbol, or contains whitespace or one of `*`, `(`, `)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use enigmacrypt::Alphabet;
    ///
    /// let alpha = Alphabet::new("ABCD").unwrap();
    /// assert_eq!(alpha.size(), 4);
    /// assert_eq!(alpha.to_index('C').unwrap(), 2);
    /// assert!(Alphabet::new("ABA").is_err());
    /// ```
    pub fn new(symbols: &str) -> Result<Self, EnigmaError> {
        if symbols.is_empty() {
            return Err(EnigmaError::InvalidAlphabet("alphabet is empty".into()));
        }
        let mut chars = Vec::with_capacity(symbols.len());
        let mut indices = HashMap::with_capacity(symbols.len());
        for c in symbols.chars() {
            if RESERVED_SYMBOLS.contains(&c) || c.is_whitespace() {
                return Err(EnigmaError::InvalidAlphabet(format!(
                    "reserved symbol {:?} in {:?}",
                    c, symbols
                )));
            }
            if indices.insert(c, chars.len()).is_some() {
                return Err(EnigmaError::InvalidAlphabet(format!(
                    "duplicate symbol {:?} in {:?}",
                    c, symbols
                )));
            }
            chars.push(c);
        }
        Ok(Alphabet {
            symbols: chars,
            indices,
        })
    }

    /// Returns the number of symbols.
    pub fn size(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true if `symbol` belongs to this alphabet.
    pub fn contains(&self, symbol: char) -> bool {
        self.indices.contains_key(&symbol)
    }

    /// Returns the index of `symbol`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::NotInAlphabet`] if the symbol is absent.
    pub fn to_index(&self, symbol: char) -> Result<usize, EnigmaError> {
        self.indices
            .get(&symbol)
            .copied()
            .ok_or(EnigmaError::NotInAlphabet(symbol))
    }

    /// Returns the symbol at `index`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::IndexOutOfRange`] if `index >= size()`.
    pub fn to_symbol(&self, index: usize) -> Result<char, EnigmaError> {
        self.symbols
            .get(index)
            .copied()
            .ok_or(EnigmaError::IndexOutOfRange {
                index,
                size: self.size(),
            })
    }

    /// Iterates the symbols in index order.
    pub fn symbols(&self) -> impl Iterator<Item = char> + '_ {
        self.symbols.iter().copied()
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.symbols {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}
