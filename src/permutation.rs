//! Permutation of an alphabet's index space, written in cycle notation.
//!
//! A description such as `"(AELTPHQXRU) (BKNW) (S)"` maps every symbol
//! of a cycle to its successor, the last one wrapping to the first.
//! Symbols that no cycle mentions map to themselves.
//!
//! Construction only checks the cycle syntax. Whether every wired symbol
//! belongs to the alphabet is the caller's concern (see
//! [`foreign_symbol`](Permutation::foreign_symbol)); index lookups that
//! would land on a foreign symbol fail with [`EnigmaError::NotInAlphabet`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::alphabet::Alphabet;
use crate::error::EnigmaError;

/// Permutation over the indices `[0, size)` of an [`Alphabet`].
#[derive(Debug, Clone)]
pub struct Permutation {
    alphabet: Arc<Alphabet>,
    cycles: Vec<Vec<char>>,
    forward: HashMap<char, char>,
    inverse: HashMap<char, char>,
    forward_index: Vec<Option<usize>>,
    inverse_index: Vec<Option<usize>>,
    wired: Vec<bool>,
    derangement: bool,
}

impl Permutation {
    /// Builds the permutation described by `cycles` over `alphabet`.
    ///
    /// Whitespace anywhere in `cycles` is ignored.
    ///
    /// # Errors
    /// Returns [`EnigmaError::InvalidCycles`] on unbalanced or nested
    /// delimiters, a symbol outside any cycle, or a symbol that appears
    /// in more than one place.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use enigmacrypt::{Alphabet, Permutation};
    ///
    /// let alpha = Arc::new(Alphabet::new("ABCD").unwrap());
    /// let perm = Permutation::new(alpha, "(ABC)").unwrap();
    /// assert_eq!(perm.permute_symbol('C').unwrap(), 'A');
    /// assert_eq!(perm.invert_symbol('A').unwrap(), 'C');
    /// assert_eq!(perm.permute_symbol('D').unwrap(), 'D');
    /// assert_eq!(perm.permute_index(-3).unwrap(), 2);
    /// ```
    pub fn new(alphabet: Arc<Alphabet>, cycles: &str) -> Result<Self, EnigmaError> {
        let cycles = parse_cycles(cycles)?;

        let mut forward: HashMap<char, char> = alphabet.symbols().map(|c| (c, c)).collect();
        let mut inverse = forward.clone();
        for cycle in &cycles {
            for (i, &from) in cycle.iter().enumerate() {
                let to = cycle[(i + 1) % cycle.len()];
                forward.insert(from, to);
                inverse.insert(to, from);
            }
        }

        let index_table = |map: &HashMap<char, char>| -> Vec<Option<usize>> {
            alphabet
                .symbols()
                .map(|c| map.get(&c).and_then(|&t| alphabet.to_index(t).ok()))
                .collect()
        };
        let forward_index = index_table(&forward);
        let inverse_index = index_table(&inverse);

        let mut wired = vec![false; alphabet.size()];
        for &c in cycles.iter().flatten() {
            if let Ok(i) = alphabet.to_index(c) {
                wired[i] = true;
            }
        }

        let derangement = alphabet.size() > 1
            && forward_index
                .iter()
                .enumerate()
                .all(|(i, &target)| target != Some(i));

        Ok(Permutation {
            alphabet,
            cycles,
            forward,
            inverse,
            forward_index,
            inverse_index,
            wired,
            derangement,
        })
    }

    /// The identity permutation (no cycles).
    pub fn identity(alphabet: Arc<Alphabet>) -> Self {
        let size = alphabet.size();
        let forward: HashMap<char, char> = alphabet.symbols().map(|c| (c, c)).collect();
        let table: Vec<Option<usize>> = (0..size).map(Some).collect();
        Permutation {
            alphabet,
            cycles: Vec::new(),
            inverse: forward.clone(),
            forward,
            forward_index: table.clone(),
            inverse_index: table,
            wired: vec![false; size],
            derangement: false,
        }
    }

    /// Returns the size of the permuted alphabet.
    pub fn size(&self) -> usize {
        self.alphabet.size()
    }

    /// Returns the alphabet this permutation ranges over.
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }

    /// Reduces `p` modulo the alphabet size into `[0, size)`.
    ///
    /// Defined for every integer, negatives included.
    pub fn wrap(&self, p: i64) -> usize {
        p.rem_euclid(self.size() as i64) as usize
    }

    /// Applies the permutation to `wrap(p)`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::NotInAlphabet`] if the image is a symbol
    /// outside the alphabet.
    pub fn permute_index(&self, p: i64) -> Result<usize, EnigmaError> {
        let i = self.wrap(p);
        self.forward_index[i].ok_or_else(|| self.foreign_image(&self.forward, i))
    }

    /// Applies the inverse permutation to `wrap(c)`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::NotInAlphabet`] if the preimage is a symbol
    /// outside the alphabet.
    pub fn invert_index(&self, c: i64) -> Result<usize, EnigmaError> {
        let i = self.wrap(c);
        self.inverse_index[i].ok_or_else(|| self.foreign_image(&self.inverse, i))
    }

    /// Returns the image of `symbol`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::NotInAlphabet`] if `symbol` was never
    /// registered by the alphabet or a cycle.
    pub fn permute_symbol(&self, symbol: char) -> Result<char, EnigmaError> {
        self.forward
            .get(&symbol)
            .copied()
            .ok_or(EnigmaError::NotInAlphabet(symbol))
    }

    /// Returns the preimage of `symbol`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::NotInAlphabet`] if `symbol` was never
    /// registered by the alphabet or a cycle.
    pub fn invert_symbol(&self, symbol: char) -> Result<char, EnigmaError> {
        self.inverse
            .get(&symbol)
            .copied()
            .ok_or(EnigmaError::NotInAlphabet(symbol))
    }

    /// Returns true iff no index maps to itself.
    ///
    /// A one-symbol alphabet is never a derangement.
    pub fn is_derangement(&self) -> bool {
        self.derangement
    }

    /// Returns true iff the symbol at `index` is written inside one of
    /// the cycles, as opposed to mapping to itself by default.
    pub fn contains_in_cycles(&self, index: usize) -> bool {
        self.wired.get(index).copied().unwrap_or(false)
    }

    /// Iterates every symbol written in the cycles, in description order.
    pub fn wired_symbols(&self) -> impl Iterator<Item = char> + '_ {
        self.cycles.iter().flatten().copied()
    }

    /// Returns the first wired symbol that is not in the alphabet, if any.
    pub fn foreign_symbol(&self) -> Option<char> {
        self.wired_symbols().find(|&c| !self.alphabet.contains(c))
    }

    fn foreign_image(&self, map: &HashMap<char, char>, index: usize) -> EnigmaError {
        let symbol = self.alphabet.to_symbol(index).unwrap_or_default();
        EnigmaError::NotInAlphabet(map.get(&symbol).copied().unwrap_or(symbol))
    }
}

impl fmt::Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cycle) in self.cycles.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "(")?;
            for c in cycle {
                write!(f, "{}", c)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Splits a cycle description into its cycles.
fn parse_cycles(description: &str) -> Result<Vec<Vec<char>>, EnigmaError> {
    let mut cycles: Vec<Vec<char>> = Vec::new();
    let mut current: Option<Vec<char>> = None;
    let mut seen: Vec<char> = Vec::new();

    for c in description.chars().filter(|c| !c.is_whitespace()) {
        match c {
            '(' => {
                if current.is_some() {
                    return Err(EnigmaError::InvalidCycles(format!(
                        "nested '(' in {:?}",
                        description
                    )));
                }
                current = Some(Vec::new());
            }
            ')' => match current.take() {
                Some(cycle) => cycles.push(cycle),
                None => {
                    return Err(EnigmaError::InvalidCycles(format!(
                        "unmatched ')' in {:?}",
                        description
                    )))
                }
            },
            _ => {
                let Some(cycle) = current.as_mut() else {
                    return Err(EnigmaError::InvalidCycles(format!(
                        "symbol {:?} outside a cycle in {:?}",
                        c, description
                    )));
                };
                if seen.contains(&c) {
                    return Err(EnigmaError::InvalidCycles(format!(
                        "symbol {:?} repeated in {:?}",
                        c, description
                    )));
                }
                seen.push(c);
                cycle.push(c);
            }
        }
    }

    if current.is_some() {
        return Err(EnigmaError::InvalidCycles(format!(
            "unclosed cycle in {:?}",
            description
        )));
    }
    Ok(cycles)
}
