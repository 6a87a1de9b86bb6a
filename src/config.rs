//! Machine description reader.
//!
//! A description lists the alphabet, the slot and pawl counts, and then
//! every rotor the machine can seat:
//!
//! ```text
//! ABCDEFGHIJKLMNOPQRSTUVWXYZ 5 3
//! I MQ   (AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)
//! Beta N (ALBEVFCYODJWUGNMQTZSKPR) (HIX)
//! B R    (AE) (BN) (CK) (DQ) (FU) (GY) (HW) (IJ) (LO) (MP) (RX) (SZ) (TV)
//! ```
//!
//! The rotor type is `M` followed by the notch symbols, `N` for a fixed
//! rotor, or `R` for a reflector. Tokens are separated by any whitespace,
//! so a rotor's cycles may continue on the following lines.

use std::iter::Peekable;
use std::str::SplitWhitespace;
use std::sync::Arc;

use tracing::debug;

use crate::alphabet::{Alphabet, RESERVED_SYMBOLS};
use crate::error::EnigmaError;
use crate::machine::Machine;
use crate::permutation::Permutation;
use crate::rotor::Rotor;

/// Cursor over the whitespace-separated tokens of a description.
pub struct ConfigReader<'a> {
    tokens: Peekable<SplitWhitespace<'a>>,
}

impl<'a> ConfigReader<'a> {
    /// Creates a reader positioned before the first token of `text`.
    pub fn new(text: &'a str) -> Self {
        ConfigReader {
            tokens: text.split_whitespace().peekable(),
        }
    }

    /// Returns the next token without consuming it.
    pub fn peek(&mut self) -> Option<&'a str> {
        self.tokens.peek().copied()
    }

    /// True once every token has been consumed.
    pub fn is_exhausted(&mut self) -> bool {
        self.tokens.peek().is_none()
    }

    /// Consumes the next token; `what` names it in the error message.
    ///
    /// # Errors
    /// Returns [`EnigmaError::MalformedConfig`] if the input is exhausted.
    pub fn next_token(&mut self, what: &str) -> Result<&'a str, EnigmaError> {
        self.tokens
            .next()
            .ok_or_else(|| EnigmaError::MalformedConfig(format!("truncated, expected {}", what)))
    }

    /// Consumes the next token as a non-negative count.
    ///
    /// # Errors
    /// Returns [`EnigmaError::MalformedConfig`] if the input is exhausted
    /// or the token is not an integer.
    pub fn next_count(&mut self, what: &str) -> Result<usize, EnigmaError> {
        let token = self.next_token(what)?;
        token.parse().map_err(|_| {
            EnigmaError::MalformedConfig(format!("{} must be a count, got {:?}", what, token))
        })
    }

    /// Consumes every following token that opens a cycle and joins them.
    pub fn next_cycles(&mut self) -> String {
        let mut cycles = Vec::new();
        while let Some(token) = self.tokens.next_if(|t| t.starts_with('(')) {
            cycles.push(token);
        }
        cycles.join(" ")
    }
}

/// Parsed machine description, ready to [`build`](MachineConfig::build).
#[derive(Debug, Clone)]
pub struct MachineConfig {
    pub alphabet: Arc<Alphabet>,
    pub num_rotors: usize,
    pub num_pawls: usize,
    pub rotors: Vec<Rotor>,
}

impl MachineConfig {
    /// Parses a machine description.
    ///
    /// # Errors
    /// - [`EnigmaError::MalformedConfig`] for truncated input, non-integer
    ///   counts, unknown rotor types, or reserved symbols in rotor names.
    /// - Alphabet, permutation and rotor construction errors unchanged.
    pub fn parse(text: &str) -> Result<Self, EnigmaError> {
        let mut reader = ConfigReader::new(text);
        let alphabet = Arc::new(Alphabet::new(reader.next_token("alphabet")?)?);
        let num_rotors = reader.next_count("number of rotor slots")?;
        let num_pawls = reader.next_count("number of pawls")?;

        let mut rotors = Vec::new();
        while !reader.is_exhausted() {
            rotors.push(read_rotor(&mut reader, &alphabet)?);
        }
        debug!(
            alphabet = %alphabet,
            num_rotors,
            num_pawls,
            rotors = rotors.len(),
            "machine description parsed"
        );

        Ok(MachineConfig {
            alphabet,
            num_rotors,
            num_pawls,
            rotors,
        })
    }

    /// Assembles the machine this description declares.
    ///
    /// # Errors
    /// Propagates the errors of [`Machine::new`].
    pub fn build(self) -> Result<Machine, EnigmaError> {
        Machine::new(self.alphabet, self.num_rotors, self.num_pawls, self.rotors)
    }
}

/// Parses `text` and assembles the machine it describes.
///
/// # Errors
/// As [`MachineConfig::parse`] and [`MachineConfig::build`].
pub fn read_machine(text: &str) -> Result<Machine, EnigmaError> {
    MachineConfig::parse(text)?.build()
}

/// Reads one `<name> <type> <cycles...>` rotor description.
fn read_rotor(reader: &mut ConfigReader<'_>, alphabet: &Arc<Alphabet>) -> Result<Rotor, EnigmaError> {
    let name = reader.next_token("rotor name")?;
    reject_reserved("rotor name", name)?;
    let kind = reader.next_token("rotor type")?;
    reject_reserved("rotor type", kind)?;
    let permutation = Permutation::new(alphabet.clone(), &reader.next_cycles())?;

    let rotor = match kind.split_at(kind.chars().next().map_or(0, char::len_utf8)) {
        ("M", notches) => Rotor::moving(name, permutation, notches)?,
        ("N", "") => Rotor::fixed(name, permutation)?,
        ("R", "") => Rotor::reflector(name, permutation)?,
        _ => {
            return Err(EnigmaError::MalformedConfig(format!(
                "rotor {} has unknown type {:?}",
                name, kind
            )))
        }
    };
    debug!(rotor = name, kind, "rotor described");
    Ok(rotor)
}

fn reject_reserved(what: &str, token: &str) -> Result<(), EnigmaError> {
    if token.contains(&RESERVED_SYMBOLS[..]) {
        return Err(EnigmaError::MalformedConfig(format!(
            "{} {:?} contains a reserved symbol",
            what, token
        )));
    }
    Ok(())
}
