//! Error types for the enigmacrypt library.

use thiserror::Error;

/// Errors produced by the enigmacrypt library.
///
/// Every variant is a programmer or input error; none of them is transient,
/// so callers report them and abort the operation in progress.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnigmaError {
    /// Alphabet is empty, repeats a symbol, or uses a reserved symbol.
    #[error("invalid alphabet: {0}")]
    InvalidAlphabet(String),
    /// Symbol is not part of the alphabet.
    #[error("symbol '{0}' is not in the alphabet")]
    NotInAlphabet(char),
    /// Index lies outside `[0, size)`.
    #[error("index {index} is outside the range [0, {size})")]
    IndexOutOfRange { index: usize, size: usize },
    /// Reflector wiring leaves at least one symbol fixed.
    #[error("reflector {0} is not a derangement")]
    ReflectorNotDerangement(String),
    /// Reflector was asked to move away from position 0.
    #[error("reflector {0} has only one position")]
    ReflectorFixedPosition(String),
    /// Counts or string lengths disagree with the machine shape.
    #[error("configuration mismatch: {0}")]
    ConfigurationMismatch(String),
    /// Active rotor stack breaks the reflector/uniqueness rules.
    #[error("structural violation: {0}")]
    StructuralViolation(String),
    /// Plugboard cycle names a symbol outside the alphabet.
    #[error("plugboard contains '{0}', which is not in the alphabet")]
    PlugboardInvalid(char),
    /// Rotor name not present in the machine's catalog.
    #[error("unknown rotor {0}")]
    UnknownRotor(String),
    /// Cycle description is syntactically malformed.
    #[error("malformed cycles: {0}")]
    InvalidCycles(String),
    /// Machine description or setting line cannot be parsed.
    #[error("malformed configuration: {0}")]
    MalformedConfig(String),
}
