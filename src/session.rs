//! Message settings and the line-oriented message loop.
//!
//! A setting line reconfigures the machine before the messages that
//! follow it:
//!
//! ```text
//! * B Beta III IV I AXLE (HQ) (EX) (IP) (TR) (BY)
//! * B Beta III IV I AXLE BAAA (HQ) (EX)
//! ```
//!
//! It names one rotor per slot (reflector first), then the positions of
//! slots 1.., then optionally their ring offsets, then the plugboard
//! cycles.

use tracing::{debug, trace};

use crate::error::EnigmaError;
use crate::machine::Machine;
use crate::permutation::Permutation;
use crate::utils::grouping::{group, GROUP_SIZE};

/// Marker that opens a setting line.
pub const SETTING_MARKER: char = '*';

/// A parsed setting line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    pub rotors: Vec<String>,
    pub positions: String,
    pub rings: Option<String>,
    pub plugboard: String,
}

impl Setting {
    /// Parses a setting line for a machine with `num_rotors` slots.
    ///
    /// # Errors
    /// Returns [`EnigmaError::MalformedConfig`] if the line does not start
    /// with `*`, lacks rotor names or positions, or has stray tokens after
    /// the plugboard begins.
    ///
    /// # Examples
    ///
    /// ```
    /// use enigmacrypt::session::Setting;
    ///
    /// let setting = Setting::parse("* B Beta III IV I AXLE BAAA (HQ) (EX)", 5).unwrap();
    /// assert_eq!(setting.rotors, ["B", "Beta", "III", "IV", "I"]);
    /// assert_eq!(setting.positions, "AXLE");
    /// assert_eq!(setting.rings.as_deref(), Some("BAAA"));
    /// assert_eq!(setting.plugboard, "(HQ) (EX)");
    /// ```
    pub fn parse(line: &str, num_rotors: usize) -> Result<Self, EnigmaError> {
        let body = line
            .trim_start()
            .strip_prefix(SETTING_MARKER)
            .ok_or_else(|| {
                EnigmaError::MalformedConfig(format!("setting {:?} must start with '*'", line))
            })?;
        let mut tokens = body.split_whitespace().peekable();

        let rotors: Vec<String> = tokens.by_ref().take(num_rotors).map(String::from).collect();
        if rotors.len() != num_rotors {
            return Err(EnigmaError::MalformedConfig(format!(
                "setting {:?} names {} rotors, expected {}",
                line,
                rotors.len(),
                num_rotors
            )));
        }
        let positions = tokens
            .next()
            .ok_or_else(|| {
                EnigmaError::MalformedConfig(format!("setting {:?} has no rotor positions", line))
            })?
            .to_string();
        let rings = tokens
            .next_if(|t| !t.starts_with('('))
            .map(String::from);

        let mut cycles = Vec::new();
        for token in tokens {
            if !token.starts_with('(') {
                return Err(EnigmaError::MalformedConfig(format!(
                    "unexpected {:?} in plugboard of setting {:?}",
                    token, line
                )));
            }
            cycles.push(token);
        }

        Ok(Setting {
            rotors,
            positions,
            rings,
            plugboard: cycles.join(" "),
        })
    }

    /// Applies this setting to `machine`: rotors, positions, rings and
    /// plugboard, in that order.
    ///
    /// The machine is left untouched if any step fails.
    ///
    /// # Errors
    /// Propagates the machine's validation errors.
    pub fn apply(&self, machine: &mut Machine) -> Result<(), EnigmaError> {
        let plugboard = Permutation::new(machine.alphabet().clone(), &self.plugboard)?;
        machine.configure(
            self.rotors.as_slice(),
            &self.positions,
            self.rings.as_deref(),
            plugboard,
        )?;
        debug!(setting = ?self, "setting applied");
        Ok(())
    }
}

/// True if `line` is a setting line.
pub fn is_setting(line: &str) -> bool {
    line.trim_start().starts_with(SETTING_MARKER)
}

/// Runs the message loop over `input` and returns the converted text.
///
/// Setting lines reconfigure `machine`; blank lines are echoed; every
/// other line has its whitespace removed, is converted, and is written
/// in groups of five. The machine keeps its state from one message line
/// to the next.
///
/// # Errors
/// - [`EnigmaError::MalformedConfig`] if a message precedes the first
///   setting line.
/// - Setting and conversion errors unchanged.
///
/// Use [`process_into`] to keep the lines converted before a failure.
pub fn process(machine: &mut Machine, input: &str) -> Result<String, EnigmaError> {
    let mut output = String::new();
    process_into(machine, input, &mut output)?;
    Ok(output)
}

/// Runs the message loop like [`process`], appending each finished line
/// to `output` as soon as it is converted.
///
/// On error, `output` holds every line completed before the failing one.
///
/// # Errors
/// As [`process`].
pub fn process_into(machine: &mut Machine, input: &str, output: &mut String) -> Result<(), EnigmaError> {
    let mut configured = false;

    for (number, line) in input.lines().enumerate() {
        if is_setting(line) {
            Setting::parse(line, machine.num_rotors())?.apply(machine)?;
            configured = true;
            continue;
        }
        let message: String = line.split_whitespace().collect();
        if !message.is_empty() {
            if !configured {
                return Err(EnigmaError::MalformedConfig(
                    "message precedes the first setting line".into(),
                ));
            }
            let converted = machine.convert(&message)?;
            output.push_str(&group(&converted, GROUP_SIZE));
        }
        output.push('\n');
        trace!(line = number + 1, "message line converted");
    }
    Ok(())
}
