//! Machine: the rotor stack, its stepping rule, and the plugboard.
//!
//! Slot 0 holds the reflector; the rightmost slot is driven on every key
//! press. Each conversion first steps the stack, then runs the signal
//! through plugboard, rotors right-to-left, rotors left-to-right (skipping
//! the reflector), and the plugboard again.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::alphabet::Alphabet;
use crate::error::EnigmaError;
use crate::permutation::Permutation;
use crate::rotor::{Rotor, RotorCatalog, RotorId, RotorState};

/// A catalog rotor seated in a slot, together with its position.
#[derive(Debug, Clone, Copy)]
struct RotorSlot {
    id: RotorId,
    state: RotorState,
}

/// A complete rotor machine.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use enigmacrypt::{Alphabet, Machine, Permutation, Rotor};
///
/// let alpha = Arc::new(Alphabet::new("ABCD").unwrap());
/// let reflector = Rotor::reflector("R", Permutation::new(alpha.clone(), "(AB)(CD)").unwrap()).unwrap();
/// let fixed = Rotor::fixed("F", Permutation::identity(alpha.clone())).unwrap();
///
/// let mut machine = Machine::new(alpha, 2, 0, vec![reflector, fixed]).unwrap();
/// machine.insert_rotors(&["R", "F"]).unwrap();
/// machine.set_rotor_positions("A").unwrap();
/// assert_eq!(machine.convert("AB").unwrap(), "BA");
/// ```
#[derive(Debug, Clone)]
pub struct Machine {
    alphabet: Arc<Alphabet>,
    num_rotors: usize,
    num_pawls: usize,
    catalog: RotorCatalog,
    slots: Vec<RotorSlot>,
    plugboard: Permutation,
}

impl Machine {
    /// Creates a machine with `num_rotors` slots and `num_pawls` pawls,
    /// able to seat any of `rotors`.
    ///
    /// No rotors are seated and the plugboard is empty until
    /// [`insert_rotors`](Self::insert_rotors) and
    /// [`set_plugboard`](Self::set_plugboard) are called.
    ///
    /// # Errors
    /// Returns [`EnigmaError::ConfigurationMismatch`] if `num_rotors < 2`,
    /// `num_pawls >= num_rotors`, a rotor uses another alphabet, or two
    /// rotors share a name.
    pub fn new<I>(
        alphabet: Arc<Alphabet>,
        num_rotors: usize,
        num_pawls: usize,
        rotors: I,
    ) -> Result<Self, EnigmaError>
    where
        I: IntoIterator<Item = Rotor>,
    {
        if num_rotors < 2 {
            return Err(EnigmaError::ConfigurationMismatch(format!(
                "a machine needs at least 2 rotor slots, got {}",
                num_rotors
            )));
        }
        if num_pawls >= num_rotors {
            return Err(EnigmaError::ConfigurationMismatch(format!(
                "{} pawls do not fit {} rotor slots",
                num_pawls, num_rotors
            )));
        }

        let mut catalog = RotorCatalog::new();
        for rotor in rotors {
            if rotor.alphabet().as_ref() != alphabet.as_ref() {
                return Err(EnigmaError::ConfigurationMismatch(format!(
                    "rotor {} is wired over alphabet {}, machine uses {}",
                    rotor.name(),
                    rotor.alphabet(),
                    alphabet
                )));
            }
            catalog.insert(rotor)?;
        }

        let names: Vec<&str> = catalog.iter().map(Rotor::name).collect();
        debug!(
            alphabet = %alphabet,
            num_rotors,
            num_pawls,
            catalog = ?names,
            "machine assembled"
        );

        Ok(Machine {
            plugboard: Permutation::identity(alphabet.clone()),
            alphabet,
            num_rotors,
            num_pawls,
            catalog,
            slots: Vec::new(),
        })
    }

    /// Returns the machine's alphabet.
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }

    /// Returns the number of rotor slots.
    pub fn num_rotors(&self) -> usize {
        self.num_rotors
    }

    /// Returns the number of pawls.
    pub fn num_pawls(&self) -> usize {
        self.num_pawls
    }

    /// Returns every rotor the machine can seat.
    pub fn catalog(&self) -> &RotorCatalog {
        &self.catalog
    }

    /// Returns the current plugboard.
    pub fn plugboard(&self) -> &Permutation {
        &self.plugboard
    }

    /// Names of the seated rotors, reflector first.
    pub fn active_rotor_names(&self) -> Vec<&str> {
        self.slots
            .iter()
            .map(|slot| self.catalog.rotor(slot.id).name())
            .collect()
    }

    /// Current settings of slots 1.. as alphabet symbols.
    pub fn positions(&self) -> String {
        self.slot_symbols(|state| state.setting)
    }

    /// Current ring offsets of slots 1.. as alphabet symbols.
    pub fn rings(&self) -> String {
        self.slot_symbols(|state| state.ring)
    }

    /// Position of the rotor in `slot`, if one is seated there.
    pub fn rotor_state(&self, slot: usize) -> Option<RotorState> {
        self.slots.get(slot).map(|s| s.state)
    }

    /// Seats the rotors named by `names`, leftmost (the reflector) first.
    ///
    /// Seated rotors start at setting 0 with ring 0. Nothing changes
    /// unless the whole selection is valid.
    ///
    /// # Errors
    /// - [`EnigmaError::ConfigurationMismatch`] if `names.len() != num_rotors()`
    ///   or more moving rotors than pawls are selected.
    /// - [`EnigmaError::UnknownRotor`] if a name is not in the catalog.
    /// - [`EnigmaError::StructuralViolation`] if a name repeats, slot 0 is
    ///   not a reflector, or a reflector sits in another slot.
    pub fn insert_rotors<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), EnigmaError> {
        if names.len() != self.num_rotors {
            return Err(EnigmaError::ConfigurationMismatch(format!(
                "{} rotors named for {} slots",
                names.len(),
                self.num_rotors
            )));
        }

        let mut ids: Vec<RotorId> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let id = self
                .catalog
                .find(name)
                .ok_or_else(|| EnigmaError::UnknownRotor(name.to_string()))?;
            if ids.contains(&id) {
                return Err(EnigmaError::StructuralViolation(format!(
                    "rotor {} named twice",
                    name
                )));
            }
            ids.push(id);
        }

        for (slot, &id) in ids.iter().enumerate() {
            let rotor = self.catalog.rotor(id);
            if slot == 0 && !rotor.reflecting() {
                return Err(EnigmaError::StructuralViolation(format!(
                    "first rotor {} is not a reflector",
                    rotor.name()
                )));
            }
            if slot > 0 && rotor.reflecting() {
                return Err(EnigmaError::StructuralViolation(format!(
                    "reflector {} seated in slot {}",
                    rotor.name(),
                    slot
                )));
            }
        }

        let moving = ids.iter().filter(|&&id| self.catalog.rotor(id).rotates()).count();
        if moving > self.num_pawls {
            return Err(EnigmaError::ConfigurationMismatch(format!(
                "{} moving rotors selected for {} pawls",
                moving, self.num_pawls
            )));
        }

        self.slots = ids
            .into_iter()
            .map(|id| RotorSlot {
                id,
                state: RotorState::default(),
            })
            .collect();
        debug!(rotors = ?self.active_rotor_names(), "rotors inserted");
        Ok(())
    }

    /// Sets slots 1.. to the positions named by `setting`, leftmost first.
    ///
    /// # Errors
    /// - [`EnigmaError::ConfigurationMismatch`] if no rotors are seated or
    ///   `setting` does not hold exactly `num_rotors() - 1` symbols.
    /// - [`EnigmaError::NotInAlphabet`] for a symbol outside the alphabet.
    pub fn set_rotor_positions(&mut self, setting: &str) -> Result<(), EnigmaError> {
        self.update_slots(setting, "setting", |rotor, state, symbol| {
            rotor.set_symbol(state, symbol)
        })?;
        debug!(positions = %self.positions(), "rotor positions set");
        Ok(())
    }

    /// Sets the ring offsets of slots 1.. from `rings`, leftmost first.
    ///
    /// # Errors
    /// As [`set_rotor_positions`](Self::set_rotor_positions).
    pub fn set_ring_offsets(&mut self, rings: &str) -> Result<(), EnigmaError> {
        let alphabet = self.alphabet.clone();
        self.update_slots(rings, "ring", |rotor, state, symbol| {
            rotor.set_ring(state, alphabet.to_index(symbol)?)
        })?;
        debug!(rings = %self.rings(), "ring offsets set");
        Ok(())
    }

    /// Installs `plugboard`.
    ///
    /// # Errors
    /// - [`EnigmaError::PlugboardInvalid`] if a cycle names a symbol
    ///   outside the machine's alphabet.
    /// - [`EnigmaError::ConfigurationMismatch`] if the permutation ranges
    ///   over another alphabet.
    pub fn set_plugboard(&mut self, plugboard: Permutation) -> Result<(), EnigmaError> {
        if let Some(c) = plugboard
            .wired_symbols()
            .find(|&c| !self.alphabet.contains(c))
        {
            return Err(EnigmaError::PlugboardInvalid(c));
        }
        if plugboard.alphabet().as_ref() != self.alphabet.as_ref() {
            return Err(EnigmaError::ConfigurationMismatch(
                "plugboard uses a different alphabet".into(),
            ));
        }
        debug!(plugboard = %plugboard, "plugboard set");
        self.plugboard = plugboard;
        Ok(())
    }

    /// Seats `rotors`, then sets their positions, optional ring offsets
    /// and the plugboard, in that order.
    ///
    /// Either every step succeeds or the machine keeps its previous
    /// rotors, positions, rings and plugboard. Only the slot states are
    /// saved for the rollback; the catalog is never copied.
    ///
    /// # Errors
    /// As [`insert_rotors`](Self::insert_rotors),
    /// [`set_rotor_positions`](Self::set_rotor_positions),
    /// [`set_ring_offsets`](Self::set_ring_offsets) and
    /// [`set_plugboard`](Self::set_plugboard).
    pub fn configure<S: AsRef<str>>(
        &mut self,
        rotors: &[S],
        positions: &str,
        rings: Option<&str>,
        plugboard: Permutation,
    ) -> Result<(), EnigmaError> {
        let saved = self.slots.clone();
        let result = self.try_configure(rotors, positions, rings, plugboard);
        if result.is_err() {
            self.slots = saved;
        }
        result
    }

    fn try_configure<S: AsRef<str>>(
        &mut self,
        rotors: &[S],
        positions: &str,
        rings: Option<&str>,
        plugboard: Permutation,
    ) -> Result<(), EnigmaError> {
        self.insert_rotors(rotors)?;
        self.set_rotor_positions(positions)?;
        if let Some(rings) = rings {
            self.set_ring_offsets(rings)?;
        }
        self.set_plugboard(plugboard)
    }

    /// Steps the rotors, then converts the index `c`.
    ///
    /// # Errors
    /// - [`EnigmaError::IndexOutOfRange`] if `c` is outside the alphabet.
    /// - [`EnigmaError::ConfigurationMismatch`] if no rotors are seated.
    pub fn convert_index(&mut self, c: usize) -> Result<usize, EnigmaError> {
        if c >= self.alphabet.size() {
            return Err(EnigmaError::IndexOutOfRange {
                index: c,
                size: self.alphabet.size(),
            });
        }
        self.ensure_seated()?;
        self.step();

        let mut signal = c;
        if self.plugboard.contains_in_cycles(signal) {
            signal = self.plugboard.permute_index(signal as i64)?;
        }
        for slot in self.slots.iter().rev() {
            signal = self.catalog.rotor(slot.id).convert_forward(&slot.state, signal)?;
        }
        for slot in self.slots.iter().skip(1) {
            signal = self.catalog.rotor(slot.id).convert_backward(&slot.state, signal)?;
        }
        if self.plugboard.contains_in_cycles(signal) {
            signal = self.plugboard.invert_index(signal as i64)?;
        }
        Ok(signal)
    }

    /// Steps the rotors, then converts `symbol`.
    ///
    /// # Errors
    /// As [`convert_index`](Self::convert_index), plus
    /// [`EnigmaError::NotInAlphabet`].
    pub fn convert_symbol(&mut self, symbol: char) -> Result<char, EnigmaError> {
        let index = self.alphabet.to_index(symbol)?;
        let converted = self.convert_index(index)?;
        self.alphabet.to_symbol(converted)
    }

    /// Converts every symbol of `msg` in order, stepping before each one.
    ///
    /// Encoding and decoding are the same operation: starting from the
    /// same positions, converting the output restores the input.
    ///
    /// # Errors
    /// As [`convert_symbol`](Self::convert_symbol). Symbols before the
    /// failing one have already advanced the rotors.
    pub fn convert(&mut self, msg: &str) -> Result<String, EnigmaError> {
        msg.chars().map(|c| self.convert_symbol(c)).collect()
    }

    /// Advances the rotors for one key press.
    ///
    /// Every decision reads the positions from before the press, so a
    /// middle rotor at its notch moves together with its left neighbour
    /// (the double step).
    fn step(&mut self) {
        let last = self.slots.len() - 1;
        let mut advances = vec![false; self.slots.len()];
        for i in 1..self.slots.len() {
            let rotor = self.catalog.rotor(self.slots[i].id);
            let left = self.catalog.rotor(self.slots[i - 1].id);
            if rotor.at_notch(&self.slots[i].state) && left.rotates() {
                advances[i] = true;
                advances[i - 1] = true;
            } else if i == last {
                advances[i] = true;
            }
        }

        for (slot, &advance) in self.slots.iter_mut().zip(&advances) {
            if advance {
                self.catalog.rotor(slot.id).advance(&mut slot.state);
            }
        }
        trace!(?advances, positions = %self.positions(), "stepped");
    }

    fn ensure_seated(&self) -> Result<(), EnigmaError> {
        if self.slots.len() == self.num_rotors {
            Ok(())
        } else {
            Err(EnigmaError::ConfigurationMismatch(
                "no rotors inserted".into(),
            ))
        }
    }

    /// Applies one symbol of `values` to each of slots 1.., all or nothing.
    fn update_slots<F>(&mut self, values: &str, what: &str, mut apply: F) -> Result<(), EnigmaError>
    where
        F: FnMut(&Rotor, &mut RotorState, char) -> Result<(), EnigmaError>,
    {
        self.ensure_seated()?;
        let count = values.chars().count();
        if count != self.num_rotors - 1 {
            return Err(EnigmaError::ConfigurationMismatch(format!(
                "{} string {:?} has {} symbols, expected {}",
                what,
                values,
                count,
                self.num_rotors - 1
            )));
        }
        let mut slots = self.slots.clone();
        for (slot, symbol) in slots.iter_mut().skip(1).zip(values.chars()) {
            apply(self.catalog.rotor(slot.id), &mut slot.state, symbol)?;
        }
        self.slots = slots;
        Ok(())
    }

    fn slot_symbols(&self, field: fn(&RotorState) -> usize) -> String {
        self.slots
            .iter()
            .skip(1)
            .filter_map(|slot| self.alphabet.to_symbol(field(&slot.state)).ok())
            .collect()
    }
}
