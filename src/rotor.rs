//! Rotors: wired discs that substitute symbols under a rotational offset.
//!
//! A [`Rotor`] is an immutable template (name, kind, wiring). The mutable
//! position of a rotor seated in a machine lives in a separate
//! [`RotorState`], so one catalog of templates can back any number of
//! machines without aliasing. The [`RotorCatalog`] stores templates in a
//! `Vec` and hands out [`RotorId`]s, the same arena pattern used for any
//! graph of components referenced by index.

use std::collections::HashMap;
use std::sync::Arc;

use crate::alphabet::Alphabet;
use crate::error::EnigmaError;
use crate::permutation::Permutation;

/// Unique identifier for a rotor within a [`RotorCatalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RotorId(pub(crate) usize);

/// The mechanical variant of a rotor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotorKind {
    /// Never advances, never at a notch.
    Fixed,
    /// Advances under a pawl; `notches` holds alphabet indices.
    Moving { notches: Vec<usize> },
    /// Fixed rotor with derangement wiring, seated in slot 0 only.
    Reflector,
}

/// Rotational position of a seated rotor.
///
/// `setting` is the position shown in the window, `ring` the offset of
/// the wiring relative to that indicator. Both are alphabet indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotorState {
    pub setting: usize,
    pub ring: usize,
}

/// Direction of a signal through a rotor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Forward,
    Backward,
}

/// Immutable rotor template: a named permutation plus its mechanical kind.
#[derive(Debug, Clone)]
pub struct Rotor {
    name: String,
    kind: RotorKind,
    permutation: Permutation,
}

impl Rotor {
    /// Creates a non-moving, non-reflecting rotor.
    ///
    /// # Errors
    /// Returns [`EnigmaError::NotInAlphabet`] if the wiring names a symbol
    /// outside its alphabet.
    pub fn fixed(name: &str, permutation: Permutation) -> Result<Self, EnigmaError> {
        Self::build(name, RotorKind::Fixed, permutation)
    }

    /// Creates a moving rotor whose notches sit at the symbols of `notches`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::NotInAlphabet`] if a notch or a wired symbol
    /// is outside the alphabet.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use enigmacrypt::{Alphabet, Permutation, Rotor, RotorState};
    ///
    /// let alpha = Arc::new(Alphabet::default());
    /// let perm = Permutation::new(alpha, "(ABDHPEJT) (CFLVMZOYQIRWUKXSG) (N)").unwrap();
    /// let rotor = Rotor::moving("III", perm, "V").unwrap();
    ///
    /// let mut state = RotorState::default();
    /// rotor.set_symbol(&mut state, 'U').unwrap();
    /// assert!(!rotor.at_notch(&state));
    /// rotor.advance(&mut state);
    /// assert!(rotor.at_notch(&state));
    /// ```
    pub fn moving(name: &str, permutation: Permutation, notches: &str) -> Result<Self, EnigmaError> {
        let alphabet = permutation.alphabet();
        let mut indices = Vec::with_capacity(notches.len());
        for c in notches.chars() {
            let i = alphabet.to_index(c)?;
            if !indices.contains(&i) {
                indices.push(i);
            }
        }
        Self::build(name, RotorKind::Moving { notches: indices }, permutation)
    }

    /// Creates a reflector.
    ///
    /// # Errors
    /// Returns [`EnigmaError::ReflectorNotDerangement`] unless the wiring
    /// is a derangement.
    pub fn reflector(name: &str, permutation: Permutation) -> Result<Self, EnigmaError> {
        if !permutation.is_derangement() {
            return Err(EnigmaError::ReflectorNotDerangement(name.to_string()));
        }
        Self::build(name, RotorKind::Reflector, permutation)
    }

    fn build(name: &str, kind: RotorKind, permutation: Permutation) -> Result<Self, EnigmaError> {
        if let Some(c) = permutation.foreign_symbol() {
            return Err(EnigmaError::NotInAlphabet(c));
        }
        Ok(Rotor {
            name: name.to_string(),
            kind,
            permutation,
        })
    }

    /// Returns my name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns my kind.
    pub fn kind(&self) -> &RotorKind {
        &self.kind
    }

    /// Returns my wiring at position 0.
    pub fn permutation(&self) -> &Permutation {
        &self.permutation
    }

    /// Returns my alphabet.
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        self.permutation.alphabet()
    }

    /// Returns the size of my alphabet.
    pub fn size(&self) -> usize {
        self.permutation.size()
    }

    /// True iff I have a ratchet and can move.
    pub fn rotates(&self) -> bool {
        matches!(self.kind, RotorKind::Moving { .. })
    }

    /// True iff I am a reflector.
    pub fn reflecting(&self) -> bool {
        matches!(self.kind, RotorKind::Reflector)
    }

    /// Returns my notch symbols, empty unless I rotate.
    pub fn notches(&self) -> Vec<char> {
        match &self.kind {
            RotorKind::Moving { notches } => notches
                .iter()
                .filter_map(|&i| self.alphabet().to_symbol(i).ok())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// True iff `state` puts me where the rotor to my left may advance.
    ///
    /// Compares the raw setting against the notches; the ring offset
    /// plays no part.
    pub fn at_notch(&self, state: &RotorState) -> bool {
        match &self.kind {
            RotorKind::Moving { notches } => notches.contains(&(state.setting % self.size())),
            _ => false,
        }
    }

    /// Advances `state` one position if I rotate; otherwise does nothing.
    pub fn advance(&self, state: &mut RotorState) {
        if self.rotates() {
            state.setting = (state.setting + 1) % self.size();
        }
    }

    /// Sets the position of `state` to `posn`.
    ///
    /// # Errors
    /// - [`EnigmaError::IndexOutOfRange`] if `posn >= size()`.
    /// - [`EnigmaError::ReflectorFixedPosition`] if I reflect and `posn != 0`.
    pub fn set(&self, state: &mut RotorState, posn: usize) -> Result<(), EnigmaError> {
        self.check_index(posn)?;
        if self.reflecting() && posn != 0 {
            return Err(EnigmaError::ReflectorFixedPosition(self.name.clone()));
        }
        state.setting = posn;
        Ok(())
    }

    /// Sets the position of `state` to the index of `symbol`.
    ///
    /// # Errors
    /// As [`set`](Self::set), plus [`EnigmaError::NotInAlphabet`].
    pub fn set_symbol(&self, state: &mut RotorState, symbol: char) -> Result<(), EnigmaError> {
        let posn = self.alphabet().to_index(symbol)?;
        self.set(state, posn)
    }

    /// Sets the ring offset of `state` to `ring`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::IndexOutOfRange`] if `ring >= size()`.
    pub fn set_ring(&self, state: &mut RotorState, ring: usize) -> Result<(), EnigmaError> {
        self.check_index(ring)?;
        state.ring = ring;
        Ok(())
    }

    /// Converts contact `p` entering from the right, under `state`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::IndexOutOfRange`] if `p >= size()`.
    pub fn convert_forward(&self, state: &RotorState, p: usize) -> Result<usize, EnigmaError> {
        self.convert(state, p, Pass::Forward)
    }

    /// Converts contact `e` entering from the left, under `state`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::IndexOutOfRange`] if `e >= size()`.
    pub fn convert_backward(&self, state: &RotorState, e: usize) -> Result<usize, EnigmaError> {
        self.convert(state, e, Pass::Backward)
    }

    /// Shifts the contact onto the wiring, substitutes, and shifts back.
    fn convert(&self, state: &RotorState, p: usize, pass: Pass) -> Result<usize, EnigmaError> {
        self.check_index(p)?;
        let offset = state.setting as i64 - state.ring as i64;
        let entry = p as i64 + offset;
        let shifted = match pass {
            Pass::Forward => self.permutation.permute_index(entry)?,
            Pass::Backward => self.permutation.invert_index(entry)?,
        };
        Ok(self.permutation.wrap(shifted as i64 - offset))
    }

    fn check_index(&self, index: usize) -> Result<(), EnigmaError> {
        if index < self.size() {
            Ok(())
        } else {
            Err(EnigmaError::IndexOutOfRange {
                index,
                size: self.size(),
            })
        }
    }
}

/// Arena of rotor templates addressed by [`RotorId`] or by name.
#[derive(Debug, Clone, Default)]
pub struct RotorCatalog {
    rotors: Vec<Rotor>,
    by_name: HashMap<String, RotorId>,
}

impl RotorCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `rotor` to the catalog.
    ///
    /// # Errors
    /// Returns [`EnigmaError::ConfigurationMismatch`] if a rotor with the
    /// same name is already present.
    pub fn insert(&mut self, rotor: Rotor) -> Result<RotorId, EnigmaError> {
        if self.by_name.contains_key(rotor.name()) {
            return Err(EnigmaError::ConfigurationMismatch(format!(
                "rotor {} described twice",
                rotor.name()
            )));
        }
        let id = RotorId(self.rotors.len());
        self.by_name.insert(rotor.name().to_string(), id);
        self.rotors.push(rotor);
        Ok(id)
    }

    /// Looks up a rotor by name.
    pub fn find(&self, name: &str) -> Option<RotorId> {
        self.by_name.get(name).copied()
    }

    /// Returns the rotor with the given id, or `None` if `id` was minted
    /// by another catalog and is out of range here.
    pub fn get(&self, id: RotorId) -> Option<&Rotor> {
        self.rotors.get(id.0)
    }

    /// Returns the rotor for an id this catalog handed out.
    ///
    /// Only machine code holding ids from [`insert`](Self::insert) or
    /// [`find`](Self::find) on this same catalog may call this.
    pub(crate) fn rotor(&self, id: RotorId) -> &Rotor {
        &self.rotors[id.0]
    }

    /// Returns the number of rotors.
    pub fn len(&self) -> usize {
        self.rotors.len()
    }

    /// True if the catalog holds no rotors.
    pub fn is_empty(&self) -> bool {
        self.rotors.is_empty()
    }

    /// Iterates the rotors in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Rotor> {
        self.rotors.iter()
    }
}
