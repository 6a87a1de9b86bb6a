//! Enigmacrypt: electromechanical rotor-cipher simulator.
//!
//! Reproduces the combinatorics of the Enigma family of machines: a stack
//! of wired rotors that steps between key presses, a reflector that sends
//! the signal back through the stack, and a plugboard applied before and
//! after. It is a historical mechanism, not a secure cipher.
//!
//! # Architecture
//!
//! ```text
//! Alphabet     (symbols <-> dense indices, shared as Arc)
//!     ↓
//! Permutation  (cycle notation, forward/inverse tables)
//!     ↓
//! Rotor        (fixed | moving | reflector template, RotorCatalog arena)
//!     ↓ RotorState per seated slot
//! Machine      (stepping with double step + plugboard pipeline)
//!     ↑
//! config / session  (machine description, setting lines, message loop)
//! ```
//!
//! # Examples
//!
//! Encode and decode with two identically configured machines:
//!
//! ```
//! use enigmacrypt::{config, session};
//!
//! const CONFIG: &str = "
//!     ABCDEFGHIJKLMNOPQRSTUVWXYZ 5 3
//!     I MQ      (AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)
//!     III MV    (ABDHPEJT) (CFLVMZOYQIRWUKXSG) (N)
//!     IV MJ     (AEPLIYWCOXMRFZBSTGJQNH) (DV) (KU)
//!     Beta N    (ALBEVFCYODJWUGNMQTZSKPR) (HIX)
//!     B R       (AE) (BN) (CK) (DQ) (FU) (GY) (HW) (IJ) (LO) (MP)
//!               (RX) (SZ) (TV)
//! ";
//! const SETTING: &str = "* B Beta III IV I AXLE (HQ) (EX) (IP) (TR) (BY)";
//!
//! let mut encoder = config::read_machine(CONFIG).unwrap();
//! let mut decoder = config::read_machine(CONFIG).unwrap();
//! session::Setting::parse(SETTING, 5).unwrap().apply(&mut encoder).unwrap();
//! session::Setting::parse(SETTING, 5).unwrap().apply(&mut decoder).unwrap();
//!
//! let cipher = encoder.convert("FROMHISSHOULDERHIAWATHA").unwrap();
//! assert_eq!(cipher, "QVPQSOKOILPUBKJZPISFXDW");
//! assert_eq!(decoder.convert(&cipher).unwrap(), "FROMHISSHOULDERHIAWATHA");
//! ```

#![deny(clippy::all)]

pub mod alphabet;
pub mod config;
pub mod error;
pub mod machine;
pub mod permutation;
pub mod rotor;
pub mod session;
pub mod utils;

pub use alphabet::Alphabet;
pub use error::EnigmaError;
pub use machine::Machine;
pub use permutation::Permutation;
pub use rotor::{Rotor, RotorCatalog, RotorId, RotorKind, RotorState};
