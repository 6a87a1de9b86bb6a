//! End-to-end regression tests for the public API.
//!
//! Expected ciphertexts are historical test vectors for the Enigma I
//! (rotors I, II, III with the wide B reflector) and the four-rotor naval
//! machine (thin B reflector, Beta). Any change in output is a regression.
//!
//! Coverage:
//! - `config::read_machine` / `MachineConfig`
//! - `session::{Setting, process, process_into}`
//! - `Machine` conversion, stepping, ring offsets and plugboard
//! - `Alphabet`, `Permutation`, `Rotor` construction through the public API
//! - `EnigmaError` kinds surfaced to callers

use std::sync::Arc;

use enigmacrypt::session::{self, Setting};
use enigmacrypt::utils::grouping::{group, GROUP_SIZE};
use enigmacrypt::{config, Alphabet, EnigmaError, Machine, Permutation, Rotor};

const DEFAULT_CONF: &str = include_str!("fixtures/default.conf");
const M3_CONF: &str = include_str!("fixtures/m3.conf");
const HIAWATHA_IN: &str = include_str!("fixtures/hiawatha.in");
const HIAWATHA_OUT: &str = include_str!("fixtures/hiawatha.out");

/// Builds a machine from `conf` and applies `setting`.
fn configured(conf: &str, setting: &str) -> Machine {
    let mut machine = config::read_machine(conf).unwrap();
    Setting::parse(setting, machine.num_rotors())
        .unwrap()
        .apply(&mut machine)
        .unwrap();
    machine
}

// ═══════════════════════════════════════════════════════════════════════
// Historical vectors
// ═══════════════════════════════════════════════════════════════════════

/// Enigma I, rotors I-II-III at AAA, rings AAA: AAAAA -> BDZGO.
#[test]
fn m3_aaa_vector() {
    let mut machine = configured(M3_CONF, "* UKW-B I II III AAA");
    assert_eq!(machine.convert("AAAAA").unwrap(), "BDZGO");
    assert_eq!(machine.positions(), "AAF");
}

/// Same machine with ring settings BBB: AAAAA -> EWTYX.
#[test]
fn m3_ring_bbb_vector() {
    let mut machine = configured(M3_CONF, "* UKW-B I II III AAA BBB");
    assert_eq!(machine.convert("AAAAA").unwrap(), "EWTYX");
}

/// Naval four-rotor machine, first line of the Hiawatha message.
#[test]
fn naval_hiawatha_first_line() {
    let mut machine = configured(
        DEFAULT_CONF,
        "* B Beta III IV I AXLE (HQ) (EX) (IP) (TR) (BY)",
    );
    let cipher = machine.convert("FROMHISSHOULDERHIAWATHA").unwrap();
    assert_eq!(group(&cipher, GROUP_SIZE), "QVPQS OKOIL PUBKJ ZPISF XDW");
    assert_eq!(machine.positions(), "AXMB");
}

/// Ring offsets change the ciphertext but not the stepping.
#[test]
fn naval_hiawatha_with_rings() {
    let mut machine = configured(
        DEFAULT_CONF,
        "* B Beta III IV I AXLE BCDE (HQ) (EX) (IP) (TR) (BY)",
    );
    assert_eq!(
        machine.convert("FROMHISSHOULDERHIAWATHA").unwrap(),
        "XYKXZBVAZLBASLIROQENPGM"
    );
    assert_eq!(machine.positions(), "AXMB");
    assert_eq!(machine.rings(), "BCDE");
}

/// Full message loop against the frozen expected output file.
#[test]
fn session_hiawatha_file() {
    let mut machine = config::read_machine(DEFAULT_CONF).unwrap();
    let out = session::process(&mut machine, HIAWATHA_IN).unwrap();
    assert_eq!(out, HIAWATHA_OUT);
}

/// Decoding the expected output restores the plaintext lines.
#[test]
fn session_hiawatha_decodes() {
    let mut machine = config::read_machine(DEFAULT_CONF).unwrap();
    let setting = HIAWATHA_IN.lines().next().unwrap();
    let out = session::process(&mut machine, &format!("{}\n{}", setting, HIAWATHA_OUT)).unwrap();
    let expected: Vec<String> = HIAWATHA_IN
        .lines()
        .skip(1)
        .map(|line| group(&line.split_whitespace().collect::<String>(), GROUP_SIZE))
        .collect();
    assert_eq!(out.lines().collect::<Vec<_>>(), expected);
}

// ═══════════════════════════════════════════════════════════════════════
// Self-inverse property
// ═══════════════════════════════════════════════════════════════════════

/// Two independently built, identically set machines undo each other.
#[test]
fn independent_machines_round_trip() {
    let setting = "* C Gamma VI VII VIII ZZZZ (AB)";
    let mut encoder = configured(DEFAULT_CONF, setting);
    let mut decoder = configured(DEFAULT_CONF, setting);
    let cipher = encoder.convert("HELLOWORLD").unwrap();
    assert_eq!(cipher, "PSZYGVCASQ");
    assert_eq!(decoder.convert(&cipher).unwrap(), "HELLOWORLD");
}

/// Plugboard, rings and a long message together.
#[test]
fn long_message_round_trip() {
    let setting = "* B Beta I II III AAAA AAAB (AZ)";
    let mut encoder = configured(DEFAULT_CONF, setting);
    let mut decoder = configured(DEFAULT_CONF, setting);
    assert_eq!(encoder.convert("HELLOWORLD").unwrap(), "AFEBMQKNGR");

    let plain: String = "THEQUICKBROWNFOXJUMPSOVERTHELAZYDOG".repeat(40);
    let mut encoder = configured(DEFAULT_CONF, setting);
    let cipher = encoder.convert(&plain).unwrap();
    assert_ne!(cipher, plain);
    assert_eq!(decoder.convert(&cipher).unwrap(), plain);
}

/// No symbol ever encodes to itself while the reflector is a derangement.
#[test]
fn no_symbol_encodes_to_itself() {
    let mut machine = configured(DEFAULT_CONF, "* B Beta III IV I AXLE (HQ) (EX)");
    let plain = "A".repeat(500);
    let cipher = machine.convert(&plain).unwrap();
    assert!(cipher.chars().all(|c| c != 'A'));
}

// ═══════════════════════════════════════════════════════════════════════
// Minimal machine built by hand
// ═══════════════════════════════════════════════════════════════════════

/// Reflector plus identity rotor: only the reflector acts.
#[test]
fn reflector_only_machine() {
    let alpha = Arc::new(Alphabet::new("ABCD").unwrap());
    let reflector =
        Rotor::reflector("R", Permutation::new(alpha.clone(), "(AB)(CD)").unwrap()).unwrap();
    assert!(reflector.reflecting());
    let fixed = Rotor::fixed("F", Permutation::identity(alpha.clone())).unwrap();
    let mut machine = Machine::new(alpha.clone(), 2, 0, vec![reflector, fixed]).unwrap();
    machine.insert_rotors(&["R", "F"]).unwrap();
    machine.set_rotor_positions("A").unwrap();
    machine
        .set_plugboard(Permutation::new(alpha, "").unwrap())
        .unwrap();
    assert_eq!(machine.convert("A").unwrap(), "B");
    assert_eq!(machine.convert("B").unwrap(), "A");
    assert_eq!(machine.convert_index(2).unwrap(), 3);
}

// ═══════════════════════════════════════════════════════════════════════
// Errors surfaced to callers
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn reflector_not_derangement() {
    let alpha = Arc::new(Alphabet::default());
    let perm = Permutation::new(alpha, "(AE) (BN)").unwrap();
    assert_eq!(
        Rotor::reflector("B", perm).unwrap_err(),
        EnigmaError::ReflectorNotDerangement("B".into())
    );
}

#[test]
fn non_reflector_in_first_slot() {
    let mut machine = config::read_machine(DEFAULT_CONF).unwrap();
    assert!(matches!(
        machine.insert_rotors(&["Beta", "B", "III", "IV", "I"]),
        Err(EnigmaError::StructuralViolation(_))
    ));
}

#[test]
fn repeated_rotor() {
    let mut machine = config::read_machine(DEFAULT_CONF).unwrap();
    assert!(matches!(
        machine.insert_rotors(&["B", "Beta", "III", "III", "I"]),
        Err(EnigmaError::StructuralViolation(_))
    ));
}

#[test]
fn unknown_rotor() {
    let mut machine = config::read_machine(DEFAULT_CONF).unwrap();
    assert_eq!(
        machine.insert_rotors(&["B", "Beta", "III", "IX", "I"]),
        Err(EnigmaError::UnknownRotor("IX".into()))
    );
}

#[test]
fn too_many_moving_rotors() {
    let mut machine = config::read_machine(DEFAULT_CONF).unwrap();
    assert!(matches!(
        machine.insert_rotors(&["B", "V", "III", "IV", "I"]),
        Err(EnigmaError::ConfigurationMismatch(_))
    ));
}

#[test]
fn setting_string_wrong_length() {
    let mut machine = config::read_machine(DEFAULT_CONF).unwrap();
    let setting = Setting::parse("* B Beta III IV I AXL", 5).unwrap();
    assert!(matches!(
        setting.apply(&mut machine),
        Err(EnigmaError::ConfigurationMismatch(_))
    ));
}

#[test]
fn plugboard_outside_alphabet() {
    let mut machine = config::read_machine(DEFAULT_CONF).unwrap();
    let setting = Setting::parse("* B Beta III IV I AXLE (HQ) (E5)", 5).unwrap();
    assert_eq!(
        setting.apply(&mut machine),
        Err(EnigmaError::PlugboardInvalid('5'))
    );
}

#[test]
fn lower_case_message_rejected() {
    let mut machine = config::read_machine(DEFAULT_CONF).unwrap();
    let input = "* B Beta III IV I AXLE (HQ) (EX) (IP) (TR) (BY)\nFROM his shoULDER Hiawatha\n";
    assert_eq!(
        session::process(&mut machine, input),
        Err(EnigmaError::NotInAlphabet('h'))
    );
}

/// Ids from one machine's catalog are not valid in another's.
#[test]
fn catalog_lookup_with_foreign_id() {
    let naval = config::read_machine(DEFAULT_CONF).unwrap();
    let m3 = config::read_machine(M3_CONF).unwrap();
    let foreign = naval.catalog().find("C").unwrap();
    assert!(m3.catalog().get(foreign).is_none());
    let own = m3.catalog().find("III").unwrap();
    assert_eq!(m3.catalog().get(own).map(Rotor::name), Some("III"));
}

/// A bad setting line keeps the messages converted before it.
#[test]
fn session_output_survives_later_bad_setting() {
    let mut machine = config::read_machine(M3_CONF).unwrap();
    let mut output = String::new();
    let input = "* UKW-B I II III AAA\nAAAAA\n* UKW-B I I III AAA\nAAAAA\n";
    assert!(matches!(
        session::process_into(&mut machine, input, &mut output),
        Err(EnigmaError::StructuralViolation(_))
    ));
    assert_eq!(output, "BDZGO\n");
}

/// Reserved symbols in a rotor type are a description error.
#[test]
fn reserved_symbol_in_rotor_type() {
    let text = M3_CONF.replace("I MQ", "I MQ)");
    assert!(matches!(
        config::read_machine(&text),
        Err(EnigmaError::MalformedConfig(_))
    ));
}

#[test]
fn error_messages_are_readable() {
    let mut machine = config::read_machine(DEFAULT_CONF).unwrap();
    let err = machine
        .insert_rotors(&["B", "Beta", "III", "IX", "I"])
        .unwrap_err();
    assert_eq!(err.to_string(), "unknown rotor IX");
}
