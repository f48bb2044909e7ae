//! Registry of named rotor and reflector wirings.
//!
//! The catalog is plain immutable data: it is built once and handed by
//! reference to configuration builders and to seeded derivation. Tables are
//! shared behind [`Arc`] so that every rotor instance points at the same
//! validated wiring.
//!
//! [`WiringCatalog::historical`] contains the documented wirings of the
//! commercial, railway, Swiss K, Enigma I, M3 and M4 machines, plus a family
//! of 256-contact tables for byte mode generated from fixed seeds.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{BitnigmaError, Result};
use crate::mode::{FixedPointPolicy, BYTES};
use crate::random::mersenne_twister::MersenneTwister;
use crate::random::source::{shuffle, RandomSource};
use crate::wiring::{ReflectorWiring, RotorWiring};

/// (short name, wiring letters, notch letters)
///
/// The M4 Greek wheels (beta, gamma) are ordinary permutations, not
/// involutions, so they are listed as rotors without notches.
#[rustfmt::skip]
const LETTER_ROTORS: [(&str, &str, &str); 19] = [
    ("com1",   "DMTWSILRUYQNKFEJCAZBPGXOHV", "Q"),
    ("com2",   "HQZGPJTMOBLNCIFDYAWVEUSRKX", "E"),
    ("com3",   "UQNTLSZFMREHDPXKIBVYGJCWOA", "V"),
    ("rail1",  "JGDQOXUSCAMIFRVTPNEWKBLZYH", "Q"),
    ("rail2",  "NTZPSFBOKMWRCJDIVLAEYUXHGQ", "E"),
    ("rail3",  "JVIUBHTCDYAKEQZPOSGXNRMWFL", "V"),
    ("swiss1", "PEZUOHXSCVFMTBGLRINQJWAYDK", "Q"),
    ("swiss2", "ZOUESYDKFWPCIQXHMVBLGNJRAT", "E"),
    ("swiss3", "EHRVXGAOBQUSIMZFLYNWKTPDJC", "V"),
    ("enig1",  "EKMFLGDQVZNTOWYHXUSPAIBRCJ", "Q"),
    ("enig2",  "AJDKSIRUXBLHWTMCQGZNPYFVOE", "E"),
    ("enig3",  "BDFHJLCPRTXVZNYEIWGAKMUSQO", "V"),
    ("army4",  "ESOVPZJAYQUIRHXLNFTGKDCMWB", "J"),
    ("army5",  "VZBRGITYUPSDNHLXAWMJQOFECK", "Z"),
    ("navy6",  "JPGVOUMFYQBENHZRDKASXLICTW", "ZM"),
    ("navy7",  "NZJHGRCXMYSWBOUFAIVLPEKQDT", "ZM"),
    ("navy8",  "FKQHTLXOCBJSPDZRAMEWNIUYGV", "ZM"),
    ("beta",   "LEYJVCNIXWPBQMDRTAKZGFUHOS", ""),
    ("gamma",  "FSOKANUERHMBTIYCWLQPZXVGJD", ""),
];

/// (short name, wiring letters)
#[rustfmt::skip]
const LETTER_REFLECTORS: [(&str, &str); 7] = [
    ("rail-ref",  "QYHOGNECVPUZTFDJAXWMKISRBL"),
    ("swiss-ref", "IMETCGFRAYSQBZXWLHKDVUPOJN"),
    ("ref-a",     "EJMZALYXVBWFCRQUONTSPIKHGD"),
    ("ref-b",     "YRUHQSLDPXNGOKMIEBFZCWVJAT"),
    ("ref-c",     "FVPJIAOYEDRZXWGCTKUQSBNMHL"),
    ("ref-bt",    "ENKQAUYWJICOPBLMDXZVFTHRGS"),
    ("ref-ct",    "RDOBJNTKVEHMLFCWZAXGYIPSUQ"),
];

/// Number of generated byte-mode rotors.
const BYTE_ROTORS: usize = 5;

/// Number of generated byte-mode reflectors.
const BYTE_REFLECTORS: usize = 2;

/// Base seed of the generated byte-mode tables. Changing it changes every
/// byte-mode ciphertext ever produced, so it is frozen.
const BYTE_TABLE_SEED: u64 = 0x6269_746E_6967_6D61;

/// Immutable registry mapping short names to wirings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WiringCatalog {
    rotors: BTreeMap<String, Arc<RotorWiring>>,
    reflectors: BTreeMap<String, Arc<ReflectorWiring>>,
}

impl WiringCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the catalog of historical letter wirings and generated byte
    /// wirings.
    ///
    /// # Errors
    /// Only fails if a built-in table is malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitnigma::WiringCatalog;
    ///
    /// let catalog = WiringCatalog::historical().unwrap();
    /// assert!(catalog.rotor("enig1").is_ok());
    /// assert!(catalog.reflector("ref-b").is_ok());
    /// assert!(catalog.rotor("byte1").is_ok());
    /// ```
    pub fn historical() -> Result<Self> {
        let mut catalog = Self::new();
        for (name, wiring, notches) in LETTER_ROTORS {
            catalog.insert_rotor(RotorWiring::from_letters(name, wiring, notches)?);
        }
        for (name, wiring) in LETTER_REFLECTORS {
            catalog.insert_reflector(ReflectorWiring::from_letters(
                name,
                wiring,
                FixedPointPolicy::Forbid,
            )?);
        }
        for k in 0..BYTE_ROTORS {
            catalog.insert_rotor(generate_byte_rotor(k)?);
        }
        for k in 0..BYTE_REFLECTORS {
            catalog.insert_reflector(generate_byte_reflector(k)?);
        }
        debug!(
            rotors = catalog.rotors.len(),
            reflectors = catalog.reflectors.len(),
            "built historical wiring catalog"
        );
        Ok(catalog)
    }

    /// Adds a rotor wiring, replacing any wiring with the same name.
    pub fn insert_rotor(&mut self, wiring: RotorWiring) {
        self.rotors
            .insert(wiring.name().to_string(), Arc::new(wiring));
    }

    /// Adds a reflector wiring, replacing any wiring with the same name.
    pub fn insert_reflector(&mut self, wiring: ReflectorWiring) {
        self.reflectors
            .insert(wiring.name().to_string(), Arc::new(wiring));
    }

    /// Builder-style [`insert_rotor`](Self::insert_rotor).
    pub fn with_rotor(mut self, wiring: RotorWiring) -> Self {
        self.insert_rotor(wiring);
        self
    }

    /// Builder-style [`insert_reflector`](Self::insert_reflector).
    pub fn with_reflector(mut self, wiring: ReflectorWiring) -> Self {
        self.insert_reflector(wiring);
        self
    }

    /// Looks up a rotor wiring.
    ///
    /// # Errors
    /// Returns [`BitnigmaError::UnknownRotor`] if no rotor has this name.
    pub fn rotor(&self, name: &str) -> Result<Arc<RotorWiring>> {
        self.rotors
            .get(name)
            .cloned()
            .ok_or_else(|| BitnigmaError::UnknownRotor(name.to_string()))
    }

    /// Looks up a reflector wiring.
    ///
    /// # Errors
    /// Returns [`BitnigmaError::UnknownReflector`] if no reflector has this
    /// name.
    pub fn reflector(&self, name: &str) -> Result<Arc<ReflectorWiring>> {
        self.reflectors
            .get(name)
            .cloned()
            .ok_or_else(|| BitnigmaError::UnknownReflector(name.to_string()))
    }

    /// Names of the rotors with `alphabet_size` contacts, sorted.
    pub fn rotor_names(&self, alphabet_size: usize) -> Vec<&str> {
        self.rotors
            .values()
            .filter(|w| w.alphabet_size() == alphabet_size)
            .map(|w| w.name())
            .collect()
    }

    /// Names of the reflectors with `alphabet_size` contacts, sorted.
    pub fn reflector_names(&self, alphabet_size: usize) -> Vec<&str> {
        self.reflectors
            .values()
            .filter(|w| w.alphabet_size() == alphabet_size)
            .map(|w| w.name())
            .collect()
    }

    /// Total number of rotor wirings.
    pub fn num_rotors(&self) -> usize {
        self.rotors.len()
    }

    /// Total number of reflector wirings.
    pub fn num_reflectors(&self) -> usize {
        self.reflectors.len()
    }
}

/// Generates byte rotor `k` (named `byte{k+1}`) with a single notch.
fn generate_byte_rotor(k: usize) -> Result<RotorWiring> {
    let mut mt = MersenneTwister::with_seed(BYTE_TABLE_SEED.wrapping_add(k as u64));
    let mut table: Vec<usize> = (0..BYTES).collect();
    shuffle(&mut mt, &mut table);
    let notch = mt.next_below(BYTES);
    RotorWiring::new(format!("byte{}", k + 1), table, vec![notch], BYTES)
}

/// Generates byte reflector `k` by pairing off a shuffled alphabet.
///
/// Every contact is paired with a different one, so the result has no fixed
/// points.
fn generate_byte_reflector(k: usize) -> Result<ReflectorWiring> {
    let seed = BYTE_TABLE_SEED.wrapping_add((BYTE_ROTORS + k) as u64);
    let mut mt = MersenneTwister::with_seed(seed);
    let mut order: Vec<usize> = (0..BYTES).collect();
    shuffle(&mut mt, &mut order);
    let mut table = vec![0usize; BYTES];
    for pair in order.chunks_exact(2) {
        table[pair[0]] = pair[1];
        table[pair[1]] = pair[0];
    }
    let name = if k == 0 {
        "byte-ref".to_string()
    } else {
        format!("byte-ref{}", k + 1)
    };
    ReflectorWiring::new(name, table, BYTES, FixedPointPolicy::Forbid)
}
