//! Persisted machine state and seeded configuration derivation.
//!
//! State is stored as a CBOR document:
//!
//! ```text
//! { version, mode, rotors: [{ name, ring, notches?, position }],
//!   reflector, plugboard: [[a, b]], reflector_policy?, partial }
//! ```
//!
//! Loading validates every field against the catalog and reports the first
//! bad one by path (`rotors[1].ring`, `plugboard[0]`), so a broken file
//! never produces a machine.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::WiringCatalog;
use crate::config::{ConfigBuilder, MachineConfiguration};
use crate::error::{BitnigmaError, Result};
use crate::machine::Machine;
use crate::mode::{FixedPointPolicy, Mode};
use crate::random::seed_key::SeedKey;
use crate::random::source::{take_one, RandomSource};
use crate::rotor::{RotorInstance, RotorSetting};
use crate::stream::RunOutcome;
use crate::wiring::Plugboard;

/// Version written into every state document.
pub const FORMAT_VERSION: u16 = 1;

/// Number of rotors a seeded configuration gets.
pub const SEEDED_ROTORS: usize = 3;

/// Upper bound on seeded plugboard pairs in byte mode.
pub const MAX_SEEDED_PAIRS: usize = 64;

/// Serializable description of a machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineState {
    /// Format version, [`FORMAT_VERSION`] when written by this library.
    pub version: u16,
    /// Operating mode.
    pub mode: Mode,
    /// Rotor settings, left to right.
    pub rotors: Vec<RotorSetting>,
    /// Reflector short name.
    pub reflector: String,
    /// Plugboard pairs.
    pub plugboard: Vec<(usize, usize)>,
    /// Reflector policy, when it differs from the mode's default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflector_policy: Option<FixedPointPolicy>,
    /// Set when the state was saved from an aborted run.
    #[serde(default)]
    pub partial: bool,
}

impl MachineState {
    /// A complete (non-partial) state in the current format.
    pub fn new(
        mode: Mode,
        rotors: Vec<RotorSetting>,
        reflector: String,
        plugboard: Vec<(usize, usize)>,
    ) -> Self {
        MachineState {
            version: FORMAT_VERSION,
            mode,
            rotors,
            reflector,
            plugboard,
            reflector_policy: None,
            partial: false,
        }
    }

    /// Returns true if the state was saved from an aborted run.
    pub fn is_partial(&self) -> bool {
        self.partial
    }

    /// Validates the state against `catalog` and builds the configuration.
    ///
    /// # Errors
    /// [`BitnigmaError::StateParse`] naming the first invalid field.
    pub fn to_config(&self, catalog: &WiringCatalog) -> Result<MachineConfiguration> {
        if self.version != FORMAT_VERSION {
            return Err(BitnigmaError::state_parse(
                "version",
                format!("unsupported version {}", self.version),
            ));
        }
        if self.rotors.is_empty() {
            return Err(BitnigmaError::state_parse("rotors", "no rotors"));
        }
        let size = self.mode.alphabet_size();

        for (i, setting) in self.rotors.iter().enumerate() {
            let path = |name: &str| format!("rotors[{}].{}", i, name);
            let wiring = catalog
                .rotor(&setting.name)
                .map_err(|e| BitnigmaError::state_parse(path("name"), e.to_string()))?;
            if wiring.alphabet_size() != size {
                return Err(BitnigmaError::state_parse(
                    path("name"),
                    format!(
                        "wiring has {} symbols, {} mode needs {}",
                        wiring.alphabet_size(),
                        self.mode,
                        size
                    ),
                ));
            }
            RotorInstance::new(wiring, setting.ring, setting.position, setting.notches.clone())
                .map_err(|e| {
                    let name = match &e {
                        BitnigmaError::InvalidRotorSetting { field, .. } => *field,
                        _ => "notches",
                    };
                    BitnigmaError::state_parse(path(name), e.to_string())
                })?;
        }

        let reflector = catalog
            .reflector(&self.reflector)
            .map_err(|e| BitnigmaError::state_parse("reflector", e.to_string()))?;
        let policy = self
            .reflector_policy
            .unwrap_or_else(|| self.mode.default_reflector_policy());
        if reflector.alphabet_size() != size {
            return Err(BitnigmaError::state_parse(
                "reflector",
                format!("wiring has {} symbols", reflector.alphabet_size()),
            ));
        }
        reflector
            .check_policy(policy)
            .map_err(|e| BitnigmaError::state_parse("reflector", e.to_string()))?;

        let mut seen = HashSet::new();
        for (i, &(a, b)) in self.plugboard.iter().enumerate() {
            Plugboard::new(&[(a, b)], size).map_err(|e| {
                BitnigmaError::state_parse(format!("plugboard[{}]", i), e.to_string())
            })?;
            if !seen.insert(a) || !seen.insert(b) {
                return Err(BitnigmaError::state_parse(
                    format!("plugboard[{}]", i),
                    "symbol already plugged",
                ));
            }
        }

        ConfigBuilder::from_state(self).build(catalog)
    }
}

/// Serializes a state to CBOR.
pub fn encode(state: &MachineState) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(state, &mut bytes)
        .map_err(|e| BitnigmaError::state_parse("state", e.to_string()))?;
    Ok(bytes)
}

/// Deserializes a state from CBOR and checks its version.
///
/// Field contents are checked against a catalog by
/// [`MachineState::to_config`].
pub fn decode(bytes: &[u8]) -> Result<MachineState> {
    let state: MachineState = ciborium::de::from_reader(bytes)
        .map_err(|e| BitnigmaError::state_parse("state", e.to_string()))?;
    if state.version != FORMAT_VERSION {
        return Err(BitnigmaError::state_parse(
            "version",
            format!("unsupported version {}", state.version),
        ));
    }
    Ok(state)
}

/// Derives a configuration from `rng`.
///
/// Draws, in order: the plugboard pair count and pairs, then for each of
/// three distinct rotors (chosen from the name-sorted catalog entries for
/// the mode) its ring setting and start position, then the reflector.
///
/// # Errors
/// [`BitnigmaError::CatalogTooSmall`] if the catalog holds fewer than three
/// rotors or no usable reflector for `mode`.
pub fn derive(
    rng: &mut dyn RandomSource,
    mode: Mode,
    catalog: &WiringCatalog,
) -> Result<MachineConfiguration> {
    let size = mode.alphabet_size();
    let mut rotor_pool = catalog.rotor_names(size);
    if rotor_pool.len() < SEEDED_ROTORS {
        return Err(BitnigmaError::CatalogTooSmall {
            mode,
            kind: "rotors",
            available: rotor_pool.len(),
            needed: SEEDED_ROTORS,
        });
    }
    let policy = mode.default_reflector_policy();
    let reflectors: Vec<&str> = catalog
        .reflector_names(size)
        .into_iter()
        .filter(|name| {
            catalog
                .reflector(name)
                .is_ok_and(|r| r.check_policy(policy).is_ok())
        })
        .collect();
    if reflectors.is_empty() {
        return Err(BitnigmaError::CatalogTooSmall {
            mode,
            kind: "reflectors",
            available: 0,
            needed: 1,
        });
    }

    let mut builder = ConfigBuilder::new(mode);

    let max_pairs = (size / 2).min(MAX_SEEDED_PAIRS);
    let count = rng.next_in_range(0, max_pairs);
    let mut free: Vec<usize> = (0..size).collect();
    for _ in 0..count {
        if let (Some(a), Some(b)) = (take_one(rng, &mut free), take_one(rng, &mut free)) {
            builder = builder.plug(a, b);
        }
    }

    for _ in 0..SEEDED_ROTORS {
        if let Some(name) = take_one(rng, &mut rotor_pool) {
            let ring = rng.next_below(size);
            let position = rng.next_below(size);
            builder = builder.rotor(RotorSetting::new(name).ring(ring).position(position));
        }
    }

    let reflector = reflectors[rng.next_below(reflectors.len())];
    builder.reflector(reflector).build(catalog)
}

/// Derives a configuration from a seed string.
///
/// The same seed, mode and catalog always give the same configuration.
///
/// # Errors
/// [`BitnigmaError::EmptySeed`] for an empty seed, otherwise as [`derive`].
///
/// ```
/// use bitnigma::{store, Mode, WiringCatalog};
///
/// let catalog = WiringCatalog::historical().unwrap();
/// let a = store::seed("TEST", Mode::Classic, &catalog).unwrap();
/// let b = store::seed("TEST", Mode::Classic, &catalog).unwrap();
/// assert_eq!(a, b);
/// ```
pub fn seed(seed: &str, mode: Mode, catalog: &WiringCatalog) -> Result<MachineConfiguration> {
    let mut rng = SeedKey::new(seed)?.generator();
    let config = derive(&mut rng, mode, catalog)?;
    debug!(
        %mode,
        rotors = ?config.rotors().iter().map(|r| r.name()).collect::<Vec<_>>(),
        reflector = config.reflector().name(),
        "configuration seeded"
    );
    Ok(config)
}

/// What [`StateStore::update`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveReport {
    /// Final state written.
    Saved,
    /// State written with the partial flag set.
    SavedPartial,
    /// Nothing written.
    Skipped,
}

/// Handling of aborted runs in [`StateStore::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PartialSave {
    /// Leave the file untouched.
    #[default]
    Skip,
    /// Write the state flagged as partial.
    Flagged,
}

/// Loads and saves machine state files, resolving names in a catalog.
#[derive(Debug, Clone, Copy)]
pub struct StateStore<'a> {
    catalog: &'a WiringCatalog,
    partial_save: PartialSave,
}

impl<'a> StateStore<'a> {
    /// A store that resolves names in `catalog` and skips aborted saves.
    pub fn new(catalog: &'a WiringCatalog) -> Self {
        StateStore {
            catalog,
            partial_save: PartialSave::Skip,
        }
    }

    /// Sets how [`update`](Self::update) treats aborted runs.
    pub fn with_partial_save(mut self, partial_save: PartialSave) -> Self {
        self.partial_save = partial_save;
        self
    }

    /// The catalog names are resolved in.
    pub fn catalog(&self) -> &'a WiringCatalog {
        self.catalog
    }

    /// Writes `config` to a new file.
    ///
    /// # Errors
    /// [`BitnigmaError::StateIo`] if the file already exists or cannot be
    /// written.
    pub fn create(&self, path: impl AsRef<Path>, config: &MachineConfiguration) -> Result<()> {
        let path = path.as_ref();
        let bytes = encode(&config.to_state())?;
        let io_err = |source| BitnigmaError::StateIo {
            path: path.to_path_buf(),
            source,
        };
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(io_err)?;
        file.write_all(&bytes).map_err(io_err)?;
        debug!(path = %path.display(), "machine state created");
        Ok(())
    }

    /// Reads a state file and builds its configuration.
    ///
    /// # Errors
    /// - [`BitnigmaError::StateIo`] if the file cannot be read.
    /// - [`BitnigmaError::StateParse`] if it is malformed or invalid.
    /// - [`BitnigmaError::PartialState`] if it was saved from an aborted run.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<MachineConfiguration> {
        let path = path.as_ref();
        let state = self.read(path)?;
        if state.partial {
            return Err(BitnigmaError::PartialState {
                path: path.to_path_buf(),
            });
        }
        self.resolve(path, &state)
    }

    /// Like [`load`](Self::load) but accepts states flagged as partial.
    pub fn load_partial(&self, path: impl AsRef<Path>) -> Result<MachineConfiguration> {
        let path = path.as_ref();
        let state = self.read(path)?;
        if state.partial {
            warn!(path = %path.display(), "loading partial machine state");
        }
        self.resolve(path, &state)
    }

    /// Overwrites the state file with `machine`'s current positions.
    ///
    /// The file is rewritten in place, not atomically: a crash mid-write can
    /// leave it truncated.
    ///
    /// # Errors
    /// [`BitnigmaError::StateIo`] if the file cannot be written.
    pub fn update(
        &self,
        path: impl AsRef<Path>,
        machine: &Machine,
        outcome: RunOutcome,
    ) -> Result<SaveReport> {
        let path = path.as_ref();
        let mut state = machine.snapshot();
        let report = match (outcome, self.partial_save) {
            (RunOutcome::Completed, _) => SaveReport::Saved,
            (RunOutcome::Aborted, PartialSave::Skip) => {
                warn!(path = %path.display(), "run aborted, machine state not saved");
                return Ok(SaveReport::Skipped);
            }
            (RunOutcome::Aborted, PartialSave::Flagged) => {
                warn!(path = %path.display(), "run aborted, saving partial machine state");
                state.partial = true;
                SaveReport::SavedPartial
            }
        };
        let bytes = encode(&state)?;
        fs::write(path, bytes).map_err(|source| BitnigmaError::StateIo {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            path = %path.display(),
            positions = ?machine.positions(),
            partial = state.partial,
            "machine state saved"
        );
        Ok(report)
    }

    /// Derives a configuration from a seed string; see [`seed`].
    pub fn seed(&self, seed_str: &str, mode: Mode) -> Result<MachineConfiguration> {
        seed(seed_str, mode, self.catalog)
    }

    fn read(&self, path: &Path) -> Result<MachineState> {
        let bytes = fs::read(path).map_err(|source| BitnigmaError::StateIo {
            path: path.to_path_buf(),
            source,
        })?;
        decode(&bytes)
    }

    fn resolve(&self, path: &Path, state: &MachineState) -> Result<MachineConfiguration> {
        let config = state.to_config(self.catalog)?;
        debug!(path = %path.display(), mode = %state.mode, "machine state loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::mersenne_twister::MersenneTwister;

    fn catalog() -> WiringCatalog {
        WiringCatalog::historical().unwrap()
    }

    fn state() -> MachineState {
        MachineState::new(
            Mode::Classic,
            vec![
                RotorSetting::new("enig1").ring(1).position(2),
                RotorSetting::new("enig2").notches(vec![4, 17]),
                RotorSetting::new("enig3").position(25),
            ],
            "ref-b".to_string(),
            vec![(0, 1), (5, 9)],
        )
    }

    #[test]
    fn test_cbor_round_trip() {
        let original = state();
        let decoded = decode(&encode(&original).unwrap()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode(b"not cbor at all").unwrap_err();
        assert!(matches!(err, BitnigmaError::StateParse { ref field, .. } if field == "state"));
    }

    #[test]
    fn test_decode_rejects_future_version() {
        let mut future = state();
        future.version = FORMAT_VERSION + 1;
        let err = decode(&encode(&future).unwrap()).unwrap_err();
        assert!(matches!(err, BitnigmaError::StateParse { ref field, .. } if field == "version"));
    }

    #[test]
    fn test_to_config_names_bad_field() {
        let cases: Vec<(fn(&mut MachineState), &str)> = vec![
            (|s| s.rotors[1].ring = 30, "rotors[1].ring"),
            (|s| s.rotors[2].position = 26, "rotors[2].position"),
            (|s| s.rotors[0].notches = Some(vec![99]), "rotors[0].notches"),
            (|s| s.rotors[0].name = "nope".into(), "rotors[0].name"),
            (|s| s.rotors[0].name = "byte1".into(), "rotors[0].name"),
            (|s| s.reflector = "byte-ref".into(), "reflector"),
            (|s| s.plugboard.push((1, 7)), "plugboard[2]"),
            (|s| s.plugboard.push((3, 40)), "plugboard[2]"),
            (|s| s.rotors.clear(), "rotors"),
        ];
        for (mutate, expected) in cases {
            let mut s = state();
            mutate(&mut s);
            match s.to_config(&catalog()) {
                Err(BitnigmaError::StateParse { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected StateParse at {}, got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn test_seed_is_deterministic() {
        let catalog = catalog();
        for mode in [Mode::Classic, Mode::Modern, Mode::Byte] {
            let a = seed("TEST", mode, &catalog).unwrap();
            let b = seed("TEST", mode, &catalog).unwrap();
            assert_eq!(a, b);
            assert_eq!(a.rotors().len(), SEEDED_ROTORS);
        }
        let a = seed("TEST", Mode::Classic, &catalog).unwrap();
        let b = seed("TEST2", Mode::Classic, &catalog).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_seeded_rotors_distinct_and_in_range() {
        let catalog = catalog();
        for i in 0..50 {
            let config = seed(&format!("seed-{}", i), Mode::Classic, &catalog).unwrap();
            let names: HashSet<&str> = config.rotors().iter().map(|r| r.name()).collect();
            assert_eq!(names.len(), 3);
            assert!(config.plugboard().pairs().len() <= 13);
            assert!(config.rotors().iter().all(|r| r.ring() < 26 && r.position() < 26));
        }
    }

    #[test]
    fn test_byte_seed_uses_byte_tables() {
        let config = seed("bytes", Mode::Byte, &catalog()).unwrap();
        assert!(config.rotors().iter().all(|r| r.name().starts_with("byte")));
        assert!(config.reflector().name().starts_with("byte"));
        assert!(config.plugboard().pairs().len() <= MAX_SEEDED_PAIRS);
    }

    #[test]
    fn test_empty_seed() {
        assert!(matches!(
            seed("", Mode::Classic, &catalog()),
            Err(BitnigmaError::EmptySeed)
        ));
    }

    #[test]
    fn test_catalog_too_small() {
        let mut rng = MersenneTwister::with_seed(1);
        let result = derive(&mut rng, Mode::Classic, &WiringCatalog::new());
        assert!(matches!(
            result,
            Err(BitnigmaError::CatalogTooSmall { kind: "rotors", .. })
        ));
    }

    #[test]
    fn test_derive_uses_given_source() {
        let catalog = catalog();
        let a = derive(&mut MersenneTwister::with_seed(7), Mode::Modern, &catalog).unwrap();
        let b = derive(&mut MersenneTwister::with_seed(7), Mode::Modern, &catalog).unwrap();
        assert_eq!(a, b);
    }
}
