//! Error types for the bitnigma library.

use std::path::PathBuf;

use thiserror::Error;

use crate::mode::Mode;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BitnigmaError>;

/// Errors produced by the bitnigma library.
///
/// Every structural problem (bad tables, bad notches, mode mismatches) is
/// reported while a configuration is being built. Enciphering itself never
/// fails.
#[derive(Debug, Error)]
pub enum BitnigmaError {
    /// A rotor or reflector table is not a permutation of the alphabet.
    #[error("invalid wiring '{name}': {reason}")]
    InvalidWiring {
        /// Short name of the offending table.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A reflector table is not an involution or has a forbidden fixed point.
    #[error("invalid reflector '{name}': {reason}")]
    InvalidReflector {
        /// Short name of the reflector.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A plugboard symbol was given more than one partner.
    #[error("plugboard symbol {symbol} is assigned more than once")]
    DuplicatePlugboardMapping {
        /// The symbol that appears twice.
        symbol: usize,
    },

    /// A symbol lies outside the alphabet of the configured mode.
    #[error("symbol {symbol} is outside an alphabet of size {alphabet_size}")]
    InvalidSymbol {
        /// The offending symbol.
        symbol: usize,
        /// Size of the alphabet.
        alphabet_size: usize,
    },

    /// A notch lies outside the alphabet.
    #[error("rotor '{rotor}' notch {notch} is outside an alphabet of size {alphabet_size}")]
    InvalidNotch {
        /// Short name of the rotor.
        rotor: String,
        /// The notch position.
        notch: usize,
        /// Size of the alphabet.
        alphabet_size: usize,
    },

    /// A ring setting or start position lies outside the alphabet.
    #[error("rotor '{rotor}' {field} {value} is outside an alphabet of size {alphabet_size}")]
    InvalidRotorSetting {
        /// Short name of the rotor.
        rotor: String,
        /// Either `ring` or `position`.
        field: &'static str,
        /// The rejected value.
        value: usize,
        /// Size of the alphabet.
        alphabet_size: usize,
    },

    /// A table's size does not match the configured mode.
    #[error("wiring '{name}' has {found} symbols but {mode} mode needs {expected}")]
    IncompatibleWiring {
        /// Short name of the table.
        name: String,
        /// Mode the configuration was built for.
        mode: Mode,
        /// Alphabet size the mode needs.
        expected: usize,
        /// Alphabet size of the table.
        found: usize,
    },

    /// No rotor with this short name exists in the catalog.
    #[error("'{0}' is not a valid rotor short-name")]
    UnknownRotor(String),

    /// No reflector with this short name exists in the catalog.
    #[error("'{0}' is not a valid reflector short-name")]
    UnknownReflector(String),

    /// A configuration was built without rotors or without a reflector.
    #[error("incomplete configuration: {reason}")]
    IncompleteConfiguration {
        /// What is missing.
        reason: String,
    },

    /// A textual rotor or plugboard setting could not be parsed.
    #[error("cannot parse setting '{input}': {reason}")]
    InvalidSetting {
        /// The text that was rejected.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The mode cannot encipher text through the string interface.
    #[error("{mode} mode does not operate on text")]
    TextUnsupported {
        /// The configured mode.
        mode: Mode,
    },

    /// A seed string was empty.
    #[error("seed must be at least 1 character long")]
    EmptySeed,

    /// The catalog lacks enough tables to derive a configuration.
    #[error("catalog has {available} {kind} for {mode} mode, need {needed}")]
    CatalogTooSmall {
        /// Mode being seeded.
        mode: Mode,
        /// `rotors` or `reflectors`.
        kind: &'static str,
        /// How many were found.
        available: usize,
        /// How many are needed.
        needed: usize,
    },

    /// Persisted state is malformed, invalid or from an unknown version.
    #[error("cannot parse machine state field '{field}': {reason}")]
    StateParse {
        /// Path of the offending field, e.g. `rotors[1].ring`.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Persisted state was saved from an aborted run.
    #[error("machine state at {path} was saved from an aborted run")]
    PartialState {
        /// The state file.
        path: PathBuf,
    },

    /// Reading or writing a state file failed.
    #[error("state file {path}: {source}")]
    StateIo {
        /// The state file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

impl BitnigmaError {
    /// Shorthand for a [`BitnigmaError::StateParse`] error.
    pub(crate) fn state_parse(field: impl Into<String>, reason: impl Into<String>) -> Self {
        BitnigmaError::StateParse {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
