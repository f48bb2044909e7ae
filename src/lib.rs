//! Bitnigma rotor cipher machine.
//!
//! A configurable simulator of electromechanical rotor cipher machines:
//! historical letter wirings, the double-stepping anomaly, a plugboard, and
//! a 256-symbol byte mode for arbitrary binary data. Configurations can be
//! persisted between runs and derived deterministically from a seed string.
//!
//! # Architecture
//!
//! ```text
//! WiringCatalog  (immutable tables: rotors, reflectors)
//!     ↓ resolved by name
//! ConfigBuilder → MachineConfiguration  (validated once, before any symbol)
//!     ↓ owned by
//! Machine  (SteppingController + plugboard → rotors → reflector → rotors → plugboard)
//!     ↑ fed by
//! ModeAdapter / SymbolStream / ChunkStream
//!
//! StateStore  (CBOR state files, seeded derivation)
//! ```
//!
//! # Examples
//!
//! Encipher and decipher with rotors I, II, III and reflector B:
//!
//! ```
//! use bitnigma::{ConfigBuilder, Machine, Mode, RotorSetting, WiringCatalog};
//!
//! let catalog = WiringCatalog::historical().unwrap();
//! let config = ConfigBuilder::new(Mode::Classic)
//!     .rotors(["enig1", "enig2", "enig3"].map(RotorSetting::new))
//!     .reflector("ref-b")
//!     .build(&catalog)
//!     .unwrap();
//!
//! let mut encoder = Machine::new(config.clone());
//! let mut decoder = Machine::new(config);
//!
//! assert_eq!(encoder.encipher_str("AAAAA").unwrap(), "BDZGO");
//! assert_eq!(decoder.encipher_str("BDZGO").unwrap(), "AAAAA");
//! ```
//!
//! Derive a byte-mode machine from a seed:
//!
//! ```
//! use bitnigma::{store, Machine, Mode, WiringCatalog};
//!
//! let catalog = WiringCatalog::historical().unwrap();
//! let config = store::seed("correct horse", Mode::Byte, &catalog).unwrap();
//!
//! let mut encoder = Machine::new(config.clone());
//! let mut decoder = Machine::new(config);
//!
//! let data = [0u8, 1, 2, 254, 255];
//! let cipher = encoder.encipher_chunk(&data);
//! assert_eq!(decoder.encipher_chunk(&cipher), data);
//! ```

#![deny(clippy::all)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod machine;
pub mod mode;
pub mod random;
pub mod rotor;
pub mod stepping;
pub mod store;
pub mod stream;
pub mod wiring;

pub use catalog::WiringCatalog;
pub use config::{ConfigBuilder, MachineConfiguration};
pub use error::{BitnigmaError, Result};
pub use machine::Machine;
pub use mode::{FixedPointPolicy, Mode, ModeAdapter};
pub use rotor::{RotorInstance, RotorSetting};
pub use stepping::SteppingController;
pub use store::{MachineState, PartialSave, SaveReport, StateStore};
pub use stream::{ChunkStream, RunOutcome, SymbolStream};
pub use wiring::{Plugboard, ReflectorWiring, RotorWiring};
