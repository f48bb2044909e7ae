//! Operating modes and the symbol adapter that sits in front of the machine.
//!
//! The mode is chosen once per configuration. It fixes the alphabet size the
//! tables must have and decides, byte by byte, whether a symbol is enciphered,
//! passed through untouched, or dropped.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BitnigmaError;

/// Size of the letter alphabet used by the text modes.
pub const LETTERS: usize = 26;

/// Size of the alphabet used by byte mode.
pub const BYTES: usize = 256;

/// Machine operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Letters only: lowercase is uppercased, everything else is removed.
    Classic,
    /// Letters are enciphered with their case kept, everything else passes.
    Modern,
    /// Every byte is enciphered through 256-symbol tables.
    Byte,
}

impl Mode {
    /// Number of symbols every table must cover in this mode.
    pub const fn alphabet_size(self) -> usize {
        match self {
            Mode::Classic | Mode::Modern => LETTERS,
            Mode::Byte => BYTES,
        }
    }

    /// Reflector fixed-point policy applied when the caller does not pick one.
    ///
    /// Electromechanical reflectors cannot wire a contact to itself, so the
    /// letter modes forbid fixed points. Byte mode has no physical
    /// counterpart and allows them.
    pub const fn default_reflector_policy(self) -> FixedPointPolicy {
        match self {
            Mode::Classic | Mode::Modern => FixedPointPolicy::Forbid,
            Mode::Byte => FixedPointPolicy::Allow,
        }
    }

    /// Returns true for the letter modes.
    pub const fn is_text(self) -> bool {
        !matches!(self, Mode::Byte)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Classic => "classic",
            Mode::Modern => "modern",
            Mode::Byte => "byte",
        };
        f.write_str(name)
    }
}

impl FromStr for Mode {
    type Err = BitnigmaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "classic" => Ok(Mode::Classic),
            "modern" => Ok(Mode::Modern),
            "byte" => Ok(Mode::Byte),
            _ => Err(BitnigmaError::InvalidSetting {
                input: s.to_string(),
                reason: "mode must be classic, modern or byte".to_string(),
            }),
        }
    }
}

/// Whether a reflector may map a symbol onto itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixedPointPolicy {
    /// Every symbol must be paired with a different symbol.
    Forbid,
    /// Self-mapped symbols are accepted.
    Allow,
}

/// Letter case of a text-mode input byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    /// `A`..`Z`.
    Upper,
    /// `a`..`z`.
    Lower,
}

/// Decision taken by the adapter for a single input byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Run `symbol` through the machine, then re-emit with `case`.
    Encipher {
        /// Alphabet index of the symbol.
        symbol: usize,
        /// Case to restore on output.
        case: Case,
    },
    /// Emit the byte unchanged; the rotors do not move.
    Pass(u8),
    /// Emit nothing; the rotors do not move.
    Drop,
}

/// Front-end filter translating raw bytes to alphabet symbols and back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeAdapter {
    mode: Mode,
}

impl ModeAdapter {
    /// Creates the adapter for `mode`.
    pub const fn new(mode: Mode) -> Self {
        ModeAdapter { mode }
    }

    /// The mode this adapter implements.
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Classifies one input byte.
    pub fn admit(&self, byte: u8) -> Admission {
        match self.mode {
            Mode::Byte => Admission::Encipher {
                symbol: byte as usize,
                case: Case::Upper,
            },
            Mode::Classic | Mode::Modern => match byte {
                b'A'..=b'Z' => Admission::Encipher {
                    symbol: (byte - b'A') as usize,
                    case: Case::Upper,
                },
                b'a'..=b'z' => Admission::Encipher {
                    symbol: (byte - b'a') as usize,
                    // Classic output is always uppercase.
                    case: if self.mode == Mode::Modern {
                        Case::Lower
                    } else {
                        Case::Upper
                    },
                },
                _ if self.mode == Mode::Modern => Admission::Pass(byte),
                _ => Admission::Drop,
            },
        }
    }

    /// Converts an enciphered symbol back to an output byte.
    pub fn emit(&self, symbol: usize, case: Case) -> u8 {
        match self.mode {
            Mode::Byte => symbol as u8,
            Mode::Classic | Mode::Modern => {
                let base = match case {
                    Case::Upper => b'A',
                    Case::Lower => b'a',
                };
                base + symbol as u8
            }
        }
    }
}

impl From<Mode> for ModeAdapter {
    fn from(mode: Mode) -> Self {
        ModeAdapter::new(mode)
    }
}
