//! Rotor instances: a shared wiring plus the mutable position state.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::WiringCatalog;
use crate::error::{BitnigmaError, Result};
use crate::wiring::{index_letter, letter_index, RotorWiring};

/// Declarative description of one rotor slot.
///
/// This is what configurations are built from and what the state file
/// stores. `notches` is `None` when the wiring's default notches apply.
///
/// The textual form is `name[:ring[:notches[:position]]]`, where ring and
/// position are a letter or a decimal number and notches are letters
/// (`"ZM"`) or comma-separated numbers (`"12,25"`). An empty notch field
/// keeps the default; `-` overrides it with no notches at all.
///
/// ```
/// use bitnigma::RotorSetting;
///
/// let setting: RotorSetting = "enig1:B::Q".parse().unwrap();
/// assert_eq!(setting.name, "enig1");
/// assert_eq!(setting.ring, 1);
/// assert_eq!(setting.notches, None);
/// assert_eq!(setting.position, 16);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RotorSetting {
    /// Catalog short name of the wiring.
    pub name: String,
    /// Ring setting (Ringstellung).
    pub ring: usize,
    /// Notch override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notches: Option<Vec<usize>>,
    /// Current rotor position.
    pub position: usize,
}

impl RotorSetting {
    /// A setting with ring and position at 0 and default notches.
    pub fn new(name: impl Into<String>) -> Self {
        RotorSetting {
            name: name.into(),
            ring: 0,
            notches: None,
            position: 0,
        }
    }

    /// Sets the ring setting.
    pub fn ring(mut self, ring: usize) -> Self {
        self.ring = ring;
        self
    }

    /// Sets the start position.
    pub fn position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    /// Overrides the wiring's notches.
    pub fn notches(mut self, notches: Vec<usize>) -> Self {
        self.notches = Some(notches);
        self
    }

    /// Resolves the wiring in `catalog` and builds the live rotor.
    pub fn instantiate(&self, catalog: &WiringCatalog) -> Result<RotorInstance> {
        let wiring = catalog.rotor(&self.name)?;
        RotorInstance::new(wiring, self.ring, self.position, self.notches.clone())
    }
}

const NO_NOTCHES: &str = "-";

/// Parses a ring or position field: one letter or a decimal number.
fn parse_offset(input: &str, field: &str) -> Result<usize> {
    let mut chars = field.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => letter_index(c).ok_or_else(|| {
            BitnigmaError::InvalidSetting {
                input: input.to_string(),
                reason: format!("'{}' is not a letter", c),
            }
        }),
        _ => field.parse().map_err(|_| BitnigmaError::InvalidSetting {
            input: input.to_string(),
            reason: format!("'{}' is neither a letter nor a number", field),
        }),
    }
}

/// Parses a notch field: letters, comma-separated numbers or `-` for none.
fn parse_notches(input: &str, field: &str) -> Result<Vec<usize>> {
    if field == NO_NOTCHES {
        return Ok(Vec::new());
    }
    if field.chars().all(|c| c.is_ascii_alphabetic()) {
        return Ok(field.chars().filter_map(letter_index).collect());
    }
    field
        .split(',')
        .map(|n| {
            n.trim().parse().map_err(|_| BitnigmaError::InvalidSetting {
                input: input.to_string(),
                reason: format!("'{}' is not a notch", n),
            })
        })
        .collect()
}

impl FromStr for RotorSetting {
    type Err = BitnigmaError;

    fn from_str(s: &str) -> Result<Self> {
        let fields: Vec<&str> = s.split(':').collect();
        if fields.len() > 4 || fields[0].is_empty() {
            return Err(BitnigmaError::InvalidSetting {
                input: s.to_string(),
                reason: "expected name[:ring[:notches[:position]]]".to_string(),
            });
        }
        let mut setting = RotorSetting::new(fields[0]);
        if let Some(ring) = fields.get(1).filter(|f| !f.is_empty()) {
            setting.ring = parse_offset(s, ring)?;
        }
        if let Some(notches) = fields.get(2).filter(|f| !f.is_empty()) {
            setting.notches = Some(parse_notches(s, notches)?);
        }
        if let Some(position) = fields.get(3).filter(|f| !f.is_empty()) {
            setting.position = parse_offset(s, position)?;
        }
        Ok(setting)
    }
}

impl fmt::Display for RotorSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:", self.name, self.ring)?;
        match &self.notches {
            Some(notches) if notches.is_empty() => f.write_str(NO_NOTCHES)?,
            Some(notches) => {
                let list: Vec<String> = notches.iter().map(|n| n.to_string()).collect();
                f.write_str(&list.join(","))?;
            }
            None => {}
        }
        write!(f, ":{}", self.position)
    }
}

/// A rotor placed in a machine.
///
/// Wraps a shared [`RotorWiring`] with the rotor's position, ring setting and
/// effective notches. Only the position changes after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotorInstance {
    wiring: Arc<RotorWiring>,
    position: usize,
    ring: usize,
    notches: Vec<usize>,
    notch_override: bool,
}

impl RotorInstance {
    /// Places `wiring` at `position` with `ring` setting.
    ///
    /// # Errors
    /// - [`BitnigmaError::InvalidRotorSetting`] if ring or position are
    ///   outside the alphabet.
    /// - [`BitnigmaError::InvalidNotch`] if an override notch is outside the
    ///   alphabet.
    pub fn new(
        wiring: Arc<RotorWiring>,
        ring: usize,
        position: usize,
        notches: Option<Vec<usize>>,
    ) -> Result<Self> {
        let size = wiring.alphabet_size();
        for (field, value) in [("ring", ring), ("position", position)] {
            if value >= size {
                return Err(BitnigmaError::InvalidRotorSetting {
                    rotor: wiring.name().to_string(),
                    field,
                    value,
                    alphabet_size: size,
                });
            }
        }
        let notch_override = notches.is_some();
        let mut notches = notches.unwrap_or_else(|| wiring.notches().to_vec());
        if let Some(&notch) = notches.iter().find(|&&n| n >= size) {
            return Err(BitnigmaError::InvalidNotch {
                rotor: wiring.name().to_string(),
                notch,
                alphabet_size: size,
            });
        }
        notches.sort_unstable();
        notches.dedup();
        Ok(RotorInstance {
            wiring,
            position,
            ring,
            notches,
            notch_override,
        })
    }

    /// The shared wiring.
    pub fn wiring(&self) -> &Arc<RotorWiring> {
        &self.wiring
    }

    /// Short name of the wiring.
    pub fn name(&self) -> &str {
        self.wiring.name()
    }

    /// Current position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Ring setting.
    pub fn ring(&self) -> usize {
        self.ring
    }

    /// Effective notch positions, sorted.
    pub fn notches(&self) -> &[usize] {
        &self.notches
    }

    /// Number of contacts.
    pub fn alphabet_size(&self) -> usize {
        self.wiring.alphabet_size()
    }

    /// Current position as a letter, for 26-contact rotors.
    pub fn window_letter(&self) -> Option<char> {
        index_letter(self.position)
    }

    /// Returns true if the rotor sits at one of its notches.
    pub fn at_notch(&self) -> bool {
        self.notches.binary_search(&self.position).is_ok()
    }

    pub(crate) fn set_position(&mut self, position: usize) {
        self.position = position % self.alphabet_size();
    }

    /// Offset between the wiring core and the entry contacts.
    #[inline]
    fn shift(&self) -> usize {
        let n = self.alphabet_size();
        (self.position + n - self.ring) % n
    }

    /// Maps a contact from the entry side towards the reflector.
    #[inline]
    pub fn forward(&self, contact: usize) -> usize {
        let n = self.alphabet_size();
        let shift = self.shift();
        (self.wiring.forward((contact + shift) % n) + n - shift) % n
    }

    /// Maps a contact from the reflector side back towards the entry.
    #[inline]
    pub fn backward(&self, contact: usize) -> usize {
        let n = self.alphabet_size();
        let shift = self.shift();
        (self.wiring.backward((contact + shift) % n) + n - shift) % n
    }

    /// The declarative setting describing this rotor right now.
    pub fn setting(&self) -> RotorSetting {
        RotorSetting {
            name: self.name().to_string(),
            ring: self.ring,
            notches: self.notch_override.then(|| self.notches.clone()),
            position: self.position,
        }
    }
}
