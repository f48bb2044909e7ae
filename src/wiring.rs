//! Static substitution tables: rotor wirings, reflectors and the plugboard.
//!
//! All three are validated on construction and immutable afterwards. A
//! table over an alphabet of size N maps every symbol in `[0, N)` to another
//! symbol in `[0, N)`.

use crate::error::{BitnigmaError, Result};
use crate::mode::{FixedPointPolicy, LETTERS};

/// Converts an ASCII letter to its alphabet index (`A` = 0).
pub fn letter_index(letter: char) -> Option<usize> {
    if letter.is_ascii_alphabetic() {
        Some((letter.to_ascii_uppercase() as u8 - b'A') as usize)
    } else {
        None
    }
}

/// Converts an alphabet index below 26 to its uppercase letter.
pub fn index_letter(index: usize) -> Option<char> {
    if index < LETTERS {
        Some((b'A' + index as u8) as char)
    } else {
        None
    }
}

/// Parses a 26-letter wiring string into a table.
fn letters_to_table(name: &str, letters: &str) -> Result<Vec<usize>> {
    letters
        .chars()
        .map(|c| {
            letter_index(c).ok_or_else(|| BitnigmaError::InvalidWiring {
                name: name.to_string(),
                reason: format!("'{}' is not a letter", c),
            })
        })
        .collect()
}

/// Checks that `table` is a bijection on `[0, size)` and returns its inverse.
fn invert_permutation(name: &str, table: &[usize], size: usize) -> Result<Vec<usize>> {
    if table.len() != size {
        return Err(BitnigmaError::InvalidWiring {
            name: name.to_string(),
            reason: format!("table has {} entries, alphabet has {}", table.len(), size),
        });
    }
    let mut inverse = vec![usize::MAX; size];
    for (input, &output) in table.iter().enumerate() {
        if output >= size {
            return Err(BitnigmaError::InvalidWiring {
                name: name.to_string(),
                reason: format!("entry {} maps to {}, outside the alphabet", input, output),
            });
        }
        if inverse[output] != usize::MAX {
            return Err(BitnigmaError::InvalidWiring {
                name: name.to_string(),
                reason: format!(
                    "not a bijection: {} and {} both map to {}",
                    inverse[output], input, output
                ),
            });
        }
        inverse[output] = input;
    }
    Ok(inverse)
}

/// Wiring of a rotor: a permutation, its inverse and the default notches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotorWiring {
    name: String,
    forward: Vec<usize>,
    inverse: Vec<usize>,
    notches: Vec<usize>,
}

impl RotorWiring {
    /// Creates a rotor wiring over an alphabet of `alphabet_size` symbols.
    ///
    /// # Errors
    /// - [`BitnigmaError::InvalidWiring`] if `forward` has the wrong length
    ///   or is not a bijection.
    /// - [`BitnigmaError::InvalidNotch`] if a notch is outside the alphabet.
    pub fn new(
        name: impl Into<String>,
        forward: Vec<usize>,
        notches: Vec<usize>,
        alphabet_size: usize,
    ) -> Result<Self> {
        let name = name.into();
        let inverse = invert_permutation(&name, &forward, alphabet_size)?;
        if let Some(&notch) = notches.iter().find(|&&n| n >= alphabet_size) {
            return Err(BitnigmaError::InvalidNotch {
                rotor: name,
                notch,
                alphabet_size,
            });
        }
        let mut notches = notches;
        notches.sort_unstable();
        notches.dedup();
        Ok(RotorWiring {
            name,
            forward,
            inverse,
            notches,
        })
    }

    /// Creates a 26-symbol rotor from its letter string and notch letters.
    ///
    /// ```
    /// use bitnigma::wiring::RotorWiring;
    ///
    /// let rotor = RotorWiring::from_letters("enig3", "BDFHJLCPRTXVZNYEIWGAKMUSQO", "V").unwrap();
    /// assert_eq!(rotor.forward(0), 1);
    /// assert_eq!(rotor.notches(), &[21]);
    /// ```
    pub fn from_letters(name: impl Into<String>, wiring: &str, notches: &str) -> Result<Self> {
        let name = name.into();
        let table = letters_to_table(&name, wiring)?;
        let notches = letters_to_table(&name, notches)?;
        Self::new(name, table, notches, LETTERS)
    }

    /// Short name of the rotor.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of contacts on each face.
    pub fn alphabet_size(&self) -> usize {
        self.forward.len()
    }

    /// Default notch positions, sorted.
    pub fn notches(&self) -> &[usize] {
        &self.notches
    }

    /// Maps a contact through the wiring from the entry side.
    #[inline]
    pub fn forward(&self, contact: usize) -> usize {
        self.forward[contact]
    }

    /// Maps a contact back through the wiring from the reflector side.
    #[inline]
    pub fn backward(&self, contact: usize) -> usize {
        self.inverse[contact]
    }
}

/// Reflector wiring: an involution over the alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectorWiring {
    name: String,
    table: Vec<usize>,
}

impl ReflectorWiring {
    /// Creates a reflector over an alphabet of `alphabet_size` symbols.
    ///
    /// # Errors
    /// - [`BitnigmaError::InvalidWiring`] if the table has the wrong length
    ///   or maps outside the alphabet.
    /// - [`BitnigmaError::InvalidReflector`] if the table is not its own
    ///   inverse, or has a fixed point while `policy` forbids them.
    pub fn new(
        name: impl Into<String>,
        table: Vec<usize>,
        alphabet_size: usize,
        policy: FixedPointPolicy,
    ) -> Result<Self> {
        let name = name.into();
        if table.len() != alphabet_size {
            return Err(BitnigmaError::InvalidWiring {
                name,
                reason: format!(
                    "table has {} entries, alphabet has {}",
                    table.len(),
                    alphabet_size
                ),
            });
        }
        if let Some((input, output)) = table
            .iter()
            .enumerate()
            .find(|(_, &output)| output >= alphabet_size)
        {
            return Err(BitnigmaError::InvalidWiring {
                name,
                reason: format!("entry {} maps to {}, outside the alphabet", input, output),
            });
        }
        // An involution is necessarily a bijection.
        for (input, &output) in table.iter().enumerate() {
            if table[output] != input {
                return Err(BitnigmaError::InvalidReflector {
                    name,
                    reason: format!(
                        "not an involution: {} -> {} -> {}",
                        input, output, table[output]
                    ),
                });
            }
        }
        let reflector = ReflectorWiring { name, table };
        reflector.check_policy(policy)?;
        Ok(reflector)
    }

    /// Creates a 26-symbol reflector from its letter string.
    pub fn from_letters(
        name: impl Into<String>,
        wiring: &str,
        policy: FixedPointPolicy,
    ) -> Result<Self> {
        let name = name.into();
        let table = letters_to_table(&name, wiring)?;
        Self::new(name, table, LETTERS, policy)
    }

    /// Checks the wiring against a fixed-point policy.
    ///
    /// # Errors
    /// [`BitnigmaError::InvalidReflector`] if `policy` is
    /// [`FixedPointPolicy::Forbid`] and a symbol maps to itself.
    pub fn check_policy(&self, policy: FixedPointPolicy) -> Result<()> {
        if policy == FixedPointPolicy::Forbid {
            if let Some(symbol) = self.fixed_points().next() {
                return Err(BitnigmaError::InvalidReflector {
                    name: self.name.clone(),
                    reason: format!("symbol {} maps to itself", symbol),
                });
            }
        }
        Ok(())
    }

    /// Symbols the reflector maps onto themselves.
    pub fn fixed_points(&self) -> impl Iterator<Item = usize> + '_ {
        self.table
            .iter()
            .enumerate()
            .filter(|(input, &output)| *input == output)
            .map(|(input, _)| input)
    }

    /// Short name of the reflector.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of contacts.
    pub fn alphabet_size(&self) -> usize {
        self.table.len()
    }

    /// Reflects a contact.
    #[inline]
    pub fn reflect(&self, contact: usize) -> usize {
        self.table[contact]
    }
}

/// Plugboard: a partial involution swapping pairs of symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plugboard {
    table: Vec<usize>,
    pairs: Vec<(usize, usize)>,
}

impl Plugboard {
    /// A plugboard with no cables.
    pub fn identity(alphabet_size: usize) -> Self {
        Plugboard {
            table: (0..alphabet_size).collect(),
            pairs: Vec::new(),
        }
    }

    /// Creates a plugboard from symbol pairs.
    ///
    /// # Errors
    /// - [`BitnigmaError::InvalidSymbol`] if a symbol is outside the alphabet.
    /// - [`BitnigmaError::DuplicatePlugboardMapping`] if a symbol appears in
    ///   two pairs, or is paired with itself.
    pub fn new(pairs: &[(usize, usize)], alphabet_size: usize) -> Result<Self> {
        let mut board = Self::identity(alphabet_size);
        let mut used = vec![false; alphabet_size];
        for &(a, b) in pairs {
            for symbol in [a, b] {
                if symbol >= alphabet_size {
                    return Err(BitnigmaError::InvalidSymbol {
                        symbol,
                        alphabet_size,
                    });
                }
            }
            for symbol in [a, b] {
                if used[symbol] {
                    return Err(BitnigmaError::DuplicatePlugboardMapping { symbol });
                }
                used[symbol] = true;
            }
            board.table[a] = b;
            board.table[b] = a;
            board.pairs.push((a.min(b), a.max(b)));
        }
        board.pairs.sort_unstable();
        Ok(board)
    }

    /// Creates a 26-symbol plugboard from two-letter pairs such as `"AB"`.
    ///
    /// ```
    /// use bitnigma::wiring::Plugboard;
    ///
    /// let board = Plugboard::from_letter_pairs(&["AB", "cd"]).unwrap();
    /// assert_eq!(board.map(0), 1);
    /// assert_eq!(board.map(3), 2);
    /// assert_eq!(board.map(4), 4);
    /// ```
    pub fn from_letter_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<Self> {
        let parsed = pairs
            .iter()
            .map(|pair| parse_letter_pair(pair.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(&parsed, LETTERS)
    }

    /// Number of symbols the plugboard covers.
    pub fn alphabet_size(&self) -> usize {
        self.table.len()
    }

    /// Cabled pairs, each with the smaller symbol first, sorted.
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    /// Swaps a symbol with its partner, or returns it unchanged.
    #[inline]
    pub fn map(&self, symbol: usize) -> usize {
        self.table[symbol]
    }
}

/// Parses a two-letter plugboard pair.
pub fn parse_letter_pair(pair: &str) -> Result<(usize, usize)> {
    let letters: Vec<usize> = pair.chars().filter_map(letter_index).collect();
    if letters.len() != 2 || pair.chars().count() != 2 {
        return Err(BitnigmaError::InvalidSetting {
            input: pair.to_string(),
            reason: "plugboard pairs are two letters, e.g. AB".to_string(),
        });
    }
    Ok((letters[0], letters[1]))
}
