//! The assembled cipher machine.
//!
//! A [`Machine`] owns its configuration exclusively. Each call to
//! [`Machine::encipher`] first steps the rotors and then sends the symbol
//! along the signal path:
//!
//! ```text
//! plugboard → rotors right-to-left → reflector → rotors left-to-right → plugboard
//! ```
//!
//! For a fixed rotor position the path is an involution, so a second
//! machine started from the same configuration deciphers what the first
//! enciphered.

use tracing::debug;

use crate::config::MachineConfiguration;
use crate::error::{BitnigmaError, Result};
use crate::mode::{Admission, ModeAdapter};
use crate::rotor::RotorInstance;
use crate::stepping::SteppingController;
use crate::store::MachineState;
use crate::stream::{ChunkStream, SymbolStream};

/// Rotor cipher machine.
///
/// # Examples
///
/// ```
/// use bitnigma::{ConfigBuilder, Machine, Mode, RotorSetting, WiringCatalog};
///
/// let catalog = WiringCatalog::historical().unwrap();
/// let config = ConfigBuilder::new(Mode::Classic)
///     .rotors(["enig1", "enig2", "enig3"].map(RotorSetting::new))
///     .reflector("ref-b")
///     .build(&catalog)
///     .unwrap();
///
/// let mut encoder = Machine::new(config.clone());
/// let mut decoder = Machine::new(config);
///
/// let ciphertext = encoder.encipher_str("AAAAA").unwrap();
/// assert_eq!(ciphertext, "BDZGO");
/// assert_eq!(decoder.encipher_str(&ciphertext).unwrap(), "AAAAA");
/// ```
#[derive(Debug, Clone)]
pub struct Machine {
    config: MachineConfiguration,
    adapter: ModeAdapter,
    controller: SteppingController,
    initial_positions: Vec<usize>,
}

impl Machine {
    /// Assembles a machine from a validated configuration.
    pub fn new(config: MachineConfiguration) -> Self {
        let adapter = ModeAdapter::new(config.mode());
        let initial_positions = config.positions();
        debug!(positions = ?initial_positions, "machine assembled");
        Machine {
            config,
            adapter,
            controller: SteppingController::new(),
            initial_positions,
        }
    }

    /// The machine's configuration, with current rotor positions.
    pub fn config(&self) -> &MachineConfiguration {
        &self.config
    }

    /// The mode adapter in front of the machine.
    pub fn adapter(&self) -> ModeAdapter {
        self.adapter
    }

    /// Current rotor positions, left to right.
    pub fn positions(&self) -> Vec<usize> {
        self.config.positions()
    }

    /// Current rotor positions as letters, for letter modes.
    pub fn window(&self) -> Option<String> {
        self.config
            .rotors()
            .iter()
            .map(RotorInstance::window_letter)
            .collect()
    }

    /// Moves the rotors to `positions` (left to right).
    ///
    /// # Errors
    /// - [`BitnigmaError::IncompleteConfiguration`] if the number of
    ///   positions differs from the number of rotors.
    /// - [`BitnigmaError::InvalidRotorSetting`] if a position is outside the
    ///   alphabet.
    pub fn set_positions(&mut self, positions: &[usize]) -> Result<()> {
        let size = self.config.mode().alphabet_size();
        if positions.len() != self.config.rotors().len() {
            return Err(BitnigmaError::IncompleteConfiguration {
                reason: format!(
                    "{} positions given for {} rotors",
                    positions.len(),
                    self.config.rotors().len()
                ),
            });
        }
        for (rotor, &position) in self.config.rotors().iter().zip(positions) {
            if position >= size {
                return Err(BitnigmaError::InvalidRotorSetting {
                    rotor: rotor.name().to_string(),
                    field: "position",
                    value: position,
                    alphabet_size: size,
                });
            }
        }
        for (rotor, &position) in self.config.rotors_mut().iter_mut().zip(positions) {
            rotor.set_position(position);
        }
        Ok(())
    }

    /// Returns the rotors to the positions the machine was assembled with
    /// and zeroes the symbol counter.
    pub fn reset(&mut self) {
        let initial = self.initial_positions.clone();
        for (rotor, position) in self.config.rotors_mut().iter_mut().zip(initial) {
            rotor.set_position(position);
        }
        self.controller.reset();
    }

    /// Number of symbols enciphered since assembly or the last reset.
    pub fn symbols_processed(&self) -> u64 {
        self.controller.steps()
    }

    /// Steps the rotors, then enciphers one alphabet symbol.
    ///
    /// `symbol` must be below the mode's alphabet size; the stream and
    /// chunk interfaces guarantee this through the mode adapter.
    pub fn encipher(&mut self, symbol: usize) -> usize {
        debug_assert!(
            symbol < self.config.mode().alphabet_size(),
            "symbol {} outside the alphabet",
            symbol
        );
        self.controller.advance(self.config.rotors_mut());
        self.transform(symbol)
    }

    /// Enciphers one symbol at the current rotor positions without stepping.
    pub fn transform(&self, symbol: usize) -> usize {
        debug_assert!(
            symbol < self.config.mode().alphabet_size(),
            "symbol {} outside the alphabet",
            symbol
        );
        let rotors = self.config.rotors();
        let plugboard = self.config.plugboard();

        let mut contact = plugboard.map(symbol);
        for rotor in rotors.iter().rev() {
            contact = rotor.forward(contact);
        }
        contact = self.config.reflector().reflect(contact);
        for rotor in rotors {
            contact = rotor.backward(contact);
        }
        plugboard.map(contact)
    }

    /// Runs one raw input byte through the mode adapter.
    ///
    /// Returns `None` when the mode drops the byte.
    pub fn process_byte(&mut self, byte: u8) -> Option<u8> {
        match self.adapter.admit(byte) {
            Admission::Encipher { symbol, case } => {
                let out = self.encipher(symbol);
                Some(self.adapter.emit(out, case))
            }
            Admission::Pass(byte) => Some(byte),
            Admission::Drop => None,
        }
    }

    /// Enciphers a chunk of raw bytes through the mode adapter.
    pub fn encipher_chunk(&mut self, chunk: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(chunk.len());
        out.extend(chunk.iter().filter_map(|&b| self.process_byte(b)));
        out
    }

    /// Enciphers text in a letter mode.
    ///
    /// # Errors
    /// Returns [`BitnigmaError::TextUnsupported`] in byte mode, whose output
    /// is not text.
    pub fn encipher_str(&mut self, text: &str) -> Result<String> {
        let mode = self.config.mode();
        if !mode.is_text() {
            return Err(BitnigmaError::TextUnsupported { mode });
        }
        let bytes = self.encipher_chunk(text.as_bytes());
        // Only ASCII letters are rewritten, always into ASCII letters, so
        // multi-byte sequences come through intact.
        String::from_utf8(bytes).map_err(|_| BitnigmaError::TextUnsupported { mode })
    }

    /// Lazily enciphers a byte sequence, one output byte at a time.
    pub fn stream<I>(&mut self, input: I) -> SymbolStream<'_, I::IntoIter>
    where
        I: IntoIterator<Item = u8>,
    {
        SymbolStream::new(self, input.into_iter())
    }

    /// Lazily enciphers a sequence of chunks, one output chunk per input
    /// chunk.
    pub fn chunks<I>(&mut self, input: I) -> ChunkStream<'_, I::IntoIter>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        ChunkStream::new(self, input.into_iter())
    }

    /// The persistable description of the machine right now.
    pub fn snapshot(&self) -> MachineState {
        self.config.to_state()
    }
}
