//! Lazy streaming over a machine.
//!
//! Both adapters borrow the machine mutably for as long as they live, pull
//! input only when output is requested and are single-pass. Once the input
//! runs dry the adapter remembers it, so a caller can tell a finished run
//! from one that was abandoned halfway through.

use std::iter::FusedIterator;

use crate::machine::Machine;

/// How a streaming run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The input was consumed to its end.
    Completed,
    /// Output stopped being pulled before the input ran out.
    Aborted,
}

/// Byte-at-a-time stream produced by [`Machine::stream`].
///
/// Bytes dropped by the mode adapter produce no output; the stream keeps
/// pulling input until it has a byte to return.
///
/// ```
/// use bitnigma::{ConfigBuilder, Machine, Mode, RotorSetting, RunOutcome, WiringCatalog};
///
/// let catalog = WiringCatalog::historical().unwrap();
/// let config = ConfigBuilder::new(Mode::Classic)
///     .rotors(["enig1", "enig2", "enig3"].map(RotorSetting::new))
///     .reflector("ref-b")
///     .build(&catalog)
///     .unwrap();
/// let mut machine = Machine::new(config);
///
/// let mut stream = machine.stream(b"aa aaa".iter().copied());
/// let out: Vec<u8> = stream.by_ref().collect();
/// assert_eq!(out, b"BDZGO");
/// assert_eq!(stream.outcome(), RunOutcome::Completed);
/// ```
#[derive(Debug)]
pub struct SymbolStream<'m, I> {
    machine: &'m mut Machine,
    input: I,
    exhausted: bool,
}

impl<'m, I> SymbolStream<'m, I>
where
    I: Iterator<Item = u8>,
{
    pub(crate) fn new(machine: &'m mut Machine, input: I) -> Self {
        SymbolStream {
            machine,
            input,
            exhausted: false,
        }
    }

    /// [`RunOutcome::Completed`] once the input has been drained.
    pub fn outcome(&self) -> RunOutcome {
        if self.exhausted {
            RunOutcome::Completed
        } else {
            RunOutcome::Aborted
        }
    }

    /// The machine being driven.
    pub fn machine(&self) -> &Machine {
        self.machine
    }
}

impl<I> Iterator for SymbolStream<'_, I>
where
    I: Iterator<Item = u8>,
{
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.exhausted {
            return None;
        }
        loop {
            let Some(byte) = self.input.next() else {
                self.exhausted = true;
                return None;
            };
            if let Some(out) = self.machine.process_byte(byte) {
                return Some(out);
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.exhausted {
            return (0, Some(0));
        }
        // Classic mode may drop every byte.
        (0, self.input.size_hint().1)
    }
}

impl<I> FusedIterator for SymbolStream<'_, I> where I: Iterator<Item = u8> {}

/// Chunk-at-a-time stream produced by [`Machine::chunks`].
///
/// Each input chunk yields exactly one output chunk, possibly shorter than
/// the input in classic mode.
#[derive(Debug)]
pub struct ChunkStream<'m, I> {
    machine: &'m mut Machine,
    input: I,
    exhausted: bool,
}

impl<'m, I> ChunkStream<'m, I>
where
    I: Iterator,
    I::Item: AsRef<[u8]>,
{
    pub(crate) fn new(machine: &'m mut Machine, input: I) -> Self {
        ChunkStream {
            machine,
            input,
            exhausted: false,
        }
    }

    /// [`RunOutcome::Completed`] once the input has been drained.
    pub fn outcome(&self) -> RunOutcome {
        if self.exhausted {
            RunOutcome::Completed
        } else {
            RunOutcome::Aborted
        }
    }

    /// The machine being driven.
    pub fn machine(&self) -> &Machine {
        self.machine
    }
}

impl<I> Iterator for ChunkStream<'_, I>
where
    I: Iterator,
    I::Item: AsRef<[u8]>,
{
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        if self.exhausted {
            return None;
        }
        match self.input.next() {
            Some(chunk) => Some(self.machine.encipher_chunk(chunk.as_ref())),
            None => {
                self.exhausted = true;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.exhausted {
            (0, Some(0))
        } else {
            self.input.size_hint()
        }
    }
}

impl<I> FusedIterator for ChunkStream<'_, I>
where
    I: Iterator,
    I::Item: AsRef<[u8]>,
{
}
