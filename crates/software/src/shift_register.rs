//! A buffered driver for chains of serial-in, parallel-out shift registers such as the 74HC595.
//!
//! [`ShiftRegisterOut`] keeps the desired state of every output line in memory and only touches the wire when it is
//! flushed. Each line write flushes immediately, so a single write is visible on the outputs by the time the call
//! returns, but the whole chain is always shifted out in a single latched transaction.

use embedded_hal::digital::{OutputPin, PinState};

mod extended_pin;
pub use extended_pin::*;

/// The order in which bits are shifted out.
///
/// The same flag also picks the order of the bytes: [`LsbFirst`](Self::LsbFirst) shifts the buffer from its first
/// byte to its last, [`MsbFirst`](Self::MsbFirst) from its last byte to its first. Either way, line 0 ends up on the
/// same output of the same register; what changes is which end of the chain is wired to the data pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    /// Least significant bit (and byte) first.
    LsbFirst,
    /// Most significant bit (and byte) first.
    MsbFirst,
}

const RED: usize = 0;
const GREEN: usize = 1;
const BLUE: usize = 2;

/// The line driving the red channel of RGB LED `id`, when RGB LEDs are wired to consecutive outputs.
pub const fn red(id: usize) -> usize {
    3 * id + RED
}

/// The line driving the green channel of RGB LED `id`. See [`red()`].
pub const fn green(id: usize) -> usize {
    3 * id + GREEN
}

/// The line driving the blue channel of RGB LED `id`. See [`red()`].
pub const fn blue(id: usize) -> usize {
    3 * id + BLUE
}

/// Shift one byte out by bit-banging `data` and `clock`: for each bit, set the data line, then pulse the clock.
pub fn shift_out<P: OutputPin>(data: &mut P, clock: &mut P, order: BitOrder, byte: u8) -> Result<(), P::Error> {
    for i in 0..8 {
        let shift = match order {
            BitOrder::LsbFirst => i,
            BitOrder::MsbFirst => 7 - i,
        };
        data.set_state(PinState::from((byte >> shift) & 1 == 1))?;
        clock.set_high()?;
        clock.set_low()?;
    }
    Ok(())
}

/// Drives up to `BYTES * 8` output lines through a chain of shift registers.
///
/// Lines are numbered from 0; line `n` is bit `n % 8` of buffer byte `n / 8`. Writes to lines past `line_count` are
/// ignored, which lets elements address a chain without checking how long it is.
pub struct ShiftRegisterOut<P: OutputPin, const BYTES: usize> {
    data: P,
    clock: P,
    latch: P,
    bit_order: BitOrder,
    line_count: usize,
    len: usize,
    buffer: [u8; BYTES],
}

impl<P: OutputPin, const BYTES: usize> ShiftRegisterOut<P, BYTES> {
    /// Construct a driver for `line_count` lines, all initially low in the buffer.
    ///
    /// Nothing is written to the wire until the first flush; call [`begin()`](Self::begin) to clear the registers.
    /// `line_count` is clamped to the `BYTES * 8` lines there is room for.
    pub fn new(data: P, clock: P, latch: P, bit_order: BitOrder, line_count: usize) -> Self {
        let capacity = BYTES * 8;
        let line_count = if line_count > capacity {
            warn!(
                "Shift register has room for {} lines, clamping {} to fit",
                capacity, line_count
            );
            capacity
        } else {
            line_count
        };
        Self {
            data,
            clock,
            latch,
            bit_order,
            line_count,
            len: line_count.div_ceil(8),
            buffer: [0; BYTES],
        }
    }

    /// Drive every line low.
    pub fn begin(&mut self) -> Result<(), P::Error> {
        self.reset()
    }

    /// The number of lines this driver addresses.
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// The order in which the buffer is shifted out.
    pub fn bit_order(&self) -> BitOrder {
        self.bit_order
    }

    /// The bytes shifted out on each flush, `ceil(line_count / 8)` of them.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    /// The last state requested for `line`, or `None` if it is out of range.
    pub fn line(&self, line: usize) -> Option<bool> {
        (line < self.line_count).then(|| self.buffer[line / 8] & (1 << (line % 8)) != 0)
    }

    /// Set `line` high or low, then flush. Lines out of range are ignored.
    pub fn set_line(&mut self, line: usize, state: impl Into<PinState>) -> Result<(), P::Error> {
        if line >= self.line_count {
            return Ok(());
        }
        let mask = 1 << (line % 8);
        match state.into() {
            PinState::High => self.buffer[line / 8] |= mask,
            PinState::Low => self.buffer[line / 8] &= !mask,
        }
        self.flush()
    }

    /// Shift the whole buffer out and latch it, making it visible on the outputs.
    pub fn flush(&mut self) -> Result<(), P::Error> {
        self.latch.set_low()?;
        let bytes = &self.buffer[..self.len];
        match self.bit_order {
            BitOrder::LsbFirst => {
                for &byte in bytes {
                    shift_out(&mut self.data, &mut self.clock, BitOrder::LsbFirst, byte)?;
                }
            }
            BitOrder::MsbFirst => {
                for &byte in bytes.iter().rev() {
                    shift_out(&mut self.data, &mut self.clock, BitOrder::MsbFirst, byte)?;
                }
            }
        }
        self.latch.set_high()
    }

    /// Clear the buffer and flush it, driving every line low.
    pub fn reset(&mut self) -> Result<(), P::Error> {
        self.buffer = [0; BYTES];
        self.flush()
    }
}
