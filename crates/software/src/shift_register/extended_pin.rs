//! Provides [`ExtendedPin`], which drives one line of a [`ShiftRegisterOut`] as an [`OutputPin`].

use core::{cell::RefCell, fmt};

use embedded_hal::digital::{self, ErrorKind, ErrorType, OutputPin};

use super::ShiftRegisterOut;

/// Errors raised when driving an [`ExtendedPin`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExtendedPinError<E> {
    /// The shift register was already borrowed, i.e., the write was attempted from inside another write.
    Busy,
    /// One of the shift register's own pins failed.
    Pin(E),
}

impl<E: fmt::Debug> fmt::Display for ExtendedPinError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "shift register is already in use"),
            Self::Pin(error) => write!(f, "shift register pin failed: {error:?}"),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for ExtendedPinError<E> {}

impl<E: digital::Error> digital::Error for ExtendedPinError<E> {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Busy => ErrorKind::Other,
            Self::Pin(error) => error.kind(),
        }
    }
}

/// One line of a [`ShiftRegisterOut`], usable anywhere an [`OutputPin`] is expected.
///
/// Several pins can share a register by way of a [`RefCell`]. Every write goes through
/// [`set_line()`](ShiftRegisterOut::set_line), so it is flushed to the whole chain straight away.
pub struct ExtendedPin<'r, P: OutputPin, const BYTES: usize> {
    register: &'r RefCell<ShiftRegisterOut<P, BYTES>>,
    line: usize,
}

impl<'r, P: OutputPin, const BYTES: usize> ExtendedPin<'r, P, BYTES> {
    /// Construct a pin for `line` of `register`. Out-of-range lines are accepted; writing to them does nothing.
    pub fn new(register: &'r RefCell<ShiftRegisterOut<P, BYTES>>, line: usize) -> Self {
        Self { register, line }
    }

    /// The line this pin drives.
    pub fn line(&self) -> usize {
        self.line
    }

    fn write(&mut self, state: bool) -> Result<(), ExtendedPinError<P::Error>> {
        self.register
            .try_borrow_mut()
            .map_err(|_| ExtendedPinError::Busy)?
            .set_line(self.line, state)
            .map_err(ExtendedPinError::Pin)
    }
}

impl<P: OutputPin, const BYTES: usize> ErrorType for ExtendedPin<'_, P, BYTES> {
    type Error = ExtendedPinError<P::Error>;
}

impl<P: OutputPin, const BYTES: usize> OutputPin for ExtendedPin<'_, P, BYTES> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true)
    }
}
