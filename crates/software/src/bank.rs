//! Banks let a small number of physical controls address a larger number of tracks.
//!
//! A [`Bank`] is shared by reference between the elements that follow it and the [`BankSelector`]s that change it,
//! so its setting lives in a [`Cell`].

use core::cell::Cell;

use embedded_hal::digital::InputPin;

use crate::element::BankSelector;

/// The currently selected bank out of `bank_count`, each `tracks_per_bank` addresses wide.
#[derive(Debug)]
pub struct Bank {
    setting: Cell<u8>,
    bank_count: u8,
    tracks_per_bank: u8,
}

impl Bank {
    /// Construct a [`Bank`] with the first bank selected. A `bank_count` of zero is treated as one.
    pub const fn new(bank_count: u8, tracks_per_bank: u8) -> Self {
        Self {
            setting: Cell::new(0),
            bank_count: if bank_count == 0 { 1 } else { bank_count },
            tracks_per_bank,
        }
    }

    /// The selected bank.
    pub fn setting(&self) -> u8 {
        self.setting.get()
    }

    /// The number of banks.
    pub fn bank_count(&self) -> u8 {
        self.bank_count
    }

    /// The distance between the addresses of a track in consecutive banks.
    pub fn tracks_per_bank(&self) -> u8 {
        self.tracks_per_bank
    }

    /// Select a bank. Settings out of range are ignored.
    pub fn select(&self, setting: u8) {
        if setting < self.bank_count {
            self.setting.set(setting);
        } else {
            warn!("Bank {} out of range, {} banks available", setting, self.bank_count);
        }
    }

    /// The amount to add to a base address to get the address in the selected bank.
    pub fn offset(&self) -> u16 {
        u16::from(self.setting()) * u16::from(self.tracks_per_bank)
    }

    /// Select the next bank, wrapping around to the first.
    pub fn increment(&self) {
        self.select((self.setting() + 1) % self.bank_count);
    }

    /// Select the previous bank, wrapping around to the last.
    pub fn decrement(&self) {
        self.select(self.setting().checked_sub(1).unwrap_or(self.bank_count - 1));
    }
}

/// Steps through the banks with a pair of momentary buttons, each pulling its pin low while pressed.
///
/// The bank changes once per press, when the button goes down.
pub struct IncrementDecrementSelector<'b, I: InputPin> {
    bank: &'b Bank,
    increment: I,
    decrement: I,
    pressed: (bool, bool),
}

impl<'b, I: InputPin> IncrementDecrementSelector<'b, I> {
    /// Construct a selector for `bank`.
    pub fn new(bank: &'b Bank, increment: I, decrement: I) -> Self {
        Self {
            bank,
            increment,
            decrement,
            pressed: (false, false),
        }
    }
}

fn is_pressed<I: InputPin>(pin: &mut I) -> bool {
    pin.is_low().unwrap_or_else(|_| {
        error!("Failed to read bank selector button");
        false
    })
}

impl<I: InputPin> BankSelector for IncrementDecrementSelector<'_, I> {
    fn refresh(&mut self) {
        let pressed = (is_pressed(&mut self.increment), is_pressed(&mut self.decrement));
        match (pressed, self.pressed) {
            ((true, false), (false, _)) => self.bank.increment(),
            ((false, true), (_, false)) => self.bank.decrement(),
            _ => {}
        }
        if pressed != self.pressed {
            debug!("Bank {} selected", self.bank.setting());
        }
        self.pressed = pressed;
    }
}
