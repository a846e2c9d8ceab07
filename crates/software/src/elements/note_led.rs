//! Provides [`NoteLed`], an LED that mirrors the state of one note.

use embedded_hal::digital::{OutputPin, PinState};
use wmidi::{Channel, U7};

use crate::{
    bank::Bank,
    classifier::{Category, InputEvent, MessageKind},
    element::InputElement,
};

/// An LED which lights while its note is held, e.g., to mirror the state of a DAW's mute or solo buttons.
///
/// When following a [`Bank`], the note it responds to is its base note plus the bank's offset.
pub struct NoteLed<'b, P: OutputPin> {
    pin: P,
    channel: Channel,
    note: U7,
    bank: Option<&'b Bank>,
    on: bool,
    shown: Option<bool>,
}

impl<'b, P: OutputPin> NoteLed<'b, P> {
    /// Construct a [`NoteLed`] for `note` on `channel`.
    pub fn new(pin: P, channel: Channel, note: U7) -> Self {
        Self {
            pin,
            channel,
            note,
            bank: None,
            on: false,
            shown: None,
        }
    }

    /// Construct a [`NoteLed`] whose note moves with `bank`.
    pub fn bankable(pin: P, channel: Channel, note: U7, bank: &'b Bank) -> Self {
        Self {
            bank: Some(bank),
            ..Self::new(pin, channel, note)
        }
    }

    /// Returns `true` if the note is held.
    pub fn is_on(&self) -> bool {
        self.on
    }

    fn address(&self) -> u16 {
        u16::from(u8::from(self.note)) + self.bank.map_or(0, Bank::offset)
    }
}

impl<P: OutputPin> InputElement for NoteLed<'_, P> {
    fn category(&self) -> Category {
        Category::Note
    }

    fn update(&mut self, event: &InputEvent) -> bool {
        if event.channel != self.channel || u16::from(u8::from(event.identifier)) != self.address() {
            return false;
        }
        self.on = event.kind == MessageKind::NoteOn && u8::from(event.value) > 0;
        true
    }

    fn reset(&mut self) {
        self.on = false;
    }

    fn refresh(&mut self) {
        if self.shown == Some(self.on) {
            return;
        }
        match self.pin.set_state(PinState::from(self.on)) {
            Ok(()) => self.shown = Some(self.on),
            Err(_) => error!("Failed to drive LED for note {}", self.address()),
        }
    }
}
