//! Provides [`CcButton`], a momentary button which sends Control Change messages.

use embedded_hal::digital::InputPin;
use wmidi::{Channel, ControlFunction, MidiMessage, U7};

use crate::{element::ControlElement, transport::Transport};

const PRESSED: u8 = 127;
const RELEASED: u8 = 0;

/// A momentary button which pulls its pin low while pressed and sends a Control Change on every press and release:
/// 127 when it goes down, 0 when it comes back up.
pub struct CcButton<I: InputPin> {
    pin: I,
    channel: Channel,
    controller: ControlFunction,
    pressed: bool,
}

impl<I: InputPin> CcButton<I> {
    /// Construct a [`CcButton`] for `controller` on `channel`.
    pub fn new(pin: I, channel: Channel, controller: ControlFunction) -> Self {
        Self {
            pin,
            channel,
            controller,
            pressed: false,
        }
    }

    /// Returns `true` if the button was down the last time it was refreshed.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }
}

impl<I: InputPin> ControlElement for CcButton<I> {
    fn refresh(&mut self, transport: &mut dyn Transport) {
        let pressed = match self.pin.is_low() {
            Ok(pressed) => pressed,
            Err(_) => {
                error!("Failed to read button for controller {}", u8::from(self.controller));
                return;
            }
        };
        if pressed == self.pressed {
            return;
        }
        self.pressed = pressed;
        let value = U7::from_u8_lossy(if pressed { PRESSED } else { RELEASED });
        transport.send(&MidiMessage::ControlChange(self.channel, self.controller, value));
    }
}
