//! Provides [`CcValue`], which tracks the value of one controller.

use wmidi::{Channel, ControlFunction, U7};

use crate::{
    classifier::{Category, InputEvent},
    element::InputElement,
};

/// Remembers the last value received for one controller, e.g., to drive a VU meter or an LED ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CcValue {
    channel: Channel,
    controller: U7,
    value: U7,
}

impl CcValue {
    /// Construct a [`CcValue`] for `controller` on `channel`, starting at zero.
    pub fn new(channel: Channel, controller: ControlFunction) -> Self {
        Self {
            channel,
            controller: U7::from_u8_lossy(u8::from(controller)),
            value: U7::from_u8_lossy(0),
        }
    }

    /// The last value received.
    pub fn value(&self) -> U7 {
        self.value
    }
}

impl InputElement for CcValue {
    fn category(&self) -> Category {
        Category::ControlChange
    }

    fn update(&mut self, event: &InputEvent) -> bool {
        if event.channel != self.channel || event.identifier != self.controller {
            return false;
        }
        self.value = event.value;
        true
    }

    fn reset(&mut self) {
        self.value = U7::from_u8_lossy(0);
    }

    fn refresh(&mut self) {}
}
