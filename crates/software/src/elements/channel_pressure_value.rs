//! Provides [`ChannelPressureValue`], which tracks the aftertouch on one channel.

use wmidi::{Channel, U7};

use crate::{
    classifier::{Category, InputEvent},
    element::InputElement,
};

/// Remembers the last Channel Pressure (aftertouch) received on one channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelPressureValue {
    channel: Channel,
    pressure: U7,
}

impl ChannelPressureValue {
    /// Construct a [`ChannelPressureValue`] for `channel`, starting at zero.
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            pressure: U7::from_u8_lossy(0),
        }
    }

    /// The last pressure received.
    pub fn pressure(&self) -> U7 {
        self.pressure
    }
}

impl InputElement for ChannelPressureValue {
    fn category(&self) -> Category {
        Category::ChannelPressure
    }

    fn update(&mut self, event: &InputEvent) -> bool {
        if event.channel != self.channel {
            return false;
        }
        self.pressure = event.value;
        true
    }

    fn reset(&mut self) {
        self.pressure = U7::from_u8_lossy(0);
    }

    fn refresh(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        classifier::{classify, Action},
        transport::ChannelMessage,
    };

    fn pressure_event(status: u8, pressure: u8) -> InputEvent {
        match classify(&ChannelMessage::new(status, pressure, 0)) {
            Action::Route(event) => event,
            action => panic!("Expected a routed event, got {action:?}"),
        }
    }

    #[test]
    fn claims_any_pressure_on_its_channel() {
        let mut aftertouch = ChannelPressureValue::new(Channel::Ch10);
        assert!(aftertouch.update(&pressure_event(0xD9, 42)));
        assert_eq!(42, u8::from(aftertouch.pressure()), "Expected left but got right");
        assert!(!aftertouch.update(&pressure_event(0xD0, 99)));
        assert_eq!(42, u8::from(aftertouch.pressure()), "Expected left but got right");

        aftertouch.reset();
        assert_eq!(0, u8::from(aftertouch.pressure()), "Expected left but got right");
    }
}
