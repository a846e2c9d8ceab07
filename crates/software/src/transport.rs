//! The link between the control surface and the outside world.
//!
//! A [`Transport`] delivers framed MIDI to the surface one [`Event`] at a time and carries the messages elements emit
//! back out. Framing is the transport's business; the surface only ever sees whole channel messages or whole
//! System Exclusive messages.

use wmidi::MidiMessage;

mod usb;
pub use usb::*;

/// Status byte which opens a System Exclusive message.
pub const SYSEX_START: u8 = 0xF0;

/// Status byte which terminates a System Exclusive message.
pub const SYSEX_END: u8 = 0xF7;

/// A single three-byte channel message as it arrived on the wire.
///
/// Two-byte messages (Program Change, Channel Pressure) carry `0` in `data2`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelMessage {
    /// Message type in the high nibble, channel in the low nibble.
    pub status: u8,
    /// First data byte: note number, controller number, pressure, etc.
    pub data1: u8,
    /// Second data byte: velocity, controller value, etc.
    pub data2: u8,
}

impl ChannelMessage {
    /// Construct a [`ChannelMessage`] from its raw bytes.
    pub const fn new(status: u8, data1: u8, data2: u8) -> Self {
        Self {
            status,
            data1,
            data2,
        }
    }

    /// The message type, i.e., the high nibble of the status byte (`0x80`, `0x90`, `0xB0`, ...).
    pub const fn message_type(&self) -> u8 {
        self.status & 0xF0
    }

    /// The zero-based channel index, i.e., the low nibble of the status byte.
    pub const fn channel_index(&self) -> u8 {
        self.status & 0x0F
    }
}

/// The result of polling a [`Transport`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event<'a> {
    /// Nothing is waiting to be read.
    None,
    /// A complete channel message.
    ChannelMessage(ChannelMessage),
    /// A complete System Exclusive message, from [`SYSEX_START`] through [`SYSEX_END`] inclusive.
    SystemExclusive(&'a [u8]),
}

#[cfg(feature = "defmt")]
impl defmt::Format for Event<'_> {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Event::None => defmt::write!(fmt, "None"),
            Event::ChannelMessage(message) => defmt::write!(fmt, "ChannelMessage({})", message),
            Event::SystemExclusive(data) => defmt::write!(fmt, "SystemExclusive({:x})", data),
        }
    }
}

/// A MIDI interface the control surface can poll and emit through.
///
/// Reads never block: when nothing is available, [`read()`](Self::read) returns [`Event::None`] immediately.
/// Delivery is best effort in both directions; there is no acknowledgement or retry.
pub trait Transport {
    /// Prepare the interface for use. Called once, when the surface binds the transport.
    fn begin(&mut self);

    /// Return the next complete event, or [`Event::None`] if nothing is waiting.
    fn read(&mut self) -> Event<'_>;

    /// Discard whatever input is pending without interpreting it.
    ///
    /// Used in place of [`read()`](Self::read) when the surface has been configured not to process input, so the
    /// interface's buffers never back up.
    fn ignore_input(&mut self) {
        while !matches!(self.read(), Event::None) {}
    }

    /// Queue a message for transmission. Messages the interface can't carry are dropped.
    fn send(&mut self, message: &MidiMessage<'_>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_status_byte() {
        let message = ChannelMessage::new(0x9A, 60, 100);
        assert_eq!(0x90, message.message_type(), "Expected left but got right");
        assert_eq!(0x0A, message.channel_index(), "Expected left but got right");
    }

    struct Backlog {
        pending: usize,
        reads: usize,
    }

    impl Transport for Backlog {
        fn begin(&mut self) {}

        fn read(&mut self) -> Event<'_> {
            self.reads += 1;
            if self.pending == 0 {
                Event::None
            } else {
                self.pending -= 1;
                Event::ChannelMessage(ChannelMessage::new(0xB0, 1, 2))
            }
        }

        fn send(&mut self, _message: &MidiMessage<'_>) {}
    }

    #[test]
    fn default_ignore_input_drains_until_empty() {
        let mut transport = Backlog {
            pending: 3,
            reads: 0,
        };
        transport.ignore_input();
        assert_eq!(0, transport.pending, "Expected the backlog to be drained");
        assert_eq!(
            4, transport.reads,
            "Expected one read per pending event plus the empty read; expected left but got right"
        );
    }
}
