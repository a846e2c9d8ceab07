//! Turns raw channel messages into something the surface can act on.
//!
//! [`classify()`] is a pure function: it looks at one [`ChannelMessage`] and decides whether it is a request to reset
//! a group of elements, an event for one category of input element, or something the surface doesn't handle.

use crate::transport::ChannelMessage;
use wmidi::{Channel, ControlFunction, U7};

const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;
const CONTROL_CHANGE: u8 = 0xB0;
const CHANNEL_PRESSURE: u8 = 0xD0;

/// The categories of input element. Each category has a registry of its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Category {
    /// Elements driven by Control Change messages.
    ControlChange,
    /// Elements driven by Note On and Note Off messages.
    Note,
    /// Elements driven by Channel Pressure (aftertouch) messages.
    ChannelPressure,
}

impl Category {
    /// Every category, in the order their registries are refreshed.
    pub const ALL: [Category; 3] = [
        Category::ControlChange,
        Category::Note,
        Category::ChannelPressure,
    ];
}

/// The kinds of channel message the surface routes to input elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageKind {
    /// Note Off (`0x8n`).
    NoteOff,
    /// Note On (`0x9n`).
    NoteOn,
    /// Control Change (`0xBn`).
    ControlChange,
    /// Channel Pressure (`0xDn`).
    ChannelPressure,
}

impl MessageKind {
    /// Map a message type (the high nibble of a status byte) to a [`MessageKind`], if the surface routes it.
    pub fn from_message_type(message_type: u8) -> Option<Self> {
        match message_type {
            NOTE_OFF => Some(Self::NoteOff),
            NOTE_ON => Some(Self::NoteOn),
            CONTROL_CHANGE => Some(Self::ControlChange),
            CHANNEL_PRESSURE => Some(Self::ChannelPressure),
            _ => None,
        }
    }

    /// The category of input element which receives messages of this kind.
    pub fn category(&self) -> Category {
        match self {
            Self::NoteOff | Self::NoteOn => Category::Note,
            Self::ControlChange => Category::ControlChange,
            Self::ChannelPressure => Category::ChannelPressure,
        }
    }
}

/// A channel message addressed to input elements.
///
/// Elements decide whether an event is theirs by looking at `channel` and `identifier`; the first one that claims it
/// is the only one that sees it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputEvent {
    /// What kind of message this was.
    pub kind: MessageKind,
    /// The channel the message arrived on.
    pub channel: Channel,
    /// The first data byte: the note number, the controller number, or (for Channel Pressure) the pressure.
    pub identifier: U7,
    /// The second data byte: the velocity or controller value. Channel Pressure carries a single data byte, so here
    /// `value` repeats `identifier`.
    pub value: U7,
}

impl InputEvent {
    /// The category of input element this event is routed to.
    pub fn category(&self) -> Category {
        self.kind.category()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for InputEvent {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "InputEvent {{ kind: {}, channel: {}, identifier: {}, value: {} }}",
            self.kind,
            self.channel.number(),
            u8::from(self.identifier),
            u8::from(self.value)
        );
    }
}

/// Channel Mode messages which return a group of input elements to their initial state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetKind {
    /// Control Change 121: resets Control Change and Channel Pressure elements.
    AllControllers,
    /// Control Change 123: resets Note elements.
    AllNotes,
}

impl ResetKind {
    /// The categories of input element affected by this reset.
    pub fn categories(&self) -> &'static [Category] {
        match self {
            Self::AllControllers => &[Category::ControlChange, Category::ChannelPressure],
            Self::AllNotes => &[Category::Note],
        }
    }
}

/// What the surface should do with a channel message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Reset every element in the affected categories; nothing is routed.
    Reset(ResetKind),
    /// Offer the event to the registry for its category.
    Route(InputEvent),
    /// The message isn't one the surface handles.
    Ignored,
}

/// Decide what to do with a channel message.
///
/// Reset All Controllers and All Notes Off take precedence over routing, regardless of channel, and are recognised by
/// the controller number alone. Otherwise, data bytes with the high bit set can't occur in a well-formed message, so
/// such messages are ignored along with every message type the surface doesn't route.
pub fn classify(message: &ChannelMessage) -> Action {
    let Some(kind) = MessageKind::from_message_type(message.message_type()) else {
        return Action::Ignored;
    };
    if kind == MessageKind::ControlChange {
        if is_function(message.data1, ControlFunction::RESET_ALL_CONTROLLERS) {
            return Action::Reset(ResetKind::AllControllers);
        }
        if is_function(message.data1, ControlFunction::ALL_NOTES_OFF) {
            return Action::Reset(ResetKind::AllNotes);
        }
    }
    let (Ok(channel), Ok(identifier), Ok(data2)) = (
        Channel::from_index(message.channel_index()),
        U7::try_from(message.data1),
        U7::try_from(message.data2),
    ) else {
        return Action::Ignored;
    };

    let value = match kind {
        MessageKind::ChannelPressure => identifier,
        _ => data2,
    };
    Action::Route(InputEvent {
        kind,
        channel,
        identifier,
        value,
    })
}

fn is_function(controller: u8, function: ControlFunction) -> bool {
    controller == u8::from(function)
}
