//! Test doubles shared by the unit tests: pins that record what they were told, a transport that replays a script and
//! elements that journal every call the surface makes on them.

use core::cell::{Cell, RefCell};
use std::{collections::VecDeque, string::String, vec::Vec};

use embedded_hal::digital::{self, ErrorKind, ErrorType, InputPin, OutputPin};
use wmidi::MidiMessage;

use crate::{
    classifier::{Category, InputEvent, MessageKind},
    element::{BankSelector, ControlElement, InputElement},
    transport::{Event, Transport},
};

/// The error returned by a pin constructed with [`RecordingPin::failing()`] or [`Button::failing()`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinFault;

impl digital::Error for PinFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Every level change of every [`RecordingPin`] attached to it, in order.
#[derive(Default)]
pub struct WireLog(RefCell<Vec<(&'static str, bool)>>);

/// What a shift register would have seen, decoded from a [`WireLog`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wire {
    LatchLow,
    /// Eight bits clocked in, the first one in the most significant position.
    Shifted(u8),
    LatchHigh,
}

impl WireLog {
    pub fn levels(&self) -> Vec<(&'static str, bool)> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Decode the log of a `"data"`, `"clock"` and `"latch"` pin trio. Data is sampled on each rising clock edge.
    pub fn transactions(&self) -> Vec<Wire> {
        let mut wire = Vec::new();
        let (mut data, mut clock) = (false, false);
        let (mut byte, mut bits) = (0u8, 0);
        for (pin, level) in self.levels() {
            match pin {
                "data" => data = level,
                "clock" => {
                    if level && !clock {
                        byte = (byte << 1) | u8::from(data);
                        bits += 1;
                        if bits == 8 {
                            wire.push(Wire::Shifted(byte));
                            (byte, bits) = (0, 0);
                        }
                    }
                    clock = level;
                }
                "latch" if level => wire.push(Wire::LatchHigh),
                "latch" => wire.push(Wire::LatchLow),
                _ => {}
            }
        }
        wire
    }
}

pub struct RecordingPin<'w> {
    name: &'static str,
    log: &'w WireLog,
    fail: bool,
}

impl<'w> RecordingPin<'w> {
    pub fn new(log: &'w WireLog, name: &'static str) -> Self {
        Self {
            name,
            log,
            fail: false,
        }
    }

    /// A pin whose every write fails. Nothing is recorded.
    pub fn failing(log: &'w WireLog, name: &'static str) -> Self {
        Self {
            name,
            log,
            fail: true,
        }
    }

    fn record(&mut self, level: bool) -> Result<(), PinFault> {
        if self.fail {
            return Err(PinFault);
        }
        self.log.0.borrow_mut().push((self.name, level));
        Ok(())
    }
}

impl ErrorType for RecordingPin<'_> {
    type Error = PinFault;
}

impl OutputPin for RecordingPin<'_> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.record(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.record(true)
    }
}

/// An input pin whose level is controlled by the test through a shared [`Cell`].
pub struct Button<'c> {
    level: &'c Cell<bool>,
    fail: bool,
}

impl<'c> Button<'c> {
    pub fn new(level: &'c Cell<bool>) -> Self {
        Self { level, fail: false }
    }

    pub fn failing(level: &'c Cell<bool>) -> Self {
        Self { level, fail: true }
    }
}

impl ErrorType for Button<'_> {
    type Error = PinFault;
}

impl InputPin for Button<'_> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        if self.fail {
            Err(PinFault)
        } else {
            Ok(self.level.get())
        }
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

std::thread_local! {
    static CONSTRUCTED: Cell<usize> = const { Cell::new(0) };
}

/// A transport which replays a fixed list of events and records everything sent through it.
pub struct ScriptedTransport {
    events: VecDeque<Event<'static>>,
    begun: usize,
    ignored: usize,
    sent: Vec<Vec<u8>>,
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        CONSTRUCTED.with(|count| count.set(count.get() + 1));
        Self {
            events: VecDeque::new(),
            begun: 0,
            ignored: 0,
            sent: Vec::new(),
        }
    }
}

impl ScriptedTransport {
    pub fn new(events: impl IntoIterator<Item = Event<'static>>) -> Self {
        let mut transport = Self::default();
        transport.events.extend(events);
        transport
    }

    /// How many instances have been constructed on this thread.
    pub fn constructed() -> usize {
        CONSTRUCTED.with(Cell::get)
    }

    pub fn push(&mut self, event: Event<'static>) {
        self.events.push_back(event);
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }

    pub fn begun(&self) -> usize {
        self.begun
    }

    pub fn ignored(&self) -> usize {
        self.ignored
    }

    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }
}

impl Transport for ScriptedTransport {
    fn begin(&mut self) {
        self.begun += 1;
    }

    fn read(&mut self) -> Event<'_> {
        self.events.pop_front().unwrap_or(Event::None)
    }

    fn ignore_input(&mut self) {
        self.ignored += 1;
        self.events.clear();
    }

    fn send(&mut self, message: &MidiMessage<'_>) {
        let mut bytes = [0u8; 3];
        let len = message.copy_to_slice(&mut bytes).unwrap();
        self.sent.push(bytes[..len].to_vec());
    }
}

/// A shared record of the calls made on [`Spy`]s, as `"name.call"`.
#[derive(Default)]
pub struct Journal(RefCell<Vec<String>>);

impl Journal {
    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    fn write(&self, name: &str, call: &str) {
        self.0.borrow_mut().push(std::format!("{name}.{call}"));
    }
}

/// An element of every kind which journals each call. As an input element it claims events of its category whose
/// identifier matches, or every event if it has no identifier.
pub struct Spy<'j> {
    journal: &'j Journal,
    name: &'static str,
    category: Category,
    identifier: Option<u8>,
    pub last: Option<InputEvent>,
}

impl<'j> Spy<'j> {
    fn new(journal: &'j Journal, name: &'static str, category: Category, identifier: Option<u8>) -> Self {
        Self {
            journal,
            name,
            category,
            identifier,
            last: None,
        }
    }

    pub fn note(journal: &'j Journal, name: &'static str, note: u8) -> Self {
        Self::new(journal, name, Category::Note, Some(note))
    }

    pub fn control_change(journal: &'j Journal, name: &'static str, controller: u8) -> Self {
        Self::new(journal, name, Category::ControlChange, Some(controller))
    }

    pub fn channel_pressure(journal: &'j Journal, name: &'static str) -> Self {
        Self::new(journal, name, Category::ChannelPressure, None)
    }

    /// A spy meant for the control and bank selector registries.
    pub fn output(journal: &'j Journal, name: &'static str) -> Self {
        Self::new(journal, name, Category::ControlChange, None)
    }
}

impl ControlElement for Spy<'_> {
    fn refresh(&mut self, _transport: &mut dyn Transport) {
        self.journal.write(self.name, "refresh");
    }
}

impl BankSelector for Spy<'_> {
    fn refresh(&mut self) {
        self.journal.write(self.name, "select");
    }
}

impl InputElement for Spy<'_> {
    fn category(&self) -> Category {
        self.category
    }

    fn update(&mut self, event: &InputEvent) -> bool {
        self.journal.write(self.name, "update");
        let claimed = event.category() == self.category
            && self
                .identifier
                .is_none_or(|identifier| identifier == u8::from(event.identifier));
        if claimed {
            self.last = Some(*event);
        }
        claimed
    }

    fn reset(&mut self) {
        self.journal.write(self.name, "reset");
    }

    fn refresh(&mut self) {
        self.journal.write(self.name, "refresh");
    }
}

/// Shorthand for a Note On or Note Off event on channel 1.
pub fn note_event(kind: MessageKind, note: u8, velocity: u8) -> InputEvent {
    InputEvent {
        kind,
        channel: wmidi::Channel::Ch1,
        identifier: wmidi::U7::from_u8_lossy(note),
        value: wmidi::U7::from_u8_lossy(velocity),
    }
}
