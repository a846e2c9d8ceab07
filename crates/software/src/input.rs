//! The input stage of a cycle: how a transport event becomes a reset broadcast or an update for a single element.

use bitmask_enum::bitmask;
use enum_dispatch::enum_dispatch;

use crate::{
    classifier::{classify, Action, Category, InputEvent, ResetKind},
    element::InputElement,
    registry::{Registry, RegistryError, DEFAULT_CAPACITY},
    transport::{Event, Transport},
};

/// Operations that may be performed during the input stage of a cycle.
#[bitmask(u8)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Operation {
    /// Indicates a channel message was claimed by an input element.
    Routed,
    /// Indicates a channel message was routed to a registry but no element claimed it.
    Unclaimed,
    /// Indicates a group of input elements was reset.
    Reset,
    /// Indicates a System Exclusive message was read.
    SystemExclusive,
    /// Indicates a channel message of a type the surface doesn't handle was read and dropped.
    Dropped,
    /// Indicates pending input was discarded without being read.
    InputIgnored,
}

/// A registry of input elements of a single [`Category`].
pub type InputRegistry<'a, const N: usize = DEFAULT_CAPACITY> = Registry<'a, dyn InputElement + 'a, N>;

/// Offer `event` to each element of `registry` in registration order, stopping at the first element that claims it.
///
/// Returns the position of the claiming element. Elements registered after it never see the event, even if they
/// would have claimed it too.
pub fn route<'a, const N: usize>(registry: &mut InputRegistry<'a, N>, event: &InputEvent) -> Option<usize> {
    registry.iter_mut().position(|element| element.update(event))
}

/// An observer for System Exclusive messages. The surface never interprets their payload itself.
pub trait SystemExclusiveHandler {
    /// Called with a complete message, from `0xF0` through `0xF7` inclusive.
    fn on_system_exclusive(&mut self, data: &[u8]);
}

/// The destinations an [`InputStage`] delivers to.
pub trait InputSink {
    /// Reset every element in the categories affected by `kind`.
    fn reset(&mut self, kind: ResetKind);

    /// Route `event` to the registry for its category. See [`route()`].
    fn route(&mut self, event: &InputEvent) -> Option<usize>;

    /// Hand a System Exclusive message to whoever is interested.
    fn system_exclusive(&mut self, data: &[u8]);

    /// Refresh every input element.
    fn refresh(&mut self);
}

/// The input elements of a surface, one registry per [`Category`], plus an optional System Exclusive observer.
pub struct Inputs<'a, const N: usize = DEFAULT_CAPACITY> {
    control_change: InputRegistry<'a, N>,
    note: InputRegistry<'a, N>,
    channel_pressure: InputRegistry<'a, N>,
    system_exclusive: Option<&'a mut (dyn SystemExclusiveHandler + 'a)>,
}

impl<'a, const N: usize> Default for Inputs<'a, N> {
    fn default() -> Self {
        Self {
            control_change: Registry::new(),
            note: Registry::new(),
            channel_pressure: Registry::new(),
            system_exclusive: None,
        }
    }
}

impl<'a, const N: usize> Inputs<'a, N> {
    /// Add an element to the registry matching its [`category()`](InputElement::category).
    pub fn register(&mut self, element: &'a mut (dyn InputElement + 'a)) -> Result<(), RegistryError> {
        let category = element.category();
        self.registry(category).register(element)
    }

    /// Install the System Exclusive observer, replacing any previous one.
    pub fn set_system_exclusive_handler(&mut self, handler: &'a mut (dyn SystemExclusiveHandler + 'a)) {
        self.system_exclusive = Some(handler);
    }

    /// The registry for `category`.
    pub fn registry(&mut self, category: Category) -> &mut InputRegistry<'a, N> {
        match category {
            Category::ControlChange => &mut self.control_change,
            Category::Note => &mut self.note,
            Category::ChannelPressure => &mut self.channel_pressure,
        }
    }
}

impl<'a, const N: usize> InputSink for Inputs<'a, N> {
    fn reset(&mut self, kind: ResetKind) {
        for category in kind.categories() {
            self.registry(*category).iter_mut().for_each(|element| element.reset());
        }
    }

    fn route(&mut self, event: &InputEvent) -> Option<usize> {
        route(self.registry(event.category()), event)
    }

    fn system_exclusive(&mut self, data: &[u8]) {
        if let Some(handler) = self.system_exclusive.as_deref_mut() {
            handler.on_system_exclusive(data);
        }
    }

    fn refresh(&mut self) {
        for category in Category::ALL {
            self.registry(category).iter_mut().for_each(|element| element.refresh());
        }
    }
}

/// One way of handling input during a cycle.
#[enum_dispatch]
pub trait InputStage {
    /// Run the input stage once and report what it did.
    fn process(&mut self, transport: &mut dyn Transport, inputs: &mut dyn InputSink) -> Operation;
}

/// Reads, classifies and routes exactly one event per cycle, then refreshes every input element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Dispatch;

impl InputStage for Dispatch {
    fn process(&mut self, transport: &mut dyn Transport, inputs: &mut dyn InputSink) -> Operation {
        let mut operation = Operation::none();
        match transport.read() {
            Event::None => {}
            Event::ChannelMessage(message) => match classify(&message) {
                Action::Reset(kind) => {
                    operation |= Operation::Reset;
                    match kind {
                        ResetKind::AllControllers => debug!("Received Reset All Controllers"),
                        ResetKind::AllNotes => debug!("Received All Notes Off"),
                    }
                    inputs.reset(kind);
                }
                Action::Route(event) => match inputs.route(&event) {
                    Some(position) => {
                        operation |= Operation::Routed;
                        trace!("Routed {} to element {}", event, position);
                    }
                    None => {
                        operation |= Operation::Unclaimed;
                        trace!("No element claimed {}", event);
                    }
                },
                Action::Ignored => {
                    operation |= Operation::Dropped;
                    trace!("Dropped {}", message);
                }
            },
            Event::SystemExclusive(data) => {
                operation |= Operation::SystemExclusive;
                debug!("Received System Exclusive: {:x}", data);
                inputs.system_exclusive(data);
            }
        }
        inputs.refresh();
        operation
    }
}

/// Discards pending input without reading it. Input elements are left alone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Discard;

impl InputStage for Discard {
    fn process(&mut self, transport: &mut dyn Transport, _inputs: &mut dyn InputSink) -> Operation {
        transport.ignore_input();
        Operation::InputIgnored
    }
}

/// The input stage a surface runs each cycle. See [`InputHandling`](crate::config::InputHandling).
#[enum_dispatch(InputStage)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputStrategy {
    /// See [`Dispatch`].
    Dispatch,
    /// See [`Discard`].
    Discard,
}
