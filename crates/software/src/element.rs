//! The contracts every element must honour to be driven by the surface.
//!
//! Elements are constructed by the application, registered once, and then visited every cycle. What an element does
//! in [`refresh()`](ControlElement::refresh) (read a button, light an LED, emit MIDI) is its own business; the surface
//! only guarantees when and in what order it is called.

use crate::{
    classifier::{Category, InputEvent},
    transport::Transport,
};

/// An output-facing control, e.g., a button or potentiometer that emits MIDI when it changes.
pub trait ControlElement {
    /// Sample the control and emit whatever it needs to through `transport`.
    fn refresh(&mut self, transport: &mut dyn Transport);
}

/// An element which changes the active bank, i.e., which set of addresses bankable elements respond to.
pub trait BankSelector {
    /// Detect and apply bank change requests.
    fn refresh(&mut self);
}

/// An element which reacts to incoming MIDI.
pub trait InputElement {
    /// The category of messages this element listens to. Determines the registry it is placed in.
    fn category(&self) -> Category;

    /// Offer an event to the element. Returns `true` if the event was addressed to this element, in which case it
    /// has updated its state and the event will not be offered to anyone else.
    fn update(&mut self, event: &InputEvent) -> bool;

    /// Return to the initial state, e.g., in response to Reset All Controllers or All Notes Off.
    fn reset(&mut self);

    /// Push state to hardware. Called every cycle, after input has been processed.
    fn refresh(&mut self);
}
