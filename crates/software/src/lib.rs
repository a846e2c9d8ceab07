//! This crate contains the architecture-agnostic core of a MIDI control surface: the engine which polls a MIDI
//! [transport](transport::Transport), routes what it reads to the input elements that claim it, and refreshes every
//! registered element once per cycle so that buttons, LEDs and the like stay in sync with the host.
//!
//! Applications construct a [`ControlSurface`], register elements with it, and call
//! [`run_cycle()`](ControlSurface::run_cycle) from their main loop. Output hardware that needs more lines than the
//! microcontroller has to spare can be driven through a [`ShiftRegisterOut`].
//!
//! Enable the `defmt` feature for logging.

#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]

// must come first so the logging macros are visible to every other module
mod fmt;

pub mod bank;
pub mod classifier;
pub mod config;
pub mod element;
pub mod elements;
pub mod input;
pub mod registry;
pub mod shift_register;
pub mod transport;

mod surface;

#[cfg(test)]
mod mock;

pub use config::{InputHandling, SurfaceConfig};
pub use input::Operation;
pub use registry::RegistryError;
pub use shift_register::ShiftRegisterOut;
pub use surface::*;
