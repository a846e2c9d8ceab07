//! Settings chosen by the embedding application when it constructs a [`ControlSurface`](crate::ControlSurface).

use crate::input::{Discard, Dispatch, InputStrategy};

/// Configuration for a [`ControlSurface`](crate::ControlSurface).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SurfaceConfig {
    /// Whether incoming MIDI is read and routed to input elements, or thrown away.
    pub input: InputHandling,
}

/// Determines what the surface does with incoming MIDI.
///
/// A surface with no input elements can save the cost of classifying messages nobody wants by selecting
/// [`Ignore`](Self::Ignore). The transport is still drained every cycle so its buffers never back up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputHandling {
    /// Read one event per cycle, route it, then refresh input elements.
    Dispatch,
    /// Discard pending input every cycle. Input elements are never updated, reset or refreshed.
    Ignore,
}

impl Default for InputHandling {
    /// [`Dispatch`](Self::Dispatch) if the `midi-input` feature is enabled, which it is by default.
    fn default() -> Self {
        if cfg!(feature = "midi-input") {
            Self::Dispatch
        } else {
            Self::Ignore
        }
    }
}

impl From<InputHandling> for InputStrategy {
    fn from(handling: InputHandling) -> Self {
        match handling {
            InputHandling::Dispatch => Dispatch.into(),
            InputHandling::Ignore => Discard.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handling_selects_strategy() {
        assert_eq!(
            InputStrategy::Dispatch(Dispatch),
            InputStrategy::from(InputHandling::Dispatch),
            "Expected left but got right"
        );
        assert_eq!(
            InputStrategy::Discard(Discard),
            InputStrategy::from(InputHandling::Ignore),
            "Expected left but got right"
        );
    }

    #[test]
    fn default_follows_feature() {
        let expected = if cfg!(feature = "midi-input") {
            InputHandling::Dispatch
        } else {
            InputHandling::Ignore
        };
        assert_eq!(expected, SurfaceConfig::default().input, "Expected left but got right");
    }
}
