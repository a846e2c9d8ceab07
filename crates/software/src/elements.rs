//! Ready-made elements covering the common cases. Anything more specialised implements the traits in
//! [`element`](crate::element) directly.

mod cc_button;
pub use cc_button::*;

mod cc_value;
pub use cc_value::*;

mod channel_pressure_value;
pub use channel_pressure_value::*;

mod note_led;
pub use note_led::*;
