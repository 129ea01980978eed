//! Host side of the irMagician infrared transceiver.
//!
//! The device speaks a terse line based text protocol over a 9600 baud
//! serial link. [`Session`] drives it: capture a signal, dump the captured
//! waveform into a [`Waveform`], load a waveform back and play it, or read
//! the onboard temperature sensor.

pub mod bank;
pub mod error;
pub mod link;
pub mod protocol;
pub mod session;
pub mod waveform;

pub use error::{Error, Result};
pub use link::{LinkConfig, Transport};
#[cfg(feature = "serial")]
pub use link::SerialLink;
pub use session::{DumpStrategy, Session, SessionConfig, Temperature, Timing};
pub use waveform::Waveform;
