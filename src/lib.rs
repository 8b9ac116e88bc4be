//! Driver library for ILI9341 and ST7789 TFT display controllers on a shared SPI bus.
//!
//! Several displays, or a display and other devices, may sit on one bus. Each `Display` borrows
//! the bus through a `BusMutex` and holds it for exactly one drawing call at a time, so calls
//! from different execution contexts never interleave on the wire.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate embedded_hal as hal;

// This has to be here in order to be usable by mods declared afterwards.
#[cfg(test)]
#[macro_use]
pub mod testing {
    macro_rules! send {
        ([$($d:tt),*]) => {Sent::Data(vec![$($d,)*])};
        ($c:tt) => {Sent::Cmd($c)};
    }
    macro_rules! sends {
        ($($e:tt),*) => {&[$(send!($e),)*]};
    }
}

pub mod bus;
pub mod color;
pub mod command;
pub mod config;
pub mod display;
pub mod error;
#[cfg(feature = "graphics")]
pub mod graphics;
pub mod init;
pub mod interface;
pub mod transmit;

// Re-exports for primary API.
pub use bus::{BusMutex, SharedBus};
pub use color::color565;
pub use command::consts;
pub use config::{Config, DmaConfig, Level, Orientation, PanelModel, Pins};
pub use display::Display;
pub use error::{ConfigError, Error};
pub use init::{PanelIdentity, TabColor};
pub use interface::spi::SpiInterface;
pub use interface::{BusSettings, Transport};
