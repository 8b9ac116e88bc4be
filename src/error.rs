//! Driver errors.

use core::fmt;

/// A configuration rejected at construction. No display instance is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The logical bus index is not one the driver can share with a display.
    UnsupportedBus(u8),
    /// Width or height is zero.
    ZeroSize,
    /// Bus clock is zero.
    ZeroClock,
    /// The configured chunk cannot hold a single pixel.
    ChunkTooSmall(usize),
    /// The scratch buffer is shorter than one chunk.
    BufferTooSmall { needed: usize, got: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnsupportedBus(idx) => write!(f, "unsupported bus index {}", idx),
            ConfigError::ZeroSize => f.write_str("panel width and height must be non-zero"),
            ConfigError::ZeroClock => f.write_str("bus clock must be non-zero"),
            ConfigError::ChunkTooSmall(n) => write!(f, "chunk of {} bytes holds no pixel", n),
            ConfigError::BufferTooSmall { needed, got } => write!(
                f,
                "scratch buffer of {} bytes is shorter than the {} byte chunk",
                got, needed
            ),
        }
    }
}

/// Errors returned by the display driver. `BusE` is the transport's error type and `PinE` the
/// error type shared by the display's GPIO pins. Both are passed through uninterpreted.
#[derive(Debug, PartialEq, Eq)]
pub enum Error<BusE, PinE> {
    Config(ConfigError),
    Bus(BusE),
    Pin(PinE),
}

impl<BusE, PinE> From<ConfigError> for Error<BusE, PinE> {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl<BusE: fmt::Debug, PinE: fmt::Debug> fmt::Display for Error<BusE, PinE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "invalid configuration: {}", e),
            Error::Bus(e) => write!(f, "bus transport error: {:?}", e),
            Error::Pin(e) => write!(f, "pin error: {:?}", e),
        }
    }
}

#[cfg(feature = "std")]
impl<BusE: fmt::Debug, PinE: fmt::Debug> std::error::Error for Error<BusE, PinE> {}
