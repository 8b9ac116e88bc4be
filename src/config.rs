//! Construction-time configuration for a panel: which controller is attached, how it is wired,
//! and how pixel data is moved over the bus.

use crate::error::ConfigError;
use crate::interface::BusSettings;

/// Default logical panel width in pixels.
pub const DEFAULT_WIDTH: u16 = 240;
/// Default logical panel height in pixels.
pub const DEFAULT_HEIGHT: u16 = 320;
/// Default bus clock.
pub const DEFAULT_CLOCK_HZ: u32 = 40_000_000;
/// Default DMA chunk size in bytes.
pub const DEFAULT_DMA_CHUNK_BYTES: usize = 1024;
/// Payload size of one transaction when DMA is disabled: a single SPI hardware FIFO load.
pub const FIFO_CHUNK_BYTES: usize = 64;

/// Bus indices the driver accepts. Index 0 is wired to the flash chip on the parts this driver
/// targets and cannot be shared with a display.
pub const SUPPORTED_BUSES: core::ops::RangeInclusive<u8> = 1..=2;

/// The controller family driving the panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelModel {
    /// Ilitek ILI9341.
    Ili9341,
    /// Sitronix ST7789 / ST7789V.
    St7789,
    /// Read the controller's identity registers during construction and pick a family from
    /// the result.
    Auto,
}

/// Logic level of a discrete pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// The opposite level.
    pub fn inverted(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

/// Scan orientation of the panel, programmed into the memory access control register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
    PortraitFlipped,
    LandscapeFlipped,
}

/// DMA transfer settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DmaConfig {
    pub enabled: bool,
    /// Maximum payload of one bus transaction when `enabled`.
    pub chunk_bytes: usize,
    /// DMA channel handed to the transport when the driver initializes the bus.
    pub channel: u8,
}

impl Default for DmaConfig {
    fn default() -> Self {
        DmaConfig {
            enabled: true,
            chunk_bytes: DEFAULT_DMA_CHUNK_BYTES,
            channel: 1,
        }
    }
}

/// The discrete pins owned by one display. The clock and data lines belong to the transport.
pub struct Pins<DC, CS, RST, BL> {
    /// Data/command select.
    pub dc: DC,
    /// Chip select, active low.
    pub cs: CS,
    pub rst: RST,
    pub bl: BL,
}

/// A configuration for the display. `Config::new` fills in the values for a 240x320 portrait
/// panel on bus 1 with DMA enabled; builder methods override individual settings.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub(crate) model: PanelModel,
    pub(crate) width: u16,
    pub(crate) height: u16,
    pub(crate) orientation: Orientation,
    pub(crate) clock_hz: u32,
    pub(crate) rst_active: Level,
    pub(crate) bl_active: Level,
    pub(crate) bus_index: u8,
    pub(crate) init_bus: bool,
    pub(crate) dma: DmaConfig,
}

impl Config {
    /// Create a new configuration for a panel of the given model. Use `PanelModel::Auto` to
    /// identify the controller at construction time.
    pub fn new(model: PanelModel) -> Self {
        Config {
            model,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            orientation: Orientation::Portrait,
            clock_hz: DEFAULT_CLOCK_HZ,
            rst_active: Level::Low,
            bl_active: Level::High,
            bus_index: 1,
            init_bus: true,
            dma: DmaConfig::default(),
        }
    }

    /// Logical dimensions after rotation.
    pub fn size(self, width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            ..self
        }
    }

    pub fn orientation(self, orientation: Orientation) -> Self {
        Self {
            orientation,
            ..self
        }
    }

    pub fn clock_hz(self, clock_hz: u32) -> Self {
        Self { clock_hz, ..self }
    }

    /// Levels at which the reset and backlight pins are active.
    pub fn active_levels(self, rst_active: Level, bl_active: Level) -> Self {
        Self {
            rst_active,
            bl_active,
            ..self
        }
    }

    /// Select the logical bus, and whether this driver initializes it or reuses a bus already
    /// brought up by another owner.
    pub fn bus(self, bus_index: u8, init_bus: bool) -> Self {
        Self {
            bus_index,
            init_bus,
            ..self
        }
    }

    pub fn dma(self, enabled: bool, chunk_bytes: usize, channel: u8) -> Self {
        Self {
            dma: DmaConfig {
                enabled,
                chunk_bytes,
                channel,
            },
            ..self
        }
    }

    pub fn model(&self) -> PanelModel {
        self.model
    }

    /// Bytes per bus transaction when streaming pixels, always a whole number of pixels.
    pub fn chunk_bytes(&self) -> usize {
        let raw = if self.dma.enabled {
            self.dma.chunk_bytes
        } else {
            FIFO_CHUNK_BYTES
        };
        raw & !1
    }

    pub(crate) fn bus_settings(&self) -> BusSettings {
        BusSettings {
            bus_index: self.bus_index,
            clock_hz: self.clock_hz,
            dma_channel: if self.dma.enabled {
                Some(self.dma.channel)
            } else {
                None
            },
            max_transfer_bytes: self.chunk_bytes(),
        }
    }

    /// Check the configuration against the scratch buffer the driver will stream through.
    pub(crate) fn validate(&self, buf_len: usize) -> Result<(), ConfigError> {
        if !SUPPORTED_BUSES.contains(&self.bus_index) {
            return Err(ConfigError::UnsupportedBus(self.bus_index));
        }
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroSize);
        }
        if self.clock_hz == 0 {
            return Err(ConfigError::ZeroClock);
        }
        let needed = self.chunk_bytes();
        if needed < 2 {
            return Err(ConfigError::ChunkTooSmall(self.dma.chunk_bytes));
        }
        if buf_len < needed {
            return Err(ConfigError::BufferTooSmall {
                needed,
                got: buf_len,
            });
        }
        Ok(())
    }
}
