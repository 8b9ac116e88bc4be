//! The MIPI DCS subset shared by the ILI9341 and ST7789 that the driver issues at runtime. The
//! vendor-specific power and gamma registers only appear in the init scripts (see `init`).

use hal::digital::v2::OutputPin;

use crate::error::Error;
use crate::interface::Transport;
use crate::transmit::Transmitter;

pub mod consts {
    pub const RDDID: u8 = 0x04;
    pub const SLPOUT: u8 = 0x11;
    pub const INVOFF: u8 = 0x20;
    pub const INVON: u8 = 0x21;
    pub const DISPON: u8 = 0x29;
    pub const CASET: u8 = 0x2A;
    pub const PASET: u8 = 0x2B;
    pub const RAMWR: u8 = 0x2C;
    pub const MADCTL: u8 = 0x36;
    pub const COLMOD: u8 = 0x3A;

    /// MADCTL bits.
    pub const MADCTL_MY: u8 = 0x80;
    pub const MADCTL_MX: u8 = 0x40;
    pub const MADCTL_MV: u8 = 0x20;
    pub const MADCTL_BGR: u8 = 0x08;

    /// COLMOD value for 16 bits per pixel on both the RGB and MCU interfaces.
    pub const PIXEL_FORMAT_16BPP: u8 = 0x55;
}

use self::consts::*;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Set the column start and end address (inclusive) of the addressing window.
    ColumnAddress(u16, u16),
    /// Set the row ("page") start and end address (inclusive) of the addressing window.
    PageAddress(u16, u16),
    /// Begin a pixel stream into the current window, starting at its top-left corner.
    MemoryWrite,
    /// Memory access control: scan direction and RGB/BGR order.
    MemoryAccessControl(u8),
    /// Interface pixel format.
    PixelFormat(u8),
    /// Invert every pixel on the panel, or return to normal.
    Invert(bool),
}

impl Command {
    pub fn send<T, DC, PinE>(self, tx: &mut Transmitter<'_, T, DC>) -> Result<(), Error<T::Error, PinE>>
    where
        T: Transport,
        DC: OutputPin<Error = PinE>,
    {
        match self {
            Command::ColumnAddress(start, end) => {
                tx.transmit_cmd_data(CASET, u32::from(start) << 16 | u32::from(end), 4)
            }
            Command::PageAddress(start, end) => {
                tx.transmit_cmd_data(PASET, u32::from(start) << 16 | u32::from(end), 4)
            }
            Command::MemoryWrite => tx.transmit_cmd(RAMWR),
            Command::MemoryAccessControl(bits) => {
                tx.transmit_cmd_data(MADCTL, u32::from(bits), 1)
            }
            Command::PixelFormat(format) => tx.transmit_cmd_data(COLMOD, u32::from(format), 1),
            Command::Invert(true) => tx.transmit_cmd(INVON),
            Command::Invert(false) => tx.transmit_cmd(INVOFF),
        }
    }
}
