//! The addressing window: the rectangle of panel RAM that the next pixel stream fills.

use hal::digital::v2::OutputPin;

use crate::command::Command;
use crate::error::Error;
use crate::interface::Transport;
use crate::transmit::Transmitter;

/// An inclusive rectangle in logical panel coordinates, lying entirely on the panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub x0: u16,
    pub y0: u16,
    pub x1: u16,
    pub y1: u16,
}

impl Window {
    /// Intersect the `w` by `h` rectangle with top-left corner `(x, y)` with a `width` by
    /// `height` panel. `None` when no pixel of the rectangle is on the panel.
    pub fn clip(x: i32, y: i32, w: i32, h: i32, width: u16, height: u16) -> Option<Self> {
        let (x, y) = (i64::from(x), i64::from(y));
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + i64::from(w) - 1).min(i64::from(width) - 1);
        let y1 = (y + i64::from(h) - 1).min(i64::from(height) - 1);
        if x0 > x1 || y0 > y1 {
            return None;
        }
        Some(Window {
            x0: x0 as u16,
            y0: y0 as u16,
            x1: x1 as u16,
            y1: y1 as u16,
        })
    }

    pub fn width(&self) -> usize {
        usize::from(self.x1 - self.x0) + 1
    }

    pub fn height(&self) -> usize {
        usize::from(self.y1 - self.y0) + 1
    }

    pub fn pixels(&self) -> usize {
        self.width() * self.height()
    }

    /// Program the window and start a memory write. The panel then takes pixels row by row,
    /// left to right and top to bottom, until `self.pixels()` have been written.
    pub fn set_addr_window<T, DC, PinE>(
        &self,
        tx: &mut Transmitter<'_, T, DC>,
    ) -> Result<(), Error<T::Error, PinE>>
    where
        T: Transport,
        DC: OutputPin<Error = PinE>,
    {
        Command::ColumnAddress(self.x0, self.x1).send(tx)?;
        Command::PageAddress(self.y0, self.y1).send(tx)?;
        Command::MemoryWrite.send(tx)
    }
}
