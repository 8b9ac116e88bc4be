//! `embedded-graphics` integration. Pixels go straight to the panel; there is no framebuffer, so
//! solid fills are the fast path and everything else is drawn pixel by pixel.

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::IntoStorage;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::Pixel;
use hal::digital::v2::OutputPin;

use crate::bus::BusMutex;
use crate::display::Display;
use crate::error::Error;
use crate::interface::Transport;

impl<'b, M, T, DC, CS, RST, BL, PinE> OriginDimensions for Display<'b, M, DC, CS, RST, BL>
where
    M: BusMutex<Bus = T>,
    T: Transport,
    DC: OutputPin<Error = PinE>,
    CS: OutputPin<Error = PinE>,
    RST: OutputPin<Error = PinE>,
    BL: OutputPin<Error = PinE>,
{
    fn size(&self) -> Size {
        Size::new(u32::from(self.width()), u32::from(self.height()))
    }
}

impl<'b, M, T, DC, CS, RST, BL, PinE> DrawTarget for Display<'b, M, DC, CS, RST, BL>
where
    M: BusMutex<Bus = T>,
    T: Transport,
    DC: OutputPin<Error = PinE>,
    CS: OutputPin<Error = PinE>,
    RST: OutputPin<Error = PinE>,
    BL: OutputPin<Error = PinE>,
{
    type Color = Rgb565;
    type Error = Error<T::Error, PinE>;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.draw_pixel(point.x, point.y, color.into_storage())?;
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let w = i32::try_from(area.size.width).unwrap_or(i32::MAX);
        let h = i32::try_from(area.size.height).unwrap_or(i32::MAX);
        self.fill_rect(area.top_left.x, area.top_left.y, w, h, color.into_storage())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_screen(color.into_storage())
    }
}
