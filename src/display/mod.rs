//! The main API to the display driver. A `Display` owns the discrete pins of one panel and shares
//! the bus with any other devices through a `BusMutex`. Every drawing call is one bus session:
//! lock the bus, select the panel, transmit, deselect, unlock.

pub mod stream;
pub mod window;

use hal::blocking::delay::DelayMs;
use hal::digital::v2::OutputPin;
use log::{debug, info};

use crate::bus::BusMutex;
use crate::command::Command;
use crate::config::{Config, Level, PanelModel, Pins};
use crate::error::Error;
use crate::init::{self, PanelIdentity, TabColor, RESET_MS};
use crate::interface::Transport;
use crate::transmit::{drive, DcPin, Transmitter};
use self::window::Window;

/// A driver for one ILI9341 or ST7789 panel on a shared bus.
///
/// Coordinates are logical: `(0, 0)` is the top-left corner for the configured orientation, and
/// `width()` by `height()` are the dimensions given in the `Config`. Anything drawn outside is
/// clipped, and a call that leaves nothing on the panel does not touch the bus at all.
pub struct Display<'b, M, DC, CS, RST, BL> {
    bus: &'b M,
    dc: DcPin<DC>,
    cs: CS,
    rst: RST,
    bl: BL,
    /// Scratch buffer pixel data is staged in, one transaction's worth.
    chunk: &'b mut [u8],
    model: PanelModel,
    tab_color: TabColor,
    identity: PanelIdentity,
    width: u16,
    height: u16,
    dma_enabled: bool,
    bl_active: Level,
}

impl<'b, M, T, DC, CS, RST, BL, PinE> Display<'b, M, DC, CS, RST, BL>
where
    M: BusMutex<Bus = T>,
    T: Transport,
    DC: OutputPin<Error = PinE>,
    CS: OutputPin<Error = PinE>,
    RST: OutputPin<Error = PinE>,
    BL: OutputPin<Error = PinE>,
{
    /// Bring up the panel and return a driver for it.
    ///
    /// `chunk_buf` must hold at least `config.chunk_bytes()` bytes; pixel streams are split into
    /// transactions of that size. The configuration is checked before any pin or the bus is
    /// touched. Then, in order: chip select is deasserted, the bus is initialized if this
    /// display owns it, the reset line is pulsed, the controller is identified when the model is
    /// `PanelModel::Auto`, the init sequence for the model runs, and the backlight is turned on.
    pub fn new<D: DelayMs<u16>>(
        bus: &'b M,
        pins: Pins<DC, CS, RST, BL>,
        config: Config,
        chunk_buf: &'b mut [u8],
        delay: &mut D,
    ) -> Result<Self, Error<T::Error, PinE>> {
        config.validate(chunk_buf.len())?;
        let (chunk, _) = chunk_buf.split_at_mut(config.chunk_bytes());
        let Pins { dc, cs, rst, bl } = pins;
        let mut display = Display {
            bus,
            dc: DcPin::new(dc),
            cs,
            rst,
            bl,
            chunk,
            model: config.model,
            tab_color: TabColor::for_model(config.model),
            identity: PanelIdentity::default(),
            width: config.width,
            height: config.height,
            dma_enabled: config.dma.enabled,
            bl_active: config.bl_active,
        };

        display.cs.set_high().map_err(Error::Pin)?;
        if config.init_bus {
            let settings = config.bus_settings();
            debug!(
                "init_bus requested for bus {} at {} Hz",
                settings.bus_index, settings.clock_hz
            );
            bus.lock(|t| t.init_bus(&settings)).map_err(Error::Bus)?;
        }
        display.hard_reset(config.rst_active, delay)?;

        let (identity, model) = display.session(|tx, _| {
            let identity = if config.model == PanelModel::Auto {
                init::read_identity(tx)?
            } else {
                PanelIdentity::default()
            };
            let model = init::resolve_model(config.model, &identity);
            init::run(tx, model, config.orientation, delay)?;
            Ok((identity, model))
        })?;
        display.identity = identity;
        display.model = model;
        display.tab_color = TabColor::for_model(model);

        display.set_backlight(true)?;
        info!(
            "{:?} ready, {}x{} {:?}",
            model, config.width, config.height, config.orientation
        );
        Ok(display)
    }

    fn hard_reset<D: DelayMs<u16>>(
        &mut self,
        active: Level,
        delay: &mut D,
    ) -> Result<(), Error<T::Error, PinE>> {
        drive(&mut self.rst, active).map_err(Error::Pin)?;
        delay.delay_ms(RESET_MS);
        drive(&mut self.rst, active.inverted()).map_err(Error::Pin)?;
        delay.delay_ms(RESET_MS);
        Ok(())
    }

    /// Run `f` with the bus locked and the panel selected. Chip select is raised again and the
    /// bus released whether or not `f` succeeds; the first error wins.
    fn session<R, F>(&mut self, f: F) -> Result<R, Error<T::Error, PinE>>
    where
        F: FnOnce(&mut Transmitter<'_, T, DC>, &mut [u8]) -> Result<R, Error<T::Error, PinE>>,
    {
        let Display {
            bus, dc, cs, chunk, ..
        } = self;
        bus.lock(|t| {
            cs.set_low().map_err(Error::Pin)?;
            let result = f(&mut Transmitter::new(t, dc), &mut chunk[..]);
            let deselect = cs.set_high().map_err(Error::Pin);
            result.and_then(|r| deselect.map(|()| r))
        })
    }

    /// The composite controller ID read during construction, or 0 when the model was given
    /// explicitly and no identification took place.
    pub fn identity(&self) -> u32 {
        self.identity.id
    }

    pub fn panel_identity(&self) -> PanelIdentity {
        self.identity
    }

    /// The model in use. Never `PanelModel::Auto` once constructed.
    pub fn model(&self) -> PanelModel {
        self.model
    }

    pub fn tab_color(&self) -> TabColor {
        self.tab_color
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn dma_enabled(&self) -> bool {
        self.dma_enabled
    }

    /// Bytes per pixel-data transaction.
    pub fn chunk_bytes(&self) -> usize {
        self.chunk.len()
    }

    pub fn fill_screen(&mut self, color: u16) -> Result<(), Error<T::Error, PinE>> {
        let (w, h) = (i32::from(self.width), i32::from(self.height));
        self.fill_rect(0, 0, w, h, color)
    }

    pub fn draw_pixel(&mut self, x: i32, y: i32, color: u16) -> Result<(), Error<T::Error, PinE>> {
        let win = match Window::clip(x, y, 1, 1, self.width, self.height) {
            Some(win) => win,
            None => return Ok(()),
        };
        self.session(|tx, _| {
            win.set_addr_window(tx)?;
            tx.transmit_data_u16(color)
        })
    }

    pub fn fill_rect(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: u16,
    ) -> Result<(), Error<T::Error, PinE>> {
        let win = match Window::clip(x, y, w, h, self.width, self.height) {
            Some(win) => win,
            None => return Ok(()),
        };
        self.session(|tx, chunk| {
            win.set_addr_window(tx)?;
            tx.transmit_data_repeated(color, win.pixels(), chunk)
        })
    }

    /// Draw a `w` by `h` image stored row-major in `bitmap` with its top-left corner at
    /// `(x, y)`. Only the part on the panel is sent.
    pub fn draw_bitmap(
        &mut self,
        x: i32,
        y: i32,
        bitmap: &[u16],
        w: i32,
        h: i32,
    ) -> Result<(), Error<T::Error, PinE>> {
        self.draw_bitmap_swapped(x, y, bitmap, w, h, true)
    }

    /// Like `draw_bitmap`, choosing the byte order on the wire. `swap` sends each value most
    /// significant byte first, which is what the panel expects of plain `u16` colors. Without
    /// `swap` the in-memory byte order is sent as is, for images whose values already hold
    /// byte-swapped colors.
    ///
    /// Rows missing from the end of a `bitmap` shorter than `w * h` are not drawn.
    pub fn draw_bitmap_swapped(
        &mut self,
        x: i32,
        y: i32,
        bitmap: &[u16],
        w: i32,
        h: i32,
        swap: bool,
    ) -> Result<(), Error<T::Error, PinE>> {
        if w <= 0 || h <= 0 {
            return Ok(());
        }
        let stride = w as usize;
        let h = h.min(i32::try_from(bitmap.len() / stride).unwrap_or(i32::MAX));
        let win = match Window::clip(x, y, w, h, self.width, self.height) {
            Some(win) => win,
            None => return Ok(()),
        };
        let skip_cols = (i32::from(win.x0) - x) as usize;
        let skip_rows = (i32::from(win.y0) - y) as usize;
        let cols = win.width();
        let rows = bitmap
            .chunks_exact(stride)
            .skip(skip_rows)
            .take(win.height())
            .map(|row| &row[skip_cols..skip_cols + cols]);
        self.session(|tx, chunk| {
            win.set_addr_window(tx)?;
            stream::stream_rows(tx, rows, swap, chunk)
        })
    }

    /// Write a framebuffer area given by inclusive corners, as handed out by GUI toolkits' flush
    /// callbacks.
    pub fn flush(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        pixels: &[u16],
    ) -> Result<(), Error<T::Error, PinE>> {
        let w = x2.saturating_sub(x1).saturating_add(1);
        let h = y2.saturating_sub(y1).saturating_add(1);
        self.draw_bitmap(x1, y1, pixels, w, h)
    }

    pub fn set_backlight(&mut self, on: bool) -> Result<(), Error<T::Error, PinE>> {
        let level = if on {
            self.bl_active
        } else {
            self.bl_active.inverted()
        };
        drive(&mut self.bl, level).map_err(Error::Pin)
    }

    pub fn invert_colors(&mut self, invert: bool) -> Result<(), Error<T::Error, PinE>> {
        self.session(|tx, _| Command::Invert(invert).send(tx))
    }

    /// Give the pins back. The panel keeps showing its last contents.
    pub fn release(self) -> Pins<DC, CS, RST, BL> {
        Pins {
            dc: self.dc.release(),
            cs: self.cs,
            rst: self.rst,
            bl: self.bl,
        }
    }
}
