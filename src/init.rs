//! Controller identification and the per-model power-up sequences.
//!
//! Both supported controllers speak the same MIPI DCS command set for drawing, but need
//! different vendor register writes (power control, VCOM, gamma curves) before the panel shows
//! anything. Each model gets a fixed script; the scan direction and color order are computed
//! from the configuration and sent after it.

use hal::blocking::delay::DelayMs;
use hal::digital::v2::OutputPin;
use log::{debug, info, warn};

use crate::command::consts::*;
use crate::command::Command;
use crate::config::{Orientation, PanelModel};
use crate::error::Error;
use crate::interface::Transport;
use crate::transmit::Transmitter;

/// Settle time after sleep-out and display-on.
pub const SETTLE_MS: u16 = 100;

/// How long the reset line is held active, and then inactive before the first command.
pub const RESET_MS: u16 = 100;

/// Model picked when the identity registers match nothing in `KNOWN_CONTROLLERS`. Some panels
/// leave the ID registers unprogrammed, so an unknown ID is not treated as an error.
pub const FALLBACK_MODEL: PanelModel = PanelModel::Ili9341;

/// `(manufacturer ID, driver ID, model)` as read back by RDDID.
pub const KNOWN_CONTROLLERS: &[(u8, u8, PanelModel)] = &[
    (0x85, 0x85, PanelModel::St7789),
    (0x00, 0x00, PanelModel::Ili9341),
];

/// The three ID bytes returned by the controller, and their composite.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PanelIdentity {
    pub mfg_id: u8,
    pub driver_id: u8,
    pub lcd_id: u8,
    /// `mfg_id | driver_id << 8 | lcd_id << 16`.
    pub id: u32,
}

impl PanelIdentity {
    pub fn from_bytes(bytes: [u8; 3]) -> Self {
        let [mfg_id, driver_id, lcd_id] = bytes;
        PanelIdentity {
            mfg_id,
            driver_id,
            lcd_id,
            id: u32::from_le_bytes([mfg_id, driver_id, lcd_id, 0]),
        }
    }

    /// Look the manufacturer/driver pair up among the known controllers.
    pub fn model(&self) -> Option<PanelModel> {
        KNOWN_CONTROLLERS
            .iter()
            .find(|(mfg, drv, _)| *mfg == self.mfg_id && *drv == self.driver_id)
            .map(|(_, _, model)| *model)
    }
}

/// Per-model color-order correction. Black-tab panels take RGB order, green-tab panels BGR.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TabColor {
    Green,
    Black,
}

impl TabColor {
    pub fn for_model(model: PanelModel) -> Self {
        match model {
            PanelModel::St7789 => TabColor::Black,
            PanelModel::Ili9341 | PanelModel::Auto => TabColor::Green,
        }
    }

    fn madctl_order(self) -> u8 {
        match self {
            TabColor::Green => MADCTL_BGR,
            TabColor::Black => 0,
        }
    }
}

/// One register write of an init script.
pub struct InitStep {
    pub cmd: u8,
    pub data: &'static [u8],
}

const fn step(cmd: u8, data: &'static [u8]) -> InitStep {
    InitStep { cmd, data }
}

#[rustfmt::skip]
const ILI9341_SCRIPT: &[InitStep] = &[
    step(0xCF, &[0x00, 0x83, 0x30]), // power control B
    step(0xED, &[0x64, 0x03, 0x12, 0x81]), // power on sequence
    step(0xE8, &[0x85, 0x01, 0x79]), // driver timing A
    step(0xCB, &[0x39, 0x2C, 0x00, 0x34, 0x02]), // power control A
    step(0xF7, &[0x20]), // pump ratio
    step(0xEA, &[0x00, 0x00]), // driver timing B
    step(0xC0, &[0x26]), // power control 1
    step(0xC1, &[0x11]), // power control 2
    step(0xC5, &[0x35, 0x3E]), // VCOM control 1
    step(0xC7, &[0xBE]), // VCOM control 2
    step(0xB1, &[0x00, 0x1B]), // frame rate
    step(0xF2, &[0x08]), // 3-gamma off
    step(0x26, &[0x01]), // gamma curve 1
    step(0xE0, &[0x1F, 0x1A, 0x18, 0x0A, 0x0F, 0x06, 0x45, 0x87, 0x32, 0x0A, 0x07, 0x02, 0x07, 0x05, 0x00]),
    step(0xE1, &[0x00, 0x25, 0x27, 0x05, 0x10, 0x09, 0x3A, 0x78, 0x4D, 0x05, 0x18, 0x0D, 0x38, 0x3A, 0x1F]),
    step(0xB7, &[0x07]), // entry mode
    step(0xB6, &[0x0A, 0x82, 0x27, 0x00]), // display function control
];

#[rustfmt::skip]
const ST7789_SCRIPT: &[InitStep] = &[
    step(0xB2, &[0x0C, 0x0C, 0x00, 0x33, 0x33]), // porch
    step(0xB7, &[0x45]), // gate control
    step(0xBB, &[0x2B]), // VCOM
    step(0xC0, &[0x2C]), // LCM control
    step(0xC2, &[0x01, 0xFF]), // VDV/VRH enable
    step(0xC3, &[0x11]), // VRH
    step(0xC4, &[0x20]), // VDV
    step(0xC6, &[0x0F]), // frame rate
    step(0xD0, &[0xA4, 0xA1]), // power control 1
    step(0xE0, &[0xD0, 0x00, 0x05, 0x0E, 0x15, 0x0D, 0x37, 0x43, 0x47, 0x09, 0x15, 0x12, 0x16, 0x19]),
    step(0xE1, &[0xD0, 0x00, 0x05, 0x0D, 0x0C, 0x06, 0x2D, 0x44, 0x40, 0x0E, 0x1C, 0x18, 0x16, 0x19]),
];

/// The vendor register script of a concrete model. `Auto` has no script of its own.
pub fn script(model: PanelModel) -> &'static [InitStep] {
    match model {
        PanelModel::Ili9341 => ILI9341_SCRIPT,
        PanelModel::St7789 => ST7789_SCRIPT,
        PanelModel::Auto => &[],
    }
}

/// The memory access control value for a model in a given orientation.
pub fn madctl(model: PanelModel, orientation: Orientation) -> u8 {
    let scan = match (model, orientation) {
        (PanelModel::St7789, Orientation::Portrait) => 0,
        (PanelModel::St7789, Orientation::Landscape) => MADCTL_MX | MADCTL_MV,
        (PanelModel::St7789, Orientation::PortraitFlipped) => MADCTL_MX | MADCTL_MY,
        (PanelModel::St7789, Orientation::LandscapeFlipped) => MADCTL_MY | MADCTL_MV,
        (_, Orientation::Portrait) => MADCTL_MX,
        (_, Orientation::Landscape) => MADCTL_MV,
        (_, Orientation::PortraitFlipped) => MADCTL_MY,
        (_, Orientation::LandscapeFlipped) => MADCTL_MY | MADCTL_MX | MADCTL_MV,
    };
    scan | TabColor::for_model(model).madctl_order()
}

/// Read the identity registers.
pub(crate) fn read_identity<T, DC, PinE>(
    tx: &mut Transmitter<'_, T, DC>,
) -> Result<PanelIdentity, Error<T::Error, PinE>>
where
    T: Transport,
    DC: OutputPin<Error = PinE>,
{
    let mut bytes = [0u8; 3];
    tx.read_data(RDDID, &mut bytes)?;
    let identity = PanelIdentity::from_bytes(bytes);
    debug!("panel identity {:#08x}", identity.id);
    Ok(identity)
}

/// Settle on a concrete model. An explicit model always wins; `identity` is only consulted for
/// `PanelModel::Auto`.
pub fn resolve_model(configured: PanelModel, identity: &PanelIdentity) -> PanelModel {
    if configured != PanelModel::Auto {
        return configured;
    }
    match identity.model() {
        Some(model) => {
            info!("detected {:?} (id {:#08x})", model, identity.id);
            model
        }
        None => {
            warn!(
                "unrecognized panel id {:#08x}, assuming {:?}",
                identity.id, FALLBACK_MODEL
            );
            FALLBACK_MODEL
        }
    }
}

/// Send the full power-up sequence for `model`. Runs to completion or fails; the panel is not
/// usable in between.
pub(crate) fn run<T, DC, PinE, D>(
    tx: &mut Transmitter<'_, T, DC>,
    model: PanelModel,
    orientation: Orientation,
    delay: &mut D,
) -> Result<(), Error<T::Error, PinE>>
where
    T: Transport,
    DC: OutputPin<Error = PinE>,
    D: DelayMs<u16>,
{
    for s in script(model) {
        tx.transmit_cmd(s.cmd)?;
        tx.transmit_data(s.data)?;
    }
    Command::MemoryAccessControl(madctl(model, orientation)).send(tx)?;
    Command::PixelFormat(PIXEL_FORMAT_16BPP).send(tx)?;
    tx.transmit_cmd(SLPOUT)?;
    delay.delay_ms(SETTLE_MS);
    tx.transmit_cmd(DISPON)?;
    delay.delay_ms(SETTLE_MS);
    Ok(())
}
