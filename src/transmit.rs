//! The command/data protocol: every byte sent to the panel goes through a `Transmitter`, which
//! owns the only path to the data/command select pin.

use hal::digital::v2::OutputPin;

use crate::config::Level;
use crate::error::Error;
use crate::interface::Transport;

/// The data/command select pin together with the level last driven onto it. The level is `None`
/// until the pin is first driven, so the first transmission always writes the pin.
pub struct DcPin<DC> {
    pin: DC,
    level: Option<Level>,
}

impl<DC: OutputPin> DcPin<DC> {
    pub fn new(pin: DC) -> Self {
        DcPin { pin, level: None }
    }

    pub fn level(&self) -> Option<Level> {
        self.level
    }

    /// Drive `level`, skipping the pin write when it is already there.
    fn set(&mut self, level: Level) -> Result<(), DC::Error> {
        if self.level == Some(level) {
            return Ok(());
        }
        drive(&mut self.pin, level)?;
        self.level = Some(level);
        Ok(())
    }

    pub fn release(self) -> DC {
        self.pin
    }
}

/// Drive `pin` to `level`.
pub(crate) fn drive<P: OutputPin>(pin: &mut P, level: Level) -> Result<(), P::Error> {
    match level {
        Level::Low => pin.set_low(),
        Level::High => pin.set_high(),
    }
}

const COMMAND: Level = Level::Low;
const DATA: Level = Level::High;

/// Protocol primitives over a locked transport. Only exists inside a bus session.
pub struct Transmitter<'s, T, DC> {
    bus: &'s mut T,
    dc: &'s mut DcPin<DC>,
}

impl<'s, T, DC, PinE> Transmitter<'s, T, DC>
where
    T: Transport,
    DC: OutputPin<Error = PinE>,
{
    pub(crate) fn new(bus: &'s mut T, dc: &'s mut DcPin<DC>) -> Self {
        Transmitter { bus, dc }
    }

    /// One transaction: queue, then wait for the transport to finish it.
    fn xfer(&mut self, bytes: &[u8]) -> Result<(), Error<T::Error, PinE>> {
        self.bus.enqueue(bytes).map_err(Error::Bus)?;
        nb::block!(self.bus.poll_complete()).map_err(Error::Bus)
    }

    fn mode(&mut self, level: Level) -> Result<(), Error<T::Error, PinE>> {
        self.dc.set(level).map_err(Error::Pin)
    }

    pub fn transmit_cmd(&mut self, cmd: u8) -> Result<(), Error<T::Error, PinE>> {
        self.mode(COMMAND)?;
        self.xfer(&[cmd])
    }

    /// Send `cmd` followed by the low `len` bytes of `value`, most significant first. `len` is
    /// 1 to 4; register writes never carry more immediate data than that.
    pub fn transmit_cmd_data(
        &mut self,
        cmd: u8,
        value: u32,
        len: u8,
    ) -> Result<(), Error<T::Error, PinE>> {
        debug_assert!((1..=4).contains(&len));
        let len = usize::from(len.min(4));
        self.transmit_cmd(cmd)?;
        self.transmit_data(&value.to_be_bytes()[4 - len..])
    }

    pub fn transmit_data_u8(&mut self, value: u8) -> Result<(), Error<T::Error, PinE>> {
        self.transmit_data(&[value])
    }

    pub fn transmit_data_u16(&mut self, value: u16) -> Result<(), Error<T::Error, PinE>> {
        self.transmit_data(&value.to_be_bytes())
    }

    /// Send `value` `count` times. `chunk` is filled with the value once and then sent as many
    /// times as needed, the last transaction cut short to the remainder.
    pub fn transmit_data_repeated(
        &mut self,
        value: u16,
        count: usize,
        chunk: &mut [u8],
    ) -> Result<(), Error<T::Error, PinE>> {
        let per_chunk = chunk.len() / 2;
        if count == 0 || per_chunk == 0 {
            return Ok(());
        }
        let fill = per_chunk.min(count);
        let bytes = value.to_be_bytes();
        for px in chunk[..fill * 2].chunks_exact_mut(2) {
            px.copy_from_slice(&bytes);
        }

        let mut remaining = count;
        while remaining > 0 {
            let n = remaining.min(per_chunk);
            self.transmit_data(&chunk[..n * 2])?;
            remaining -= n;
        }
        Ok(())
    }

    /// Send `bytes` as one transaction in data mode. Empty buffers send nothing.
    pub fn transmit_data(&mut self, bytes: &[u8]) -> Result<(), Error<T::Error, PinE>> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.mode(DATA)?;
        self.xfer(bytes)
    }

    /// Send `cmd`, then read `buf.len()` bytes of response with the select line in data mode.
    pub fn read_data(&mut self, cmd: u8, buf: &mut [u8]) -> Result<(), Error<T::Error, PinE>> {
        self.transmit_cmd(cmd)?;
        self.mode(DATA)?;
        self.bus.read(buf).map_err(Error::Bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::test_spy::{Event, Sent, SpyError, TestSpy};

    #[test]
    fn command_then_data() {
        let spy = TestSpy::new();
        let mut bus = spy.bus();
        let mut dc = DcPin::new(spy.pin("dc"));
        let mut tx = Transmitter::new(&mut bus, &mut dc);
        tx.transmit_cmd(0x2C).unwrap();
        tx.transmit_data_u16(0xF800).unwrap();
        tx.transmit_data_u8(0x55).unwrap();
        #[rustfmt::skip]
        spy.check_multi(sends!(
            0x2C,
            [0xF8, 0x00],
            [0x55]
        ));
    }

    #[test]
    fn dc_pin_only_written_on_change() {
        let spy = TestSpy::new();
        let mut bus = spy.bus();
        let mut dc = DcPin::new(spy.pin("dc"));
        {
            let mut tx = Transmitter::new(&mut bus, &mut dc);
            tx.transmit_cmd(0x11).unwrap();
            tx.transmit_cmd(0x29).unwrap();
            tx.transmit_data_u8(1).unwrap();
            tx.transmit_data_u8(2).unwrap();
            tx.transmit_cmd(0x2C).unwrap();
        }
        assert_eq!(dc.level(), Some(Level::Low));
        assert_eq!(
            spy.events(),
            vec![
                Event::Pin("dc", false),
                Event::Xfer(vec![0x11]),
                Event::Xfer(vec![0x29]),
                Event::Pin("dc", true),
                Event::Xfer(vec![1]),
                Event::Xfer(vec![2]),
                Event::Pin("dc", false),
                Event::Xfer(vec![0x2C]),
            ]
        );
    }

    #[test]
    fn cmd_data_widths() {
        let spy = TestSpy::new();
        let mut bus = spy.bus();
        let mut dc = DcPin::new(spy.pin("dc"));
        let mut tx = Transmitter::new(&mut bus, &mut dc);
        tx.transmit_cmd_data(0x3A, 0x55, 1).unwrap();
        tx.transmit_cmd_data(0xC5, 0x353E, 2).unwrap();
        tx.transmit_cmd_data(0x2A, 0x0000_00EF, 4).unwrap();
        #[rustfmt::skip]
        spy.check_multi(sends!(
            0x3A, [0x55],
            0xC5, [0x35, 0x3E],
            0x2A, [0x00, 0x00, 0x00, 0xEF]
        ));
    }

    #[test]
    fn repeated_data_chunks() {
        let spy = TestSpy::new();
        let mut bus = spy.bus();
        let mut dc = DcPin::new(spy.pin("dc"));
        let mut chunk = [0u8; 8];
        let mut tx = Transmitter::new(&mut bus, &mut dc);
        tx.transmit_data_repeated(0xABCD, 5, &mut chunk).unwrap();
        #[rustfmt::skip]
        spy.check_multi(sends!(
            [0xAB, 0xCD, 0xAB, 0xCD, 0xAB, 0xCD, 0xAB, 0xCD],
            [0xAB, 0xCD]
        ));
    }

    #[test]
    fn repeated_data_shorter_than_chunk() {
        let spy = TestSpy::new();
        let mut bus = spy.bus();
        let mut dc = DcPin::new(spy.pin("dc"));
        let mut chunk = [0u8; 64];
        let mut tx = Transmitter::new(&mut bus, &mut dc);
        tx.transmit_data_repeated(0x07E0, 2, &mut chunk).unwrap();
        tx.transmit_data_repeated(0x07E0, 0, &mut chunk).unwrap();
        #[rustfmt::skip]
        spy.check_multi(sends!(
            [0x07, 0xE0, 0x07, 0xE0]
        ));
    }

    #[test]
    fn read_switches_to_data_mode() {
        let spy = TestSpy::new();
        let mut bus = spy.bus().with_id([0x85, 0x85, 0x52]);
        let mut dc = DcPin::new(spy.pin("dc"));
        let mut buf = [0u8; 3];
        Transmitter::new(&mut bus, &mut dc)
            .read_data(0x04, &mut buf)
            .unwrap();
        assert_eq!(buf, [0x85, 0x85, 0x52]);
        assert_eq!(
            spy.events(),
            vec![
                Event::Pin("dc", false),
                Event::Xfer(vec![0x04]),
                Event::Pin("dc", true),
                Event::Read(3),
            ]
        );
    }

    #[test]
    fn transport_error_propagates() {
        let spy = TestSpy::new();
        let mut bus = spy.bus().failing_after(1);
        let mut dc = DcPin::new(spy.pin("dc"));
        let mut tx = Transmitter::new(&mut bus, &mut dc);
        assert_eq!(tx.transmit_cmd(0x2C), Ok(()));
        assert_eq!(tx.transmit_data_u16(0xFFFF), Err(Error::Bus(SpyError)));
        assert_eq!(spy.transactions(), 1);
    }

    #[test]
    fn pin_error_propagates() {
        let spy = TestSpy::new();
        let mut bus = spy.bus();
        let mut dc = DcPin::new(spy.pin("dc").failing());
        let mut tx = Transmitter::new(&mut bus, &mut dc);
        assert_eq!(tx.transmit_cmd(0x2C), Err(Error::Pin(SpyError)));
        assert_eq!(spy.transactions(), 0);
        assert_eq!(dc.level(), None);
    }
}
