/// Settings handed to the transport when this driver owns initialization of the bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusSettings {
    pub bus_index: u8,
    pub clock_hz: u32,
    /// `None` when pixel data is moved without DMA.
    pub dma_channel: Option<u8>,
    /// The largest single transaction the driver will queue.
    pub max_transfer_bytes: usize,
}

/// The bus transport underneath the display: queues byte transactions, reports their completion,
/// and clocks bytes back in. The data/command and chip-select lines are not part of the
/// transport; the driver drives them around each transaction.
pub trait Transport {
    type Error;

    /// Bring up the bus. Only called when the display's configuration says this driver owns the
    /// bus; otherwise the bus is assumed to be initialized by someone else.
    fn init_bus(&mut self, _settings: &BusSettings) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Queue `bytes` as one bus transaction.
    fn enqueue(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Poll for completion of everything queued so far.
    fn poll_complete(&mut self) -> nb::Result<(), Self::Error>;

    /// Clock `buf.len()` bytes in from the device.
    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;
}

pub mod spi {
    //! Transport over a blocking embedded-hal SPI master. Every transaction has completed by the
    //! time `enqueue` returns, so there is never anything to wait for.

    use log::debug;

    use super::{BusSettings, Transport};

    pub struct SpiInterface<SPI> {
        /// The SPI master device connected to the panel controller.
        spi: SPI,
    }

    impl<SPI, E> SpiInterface<SPI>
    where
        SPI: hal::blocking::spi::Write<u8, Error = E> + hal::blocking::spi::Transfer<u8, Error = E>,
    {
        pub fn new(spi: SPI) -> Self {
            Self { spi }
        }

        pub fn release(self) -> SPI {
            self.spi
        }
    }

    impl<SPI, E> Transport for SpiInterface<SPI>
    where
        SPI: hal::blocking::spi::Write<u8, Error = E> + hal::blocking::spi::Transfer<u8, Error = E>,
    {
        type Error = E;

        /// The SPI master arrives already configured by its HAL, so there is nothing to do.
        fn init_bus(&mut self, settings: &BusSettings) -> Result<(), E> {
            debug!(
                "bus {} already configured by the SPI master, skipping init",
                settings.bus_index
            );
            Ok(())
        }

        fn enqueue(&mut self, bytes: &[u8]) -> Result<(), E> {
            self.spi.write(bytes)
        }

        fn poll_complete(&mut self) -> nb::Result<(), E> {
            Ok(())
        }

        fn read(&mut self, buf: &mut [u8]) -> Result<(), E> {
            for b in buf.iter_mut() {
                *b = 0;
            }
            self.spi.transfer(buf)?;
            Ok(())
        }
    }

}
