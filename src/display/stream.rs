//! Pixel streaming through the chunk buffer.

use hal::digital::v2::OutputPin;

use crate::error::Error;
use crate::interface::Transport;
use crate::transmit::Transmitter;

/// Stream the pixels of `rows`, in order, as consecutive transactions of at most `chunk.len()`
/// bytes. Rows are packed back to back, so a transaction may span the end of one row and the
/// start of the next. With `swap` each value goes out most significant byte first, as the panel
/// expects; without it the value's in-memory little-endian bytes are sent unchanged.
pub fn stream_rows<'p, T, DC, PinE, I>(
    tx: &mut Transmitter<'_, T, DC>,
    rows: I,
    swap: bool,
    chunk: &mut [u8],
) -> Result<(), Error<T::Error, PinE>>
where
    T: Transport,
    DC: OutputPin<Error = PinE>,
    I: IntoIterator<Item = &'p [u16]>,
{
    let cap = chunk.len() & !1;
    if cap == 0 {
        return Ok(());
    }
    let mut fill = 0;
    for row in rows {
        for &px in row {
            let bytes = if swap {
                px.to_be_bytes()
            } else {
                px.to_le_bytes()
            };
            chunk[fill..fill + 2].copy_from_slice(&bytes);
            fill += 2;
            if fill == cap {
                tx.transmit_data(&chunk[..fill])?;
                fill = 0;
            }
        }
    }
    tx.transmit_data(&chunk[..fill])
}
