use crate::frame::Mismatch16;

/// A 16-bit frame checksum, appended little-endian after everything it covers.
pub trait Checksum {
    fn checksum(&self, bytes: &[u8]) -> u16;

    /// Writes the checksum of everything but the last two bytes into the last two bytes.
    #[inline]
    fn seal(&self, frame: &mut [u8]) {
        let Some(split) = frame.len().checked_sub(2) else {
            return;
        };
        let (covered, tail) = frame.split_at_mut(split);
        tail.copy_from_slice(&self.checksum(covered).to_le_bytes());
    }

    #[inline]
    fn verify(&self, frame: &[u8]) -> Result<(), Mismatch16> {
        let Some(split) = frame.len().checked_sub(2) else {
            return Err(Mismatch16 {
                expected: 0,
                actual: 0,
            });
        };
        let (covered, tail) = frame.split_at(split);
        let expected = self.checksum(covered);
        let actual = u16::from_le_bytes([tail[0], tail[1]]);
        if expected == actual {
            Ok(())
        } else {
            Err(Mismatch16 { expected, actual })
        }
    }
}

impl<C: Checksum + ?Sized> Checksum for &C {
    #[inline(always)]
    fn checksum(&self, bytes: &[u8]) -> u16 {
        C::checksum(self, bytes)
    }
}

/// CRC-16/XMODEM: polynomial 0x1021, zero initial value, no reflection.
pub struct Xmodem(crc::Crc<u16>);

impl Xmodem {
    #[inline(always)]
    pub const fn new() -> Self {
        Self(crc::Crc::<u16>::new(&crc::CRC_16_XMODEM))
    }
}

impl Default for Xmodem {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl Checksum for Xmodem {
    #[inline]
    fn checksum(&self, bytes: &[u8]) -> u16 {
        self.0.checksum(bytes)
    }
}
