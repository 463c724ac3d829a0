//! Building outbound frames and validating inbound ones.
//!
//! Layout, both directions:
//! `[0xFE, 0xFE, id, length, command, option | status, payload.., crc_lo, crc_hi]`
//! where `length` counts every byte of the frame including the checksum.

use {
    crate::{
        command::{COMMAND_MASK, Command},
        constants::{HEADER, MAX_FRAME, MIN_LENGTH, index},
        crc::Checksum,
        status::{ComError, DeviceStatus},
    },
    core::fmt,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Mismatch8 {
    pub expected: u8,
    pub actual: u8,
}

impl fmt::Display for Mismatch8 {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { expected, actual } = *self;
        write!(f, "expected `0x{expected:02X}` but received `0x{actual:02X}`")
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Mismatch16 {
    pub expected: u16,
    pub actual: u16,
}

impl fmt::Display for Mismatch16 {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { expected, actual } = *self;
        write!(f, "expected `0x{expected:04X}` but received `0x{actual:04X}`")
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    Truncated { length: usize },
    WrongFirstHeaderByte(Mismatch8),
    WrongSecondHeaderByte(Mismatch8),
    WrongCommand(Mismatch8),
    /// `expected` is what actually arrived; `actual` is what the frame claims.
    WrongLength(Mismatch16),
    Crc(Mismatch16),
}

impl Error {
    #[inline]
    pub const fn class(&self) -> ComError {
        match *self {
            Self::Crc(_) => ComError::Crc,
            Self::Truncated { .. }
            | Self::WrongFirstHeaderByte(_)
            | Self::WrongSecondHeaderByte(_)
            | Self::WrongCommand(_)
            | Self::WrongLength(_) => ComError::Receive,
        }
    }
}

impl fmt::Display for Error {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Truncated { length } => {
                write!(f, "Frame of {length} bytes is shorter than any valid frame")
            }
            Self::WrongFirstHeaderByte(ref e) => write!(f, "Wrong first header byte: {e}"),
            Self::WrongSecondHeaderByte(ref e) => write!(f, "Wrong second header byte: {e}"),
            Self::WrongCommand(ref e) => write!(f, "Wrong command: {e}"),
            Self::WrongLength(ref e) => write!(f, "Wrong length: {e}"),
            Self::Crc(ref e) => write!(f, "CRC mismatch: {e}"),
        }
    }
}

/// A frame that passed validation, borrowed from the receive buffer.
#[derive(Debug, Eq, PartialEq)]
pub struct Response<'f> {
    pub id: u8,
    pub command: u8,
    pub status: DeviceStatus,
    pub payload: &'f [u8],
}

/// Appends a frame to a scratch buffer one piece at a time.
pub struct Writer<'b> {
    buffer: &'b mut [u8; MAX_FRAME],
    length: usize,
}

impl<'b> Writer<'b> {
    #[inline]
    pub fn new(buffer: &'b mut [u8; MAX_FRAME], id: u8, command: &Command, option: u8) -> Self {
        buffer[..index::DATA].copy_from_slice(&[HEADER, HEADER, id, 0, command.byte(), option]);
        Self {
            buffer,
            length: index::DATA,
        }
    }

    /// Callers keep payloads within the read and write limits, so this never runs off the end.
    #[inline]
    pub fn push(mut self, bytes: &[u8]) -> Self {
        let end = self.length + bytes.len();
        debug_assert!(end + 2 <= MAX_FRAME, "frame overflow");
        self.buffer[self.length..end].copy_from_slice(bytes);
        self.length = end;
        self
    }

    #[inline]
    pub fn finish(self, checksum: &impl Checksum) -> &'b [u8] {
        let Self { buffer, length } = self;
        let total = length + 2;
        buffer[index::LENGTH] = total as u8;
        let frame = &mut buffer[..total];
        checksum.seal(frame);
        frame
    }
}

#[inline]
pub fn encode<'b>(
    buffer: &'b mut [u8; MAX_FRAME],
    checksum: &impl Checksum,
    id: u8,
    command: &Command,
    option: u8,
    payload: &[u8],
) -> &'b [u8] {
    Writer::new(buffer, id, command, option)
        .push(payload)
        .finish(checksum)
}

/// Checks, in order: both header bytes, the command echo, the declared length, and the checksum.
#[inline]
pub fn validate<'f>(
    checksum: &impl Checksum,
    frame: &'f [u8],
    expected: &Command,
) -> Result<Response<'f>, Error> {
    let &[first, second, id, declared, command, status, ..] = frame else {
        return Err(Error::Truncated {
            length: frame.len(),
        });
    };
    if first != HEADER {
        return Err(Error::WrongFirstHeaderByte(Mismatch8 {
            expected: HEADER,
            actual: first,
        }));
    }
    if second != HEADER {
        return Err(Error::WrongSecondHeaderByte(Mismatch8 {
            expected: HEADER,
            actual: second,
        }));
    }
    if !expected.matches(command) {
        return Err(Error::WrongCommand(Mismatch8 {
            expected: expected.byte() & COMMAND_MASK,
            actual: command,
        }));
    }
    if frame.len() < MIN_LENGTH {
        return Err(Error::Truncated {
            length: frame.len(),
        });
    }
    if declared as usize != frame.len() {
        return Err(Error::WrongLength(Mismatch16 {
            expected: frame.len() as u16,
            actual: declared as u16,
        }));
    }
    let () = checksum.verify(frame).map_err(Error::Crc)?;
    Ok(Response {
        id,
        command,
        status: DeviceStatus::from_bits_truncate(status),
        payload: &frame[index::DATA..frame.len() - 2],
    })
}
