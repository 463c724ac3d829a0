#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod bus;
pub mod motor;
pub mod mutex;
pub mod servo;
pub mod system;
pub mod transport;

#[cfg(test)]
mod test_util;

pub use {
    bus::Bus,
    servo::Servo,
    transport::{Incomplete, Link, Port, Transport},
};

use {
    ::pmx_packet::{ComError, DeviceStatus, Sentinel, StatusCode, frame, motion::TargetError},
    core::fmt,
};

/// A request rejected before anything touched the wire.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FormatError {
    ReadSize(usize),
    WriteSize(usize),
    TorqueSwitch(u8),
    Targets(TargetError),
    Id(u8),
    ResponseTime(u8),
}

impl fmt::Display for FormatError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ReadSize(n) => write!(f, "Can't read {n} bytes in one request"),
            Self::WriteSize(n) => write!(f, "Can't write {n} bytes in one request"),
            Self::TorqueSwitch(byte) => write!(f, "`0x{byte:02X}` is not a torque switch value"),
            Self::Targets(ref e) => fmt::Display::fmt(e, f),
            Self::Id(id) => write!(f, "{id} is not an assignable servo ID"),
            Self::ResponseTime(t) => write!(f, "Response time {t} is out of range"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Another exchange already holds the bus.
    Busy,
    Timeout { received: usize },
    Format(FormatError),
    Send,
    Frame(frame::Error),
    /// The frame was fine but its payload didn't match the requested fields.
    MotionDecode {
        status: DeviceStatus,
        /// The first payload byte, if there was one.
        torque_switch: Option<u8>,
        expected: usize,
        received: usize,
    },
}

impl Error {
    #[inline]
    pub const fn class(&self) -> ComError {
        match *self {
            Self::Busy | Self::Timeout { .. } => ComError::Timeout,
            Self::Format(_) => ComError::Format,
            Self::Send => ComError::Send,
            Self::Frame(ref e) => e.class(),
            Self::MotionDecode { .. } => ComError::MotionDecode,
        }
    }

    /// The composite status word; only a motion decode failure keeps the device byte.
    #[inline]
    pub fn code(&self) -> StatusCode {
        let device = match *self {
            Self::MotionDecode { status, .. } => status,
            _ => DeviceStatus::empty(),
        };
        StatusCode::new(Some(self.class()), device)
    }
}

impl From<FormatError> for Error {
    #[inline(always)]
    fn from(e: FormatError) -> Self {
        Self::Format(e)
    }
}

impl From<frame::Error> for Error {
    #[inline(always)]
    fn from(e: frame::Error) -> Self {
        Self::Frame(e)
    }
}

impl fmt::Display for Error {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Busy => write!(f, "Bus is busy with another exchange"),
            Self::Timeout { received } => {
                write!(f, "Timed out waiting for a response ({received} bytes received)")
            }
            Self::Format(ref e) => write!(f, "Malformed request: {e}"),
            Self::Send => write!(f, "Couldn't send the request"),
            Self::Frame(ref e) => write!(f, "Invalid response: {e}"),
            Self::MotionDecode {
                expected, received, ..
            } => write!(
                f,
                "Motion response of {received} bytes; expected {expected} for the requested fields"
            ),
        }
    }
}

#[cfg(any(test, feature = "std"))]
impl std::error::Error for Error {}

/// A successful exchange: what the device reported about itself, and what it sent back.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reply<T> {
    pub status: DeviceStatus,
    pub value: T,
}

impl<T> Reply<T> {
    #[inline(always)]
    pub fn code(&self) -> StatusCode {
        self.status.into()
    }

    #[inline]
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Reply<U> {
        Reply {
            status: self.status,
            value: f(self.value),
        }
    }
}

/// Collapses a result into a status word plus a value, substituting the sentinel on failure.
/// A motion decode failure still hands back the torque switch byte the device sent.
#[inline]
pub fn flatten<T: Sentinel>(result: Result<Reply<T>, Error>) -> (StatusCode, T) {
    match result {
        Ok(reply) => (reply.code(), reply.value),
        Err(e) => {
            let value = match e {
                Error::MotionDecode {
                    torque_switch: Some(torque_switch),
                    ..
                } => T::salvage(torque_switch),
                _ => T::SENTINEL,
            };
            (e.code(), value)
        }
    }
}
