//! The composite status word: a transport-level error class in the high byte
//! and the device's own status byte in the low byte.

use {core::fmt, enum_repr::EnumRepr};

pub const ERROR_MASK: u16 = 0xFF00;

#[EnumRepr(type = "u8")]
#[derive(Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(test, derive(strum_macros::VariantArray))]
pub enum ComError {
    Timeout = 0xFF,
    Crc = 0xFE,
    Format = 0xFD,
    Send = 0xFC,
    Receive = 0xFB,
    MotionDecode = 0xFA,
}

impl ComError {
    #[inline(always)]
    pub fn byte(&self) -> u8 {
        self.repr()
    }

    #[inline]
    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::from_repr(byte)
    }
}

impl fmt::Display for ComError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            Self::Timeout => "timed out",
            Self::Crc => "checksum mismatch",
            Self::Format => "malformed request",
            Self::Send => "send failed",
            Self::Receive => "malformed response",
            Self::MotionDecode => "motion data size mismatch",
        })
    }
}

bitflags::bitflags! {
    /// Condition flags a device reports in every response, independent of transport success.
    pub struct DeviceStatus: u8 {
        const SYSTEM_ERROR = 0x01;
        const MOTOR_ERROR = 0x02;
        const COMMUNICATION_ERROR = 0x04;
        const COMMAND_ERROR = 0x08;
        const RAM_ACCESS_ERROR = 0x10;
        const MODE_ERROR = 0x20;
        const DATA_ERROR = 0x40;
        const RUN_ERROR = 0x80;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DeviceStatus {
    #[inline]
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "DeviceStatus(x{=u8:02X})", self.bits())
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusCode(u16);

impl StatusCode {
    pub const OK: Self = Self(0);

    #[inline]
    pub fn new(class: Option<ComError>, device: DeviceStatus) -> Self {
        let high = class.map_or(0, |class| class.byte());
        Self(u16::from_be_bytes([high, device.bits()]))
    }

    #[inline(always)]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    #[inline(always)]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// `None` when the exchange itself succeeded.
    #[inline]
    pub fn class(self) -> Option<ComError> {
        ComError::from_byte((self.0 >> 8) as u8)
    }

    #[inline]
    pub const fn device(self) -> DeviceStatus {
        DeviceStatus::from_bits_truncate(self.0 as u8)
    }

    #[inline(always)]
    pub const fn is_ok(self) -> bool {
        self.0 & ERROR_MASK == 0
    }
}

impl From<DeviceStatus> for StatusCode {
    #[inline]
    fn from(device: DeviceStatus) -> Self {
        Self::new(None, device)
    }
}

impl fmt::Display for StatusCode {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.class() {
            None => write!(f, "ok (device status 0x{:02X})", self.device().bits()),
            Some(class) => write!(f, "{class} (device status 0x{:02X})", self.device().bits()),
        }
    }
}

/// The "no data" value an output takes when the exchange that should have produced it failed.
pub trait Sentinel: Sized {
    const SENTINEL: Self;

    /// The sentinel, keeping a torque switch byte that arrived before decoding failed.
    #[inline(always)]
    fn salvage(_torque_switch: u8) -> Self {
        Self::SENTINEL
    }
}

impl Sentinel for () {
    const SENTINEL: Self = ();
}

impl Sentinel for u8 {
    const SENTINEL: Self = 0xFF;
}

impl Sentinel for i16 {
    const SENTINEL: Self = 0x7FFF;
}

impl Sentinel for u16 {
    const SENTINEL: Self = 0x7FFF;
}

impl Sentinel for i32 {
    const SENTINEL: Self = 0x7FFF_FFFF;
}

impl Sentinel for u32 {
    const SENTINEL: Self = 0x7FFF_FFFF;
}

impl Sentinel for i64 {
    const SENTINEL: Self = 0x7FFF_FFFF;
}

impl<const N: usize> Sentinel for [u8; N] {
    const SENTINEL: Self = [0xFF; N];
}
