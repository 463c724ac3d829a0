use {crate::status::Sentinel, enum_repr::EnumRepr};

/// Identity block returned by `SystemREAD`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SystemInfo {
    pub serial: [u8; 4],
    pub model: u16,
    pub series: u16,
    /// Major, minor, patch, build.
    pub version: [u8; 4],
    pub response_time: u8,
}

impl SystemInfo {
    pub const BYTES: usize = 13;

    #[inline]
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let &[
            s0,
            s1,
            s2,
            s3,
            model_lo,
            model_hi,
            series_lo,
            series_hi,
            v0,
            v1,
            v2,
            v3,
            response_time,
        ] = bytes
        else {
            return None;
        };
        Some(Self {
            serial: [s0, s1, s2, s3],
            model: u16::from_le_bytes([model_lo, model_hi]),
            series: u16::from_le_bytes([series_lo, series_hi]),
            version: [v0, v1, v2, v3],
            response_time,
        })
    }
}

impl Sentinel for SystemInfo {
    const SENTINEL: Self = Self {
        serial: [0xFF; 4],
        model: u16::SENTINEL,
        series: u16::SENTINEL,
        version: [0xFF; 4],
        response_time: u8::SENTINEL,
    };
}

bitflags::bitflags! {
    /// Which of the `SystemWRITE` fields the device should apply.
    pub struct SystemWriteOptions: u8 {
        const ID = 0x01;
        const BAUDRATE = 0x02;
        const PARITY = 0x04;
        const RESPONSE_TIME = 0x08;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SystemWriteOptions {
    #[inline]
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "SystemWriteOptions(x{=u8:02X})", self.bits())
    }
}

#[EnumRepr(type = "u8")]
#[derive(Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Baudrate {
    B57600 = 0x00,
    B115200 = 0x01,
    B625000 = 0x02,
    B1000000 = 0x03,
    B1250000 = 0x04,
    B1500000 = 0x05,
    B2000000 = 0x06,
    B3000000 = 0x07,
}

impl Baudrate {
    #[inline(always)]
    pub fn byte(&self) -> u8 {
        self.repr()
    }

    #[inline]
    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::from_repr(byte)
    }

    #[inline]
    pub fn bits_per_second(&self) -> u32 {
        match *self {
            Self::B57600 => 57_600,
            Self::B115200 => 115_200,
            Self::B625000 => 625_000,
            Self::B1000000 => 1_000_000,
            Self::B1250000 => 1_250_000,
            Self::B1500000 => 1_500_000,
            Self::B2000000 => 2_000_000,
            Self::B3000000 => 3_000_000,
        }
    }
}

#[EnumRepr(type = "u8")]
#[derive(Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None = 0x00,
    Odd = 0x01,
    Even = 0x02,
}

impl Parity {
    #[inline(always)]
    pub fn byte(&self) -> u8 {
        self.repr()
    }

    #[inline]
    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::from_repr(byte)
    }
}

/// The new values a `SystemWRITE` carries. Fields not selected by the options are ignored by the device.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SystemSettings {
    pub id: u8,
    pub baudrate: u8,
    pub parity: u8,
    pub response_time: u8,
}

impl SystemSettings {
    #[inline(always)]
    pub const fn to_bytes(self) -> [u8; 4] {
        [self.id, self.baudrate, self.parity, self.response_time]
    }
}
