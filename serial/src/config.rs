use {
    core::time::Duration,
    pmx_packet::system::{Baudrate, Parity},
};

/// Which modem line switches a half-duplex transceiver to transmit.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// The adapter switches on its own.
    #[default]
    None,
    Rts,
    Dtr,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub path: String,
    pub baud_rate: u32,
    pub parity: serialport::Parity,
    /// How long a receive waits for the rest of a response.
    pub timeout: Duration,
    pub direction: Direction,
}

impl Config {
    pub const DEFAULT_BAUD_RATE: u32 = 115_200;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(100);

    #[inline]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            baud_rate: Self::DEFAULT_BAUD_RATE,
            parity: serialport::Parity::None,
            timeout: Self::DEFAULT_TIMEOUT,
            direction: Direction::None,
        }
    }

    #[inline(always)]
    #[must_use]
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Matches one of the rates a servo can be set to.
    #[inline(always)]
    #[must_use]
    pub fn baudrate(self, baudrate: Baudrate) -> Self {
        self.baud_rate(baudrate.bits_per_second())
    }

    #[inline(always)]
    #[must_use]
    pub fn parity(mut self, parity: Parity) -> Self {
        self.parity = match parity {
            Parity::None => serialport::Parity::None,
            Parity::Odd => serialport::Parity::Odd,
            Parity::Even => serialport::Parity::Even,
        };
        self
    }

    #[inline(always)]
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[inline(always)]
    #[must_use]
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }
}
