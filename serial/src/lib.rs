//! PMX servos on a host serial port.

mod config;
mod transmit_enable;

pub use config::{Config, Direction};

use {
    core::time::Duration,
    pmx_driver::{Bus, Link, Port},
    serialport::{ClearBuffer, DataBits, SerialPort, StopBits},
    std::{
        io::{self, Read, Write},
        time::Instant,
    },
    transmit_enable::TransmitEnable,
};

/// Opens `config.path` and wraps it in a bus.
#[inline]
pub fn open(config: &Config) -> serialport::Result<Bus<Link<Serial>>> {
    Serial::open(config).map(|serial| Bus::new(Link::new(serial)))
}

/// Names of the serial ports on this machine.
#[inline]
pub fn ports() -> Vec<String> {
    match serialport::available_ports() {
        Ok(ports) => ports.into_iter().map(|port| port.port_name).collect(),
        Err(e) => {
            log::warn!("Couldn't list serial ports: {e}");
            vec![]
        }
    }
}

pub struct Serial {
    port: Box<dyn SerialPort>,
    direction: Direction,
    timeout: Duration,
}

impl Serial {
    #[inline]
    pub fn open(config: &Config) -> serialport::Result<Self> {
        let port = serialport::new(&config.path, config.baud_rate)
            .data_bits(DataBits::Eight)
            .stop_bits(StopBits::One)
            .parity(config.parity)
            .timeout(config.timeout)
            .open()?;
        log::debug!(
            "Opened {} at {} baud ({:?} parity)",
            config.path,
            config.baud_rate,
            config.parity,
        );
        let mut serial = Self {
            port,
            direction: config.direction,
            timeout: config.timeout,
        };
        // Start out listening.
        drop(TransmitEnable::new(&mut *serial.port, serial.direction)?);
        Ok(serial)
    }

    /// Follows a `set_baudrate` on the device once it has rebooted.
    #[inline]
    pub fn set_baud_rate(&mut self, baud_rate: u32) -> serialport::Result<()> {
        self.port.set_baud_rate(baud_rate)
    }

    #[inline(always)]
    pub fn port(&self) -> &dyn SerialPort {
        &*self.port
    }
}

impl Port for Serial {
    type Error = io::Error;

    #[inline]
    fn transmit(&mut self, bytes: &[u8]) -> io::Result<()> {
        // Anything left over belongs to an exchange that already gave up.
        let () = self.port.clear(ClearBuffer::Input)?;
        let mut port = TransmitEnable::new(&mut *self.port, self.direction)?;
        let () = port.write_all(bytes)?;
        let () = port.flush()?;
        // A half-duplex line hears its own transmission.
        let () = port.clear(ClearBuffer::Input)?;
        Ok(())
    }

    #[inline]
    fn receive(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        let deadline = Instant::now() + self.timeout;
        let mut received = 0;
        while received < buffer.len() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            let () = self.port.set_timeout(remaining)?;
            match self.port.read(&mut buffer[received..]) {
                Ok(0) => break,
                Ok(n) => received += n,
                Err(e) if e.kind() == io::ErrorKind::TimedOut => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(received)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn missing_device() {
        assert!(open(&Config::new("/dev/pmx-serial-does-not-exist")).is_err());
    }
}
