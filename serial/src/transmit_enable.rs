use {
    crate::config::Direction,
    core::ops::{Deref, DerefMut},
    serialport::SerialPort,
};

/// Holds the direction line high for as long as it lives.
pub struct TransmitEnable<'port> {
    port: &'port mut dyn SerialPort,
    direction: Direction,
}

impl<'port> TransmitEnable<'port> {
    #[inline]
    pub fn new(port: &'port mut dyn SerialPort, direction: Direction) -> serialport::Result<Self> {
        let () = set(port, direction, true)?;
        Ok(Self { port, direction })
    }
}

impl<'port> Deref for TransmitEnable<'port> {
    type Target = dyn SerialPort + 'port;

    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        &*self.port
    }
}

impl<'port> DerefMut for TransmitEnable<'port> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.port
    }
}

impl Drop for TransmitEnable<'_> {
    #[inline]
    fn drop(&mut self) {
        if let Err(e) = set(&mut *self.port, self.direction, false) {
            log::error!("Couldn't release the {:?} line: {e}", self.direction);
        }
    }
}

#[inline]
fn set(port: &mut dyn SerialPort, direction: Direction, level: bool) -> serialport::Result<()> {
    match direction {
        Direction::None => Ok(()),
        Direction::Rts => port.write_request_to_send(level),
        Direction::Dtr => port.write_data_terminal_ready(level),
    }
}
