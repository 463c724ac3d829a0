//! Flash persistence, identity, link settings, and resets.

use {
    crate::{
        Error, FormatError, Reply,
        bus::{Bus, Expect},
        transport::Transport,
    },
    ::pmx_packet::{
        Checksum, Command, Sentinel,
        constants::{MAX_FRAME, MAX_ID, MIN_LENGTH},
        frame::{self, Writer},
        system::{Baudrate, Parity, SystemInfo, SystemSettings, SystemWriteOptions},
    },
};

impl<T: Transport, C: Checksum> Bus<T, C> {
    /// Loads the saved settings from flash into working memory.
    #[inline(always)]
    pub fn load(&mut self, id: u8) -> Result<Reply<()>, Error> {
        self.simple(id, &Command::Load, &[])
    }

    /// Saves working memory to flash.
    #[inline(always)]
    pub fn save(&mut self, id: u8) -> Result<Reply<()>, Error> {
        self.simple(id, &Command::Save, &[])
    }

    #[inline]
    pub fn system_read(&mut self, id: u8) -> Result<Reply<SystemInfo>, Error> {
        let mut buffer = [0; MAX_FRAME];
        let request = frame::encode(&mut buffer, self.checksum(), id, &Command::SystemRead, 0, &[]);
        self.exchange(
            request,
            &Command::SystemRead,
            Expect::Fixed(MIN_LENGTH + SystemInfo::BYTES),
            |response| {
                // A fixed-length receive that validated has exactly `BYTES` of payload.
                let info = SystemInfo::decode(response.payload).unwrap_or(SystemInfo::SENTINEL);
                Ok(Reply {
                    status: response.status,
                    value: info,
                })
            },
        )
    }

    /// Applies the fields of `settings` selected by `options`. The device ignores the request
    /// unless `serial` is its own serial number.
    #[inline]
    pub fn system_write(
        &mut self,
        id: u8,
        serial: [u8; 4],
        options: SystemWriteOptions,
        settings: SystemSettings,
    ) -> Result<Reply<()>, Error> {
        let mut buffer = [0; MAX_FRAME];
        let request = Writer::new(&mut buffer, id, &Command::SystemWrite, options.bits())
            .push(&serial)
            .push(&settings.to_bytes())
            .finish(self.checksum());
        self.exchange(
            request,
            &Command::SystemWrite,
            Expect::Fixed(MIN_LENGTH),
            crate::bus::status_only,
        )
    }

    /// Reads the serial number, then writes a single setting with it.
    #[inline]
    fn update(
        &mut self,
        id: u8,
        options: SystemWriteOptions,
        settings: SystemSettings,
    ) -> Result<Reply<()>, Error> {
        let serial = self.system_read(id)?.value.serial;
        self.system_write(id, serial, options, settings)
    }

    #[inline]
    pub fn set_id(&mut self, id: u8, new_id: u8) -> Result<Reply<()>, Error> {
        if new_id > MAX_ID {
            return Err(FormatError::Id(new_id).into());
        }
        self.update(
            id,
            SystemWriteOptions::ID,
            SystemSettings {
                id: new_id,
                ..SystemSettings::default()
            },
        )
    }

    /// Takes effect after a reboot.
    #[inline]
    pub fn set_baudrate(&mut self, id: u8, baudrate: Baudrate) -> Result<Reply<()>, Error> {
        self.update(
            id,
            SystemWriteOptions::BAUDRATE,
            SystemSettings {
                baudrate: baudrate.byte(),
                ..SystemSettings::default()
            },
        )
    }

    /// Takes effect after a reboot.
    #[inline]
    pub fn set_parity(&mut self, id: u8, parity: Parity) -> Result<Reply<()>, Error> {
        self.update(
            id,
            SystemWriteOptions::PARITY,
            SystemSettings {
                parity: parity.byte(),
                ..SystemSettings::default()
            },
        )
    }

    #[inline]
    pub fn set_response_time(&mut self, id: u8, response_time: u8) -> Result<Reply<()>, Error> {
        if response_time == 0 {
            return Err(FormatError::ResponseTime(response_time).into());
        }
        self.update(
            id,
            SystemWriteOptions::RESPONSE_TIME,
            SystemSettings {
                response_time,
                ..SystemSettings::default()
            },
        )
    }

    /// Restarts the device after `delay_ms`. It answers nothing until its parameters are reloaded.
    #[inline]
    pub fn reboot(&mut self, id: u8, delay_ms: u16) -> Result<Reply<()>, Error> {
        self.simple(id, &Command::Reboot, &delay_ms.to_le_bytes())
    }

    /// Without a `serial`, reads the device's own first.
    #[inline]
    pub fn factory_reset(&mut self, id: u8, serial: Option<[u8; 4]>) -> Result<Reply<()>, Error> {
        let serial = match serial {
            Some(serial) => serial,
            None => self.system_read(id)?.value.serial,
        };
        self.simple(id, &Command::FactoryReset, &serial)
    }
}
