use {
    crate::{Error, FormatError, Reply, transport::Transport},
    ::pmx_packet::{
        Checksum, Command, Xmodem,
        constants::{MAX_FRAME, MIN_LENGTH, READ_LIMIT, WRITE_LIMIT},
        frame::{self, Response, Writer},
        motion::{ControlMode, TorqueSwitch},
        register::{self, Descriptor, ErrorReport, Register, Scalar, WriteOpt},
    },
    paste::paste,
};

/// How many bytes to wait for after a request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Expect {
    Fixed(usize),
    /// Whatever the response's own length field says.
    Variable,
}

/// One half-duplex line and the checksum its devices speak.
pub struct Bus<T: Transport, C: Checksum = Xmodem> {
    transport: T,
    checksum: C,
}

macro_rules! scalar_methods {
    ($($t:ident),*) => {
        paste! {
            $(
                #[inline]
                pub fn [< mem_read_ $t >](&mut self, id: u8, address: u16) -> Result<Reply<$t>, Error> {
                    self.read_scalar::<$t>(id, address)
                }

                #[inline]
                pub fn [< mem_write_ $t >](
                    &mut self,
                    id: u8,
                    address: u16,
                    value: $t,
                    option: WriteOpt,
                ) -> Result<Reply<()>, Error> {
                    self.write_scalar(id, address, value, option)
                }
            )*
        }
    };
}

impl<T: Transport> Bus<T> {
    #[inline(always)]
    pub const fn new(transport: T) -> Self {
        Self {
            transport,
            checksum: Xmodem::new(),
        }
    }
}

impl<T: Transport, C: Checksum> Bus<T, C> {
    #[inline(always)]
    pub const fn with_checksum(transport: T, checksum: C) -> Self {
        Self {
            transport,
            checksum,
        }
    }

    #[inline(always)]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    #[inline(always)]
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    #[inline(always)]
    pub fn into_inner(self) -> T {
        self.transport
    }

    #[inline(always)]
    pub(crate) fn checksum(&self) -> &C {
        &self.checksum
    }

    /// Sends an encoded request, waits for the response, validates it, and hands it to `decode`.
    #[inline]
    pub(crate) fn exchange<R>(
        &mut self,
        request: &[u8],
        command: &Command,
        expect: Expect,
        decode: impl FnOnce(Response<'_>) -> Result<R, Error>,
    ) -> Result<R, Error> {
        log::trace!("tx {request:02X?}");
        let mut buffer = [0; MAX_FRAME];
        let received = match expect {
            Expect::Fixed(length) => self
                .transport
                .round_trip_fixed(request, &mut buffer[..length])
                .map(|()| length),
            Expect::Variable => self.transport.round_trip_variable(request, &mut buffer),
        }
        .map_err(|incomplete| {
            log::debug!(
                "No complete response to {command:?} ({} bytes received)",
                incomplete.received
            );
            Error::Timeout {
                received: incomplete.received,
            }
        })?;
        let response = &buffer[..received];
        log::trace!("rx {response:02X?}");
        let response = frame::validate(&self.checksum, response, command).map_err(|e| {
            match e {
                frame::Error::Crc(_) => log::warn!("Response to {command:?}: {e}"),
                _ => log::debug!("Response to {command:?}: {e}"),
            }
            Error::Frame(e)
        })?;
        decode(response)
    }

    /// Sends an encoded request that no device answers.
    #[inline]
    pub(crate) fn send(&mut self, request: &[u8]) -> Result<(), Error> {
        log::trace!("tx {request:02X?}");
        if self.transport.send_only(request) {
            Ok(())
        } else {
            Err(Error::Send)
        }
    }

    /// A command with neither payload nor response data.
    #[inline]
    pub(crate) fn simple(&mut self, id: u8, command: &Command, payload: &[u8]) -> Result<Reply<()>, Error> {
        let mut buffer = [0; MAX_FRAME];
        let request = frame::encode(&mut buffer, &self.checksum, id, command, 0, payload);
        self.exchange(request, command, Expect::Fixed(MIN_LENGTH), status_only)
    }

    /// Reads `out.len()` bytes starting at `address`. On any failure `out` is filled with `0xFF`.
    #[inline]
    pub fn mem_read(&mut self, id: u8, address: u16, out: &mut [u8]) -> Result<Reply<()>, Error> {
        let result = self.try_mem_read(id, address, out);
        if result.is_err() {
            out.fill(0xFF);
        }
        result
    }

    #[inline]
    fn try_mem_read(&mut self, id: u8, address: u16, out: &mut [u8]) -> Result<Reply<()>, Error> {
        let size = out.len();
        if size == 0 || size >= READ_LIMIT {
            return Err(FormatError::ReadSize(size).into());
        }
        let mut buffer = [0; MAX_FRAME];
        let request = Writer::new(&mut buffer, id, &Command::MemRead, 0)
            .push(&address.to_le_bytes())
            .push(&[size as u8])
            .finish(&self.checksum);
        self.exchange(
            request,
            &Command::MemRead,
            Expect::Fixed(MIN_LENGTH + size),
            |response| {
                out.copy_from_slice(response.payload);
                Ok(Reply {
                    status: response.status,
                    value: (),
                })
            },
        )
    }

    #[inline]
    pub fn mem_write(
        &mut self,
        id: u8,
        address: u16,
        data: &[u8],
        option: WriteOpt,
    ) -> Result<Reply<()>, Error> {
        if data.is_empty() || data.len() >= WRITE_LIMIT {
            return Err(FormatError::WriteSize(data.len()).into());
        }
        let mut buffer = [0; MAX_FRAME];
        let request = Writer::new(&mut buffer, id, &Command::MemWrite, option as u8)
            .push(&address.to_le_bytes())
            .push(data)
            .finish(&self.checksum);
        self.exchange(
            request,
            &Command::MemWrite,
            Expect::Fixed(MIN_LENGTH),
            status_only,
        )
    }

    #[inline]
    pub fn read_scalar<S: Scalar>(&mut self, id: u8, address: u16) -> Result<Reply<S>, Error> {
        let mut bytes = [0; 4];
        let bytes = &mut bytes[..S::BYTES];
        self.mem_read(id, address, bytes)
            .map(|reply| reply.map(|()| S::decode_le(bytes)))
    }

    #[inline]
    pub fn write_scalar<S: Scalar>(
        &mut self,
        id: u8,
        address: u16,
        value: S,
        option: WriteOpt,
    ) -> Result<Reply<()>, Error> {
        self.mem_write(id, address, &value.encode_le()[..S::BYTES], option)
    }

    scalar_methods!(u8, i16, u16, i32, u32);

    #[inline]
    pub fn read<R: Register>(&mut self, id: u8) -> Result<Reply<R::Value>, Error> {
        self.read_scalar(id, R::ADDRESS)
    }

    #[inline]
    pub fn write<R: Register>(
        &mut self,
        id: u8,
        value: R::Value,
        option: WriteOpt,
    ) -> Result<Reply<()>, Error> {
        self.write_scalar(id, R::ADDRESS, value, option)
    }

    /// Reads any table entry, widened according to its width and signedness.
    #[inline]
    pub fn read_descriptor(&mut self, id: u8, descriptor: &Descriptor) -> Result<Reply<i64>, Error> {
        let size = usize::from(descriptor.bytes);
        if !descriptor.is_decodable() {
            return Err(FormatError::ReadSize(size).into());
        }
        let mut bytes = [0; 4];
        let bytes = &mut bytes[..size];
        let reply = self.mem_read(id, descriptor.address, bytes)?;
        let value = descriptor
            .decode(bytes)
            .ok_or(Error::Format(FormatError::ReadSize(size)))?;
        Ok(reply.map(|()| value))
    }

    /// Reads the latched error block, which also clears it on the device.
    #[inline]
    pub fn error_report(&mut self, id: u8) -> Result<Reply<ErrorReport>, Error> {
        let mut bytes = [0; ErrorReport::BYTES];
        let reply = self.mem_read(id, ErrorReport::ADDRESS, &mut bytes)?;
        Ok(reply.map(|()| ErrorReport::decode(&bytes)))
    }

    /// Writes the torque switch register directly, even while the motor is driven.
    #[inline]
    pub fn set_torque_switch(&mut self, id: u8, switch: TorqueSwitch) -> Result<Reply<()>, Error> {
        self.write::<register::TorqueSwitch>(id, switch.byte(), WriteOpt::Force)
    }

    /// Present position, signed only under position control.
    #[inline]
    pub fn position(&mut self, id: u8, mode: ControlMode) -> Result<Reply<i32>, Error> {
        if mode.contains(ControlMode::POSITION) {
            self.read::<register::NowPosition>(id)
                .map(|reply| reply.map(i32::from))
        } else {
            self.read_scalar::<u16>(id, register::NowPosition::ADDRESS)
                .map(|reply| reply.map(i32::from))
        }
    }
}

#[inline(always)]
pub(crate) fn status_only(response: Response<'_>) -> Result<Reply<()>, Error> {
    Ok(Reply {
        status: response.status,
        value: (),
    })
}
