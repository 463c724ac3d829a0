//! `MotorREAD` and `MotorWRITE`: actuation and telemetry in a single exchange.

use {
    crate::{
        Error, FormatError, Reply,
        bus::{Bus, Expect, status_only},
        transport::Transport,
    },
    ::pmx_packet::{
        Checksum, Command, Sentinel,
        constants::{BROADCAST_ID, MAX_FRAME, MIN_LENGTH},
        frame::{self, Response, Writer},
        motion::{
            self, ControlMode, FieldMask, MAX_TARGETS, Motion, MotorSample, TorqueSwitch,
        },
    },
    paste::paste,
};

/// Splits a motion response into the torque switch byte and the requested fields.
fn decode_motion(response: Response<'_>, mask: FieldMask, mode: ControlMode) -> Result<Reply<Motion>, Error> {
    let expected = MIN_LENGTH + 1 + mask.byte_count();
    let received = MIN_LENGTH + response.payload.len();
    let mismatch = Error::MotionDecode {
        status: response.status,
        torque_switch: response.payload.first().copied(),
        expected,
        received,
    };
    let Some((&torque_switch, fields)) = response.payload.split_first() else {
        return Err(mismatch);
    };
    let Some(sample) = MotorSample::decode(mask, mode, fields) else {
        return Err(mismatch);
    };
    Ok(Reply {
        status: response.status,
        value: Motion {
            torque_switch,
            sample,
        },
    })
}

macro_rules! torque_switch_methods {
    ($($switch:ident => $name:ident),* $(,)?) => {
        paste! {
            $(
                #[doc = "Switches to `" $switch "` without asking for telemetry back."]
                #[inline]
                pub fn $name(&mut self, id: u8) -> Result<Reply<()>, Error> {
                    self.motor_write_torque(id, TorqueSwitch::$switch.byte())
                }
            )*
        }
    };
}

impl<T: Transport, C: Checksum> Bus<T, C> {
    /// Telemetry for the fields the device is configured to return.
    /// `mask` has to match that configuration; anything else is a decode error.
    #[inline]
    pub fn motor_read(&mut self, id: u8, mask: FieldMask, mode: ControlMode) -> Result<Reply<Motion>, Error> {
        let mut buffer = [0; MAX_FRAME];
        let request = frame::encode(&mut buffer, self.checksum(), id, &Command::MotorRead, 0, &[]);
        self.exchange(request, &Command::MotorRead, Expect::Variable, |response| {
            decode_motion(response, mask, mode)
        })
    }

    /// Changes the torque switch and returns only the device status.
    #[inline]
    pub fn motor_write_torque(&mut self, id: u8, switch: u8) -> Result<Reply<()>, Error> {
        self.motor_write_torque_with(id, switch, FieldMask::empty(), ControlMode::empty())
            .map(|reply| reply.map(|_| ()))
    }

    /// Changes the torque switch. With a non-empty `mask` the response carries telemetry too.
    /// `switch` must be one of the [`TorqueSwitch`] values; it is checked before anything is sent.
    #[inline]
    pub fn motor_write_torque_with(
        &mut self,
        id: u8,
        switch: u8,
        mask: FieldMask,
        mode: ControlMode,
    ) -> Result<Reply<Motion>, Error> {
        if TorqueSwitch::from_byte(switch).is_none() {
            return Err(FormatError::TorqueSwitch(switch).into());
        }
        let mut buffer = [0; MAX_FRAME];
        let request = frame::encode(&mut buffer, self.checksum(), id, &Command::MotorWrite, switch, &[]);
        self.exchange(request, &Command::MotorWrite, Expect::Variable, |response| {
            read_back(response, mask, mode)
        })
    }

    /// Sends one to three goal values, in the order position, speed, current, torque, PWM, time
    /// restricted to whatever the active control mode uses.
    #[inline]
    pub fn motor_write(
        &mut self,
        id: u8,
        targets: &[i32],
        mask: FieldMask,
        mode: ControlMode,
    ) -> Result<Reply<Motion>, Error> {
        let mut encoded = [0; 2 * MAX_TARGETS];
        let length = motion::encode_targets(targets, &mut encoded).map_err(FormatError::Targets)?;
        let mut buffer = [0; MAX_FRAME];
        let request = Writer::new(&mut buffer, id, &Command::MotorWrite, 0)
            .push(&encoded[..length])
            .finish(self.checksum());
        self.exchange(request, &Command::MotorWrite, Expect::Variable, |response| {
            read_back(response, mask, mode)
        })
    }

    #[inline(always)]
    pub fn motor_write_single(
        &mut self,
        id: u8,
        target: i32,
        mask: FieldMask,
        mode: ControlMode,
    ) -> Result<Reply<Motion>, Error> {
        self.motor_write(id, &[target], mask, mode)
    }

    #[inline(always)]
    pub fn motor_write_double(
        &mut self,
        id: u8,
        targets: [i32; 2],
        mask: FieldMask,
        mode: ControlMode,
    ) -> Result<Reply<Motion>, Error> {
        self.motor_write(id, &targets, mask, mode)
    }

    #[inline(always)]
    pub fn motor_write_triple(
        &mut self,
        id: u8,
        targets: [i32; 3],
        mask: FieldMask,
        mode: ControlMode,
    ) -> Result<Reply<Motion>, Error> {
        self.motor_write(id, &targets, mask, mode)
    }

    /// Moves to `position` under position control, no telemetry.
    #[inline]
    pub fn set_position(&mut self, id: u8, position: i16) -> Result<Reply<()>, Error> {
        self.motor_write(id, &[position.into()], FieldMask::empty(), ControlMode::POSITION)
            .map(|reply| reply.map(|_| ()))
    }

    torque_switch_methods! {
        TorqueOn => set_motor_torque_on,
        Free => set_motor_free,
        Brake => set_motor_brake,
        Hold => set_motor_hold,
    }

    /// Sends the same goal values to every device on the line. Nobody answers a broadcast.
    #[inline]
    pub fn broadcast_motor_write(&mut self, targets: &[i32]) -> Result<(), Error> {
        let mut encoded = [0; 2 * MAX_TARGETS];
        let length = motion::encode_targets(targets, &mut encoded).map_err(FormatError::Targets)?;
        let mut buffer = [0; MAX_FRAME];
        let request = Writer::new(&mut buffer, BROADCAST_ID, &Command::MotorWrite, 0)
            .push(&encoded[..length])
            .finish(self.checksum());
        self.send(request)
    }
}

/// With no fields requested the payload is ignored, apart from the torque switch byte if present.
#[inline]
fn read_back(response: Response<'_>, mask: FieldMask, mode: ControlMode) -> Result<Reply<Motion>, Error> {
    if mask.is_empty() {
        let torque_switch = response.payload.first().copied().unwrap_or(u8::SENTINEL);
        return status_only(response).map(|reply| {
            reply.map(|()| Motion {
                torque_switch,
                sample: MotorSample::SENTINEL,
            })
        });
    }
    decode_motion(response, mask, mode)
}
