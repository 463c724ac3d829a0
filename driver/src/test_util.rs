//! Stand-ins for real hardware.

use {
    crate::transport::{Incomplete, Port, Transport},
    ::pmx_packet::{
        Checksum, Command, DeviceStatus, Xmodem,
        command::COMMAND_MASK,
        constants::{BROADCAST_ID, HEADER, MAX_FRAME, MIN_LENGTH, PREFIX_LENGTH},
        motion::{Field, FieldMask, TorqueSwitch},
        register::{ErrorReport, WriteOpt},
        system::{SystemSettings, SystemWriteOptions},
    },
    core::convert::Infallible,
    std::collections::VecDeque,
    strum::VariantArray,
};

const MEMORY: usize = 1024;
const TORQUE_SWITCH: usize = 500;

/// A response frame as a device would send it: command echoed without its top bit.
pub fn frame(id: u8, command: &Command, status: u8, payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![
        HEADER,
        HEADER,
        id,
        (MIN_LENGTH + payload.len()) as u8,
        command.byte() & COMMAND_MASK,
        status,
    ];
    frame.extend_from_slice(payload);
    frame.extend_from_slice(&[0, 0]);
    Xmodem::new().seal(&mut frame);
    frame
}

/// A simulated servo on the other end of a line.
pub struct Device {
    pub id: u8,
    pub memory: Vec<u8>,
    pub status: DeviceStatus,
    /// Which telemetry fields motion responses carry.
    pub receive: FieldMask,
    /// Raw wire values, in field order.
    pub telemetry: [u16; 8],
    pub serial: [u8; 4],
    pub settings: SystemSettings,
    /// The goal values of the last addressed or broadcast `MotorWRITE`.
    pub goals: Vec<u16>,
    pub requests: Vec<Vec<u8>>,
    pub exchanges: usize,
    silent: bool,
    truncate: usize,
    pending: VecDeque<u8>,
}

impl Device {
    pub fn new(id: u8) -> Self {
        let mut memory = vec![0; MEMORY];
        memory[TORQUE_SWITCH] = TorqueSwitch::Free.byte();
        Self {
            id,
            memory,
            status: DeviceStatus::empty(),
            receive: FieldMask::empty(),
            telemetry: [0; 8],
            serial: [0x01, 0x02, 0x03, 0x04],
            settings: SystemSettings {
                id,
                baudrate: 0x01,
                parity: 0x00,
                response_time: 1,
            },
            goals: vec![],
            requests: vec![],
            exchanges: 0,
            silent: false,
            truncate: 0,
            pending: VecDeque::new(),
        }
    }

    /// Never answers.
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    /// Drops the last `n` bytes of every answer.
    pub fn truncate(mut self, n: usize) -> Self {
        self.truncate = n;
        self
    }

    pub fn with_serial(mut self, serial: [u8; 4]) -> Self {
        self.serial = serial;
        self
    }

    pub fn torque_switch(&self) -> u8 {
        self.memory[TORQUE_SWITCH]
    }

    fn motion_payload(&self) -> Vec<u8> {
        let mut payload = vec![self.torque_switch()];
        for &field in Field::VARIANTS {
            if self.receive.contains(field.mask()) {
                payload.extend_from_slice(&self.telemetry[field as usize].to_le_bytes());
            }
        }
        payload
    }

    /// Status and payload of the answer, or `None` for no answer.
    fn handle(&mut self, command: &Command, option: u8, payload: &[u8]) -> Option<(DeviceStatus, Vec<u8>)> {
        let mut status = self.status;
        let data = match *command {
            Command::MemRead => {
                let &[lo, hi, size] = payload else {
                    return None;
                };
                let start = usize::from(u16::from_le_bytes([lo, hi]));
                let range = start..start + usize::from(size);
                let data = self.memory.get(range.clone())?.to_vec();
                if range.contains(&usize::from(ErrorReport::ADDRESS)) {
                    let errors = usize::from(ErrorReport::ADDRESS);
                    self.memory[errors..errors + ErrorReport::BYTES].fill(0);
                }
                data
            }
            Command::MemWrite => {
                let (&[lo, hi], data) = payload.split_first_chunk::<2>()?;
                let start = usize::from(u16::from_le_bytes([lo, hi]));
                let locked = self.torque_switch() == TorqueSwitch::TorqueOn.byte()
                    && option == WriteOpt::Normal as u8;
                if locked {
                    status |= DeviceStatus::MODE_ERROR;
                } else {
                    self.memory.get_mut(start..start + data.len())?.copy_from_slice(data);
                }
                vec![]
            }
            Command::MotorRead => self.motion_payload(),
            Command::MotorWrite => {
                if option != 0 {
                    self.memory[TORQUE_SWITCH] = option;
                } else {
                    self.goals = payload
                        .chunks_exact(2)
                        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                        .collect();
                }
                self.motion_payload()
            }
            Command::SystemRead => {
                let mut data = self.serial.to_vec();
                data.extend_from_slice(&0x0001_u16.to_le_bytes());
                data.extend_from_slice(&0x0002_u16.to_le_bytes());
                data.extend_from_slice(&[1, 0, 0, 0]);
                data.push(self.settings.response_time);
                data
            }
            Command::SystemWrite => {
                let &[s0, s1, s2, s3, id, baudrate, parity, response_time] = payload else {
                    return None;
                };
                if [s0, s1, s2, s3] != self.serial {
                    status |= DeviceStatus::DATA_ERROR;
                } else {
                    let options = SystemWriteOptions::from_bits_truncate(option);
                    if options.contains(SystemWriteOptions::ID) {
                        self.settings.id = id;
                    }
                    if options.contains(SystemWriteOptions::BAUDRATE) {
                        self.settings.baudrate = baudrate;
                    }
                    if options.contains(SystemWriteOptions::PARITY) {
                        self.settings.parity = parity;
                    }
                    if options.contains(SystemWriteOptions::RESPONSE_TIME) {
                        self.settings.response_time = response_time;
                    }
                }
                vec![]
            }
            Command::Load | Command::Save | Command::Reboot | Command::FactoryReset => vec![],
        };
        Some((status, data))
    }
}

impl Port for Device {
    type Error = Infallible;

    fn transmit(&mut self, bytes: &[u8]) -> Result<(), Infallible> {
        self.exchanges += 1;
        self.requests.push(bytes.to_vec());
        self.pending.clear();
        if self.silent || Xmodem::new().verify(bytes).is_err() {
            return Ok(());
        }
        let &[HEADER, HEADER, id, _, command, option, ..] = bytes else {
            return Ok(());
        };
        let Some(command) = Command::from_byte(command) else {
            return Ok(());
        };
        if id != self.id && id != BROADCAST_ID {
            return Ok(());
        }
        let Some(payload) = bytes.get(PREFIX_LENGTH..bytes.len() - 2) else {
            return Ok(());
        };
        let Some((status, data)) = self.handle(&command, option, payload) else {
            return Ok(());
        };
        if id == BROADCAST_ID {
            return Ok(());
        }
        let reply = frame(self.id, &command, status.bits(), &data);
        self.id = self.settings.id;
        let keep = reply.len().saturating_sub(self.truncate);
        self.pending.extend(&reply[..keep]);
        Ok(())
    }

    fn receive(&mut self, buffer: &mut [u8]) -> Result<usize, Infallible> {
        let n = buffer.len().min(self.pending.len());
        for (slot, byte) in buffer.iter_mut().zip(self.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

/// Replays canned responses in order and records every request.
pub struct Scripted {
    responses: VecDeque<Vec<u8>>,
    pub requests: Vec<Vec<u8>>,
    refuse: bool,
}

impl Scripted {
    pub fn new<I: IntoIterator<Item = Vec<u8>>>(responses: I) -> Self {
        Self {
            responses: responses.into_iter().collect(),
            requests: vec![],
            refuse: false,
        }
    }

    /// Every send fails.
    pub fn refuse_sends(mut self) -> Self {
        self.refuse = true;
        self
    }
}

impl Transport for Scripted {
    fn round_trip_fixed(&mut self, request: &[u8], response: &mut [u8]) -> Result<(), Incomplete> {
        self.requests.push(request.to_vec());
        response.fill(0xFF);
        let Some(frame) = self.responses.pop_front() else {
            return Err(Incomplete { received: 0 });
        };
        let n = frame.len().min(response.len());
        response[..n].copy_from_slice(&frame[..n]);
        if n == response.len() {
            Ok(())
        } else {
            Err(Incomplete { received: n })
        }
    }

    fn round_trip_variable(
        &mut self,
        request: &[u8],
        response: &mut [u8; MAX_FRAME],
    ) -> Result<usize, Incomplete> {
        self.requests.push(request.to_vec());
        response.fill(0xFF);
        let Some(frame) = self.responses.pop_front() else {
            return Err(Incomplete { received: 0 });
        };
        if frame.len() < PREFIX_LENGTH {
            return Err(Incomplete { received: 0 });
        }
        let n = frame.len().min(MAX_FRAME);
        response[..n].copy_from_slice(&frame[..n]);
        Ok(n)
    }

    fn send_only(&mut self, request: &[u8]) -> bool {
        self.requests.push(request.to_vec());
        !self.refuse
    }
}

/// Feeds a fixed byte stream to whoever reads, and records what is written.
pub struct ScriptedPort {
    bytes: VecDeque<u8>,
    pub sent: Vec<Vec<u8>>,
}

impl ScriptedPort {
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.iter().copied().collect(),
            sent: vec![],
        }
    }
}

impl Port for ScriptedPort {
    type Error = Infallible;

    fn transmit(&mut self, bytes: &[u8]) -> Result<(), Infallible> {
        self.sent.push(bytes.to_vec());
        Ok(())
    }

    fn receive(&mut self, buffer: &mut [u8]) -> Result<usize, Infallible> {
        let n = buffer.len().min(self.bytes.len());
        for (slot, byte) in buffer.iter_mut().zip(self.bytes.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}
