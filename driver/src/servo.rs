use {
    crate::{Error, Reply, bus::Bus, mutex::Mutex, transport::Transport},
    ::pmx_packet::{
        Checksum,
        motion::{ControlMode, FieldMask, Motion, TorqueSwitch},
        register::{Descriptor, ErrorReport, Register, WriteOpt},
        system::{Baudrate, Parity, SystemInfo, SystemSettings, SystemWriteOptions},
    },
    core::ops::DerefMut,
};

macro_rules! forward {
    ($($name:ident($($arg:ident: $t:ty),*) -> $out:ty;)*) => {
        $(
            #[inline(always)]
            pub fn $name(&self, $($arg: $t),*) -> Result<Reply<$out>, Error> {
                self.lock()?.$name(ID, $($arg),*)
            }
        )*
    };
}

/// One device on a shared bus. Every call takes the bus for exactly one exchange,
/// or fails with [`Error::Busy`] if something else has it.
pub struct Servo<'bus, const ID: u8, M>(&'bus M);

impl<'bus, const ID: u8, T: Transport, C: Checksum, M: Mutex<Item = Bus<T, C>>> Servo<'bus, ID, M> {
    #[inline(always)]
    pub const fn new(bus: &'bus M) -> Self {
        Self(bus)
    }

    #[inline(always)]
    pub const fn id(&self) -> u8 {
        ID
    }

    #[inline]
    fn lock(&self) -> Result<impl DerefMut<Target = Bus<T, C>>, Error> {
        self.0.try_lock().ok_or_else(|| {
            log::debug!("Bus busy; servo {ID} not contacted");
            Error::Busy
        })
    }

    /// Reads into `out`, which is filled with `0xFF` on any failure, including a busy bus.
    #[inline]
    pub fn mem_read(&self, address: u16, out: &mut [u8]) -> Result<Reply<()>, Error> {
        match self.lock() {
            Ok(mut bus) => bus.mem_read(ID, address, out),
            Err(e) => {
                out.fill(0xFF);
                Err(e)
            }
        }
    }

    #[inline(always)]
    pub fn mem_write(&self, address: u16, data: &[u8], option: WriteOpt) -> Result<Reply<()>, Error> {
        self.lock()?.mem_write(ID, address, data, option)
    }

    #[inline(always)]
    pub fn read<R: Register>(&self) -> Result<Reply<R::Value>, Error> {
        self.lock()?.read::<R>(ID)
    }

    #[inline(always)]
    pub fn write<R: Register>(&self, value: R::Value, option: WriteOpt) -> Result<Reply<()>, Error> {
        self.lock()?.write::<R>(ID, value, option)
    }

    #[inline(always)]
    pub fn motor_write(
        &self,
        targets: &[i32],
        mask: FieldMask,
        mode: ControlMode,
    ) -> Result<Reply<Motion>, Error> {
        self.lock()?.motor_write(ID, targets, mask, mode)
    }

    #[inline(always)]
    pub fn read_descriptor(&self, descriptor: &Descriptor) -> Result<Reply<i64>, Error> {
        self.lock()?.read_descriptor(ID, descriptor)
    }

    forward! {
        mem_read_u8(address: u16) -> u8;
        mem_read_i16(address: u16) -> i16;
        mem_read_u16(address: u16) -> u16;
        mem_read_i32(address: u16) -> i32;
        mem_read_u32(address: u16) -> u32;
        mem_write_u8(address: u16, value: u8, option: WriteOpt) -> ();
        mem_write_i16(address: u16, value: i16, option: WriteOpt) -> ();
        mem_write_u16(address: u16, value: u16, option: WriteOpt) -> ();
        mem_write_i32(address: u16, value: i32, option: WriteOpt) -> ();
        mem_write_u32(address: u16, value: u32, option: WriteOpt) -> ();
        error_report() -> ErrorReport;
        set_torque_switch(switch: TorqueSwitch) -> ();
        position(mode: ControlMode) -> i32;
        motor_read(mask: FieldMask, mode: ControlMode) -> Motion;
        motor_write_torque(switch: u8) -> ();
        motor_write_torque_with(switch: u8, mask: FieldMask, mode: ControlMode) -> Motion;
        motor_write_single(target: i32, mask: FieldMask, mode: ControlMode) -> Motion;
        motor_write_double(targets: [i32; 2], mask: FieldMask, mode: ControlMode) -> Motion;
        motor_write_triple(targets: [i32; 3], mask: FieldMask, mode: ControlMode) -> Motion;
        set_position(position: i16) -> ();
        set_motor_torque_on() -> ();
        set_motor_free() -> ();
        set_motor_brake() -> ();
        set_motor_hold() -> ();
        load() -> ();
        save() -> ();
        system_read() -> SystemInfo;
        system_write(serial: [u8; 4], options: SystemWriteOptions, settings: SystemSettings) -> ();
        set_id(new_id: u8) -> ();
        set_baudrate(baudrate: Baudrate) -> ();
        set_parity(parity: Parity) -> ();
        set_response_time(response_time: u8) -> ();
        reboot(delay_ms: u16) -> ();
        factory_reset(serial: Option<[u8; 4]>) -> ();
    }
}
