//! The device memory map: one zero-sized type per register, plus a runtime table of the same.

use crate::status::Sentinel;

/// A fixed-width little-endian value stored in device memory.
pub trait Scalar: Copy + Sentinel {
    const BYTES: usize;
    const SIGNED: bool;

    /// `bytes` is exactly `BYTES` long.
    fn decode_le(bytes: &[u8]) -> Self;

    fn encode_le(self) -> [u8; 4];

    fn widen(self) -> i64;
}

macro_rules! scalar {
    ($t:ty, $signed:literal) => {
        impl Scalar for $t {
            const BYTES: usize = core::mem::size_of::<$t>();
            const SIGNED: bool = $signed;

            #[inline]
            fn decode_le(bytes: &[u8]) -> Self {
                let mut le = [0; core::mem::size_of::<$t>()];
                le.copy_from_slice(bytes);
                Self::from_le_bytes(le)
            }

            #[inline]
            fn encode_le(self) -> [u8; 4] {
                let mut out = [0; 4];
                out[..Self::BYTES].copy_from_slice(&self.to_le_bytes());
                out
            }

            #[inline(always)]
            fn widen(self) -> i64 {
                self.into()
            }
        }
    };
}

scalar!(u8, false);
scalar!(i16, true);
scalar!(u16, false);
scalar!(i32, true);
scalar!(u32, false);

/// Whether a write may proceed while the motor is driven.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WriteOpt {
    /// The device rejects the write while torque is on.
    #[default]
    Normal = 0x00,
    Force = 0x01,
}

/// Runtime view of a register: enough to read any of them generically.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Descriptor {
    pub name: &'static str,
    pub address: u16,
    pub bytes: u8,
    pub signed: bool,
}

impl Descriptor {
    /// Whether [`Self::decode`] knows this width and signedness.
    #[inline]
    pub const fn is_decodable(&self) -> bool {
        matches!((self.bytes, self.signed), (1, false) | (2, _) | (4, _))
    }

    /// Sign- or zero-extends a little-endian value of `self.bytes` bytes.
    #[inline]
    pub fn decode(&self, bytes: &[u8]) -> Option<i64> {
        Some(match (self.bytes, self.signed) {
            (1, false) => u8::decode_le(bytes.get(..1)?).widen(),
            (2, false) => u16::decode_le(bytes.get(..2)?).widen(),
            (2, true) => i16::decode_le(bytes.get(..2)?).widen(),
            (4, false) => u32::decode_le(bytes.get(..4)?).widen(),
            (4, true) => i32::decode_le(bytes.get(..4)?).widen(),
            _ => return None,
        })
    }
}

pub trait Register {
    const ADDRESS: u16;
    const DESCRIPTION: &'static str;
    type Value: Scalar;

    const DESCRIPTOR: Descriptor = Descriptor {
        name: Self::DESCRIPTION,
        address: Self::ADDRESS,
        bytes: <Self::Value as Scalar>::BYTES as u8,
        signed: <Self::Value as Scalar>::SIGNED,
    };
}

macro_rules! registers {
    ($($name:ident @ $address:literal: $value:ty = $description:literal;)*) => {
        $(
            pub struct $name;
            impl Register for $name {
                const ADDRESS: u16 = $address;
                const DESCRIPTION: &'static str = $description;
                type Value = $value;
            }
        )*

        /// Every register above, in address order.
        pub static REGISTERS: &[Descriptor] = &[$(<$name as Register>::DESCRIPTOR),*];
    };
}

registers! {
    PositionKp @ 0: u32 = "Position P Gain";
    PositionKi @ 4: u32 = "Position I Gain";
    PositionKd @ 8: u32 = "Position D Gain";
    PositionSt @ 12: u32 = "Position Stretch";
    SpeedKp @ 16: u32 = "Speed P Gain";
    SpeedKi @ 20: u32 = "Speed I Gain";
    SpeedKd @ 24: u32 = "Speed D Gain";
    CurrentKp @ 32: u32 = "Current P Gain";
    CurrentKi @ 36: u32 = "Current I Gain";
    CurrentKd @ 40: u32 = "Current D Gain";
    TorqueKp @ 48: u32 = "Torque P Gain";
    TorqueKi @ 52: u32 = "Torque I Gain";
    TorqueKd @ 56: u32 = "Torque D Gain";
    PositionDeadBand @ 64: u16 = "Position Dead Band";
    SpeedDeadBand @ 66: u16 = "Speed Dead Band";
    CurrentDeadBand @ 68: u16 = "Current Dead Band";
    TorqueDeadBand @ 70: u16 = "Torque Dead Band";
    CenterOffset @ 72: i16 = "Center Offset";
    CloneReverse @ 74: u8 = "Clone / Reverse";
    MinVoltageLimit @ 76: u16 = "Minimum Voltage Limit";
    MinVoltageLimitPower @ 78: u16 = "Minimum Voltage Limit Power";
    MaxVoltageLimit @ 80: u16 = "Maximum Voltage Limit";
    MaxVoltageLimitPower @ 82: u16 = "Maximum Voltage Limit Power";
    CurrentLimit @ 84: u16 = "Current Limit";
    CurrentLimitPower @ 86: u16 = "Current Limit Power";
    MotorTempLimit @ 88: u16 = "Motor Temperature Limit";
    MotorTempLimitPower @ 90: u16 = "Motor Temperature Limit Power";
    CpuTempLimit @ 92: u16 = "CPU Temperature Limit";
    CpuTempLimitPower @ 94: u16 = "CPU Temperature Limit Power";
    CwPositionLimit @ 96: i16 = "Clockwise Position Limit";
    CwPositionLimitPower @ 98: u16 = "Clockwise Position Limit Power";
    CcwPositionLimit @ 100: i16 = "Counterclockwise Position Limit";
    CcwPositionLimitPower @ 102: u16 = "Counterclockwise Position Limit Power";
    MaxGoalSpeed @ 104: i16 = "Maximum Goal Speed";
    MaxGoalCurrent @ 106: i16 = "Maximum Goal Current";
    MaxGoalTorque @ 108: i16 = "Maximum Goal Torque";
    TotalPowerRate @ 110: u16 = "Total Power Rate";
    LockDetectTime @ 112: u16 = "Lock Detect Time";
    LockThresholdPower @ 114: u16 = "Lock Threshold Power";
    LockDetectOutputPower @ 116: u16 = "Lock Detect Output Power";
    PresetPosition @ 118: u8 = "Position Gain Preset";
    PresetSpeed @ 119: u8 = "Speed Gain Preset";
    PresetCurrent @ 120: u8 = "Current Gain Preset";
    PresetTorque @ 121: u8 = "Torque Gain Preset";
    PositionKp2 @ 124: u32 = "Position P Gain 2";
    PositionKi2 @ 128: u32 = "Position I Gain 2";
    PositionKd2 @ 132: u32 = "Position D Gain 2";
    PositionSt2 @ 136: u32 = "Position Stretch 2";
    SpeedKp2 @ 140: u32 = "Speed P Gain 2";
    SpeedKi2 @ 144: u32 = "Speed I Gain 2";
    SpeedKd2 @ 148: u32 = "Speed D Gain 2";
    CurrentKp2 @ 156: u32 = "Current P Gain 2";
    CurrentKi2 @ 160: u32 = "Current I Gain 2";
    CurrentKd2 @ 164: u32 = "Current D Gain 2";
    TorqueKp2 @ 172: u32 = "Torque P Gain 2";
    TorqueKi2 @ 176: u32 = "Torque I Gain 2";
    TorqueKd2 @ 180: u32 = "Torque D Gain 2";
    PositionKp3 @ 188: u32 = "Position P Gain 3";
    PositionKi3 @ 192: u32 = "Position I Gain 3";
    PositionKd3 @ 196: u32 = "Position D Gain 3";
    PositionSt3 @ 200: u32 = "Position Stretch 3";
    SpeedKp3 @ 204: u32 = "Speed P Gain 3";
    SpeedKi3 @ 208: u32 = "Speed I Gain 3";
    SpeedKd3 @ 212: u32 = "Speed D Gain 3";
    CurrentKp3 @ 220: u32 = "Current P Gain 3";
    CurrentKi3 @ 224: u32 = "Current I Gain 3";
    CurrentKd3 @ 228: u32 = "Current D Gain 3";
    TorqueKp3 @ 236: u32 = "Torque P Gain 3";
    TorqueKi3 @ 240: u32 = "Torque I Gain 3";
    TorqueKd3 @ 244: u32 = "Torque D Gain 3";
    NowPosition @ 300: i16 = "Present Position";
    NowSpeed @ 302: i16 = "Present Speed";
    NowCurrent @ 304: i16 = "Present Current";
    NowTorque @ 306: i16 = "Present Torque";
    NowPwm @ 308: i16 = "Present PWM";
    MotorTemp @ 310: i16 = "Motor Temperature";
    CpuTemp @ 312: i16 = "CPU Temperature";
    InputVoltage @ 314: u16 = "Input Voltage";
    TrajectoryTime @ 316: u16 = "Trajectory Time";
    EncoderValue @ 318: u16 = "Encoder Value";
    ErrorStatus @ 400: u8 = "Error Status";
    ErrorSystem @ 401: u8 = "System Error";
    ErrorMotor @ 402: u8 = "Motor Error";
    ErrorRamAccess @ 404: u16 = "RAM Access Error Address";
    TorqueSwitch @ 500: u8 = "Torque Switch";
    ControlMode @ 501: u8 = "Control Mode";
    MotorReceiveData @ 502: u8 = "Motor Receive Data";
    Trajectory @ 503: u8 = "Trajectory Type";
    ShortBrakeCurrent @ 530: u8 = "Short Brake (Current Control)";
    ShortBrakeTorque @ 531: u8 = "Short Brake (Torque Control)";
    ShortBrakePwm @ 532: u8 = "Short Brake (PWM Control)";
    LedMode @ 533: u8 = "LED Mode";
    CenterOffsetMinRange @ 600: i16 = "Center Offset (Lowest Allowed)";
    CenterOffsetMaxRange @ 602: i16 = "Center Offset (Highest Allowed)";
    MinVoltageMinRange @ 604: u16 = "Minimum Voltage Limit (Lowest Allowed)";
    MinVoltageMaxRange @ 606: u16 = "Minimum Voltage Limit (Highest Allowed)";
    MaxVoltageMinRange @ 608: u16 = "Maximum Voltage Limit (Lowest Allowed)";
    MaxVoltageMaxRange @ 610: u16 = "Maximum Voltage Limit (Highest Allowed)";
    FailSafeVoltageMinRange @ 612: u16 = "Fail-Safe Voltage (Lowest Allowed)";
    FailSafeVoltageMaxRange @ 614: u16 = "Fail-Safe Voltage (Highest Allowed)";
    CurrentMinRange @ 616: u16 = "Current Limit (Lowest Allowed)";
    CurrentMaxRange @ 618: u16 = "Current Limit (Highest Allowed)";
    MotorTempMinRange @ 620: i16 = "Motor Temperature Limit (Lowest Allowed)";
    MotorTempMaxRange @ 622: i16 = "Motor Temperature Limit (Highest Allowed)";
    CpuTempMinRange @ 624: i16 = "CPU Temperature Limit (Lowest Allowed)";
    CpuTempMaxRange @ 626: i16 = "CPU Temperature Limit (Highest Allowed)";
    CwPositionMinRange @ 628: i16 = "Clockwise Position Limit (Lowest Allowed)";
    CwPositionMaxRange @ 630: i16 = "Clockwise Position Limit (Highest Allowed)";
    CcwPositionMinRange @ 632: i16 = "Counterclockwise Position Limit (Lowest Allowed)";
    CcwPositionMaxRange @ 634: i16 = "Counterclockwise Position Limit (Highest Allowed)";
    MaxGoalSpeedMinRange @ 636: i16 = "Maximum Goal Speed (Lowest Allowed)";
    MaxGoalSpeedMaxRange @ 638: i16 = "Maximum Goal Speed (Highest Allowed)";
    MaxGoalCurrentMinRange @ 640: i16 = "Maximum Goal Current (Lowest Allowed)";
    MaxGoalCurrentMaxRange @ 642: i16 = "Maximum Goal Current (Highest Allowed)";
    MaxGoalTorqueMinRange @ 644: i16 = "Maximum Goal Torque (Lowest Allowed)";
    MaxGoalTorqueMaxRange @ 646: i16 = "Maximum Goal Torque (Highest Allowed)";
    GoalCommandValue1 @ 700: i16 = "Goal Command Value 1";
    GoalCommandValue2 @ 702: i16 = "Goal Command Value 2";
    GoalCommandValue3 @ 704: i16 = "Goal Command Value 3";
}

/// The latched error registers at 400..406, read as one block.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ErrorReport {
    pub status: u8,
    pub system: u8,
    pub motor: u8,
    pub ram_access: u16,
}

impl ErrorReport {
    pub const ADDRESS: u16 = ErrorStatus::ADDRESS;
    pub const BYTES: usize = 6;

    #[inline]
    pub fn decode(bytes: &[u8; 6]) -> Self {
        Self {
            status: bytes[0],
            system: bytes[1],
            motor: bytes[2],
            ram_access: u16::from_le_bytes([bytes[4], bytes[5]]),
        }
    }
}

impl Sentinel for ErrorReport {
    const SENTINEL: Self = Self {
        status: u8::SENTINEL,
        system: u8::SENTINEL,
        motor: u8::SENTINEL,
        ram_access: u16::SENTINEL,
    };
}
