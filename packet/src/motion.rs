//! Bitmask-selected telemetry fields carried by `MotorREAD` and `MotorWRITE`.

use {
    crate::status::Sentinel,
    core::{fmt, ops::Index},
    enum_repr::EnumRepr,
    strum::VariantArray,
};

bitflags::bitflags! {
    /// Which telemetry fields a response carries. The empty mask means "no return".
    pub struct FieldMask: u8 {
        const POSITION = 0x01;
        const SPEED = 0x02;
        const CURRENT = 0x04;
        const TORQUE = 0x08;
        const PWM = 0x10;
        const MOTOR_TEMP = 0x20;
        const CPU_TEMP = 0x40;
        const VOLTAGE = 0x80;
    }
}

impl FieldMask {
    /// Payload bytes the selected fields occupy.
    #[inline]
    pub fn byte_count(self) -> usize {
        2 * Field::VARIANTS
            .iter()
            .filter(|field| self.contains(field.mask()))
            .count()
    }
}

bitflags::bitflags! {
    pub struct ControlMode: u8 {
        const POSITION = 0x01;
        const SPEED = 0x02;
        const CURRENT = 0x04;
        const TORQUE = 0x08;
        const PWM = 0x10;
        const TIME = 0x20;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for FieldMask {
    #[inline]
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "FieldMask(x{=u8:02X})", self.bits())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ControlMode {
    #[inline]
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "ControlMode(x{=u8:02X})", self.bits())
    }
}

/// Telemetry fields in the order they appear on the wire.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, strum_macros::VariantArray)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    Position,
    Speed,
    Current,
    Torque,
    Pwm,
    MotorTemp,
    CpuTemp,
    Voltage,
}

impl Field {
    #[inline]
    pub const fn mask(self) -> FieldMask {
        match self {
            Self::Position => FieldMask::POSITION,
            Self::Speed => FieldMask::SPEED,
            Self::Current => FieldMask::CURRENT,
            Self::Torque => FieldMask::TORQUE,
            Self::Pwm => FieldMask::PWM,
            Self::MotorTemp => FieldMask::MOTOR_TEMP,
            Self::CpuTemp => FieldMask::CPU_TEMP,
            Self::Voltage => FieldMask::VOLTAGE,
        }
    }

    /// Position is signed only under position control; voltage is never signed.
    #[inline]
    fn decode(self, bytes: [u8; 2], mode: ControlMode) -> i32 {
        match self {
            Self::Position if !mode.contains(ControlMode::POSITION) => {
                u16::from_le_bytes(bytes).into()
            }
            Self::Voltage => u16::from_le_bytes(bytes).into(),
            _ => i16::from_le_bytes(bytes).into(),
        }
    }
}

#[EnumRepr(type = "u8")]
#[derive(Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(test, derive(strum_macros::VariantArray))]
pub enum TorqueSwitch {
    TorqueOn = 0x01,
    Free = 0x02,
    Brake = 0x04,
    Hold = 0x08,
}

impl TorqueSwitch {
    #[inline(always)]
    pub fn byte(&self) -> u8 {
        self.repr()
    }

    #[inline]
    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::from_repr(byte)
    }
}

/// One slot per canonical field; slots a response did not carry hold the sentinel.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorSample([i32; 8]);

impl MotorSample {
    pub const EMPTY: i32 = 0x7FFF_FFFF;

    /// Decodes the fields `mask` selects, in canonical order.
    /// `None` if `payload` is not exactly the size the mask implies.
    #[inline]
    pub fn decode(mask: FieldMask, mode: ControlMode, payload: &[u8]) -> Option<Self> {
        if payload.len() != mask.byte_count() {
            return None;
        }
        let mut sample = Self::SENTINEL;
        let mut chunks = payload.chunks_exact(2);
        for &field in Field::VARIANTS {
            if !mask.contains(field.mask()) {
                continue;
            }
            let &[lo, hi] = chunks.next()? else {
                return None;
            };
            sample.0[field as usize] = field.decode([lo, hi], mode);
        }
        Some(sample)
    }

    #[inline]
    pub fn get(&self, field: Field) -> Option<i32> {
        match self.0[field as usize] {
            Self::EMPTY => None,
            value => Some(value),
        }
    }

    #[inline(always)]
    pub const fn raw(&self) -> &[i32; 8] {
        &self.0
    }
}

impl Sentinel for MotorSample {
    const SENTINEL: Self = Self([Self::EMPTY; 8]);
}

impl Index<Field> for MotorSample {
    type Output = i32;

    #[inline(always)]
    fn index(&self, field: Field) -> &i32 {
        &self.0[field as usize]
    }
}

/// What a motion response carries: the torque switch state and any requested telemetry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Motion {
    pub torque_switch: u8,
    pub sample: MotorSample,
}

impl Sentinel for Motion {
    const SENTINEL: Self = Self {
        torque_switch: 0xFF,
        sample: MotorSample::SENTINEL,
    };

    #[inline]
    fn salvage(torque_switch: u8) -> Self {
        Self {
            torque_switch,
            ..Self::SENTINEL
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TargetError {
    Count(usize),
    OutOfRange(i32),
}

impl fmt::Display for TargetError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Count(n) => write!(f, "{n} motion targets given; expected 1 to 3"),
            Self::OutOfRange(value) => write!(f, "Motion target {value} does not fit in 16 bits"),
        }
    }
}

pub const MAX_TARGETS: usize = 3;

/// Serializes up to three motion targets into `out` and returns the byte count.
/// Negative values go out as `i16`, the rest as `u16`.
#[inline]
pub fn encode_targets(
    targets: &[i32],
    out: &mut [u8; 2 * MAX_TARGETS],
) -> Result<usize, TargetError> {
    if targets.is_empty() || targets.len() > MAX_TARGETS {
        return Err(TargetError::Count(targets.len()));
    }
    for (&target, slot) in targets.iter().zip(out.chunks_exact_mut(2)) {
        let bytes = if target < 0 {
            i16::try_from(target)
                .map_err(|_| TargetError::OutOfRange(target))?
                .to_le_bytes()
        } else {
            u16::try_from(target)
                .map_err(|_| TargetError::OutOfRange(target))?
                .to_le_bytes()
        };
        slot.copy_from_slice(&bytes);
    }
    Ok(2 * targets.len())
}

#[cfg(test)]
mod test {
    use {super::*, quickcheck::TestResult, quickcheck_macros::quickcheck};

    #[test]
    fn byte_counts() {
        assert_eq!(FieldMask::from_bits_truncate(0b1011_0001).byte_count(), 8);
        assert_eq!(FieldMask::empty().byte_count(), 0);
        assert_eq!(FieldMask::all().byte_count(), 16);
    }

    #[quickcheck]
    fn byte_count_is_twice_popcount(bits: u8) -> bool {
        FieldMask::from_bits_truncate(bits).byte_count() == 2 * bits.count_ones() as usize
    }

    #[test]
    fn speed_then_voltage() {
        let mask = FieldMask::VOLTAGE | FieldMask::SPEED;
        let sample =
            MotorSample::decode(mask, ControlMode::POSITION, &[0x9C, 0xFF, 0x10, 0x2E]).unwrap();
        assert_eq!(sample.get(Field::Speed), Some(-100));
        assert_eq!(sample.get(Field::Voltage), Some(11_792));
        for field in [
            Field::Position,
            Field::Current,
            Field::Torque,
            Field::Pwm,
            Field::MotorTemp,
            Field::CpuTemp,
        ] {
            assert_eq!(sample.get(field), None, "{field:?}");
            assert_eq!(sample[field], MotorSample::EMPTY);
        }
    }

    #[test]
    fn position_signedness_follows_control_mode() {
        let payload = [0x18, 0xFC];
        let signed = MotorSample::decode(FieldMask::POSITION, ControlMode::POSITION, &payload);
        let unsigned = MotorSample::decode(FieldMask::POSITION, ControlMode::SPEED, &payload);
        assert_eq!(signed.unwrap()[Field::Position], -1000);
        assert_eq!(unsigned.unwrap()[Field::Position], 64_536);
    }

    #[test]
    fn voltage_is_unsigned_regardless_of_mode() {
        let sample =
            MotorSample::decode(FieldMask::VOLTAGE, ControlMode::all(), &[0xFF, 0xFF]).unwrap();
        assert_eq!(sample[Field::Voltage], 0xFFFF);
    }

    #[test]
    fn full_mask_canonical_order() {
        let payload: Vec<u8> = (1..=8_i16).flat_map(|n| (-n).to_le_bytes()).collect();
        let sample =
            MotorSample::decode(FieldMask::all(), ControlMode::POSITION, &payload).unwrap();
        assert_eq!(
            sample.raw(),
            &[-1, -2, -3, -4, -5, -6, -7, i32::from(-8_i16 as u16)]
        );
    }

    #[quickcheck]
    fn wrong_size_is_rejected(bits: u8, payload: Vec<u8>) -> TestResult {
        let mask = FieldMask::from_bits_truncate(bits);
        if payload.len() == mask.byte_count() {
            return TestResult::discard();
        }
        TestResult::from_bool(MotorSample::decode(mask, ControlMode::POSITION, &payload).is_none())
    }

    #[test]
    fn torque_switch_codes() {
        let bytes: Vec<u8> = TorqueSwitch::VARIANTS.iter().map(TorqueSwitch::byte).collect();
        assert_eq!(bytes, [0x01_u8, 0x02, 0x04, 0x08]);
        for &byte in &bytes {
            assert_eq!(TorqueSwitch::from_byte(byte).map(|s| s.byte()), Some(byte));
        }
        assert_eq!(TorqueSwitch::from_byte(0x99), None);
        assert_eq!(TorqueSwitch::from_byte(0x00), None);
        assert_eq!(TorqueSwitch::from_byte(0x03), None);
    }

    #[test]
    fn targets_encode_little_endian() {
        let mut out = [0; 2 * MAX_TARGETS];
        assert_eq!(encode_targets(&[-1000, 40_000, 7], &mut out), Ok(6));
        assert_eq!(out, [0x18, 0xFC, 0x40, 0x9C, 0x07, 0x00]);
    }

    #[test]
    fn targets_out_of_range() {
        let mut out = [0; 2 * MAX_TARGETS];
        assert_eq!(
            encode_targets(&[65_536], &mut out),
            Err(TargetError::OutOfRange(65_536))
        );
        assert_eq!(
            encode_targets(&[0, -32_769], &mut out),
            Err(TargetError::OutOfRange(-32_769))
        );
        assert_eq!(encode_targets(&[], &mut out), Err(TargetError::Count(0)));
        assert_eq!(
            encode_targets(&[1, 2, 3, 4], &mut out),
            Err(TargetError::Count(4))
        );
    }

    #[quickcheck]
    fn in_range_targets_roundtrip(target: i32) -> TestResult {
        if !(-32_768..=65_535).contains(&target) {
            return TestResult::discard();
        }
        let mut out = [0; 2 * MAX_TARGETS];
        let Ok(2) = encode_targets(&[target], &mut out) else {
            return TestResult::failed();
        };
        let decoded = if target < 0 {
            i32::from(i16::from_le_bytes([out[0], out[1]]))
        } else {
            i32::from(u16::from_le_bytes([out[0], out[1]]))
        };
        TestResult::from_bool(decoded == target)
    }
}
