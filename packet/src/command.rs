use enum_repr::EnumRepr;

/// The top bit of a command byte is reserved; devices echo the command without it.
pub const COMMAND_MASK: u8 = 0x7F;

#[EnumRepr(type = "u8")]
#[derive(Debug, Eq, PartialEq)]
#[cfg_attr(test, derive(strum_macros::VariantArray))]
pub enum Command {
    MemRead = 0xA0,
    MemWrite = 0xA1,
    Load = 0xA2,
    Save = 0xA3,
    MotorRead = 0xA4,
    MotorWrite = 0xA5,
    SystemRead = 0xBB,
    SystemWrite = 0xBC,
    Reboot = 0xBD,
    FactoryReset = 0xBE,
}

impl Command {
    #[inline(always)]
    pub fn byte(&self) -> u8 {
        self.repr()
    }

    #[inline]
    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::from_repr(byte)
    }

    /// Whether a received command byte answers this command.
    #[inline]
    pub fn matches(&self, received: u8) -> bool {
        (received & COMMAND_MASK) == (self.byte() & COMMAND_MASK)
    }
}
