/// Both leading bytes of every frame.
pub const HEADER: u8 = 0xFE;

/// Largest frame either side will ever put on the wire.
pub const MAX_FRAME: usize = 256;

/// Header (2), ID, length, command, option/status, and CRC (2).
pub const MIN_LENGTH: usize = 8;

/// Bytes a variable-length receive must see before it knows the total length.
pub const PREFIX_LENGTH: usize = MIN_LENGTH - 2;

/// Exclusive upper bound on a single `MemREAD`.
pub const READ_LIMIT: usize = 244;

/// Exclusive upper bound on a single `MemWRITE`.
pub const WRITE_LIMIT: usize = 245;

/// Every device acts on a frame sent here, and none of them answers.
pub const BROADCAST_ID: u8 = 0xFF;

/// Highest assignable device ID.
pub const MAX_ID: u8 = 239;

pub mod index {
    pub const HEADER: usize = 0;
    pub const HEADER_1: usize = 1;
    pub const ID: usize = 2;
    pub const LENGTH: usize = 3;
    pub const COMMAND: usize = 4;
    pub const OPTION: usize = 5;
    pub const STATUS: usize = 5;
    pub const DATA: usize = 6;
}
