#![cfg_attr(not(test), no_std)]

pub mod command;
pub mod constants;
pub mod crc;
pub mod frame;
pub mod motion;
pub mod register;
pub mod status;
pub mod system;

pub use {
    command::Command,
    crc::{Checksum, Xmodem},
    status::{ComError, DeviceStatus, Sentinel, StatusCode},
};
