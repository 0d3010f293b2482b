//!A mod for the error types
use thiserror::Error;

use crate::address::AddressWidth;

///Common error type for the binding. Per-register I/O failures are not errors, they are reported in `WriteReport` / `ReadReport`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no device is open. call open_device first")]
    DeviceNotOpen,

    #[error("the driver could not open a USB-I2C device")]
    OpenFailed,

    #[error("no i2c device found on the adapter, check the hardware")]
    NoDeviceAddress,

    #[error("register address width must be 8 or 16, got {0}")]
    InvalidAddressWidth(u8),

    #[error("register address {address:#x} does not fit in {width}")]
    AddressOutOfRange { address: u16, width: AddressWidth },

    #[error("gpio {0} failed")]
    Gpio(&'static str),

    #[error("the driver did not report an i2c configuration")]
    ConfigUnavailable,

    #[error("adapter error: {0}")]
    Adapter(String),
}

pub type Result<T> = std::result::Result<T, Error>;
