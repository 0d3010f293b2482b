//!This is the core library for the usbi2c project. It holds the `Driver` seam every adapter implements and the `UsbI2c` binding that
//!turns register reads, writes and GPIO calls into driver calls.
//!
//! The `usbi2c_usb2uis` crate implements `Driver` over the vendor library. `usbi2c_sims` implements it in memory.

pub mod address;
pub mod error;
pub mod report;
pub mod settings;
pub mod usb_i2c;

pub use address::{AddressWidth, ByteValue, RegisterAddress};
pub use error::{Error, Result};
pub use report::{ReadReport, WriteReport};
pub use settings::{AdapterSettings, DeviceIndex, I2cConfig};
pub use usb_i2c::UsbI2c;

///The native entry points of a USB-I2C adapter driver.
///
/// Each call maps onto one driver function and reports the driver's own success flag. No call retries or interprets failures;
/// that is left to `UsbI2c`.
///
/// `command` is the register address already marshaled to the configured width.
pub trait Driver {
    ///Opens the first adapter. `None` when the driver has no device to hand out.
    fn open_device(&mut self) -> Option<DeviceIndex>;

    fn close_device(&mut self, device: DeviceIndex) -> bool;

    fn gpio_config(&mut self, device: DeviceIndex) -> Option<u8>;

    fn set_gpio_config(&mut self, device: DeviceIndex, directions: u8) -> bool;

    fn i2c_config(&mut self, device: DeviceIndex) -> Option<I2cConfig>;

    fn set_i2c_config(&mut self, device: DeviceIndex, config: &I2cConfig) -> bool;

    ///Scans the bus and returns the slave address that answered.
    fn i2c_auto_address(&mut self, device: DeviceIndex) -> Option<u8>;

    fn i2c_read(
        &mut self,
        device: DeviceIndex,
        device_address: u8,
        command: &[u8],
        buffer: &mut [u8],
    ) -> bool;

    fn i2c_write(
        &mut self,
        device: DeviceIndex,
        device_address: u8,
        command: &[u8],
        data: &[u8],
    ) -> bool;

    fn gpio_read(&mut self, device: DeviceIndex) -> Option<u8>;

    fn gpio_write(&mut self, device: DeviceIndex, value: u8, mask: u8) -> bool;
}

impl<D: Driver + ?Sized> Driver for Box<D> {
    fn open_device(&mut self) -> Option<DeviceIndex> {
        (**self).open_device()
    }

    fn close_device(&mut self, device: DeviceIndex) -> bool {
        (**self).close_device(device)
    }

    fn gpio_config(&mut self, device: DeviceIndex) -> Option<u8> {
        (**self).gpio_config(device)
    }

    fn set_gpio_config(&mut self, device: DeviceIndex, directions: u8) -> bool {
        (**self).set_gpio_config(device, directions)
    }

    fn i2c_config(&mut self, device: DeviceIndex) -> Option<I2cConfig> {
        (**self).i2c_config(device)
    }

    fn set_i2c_config(&mut self, device: DeviceIndex, config: &I2cConfig) -> bool {
        (**self).set_i2c_config(device, config)
    }

    fn i2c_auto_address(&mut self, device: DeviceIndex) -> Option<u8> {
        (**self).i2c_auto_address(device)
    }

    fn i2c_read(
        &mut self,
        device: DeviceIndex,
        device_address: u8,
        command: &[u8],
        buffer: &mut [u8],
    ) -> bool {
        (**self).i2c_read(device, device_address, command, buffer)
    }

    fn i2c_write(
        &mut self,
        device: DeviceIndex,
        device_address: u8,
        command: &[u8],
        data: &[u8],
    ) -> bool {
        (**self).i2c_write(device, device_address, command, data)
    }

    fn gpio_read(&mut self, device: DeviceIndex) -> Option<u8> {
        (**self).gpio_read(device)
    }

    fn gpio_write(&mut self, device: DeviceIndex, value: u8, mask: u8) -> bool {
        (**self).gpio_write(device, value, mask)
    }
}
