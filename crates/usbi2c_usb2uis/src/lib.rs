//!This library drives a USB-I2C adapter through the vendor's `usb2uis` driver library. It is a wrapper around the library's
//!`USBIO_*` entry points, loaded at runtime with `libloading`.
//!
//! `Usb2Uis` implements `usbi2c_core::Driver`, so it can be handed to `usbi2c_core::UsbI2c`.

//internal error type for loading the library
pub mod error;

//symbol table of the vendor library
pub mod library;

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{debug, info};
use usbi2c_core::{DeviceIndex, Driver, I2cConfig};

pub use error::LibraryError;
pub use library::Usb2UisLibrary;

///Platform file name of the vendor library: `usb2uis.dll` on Windows, `libusb2uis.so` on Linux.
pub fn default_library_path() -> PathBuf {
    PathBuf::from(libloading::library_filename("usb2uis"))
}

#[derive(Debug, Deserialize)]
pub struct Usb2UisConfig {
    #[serde(default = "default_library_path")]
    pub library: PathBuf,
}

impl Default for Usb2UisConfig {
    fn default() -> Self {
        Self {
            library: default_library_path(),
        }
    }
}

///A USB-I2C adapter driven by the vendor library.
pub struct Usb2Uis {
    lib: Usb2UisLibrary,
}

impl Usb2Uis {
    pub fn load(cfg: &Usb2UisConfig) -> Result<Self, LibraryError> {
        let lib = Usb2UisLibrary::load(&cfg.library)?;
        info!("loaded driver library {}", cfg.library.display());
        Ok(Self { lib })
    }
}

//The vendor library reports success as a nonzero byte.
fn ok(raw: u8) -> bool {
    raw != 0
}

impl Driver for Usb2Uis {
    fn open_device(&mut self) -> Option<DeviceIndex> {
        let raw = unsafe { (self.lib.open_device)() };
        debug!("USBIO_OpenDevice -> {:#04x}", raw);
        DeviceIndex::from_raw(raw)
    }

    fn close_device(&mut self, device: DeviceIndex) -> bool {
        ok(unsafe { (self.lib.close_device)(device.0) })
    }

    fn gpio_config(&mut self, device: DeviceIndex) -> Option<u8> {
        let mut value = 0xFFu8;
        ok(unsafe { (self.lib.get_gpio_config)(device.0, &mut value) }).then_some(value)
    }

    fn set_gpio_config(&mut self, device: DeviceIndex, directions: u8) -> bool {
        ok(unsafe { (self.lib.set_gpio_config)(device.0, directions) })
    }

    fn i2c_config(&mut self, device: DeviceIndex) -> Option<I2cConfig> {
        let mut address = 0u8;
        let mut rate = 0u8;
        let mut timeouts = 0u32;
        let res = unsafe { (self.lib.i2c_get_config)(device.0, &mut address, &mut rate, &mut timeouts) };
        ok(res).then(|| I2cConfig::from_raw(address, rate, timeouts))
    }

    fn set_i2c_config(&mut self, device: DeviceIndex, config: &I2cConfig) -> bool {
        ok(unsafe {
            (self.lib.i2c_set_config)(
                device.0,
                config.device_address,
                config.rate,
                config.timeout_word(),
            )
        })
    }

    fn i2c_auto_address(&mut self, device: DeviceIndex) -> Option<u8> {
        let mut address = 0xFFu8;
        ok(unsafe { (self.lib.i2c_auto_get_address)(device.0, &mut address) }).then_some(address)
    }

    fn i2c_read(
        &mut self,
        device: DeviceIndex,
        device_address: u8,
        command: &[u8],
        buffer: &mut [u8],
    ) -> bool {
        let (Ok(command_len), Ok(read_len)) = (u8::try_from(command.len()), u16::try_from(buffer.len())) else {
            return false;
        };
        //the driver reads command_len bytes from command and writes read_len bytes to buffer
        ok(unsafe {
            (self.lib.i2c_read)(
                device.0,
                device_address,
                command.as_ptr(),
                command_len,
                buffer.as_mut_ptr(),
                read_len,
            )
        })
    }

    fn i2c_write(
        &mut self,
        device: DeviceIndex,
        device_address: u8,
        command: &[u8],
        data: &[u8],
    ) -> bool {
        let (Ok(command_len), Ok(write_len)) = (u8::try_from(command.len()), u16::try_from(data.len())) else {
            return false;
        };
        ok(unsafe {
            (self.lib.i2c_write)(
                device.0,
                device_address,
                command.as_ptr(),
                command_len,
                data.as_ptr(),
                write_len,
            )
        })
    }

    fn gpio_read(&mut self, device: DeviceIndex) -> Option<u8> {
        let mut value = 0u8;
        ok(unsafe { (self.lib.gpio_read)(device.0, &mut value) }).then_some(value)
    }

    fn gpio_write(&mut self, device: DeviceIndex, value: u8, mask: u8) -> bool {
        ok(unsafe { (self.lib.gpio_write)(device.0, value, mask) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_library_name() {
        let path = default_library_path();
        let name = path.to_string_lossy();
        assert!(name.contains("usb2uis"));
        if cfg!(windows) {
            assert_eq!(name, "usb2uis.dll");
        }
    }

    #[test]
    fn test_missing_library_is_an_error() {
        let cfg = Usb2UisConfig {
            library: PathBuf::from("./definitely-not-here/usb2uis-missing.dll"),
        };
        match Usb2Uis::load(&cfg) {
            Err(LibraryError::Load { path, .. }) => assert!(path.contains("usb2uis-missing")),
            Err(other) => panic!("expected a load error, got {}", other),
            Ok(_) => panic!("loaded a library that does not exist"),
        }
    }

    #[test]
    fn test_library_error_converts_to_core_error() {
        let err = Usb2Uis::load(&Usb2UisConfig {
            library: PathBuf::from("./nope/usb2uis.dll"),
        })
        .err()
        .unwrap();
        let core: usbi2c_core::Error = err.into();
        assert!(matches!(core, usbi2c_core::Error::Adapter(msg) if msg.contains("could not load")));
    }

    #[test]
    fn test_symbol_table_names() {
        assert!(library::SYMBOLS.iter().all(|s| s.starts_with("USBIO_")));
    }
}
