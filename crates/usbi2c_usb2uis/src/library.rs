use std::ffi::OsStr;

use libloading::Library;
use tracing::debug;

use crate::error::LibraryError;

pub type OpenDeviceFn = unsafe extern "C" fn() -> u8;
pub type CloseDeviceFn = unsafe extern "C" fn(u8) -> u8;
pub type GetGpioConfigFn = unsafe extern "C" fn(u8, *mut u8) -> u8;
pub type SetGpioConfigFn = unsafe extern "C" fn(u8, u8) -> u8;
pub type I2cGetConfigFn = unsafe extern "C" fn(u8, *mut u8, *mut u8, *mut u32) -> u8;
pub type I2cSetConfigFn = unsafe extern "C" fn(u8, u8, u8, u32) -> u8;
pub type I2cAutoGetAddressFn = unsafe extern "C" fn(u8, *mut u8) -> u8;
pub type I2cReadFn = unsafe extern "C" fn(u8, u8, *const u8, u8, *mut u8, u16) -> u8;
pub type I2cWriteFn = unsafe extern "C" fn(u8, u8, *const u8, u8, *const u8, u16) -> u8;
pub type GpioReadFn = unsafe extern "C" fn(u8, *mut u8) -> u8;
pub type GpioWriteFn = unsafe extern "C" fn(u8, u8, u8) -> u8;

///Entry points resolved from the vendor library.
///
/// The function pointers are copied out of the `Library`, which is kept in the same struct so they stay valid.
pub struct Usb2UisLibrary {
    pub(crate) open_device: OpenDeviceFn,
    pub(crate) close_device: CloseDeviceFn,
    pub(crate) get_gpio_config: GetGpioConfigFn,
    pub(crate) set_gpio_config: SetGpioConfigFn,
    pub(crate) i2c_get_config: I2cGetConfigFn,
    pub(crate) i2c_set_config: I2cSetConfigFn,
    pub(crate) i2c_auto_get_address: I2cAutoGetAddressFn,
    pub(crate) i2c_read: I2cReadFn,
    pub(crate) i2c_write: I2cWriteFn,
    pub(crate) gpio_read: GpioReadFn,
    pub(crate) gpio_write: GpioWriteFn,
    _lib: Library,
}

///Every symbol the binding resolves, in load order.
pub const SYMBOLS: [&str; 11] = [
    "USBIO_OpenDevice",
    "USBIO_CloseDevice",
    "USBIO_GetGPIOConfig",
    "USBIO_SetGPIOConfig",
    "USBIO_I2cGetConfig",
    "USBIO_I2cSetConfig",
    "USBIO_I2cAutoGetAddress",
    "USBIO_I2cRead",
    "USBIO_I2cWrite",
    "USBIO_GPIORead",
    "USBIO_GPIOWrite",
];

fn symbol<T: Copy>(lib: &Library, path: &str, name: &'static str) -> Result<T, LibraryError> {
    let mut c_name = Vec::with_capacity(name.len() + 1);
    c_name.extend_from_slice(name.as_bytes());
    c_name.push(0);
    //the caller picks T to match the vendor header
    let sym = unsafe { lib.get::<T>(&c_name) }.map_err(|source| LibraryError::Symbol {
        path: path.to_string(),
        symbol: name,
        source,
    })?;
    debug!("resolved {}", name);
    Ok(*sym)
}

impl Usb2UisLibrary {
    ///Loads the library at `path` and resolves every entry point. Fails if any symbol is missing.
    pub fn load<P: AsRef<OsStr>>(path: P) -> Result<Self, LibraryError> {
        let display = path.as_ref().to_string_lossy().into_owned();
        //loading runs the library's initialisers
        let lib = unsafe { Library::new(path.as_ref()) }.map_err(|source| LibraryError::Load {
            path: display.clone(),
            source,
        })?;

        Ok(Self {
            open_device: symbol(&lib, &display, SYMBOLS[0])?,
            close_device: symbol(&lib, &display, SYMBOLS[1])?,
            get_gpio_config: symbol(&lib, &display, SYMBOLS[2])?,
            set_gpio_config: symbol(&lib, &display, SYMBOLS[3])?,
            i2c_get_config: symbol(&lib, &display, SYMBOLS[4])?,
            i2c_set_config: symbol(&lib, &display, SYMBOLS[5])?,
            i2c_auto_get_address: symbol(&lib, &display, SYMBOLS[6])?,
            i2c_read: symbol(&lib, &display, SYMBOLS[7])?,
            i2c_write: symbol(&lib, &display, SYMBOLS[8])?,
            gpio_read: symbol(&lib, &display, SYMBOLS[9])?,
            gpio_write: symbol(&lib, &display, SYMBOLS[10])?,
            _lib: lib,
        })
    }
}
