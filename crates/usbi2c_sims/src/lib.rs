//!Simulated USB-I2C adapter. A fake adapter with one slave on its bus, backed by a `RegisterBank`. Useful for dry runs of a
//!session file and for testing `UsbI2c` without hardware.

use serde::Deserialize;
use tracing::{debug, warn};
use usbi2c_core::{AddressWidth, ByteValue, DeviceIndex, Driver, I2cConfig, RegisterAddress};

pub mod register_bank;

pub use register_bank::RegisterBank;

#[derive(Debug, Deserialize)]
pub struct SimRegisterConfig {
    pub address: RegisterAddress,
    pub value: ByteValue,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulatedAdapterConfig {
    //false simulates an unplugged adapter
    pub attached: bool,
    //None simulates an empty bus
    pub device_address: Option<u8>,
    //None follows the width the binding is configured with
    pub address_width: Option<AddressWidth>,
    pub registers: Vec<SimRegisterConfig>,
    pub nack: Vec<RegisterAddress>,
    pub gpio: u8,
}

impl Default for SimulatedAdapterConfig {
    fn default() -> Self {
        Self {
            attached: true,
            device_address: Some(0x50),
            address_width: None,
            registers: Vec::new(),
            nack: Vec::new(),
            gpio: 0,
        }
    }
}

pub struct SimulatedAdapter {
    attached: bool,
    slave: Option<u8>,
    address_width: AddressWidth,
    bank: RegisterBank,
    open: Option<DeviceIndex>,
    config: I2cConfig,
    gpio: u8,
    gpio_directions: u8,
    opens: usize,
}

impl SimulatedAdapter {
    ///`binding_width` is used when the config does not pin a width of its own.
    pub fn new(cfg: &SimulatedAdapterConfig, binding_width: AddressWidth) -> Self {
        let address_width = cfg.address_width.unwrap_or(binding_width);
        let mut bank = RegisterBank::new(address_width.max_address());
        for reg in &cfg.registers {
            bank.set(reg.address.0, reg.value.0);
        }
        for address in &cfg.nack {
            bank.nack(address.0);
        }
        Self {
            attached: cfg.attached,
            slave: cfg.device_address,
            address_width,
            bank,
            open: None,
            config: I2cConfig::from_raw(0, 0, 0),
            gpio: cfg.gpio,
            gpio_directions: 0xFF,
            opens: 0,
        }
    }

    pub fn bank(&self) -> &RegisterBank {
        &self.bank
    }

    pub fn bank_mut(&mut self) -> &mut RegisterBank {
        &mut self.bank
    }

    ///Unplugs or replugs the simulated adapter. Unplugging closes any open device.
    pub fn set_attached(&mut self, attached: bool) {
        self.attached = attached;
        if !attached {
            self.open = None;
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    ///How many times a device has been opened.
    pub fn opens(&self) -> usize {
        self.opens
    }

    pub fn gpio(&self) -> u8 {
        self.gpio
    }

    pub fn gpio_directions(&self) -> u8 {
        self.gpio_directions
    }

    fn is_current(&self, device: DeviceIndex) -> bool {
        self.attached && self.open == Some(device)
    }

    fn register_for(&self, device: DeviceIndex, device_address: u8, command: &[u8]) -> Option<u16> {
        if !self.is_current(device) {
            warn!("sim: i2c transfer on device {} which is not open", device.0);
            return None;
        }
        if self.slave != Some(device_address) {
            debug!("sim: no slave at {:#x}", device_address);
            return None;
        }
        self.address_width.decode(command)
    }
}

impl Driver for SimulatedAdapter {
    fn open_device(&mut self) -> Option<DeviceIndex> {
        if !self.attached {
            return None;
        }
        let device = DeviceIndex(0);
        self.open = Some(device);
        self.opens += 1;
        Some(device)
    }

    fn close_device(&mut self, device: DeviceIndex) -> bool {
        if self.open == Some(device) {
            self.open = None;
            true
        } else {
            false
        }
    }

    fn gpio_config(&mut self, _device: DeviceIndex) -> Option<u8> {
        self.attached.then_some(self.gpio_directions)
    }

    fn set_gpio_config(&mut self, _device: DeviceIndex, directions: u8) -> bool {
        if self.attached {
            self.gpio_directions = directions;
        }
        self.attached
    }

    fn i2c_config(&mut self, device: DeviceIndex) -> Option<I2cConfig> {
        self.is_current(device).then_some(self.config)
    }

    fn set_i2c_config(&mut self, device: DeviceIndex, config: &I2cConfig) -> bool {
        if self.is_current(device) {
            self.config = *config;
            true
        } else {
            false
        }
    }

    fn i2c_auto_address(&mut self, device: DeviceIndex) -> Option<u8> {
        if self.is_current(device) {
            self.slave
        } else {
            None
        }
    }

    fn i2c_read(
        &mut self,
        device: DeviceIndex,
        device_address: u8,
        command: &[u8],
        buffer: &mut [u8],
    ) -> bool {
        match self.register_for(device, device_address, command) {
            Some(register) => self.bank.read(register, buffer),
            None => false,
        }
    }

    fn i2c_write(
        &mut self,
        device: DeviceIndex,
        device_address: u8,
        command: &[u8],
        data: &[u8],
    ) -> bool {
        match self.register_for(device, device_address, command) {
            Some(register) => self.bank.write(register, data),
            None => false,
        }
    }

    fn gpio_read(&mut self, device: DeviceIndex) -> Option<u8> {
        self.is_current(device).then_some(self.gpio)
    }

    //mask is passed through by the binding as 0; the simulation drives every pin
    fn gpio_write(&mut self, device: DeviceIndex, value: u8, _mask: u8) -> bool {
        if self.is_current(device) {
            self.gpio = value;
            true
        } else {
            false
        }
    }
}
