use std::{thread::sleep, time::Duration};

use tracing::{debug, error, info, warn};

use crate::{
    error::{Error, Result},
    report::{ReadReport, WriteReport},
    settings::{AdapterSettings, DeviceIndex, I2cConfig},
    AddressWidth, Driver,
};

///Index the driver uses before any device has been handed out.
const FIRST_DEVICE: DeviceIndex = DeviceIndex(0);

///Register level access to the device behind a USB-I2C adapter.
///
/// A device has to be opened (`open_device`, `init` or `connect`) before any I2C call. Calls made earlier fail with
/// `Error::DeviceNotOpen` and never reach the driver.
pub struct UsbI2c<D: Driver> {
    driver: D,
    settings: AdapterSettings,
    device: Option<DeviceIndex>,
    device_address: Option<u8>,
}

impl<D: Driver> UsbI2c<D> {
    pub fn new(driver: D, settings: AdapterSettings) -> Self {
        Self {
            driver,
            settings,
            device: None,
            device_address: None,
        }
    }

    ///`new` followed by `init`.
    pub fn connect(driver: D, settings: AdapterSettings) -> Result<Self> {
        let mut usb_i2c = Self::new(driver, settings);
        usb_i2c.init()?;
        Ok(usb_i2c)
    }

    pub fn address_width(&self) -> AddressWidth {
        self.settings.address_width
    }

    pub fn device(&self) -> Option<DeviceIndex> {
        self.device
    }

    pub fn device_address(&self) -> Option<u8> {
        self.device_address
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    ///Sets up GPIO directions, opens the adapter and finds the device on the bus.
    pub fn init(&mut self) -> Result<()> {
        let gpio = self.driver.gpio_config(FIRST_DEVICE);
        info!("GetGPIOConfig: {:?}", gpio);
        let directions = self.settings.gpio_directions;
        let applied = self.driver.set_gpio_config(FIRST_DEVICE, directions);
        info!("SetGPIOConfig({:#04x}): {}", directions, applied);
        self.open_device()?;
        self.refresh_device_address()?;
        Ok(())
    }

    ///Closes whatever is open, waits for the adapter to settle and opens it again.
    pub fn open_device(&mut self) -> Result<DeviceIndex> {
        let previous = self.device.take().unwrap_or(FIRST_DEVICE);
        self.device_address = None;
        let closed = self.driver.close_device(previous);
        info!("CloseDevice: {}", closed);
        sleep(Duration::from_millis(self.settings.reopen_delay_ms));

        match self.driver.open_device() {
            Some(device) => {
                info!("OpenDevice: Done!");
                debug!("device index {}", device.0);
                self.device = Some(device);
                Ok(device)
            }
            None => {
                error!("OpenDevice: Wrong!");
                Err(Error::OpenFailed)
            }
        }
    }

    ///Asks the adapter which slave answers on the bus and configures the I2C link for it.
    pub fn refresh_device_address(&mut self) -> Result<u8> {
        let device = self.device.ok_or(Error::DeviceNotOpen)?;
        match self.driver.i2c_auto_address(device) {
            Some(address) => {
                info!("Found i2c, the Device Address is {:#x}", address);
                self.device_address = Some(address);
                let config = self.settings.i2c_config(address);
                if !self.driver.set_i2c_config(device, &config) {
                    warn!(
                        "I2cSetConfig rejected rate {:#04x} timeouts {:#010x}",
                        config.rate,
                        config.timeout_word()
                    );
                }
                Ok(address)
            }
            None => {
                self.device_address = None;
                error!("No i2c found, check the hardware");
                Err(Error::NoDeviceAddress)
            }
        }
    }

    pub fn reconnect(&mut self) -> Result<u8> {
        self.open_device()?;
        self.refresh_device_address()
    }

    pub fn close(&mut self) -> bool {
        match self.device.take() {
            Some(device) => {
                self.device_address = None;
                let closed = self.driver.close_device(device);
                info!("CloseDevice: {}", closed);
                closed
            }
            None => false,
        }
    }

    fn target(&self) -> Result<(DeviceIndex, u8)> {
        let device = self.device.ok_or(Error::DeviceNotOpen)?;
        let address = self.device_address.ok_or(Error::NoDeviceAddress)?;
        Ok((device, address))
    }

    fn encode_all(&self, addresses: impl Iterator<Item = u16>) -> Result<Vec<(u16, [u8; 2], usize)>> {
        let width = self.settings.address_width;
        addresses
            .map(|address| width.encode(address).map(|(bytes, len)| (address, bytes, len)))
            .collect()
    }

    ///Writes one byte to each register, in order. Every register is attempted even after a failure.
    pub fn write<I>(&mut self, registers: I) -> Result<WriteReport>
    where
        I: IntoIterator<Item = (u16, u8)>,
    {
        let (device, device_address) = self.target()?;
        let registers: Vec<(u16, u8)> = registers.into_iter().collect();
        let encoded = self.encode_all(registers.iter().map(|(address, _)| *address))?;
        let width = self.settings.address_width;

        let mut report = WriteReport::new(width);
        for ((address, command, len), (_, value)) in encoded.into_iter().zip(registers) {
            let ok = self
                .driver
                .i2c_write(device, device_address, &command[..len], &[value]);
            report.record(address, ok);
            if ok {
                info!("Write register {} success", width.format(address));
            } else {
                error!("Write register {} fail", width.format(address));
            }
        }
        Ok(report)
    }

    pub fn write_register(&mut self, address: u16, value: u8) -> Result<WriteReport> {
        self.write([(address, value)])
    }

    ///Reads one byte from each register, in order.
    pub fn read<I>(&mut self, addresses: I) -> Result<ReadReport>
    where
        I: IntoIterator<Item = u16>,
    {
        let (device, device_address) = self.target()?;
        let encoded = self.encode_all(addresses.into_iter())?;

        let mut report = ReadReport::new(self.settings.address_width);
        for (address, command, len) in encoded {
            let mut buffer = [0u8; 1];
            if self
                .driver
                .i2c_read(device, device_address, &command[..len], &mut buffer)
            {
                info!("Read register {:#x} value: {:#x}", address, buffer[0]);
                report.record(address, Some(buffer[0]));
            } else {
                error!("Read register {:#x} fail", address);
                report.record(address, None);
            }
        }
        Ok(report)
    }

    pub fn read_register(&mut self, address: u16) -> Result<ReadReport> {
        self.read([address])
    }

    ///Drives the GPIO pins to `value`. Returns the driver's success flag.
    pub fn gpio_set(&mut self, value: u8) -> Result<bool> {
        let device = self.device.ok_or(Error::DeviceNotOpen)?;
        let ok = self.driver.gpio_write(device, value, 0);
        debug!("GPIOWrite({:#04x}): {}", value, ok);
        Ok(ok)
    }

    pub fn gpio_read(&mut self) -> Result<u8> {
        let device = self.device.ok_or(Error::DeviceNotOpen)?;
        self.driver.gpio_read(device).ok_or(Error::Gpio("read"))
    }

    pub fn i2c_config(&mut self) -> Result<I2cConfig> {
        let device = self.device.ok_or(Error::DeviceNotOpen)?;
        self.driver.i2c_config(device).ok_or(Error::ConfigUnavailable)
    }
}

impl<D: Driver> Drop for UsbI2c<D> {
    fn drop(&mut self) {
        if self.device.is_some() {
            self.close();
        }
    }
}
