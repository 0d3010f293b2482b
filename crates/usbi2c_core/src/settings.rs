use serde::Deserialize;

use crate::address::AddressWidth;

///I2C rate code for 400 kHz.
pub const RATE_400_KHZ: u8 = 0x04;

///Handle the driver hands out for an opened adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceIndex(pub u8);

impl DeviceIndex {
    ///Raw value the driver returns when no adapter could be opened.
    pub const INVALID: u8 = 0xFF;

    pub fn from_raw(raw: u8) -> Option<Self> {
        if raw == Self::INVALID {
            None
        } else {
            Some(Self(raw))
        }
    }
}

///The driver's I2C configuration for one adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2cConfig {
    pub device_address: u8,
    pub rate: u8,
    pub read_timeout_ms: u16,
    pub write_timeout_ms: u16,
}

impl I2cConfig {
    ///Timeouts as the driver takes them: read timeout in the high half, write timeout in the low half.
    pub fn timeout_word(&self) -> u32 {
        ((self.read_timeout_ms as u32) << 16) | (self.write_timeout_ms as u32)
    }

    pub fn from_raw(device_address: u8, rate: u8, timeout_word: u32) -> Self {
        Self {
            device_address,
            rate,
            read_timeout_ms: (timeout_word >> 16) as u16,
            write_timeout_ms: (timeout_word & 0xFFFF) as u16,
        }
    }
}

///Settings applied by `UsbI2c::init` and `UsbI2c::refresh_device_address`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdapterSettings {
    pub address_width: AddressWidth,
    pub rate: u8,
    pub read_timeout_ms: u16,
    pub write_timeout_ms: u16,
    //direction byte passed to SetGPIOConfig during init
    pub gpio_directions: u8,
    pub reopen_delay_ms: u64,
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            address_width: AddressWidth::Bits16,
            rate: RATE_400_KHZ,
            read_timeout_ms: 200,
            write_timeout_ms: 200,
            gpio_directions: 0x00,
            reopen_delay_ms: 10,
        }
    }
}

impl AdapterSettings {
    pub fn with_address_width(address_width: AddressWidth) -> Self {
        Self {
            address_width,
            ..Default::default()
        }
    }

    pub fn i2c_config(&self, device_address: u8) -> I2cConfig {
        I2cConfig {
            device_address,
            rate: self.rate,
            read_timeout_ms: self.read_timeout_ms,
            write_timeout_ms: self.write_timeout_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeout_word() {
        let cfg = AdapterSettings::default().i2c_config(0x50);
        assert_eq!(cfg.timeout_word(), 0x00C8_00C8);
        assert_eq!(cfg.rate, 0x04);
    }

    #[test]
    fn test_timeout_word_halves() {
        let cfg = I2cConfig::from_raw(0x20, 0x01, 0x0064_03E8);
        assert_eq!(cfg.read_timeout_ms, 100);
        assert_eq!(cfg.write_timeout_ms, 1000);
        assert_eq!(cfg.timeout_word(), 0x0064_03E8);
    }

    #[test]
    fn test_device_index_from_raw() {
        assert_eq!(DeviceIndex::from_raw(0), Some(DeviceIndex(0)));
        assert_eq!(DeviceIndex::from_raw(0xFF), None);
    }

    #[test]
    fn test_settings_partial_deserialize() {
        let settings: AdapterSettings =
            serde_json::from_str(r#"{ "address_width": 8, "read_timeout_ms": 50 }"#).unwrap();
        assert_eq!(settings.address_width, AddressWidth::Bits8);
        assert_eq!(settings.read_timeout_ms, 50);
        assert_eq!(settings.write_timeout_ms, 200);
        assert_eq!(settings.reopen_delay_ms, 10);
    }
}
