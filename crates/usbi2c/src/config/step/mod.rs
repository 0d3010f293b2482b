use std::{thread::sleep, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use usbi2c_core::{ByteValue, Driver, RegisterAddress, Result, UsbI2c};

#[derive(Debug, Deserialize)]
pub struct RegisterWriteConfig {
    pub address: RegisterAddress,
    pub value: ByteValue,
}

///One action of a session, run in order against the open adapter.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepConfig {
    Write { registers: Vec<RegisterWriteConfig> },
    Read { addresses: Vec<RegisterAddress> },
    Gpio { value: ByteValue },
    Status {
        #[serde(default)]
        gpio: bool,
    },
    Delay { ms: u64 },
    Reconnect {
        #[serde(default)]
        settle_ms: u64,
    },
}

fn log_report<T: Serialize>(report: &T) {
    match serde_json::to_string(report) {
        Ok(json) => info!("{}", json),
        Err(err) => warn!("could not render report: {}", err),
    }
}

impl StepConfig {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Write { .. } => "write",
            Self::Read { .. } => "read",
            Self::Gpio { .. } => "gpio",
            Self::Status { .. } => "status",
            Self::Delay { .. } => "delay",
            Self::Reconnect { .. } => "reconnect",
        }
    }

    ///Runs the step. `Ok(false)` means the step ran but the adapter reported a failure.
    pub fn run<D: Driver>(&self, usb_i2c: &mut UsbI2c<D>) -> Result<bool> {
        match self {
            Self::Write { registers } => {
                let report = usb_i2c.write(registers.iter().map(|r| (r.address.0, r.value.0)))?;
                log_report(&report);
                Ok(report.success)
            }
            Self::Read { addresses } => {
                let report = usb_i2c.read(addresses.iter().map(|a| a.0))?;
                log_report(&report);
                Ok(report.success)
            }
            Self::Gpio { value } => {
                let ok = usb_i2c.gpio_set(value.0)?;
                info!("GPIOWrite({:#04x}): {}", value.0, ok);
                Ok(ok)
            }
            Self::Status { gpio } => {
                let cfg = usb_i2c.i2c_config()?;
                info!(
                    "device address {:#x}, rate {:#04x}, read timeout {} ms, write timeout {} ms",
                    cfg.device_address, cfg.rate, cfg.read_timeout_ms, cfg.write_timeout_ms
                );
                if *gpio {
                    let pins = usb_i2c.gpio_read()?;
                    info!("gpio {:#010b}", pins);
                }
                Ok(true)
            }
            Self::Delay { ms } => {
                sleep(Duration::from_millis(*ms));
                Ok(true)
            }
            Self::Reconnect { settle_ms } => {
                usb_i2c.reconnect()?;
                sleep(Duration::from_millis(*settle_ms));
                Ok(true)
            }
        }
    }
}
