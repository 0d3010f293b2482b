use serde::Deserialize;
use usbi2c_core::{AdapterSettings, Driver, Error};

//usbi2c_usb2uis
#[cfg(feature = "usb2uis")]
use usbi2c_usb2uis::{Usb2Uis, Usb2UisConfig};

//usbi2c_sims
#[cfg(feature = "sims")]
use usbi2c_sims::{SimulatedAdapter, SimulatedAdapterConfig};

pub type BoxedDriver = Box<dyn Driver + Send>;

/// The adapter a session talks to.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "snake_case")]
pub enum AdapterConfig {
    //usbi2c_usb2uis
    #[cfg(feature = "usb2uis")]
    Usb2uis(Usb2UisConfig),

    //usbi2c_sims
    #[cfg(feature = "sims")]
    Simulated(SimulatedAdapterConfig),
}

impl AdapterConfig {
    pub fn build(&self, settings: &AdapterSettings) -> Result<BoxedDriver, Error> {
        match self {
            #[cfg(feature = "usb2uis")]
            Self::Usb2uis(cfg) => Usb2Uis::load(cfg)
                .map(|adapter| Box::new(adapter) as BoxedDriver)
                .map_err(|err| err.into()),

            #[cfg(feature = "sims")]
            Self::Simulated(cfg) => Ok(Box::new(SimulatedAdapter::new(cfg, settings.address_width))),
        }
    }
}
