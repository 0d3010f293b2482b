//!Outcome of a batch of register reads or writes.

use serde::{
    ser::{SerializeMap, SerializeStruct},
    Serialize, Serializer,
};

use crate::address::AddressWidth;

///Aggregated result of `UsbI2c::write`. `success` is true only when every register was written.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteReport {
    pub address_width: AddressWidth,
    pub success: bool,
    pub failed_addresses: Vec<u16>,
}

///Aggregated result of `UsbI2c::read`. `data` only holds registers that were read successfully, in the order they were read.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadReport {
    pub address_width: AddressWidth,
    pub success: bool,
    pub data: Vec<(u16, u8)>,
    pub failed_addresses: Vec<u16>,
}

impl WriteReport {
    pub fn new(address_width: AddressWidth) -> Self {
        Self {
            address_width,
            success: true,
            failed_addresses: Vec::new(),
        }
    }

    pub fn record(&mut self, address: u16, ok: bool) {
        self.success = self.success && ok;
        if !ok {
            self.failed_addresses.push(address);
        }
    }
}

impl ReadReport {
    pub fn new(address_width: AddressWidth) -> Self {
        Self {
            address_width,
            success: true,
            data: Vec::new(),
            failed_addresses: Vec::new(),
        }
    }

    pub fn record(&mut self, address: u16, value: Option<u8>) {
        match value {
            Some(value) => self.data.push((address, value)),
            None => {
                self.success = false;
                self.failed_addresses.push(address);
            }
        }
    }

    ///Last value read from `address`.
    pub fn value(&self, address: u16) -> Option<u8> {
        self.data
            .iter()
            .rev()
            .find(|(a, _)| *a == address)
            .map(|(_, v)| *v)
    }
}

fn hex_list(addresses: &[u16]) -> Vec<String> {
    addresses.iter().map(|a| format!("{:#x}", a)).collect()
}

//`Data` keeps read order, so it is written as a map by hand
struct DataMap<'a> {
    address_width: AddressWidth,
    data: &'a [(u16, u8)],
}

impl Serialize for DataMap<'_> {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = ser.serialize_map(Some(self.data.len()))?;
        for (address, value) in self.data {
            map.serialize_entry(&self.address_width.format(*address), &format!("{:#x}", value))?;
        }
        map.end()
    }
}

impl Serialize for WriteReport {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = ser.serialize_struct("WriteReport", 3)?;
        s.serialize_field("Action", "Write")?;
        s.serialize_field("Success", &self.success)?;
        s.serialize_field("FailedAddresses", &hex_list(&self.failed_addresses))?;
        s.end()
    }
}

impl Serialize for ReadReport {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let data = DataMap {
            address_width: self.address_width,
            data: &self.data,
        };

        let mut s = ser.serialize_struct("ReadReport", 4)?;
        s.serialize_field("Action", "Read")?;
        s.serialize_field("Success", &self.success)?;
        s.serialize_field("Data", &data)?;
        s.serialize_field("FailedAddresses", &hex_list(&self.failed_addresses))?;
        s.end()
    }
}
