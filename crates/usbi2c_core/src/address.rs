//!Register address widths and the byte layout the driver expects for them.

use std::fmt;

use serde::{
    de::{self, Visitor},
    Deserialize, Deserializer,
};

use crate::error::{Error, Result};

///Width of a register address on the target device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressWidth {
    Bits8,
    #[default]
    Bits16,
}

impl AddressWidth {
    pub fn bits(&self) -> u8 {
        match *self {
            Self::Bits8 => 8,
            Self::Bits16 => 16,
        }
    }

    ///Number of command bytes sent ahead of the data byte.
    pub fn byte_len(&self) -> usize {
        match *self {
            Self::Bits8 => 1,
            Self::Bits16 => 2,
        }
    }

    fn hex_digits(&self) -> usize {
        self.byte_len() * 2
    }

    pub fn max_address(&self) -> u16 {
        match *self {
            Self::Bits8 => 0xFF,
            Self::Bits16 => 0xFFFF,
        }
    }

    ///Big-endian command bytes for `address`. Only the first `byte_len()` bytes of the array are meaningful.
    pub fn encode(&self, address: u16) -> Result<([u8; 2], usize)> {
        if address > self.max_address() {
            return Err(Error::AddressOutOfRange {
                address,
                width: *self,
            });
        }
        let bytes = match *self {
            Self::Bits8 => [address as u8, 0],
            Self::Bits16 => address.to_be_bytes(),
        };
        Ok((bytes, self.byte_len()))
    }

    ///Inverse of `encode`, used by adapters that receive command bytes.
    pub fn decode(&self, command: &[u8]) -> Option<u16> {
        match (*self, command) {
            (Self::Bits8, [lo]) => Some(*lo as u16),
            (Self::Bits16, [hi, lo]) => Some(u16::from_be_bytes([*hi, *lo])),
            _ => None,
        }
    }

    ///Zero padded to the width: `0x10` for 8 bit, `0x0010` for 16 bit.
    pub fn format(&self, address: u16) -> String {
        format!("0x{:0width$x}", address, width = self.hex_digits())
    }
}

impl TryFrom<u8> for AddressWidth {
    type Error = Error;

    fn try_from(bits: u8) -> Result<Self> {
        match bits {
            8 => Ok(Self::Bits8),
            16 => Ok(Self::Bits16),
            other => Err(Error::InvalidAddressWidth(other)),
        }
    }
}

impl fmt::Display for AddressWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bits", self.bits())
    }
}

impl<'de> Deserialize<'de> for AddressWidth {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        AddressWidth::try_from(bits).map_err(de::Error::custom)
    }
}

///Parses `0x` prefixed hex or plain decimal.
pub fn parse_number(s: &str) -> std::result::Result<u64, std::num::ParseIntError> {
    let s = s.trim();
    if let Some(stripped) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(stripped, 16)
    } else {
        s.parse::<u64>()
    }
}

struct NumberVisitor {
    max: u64,
}

impl<'de> Visitor<'de> for NumberVisitor {
    type Value = u64;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "an integer or a 0x string no larger than {:#x}", self.max)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<u64, E> {
        if v > self.max {
            Err(E::custom(format!("{:#x} is larger than {:#x}", v, self.max)))
        } else {
            Ok(v)
        }
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<u64, E> {
        u64::try_from(v)
            .map_err(|_| E::custom(format!("{} is negative", v)))
            .and_then(|v| self.visit_u64(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<u64, E> {
        let parsed = parse_number(v).map_err(|err| E::custom(format!("{:?}: {}", v, err)))?;
        self.visit_u64(parsed)
    }
}

///A register address as written in a session file: either an integer or a string like `"0x0010"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RegisterAddress(pub u16);

impl<'de> Deserialize<'de> for RegisterAddress {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer
            .deserialize_any(NumberVisitor { max: u16::MAX as u64 })
            .map(|v| RegisterAddress(v as u16))
    }
}

///A single byte as written in a session file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteValue(pub u8);

impl<'de> Deserialize<'de> for ByteValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer
            .deserialize_any(NumberVisitor { max: u8::MAX as u64 })
            .map(|v| ByteValue(v as u8))
    }
}
