use std::collections::{BTreeMap, BTreeSet};

///Byte registers of a simulated I2C slave. Unwritten registers read as 0x00.
///
/// Multi-byte transfers auto-increment the register address, wrapping at the end of the address space.
#[derive(Debug, Default, Clone)]
pub struct RegisterBank {
    registers: BTreeMap<u16, u8>,
    nack: BTreeSet<u16>,
    max_address: u16,
}

impl RegisterBank {
    pub fn new(max_address: u16) -> Self {
        Self {
            registers: BTreeMap::new(),
            nack: BTreeSet::new(),
            max_address,
        }
    }

    ///Transfers touching `address` are not acknowledged.
    pub fn nack(&mut self, address: u16) {
        self.nack.insert(address);
    }

    pub fn get(&self, address: u16) -> u8 {
        *self.registers.get(&address).unwrap_or(&0)
    }

    pub fn set(&mut self, address: u16, value: u8) {
        self.registers.insert(address, value);
    }

    fn span(&self, start: u16, len: usize) -> Vec<u16> {
        let modulus = self.max_address as u32 + 1;
        (0..len as u32)
            .map(|i| ((start as u32 + i) % modulus) as u16)
            .collect()
    }

    pub fn write(&mut self, start: u16, data: &[u8]) -> bool {
        let span = self.span(start, data.len());
        if span.iter().any(|a| self.nack.contains(a)) {
            return false;
        }
        for (address, value) in span.into_iter().zip(data) {
            self.registers.insert(address, *value);
        }
        true
    }

    pub fn read(&self, start: u16, buffer: &mut [u8]) -> bool {
        let span = self.span(start, buffer.len());
        if span.iter().any(|a| self.nack.contains(a)) {
            return false;
        }
        for (address, slot) in span.into_iter().zip(buffer.iter_mut()) {
            *slot = self.get(address);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_increment_wraps() {
        let mut bank = RegisterBank::new(0xFF);
        assert!(bank.write(0xFE, &[1, 2, 3]));
        assert_eq!(bank.get(0xFE), 1);
        assert_eq!(bank.get(0xFF), 2);
        assert_eq!(bank.get(0x00), 3);
    }

    #[test]
    fn test_nack_blocks_whole_transfer() {
        let mut bank = RegisterBank::new(0xFFFF);
        bank.nack(0x11);
        assert!(!bank.write(0x10, &[1, 2]));
        assert_eq!(bank.get(0x10), 0);
        let mut buf = [0u8; 1];
        assert!(bank.read(0x10, &mut buf));
        assert!(!bank.read(0x11, &mut buf));
    }
}
