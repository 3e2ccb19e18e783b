// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

/// Plain read/write memory. Addresses wrap to the capacity so callers can pass
/// an unmasked bus address.
pub struct Ram {
    data: Vec<u8>,
}

impl Ram {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity],
        }
    }

    pub fn fill(&mut self, value: u8) {
        for byte in self.data.iter_mut() {
            *byte = value;
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn read(&self, address: u16) -> u8 {
        self.data[address as usize % self.data.len()]
    }

    pub fn write(&mut self, address: u16, value: u8) {
        let index = address as usize % self.data.len();
        self.data[index] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_with_capacity() {
        let ram = Ram::new(128);
        assert_eq!(128, ram.len());
    }

    #[test]
    fn read_address() {
        let ram = Ram::new(128);
        assert_eq!(0, ram.read(0x7f));
    }

    #[test]
    fn write_address() {
        let mut ram = Ram::new(128);
        ram.write(0x0001, 31);
        assert_eq!(31, ram.read(0x0001));
    }

    #[test]
    fn write_wraps_to_capacity() {
        let mut ram = Ram::new(128);
        ram.write(0x0081, 42);
        assert_eq!(42, ram.read(0x0001));
    }

    #[test]
    fn fill_all() {
        let mut ram = Ram::new(4);
        ram.fill(0xaa);
        assert_eq!(0xaa, ram.read(3));
    }
}
