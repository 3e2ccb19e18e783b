// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::LoadError;
use crate::factory::Addressable;
use crate::util::{new_shared, Rom, Shared};

use super::{Bus, Region};

const BASE_ADDRESS: u16 = 0xf000;
const SIZE_2K: usize = 0x0800;
const SIZE_4K: usize = 0x1000;
const INTERRUPT_VECTOR_OFFSET: usize = 0x0ffa;

struct CartridgeRom(Rom);

impl Addressable for CartridgeRom {
    fn read(&mut self, address: u16) -> u8 {
        self.0.read(address)
    }

    fn write(&mut self, _address: u16, _value: u8) {}
}

/// Program image of 2K or 4K mapped at 0xf000. A 2K image appears twice.
pub struct Cartridge {
    rom: Shared<CartridgeRom>,
}

impl Cartridge {
    pub fn load(data: &[u8]) -> Result<Cartridge, LoadError> {
        match data.len() {
            SIZE_2K | SIZE_4K => {
                info!(target: "mem::cart", "Loaded {} byte image", data.len());
                Ok(Cartridge {
                    rom: new_shared(CartridgeRom(Rom::new_with_data(data, BASE_ADDRESS))),
                })
            }
            size => Err(LoadError::UnsupportedSize(size)),
        }
    }

    pub fn size(&self) -> usize {
        self.rom.borrow().0.len()
    }

    pub fn data(&self) -> Vec<u8> {
        self.rom.borrow().0.data().to_vec()
    }

    pub fn map_onto(&self, bus: &mut Bus) {
        bus.register(Region::Cartridge.range(), Some(self.rom.clone()), None);
    }

    pub fn unmap(&self, bus: &mut Bus) {
        bus.unregister(Region::Cartridge.range());
    }

    pub fn reset_vector(&self) -> u16 {
        self.vector(self.size() - 4)
    }

    pub fn break_vector(&self) -> u16 {
        self.vector(self.size() - 2)
    }

    pub fn interrupt_vector(&self) -> Option<u16> {
        if self.size() == SIZE_4K {
            Some(self.vector(INTERRUPT_VECTOR_OFFSET))
        } else {
            None
        }
    }

    fn vector(&self, offset: usize) -> u16 {
        let rom = self.rom.borrow();
        LittleEndian::read_u16(&rom.0.data()[offset..offset + 2])
    }
}
