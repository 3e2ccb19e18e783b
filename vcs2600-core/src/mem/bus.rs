// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use std::ops::RangeInclusive;
use std::rc::Rc;

use crate::error::BusError;
use crate::factory::Addressable;
use crate::util::Shared;

// Design:
//   Bus owns a lookup table with one entry per address. An entry either redirects to a
//   canonical address (mirror) or names a reader and a writer, each an index into the
//   list of attached devices. Mirror redirects are resolved exactly once before handler
//   lookup so chains are never followed. Processor writes are staged in the journal and
//   replayed in order on commit, which the processor issues on the last cycle of the
//   instruction.

const ADDRESS_SPACE: usize = 0x10000;

#[derive(Clone, Copy, Default)]
struct Mapping {
    reader: Option<usize>,
    writer: Option<usize>,
}

pub struct Bus {
    devices: Vec<Shared<dyn Addressable>>,
    mappings: Vec<Mapping>,
    mirrors: Vec<Option<u16>>,
    journal: Vec<(u16, u8)>,
}

impl Bus {
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
            mappings: vec![Mapping::default(); ADDRESS_SPACE],
            mirrors: vec![None; ADDRESS_SPACE],
            journal: Vec::new(),
        }
    }

    // -- Mapping

    pub fn register(
        &mut self,
        range: RangeInclusive<u16>,
        reader: Option<Shared<dyn Addressable>>,
        writer: Option<Shared<dyn Addressable>>,
    ) {
        debug!(
            target: "mem::bus",
            "Mapping 0x{:04x}-0x{:04x} reader {} writer {}",
            range.start(),
            range.end(),
            reader.is_some(),
            writer.is_some()
        );
        let reader = reader.map(|device| self.attach(device));
        let writer = writer.map(|device| self.attach(device));
        for address in range {
            self.mappings[address as usize] = Mapping { reader, writer };
        }
    }

    pub fn unregister(&mut self, range: RangeInclusive<u16>) {
        debug!(
            target: "mem::bus",
            "Unmapping 0x{:04x}-0x{:04x}",
            range.start(),
            range.end()
        );
        for address in range {
            self.mappings[address as usize] = Mapping::default();
        }
        self.detach_unused();
    }

    pub fn is_mapped(&self, address: u16) -> bool {
        let mapping = &self.mappings[self.resolve(address) as usize];
        mapping.reader.is_some() || mapping.writer.is_some()
    }

    /// Redirect every address of the range to `address - offset`.
    pub fn add_mirror(&mut self, range: RangeInclusive<u16>, offset: u16) {
        for address in range {
            self.mirrors[address as usize] = Some(address.wrapping_sub(offset));
        }
    }

    pub fn remove_mirror(&mut self, range: RangeInclusive<u16>) {
        for address in range {
            self.mirrors[address as usize] = None;
        }
    }

    pub fn resolve(&self, address: u16) -> u16 {
        self.mirrors[address as usize].unwrap_or(address)
    }

    // -- Access

    pub fn read(&self, address: u16) -> Result<u8, BusError> {
        let canonical = self.resolve(address);
        match self.mappings[canonical as usize].reader {
            Some(id) => Ok(self.devices[id].borrow_mut().read(canonical)),
            None => Err(BusError::UnmappedRead(address)),
        }
    }

    pub fn read_u16(&self, address: u16) -> Result<u16, BusError> {
        let lo = self.read(address)?;
        let hi = self.read(address.wrapping_add(1))?;
        Ok(((hi as u16) << 8) | lo as u16)
    }

    pub fn write(&self, address: u16, value: u8) {
        let canonical = self.resolve(address);
        match self.mappings[canonical as usize].writer {
            Some(id) => self.devices[id].borrow_mut().write(canonical, value),
            None => warn!(
                target: "mem::bus",
                "Unmapped write 0x{:02x} to 0x{:04x}",
                value,
                address
            ),
        }
    }

    // -- Journal

    pub fn journal_write(&mut self, address: u16, value: u8) {
        self.journal.push((address, value));
    }

    pub fn journal_commit(&mut self) {
        let journal = std::mem::replace(&mut self.journal, Vec::new());
        for &(address, value) in journal.iter() {
            self.write(address, value);
        }
        self.journal = journal;
        self.journal.clear();
    }

    pub fn journal_discard(&mut self) {
        self.journal.clear();
    }

    pub fn journal_len(&self) -> usize {
        self.journal.len()
    }

    fn attach(&mut self, device: Shared<dyn Addressable>) -> usize {
        let existing = self
            .devices
            .iter()
            .position(|d| Rc::as_ptr(d) as *const u8 == Rc::as_ptr(&device) as *const u8);
        match existing {
            Some(id) => id,
            None => {
                self.devices.push(device);
                self.devices.len() - 1
            }
        }
    }

    fn detach_unused(&mut self) {
        let mut used = vec![false; self.devices.len()];
        for mapping in self.mappings.iter() {
            if let Some(id) = mapping.reader {
                used[id] = true;
            }
            if let Some(id) = mapping.writer {
                used[id] = true;
            }
        }
        if used.iter().all(|&u| u) {
            return;
        }
        let mut remap = vec![None; self.devices.len()];
        let mut devices = Vec::new();
        for (id, device) in self.devices.drain(..).enumerate() {
            if used[id] {
                remap[id] = Some(devices.len());
                devices.push(device);
            }
        }
        self.devices = devices;
        for mapping in self.mappings.iter_mut() {
            mapping.reader = mapping.reader.and_then(|id| remap[id]);
            mapping.writer = mapping.writer.and_then(|id| remap[id]);
        }
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
