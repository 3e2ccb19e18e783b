// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use std::ops::RangeInclusive;

// Hardware:
//   6507 exposes only A0-A12. Chip selects decode as follows
//     A12=1             cartridge   0xf000-0xffff
//     A12=0 A7=0        TIA         0x0000-0x003f
//     A12=0 A7=1 A9=0   RIOT RAM    0x0080-0x00ff
//     A12=0 A7=1 A9=1   RIOT I/O    0x0280-0x029f
//   Every other address aliases one of the canonical locations above.

const CHUNK_SIZE: u32 = 0x20;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Region {
    Tia,
    RiotRam,
    RiotIo,
    Cartridge,
}

impl Region {
    pub fn range(self) -> RangeInclusive<u16> {
        match self {
            Region::Tia => 0x0000..=0x003f,
            Region::RiotRam => 0x0080..=0x00ff,
            Region::RiotIo => 0x0280..=0x029f,
            Region::Cartridge => 0xf000..=0xffff,
        }
    }
}

pub struct MemoryMap;

impl MemoryMap {
    pub fn decode(address: u16) -> Region {
        if address & 0x1000 != 0 {
            Region::Cartridge
        } else if address & 0x0080 == 0 {
            Region::Tia
        } else if address & 0x0200 == 0 {
            Region::RiotRam
        } else {
            Region::RiotIo
        }
    }

    pub fn canonical(address: u16) -> u16 {
        match MemoryMap::decode(address) {
            Region::Cartridge => 0xf000 | (address & 0x0fff),
            Region::Tia => address & 0x003f,
            Region::RiotRam => 0x0080 | (address & 0x007f),
            Region::RiotIo => 0x0280 | (address & 0x001f),
        }
    }

    /// Alias ranges with the offset to subtract to reach the canonical address.
    /// Adjacent aliases sharing an offset are merged.
    pub fn mirrors() -> Vec<(RangeInclusive<u16>, u16)> {
        let mut mirrors: Vec<(RangeInclusive<u16>, u16)> = Vec::new();
        let mut chunk = 0u32;
        while chunk < 0x10000 {
            let start = chunk as u16;
            let end = (chunk + CHUNK_SIZE - 1) as u16;
            let offset = start.wrapping_sub(MemoryMap::canonical(start));
            if offset != 0 {
                let merged = match mirrors.last_mut() {
                    Some((range, last_offset))
                        if *last_offset == offset && range.end().wrapping_add(1) == start =>
                    {
                        *range = *range.start()..=end;
                        true
                    }
                    _ => false,
                };
                if !merged {
                    mirrors.push((start..=end, offset));
                }
            }
            chunk += CHUNK_SIZE;
        }
        mirrors
    }
}
