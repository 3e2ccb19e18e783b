// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use bit_field::BitField;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Object {
    P0 = 0,
    P1 = 1,
    M0 = 2,
    M1 = 3,
    BL = 4,
    PF = 5,
}

impl Object {
    pub fn mask(self) -> u8 {
        1 << self as u8
    }
}

// Latch layout: (first, second, read register, bit)
const PAIRS: [(Object, Object, u8, usize); 15] = [
    (Object::M0, Object::P1, 0x00, 7),
    (Object::M0, Object::P0, 0x00, 6),
    (Object::M1, Object::P0, 0x01, 7),
    (Object::M1, Object::P1, 0x01, 6),
    (Object::P0, Object::PF, 0x02, 7),
    (Object::P0, Object::BL, 0x02, 6),
    (Object::P1, Object::PF, 0x03, 7),
    (Object::P1, Object::BL, 0x03, 6),
    (Object::M0, Object::PF, 0x04, 7),
    (Object::M0, Object::BL, 0x04, 6),
    (Object::M1, Object::PF, 0x05, 7),
    (Object::M1, Object::BL, 0x05, 6),
    (Object::BL, Object::PF, 0x06, 7),
    (Object::P0, Object::P1, 0x07, 7),
    (Object::M0, Object::M1, 0x07, 6),
];

/// One latch per unordered pair of objects, set when both draw the same pixel.
pub struct Collisions {
    latches: u16,
}

impl Collisions {
    pub fn new() -> Self {
        Self { latches: 0 }
    }

    /// Latch every pair fully contained in the set of objects drawing this pixel.
    pub fn update(&mut self, objects: u8) {
        if objects.count_ones() < 2 {
            return;
        }
        for (i, &(first, second, _, _)) in PAIRS.iter().enumerate() {
            let pair = first.mask() | second.mask();
            if objects & pair == pair {
                self.latches.set_bit(i, true);
            }
        }
    }

    pub fn test(&self, first: Object, second: Object) -> bool {
        PAIRS.iter().enumerate().any(|(i, &(a, b, _, _))| {
            ((a == first && b == second) || (a == second && b == first)) && self.latches.get_bit(i)
        })
    }

    /// Value of collision register CXM0P..CXPPMM; bits 0-5 read as zero.
    pub fn read(&self, reg: u8) -> u8 {
        let mut value = 0u8;
        for (i, &(_, _, register, bit)) in PAIRS.iter().enumerate() {
            if register == reg && self.latches.get_bit(i) {
                value.set_bit(bit, true);
            }
        }
        value
    }

    pub fn is_clear(&self) -> bool {
        self.latches == 0
    }

    pub fn clear(&mut self) {
        self.latches = 0;
    }
}

impl Default for Collisions {
    fn default() -> Self {
        Self::new()
    }
}
