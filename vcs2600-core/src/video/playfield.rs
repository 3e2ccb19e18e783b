// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use bit_field::BitField;

// Hardware:
//   20 playfield bits cover one half of the visible line, 4 pixels per bit.
//   Left to right the bits come from PF0 b4..b7, PF1 b7..b0, PF2 b0..b7. The right half
//   repeats the left or draws it mirrored when reflection is enabled.

pub struct Playfield {
    pf0: u8,
    pf1: u8,
    pf2: u8,
    reflect: bool,
}

impl Playfield {
    pub fn new() -> Self {
        Self {
            pf0: 0,
            pf1: 0,
            pf2: 0,
            reflect: false,
        }
    }

    pub fn get_registers(&self) -> (u8, u8, u8) {
        (self.pf0, self.pf1, self.pf2)
    }

    pub fn is_reflected(&self) -> bool {
        self.reflect
    }

    pub fn set_pf0(&mut self, value: u8) {
        self.pf0 = value;
    }

    pub fn set_pf1(&mut self, value: u8) {
        self.pf1 = value;
    }

    pub fn set_pf2(&mut self, value: u8) {
        self.pf2 = value;
    }

    pub fn set_reflect(&mut self, value: bool) {
        self.reflect = value;
    }

    pub fn is_set(&self, x: u8) -> bool {
        let column = x / 4;
        let bit = if column < 20 {
            column
        } else if self.reflect {
            39 - column
        } else {
            column - 20
        };
        self.bit(bit)
    }

    fn bit(&self, index: u8) -> bool {
        match index {
            0..=3 => self.pf0.get_bit(4 + index as usize),
            4..=11 => self.pf1.get_bit(11 - index as usize),
            _ => self.pf2.get_bit(index as usize - 12),
        }
    }

    pub fn reset(&mut self) {
        self.pf0 = 0;
        self.pf1 = 0;
        self.pf2 = 0;
        self.reflect = false;
    }
}

impl Default for Playfield {
    fn default() -> Self {
        Self::new()
    }
}
