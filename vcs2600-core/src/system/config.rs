// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use bit_field::BitField;

use crate::factory::SystemModel;

pub struct Config {
    pub model: SystemModel,
    pub console: ConsoleConfig,
}

impl Config {
    pub fn new(model: SystemModel) -> Config {
        Config {
            model,
            console: ConsoleConfig::default(),
        }
    }
}

/// Power-on position of the console switches. Difficulty true selects A (pro).
pub struct ConsoleConfig {
    pub color: bool,
    pub difficulty_0: bool,
    pub difficulty_1: bool,
}

impl ConsoleConfig {
    /// Switch state in SWCHB layout with reset and select released.
    pub fn switches(&self) -> u8 {
        let mut value = 0u8;
        value.set_bit(0, true);
        value.set_bit(1, true);
        value.set_bit(3, self.color);
        value.set_bit(6, self.difficulty_0);
        value.set_bit(7, self.difficulty_1);
        value
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        ConsoleConfig {
            color: true,
            difficulty_0: false,
            difficulty_1: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_switches() {
        assert_eq!(0x0b, ConsoleConfig::default().switches());
    }

    #[test]
    fn black_white_pro_switches() {
        let console = ConsoleConfig {
            color: false,
            difficulty_0: true,
            difficulty_1: true,
        };
        assert_eq!(0xc3, console.switches());
    }
}
