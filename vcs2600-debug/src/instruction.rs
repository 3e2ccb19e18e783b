// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use core::fmt;

use vcs2600_core::cpu::{Opcode, Operand};

pub struct Instruction {
    pub address: u16,
    pub opcode: Opcode,
    pub operand: Operand,
}

impl Instruction {
    /// Destination of a relative branch.
    pub fn target(&self) -> Option<u16> {
        match self.operand {
            Operand::Relative(offset) => Some(
                self.address
                    .wrapping_add(self.opcode.length as u16)
                    .wrapping_add(offset as u16),
            ),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mnemonic = self.opcode.mnemonic.to_string().to_lowercase();
        let marker = if self.opcode.mnemonic.is_undocumented() {
            "*"
        } else {
            ""
        };
        match (self.target(), self.operand) {
            (Some(target), _) => write!(f, "{}{} ${:04x}", mnemonic, marker, target),
            (None, Operand::Implied) => write!(f, "{}{}", mnemonic, marker),
            (None, operand) => write!(f, "{}{} {}", mnemonic, marker, operand),
        }
    }
}
