// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use byteorder::{ByteOrder, LittleEndian};
use vcs2600_core::cpu::{Mode, Operand, OPCODES};

use crate::instruction::Instruction;

/// Disassembler over a program image mapped at `offset`. Addresses wrap within the image.
pub struct Disassembler {
    data: Vec<u8>,
    offset: u16,
}

impl Disassembler {
    pub fn new(data: Vec<u8>, offset: u16) -> Self {
        Self { data, offset }
    }

    pub fn disassemble(&self, address: u16) -> (Instruction, usize) {
        let opcode = OPCODES[self.read_byte(address) as usize];
        let operand = match opcode.mode {
            Mode::Implied => Operand::Implied,
            Mode::Accumulator => Operand::Accumulator,
            Mode::Immediate => Operand::Immediate(self.read_byte(address.wrapping_add(1))),
            Mode::ZeroPage => Operand::ZeroPage(self.read_byte(address.wrapping_add(1))),
            Mode::ZeroPageX => Operand::ZeroPageX(self.read_byte(address.wrapping_add(1))),
            Mode::ZeroPageY => Operand::ZeroPageY(self.read_byte(address.wrapping_add(1))),
            Mode::Absolute => Operand::Absolute(self.read_word(address.wrapping_add(1))),
            Mode::AbsoluteX => Operand::AbsoluteX(self.read_word(address.wrapping_add(1))),
            Mode::AbsoluteY => Operand::AbsoluteY(self.read_word(address.wrapping_add(1))),
            Mode::IndirectX => Operand::IndirectX(self.read_byte(address.wrapping_add(1))),
            Mode::IndirectY => Operand::IndirectY(self.read_byte(address.wrapping_add(1))),
            Mode::Indirect => Operand::Indirect(self.read_word(address.wrapping_add(1))),
            Mode::Relative => Operand::Relative(self.read_byte(address.wrapping_add(1)) as i8),
        };
        let instruction = Instruction {
            address,
            opcode,
            operand,
        };
        (instruction, opcode.length as usize)
    }

    /// Format `count` consecutive instructions starting at `address`.
    pub fn listing(&self, address: u16, count: usize) -> Vec<String> {
        let mut lines = Vec::with_capacity(count);
        let mut pc = address;
        for _ in 0..count {
            let (instruction, length) = self.disassemble(pc);
            let bytes = (0..length as u16)
                .map(|i| format!("{:02x}", self.read_byte(pc.wrapping_add(i))))
                .collect::<Vec<String>>()
                .join(" ");
            lines.push(format!("{:04x}: {:<8}  {}", pc, bytes, instruction));
            pc = pc.wrapping_add(length as u16);
        }
        lines
    }

    fn read_byte(&self, address: u16) -> u8 {
        if self.data.is_empty() {
            return 0;
        }
        let index = address.wrapping_sub(self.offset) as usize % self.data.len();
        self.data[index]
    }

    fn read_word(&self, address: u16) -> u16 {
        let bytes = [self.read_byte(address), self.read_byte(address.wrapping_add(1))];
        LittleEndian::read_u16(&bytes)
    }
}
