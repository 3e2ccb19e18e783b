// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use core::fmt;
use log::Level;

use crate::error::BusError;
use crate::factory::{Cpu, Register};
use crate::mem::Bus;
use crate::util::bcd::{from_bcd, to_bcd};
use crate::util::Shared;

use super::{Mnemonic, Opcode, Operand, OPCODES};

// Hardware: http://nesdev.com/6502.txt
// Design:
//   CPU decodes and executes a whole instruction when it is fetched, then waits out the
//   remaining cycles of that instruction. Writes issued while executing go to the bus
//   journal and are committed on the last cycle, so other chips observe them at the
//   proper time. 6507 has no interrupt pins, the only vectored entry is BRK.

const BREAK_VECTOR: u16 = 0xfffe;
const STACK_BASE: u16 = 0x0100;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flag {
    Carry = 1,
    Zero = 1 << 1,
    IntDisable = 1 << 2,
    Decimal = 1 << 3,
    Break = 1 << 4,
    Reserved = 1 << 5,
    Overflow = 1 << 6,
    Negative = 1 << 7,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    Fetching,
    Waiting(u8),
}

struct Registers {
    a: u8,
    x: u8,
    y: u8,
    sp: u8,
    pc: u16,
    p: u8,
}

impl Registers {
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xfd,
            pc: 0,
            p: Flag::IntDisable as u8 | Flag::Reserved as u8,
        }
    }

    pub fn reset(&mut self) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.sp = 0xfd;
        self.pc = 0;
        self.p = Flag::IntDisable as u8 | Flag::Reserved as u8;
    }
}

pub struct Cpu6507 {
    // Dependencies
    mem: Shared<Bus>,
    // Runtime State
    regs: Registers,
    state: State,
    extra_cycles: u8,
    last_cycles: u8,
    cycles: u64,
}

impl Cpu6507 {
    pub fn new(mem: Shared<Bus>) -> Self {
        Self {
            mem,
            regs: Registers::new(),
            state: State::Fetching,
            extra_cycles: 0,
            last_cycles: 0,
            cycles: 0,
        }
    }

    // -- Getters/Setters

    pub fn get_a(&self) -> u8 {
        self.regs.a
    }

    pub fn get_x(&self) -> u8 {
        self.regs.x
    }

    pub fn get_y(&self) -> u8 {
        self.regs.y
    }

    pub fn get_p(&self) -> u8 {
        self.regs.p
    }

    pub fn get_sp(&self) -> u8 {
        self.regs.sp
    }

    pub fn set_a(&mut self, value: u8) {
        self.regs.a = value;
    }

    pub fn set_x(&mut self, value: u8) {
        self.regs.x = value;
    }

    pub fn set_y(&mut self, value: u8) {
        self.regs.y = value;
    }

    pub fn set_p(&mut self, value: u8) {
        self.regs.p = value;
    }

    pub fn set_sp(&mut self, value: u8) {
        self.regs.sp = value;
    }

    pub fn is_fetching(&self) -> bool {
        self.state == State::Fetching
    }

    pub fn set_flag(&mut self, flag: Flag, value: bool) {
        if value {
            self.regs.p |= flag as u8;
        } else {
            self.regs.p &= !(flag as u8);
        }
    }

    pub fn test_flag(&self, flag: Flag) -> bool {
        (self.regs.p & (flag as u8)) != 0
    }

    pub fn update_nz(&mut self, value: u8) {
        self.set_flag(Flag::Negative, value & 0x80 != 0);
        self.set_flag(Flag::Zero, value == 0);
    }

    // -- Execution

    fn execute_next(&mut self) -> Result<u8, BusError> {
        let pc = self.regs.pc;
        let opcode_value = self.fetch_byte()?;
        let opcode = &OPCODES[opcode_value as usize];
        let op = Operand::decode(opcode.mode, self)?;
        if log_enabled!(target: "cpu::ins", Level::Trace) {
            let op_value = format!("{} {}", opcode.mnemonic, op);
            trace!(target: "cpu::ins", "0x{:04x}: {:14}; {}", pc, op_value, &self);
        }
        self.extra_cycles = 0;
        self.execute(opcode, &op)?;
        Ok(opcode.cycles + self.extra_cycles)
    }

    fn execute(&mut self, opcode: &Opcode, op: &Operand) -> Result<(), BusError> {
        match opcode.mnemonic {
            // Data Movement
            Mnemonic::LDA => {
                let value = op.get(self, false)?;
                self.update_nz(value);
                self.regs.a = value;
            }
            Mnemonic::LDX => {
                let value = op.get(self, false)?;
                self.update_nz(value);
                self.regs.x = value;
            }
            Mnemonic::LDY => {
                let value = op.get(self, false)?;
                self.update_nz(value);
                self.regs.y = value;
            }
            Mnemonic::PHA => {
                let value = self.regs.a;
                self.push(value);
            }
            Mnemonic::PHP => {
                // NOTE break and reserved always read back as set
                let value = self.regs.p | (Flag::Break as u8) | (Flag::Reserved as u8);
                self.push(value);
            }
            Mnemonic::PLA => {
                let value = self.pop()?;
                self.update_nz(value);
                self.regs.a = value;
            }
            Mnemonic::PLP => {
                let value = self.pop()?;
                self.load_status(value);
            }
            Mnemonic::STA => {
                let value = self.regs.a;
                op.set(self, value)?;
            }
            Mnemonic::STX => {
                let value = self.regs.x;
                op.set(self, value)?;
            }
            Mnemonic::STY => {
                let value = self.regs.y;
                op.set(self, value)?;
            }
            Mnemonic::TAX => {
                let value = self.regs.a;
                self.update_nz(value);
                self.regs.x = value;
            }
            Mnemonic::TAY => {
                let value = self.regs.a;
                self.update_nz(value);
                self.regs.y = value;
            }
            Mnemonic::TSX => {
                let value = self.regs.sp;
                self.update_nz(value);
                self.regs.x = value;
            }
            Mnemonic::TXA => {
                let value = self.regs.x;
                self.update_nz(value);
                self.regs.a = value;
            }
            Mnemonic::TXS => {
                // NOTE do not set nz
                self.regs.sp = self.regs.x;
            }
            Mnemonic::TYA => {
                let value = self.regs.y;
                self.update_nz(value);
                self.regs.a = value;
            }
            // Arithmetic
            Mnemonic::ADC => {
                let value = op.get(self, false)?;
                self.add_with_carry(value);
            }
            Mnemonic::SBC => {
                let value = op.get(self, false)?;
                self.subtract_with_borrow(value);
            }
            Mnemonic::CMP => {
                let value = op.get(self, false)?;
                self.compare(self.regs.a, value);
            }
            Mnemonic::CPX => {
                let value = op.get(self, false)?;
                self.compare(self.regs.x, value);
            }
            Mnemonic::CPY => {
                let value = op.get(self, false)?;
                self.compare(self.regs.y, value);
            }
            Mnemonic::DEC => {
                let result = op.get(self, true)?.wrapping_sub(1);
                self.update_nz(result);
                op.set(self, result)?;
            }
            Mnemonic::DEX => {
                let result = self.regs.x.wrapping_sub(1);
                self.update_nz(result);
                self.regs.x = result;
            }
            Mnemonic::DEY => {
                let result = self.regs.y.wrapping_sub(1);
                self.update_nz(result);
                self.regs.y = result;
            }
            Mnemonic::INC => {
                let result = op.get(self, true)?.wrapping_add(1);
                self.update_nz(result);
                op.set(self, result)?;
            }
            Mnemonic::INX => {
                let result = self.regs.x.wrapping_add(1);
                self.update_nz(result);
                self.regs.x = result;
            }
            Mnemonic::INY => {
                let result = self.regs.y.wrapping_add(1);
                self.update_nz(result);
                self.regs.y = result;
            }
            // Logical
            Mnemonic::AND => {
                let result = op.get(self, false)? & self.regs.a;
                self.update_nz(result);
                self.regs.a = result;
            }
            Mnemonic::EOR => {
                let result = op.get(self, false)? ^ self.regs.a;
                self.update_nz(result);
                self.regs.a = result;
            }
            Mnemonic::ORA => {
                let result = op.get(self, false)? | self.regs.a;
                self.update_nz(result);
                self.regs.a = result;
            }
            // Shift and Rotate
            Mnemonic::ASL => {
                let value = op.get(self, true)?;
                let result = self.shift_left(value);
                op.set(self, result)?;
            }
            Mnemonic::LSR => {
                let value = op.get(self, true)?;
                let result = self.shift_right(value);
                op.set(self, result)?;
            }
            Mnemonic::ROL => {
                let value = op.get(self, true)?;
                let result = self.rotate_left(value);
                op.set(self, result)?;
            }
            Mnemonic::ROR => {
                let value = op.get(self, true)?;
                let result = self.rotate_right(value);
                op.set(self, result)?;
            }
            // Control Flow
            Mnemonic::BCC => self.branch(op, !self.test_flag(Flag::Carry))?,
            Mnemonic::BCS => self.branch(op, self.test_flag(Flag::Carry))?,
            Mnemonic::BEQ => self.branch(op, self.test_flag(Flag::Zero))?,
            Mnemonic::BMI => self.branch(op, self.test_flag(Flag::Negative))?,
            Mnemonic::BNE => self.branch(op, !self.test_flag(Flag::Zero))?,
            Mnemonic::BPL => self.branch(op, !self.test_flag(Flag::Negative))?,
            Mnemonic::BVC => self.branch(op, !self.test_flag(Flag::Overflow))?,
            Mnemonic::BVS => self.branch(op, self.test_flag(Flag::Overflow))?,
            Mnemonic::JMP => {
                let (address, _) = op.ea(self)?;
                self.regs.pc = address;
            }
            Mnemonic::JSR => {
                let (address, _) = op.ea(self)?;
                let pc = self.regs.pc.wrapping_sub(1);
                self.push_u16(pc);
                self.regs.pc = address;
            }
            Mnemonic::RTS => {
                let address = self.pop_u16()?;
                self.regs.pc = address.wrapping_add(1);
            }
            // Misc
            Mnemonic::BIT => {
                let value = op.get(self, false)?;
                let a = self.regs.a;
                self.set_flag(Flag::Negative, value & 0x80 != 0);
                self.set_flag(Flag::Overflow, 0x40 & value != 0);
                self.set_flag(Flag::Zero, value & a == 0);
            }
            Mnemonic::BRK => {
                let pc = self.regs.pc.wrapping_add(1);
                self.push_u16(pc);
                let p = self.regs.p | (Flag::Break as u8) | (Flag::Reserved as u8);
                self.push(p);
                self.set_flag(Flag::IntDisable, true);
                self.regs.pc = self.read_u16(BREAK_VECTOR)?;
            }
            Mnemonic::CLC => self.set_flag(Flag::Carry, false),
            Mnemonic::CLD => self.set_flag(Flag::Decimal, false),
            Mnemonic::CLI => self.set_flag(Flag::IntDisable, false),
            Mnemonic::CLV => self.set_flag(Flag::Overflow, false),
            Mnemonic::NOP => match *op {
                Operand::Implied | Operand::Immediate(_) => {}
                _ => {
                    op.get(self, false)?;
                }
            },
            Mnemonic::SEC => self.set_flag(Flag::Carry, true),
            Mnemonic::SED => self.set_flag(Flag::Decimal, true),
            Mnemonic::SEI => self.set_flag(Flag::IntDisable, true),
            Mnemonic::RTI => {
                let value = self.pop()?;
                self.load_status(value);
                self.regs.pc = self.pop_u16()?;
            }
            // Undocumented
            Mnemonic::ALR => {
                let value = self.regs.a & op.get(self, false)?;
                self.regs.a = self.shift_right(value);
            }
            Mnemonic::ANC => {
                let result = self.regs.a & op.get(self, false)?;
                self.update_nz(result);
                self.set_flag(Flag::Carry, result & 0x80 != 0);
                self.regs.a = result;
            }
            Mnemonic::ARR => {
                let value = self.regs.a & op.get(self, false)?;
                let carry = if self.test_flag(Flag::Carry) { 0x80 } else { 0 };
                let result = (value >> 1) | carry;
                self.update_nz(result);
                self.set_flag(Flag::Carry, result & 0x40 != 0);
                self.set_flag(
                    Flag::Overflow,
                    ((result >> 6) ^ (result >> 5)) & 0x01 != 0,
                );
                self.regs.a = result;
            }
            Mnemonic::DCP => {
                let result = op.get(self, true)?.wrapping_sub(1);
                op.set(self, result)?;
                self.compare(self.regs.a, result);
            }
            Mnemonic::ISB => {
                let result = op.get(self, true)?.wrapping_add(1);
                op.set(self, result)?;
                self.subtract_with_borrow(result);
            }
            Mnemonic::LAX => {
                let value = op.get(self, false)?;
                self.update_nz(value);
                self.regs.a = value;
                self.regs.x = value;
            }
            Mnemonic::RLA => {
                let value = op.get(self, true)?;
                let shifted = self.rotate_left(value);
                op.set(self, shifted)?;
                let result = self.regs.a & shifted;
                self.update_nz(result);
                self.regs.a = result;
            }
            Mnemonic::RRA => {
                let value = op.get(self, true)?;
                let shifted = self.rotate_right(value);
                op.set(self, shifted)?;
                self.add_with_carry(shifted);
            }
            Mnemonic::SAX => {
                let value = self.regs.a & self.regs.x;
                op.set(self, value)?;
            }
            Mnemonic::SBX => {
                let value = op.get(self, false)?;
                let ax = self.regs.a & self.regs.x;
                let result = ax.wrapping_sub(value);
                self.set_flag(Flag::Carry, ax >= value);
                self.update_nz(result);
                self.regs.x = result;
            }
            Mnemonic::SLO => {
                let value = op.get(self, true)?;
                let shifted = self.shift_left(value);
                op.set(self, shifted)?;
                let result = self.regs.a | shifted;
                self.update_nz(result);
                self.regs.a = result;
            }
            Mnemonic::SRE => {
                let value = op.get(self, true)?;
                let shifted = self.shift_right(value);
                op.set(self, shifted)?;
                let result = self.regs.a ^ shifted;
                self.update_nz(result);
                self.regs.a = result;
            }
        }
        Ok(())
    }

    // -- Primitives

    fn add_with_carry(&mut self, value: u8) {
        let ac = self.regs.a as u16;
        let value = value as u16;
        let carry = if self.test_flag(Flag::Carry) { 1 } else { 0 };
        let sum = ac + value + carry;
        self.set_flag(
            Flag::Overflow,
            (ac ^ value) & 0x80 == 0 && (ac ^ sum) & 0x80 != 0,
        );
        let result = if self.test_flag(Flag::Decimal) {
            let total = from_bcd(ac as u8) as u16 + from_bcd(value as u8) as u16 + carry;
            self.set_flag(Flag::Carry, total > 99);
            to_bcd((total % 100) as u8)
        } else {
            self.set_flag(Flag::Carry, sum > 0xff);
            (sum & 0xff) as u8
        };
        self.update_nz(result);
        self.regs.a = result;
    }

    fn subtract_with_borrow(&mut self, value: u8) {
        let ac = self.regs.a as i16;
        let value = value as i16;
        let borrow = if self.test_flag(Flag::Carry) { 0 } else { 1 };
        let diff = ac - value - borrow;
        self.set_flag(
            Flag::Overflow,
            (ac ^ value) & 0x80 != 0 && (ac ^ diff) & 0x80 != 0,
        );
        let result = if self.test_flag(Flag::Decimal) {
            let total = from_bcd(ac as u8) as i16 - from_bcd(value as u8) as i16 - borrow;
            self.set_flag(Flag::Carry, total >= 0);
            to_bcd(total.rem_euclid(100) as u8)
        } else {
            self.set_flag(Flag::Carry, diff >= 0);
            (diff & 0xff) as u8
        };
        self.update_nz(result);
        self.regs.a = result;
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.set_flag(Flag::Carry, register >= value);
        self.update_nz(register.wrapping_sub(value));
    }

    fn shift_left(&mut self, value: u8) -> u8 {
        self.set_flag(Flag::Carry, (value & 0x80) != 0);
        let result = value << 1;
        self.update_nz(result);
        result
    }

    fn shift_right(&mut self, value: u8) -> u8 {
        self.set_flag(Flag::Carry, (value & 0x01) != 0);
        let result = value >> 1;
        self.update_nz(result);
        result
    }

    fn rotate_left(&mut self, value: u8) -> u8 {
        let carry = if self.test_flag(Flag::Carry) { 0x01 } else { 0 };
        self.set_flag(Flag::Carry, (value & 0x80) != 0);
        let result = (value << 1) | carry;
        self.update_nz(result);
        result
    }

    fn rotate_right(&mut self, value: u8) -> u8 {
        let carry = if self.test_flag(Flag::Carry) { 0x80 } else { 0 };
        self.set_flag(Flag::Carry, (value & 0x01) != 0);
        let result = (value >> 1) | carry;
        self.update_nz(result);
        result
    }

    fn branch(&mut self, op: &Operand, condition: bool) -> Result<(), BusError> {
        if condition {
            let (address, page_crossed) = op.ea(self)?;
            self.add_cycles(if page_crossed { 2 } else { 1 });
            self.regs.pc = address;
        }
        Ok(())
    }

    fn load_status(&mut self, value: u8) {
        self.regs.p = (value | Flag::Reserved as u8) & !(Flag::Break as u8);
    }

    fn pop(&mut self) -> Result<u8, BusError> {
        self.regs.sp = self.regs.sp.wrapping_add(1);
        self.read_internal(STACK_BASE + self.regs.sp as u16)
    }

    fn pop_u16(&mut self) -> Result<u16, BusError> {
        let lo = self.pop()?;
        let hi = self.pop()?;
        Ok(((hi as u16) << 8) | lo as u16)
    }

    fn push(&mut self, value: u8) {
        let address = STACK_BASE + self.regs.sp as u16;
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.write_internal(address, value);
    }

    fn push_u16(&mut self, value: u16) {
        self.push((value >> 8) as u8);
        self.push((value & 0xff) as u8);
    }

    pub(crate) fn add_cycles(&mut self, cycles: u8) {
        self.extra_cycles += cycles;
    }

    pub(crate) fn commit(&mut self) {
        self.mem.borrow_mut().journal_commit();
    }

    // -- Memory Ops

    pub fn fetch_byte(&mut self) -> Result<u8, BusError> {
        let byte = self.read_internal(self.regs.pc)?;
        self.regs.pc = self.regs.pc.wrapping_add(1);
        Ok(byte)
    }

    pub fn fetch_word(&mut self) -> Result<u16, BusError> {
        let word = self.read_u16(self.regs.pc)?;
        self.regs.pc = self.regs.pc.wrapping_add(2);
        Ok(word)
    }

    pub fn read_internal(&self, address: u16) -> Result<u8, BusError> {
        self.mem.borrow().read(address)
    }

    pub fn read_u16(&self, address: u16) -> Result<u16, BusError> {
        self.mem.borrow().read_u16(address)
    }

    /// Pointer fetch that stays within page zero.
    pub fn read_zero_page_u16(&self, address: u8) -> Result<u16, BusError> {
        let lo = self.read_internal(address as u16)?;
        let hi = self.read_internal(address.wrapping_add(1) as u16)?;
        Ok(((hi as u16) << 8) | lo as u16)
    }

    pub fn write_internal(&mut self, address: u16, value: u8) {
        self.mem.borrow_mut().journal_write(address, value);
    }

    // -- I/O

    pub fn read(&self, address: u16) -> Result<u8, BusError> {
        self.read_internal(address)
    }

    /// Write straight to the bus, bypassing the journal.
    pub fn write(&mut self, address: u16, value: u8) {
        self.mem.borrow().write(address, value);
    }
}

impl Cpu for Cpu6507 {
    fn get_register(&self, reg: Register) -> u8 {
        match reg {
            Register::A => self.regs.a,
            Register::X => self.regs.x,
            Register::Y => self.regs.y,
            Register::SP => self.regs.sp,
            Register::PCL => (self.regs.pc & 0xff) as u8,
            Register::PCH => (self.regs.pc >> 8) as u8,
            Register::P => self.regs.p,
        }
    }

    fn set_register(&mut self, reg: Register, value: u8) {
        match reg {
            Register::A => self.regs.a = value,
            Register::X => self.regs.x = value,
            Register::Y => self.regs.y = value,
            Register::SP => self.regs.sp = value,
            Register::PCL => self.regs.pc = (self.regs.pc & 0xff00) | value as u16,
            Register::PCH => self.regs.pc = (self.regs.pc & 0x00ff) | ((value as u16) << 8),
            Register::P => self.regs.p = value,
        }
    }

    fn get_pc(&self) -> u16 {
        self.regs.pc
    }

    fn set_pc(&mut self, value: u16) {
        self.regs.pc = value;
    }

    fn get_cycles(&self) -> u64 {
        self.cycles
    }

    fn get_last_cycles(&self) -> u8 {
        self.last_cycles
    }

    fn step(&mut self) -> Result<bool, BusError> {
        match self.state {
            State::Waiting(remaining) => {
                if remaining <= 1 {
                    self.commit();
                    self.state = State::Fetching;
                } else {
                    self.state = State::Waiting(remaining - 1);
                }
                Ok(false)
            }
            State::Fetching => match self.execute_next() {
                Ok(cycles) => {
                    self.last_cycles = cycles;
                    self.cycles += cycles as u64;
                    if cycles > 1 {
                        self.state = State::Waiting(cycles - 1);
                    } else {
                        self.commit();
                    }
                    Ok(true)
                }
                Err(err) => {
                    self.mem.borrow_mut().journal_discard();
                    Err(err)
                }
            },
        }
    }

    fn reset(&mut self, pc: u16) {
        self.regs.reset();
        self.regs.pc = pc;
        self.state = State::Fetching;
        self.extra_cycles = 0;
        self.last_cycles = 0;
        self.mem.borrow_mut().journal_discard();
    }
}

impl fmt::Display for Cpu6507 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |flag: Flag, set: char, clear: char| {
            if self.test_flag(flag) {
                set
            } else {
                clear
            }
        };
        write!(
            f,
            "{:02x} {:02x} {:02x} {:02x} {}{}{}{}{}{}{}",
            self.regs.a,
            self.regs.x,
            self.regs.y,
            self.regs.sp,
            flag(Flag::Negative, 'N', 'n'),
            flag(Flag::Overflow, 'V', 'v'),
            flag(Flag::Break, 'B', 'b'),
            flag(Flag::Decimal, 'D', 'd'),
            flag(Flag::IntDisable, 'I', 'i'),
            flag(Flag::Zero, 'Z', 'z'),
            flag(Flag::Carry, 'C', 'c'),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::Addressable;
    use crate::util::{new_shared, Ram};

    struct MockMemory {
        ram: Ram,
    }

    impl Addressable for MockMemory {
        fn read(&mut self, address: u16) -> u8 {
            self.ram.read(address)
        }

        fn write(&mut self, address: u16, value: u8) {
            self.ram.write(address, value);
        }
    }

    fn setup_cpu() -> Cpu6507 {
        let mem = new_shared(MockMemory {
            ram: Ram::new(0x10000),
        });
        let mut bus = Bus::new();
        bus.register(0x0000..=0xffff, Some(mem.clone()), Some(mem));
        let mut cpu = Cpu6507::new(new_shared(bus));
        cpu.reset(0x1000);
        cpu
    }

    fn load(cpu: &mut Cpu6507, address: u16, program: &[u8]) {
        for (i, byte) in program.iter().enumerate() {
            cpu.write(address + i as u16, *byte);
        }
        cpu.set_pc(address);
    }

    /// Runs one instruction to completion and returns the number of cycles it took.
    fn run_instruction(cpu: &mut Cpu6507) -> u8 {
        assert_eq!(Ok(true), cpu.step());
        let mut cycles = 1;
        while !cpu.is_fetching() {
            assert_eq!(Ok(false), cpu.step());
            cycles += 1;
        }
        cycles
    }

    #[test]
    fn reset_state() {
        let cpu = setup_cpu();
        assert_eq!(0x1000, cpu.get_pc());
        assert_eq!(0xfd, cpu.get_sp());
        assert_eq!(0x24, cpu.get_p());
        assert!(cpu.is_fetching());
    }

    #[test]
    fn update_nz_flags() {
        let mut cpu = setup_cpu();
        for value in 0..=255u8 {
            cpu.update_nz(value);
            assert_eq!(value == 0, cpu.test_flag(Flag::Zero));
            assert_eq!(value & 0x80 != 0, cpu.test_flag(Flag::Negative));
        }
    }

    #[test]
    fn set_flag_touches_single_bit() {
        let mut cpu = setup_cpu();
        cpu.set_p(0x00);
        cpu.set_flag(Flag::Overflow, true);
        assert_eq!(0x40, cpu.get_p());
        cpu.set_flag(Flag::Overflow, false);
        assert_eq!(0x00, cpu.get_p());
    }

    #[test]
    fn adc_80_16() {
        let mut cpu = setup_cpu();
        cpu.set_a(80);
        cpu.set_flag(Flag::Carry, false);
        cpu.add_with_carry(16);
        assert_eq!(96, cpu.get_a());
        assert!(!cpu.test_flag(Flag::Carry));
        assert!(!cpu.test_flag(Flag::Negative));
        assert!(!cpu.test_flag(Flag::Overflow));
        assert!(!cpu.test_flag(Flag::Zero));
    }

    #[test]
    fn adc_signed_overflow() {
        let mut cpu = setup_cpu();
        cpu.set_a(0x50);
        cpu.set_flag(Flag::Carry, false);
        cpu.add_with_carry(0x50);
        assert_eq!(0xa0, cpu.get_a());
        assert!(cpu.test_flag(Flag::Overflow));
        assert!(cpu.test_flag(Flag::Negative));
        assert!(!cpu.test_flag(Flag::Carry));
    }

    #[test]
    fn adc_sbc_inverse() {
        let mut cpu = setup_cpu();
        for a in 0..=255u8 {
            for m in 0..=255u8 {
                for &carry in [false, true].iter() {
                    cpu.set_a(a);
                    cpu.set_flag(Flag::Carry, carry);
                    cpu.add_with_carry(m);
                    // SBC subtracts the inverted carry, so !carry cancels the carry ADC added
                    cpu.set_flag(Flag::Carry, !carry);
                    cpu.subtract_with_borrow(m);
                    assert_eq!(a, cpu.get_a(), "a {:02x} m {:02x} c {}", a, m, carry);
                }
            }
        }
    }

    #[test]
    fn sbc_borrow() {
        let mut cpu = setup_cpu();
        cpu.set_a(0x10);
        cpu.set_flag(Flag::Carry, true);
        cpu.subtract_with_borrow(0x20);
        assert_eq!(0xf0, cpu.get_a());
        assert!(!cpu.test_flag(Flag::Carry));
        assert!(cpu.test_flag(Flag::Negative));
    }

    #[test]
    fn adc_decimal() {
        let mut cpu = setup_cpu();
        cpu.set_flag(Flag::Decimal, true);
        cpu.set_a(0x19);
        cpu.set_flag(Flag::Carry, false);
        cpu.add_with_carry(0x01);
        assert_eq!(0x20, cpu.get_a());
        assert!(!cpu.test_flag(Flag::Carry));
        cpu.set_a(0x99);
        cpu.set_flag(Flag::Carry, false);
        cpu.add_with_carry(0x01);
        assert_eq!(0x00, cpu.get_a());
        assert!(cpu.test_flag(Flag::Carry));
        assert!(cpu.test_flag(Flag::Zero));
    }

    #[test]
    fn sbc_decimal() {
        let mut cpu = setup_cpu();
        cpu.set_flag(Flag::Decimal, true);
        cpu.set_a(0x20);
        cpu.set_flag(Flag::Carry, true);
        cpu.subtract_with_borrow(0x01);
        assert_eq!(0x19, cpu.get_a());
        assert!(cpu.test_flag(Flag::Carry));
        cpu.set_a(0x00);
        cpu.set_flag(Flag::Carry, true);
        cpu.subtract_with_borrow(0x01);
        assert_eq!(0x99, cpu.get_a());
        assert!(!cpu.test_flag(Flag::Carry));
    }

    #[test]
    fn inc_with_overflow() {
        let mut cpu = setup_cpu();
        load(&mut cpu, 0x1000, &[0xe6, 0x10]);
        cpu.write(0x0010, 0xff);
        assert_eq!(5, run_instruction(&mut cpu));
        assert_eq!(Ok(0x00), cpu.read(0x0010));
        assert!(cpu.test_flag(Flag::Zero));
        assert!(!cpu.test_flag(Flag::Negative));
    }

    #[test]
    fn write_committed_on_last_cycle() {
        let mut cpu = setup_cpu();
        load(&mut cpu, 0x1000, &[0x85, 0x10]);
        cpu.set_a(0x42);
        assert_eq!(Ok(true), cpu.step());
        assert_eq!(Ok(0x00), cpu.read(0x0010));
        assert_eq!(Ok(false), cpu.step());
        assert_eq!(Ok(false), cpu.step());
        assert_eq!(Ok(0x42), cpu.read(0x0010));
        assert!(cpu.is_fetching());
    }

    #[test]
    fn page_cross_penalty() {
        let mut cpu = setup_cpu();
        load(&mut cpu, 0x1000, &[0xbd, 0xff, 0x10]);
        cpu.set_x(0x01);
        assert_eq!(5, run_instruction(&mut cpu));
        load(&mut cpu, 0x1000, &[0xbd, 0xfe, 0x10]);
        assert_eq!(4, run_instruction(&mut cpu));
    }

    #[test]
    fn store_has_no_page_cross_penalty() {
        let mut cpu = setup_cpu();
        load(&mut cpu, 0x1000, &[0x9d, 0xff, 0x20]);
        cpu.set_x(0x01);
        assert_eq!(5, run_instruction(&mut cpu));
    }

    #[test]
    fn branch_not_taken() {
        let mut cpu = setup_cpu();
        load(&mut cpu, 0x1000, &[0xd0, 0x10]);
        cpu.set_flag(Flag::Zero, true);
        assert_eq!(2, run_instruction(&mut cpu));
        assert_eq!(0x1002, cpu.get_pc());
    }

    #[test]
    fn branch_taken_same_page() {
        let mut cpu = setup_cpu();
        load(&mut cpu, 0x1000, &[0xd0, 0x10]);
        cpu.set_flag(Flag::Zero, false);
        assert_eq!(3, run_instruction(&mut cpu));
        assert_eq!(0x1012, cpu.get_pc());
    }

    #[test]
    fn branch_taken_page_cross() {
        let mut cpu = setup_cpu();
        load(&mut cpu, 0x10f0, &[0xd0, 0x20]);
        cpu.set_flag(Flag::Zero, false);
        assert_eq!(4, run_instruction(&mut cpu));
        assert_eq!(0x1112, cpu.get_pc());
    }

    #[test]
    fn jsr_rts() {
        let mut cpu = setup_cpu();
        load(&mut cpu, 0x1000, &[0x20, 0x00, 0x20]);
        cpu.write(0x2000, 0x60);
        assert_eq!(6, run_instruction(&mut cpu));
        assert_eq!(0x2000, cpu.get_pc());
        assert_eq!(0xfb, cpu.get_sp());
        assert_eq!(Ok(0x10), cpu.read(0x01fd));
        assert_eq!(Ok(0x02), cpu.read(0x01fc));
        assert_eq!(6, run_instruction(&mut cpu));
        assert_eq!(0x1003, cpu.get_pc());
        assert_eq!(0xfd, cpu.get_sp());
    }

    #[test]
    fn php_plp() {
        let mut cpu = setup_cpu();
        load(&mut cpu, 0x1000, &[0x08, 0x28]);
        cpu.set_p(0x01);
        run_instruction(&mut cpu);
        assert_eq!(Ok(0x31), cpu.read(0x01fd));
        cpu.set_p(0x00);
        run_instruction(&mut cpu);
        assert_eq!(0x21, cpu.get_p());
    }

    #[test]
    fn brk_pushes_state() {
        let mut cpu = setup_cpu();
        load(&mut cpu, 0x1000, &[0x00, 0xea]);
        cpu.write(0xfffe, 0x00);
        cpu.write(0xffff, 0x30);
        cpu.set_p(0x20);
        assert_eq!(7, run_instruction(&mut cpu));
        assert_eq!(0x3000, cpu.get_pc());
        assert_eq!(Ok(0x10), cpu.read(0x01fd));
        assert_eq!(Ok(0x02), cpu.read(0x01fc));
        assert_eq!(Ok(0x30), cpu.read(0x01fb));
        assert!(cpu.test_flag(Flag::IntDisable));
    }

    #[test]
    fn lax_loads_a_and_x() {
        let mut cpu = setup_cpu();
        load(&mut cpu, 0x1000, &[0xa7, 0x10]);
        cpu.write(0x0010, 0x80);
        assert_eq!(3, run_instruction(&mut cpu));
        assert_eq!(0x80, cpu.get_a());
        assert_eq!(0x80, cpu.get_x());
        assert!(cpu.test_flag(Flag::Negative));
    }

    #[test]
    fn dcp_decrements_and_compares() {
        let mut cpu = setup_cpu();
        load(&mut cpu, 0x1000, &[0xc7, 0x10]);
        cpu.write(0x0010, 0x43);
        cpu.set_a(0x42);
        run_instruction(&mut cpu);
        assert_eq!(Ok(0x42), cpu.read(0x0010));
        assert!(cpu.test_flag(Flag::Zero));
        assert!(cpu.test_flag(Flag::Carry));
    }

    #[test]
    fn sbx_subtracts_from_a_and_x() {
        let mut cpu = setup_cpu();
        load(&mut cpu, 0x1000, &[0xcb, 0x02]);
        cpu.set_a(0x0f);
        cpu.set_x(0xfc);
        run_instruction(&mut cpu);
        assert_eq!(0x0a, cpu.get_x());
        assert!(cpu.test_flag(Flag::Carry));
    }

    #[test]
    fn jam_runs_as_nop() {
        let mut cpu = setup_cpu();
        load(&mut cpu, 0x1000, &[0x02, 0xea]);
        assert_eq!(2, run_instruction(&mut cpu));
        assert_eq!(0x1001, cpu.get_pc());
    }

    #[test]
    fn unmapped_read_aborts_instruction() {
        let mut bus = Bus::new();
        let mem = new_shared(MockMemory {
            ram: Ram::new(0x10000),
        });
        bus.register(0x0000..=0x1fff, Some(mem.clone()), Some(mem));
        let mut cpu = Cpu6507::new(new_shared(bus));
        cpu.reset(0x1000);
        load(&mut cpu, 0x1000, &[0xad, 0x00, 0x80]);
        assert_eq!(Err(BusError::UnmappedRead(0x8000)), cpu.step());
        assert!(cpu.is_fetching());
        assert_eq!(0, cpu.mem.borrow().journal_len());
    }

    #[test]
    fn cycles_accumulate() {
        let mut cpu = setup_cpu();
        load(&mut cpu, 0x1000, &[0xea, 0xea, 0xea]);
        run_instruction(&mut cpu);
        run_instruction(&mut cpu);
        assert_eq!(4, cpu.get_cycles());
        assert_eq!(2, cpu.get_last_cycles());
    }
}
