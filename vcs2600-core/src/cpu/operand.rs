// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use core::fmt;

use crate::error::BusError;
use crate::factory::Cpu;

use super::{Cpu6507, Mode};

// Hardware: INSTRUCTION ADDRESSING MODES AND RELATED EXECUTION TIMES
// Design:
//   Operand carries the addressing mode together with the bytes fetched after the opcode.
//   Effective address resolution reports whether indexing crossed a page so read
//   operations can charge the extra cycle. Stores and read-modify-write operations
//   already include it in their base cycle count.

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    Implied,
    Accumulator,
    Immediate(u8),
    ZeroPage(u8),
    ZeroPageX(u8),
    ZeroPageY(u8),
    Absolute(u16),
    AbsoluteX(u16),
    AbsoluteY(u16),
    IndirectX(u8),
    IndirectY(u8),
    Indirect(u16),
    Relative(i8),
}

impl Operand {
    pub fn decode(mode: Mode, cpu: &mut Cpu6507) -> Result<Operand, BusError> {
        let operand = match mode {
            Mode::Implied => Operand::Implied,
            Mode::Accumulator => Operand::Accumulator,
            Mode::Immediate => Operand::Immediate(cpu.fetch_byte()?),
            Mode::ZeroPage => Operand::ZeroPage(cpu.fetch_byte()?),
            Mode::ZeroPageX => Operand::ZeroPageX(cpu.fetch_byte()?),
            Mode::ZeroPageY => Operand::ZeroPageY(cpu.fetch_byte()?),
            Mode::Absolute => Operand::Absolute(cpu.fetch_word()?),
            Mode::AbsoluteX => Operand::AbsoluteX(cpu.fetch_word()?),
            Mode::AbsoluteY => Operand::AbsoluteY(cpu.fetch_word()?),
            Mode::IndirectX => Operand::IndirectX(cpu.fetch_byte()?),
            Mode::IndirectY => Operand::IndirectY(cpu.fetch_byte()?),
            Mode::Indirect => Operand::Indirect(cpu.fetch_word()?),
            Mode::Relative => Operand::Relative(cpu.fetch_byte()? as i8),
        };
        Ok(operand)
    }

    /// Effective address and whether indexing crossed a page boundary. Relative operands
    /// resolve against the program counter following the operand.
    pub fn ea(&self, cpu: &Cpu6507) -> Result<(u16, bool), BusError> {
        let ea = match *self {
            Operand::Implied => panic!("illegal op for addressing mode {}", "implied"),
            Operand::Accumulator => panic!("illegal op for addressing mode {}", "accumulator"),
            Operand::Immediate(_) => panic!("illegal op for addressing mode {}", "immediate"),
            Operand::ZeroPage(address) => (address as u16, false),
            Operand::ZeroPageX(address) => (address.wrapping_add(cpu.get_x()) as u16, false),
            Operand::ZeroPageY(address) => (address.wrapping_add(cpu.get_y()) as u16, false),
            Operand::Absolute(address) => (address, false),
            Operand::AbsoluteX(address) => Operand::indexed(address, cpu.get_x()),
            Operand::AbsoluteY(address) => Operand::indexed(address, cpu.get_y()),
            Operand::IndirectX(address) => {
                let pointer = address.wrapping_add(cpu.get_x());
                (cpu.read_zero_page_u16(pointer)?, false)
            }
            Operand::IndirectY(address) => {
                let base = cpu.read_zero_page_u16(address)?;
                Operand::indexed(base, cpu.get_y())
            }
            Operand::Indirect(address) => {
                // NMOS parts fetch the high byte without carrying into the page
                let lo = cpu.read_internal(address)?;
                let hi = cpu.read_internal((address & 0xff00) | (address.wrapping_add(1) & 0x00ff))?;
                (((hi as u16) << 8) | lo as u16, false)
            }
            Operand::Relative(offset) => {
                let pc = cpu.get_pc();
                let target = pc.wrapping_add(offset as i16 as u16);
                (target, (pc & 0xff00) != (target & 0xff00))
            }
        };
        Ok(ea)
    }

    pub fn get(&self, cpu: &mut Cpu6507, rmw: bool) -> Result<u8, BusError> {
        match *self {
            Operand::Accumulator => Ok(cpu.get_a()),
            Operand::Immediate(value) => Ok(value),
            _ => {
                let (address, page_crossed) = self.ea(cpu)?;
                if page_crossed && !rmw {
                    cpu.add_cycles(1);
                }
                cpu.read_internal(address)
            }
        }
    }

    pub fn set(&self, cpu: &mut Cpu6507, value: u8) -> Result<(), BusError> {
        match *self {
            Operand::Accumulator => {
                cpu.set_a(value);
                Ok(())
            }
            _ => {
                let (address, _) = self.ea(cpu)?;
                cpu.write_internal(address, value);
                Ok(())
            }
        }
    }

    fn indexed(base: u16, index: u8) -> (u16, bool) {
        let address = base.wrapping_add(index as u16);
        (address, (base & 0xff00) != (address & 0xff00))
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Operand::Implied => write!(f, ""),
            Operand::Accumulator => write!(f, "a"),
            Operand::Immediate(value) => write!(f, "#{:02x}", value),
            Operand::ZeroPage(address) => write!(f, "${:02x}", address),
            Operand::ZeroPageX(address) => write!(f, "${:02x},x", address),
            Operand::ZeroPageY(address) => write!(f, "${:02x},y", address),
            Operand::Absolute(address) => write!(f, "${:04x}", address),
            Operand::AbsoluteX(address) => write!(f, "${:04x},x", address),
            Operand::AbsoluteY(address) => write!(f, "${:04x},y", address),
            Operand::IndirectX(address) => write!(f, "(${:02x},x)", address),
            Operand::IndirectY(address) => write!(f, "(${:02x}),y", address),
            Operand::Indirect(address) => write!(f, "(${:04x})", address),
            Operand::Relative(offset) => write!(f, "${:02x}", offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{Addressable, Cpu};
    use crate::mem::Bus;
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
        Cpu6507::new(new_shared(bus))
    }

    #[test]
    fn ea_zeropage() {
        let cpu = setup_cpu();
        let op = Operand::ZeroPage(0x10);
        assert_eq!(Ok((0x0010, false)), op.ea(&cpu));
    }

    #[test]
    fn ea_zeropage_x() {
        let mut cpu = setup_cpu();
        cpu.set_x(0x01);
        let op = Operand::ZeroPageX(0x10);
        assert_eq!(Ok((0x0011, false)), op.ea(&cpu));
    }

    #[test]
    fn ea_zeropage_x_wrapping() {
        let mut cpu = setup_cpu();
        cpu.set_x(0x03);
        let op = Operand::ZeroPageX(0xff);
        assert_eq!(Ok((0x0002, false)), op.ea(&cpu));
    }

    #[test]
    fn ea_zeropage_y_wrapping() {
        let mut cpu = setup_cpu();
        cpu.set_y(0x03);
        let op = Operand::ZeroPageY(0xff);
        assert_eq!(Ok((0x0002, false)), op.ea(&cpu));
    }

    #[test]
    fn ea_absolute_x_page_cross() {
        let mut cpu = setup_cpu();
        cpu.set_x(0x01);
        assert_eq!(Ok((0x1100, true)), Operand::AbsoluteX(0x10ff).ea(&cpu));
        assert_eq!(Ok((0x10ff, false)), Operand::AbsoluteX(0x10fe).ea(&cpu));
    }

    #[test]
    fn ea_absolute_y_wrapping() {
        let mut cpu = setup_cpu();
        cpu.set_y(0x02);
        assert_eq!(Ok((0x0001, true)), Operand::AbsoluteY(0xffff).ea(&cpu));
    }

    #[test]
    fn ea_indirect_x() {
        let mut cpu = setup_cpu();
        cpu.write(0x0006, 0x00);
        cpu.write(0x0007, 0x16);
        cpu.set_x(0x05);
        assert_eq!(Ok((0x1600, false)), Operand::IndirectX(0x01).ea(&cpu));
    }

    #[test]
    fn ea_indirect_x_wrapping() {
        let mut cpu = setup_cpu();
        cpu.write(0x00ff, 0x34);
        cpu.write(0x0000, 0x12);
        cpu.set_x(0x01);
        assert_eq!(Ok((0x1234, false)), Operand::IndirectX(0xfe).ea(&cpu));
    }

    #[test]
    fn ea_indirect_y() {
        let mut cpu = setup_cpu();
        cpu.write(0x0010, 0xff);
        cpu.write(0x0011, 0x20);
        cpu.set_y(0x01);
        assert_eq!(Ok((0x2100, true)), Operand::IndirectY(0x10).ea(&cpu));
    }

    #[test]
    fn ea_indirect_y_pointer_wrapping() {
        let mut cpu = setup_cpu();
        cpu.write(0x00ff, 0x00);
        cpu.write(0x0000, 0x30);
        cpu.write(0x0100, 0x99);
        cpu.set_y(0x04);
        assert_eq!(Ok((0x3004, false)), Operand::IndirectY(0xff).ea(&cpu));
    }

    #[test]
    fn ea_indirect_page_bug() {
        let mut cpu = setup_cpu();
        cpu.write(0x10ff, 0x34);
        cpu.write(0x1000, 0x12);
        cpu.write(0x1100, 0x56);
        assert_eq!(Ok((0x1234, false)), Operand::Indirect(0x10ff).ea(&cpu));
    }

    #[test]
    fn ea_relative_pos() {
        let mut cpu = setup_cpu();
        cpu.set_pc(0x1002);
        assert_eq!(Ok((0x1006, false)), Operand::Relative(0x04).ea(&cpu));
    }

    #[test]
    fn ea_relative_neg() {
        let mut cpu = setup_cpu();
        cpu.set_pc(0x1002);
        assert_eq!(Ok((0x0ffe, true)), Operand::Relative(-4).ea(&cpu));
    }

    #[test]
    fn ea_relative_neg_max() {
        let mut cpu = setup_cpu();
        cpu.set_pc(0x1080);
        assert_eq!(Ok((0x1000, false)), Operand::Relative(-128).ea(&cpu));
    }

    #[test]
    fn get_accumulator_and_immediate() {
        let mut cpu = setup_cpu();
        cpu.set_a(0x42);
        assert_eq!(Ok(0x42), Operand::Accumulator.get(&mut cpu, false));
        assert_eq!(Ok(0x17), Operand::Immediate(0x17).get(&mut cpu, false));
    }

    #[test]
    fn set_is_journaled() {
        let mut cpu = setup_cpu();
        Operand::Absolute(0x0200).set(&mut cpu, 0x55).unwrap();
        assert_eq!(Ok(0x00), cpu.read(0x0200));
        cpu.commit();
        assert_eq!(Ok(0x55), cpu.read(0x0200));
    }

    #[test]
    #[should_panic]
    fn ea_immediate_is_illegal() {
        let cpu = setup_cpu();
        let _ = Operand::Immediate(0x00).ea(&cpu);
    }

    #[test]
    fn display_modes() {
        assert_eq!("#1f", format!("{}", Operand::Immediate(0x1f)));
        assert_eq!("$1234,x", format!("{}", Operand::AbsoluteX(0x1234)));
        assert_eq!("($80),y", format!("{}", Operand::IndirectY(0x80)));
    }
}
