// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use bit_field::BitField;

use crate::factory::{Addressable, Chip};
use crate::util::Ram;

use super::Timer;

// Hardware: MOS 6532 RAM-I/O-Timer data sheet, Stella Programmer's Guide
// Design:
//   RIOT answers both the RAM window and the I/O window; the bus hands over canonical
//   addresses so A9 selects between the two. Port A carries both joysticks, port B the
//   console switches. Inputs are active low.

const RAM_SIZE: usize = 128;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn bit(self, port: u8) -> usize {
        let base = if port == 0 { 4 } else { 0 };
        base + match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Switch {
    Reset,
    Select,
    Color,
    Difficulty0,
    Difficulty1,
}

enum Reg {
    SWCHA = 0x00,
    SWACNT = 0x01,
    SWCHB = 0x02,
    SWBCNT = 0x03,
    INTIM = 0x04,
    TIMINT = 0x05,
}

impl Reg {
    fn from(reg: u8) -> Reg {
        if !reg.get_bit(2) {
            match reg & 0x03 {
                0x00 => Reg::SWCHA,
                0x01 => Reg::SWACNT,
                0x02 => Reg::SWCHB,
                _ => Reg::SWBCNT,
            }
        } else if !reg.get_bit(0) {
            Reg::INTIM
        } else {
            Reg::TIMINT
        }
    }
}

pub struct Riot {
    // Configuration
    default_switches: u8,
    // Functional Units
    ram: Ram,
    timer: Timer,
    // I/O
    port_a_output: u8,
    port_a_direction: u8,
    port_b_output: u8,
    port_b_direction: u8,
    joystick: u8,
    switches: u8,
}

impl Riot {
    /// Switches use SWCHB layout: b0 reset, b1 select, b3 color, b6/b7 difficulty.
    pub fn new(switches: u8) -> Self {
        Self {
            default_switches: switches,
            ram: Ram::new(RAM_SIZE),
            timer: Timer::new(),
            port_a_output: 0,
            port_a_direction: 0,
            port_b_output: 0,
            port_b_direction: 0,
            joystick: 0xff,
            switches,
        }
    }

    pub fn get_timer(&self) -> &Timer {
        &self.timer
    }

    pub fn get_ram(&self) -> &Ram {
        &self.ram
    }

    pub fn get_input_a(&self) -> u8 {
        (self.joystick & !self.port_a_direction) | (self.port_a_output & self.port_a_direction)
    }

    pub fn get_input_b(&self) -> u8 {
        (self.switches & !self.port_b_direction) | (self.port_b_output & self.port_b_direction)
    }

    pub fn set_joystick(&mut self, port: u8, direction: Direction, pressed: bool) {
        self.joystick.set_bit(direction.bit(port), !pressed);
    }

    pub fn set_switch(&mut self, switch: Switch, on: bool) {
        match switch {
            Switch::Reset => self.switches.set_bit(0, !on),
            Switch::Select => self.switches.set_bit(1, !on),
            Switch::Color => self.switches.set_bit(3, on),
            Switch::Difficulty0 => self.switches.set_bit(6, on),
            Switch::Difficulty1 => self.switches.set_bit(7, on),
        };
    }

    fn read_io(&mut self, reg: u8) -> u8 {
        match Reg::from(reg) {
            Reg::SWCHA => self.get_input_a(),
            Reg::SWACNT => self.port_a_direction,
            Reg::SWCHB => self.get_input_b(),
            Reg::SWBCNT => self.port_b_direction,
            Reg::INTIM => {
                self.timer.clear_flag();
                self.timer.get_counter()
            }
            Reg::TIMINT => {
                let mut value = 0u8;
                value.set_bit(7, self.timer.get_flag());
                value
            }
        }
    }

    fn write_io(&mut self, reg: u8, value: u8) {
        if !reg.get_bit(2) {
            match Reg::from(reg) {
                Reg::SWCHA => self.port_a_output = value,
                Reg::SWACNT => self.port_a_direction = value,
                Reg::SWCHB => self.port_b_output = value,
                _ => self.port_b_direction = value,
            }
        } else if reg.get_bit(4) {
            trace!(target: "riot", "Timer 0x{:02x} interval {}", value, reg & 0x03);
            self.timer.load(value, reg & 0x03);
        } else {
            trace!(target: "riot", "Edge detect control 0x{:02x} ignored", reg);
        }
    }
}

impl Chip for Riot {
    fn clock(&mut self) {
        self.timer.clock();
    }

    fn reset(&mut self) {
        self.ram.fill(0);
        self.timer.reset();
        self.port_a_output = 0;
        self.port_a_direction = 0;
        self.port_b_output = 0;
        self.port_b_direction = 0;
        self.joystick = 0xff;
        self.switches = self.default_switches;
    }
}

impl Addressable for Riot {
    fn read(&mut self, address: u16) -> u8 {
        if address.get_bit(9) {
            self.read_io((address & 0x1f) as u8)
        } else {
            self.ram.read(address & 0x7f)
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        if address.get_bit(9) {
            self.write_io((address & 0x1f) as u8, value);
        } else {
            self.ram.write(address & 0x7f, value);
        }
    }
}
