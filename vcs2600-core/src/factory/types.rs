// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use crate::error::BusError;

/// Addressable represents a device mapped onto the bus. The address passed in is the
/// canonical address after mirror resolution.
pub trait Addressable {
    /// Read byte from the specified address. Reads may have side effects (timer flags).
    fn read(&mut self, address: u16) -> u8;
    /// Write byte to the specified address.
    fn write(&mut self, address: u16, value: u8);
}

/// A chip represents a system component that is driven by clock signal.
pub trait Chip {
    /// The core method of the chip, emulates one clock cycle of the chip.
    fn clock(&mut self);
    /// Handle reset signal.
    fn reset(&mut self);
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Register {
    A,
    X,
    Y,
    SP,
    PCL,
    PCH,
    P,
}

/// CPU is responsible for decoding and executing instructions.
pub trait Cpu {
    // -- Getters/Setters
    fn get_register(&self, reg: Register) -> u8;
    fn set_register(&mut self, reg: Register, value: u8);
    fn get_pc(&self) -> u16;
    fn set_pc(&mut self, value: u16);
    /// Total number of cycles consumed by executed instructions.
    fn get_cycles(&self) -> u64;
    /// Cycle cost of the last executed instruction, penalties included.
    fn get_last_cycles(&self) -> u8;
    /// The core method of the cpu, advances one processor cycle. Returns true when
    /// a new instruction was started on this cycle.
    fn step(&mut self) -> Result<bool, BusError>;
    /// Reset registers and start fetching at the specified address.
    fn reset(&mut self, pc: u16);
}

/// Video output used by TIA chip.
pub trait VideoOutput {
    /// Get frame buffer width and height.
    fn get_dimension(&self) -> (usize, usize);
    /// Reset output.
    fn reset(&mut self);
    /// Write RGBA pixel at the specified byte offset of the frame being drawn.
    /// Offsets outside the frame are ignored.
    fn write(&mut self, offset: usize, pixel: [u8; 4]);
    /// Publish the frame being drawn.
    fn swap(&mut self);
}
