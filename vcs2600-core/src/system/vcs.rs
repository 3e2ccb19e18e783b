// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use std::rc::Rc;

use crate::cpu::Cpu6507;
use crate::error::{Error, Result};
use crate::factory::{Addressable, Chip, Cpu, VideoOutput};
use crate::io::{Direction, Riot, Switch};
use crate::mem::{Bus, Cartridge, MemoryMap, Region};
use crate::util::{new_shared, Shared};
use crate::video::{Palette, Tia};

use super::{Config, FrameBuffer};

// Design:
//   Vcs represents the console and all of its components. TIA is the master clock: every
//   call to clock advances one color clock, and the processor with the RIOT runs on the
//   first of every three unless TIA is holding RDY low after a WSYNC strobe.

const PHASES: u8 = 3;
// Frames are expected to end well within two nominal frames.
const FRAME_LIMIT: u64 = 2;

pub struct Vcs {
    // Dependencies
    config: Rc<Config>,
    // Chipset
    cpu: Cpu6507,
    riot: Shared<Riot>,
    tia: Shared<Tia>,
    // Memory
    bus: Shared<Bus>,
    cartridge: Option<Cartridge>,
    // Buffers
    frame_buffer: Shared<FrameBuffer>,
    // Runtime State
    phase: u8,
    frame_count: u32,
}

impl Vcs {
    pub fn build(config: Rc<Config>) -> Vcs {
        info!(target: "vcs", "Initializing system");
        let (width, height) = config.model.frame_buffer_size;
        let frame_buffer = new_shared(FrameBuffer::new(width, height));
        let video_output: Shared<dyn VideoOutput> = frame_buffer.clone();

        // Chipset
        let palette = Palette::for_standard(config.model.video_standard);
        let tia = new_shared(Tia::new(video_output, palette));
        let riot = new_shared(Riot::new(config.console.switches()));

        // Memory
        let bus = new_shared(Bus::new());
        {
            let mut mem = bus.borrow_mut();
            let tia_device: Shared<dyn Addressable> = tia.clone();
            let riot_device: Shared<dyn Addressable> = riot.clone();
            mem.register(
                Region::Tia.range(),
                Some(tia_device.clone()),
                Some(tia_device),
            );
            mem.register(
                Region::RiotRam.range(),
                Some(riot_device.clone()),
                Some(riot_device.clone()),
            );
            mem.register(
                Region::RiotIo.range(),
                Some(riot_device.clone()),
                Some(riot_device),
            );
            for (range, offset) in MemoryMap::mirrors() {
                mem.add_mirror(range, offset);
            }
        }

        // Processor
        let cpu = Cpu6507::new(bus.clone());

        Vcs {
            config,
            cpu,
            riot,
            tia,
            bus,
            cartridge: None,
            frame_buffer,
            phase: 0,
            frame_count: 0,
        }
    }

    pub fn get_config(&self) -> &Config {
        &self.config
    }

    pub fn get_cpu(&self) -> &Cpu6507 {
        &self.cpu
    }

    pub fn get_cpu_mut(&mut self) -> &mut Cpu6507 {
        &mut self.cpu
    }

    pub fn get_tia(&self) -> Shared<Tia> {
        self.tia.clone()
    }

    pub fn get_riot(&self) -> Shared<Riot> {
        self.riot.clone()
    }

    pub fn get_bus(&self) -> Shared<Bus> {
        self.bus.clone()
    }

    pub fn get_cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    pub fn get_cycles(&self) -> u64 {
        self.cpu.get_cycles()
    }

    /// Copy of the last completed frame in RGBA.
    pub fn get_frame_buffer(&self) -> Vec<u8> {
        self.frame_buffer.borrow().get_pixel_data().to_vec()
    }

    pub fn get_frame_dimension(&self) -> (usize, usize) {
        self.frame_buffer.borrow().get_dimension()
    }

    pub fn get_frame_count(&self) -> u32 {
        self.frame_count
    }

    // -- Debug

    pub fn read(&self, address: u16) -> Result<u8> {
        let value = self.bus.borrow().read(address)?;
        Ok(value)
    }

    pub fn write(&mut self, address: u16, value: u8) {
        self.bus.borrow().write(address, value);
    }

    // -- Input

    pub fn set_joystick(&mut self, port: u8, direction: Direction, pressed: bool) {
        self.riot.borrow_mut().set_joystick(port, direction, pressed);
    }

    pub fn set_fire(&mut self, port: usize, pressed: bool) {
        self.tia.borrow_mut().set_fire(port, pressed);
    }

    pub fn set_switch(&mut self, switch: Switch, on: bool) {
        self.riot.borrow_mut().set_switch(switch, on);
    }

    // -- Lifecycle

    pub fn load(&mut self, data: &[u8]) -> Result<()> {
        let cartridge = Cartridge::load(data)?;
        if let Some(previous) = self.cartridge.take() {
            previous.unmap(&mut self.bus.borrow_mut());
        }
        cartridge.map_onto(&mut self.bus.borrow_mut());
        info!(
            target: "vcs",
            "Loaded {} byte image, reset vector 0x{:04x}",
            cartridge.size(),
            cartridge.reset_vector()
        );
        self.cartridge = Some(cartridge);
        self.reset();
        Ok(())
    }

    pub fn reset(&mut self) {
        info!(target: "vcs", "Resetting system");
        // Chipset
        let pc = match self.cartridge {
            Some(ref cartridge) => cartridge.reset_vector(),
            None => 0,
        };
        self.cpu.reset(pc);
        self.riot.borrow_mut().reset();
        self.tia.borrow_mut().reset();
        // Runtime State
        self.phase = 0;
        self.frame_count = 0;
    }

    // -- Execution

    /// Advance one color clock. Returns true when the processor started an instruction.
    pub fn clock(&mut self) -> Result<bool> {
        if self.cartridge.is_none() {
            return Err(Error::NoCartridge);
        }
        let mut started = false;
        if self.phase == 0 && !self.tia.borrow().is_stalled() {
            started = self.cpu.step()?;
            self.riot.borrow_mut().clock();
        }
        self.phase = (self.phase + 1) % PHASES;
        if self.tia.borrow_mut().clock() {
            self.frame_count = self.frame_count.wrapping_add(1);
        }
        Ok(started)
    }

    /// Run until the next instruction has been executed and its writes committed.
    pub fn step(&mut self) -> Result<()> {
        while !self.clock()? {}
        while !self.cpu.is_fetching() {
            self.clock()?;
        }
        Ok(())
    }

    pub fn run_scanline(&mut self) -> Result<()> {
        let scanline = self.tia.borrow().get_beam().scanline;
        let frame_count = self.frame_count;
        loop {
            self.clock()?;
            if self.tia.borrow().get_beam().scanline != scanline
                || self.frame_count != frame_count
            {
                break;
            }
        }
        Ok(())
    }

    /// Run until TIA completes a frame. Returns false if no vertical sync was seen within
    /// the color clock budget of two nominal frames.
    pub fn run_frame(&mut self) -> Result<bool> {
        let limit = FRAME_LIMIT
            * self.config.model.lines_per_frame as u64
            * self.config.model.color_clocks_per_line as u64;
        let frame_count = self.frame_count;
        let mut elapsed = 0u64;
        while self.frame_count == frame_count {
            if elapsed >= limit {
                warn!(target: "vcs", "No vertical sync after {} color clocks", elapsed);
                return Ok(false);
            }
            self.clock()?;
            elapsed += 1;
        }
        Ok(true)
    }
}
