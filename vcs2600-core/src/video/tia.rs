// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use bit_field::BitField;
use log::Level;

use crate::factory::{Addressable, VideoOutput};
use crate::util::Shared;

use super::{Ball, Collisions, Missile, Object, Palette, Player, Playfield};

// Hardware: Stella Programmer's Guide, Andrew Towers' TIA Hardware Notes
// Design:
//   TIA is clocked once per color clock. A line has 68 clocks of horizontal blank followed
//   by 160 visible pixels; the beam column is kept signed so blank reads as negative.
//   Objects only advance during visible pixels and pixels are emitted only outside
//   vertical blank. A frame ends on the first clock after VSYNC drops once at least one
//   line was spent in vertical sync.

const HBLANK_START: i16 = -68;
const LAST_COLUMN: i16 = 159;
const PIXEL_BYTES: usize = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Beam {
    pub column: i16,
    pub scanline: u16,
}

enum Reg {
    VSYNC = 0x00,
    VBLANK = 0x01,
    WSYNC = 0x02,
    RSYNC = 0x03,
    NUSIZ0 = 0x04,
    NUSIZ1 = 0x05,
    COLUP0 = 0x06,
    COLUP1 = 0x07,
    COLUPF = 0x08,
    COLUBK = 0x09,
    CTRLPF = 0x0a,
    REFP0 = 0x0b,
    REFP1 = 0x0c,
    PF0 = 0x0d,
    PF1 = 0x0e,
    PF2 = 0x0f,
    RESP0 = 0x10,
    RESP1 = 0x11,
    RESM0 = 0x12,
    RESM1 = 0x13,
    RESBL = 0x14,
    AUDC0 = 0x15,
    AUDC1 = 0x16,
    AUDF0 = 0x17,
    AUDF1 = 0x18,
    AUDV0 = 0x19,
    AUDV1 = 0x1a,
    GRP0 = 0x1b,
    GRP1 = 0x1c,
    ENAM0 = 0x1d,
    ENAM1 = 0x1e,
    ENABL = 0x1f,
    HMP0 = 0x20,
    HMP1 = 0x21,
    HMM0 = 0x22,
    HMM1 = 0x23,
    HMBL = 0x24,
    VDELP0 = 0x25,
    VDELP1 = 0x26,
    VDELBL = 0x27,
    RESMP0 = 0x28,
    RESMP1 = 0x29,
    HMOVE = 0x2a,
    HMCLR = 0x2b,
    CXCLR = 0x2c,
}

impl Reg {
    fn from(reg: u8) -> Option<Reg> {
        let reg = match reg {
            0x00 => Reg::VSYNC,
            0x01 => Reg::VBLANK,
            0x02 => Reg::WSYNC,
            0x03 => Reg::RSYNC,
            0x04 => Reg::NUSIZ0,
            0x05 => Reg::NUSIZ1,
            0x06 => Reg::COLUP0,
            0x07 => Reg::COLUP1,
            0x08 => Reg::COLUPF,
            0x09 => Reg::COLUBK,
            0x0a => Reg::CTRLPF,
            0x0b => Reg::REFP0,
            0x0c => Reg::REFP1,
            0x0d => Reg::PF0,
            0x0e => Reg::PF1,
            0x0f => Reg::PF2,
            0x10 => Reg::RESP0,
            0x11 => Reg::RESP1,
            0x12 => Reg::RESM0,
            0x13 => Reg::RESM1,
            0x14 => Reg::RESBL,
            0x15 => Reg::AUDC0,
            0x16 => Reg::AUDC1,
            0x17 => Reg::AUDF0,
            0x18 => Reg::AUDF1,
            0x19 => Reg::AUDV0,
            0x1a => Reg::AUDV1,
            0x1b => Reg::GRP0,
            0x1c => Reg::GRP1,
            0x1d => Reg::ENAM0,
            0x1e => Reg::ENAM1,
            0x1f => Reg::ENABL,
            0x20 => Reg::HMP0,
            0x21 => Reg::HMP1,
            0x22 => Reg::HMM0,
            0x23 => Reg::HMM1,
            0x24 => Reg::HMBL,
            0x25 => Reg::VDELP0,
            0x26 => Reg::VDELP1,
            0x27 => Reg::VDELBL,
            0x28 => Reg::RESMP0,
            0x29 => Reg::RESMP1,
            0x2a => Reg::HMOVE,
            0x2b => Reg::HMCLR,
            0x2c => Reg::CXCLR,
            _ => return None,
        };
        Some(reg)
    }
}

pub struct Tia {
    // Dependencies
    video_output: Shared<dyn VideoOutput>,
    palette: [u32; 128],
    // Functional Units
    player0: Player,
    player1: Player,
    missile0: Missile,
    missile1: Missile,
    ball: Ball,
    playfield: Playfield,
    collisions: Collisions,
    // Registers
    colup0: u8,
    colup1: u8,
    colupf: u8,
    colubk: u8,
    ctrlpf: u8,
    vsync: bool,
    vblank: bool,
    input_latch: bool,
    audio: [u8; 6],
    // I/O
    fire: [bool; 2],
    fire_latched: [bool; 2],
    // Runtime State
    column: i16,
    scanline: u16,
    stalled: bool,
    vsync_lines: u16,
    cursor: usize,
}

impl Tia {
    pub fn new(video_output: Shared<dyn VideoOutput>, palette: [u32; 128]) -> Self {
        Self {
            video_output,
            palette,
            player0: Player::new(),
            player1: Player::new(),
            missile0: Missile::new(),
            missile1: Missile::new(),
            ball: Ball::new(),
            playfield: Playfield::new(),
            collisions: Collisions::new(),
            colup0: 0,
            colup1: 0,
            colupf: 0,
            colubk: 0,
            ctrlpf: 0,
            vsync: false,
            vblank: false,
            input_latch: false,
            audio: [0; 6],
            fire: [false; 2],
            fire_latched: [false; 2],
            column: HBLANK_START,
            scanline: 0,
            stalled: false,
            vsync_lines: 0,
            cursor: 0,
        }
    }

    // -- Getters

    pub fn get_beam(&self) -> Beam {
        Beam {
            column: self.column,
            scanline: self.scanline,
        }
    }

    pub fn get_player(&self, index: usize) -> &Player {
        if index == 0 {
            &self.player0
        } else {
            &self.player1
        }
    }

    pub fn get_missile(&self, index: usize) -> &Missile {
        if index == 0 {
            &self.missile0
        } else {
            &self.missile1
        }
    }

    pub fn get_ball(&self) -> &Ball {
        &self.ball
    }

    pub fn get_playfield(&self) -> &Playfield {
        &self.playfield
    }

    pub fn get_collisions(&self) -> &Collisions {
        &self.collisions
    }

    /// COLUP0, COLUP1, COLUPF, COLUBK
    pub fn get_colors(&self) -> [u8; 4] {
        [self.colup0, self.colup1, self.colupf, self.colubk]
    }

    pub fn get_ctrlpf(&self) -> u8 {
        self.ctrlpf
    }

    /// AUDC0, AUDC1, AUDF0, AUDF1, AUDV0, AUDV1
    pub fn get_audio(&self) -> [u8; 6] {
        self.audio
    }

    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    pub fn is_vblank(&self) -> bool {
        self.vblank
    }

    pub fn is_vsync(&self) -> bool {
        self.vsync
    }

    pub fn set_fire(&mut self, port: usize, pressed: bool) {
        self.fire[port & 0x01] = pressed;
        if pressed && self.input_latch {
            self.fire_latched[port & 0x01] = true;
        }
    }

    // -- Registers

    pub fn set_vsync(&mut self, value: u8) {
        self.vsync = value.get_bit(1);
    }

    pub fn set_vblank(&mut self, value: u8) {
        self.vblank = value.get_bit(1);
        self.input_latch = value.get_bit(6);
        if !self.input_latch {
            self.fire_latched = [false; 2];
        }
    }

    pub fn strobe_wsync(&mut self) {
        self.stalled = true;
    }

    pub fn strobe_rsync(&mut self) {
        self.column = HBLANK_START;
    }

    pub fn set_nusiz(&mut self, index: usize, value: u8) {
        if index == 0 {
            self.player0.set_nusiz(value);
            self.missile0.set_nusiz(value);
        } else {
            self.player1.set_nusiz(value);
            self.missile1.set_nusiz(value);
        }
    }

    pub fn set_ctrlpf(&mut self, value: u8) {
        self.ctrlpf = value;
        self.playfield.set_reflect(value.get_bit(0));
        self.ball.set_size(value);
    }

    pub fn set_graphics(&mut self, index: usize, value: u8) {
        if index == 0 {
            self.player0.set_graphics(value);
            self.player1.latch_graphics();
        } else {
            self.player1.set_graphics(value);
            self.player0.latch_graphics();
            self.ball.latch_enabled();
        }
    }

    pub fn strobe_hmove(&mut self) {
        self.player0.apply_motion();
        self.player1.apply_motion();
        self.missile0.apply_motion();
        self.missile1.apply_motion();
        self.ball.apply_motion();
    }

    pub fn strobe_hmclr(&mut self) {
        self.player0.set_motion(0);
        self.player1.set_motion(0);
        self.missile0.set_motion(0);
        self.missile1.set_motion(0);
        self.ball.set_motion(0);
    }

    // -- Chip

    /// Advance one color clock. Returns true when a frame was completed.
    pub fn clock(&mut self) -> bool {
        if self.column >= 0 {
            let x = self.column as u8;
            self.tick_objects(x);
            if !self.vblank {
                self.output_pixel(x);
            }
        }
        self.column += 1;
        if self.column > LAST_COLUMN {
            self.column = HBLANK_START;
            self.stalled = false;
            self.scanline = self.scanline.wrapping_add(1);
            if self.vsync {
                self.vsync_lines += 1;
            }
        }
        if self.vsync_lines > 0 && !self.vsync {
            debug!(target: "tia", "Frame complete after {} lines", self.scanline);
            self.scanline = 0;
            self.cursor = 0;
            self.vsync_lines = 0;
            self.video_output.borrow_mut().swap();
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.player0.reset();
        self.player1.reset();
        self.missile0.reset();
        self.missile1.reset();
        self.ball.reset();
        self.playfield.reset();
        self.collisions.clear();
        self.colup0 = 0;
        self.colup1 = 0;
        self.colupf = 0;
        self.colubk = 0;
        self.ctrlpf = 0;
        self.vsync = false;
        self.vblank = false;
        self.input_latch = false;
        self.audio = [0; 6];
        self.fire = [false; 2];
        self.fire_latched = [false; 2];
        self.column = HBLANK_START;
        self.scanline = 0;
        self.stalled = false;
        self.vsync_lines = 0;
        self.cursor = 0;
        self.video_output.borrow_mut().reset();
    }

    fn tick_objects(&mut self, x: u8) {
        let restarted0 = self.player0.tick(x);
        let restarted1 = self.player1.tick(x);
        self.missile0.tick(x);
        self.missile1.tick(x);
        if restarted0 && self.missile0.is_locked() {
            self.missile0.lock_to(x, &self.player0);
        }
        if restarted1 && self.missile1.is_locked() {
            self.missile1.lock_to(x, &self.player1);
        }
        self.ball.tick(x);
    }

    fn output_pixel(&mut self, x: u8) {
        let mut objects = 0u8;
        if self.player0.is_drawing() {
            objects |= Object::P0.mask();
        }
        if self.player1.is_drawing() {
            objects |= Object::P1.mask();
        }
        if self.missile0.is_drawing() {
            objects |= Object::M0.mask();
        }
        if self.missile1.is_drawing() {
            objects |= Object::M1.mask();
        }
        if self.ball.is_drawing() {
            objects |= Object::BL.mask();
        }
        if self.playfield.is_set(x) {
            objects |= Object::PF.mask();
        }
        self.collisions.update(objects);
        let color = self.resolve_color(x, objects);
        let pixel = Palette::rgba(&self.palette, color);
        self.video_output.borrow_mut().write(self.cursor, pixel);
        self.cursor += PIXEL_BYTES;
    }

    fn resolve_color(&self, x: u8, objects: u8) -> u8 {
        let p0 = objects & (Object::P0.mask() | Object::M0.mask()) != 0;
        let p1 = objects & (Object::P1.mask() | Object::M1.mask()) != 0;
        let bl = objects & Object::BL.mask() != 0;
        let pf = objects & Object::PF.mask() != 0;
        let priority = self.ctrlpf.get_bit(2);
        let score = self.ctrlpf.get_bit(1);
        let pf_color = if score {
            if x < 80 {
                self.colup0
            } else {
                self.colup1
            }
        } else {
            self.colupf
        };
        if priority {
            if pf {
                pf_color
            } else if bl {
                self.colupf
            } else if p0 {
                self.colup0
            } else if p1 {
                self.colup1
            } else {
                self.colubk
            }
        } else if p0 {
            self.colup0
        } else if p1 {
            self.colup1
        } else if bl {
            self.colupf
        } else if pf {
            pf_color
        } else {
            self.colubk
        }
    }

    fn read_input(&self, port: usize) -> u8 {
        let pressed = self.fire[port] || (self.input_latch && self.fire_latched[port]);
        if pressed {
            0x00
        } else {
            0x80
        }
    }
}

impl Addressable for Tia {
    fn read(&mut self, address: u16) -> u8 {
        let reg = (address & 0x0f) as u8;
        match reg {
            0x00..=0x07 => self.collisions.read(reg),
            0x0c => self.read_input(0),
            0x0d => self.read_input(1),
            _ => 0x00,
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        let reg = (address & 0x3f) as u8;
        if log_enabled!(target: "tia::reg", Level::Trace) {
            trace!(
                target: "tia::reg",
                "Write 0x{:02x} = 0x{:02x} at {}:{}",
                reg,
                value,
                self.scanline,
                self.column
            );
        }
        match Reg::from(reg) {
            Some(Reg::VSYNC) => self.set_vsync(value),
            Some(Reg::VBLANK) => self.set_vblank(value),
            Some(Reg::WSYNC) => self.strobe_wsync(),
            Some(Reg::RSYNC) => self.strobe_rsync(),
            Some(Reg::NUSIZ0) => self.set_nusiz(0, value),
            Some(Reg::NUSIZ1) => self.set_nusiz(1, value),
            Some(Reg::COLUP0) => self.colup0 = value,
            Some(Reg::COLUP1) => self.colup1 = value,
            Some(Reg::COLUPF) => self.colupf = value,
            Some(Reg::COLUBK) => self.colubk = value,
            Some(Reg::CTRLPF) => self.set_ctrlpf(value),
            Some(Reg::REFP0) => self.player0.set_reflect(value.get_bit(3)),
            Some(Reg::REFP1) => self.player1.set_reflect(value.get_bit(3)),
            Some(Reg::PF0) => self.playfield.set_pf0(value),
            Some(Reg::PF1) => self.playfield.set_pf1(value),
            Some(Reg::PF2) => self.playfield.set_pf2(value),
            Some(Reg::RESP0) => self.player0.strobe(self.column),
            Some(Reg::RESP1) => self.player1.strobe(self.column),
            Some(Reg::RESM0) => self.missile0.strobe(self.column),
            Some(Reg::RESM1) => self.missile1.strobe(self.column),
            Some(Reg::RESBL) => self.ball.strobe(self.column),
            Some(Reg::AUDC0) => self.audio[0] = value & 0x0f,
            Some(Reg::AUDC1) => self.audio[1] = value & 0x0f,
            Some(Reg::AUDF0) => self.audio[2] = value & 0x1f,
            Some(Reg::AUDF1) => self.audio[3] = value & 0x1f,
            Some(Reg::AUDV0) => self.audio[4] = value & 0x0f,
            Some(Reg::AUDV1) => self.audio[5] = value & 0x0f,
            Some(Reg::GRP0) => self.set_graphics(0, value),
            Some(Reg::GRP1) => self.set_graphics(1, value),
            Some(Reg::ENAM0) => self.missile0.set_enabled(value.get_bit(1)),
            Some(Reg::ENAM1) => self.missile1.set_enabled(value.get_bit(1)),
            Some(Reg::ENABL) => self.ball.set_enabled(value.get_bit(1)),
            Some(Reg::HMP0) => self.player0.set_motion(value),
            Some(Reg::HMP1) => self.player1.set_motion(value),
            Some(Reg::HMM0) => self.missile0.set_motion(value),
            Some(Reg::HMM1) => self.missile1.set_motion(value),
            Some(Reg::HMBL) => self.ball.set_motion(value),
            Some(Reg::VDELP0) => self.player0.set_vertical_delay(value.get_bit(0)),
            Some(Reg::VDELP1) => self.player1.set_vertical_delay(value.get_bit(0)),
            Some(Reg::VDELBL) => self.ball.set_vertical_delay(value.get_bit(0)),
            Some(Reg::RESMP0) => self.missile0.set_locked(value.get_bit(1)),
            Some(Reg::RESMP1) => self.missile1.set_locked(value.get_bit(1)),
            Some(Reg::HMOVE) => self.strobe_hmove(),
            Some(Reg::HMCLR) => self.strobe_hmclr(),
            Some(Reg::CXCLR) => self.collisions.clear(),
            None => trace!(target: "tia::reg", "Write to unused register 0x{:02x}", reg),
        }
    }
}
