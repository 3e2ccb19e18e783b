// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use bit_field::BitField;

// Hardware: Andrew Towers' TIA Hardware Notes
// Design:
//   Every movable object owns a position and a clock. The clock counts visible pixels and
//   restarts when the beam reaches the position or when the object is strobed, so a
//   strobe takes effect for the main copy on the following line. Player and missile
//   copies start when the clock hits a trigger value chosen by NUSIZ and begin drawing
//   after a fixed start delay. HMOVE shifts position and clock together.

const VISIBLE_PIXELS: u16 = 160;
const START_DELAY: u8 = 4;

fn triggers(nusiz: u8) -> &'static [u8] {
    match nusiz & 0x07 {
        0x01 => &[156, 12],
        0x02 => &[156, 28],
        0x03 => &[156, 12, 28],
        0x04 => &[156, 60],
        0x06 => &[156, 28, 60],
        _ => &[156],
    }
}

/// Horizontal position and motion shared by all movable objects.
#[derive(Clone, Copy)]
pub struct Counter {
    position: u8,
    clock: u8,
    motion: u8,
}

impl Counter {
    fn new() -> Self {
        Self {
            position: 0,
            clock: 0,
            motion: 0,
        }
    }

    pub fn get_position(&self) -> u8 {
        self.position
    }

    pub fn get_clock(&self) -> u8 {
        self.clock
    }

    pub fn get_motion(&self) -> u8 {
        self.motion
    }

    fn tick(&mut self, x: u8) -> bool {
        if x == self.position {
            self.clock = 0;
            true
        } else {
            self.clock = ((self.clock as u16 + 1) % VISIBLE_PIXELS) as u8;
            false
        }
    }

    fn strobe(&mut self, column: i16) {
        self.position = column.max(0) as u8;
        self.clock = 0;
    }

    fn place(&mut self, position: u8, clock: u8) {
        self.position = position % VISIBLE_PIXELS as u8;
        self.clock = clock % VISIBLE_PIXELS as u8;
    }

    fn apply_motion(&mut self) {
        let value = self.motion >> 4;
        let (position, clock) = if value >= 8 {
            let distance = ((!value & 0x0f) + 1) as u16;
            (
                self.position as u16 + distance,
                self.clock as u16 + VISIBLE_PIXELS - distance,
            )
        } else {
            let distance = value as u16;
            (
                self.position as u16 + VISIBLE_PIXELS - distance,
                self.clock as u16 + distance,
            )
        };
        self.position = (position % VISIBLE_PIXELS) as u8;
        self.clock = (clock % VISIBLE_PIXELS) as u8;
    }

    fn reset(&mut self) {
        *self = Counter::new();
    }
}

/// Start delay and pixel sequencing for one copy of a player or missile.
#[derive(Clone, Copy)]
struct Sequencer {
    delay: u8,
    drawing: bool,
    index: u8,
}

impl Sequencer {
    fn new() -> Self {
        Self {
            delay: 0,
            drawing: false,
            index: 0,
        }
    }

    /// Returns the pixel index within the copy when drawing.
    fn tick(&mut self, clock: u8, nusiz: u8, width: u8) -> Option<u8> {
        if self.delay > 0 {
            self.delay -= 1;
            if self.delay == 0 {
                self.drawing = true;
                self.index = 0;
            }
        }
        if triggers(nusiz).contains(&clock) {
            self.delay = START_DELAY;
        }
        if self.drawing {
            let index = self.index;
            self.index += 1;
            if self.index >= width {
                self.drawing = false;
            }
            Some(index)
        } else {
            None
        }
    }

    fn reset(&mut self) {
        *self = Sequencer::new();
    }
}

pub struct Player {
    counter: Counter,
    sequencer: Sequencer,
    nusiz: u8,
    reflect: bool,
    vertical_delay: bool,
    graphics_new: u8,
    graphics_old: u8,
    pixel: bool,
}

impl Player {
    pub fn new() -> Self {
        Self {
            counter: Counter::new(),
            sequencer: Sequencer::new(),
            nusiz: 0,
            reflect: false,
            vertical_delay: false,
            graphics_new: 0,
            graphics_old: 0,
            pixel: false,
        }
    }

    pub fn get_counter(&self) -> &Counter {
        &self.counter
    }

    pub fn get_nusiz(&self) -> u8 {
        self.nusiz
    }

    pub fn get_graphics(&self) -> (u8, u8) {
        (self.graphics_new, self.graphics_old)
    }

    pub fn is_reflected(&self) -> bool {
        self.reflect
    }

    pub fn is_delayed(&self) -> bool {
        self.vertical_delay
    }

    pub fn is_drawing(&self) -> bool {
        self.pixel
    }

    /// Pixel scale of the player graphics.
    pub fn scale(&self) -> u8 {
        match self.nusiz & 0x07 {
            0x05 => 2,
            0x07 => 4,
            _ => 1,
        }
    }

    /// Offset from the player position to its center, used by missile lock.
    pub fn center(&self) -> u8 {
        match self.scale() {
            2 => 6,
            4 => 10,
            _ => 3,
        }
    }

    pub fn set_nusiz(&mut self, value: u8) {
        self.nusiz = value;
    }

    pub fn set_reflect(&mut self, value: bool) {
        self.reflect = value;
    }

    pub fn set_vertical_delay(&mut self, value: bool) {
        self.vertical_delay = value;
    }

    pub fn set_graphics(&mut self, value: u8) {
        self.graphics_new = value;
    }

    /// Copy new graphics to the delayed latch, triggered by a write to the other player.
    pub fn latch_graphics(&mut self) {
        self.graphics_old = self.graphics_new;
    }

    pub fn set_motion(&mut self, value: u8) {
        self.counter.motion = value;
    }

    pub fn strobe(&mut self, column: i16) {
        self.counter.strobe(column);
    }

    pub fn apply_motion(&mut self) {
        self.counter.apply_motion();
    }

    /// Advance one visible pixel. Returns true when the clock restarted at the position.
    pub fn tick(&mut self, x: u8) -> bool {
        let restarted = self.counter.tick(x);
        let scale = self.scale();
        self.pixel = match self.sequencer.tick(self.counter.clock, self.nusiz, 8 * scale) {
            Some(index) => {
                let graphics = if self.vertical_delay {
                    self.graphics_old
                } else {
                    self.graphics_new
                };
                let bit = (index / scale) as usize;
                if self.reflect {
                    graphics.get_bit(bit)
                } else {
                    graphics.get_bit(7 - bit)
                }
            }
            None => false,
        };
        restarted
    }

    pub fn reset(&mut self) {
        self.counter.reset();
        self.sequencer.reset();
        self.nusiz = 0;
        self.reflect = false;
        self.vertical_delay = false;
        self.graphics_new = 0;
        self.graphics_old = 0;
        self.pixel = false;
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Missile {
    counter: Counter,
    sequencer: Sequencer,
    nusiz: u8,
    enabled: bool,
    locked: bool,
    pixel: bool,
}

impl Missile {
    pub fn new() -> Self {
        Self {
            counter: Counter::new(),
            sequencer: Sequencer::new(),
            nusiz: 0,
            enabled: false,
            locked: false,
            pixel: false,
        }
    }

    pub fn get_counter(&self) -> &Counter {
        &self.counter
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_drawing(&self) -> bool {
        self.pixel
    }

    pub fn width(&self) -> u8 {
        1 << ((self.nusiz >> 4) & 0x03)
    }

    pub fn set_nusiz(&mut self, value: u8) {
        self.nusiz = value;
    }

    pub fn set_enabled(&mut self, value: bool) {
        self.enabled = value;
    }

    pub fn set_locked(&mut self, value: bool) {
        self.locked = value;
    }

    pub fn set_motion(&mut self, value: u8) {
        self.counter.motion = value;
    }

    pub fn strobe(&mut self, column: i16) {
        self.counter.strobe(column);
    }

    pub fn apply_motion(&mut self) {
        self.counter.apply_motion();
    }

    /// Move to the center of the player, keeping the clock in step with the beam at `x`.
    pub fn lock_to(&mut self, x: u8, player: &Player) {
        let position = (player.get_counter().get_position() as u16 + player.center() as u16)
            % VISIBLE_PIXELS;
        let clock = (x as u16 + VISIBLE_PIXELS - position) % VISIBLE_PIXELS;
        self.counter.place(position as u8, clock as u8);
    }

    pub fn tick(&mut self, x: u8) {
        self.counter.tick(x);
        let width = self.width();
        let drawing = self
            .sequencer
            .tick(self.counter.clock, self.nusiz, width)
            .is_some();
        self.pixel = drawing && self.enabled && !self.locked;
    }

    pub fn reset(&mut self) {
        self.counter.reset();
        self.sequencer.reset();
        self.nusiz = 0;
        self.enabled = false;
        self.locked = false;
        self.pixel = false;
    }
}

impl Default for Missile {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Ball {
    counter: Counter,
    size: u8,
    vertical_delay: bool,
    enabled_new: bool,
    enabled_old: bool,
    pixel: bool,
}

impl Ball {
    pub fn new() -> Self {
        Self {
            counter: Counter::new(),
            size: 1,
            vertical_delay: false,
            enabled_new: false,
            enabled_old: false,
            pixel: false,
        }
    }

    pub fn get_counter(&self) -> &Counter {
        &self.counter
    }

    pub fn get_size(&self) -> u8 {
        self.size
    }

    pub fn is_enabled(&self) -> bool {
        if self.vertical_delay {
            self.enabled_old
        } else {
            self.enabled_new
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.pixel
    }

    /// Size from CTRLPF bits 4-5.
    pub fn set_size(&mut self, ctrlpf: u8) {
        self.size = 1 << ((ctrlpf >> 4) & 0x03);
    }

    pub fn set_enabled(&mut self, value: bool) {
        self.enabled_new = value;
    }

    pub fn latch_enabled(&mut self) {
        self.enabled_old = self.enabled_new;
    }

    pub fn set_vertical_delay(&mut self, value: bool) {
        self.vertical_delay = value;
    }

    pub fn set_motion(&mut self, value: u8) {
        self.counter.motion = value;
    }

    pub fn strobe(&mut self, column: i16) {
        self.counter.strobe(column);
    }

    pub fn apply_motion(&mut self) {
        self.counter.apply_motion();
    }

    pub fn tick(&mut self, x: u8) {
        self.counter.tick(x);
        self.pixel = self.is_enabled() && self.counter.clock < self.size;
    }

    pub fn reset(&mut self) {
        self.counter.reset();
        self.size = 1;
        self.vertical_delay = false;
        self.enabled_new = false;
        self.enabled_old = false;
        self.pixel = false;
    }
}

impl Default for Ball {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_line(player: &mut Player) -> Vec<u8> {
        let mut pixels = Vec::new();
        for x in 0..160u8 {
            player.tick(x);
            if player.is_drawing() {
                pixels.push(x);
            }
        }
        pixels
    }

    #[test]
    fn player_draws_at_position_after_strobe_line() {
        let mut player = Player::new();
        player.set_graphics(0xff);
        player.strobe(40);
        for x in 41..160u8 {
            player.tick(x);
            assert!(!player.is_drawing());
        }
        let pixels = run_line(&mut player);
        assert_eq!((40..48).collect::<Vec<u8>>(), pixels);
    }

    #[test]
    fn player_msb_first() {
        let mut player = Player::new();
        player.set_graphics(0x80);
        player.strobe(10);
        run_line(&mut player);
        assert_eq!(vec![10u8], run_line(&mut player));
    }

    #[test]
    fn player_reflected_lsb_first() {
        let mut player = Player::new();
        player.set_graphics(0x80);
        player.set_reflect(true);
        player.strobe(10);
        run_line(&mut player);
        assert_eq!(vec![17u8], run_line(&mut player));
    }

    #[test]
    fn player_two_copies_close() {
        let mut player = Player::new();
        player.set_graphics(0x80);
        player.set_nusiz(0x01);
        player.strobe(20);
        run_line(&mut player);
        assert_eq!(vec![20u8, 36], run_line(&mut player));
    }

    #[test]
    fn player_three_copies_medium() {
        let mut player = Player::new();
        player.set_graphics(0x80);
        player.set_nusiz(0x06);
        player.strobe(20);
        run_line(&mut player);
        assert_eq!(vec![20u8, 52, 84], run_line(&mut player));
    }

    #[test]
    fn player_quad_width() {
        let mut player = Player::new();
        player.set_graphics(0x81);
        player.set_nusiz(0x07);
        player.strobe(20);
        run_line(&mut player);
        assert_eq!(vec![20u8, 21, 22, 23, 48, 49, 50, 51], run_line(&mut player));
    }

    #[test]
    fn player_vertical_delay() {
        let mut player = Player::new();
        player.set_graphics(0x80);
        player.latch_graphics();
        player.set_graphics(0x01);
        player.set_vertical_delay(true);
        player.strobe(20);
        run_line(&mut player);
        assert_eq!(vec![20u8], run_line(&mut player));
    }

    #[test]
    fn motion_right_one() {
        let mut player = Player::new();
        player.strobe(159);
        player.set_motion(0xf0);
        player.apply_motion();
        assert_eq!(0, player.get_counter().get_position());
        player.apply_motion();
        assert_eq!(1, player.get_counter().get_position());
    }

    #[test]
    fn motion_left_wraps() {
        let mut ball = Ball::new();
        ball.strobe(3);
        ball.set_motion(0x70);
        ball.apply_motion();
        assert_eq!(156, ball.get_counter().get_position());
    }

    #[test]
    fn motion_right_eight() {
        let mut missile = Missile::new();
        missile.strobe(10);
        missile.set_motion(0x80);
        missile.apply_motion();
        assert_eq!(18, missile.get_counter().get_position());
    }

    #[test]
    fn motion_keeps_clock_in_step() {
        let mut player = Player::new();
        player.set_graphics(0x80);
        player.strobe(40);
        run_line(&mut player);
        player.set_motion(0xe0);
        player.apply_motion();
        assert_eq!(42, player.get_counter().get_position());
        assert_eq!(vec![42u8], run_line(&mut player));
    }

    #[test]
    fn missile_width_and_enable() {
        let mut missile = Missile::new();
        missile.set_nusiz(0x20);
        missile.strobe(30);
        missile.set_enabled(true);
        let mut lines = Vec::new();
        for _ in 0..2 {
            let mut pixels = Vec::new();
            for x in 0..160u8 {
                missile.tick(x);
                if missile.is_drawing() {
                    pixels.push(x);
                }
            }
            lines.push(pixels);
        }
        assert!(lines[0].is_empty());
        assert_eq!(vec![30u8, 31, 32, 33], lines[1]);
        assert_eq!(4, missile.width());
    }

    #[test]
    fn missile_hidden_when_locked() {
        let mut missile = Missile::new();
        missile.strobe(30);
        missile.set_enabled(true);
        missile.set_locked(true);
        for _ in 0..2 {
            for x in 0..160u8 {
                missile.tick(x);
                assert!(!missile.is_drawing());
            }
        }
    }

    #[test]
    fn missile_lock_centers_on_player() {
        let mut player = Player::new();
        player.strobe(50);
        let mut missile = Missile::new();
        missile.lock_to(50, &player);
        assert_eq!(53, missile.get_counter().get_position());
        assert_eq!(157, missile.get_counter().get_clock());
    }

    #[test]
    fn ball_draws_on_strobe_line() {
        let mut ball = Ball::new();
        ball.set_enabled(true);
        ball.set_size(0x10);
        ball.strobe(70);
        let mut pixels = Vec::new();
        for x in 70..160u8 {
            ball.tick(x);
            if ball.is_drawing() {
                pixels.push(x);
            }
        }
        assert_eq!(vec![70u8, 71], pixels);
    }

    #[test]
    fn ball_vertical_delay() {
        let mut ball = Ball::new();
        ball.set_enabled(true);
        ball.set_vertical_delay(true);
        assert!(!ball.is_enabled());
        ball.latch_enabled();
        assert!(ball.is_enabled());
    }
}
