// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

// Hardware: MOS 6532 RAM-I/O-Timer data sheet
// Design:
//   The counter decrements once per interval. When it passes zero the interrupt flag is
//   raised and from then on the counter decrements on every clock until it is written.

const INTERVALS: [u16; 4] = [1, 8, 64, 1024];

pub struct Timer {
    // Configuration
    interval: u16,
    // Runtime State
    counter: u8,
    prescaler: u16,
    underflow: bool,
    flag: bool,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            interval: 1024,
            counter: 0,
            prescaler: 0,
            underflow: false,
            flag: false,
        }
    }

    pub fn get_counter(&self) -> u8 {
        self.counter
    }

    pub fn get_interval(&self) -> u16 {
        self.interval
    }

    pub fn get_flag(&self) -> bool {
        self.flag
    }

    pub fn clear_flag(&mut self) {
        self.flag = false;
    }

    /// Load counter and select interval by index (1, 8, 64, 1024).
    pub fn load(&mut self, value: u8, select: u8) {
        self.interval = INTERVALS[(select & 0x03) as usize];
        self.counter = value;
        self.prescaler = 0;
        self.underflow = false;
        self.flag = false;
    }

    pub fn clock(&mut self) {
        let interval = if self.underflow { 1 } else { self.interval };
        self.prescaler += 1;
        if self.prescaler >= interval {
            self.prescaler = 0;
            let (counter, wrapped) = self.counter.overflowing_sub(1);
            self.counter = counter;
            if wrapped {
                self.underflow = true;
                self.flag = true;
            }
        }
    }

    pub fn reset(&mut self) {
        self.interval = 1024;
        self.counter = 0;
        self.prescaler = 0;
        self.underflow = false;
        self.flag = false;
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_every_interval() {
        let mut timer = Timer::new();
        timer.load(0x10, 1);
        for _ in 0..7 {
            timer.clock();
        }
        assert_eq!(0x10, timer.get_counter());
        timer.clock();
        assert_eq!(0x0f, timer.get_counter());
    }

    #[test]
    fn underflow_sets_flag_and_speeds_up() {
        let mut timer = Timer::new();
        timer.load(0x01, 2);
        for _ in 0..64 {
            timer.clock();
        }
        assert_eq!(0x00, timer.get_counter());
        assert!(!timer.get_flag());
        for _ in 0..64 {
            timer.clock();
        }
        assert_eq!(0xff, timer.get_counter());
        assert!(timer.get_flag());
        timer.clock();
        assert_eq!(0xfe, timer.get_counter());
    }

    #[test]
    fn load_clears_flag() {
        let mut timer = Timer::new();
        timer.load(0x00, 0);
        timer.clock();
        assert!(timer.get_flag());
        timer.load(0x20, 3);
        assert!(!timer.get_flag());
        assert_eq!(1024, timer.get_interval());
    }
}
