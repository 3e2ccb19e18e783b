// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use std::mem;

use crate::factory::VideoOutput;

const PIXEL_BYTES: usize = 4;

/// Double buffered RGBA frame. TIA draws into the back buffer and publishes it on swap.
pub struct FrameBuffer {
    dim: (usize, usize),
    front: Vec<u8>,
    back: Vec<u8>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> FrameBuffer {
        FrameBuffer {
            dim: (width, height),
            front: vec![0; width * height * PIXEL_BYTES],
            back: vec![0; width * height * PIXEL_BYTES],
        }
    }

    pub fn get_pitch(&self) -> usize {
        self.dim.0 * PIXEL_BYTES
    }

    /// Last completed frame.
    pub fn get_pixel_data(&self) -> &[u8] {
        &self.front
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.dim.0 || y >= self.dim.1 {
            return None;
        }
        let offset = y * self.get_pitch() + x * PIXEL_BYTES;
        let mut pixel = [0u8; 4];
        pixel.copy_from_slice(&self.front[offset..offset + PIXEL_BYTES]);
        Some(pixel)
    }
}

impl VideoOutput for FrameBuffer {
    fn get_dimension(&self) -> (usize, usize) {
        self.dim
    }

    fn reset(&mut self) {
        for byte in self.front.iter_mut() {
            *byte = 0x00;
        }
        for byte in self.back.iter_mut() {
            *byte = 0x00;
        }
    }

    fn write(&mut self, offset: usize, pixel: [u8; 4]) {
        if offset + PIXEL_BYTES <= self.back.len() {
            self.back[offset..offset + PIXEL_BYTES].copy_from_slice(&pixel);
        }
    }

    fn swap(&mut self) {
        mem::swap(&mut self.front, &mut self.back);
    }
}
