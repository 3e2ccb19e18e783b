// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use core::str::FromStr;

use crate::error::ConfigError;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VideoStandard {
    Ntsc,
    Pal,
}

#[derive(Clone, Debug)]
pub struct SystemModel {
    pub cpu_freq: u32,
    pub color_clocks_per_line: u16,
    pub lines_per_frame: u16,
    pub frame_buffer_size: (usize, usize),
    pub refresh_rate: f32,
    pub video_standard: VideoStandard,
}

impl SystemModel {
    pub fn ntsc() -> SystemModel {
        SystemModel {
            cpu_freq: 1_193_182,
            color_clocks_per_line: 228,
            lines_per_frame: 262,
            frame_buffer_size: (160, 192),
            refresh_rate: 59.922,
            video_standard: VideoStandard::Ntsc,
        }
    }

    pub fn pal() -> SystemModel {
        SystemModel {
            cpu_freq: 1_182_298,
            color_clocks_per_line: 228,
            lines_per_frame: 312,
            frame_buffer_size: (160, 228),
            refresh_rate: 49.86,
            video_standard: VideoStandard::Pal,
        }
    }

    pub fn cycles_per_frame(&self) -> u32 {
        self.color_clocks_per_line as u32 / 3 * self.lines_per_frame as u32
    }
}

impl FromStr for SystemModel {
    type Err = ConfigError;

    fn from_str(model: &str) -> Result<Self, Self::Err> {
        match model {
            "ntsc" => Ok(SystemModel::ntsc()),
            "pal" => Ok(SystemModel::pal()),
            _ => Err(ConfigError::InvalidModel(model.to_string())),
        }
    }
}
