// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

mod config;
mod frame_buffer;
mod vcs;

pub use self::config::{Config, ConsoleConfig};
pub use self::frame_buffer::FrameBuffer;
pub use self::vcs::Vcs;
