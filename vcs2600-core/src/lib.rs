// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

#[macro_use]
extern crate log;

pub mod cpu;
mod error;
pub mod factory;
pub mod io;
pub mod mem;
pub mod system;
pub mod util;
pub mod video;

pub use self::error::{BusError, ConfigError, Error, LoadError, Result};
pub use self::factory::{Addressable, Chip, Cpu, Register, SystemModel, VideoOutput, VideoStandard};
pub use self::util::{new_shared, Shared};
