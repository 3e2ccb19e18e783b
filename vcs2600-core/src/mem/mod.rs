// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

mod bus;
mod cartridge;
mod memory_map;

pub use self::bus::Bus;
pub use self::cartridge::Cartridge;
pub use self::memory_map::{MemoryMap, Region};
