// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

pub mod bcd;
mod ram;
mod rom;
mod shared;

pub use self::ram::Ram;
pub use self::rom::Rom;
pub use self::shared::{new_shared, Shared};
