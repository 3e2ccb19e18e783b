// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

mod riot;
mod timer;

pub use self::riot::{Direction, Riot, Switch};
pub use self::timer::Timer;
