// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

mod collision;
mod objects;
mod palette;
mod playfield;
mod tia;

pub use self::collision::{Collisions, Object};
pub use self::objects::{Ball, Counter, Missile, Player};
pub use self::palette::Palette;
pub use self::playfield::Playfield;
pub use self::tia::{Beam, Tia};
