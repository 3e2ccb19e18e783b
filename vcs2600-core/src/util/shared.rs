// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use std::cell::RefCell;
use std::rc::Rc;

/// Component state shared between the system and the handlers mapped onto the bus.
pub type Shared<T> = Rc<RefCell<T>>;

pub fn new_shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}
