// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

mod disassembler;
mod instruction;

pub use self::disassembler::Disassembler;
pub use self::instruction::Instruction;
