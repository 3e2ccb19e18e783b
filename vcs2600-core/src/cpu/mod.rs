// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

mod cpu6507;
mod opcodes;
mod operand;

pub use self::cpu6507::{Cpu6507, Flag};
pub use self::opcodes::{Mnemonic, Mode, Opcode, OPCODES};
pub use self::operand::Operand;
