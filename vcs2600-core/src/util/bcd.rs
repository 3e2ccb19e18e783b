// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

//! Packed BCD conversion used by decimal mode arithmetic.

#[inline(always)]
pub fn from_bcd(decimal: u8) -> u8 {
    (decimal >> 4) * 10 + (decimal & 0x0f)
}

/// Inputs above 99 are reduced modulo 100 first.
#[inline(always)]
pub fn to_bcd(num: u8) -> u8 {
    let num = num % 100;
    ((num / 10) << 4) | (num % 10)
}
