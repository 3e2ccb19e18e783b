// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use thiserror::Error;

/// Bus access failure. Aborts the instruction in flight.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum BusError {
    #[error("unmapped read at 0x{0:04x}")]
    UnmappedRead(u16),
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("unsupported image size {0}, expected 2048 or 4096 bytes")]
    UnsupportedSize(usize),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid model {0}")]
    InvalidModel(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("bus error: {0}")]
    Bus(#[from] BusError),
    #[error("load error: {0}")]
    Load(#[from] LoadError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("no cartridge attached")]
    NoCartridge,
}

pub type Result<T> = core::result::Result<T, Error>;
