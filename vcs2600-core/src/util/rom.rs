// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

/// Read-only image based at `offset`. Reads past the end of the image wrap
/// around to its start.
pub struct Rom {
    data: Vec<u8>,
    offset: u16,
}

impl Rom {
    pub fn new_with_data(data: &[u8], offset: u16) -> Self {
        Self {
            data: data.to_vec(),
            offset,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn offset(&self) -> u16 {
        self.offset
    }

    pub fn read(&self, address: u16) -> u8 {
        let index = address.wrapping_sub(self.offset) as usize % self.data.len();
        self.data[index]
    }
}
