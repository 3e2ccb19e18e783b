// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use log::{Level, LevelFilter, Metadata, Record};

pub struct Logger {
    level: Level,
    targets: HashMap<String, Level>,
}

impl Logger {
    pub fn new(level: &str) -> Result<Logger> {
        let loglevel = Level::from_str(level).map_err(|_| anyhow!("invalid log level {}", level))?;
        let mut logger = Logger {
            level: loglevel,
            targets: HashMap::new(),
        };
        let path = Path::new("logger.conf");
        if path.exists() {
            logger.load_config(path)?;
        }
        Ok(logger)
    }

    pub fn enable(logger: Logger) -> Result<()> {
        let max_level = logger.get_max_level();
        log::set_logger(Box::leak(Box::new(logger)))
            .map_err(|_| anyhow!("cannot initialize logging"))?;
        log::set_max_level(max_level);
        Ok(())
    }

    pub fn add_target(&mut self, target: String, level: String) -> Result<()> {
        let loglevel = Level::from_str(&level)
            .map_err(|_| anyhow!("invalid log level {} for target {}", level, &target))?;
        self.targets.insert(target, loglevel);
        Ok(())
    }

    pub fn get_level(&self) -> Level {
        self.level
    }

    /// Most verbose level across the global level and every target override.
    pub fn get_max_level(&self) -> LevelFilter {
        self.targets
            .values()
            .fold(self.level, |max, level| max.max(*level))
            .to_level_filter()
    }

    pub fn load_config(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path)
            .with_context(|| format!("failed to open file {}", path.display()))?;
        let reader = BufReader::new(file);
        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            if let Some(equals) = line.find('=') {
                let (target, level) = line.split_at(equals);
                self.add_target(target.to_string(), level[1..].to_string())?;
            } else {
                return Err(anyhow!("invalid logger config line {}", line_num + 1));
            }
        }
        Ok(())
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        if let Some(target_level) = self.targets.get(metadata.target()) {
            metadata.level() <= *target_level
        } else {
            metadata.level() <= self.level
        }
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!(
                "{} [{}] - {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}
