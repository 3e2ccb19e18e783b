// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use vcs2600_core::system::Config;
use vcs2600_core::SystemModel;

static NAME: &str = "vcs2600";
static VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct Options {
    pub image: PathBuf,
    pub frames: u32,
    pub output: Option<PathBuf>,
    pub disasm: Option<usize>,
}

pub struct Cli;

impl Cli {
    pub fn parse_args(args: &[String]) -> Result<getopts::Matches> {
        let opts = Cli::build_options();
        let matches = opts
            .parse(&args[1..])
            .map_err(|f| anyhow!("Invalid options\n{}", f))?;
        Ok(matches)
    }

    pub fn parse_options(matches: &getopts::Matches) -> Result<Options> {
        let image = matches
            .free
            .first()
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("missing image path"))?;
        let frames = match matches.opt_str("frames") {
            Some(s) => s
                .parse::<u32>()
                .map_err(|_| anyhow!("invalid frame count {}", s))?,
            None => 60,
        };
        let disasm = match matches.opt_str("disasm") {
            Some(s) => Some(
                s.parse::<usize>()
                    .map_err(|_| anyhow!("invalid instruction count {}", s))?,
            ),
            None => None,
        };
        Ok(Options {
            image,
            frames,
            output: matches.opt_str("output").map(PathBuf::from),
            disasm,
        })
    }

    pub fn parse_system_config(matches: &getopts::Matches) -> Result<Config> {
        let model = SystemModel::from_str(
            &matches
                .opt_str("model")
                .unwrap_or_else(|| String::from("ntsc")),
        )?;
        let mut config = Config::new(model);
        Cli::parse_console_config(&mut config, matches)?;
        Ok(config)
    }

    pub fn print_help() {
        let opts = Cli::build_options();
        println!("{} {}", NAME, VERSION);
        println!();
        println!("Usage:");
        print!("{}", opts.usage("Atari 2600 rustified emulator"));
    }

    pub fn print_version() {
        println!("{} {}", NAME, VERSION);
    }

    fn build_options() -> getopts::Options {
        let mut opts = getopts::Options::new();
        opts.optopt("", "model", "set NTSC or PAL variants", "[ntsc|pal]")
            // Run
            .optopt("", "frames", "number of frames to run", "60")
            .optopt("", "output", "write last frame as PPM image", "path")
            .optopt("", "disasm", "list instructions from the reset vector", "count")
            // Console
            .optopt("", "difficulty0", "set left difficulty switch", "[a|b]")
            .optopt("", "difficulty1", "set right difficulty switch", "[a|b]")
            .optflag("", "bw", "set TV type switch to black and white")
            // Logging
            .optopt("", "loglevel", "set log level", "[error|warn|info|debug|trace]")
            .optmulti("", "log", "set log level for a target", "target=level")
            // Help
            .optflag("h", "help", "display this help")
            .optflag("V", "version", "display this version");
        opts
    }

    fn parse_console_config(config: &mut Config, matches: &getopts::Matches) -> Result<()> {
        if let Some(difficulty) = matches.opt_str("difficulty0") {
            config.console.difficulty_0 = Cli::parse_difficulty(&difficulty)?;
        }
        if let Some(difficulty) = matches.opt_str("difficulty1") {
            config.console.difficulty_1 = Cli::parse_difficulty(&difficulty)?;
        }
        config.console.color = !matches.opt_present("bw");
        Ok(())
    }

    fn parse_difficulty(value: &str) -> Result<bool> {
        match value {
            "a" => Ok(true),
            "b" => Ok(false),
            _ => Err(anyhow!("invalid difficulty {}", value)),
        }
    }
}
