// This file is part of vcs2600.
// Copyright (c) 2016-2019 Sebastian Jastrzebski. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

#[macro_use]
extern crate log;

mod cli;
mod logger;

use std::env;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::process;
use std::rc::Rc;

use anyhow::{Context, Result};
use vcs2600_core::mem::Cartridge;
use vcs2600_core::system::Vcs;
use vcs2600_debug::Disassembler;

use self::cli::Cli;
use self::logger::Logger;

static NAME: &str = "vcs2600";

fn main() {
    match run(env::args().collect()) {
        Ok(_) => process::exit(0),
        Err(err) => {
            println!("Error: {:#}", err);
            process::exit(1)
        }
    };
}

fn init_logging(matches: &getopts::Matches) -> Result<()> {
    let loglevel = matches
        .opt_str("loglevel")
        .unwrap_or_else(|| "info".to_string());
    let mut logger = Logger::new(&loglevel)?;
    for target_level in matches.opt_strs("log") {
        if let Some(equals) = target_level.find('=') {
            let (target, level) = target_level.split_at(equals);
            logger.add_target(target.to_string(), level[1..].to_string())?;
        } else {
            return Err(anyhow::anyhow!("invalid log target pair {}", target_level));
        }
    }
    Logger::enable(logger)?;
    Ok(())
}

fn run(args: Vec<String>) -> Result<()> {
    let matches = Cli::parse_args(&args)?;
    if matches.opt_present("help") {
        Cli::print_help();
    } else if matches.opt_present("version") {
        Cli::print_version();
    } else {
        init_logging(&matches)?;
        info!("Starting {}", NAME);
        let options = Cli::parse_options(&matches)?;
        info!(target: "loader", "Loading image {}", options.image.display());
        let image = fs::read(&options.image)
            .with_context(|| format!("failed to read image {}", options.image.display()))?;
        if let Some(count) = options.disasm {
            print_listing(&image, count)?;
            return Ok(());
        }
        let config = Rc::new(Cli::parse_system_config(&matches)?);
        let mut vcs = Vcs::build(config);
        vcs.load(&image)?;
        run_frames(&mut vcs, options.frames)?;
        if let Some(path) = options.output {
            write_ppm(&vcs, &path)?;
        }
    }
    Ok(())
}

fn print_listing(image: &[u8], count: usize) -> Result<()> {
    let cartridge = Cartridge::load(image)?;
    let disassembler = Disassembler::new(cartridge.data(), 0xf000);
    for line in disassembler.listing(cartridge.reset_vector(), count) {
        println!("{}", line);
    }
    Ok(())
}

fn run_frames(vcs: &mut Vcs, frames: u32) -> Result<()> {
    let start_ns = time::precise_time_ns();
    for frame in 0..frames {
        if !vcs.run_frame()? {
            warn!(target: "vcs", "Frame {} ended without vertical sync", frame);
        }
    }
    let elapsed_ns = time::precise_time_ns() - start_ns;
    let elapsed_ms = elapsed_ns as f64 / 1_000_000.0;
    let fps = if elapsed_ns > 0 {
        vcs.get_frame_count() as f64 * 1_000_000_000.0 / elapsed_ns as f64
    } else {
        0.0
    };
    info!(
        "Ran {} frames, {} cycles in {:.1} ms ({:.1} fps)",
        vcs.get_frame_count(),
        vcs.get_cycles(),
        elapsed_ms,
        fps
    );
    Ok(())
}

fn write_ppm(vcs: &Vcs, path: &Path) -> Result<()> {
    let (width, height) = vcs.get_frame_dimension();
    let pixels = vcs.get_frame_buffer();
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write!(writer, "P6\n{} {}\n255\n", width, height)?;
    for pixel in pixels.chunks(4) {
        writer.write_all(&pixel[0..3])?;
    }
    writer.flush()?;
    info!("Wrote frame {} to {}", vcs.get_frame_count(), path.display());
    Ok(())
}
