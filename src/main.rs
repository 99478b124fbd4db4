//Enable more cargo lint tests
#![warn(rust_2018_idioms)]
#![warn(clippy::disallowed_types)]

use std::io;

use huff::compression::compress::compress;
use huff::compression::decompress::{decompress, verify};
use huff::tools::cli::{huffopts_init, Mode};
use huff::tools::timer::Timer;

use log::{error, info, LevelFilter};
use simplelog::{Config, TermLogger, TerminalMode};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() -> Result<(), std::io::Error> {
    // Available log levels are Error, Warn, Info, Debug, Trace. Output goes to stderr so that
    // --stdout stays clean.
    TermLogger::init(
        LevelFilter::Trace,
        Config::default(),
        TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )
    .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let mut timer = Timer::new();
    let options = huffopts_init()?;
    timer.mark("setup");

    //----- Figure how what we need to do and go do it
    let result = match options.op_mode {
        Mode::Zip => compress(&options, &mut timer),
        Mode::Unzip => decompress(&options, &mut timer),
        Mode::Test => verify(&options, &mut timer),
    };

    match &result {
        Ok(()) => timer.report(match options.op_mode {
            Mode::Zip => "compress",
            Mode::Unzip => "decompress",
            Mode::Test => "test",
        }),
        Err(e) => error!("{}", e),
    }

    info!("Done.\n");
    result.map_err(io::Error::from)
}
