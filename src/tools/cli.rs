use std::ffi::OsStr;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::{fmt::Display, fmt::Formatter};

use clap::Parser;
use log::{info, warn, LevelFilter};

use crate::error::{HuffError, Result};

/// Extension given to compressed files.
pub const HUF_EXTENSION: &str = "huf";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Zip, Unzip, Test
pub enum Mode {
    Zip,
    Unzip,
    Test,
}
impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
impl Mode {
    /// Guess the mode from a file name: .huf files are decompressed, everything else compressed.
    pub fn infer(file: &Path) -> Self {
        match file.extension() {
            Some(ext) if ext == HUF_EXTENSION => Mode::Unzip,
            _ => Mode::Zip,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Define the two output channels
pub enum Output {
    File,
    Stdout,
}
impl Display for Output {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "A byte-oriented Huffman file compressor",
    long_about = "
    Compresses a file into a .huf container holding the original file name, the flat Huffman
    tree and the packed bit stream. Decompressing restores the original file under its stored name."
)]
pub struct Args {
    /// Filename of file to process (prompted for if missing)
    #[clap(parse(from_os_str))]
    filename: Option<PathBuf>,

    /// Perform compression on the input file
    #[clap(short = 'z', long = "zip")]
    compress: bool,

    /// Perform decompression on the input file
    #[clap(short = 'd', long = "decompress")]
    decompress: bool,

    /// Test compressed file integrity
    #[clap(short = 't', long = "test")]
    test: bool,

    /// Write output to this path instead of the derived one
    #[clap(short = 'o', long = "output", parse(from_os_str))]
    output: Option<PathBuf>,

    /// Send output to the terminal
    #[clap(short = 'c', long = "stdout")]
    stdout: bool,

    /// Force overwriting output file
    #[clap(short = 'f', long = "force")]
    force: bool,

    /// Sets verbosity. 0 is silent, 5 is chatty (release builds stop at 2)
    #[clap(short = 'v', long = "verbosity", default_value_t = 2)]
    verbosity: u8,
}

impl Args {
    /// The mode asked for on the command line, if any. Test wins over decompress, which wins over zip.
    fn explicit_mode(&self) -> Option<Mode> {
        if self.test {
            Some(Mode::Test)
        } else if self.decompress {
            Some(Mode::Unzip)
        } else if self.compress {
            Some(Mode::Zip)
        } else {
            None
        }
    }
}

#[derive(Debug)]
pub struct HuffOpts {
    /// Name of the file to read for input
    pub file: Option<PathBuf>,
    /// Compress/Decompress/Test
    pub op_mode: Mode,
    /// Location where output is sent
    pub output: Output,
    /// Explicit output file, overriding the derived name
    pub output_file: Option<PathBuf>,
    /// Silently overwrite existing files with the same name
    pub force_overwrite: bool,
    /// Verbosity of user information, 0-5
    pub verbosity: u8,
}

impl HuffOpts {
    pub fn new() -> Self {
        Self {
            file: None,
            op_mode: Mode::Zip,
            output: Output::File,
            output_file: None,
            force_overwrite: false,
            verbosity: 2,
        }
    }

    /// Copy parsed arguments into the options. The mode is inferred from the file name when no
    /// mode flag was given.
    pub fn from_args(args: &Args) -> Self {
        let mut opts = Self::new();
        opts.file = args.filename.clone();
        opts.op_mode = match (args.explicit_mode(), &opts.file) {
            (Some(mode), _) => mode,
            (None, Some(file)) => Mode::infer(file),
            (None, None) => Mode::Zip,
        };
        if args.stdout {
            opts.output = Output::Stdout
        };
        opts.output_file = args.output.clone();
        opts.force_overwrite = args.force;
        opts.verbosity = args.verbosity;
        opts
    }

    /// The input file name. Only empty if huffopts_init() was bypassed.
    pub fn input(&self) -> Result<&Path> {
        self.file.as_deref().ok_or_else(|| {
            HuffError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "No input file given",
            ))
        })
    }
}

impl Default for HuffOpts {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse the command line, set the log level and ask for a file name if none was given.
pub fn huffopts_init() -> Result<HuffOpts> {
    let args = Args::parse();
    let mut opts = HuffOpts::from_args(&args);
    set_log_level(opts.verbosity);

    if opts.file.is_none() {
        // stdout may be carrying the output data (--stdout), so the prompt goes to stderr
        ask_for_file(
            &mut opts,
            args.explicit_mode(),
            &mut io::stdin().lock(),
            &mut io::stderr(),
        )?;
    }

    // Below we report initialization status to the user
    info!("---- Huff Initialization Start ----");
    info!(
        "Verbosity set to {} ({})",
        opts.verbosity,
        log::max_level()
    );
    info!("Operational mode set to {}", opts.op_mode);
    if let Some(s) = &opts.file {
        info!("Getting input from the file {}", s.display())
    }
    match (&opts.output, &opts.output_file) {
        (Output::Stdout, _) => warn!("Sending output to stdout"),
        (Output::File, Some(s)) => info!("Sending output to {}", s.display()),
        (Output::File, None) => info!("Output file name will be derived"),
    }
    if opts.force_overwrite {
        info!("Forcing file overwriting")
    };
    info!("---- Huff Initialization End ----\n");
    Ok(opts)
}

/// Fill in a missing input file name by asking on `input`. The prompt is written to `prompt_out`,
/// never to the stream that carries --stdout output. Without a mode flag the mode is inferred from
/// the answer.
pub fn ask_for_file<R: BufRead, W: Write>(
    opts: &mut HuffOpts,
    explicit: Option<Mode>,
    input: &mut R,
    prompt_out: &mut W,
) -> Result<()> {
    let prompt = match explicit {
        Some(Mode::Zip) => "File to compress: ",
        Some(_) => "File to decompress: ",
        None => "File to process: ",
    };
    let file = prompt_for_file(input, prompt_out, prompt)?;
    let file = PathBuf::from(file);
    if explicit.is_none() {
        opts.op_mode = Mode::infer(&file);
    }
    opts.file = Some(file);
    Ok(())
}

/// Log level for a numeric verbosity.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Off,
        1 => LevelFilter::Error,
        2 => LevelFilter::Warn,
        3 => LevelFilter::Info,
        4 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Map the numeric verbosity onto the log crate's levels. Release builds compile out everything
/// below warn (release_max_level_warn), so 3-5 only add output in debug builds.
pub fn set_log_level(verbosity: u8) {
    let level = level_for(verbosity);
    log::set_max_level(level);
    if level > log::STATIC_MAX_LEVEL {
        warn!(
            "Verbosity {} asks for {}, but this build logs at most {}",
            verbosity,
            level,
            log::STATIC_MAX_LEVEL
        );
    }
}

/// Ask the user for a file name. Surrounding whitespace is dropped; an empty answer is an error.
pub fn prompt_for_file<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> Result<String> {
    write!(output, "{}", prompt)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let name = line.trim();
    if name.is_empty() {
        return Err(HuffError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            "No file name given",
        )));
    }
    Ok(name.to_string())
}

/// Name of the container written when compressing `input`: the extension is replaced by .huf,
/// or .huf is appended when there is none (or it already is .huf).
pub fn compressed_path(input: &Path) -> PathBuf {
    match input.extension() {
        Some(ext) if ext == HUF_EXTENSION => {
            let mut name = input.as_os_str().to_owned();
            name.push(".");
            name.push(HUF_EXTENSION);
            PathBuf::from(name)
        }
        _ => input.with_extension(HUF_EXTENSION),
    }
}

/// Raw bytes of the last component of `path`, as stored in a container.
pub fn stored_name(path: &Path) -> Vec<u8> {
    path.file_name().map(os_bytes).unwrap_or_default()
}

#[cfg(unix)]
fn os_bytes(name: &OsStr) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    name.as_bytes().to_vec()
}

#[cfg(not(unix))]
fn os_bytes(name: &OsStr) -> Vec<u8> {
    name.to_string_lossy().into_owned().into_bytes()
}

#[cfg(unix)]
fn os_path(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn os_path(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

/// Name of the file restored from the container `input`. Only the last component of the stored
/// name is used, placed next to the container. Falls back to the container name minus .huf.
/// A name that would land on the container itself gets .out appended.
pub fn restored_path(input: &Path, stored: &[u8]) -> PathBuf {
    let dir = input.parent().unwrap_or_else(|| Path::new(""));
    let target = match os_path(stored).file_name() {
        Some(name) => dir.join(name),
        None => input.with_extension(""),
    };
    if target == input {
        let mut name = target.into_os_string();
        name.push(".out");
        return PathBuf::from(name);
    }
    target
}
