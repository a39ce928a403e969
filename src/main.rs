use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use log::{error, LevelFilter};

use huff_codec::config::DEFAULT_BUFFER_SIZE;
use huff_codec::files::{self, FileError};
use huff_codec::CodecConfig;


/// Huffman prefix-code file compressor.
#[derive(Debug, Parser)]
#[command(name = "huff", version, about)]
struct Cli {

    #[command(subcommand)]
    command: Command,

    /// Bytes read or written per chunk
    #[arg(long, global = true, env = "HUFF_BUFFER_SIZE", default_value_t = DEFAULT_BUFFER_SIZE)]
    buffer_size: usize,

    /// More log output, repeat for more detail
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8

}


#[derive(Debug, Subcommand)]
enum Command {

    /// Compress <INPUT> into <INPUT>.huff
    Encode { input: PathBuf },

    /// Decompress <NAME>.huff into <NAME>
    Decode { input: PathBuf },

}


fn init_logging(verbose: u8) {

    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}


/// How a run ended, as the caller of the binary sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {

    Success,
    FileError,
    ArgumentError,

}

impl Status {

    const fn message(self) -> Option<&'static str> {
        match self {
            Status::Success => None,
            Status::FileError => Some("File Error"),
            Status::ArgumentError => Some("Argument Error"),
        }
    }


    const fn code(self) -> u8 {
        match self {
            Status::Success => 0,
            Status::FileError => 1,
            Status::ArgumentError => 2,
        }
    }

}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        ExitCode::from(status.code())
    }
}


/// `--help` and `--version` surface as parse errors that are not failures.
fn parse_failure(e: &clap::Error) -> Status {
    if e.use_stderr() {
        Status::ArgumentError
    } else {
        Status::Success
    }
}


/// A decode input without the `.huff` extension is a bad argument, not a bad file.
fn status_of(result: &Result<PathBuf, FileError>) -> Status {
    match result {
        Ok(_) => Status::Success,
        Err(FileError::InvalidExtension(_)) => Status::ArgumentError,
        Err(_) => Status::FileError,
    }
}


fn finish(status: Status) -> ExitCode {
    if let Some(message) = status.message() {
        println!("{message}");
    }
    status.into()
}


fn main() -> ExitCode {

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let status = parse_failure(&e);
            if status == Status::Success {
                return match e.print() {
                    Ok(()) => ExitCode::SUCCESS,
                    Err(_) => ExitCode::FAILURE,
                };
            }
            return finish(status);
        },
    };

    init_logging(cli.verbose);

    let config = CodecConfig::new().with_buffer_size(cli.buffer_size);

    let result = match &cli.command {
        Command::Encode { input } => files::encode_file(input, &config),
        Command::Decode { input } => files::decode_file(input, &config),
    };

    if let Err(e) = &result {
        error!("{e}");
    }

    finish(status_of(&result))
}
