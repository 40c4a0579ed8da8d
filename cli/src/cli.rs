use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[clap(about, version, author)]
pub struct Cli {
    /// Minimum log level to print out
    #[clap(long, value_enum, default_value = "warn")]
    pub log_level: LevelFilter,

    /// How long to wait on any single USB transfer, in milliseconds
    #[clap(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_ms: u64,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Poll the Mod-T and print its status JSON
    Status {
        /// Pretty print the status rather than echoing it verbatim
        #[clap(long)]
        pretty: bool,
    },

    /// Put the Mod-T into unload filament mode
    UnloadFilament {
        /// Don't poll for status afterwards
        #[clap(long)]
        no_status: bool,
    },

    /// List every attached USB device, with IDs in decimal and hex
    Enumerate,

    /// Walk the USB bus with libusb debug logging enabled
    Probe,
}

#[repr(usize)]
#[derive(ValueEnum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum LevelFilter {
    /// A level lower than all log levels.
    Off,
    /// Corresponds to the `Error` log level.
    Error,
    /// Corresponds to the `Warn` log level.
    Warn,
    /// Corresponds to the `Info` log level.
    Info,
    /// Corresponds to the `Debug` log level.
    Debug,
    /// Corresponds to the `Trace` log level.
    Trace,
}

impl From<LevelFilter> for log::LevelFilter {
    fn from(level: LevelFilter) -> Self {
        match level {
            LevelFilter::Off => log::LevelFilter::Off,
            LevelFilter::Error => log::LevelFilter::Error,
            LevelFilter::Warn => log::LevelFilter::Warn,
            LevelFilter::Info => log::LevelFilter::Info,
            LevelFilter::Debug => log::LevelFilter::Debug,
            LevelFilter::Trace => log::LevelFilter::Trace,
        }
    }
}
