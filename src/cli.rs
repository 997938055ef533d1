//! CLI argument parsing

use clap::{CommandFactory, FromArgMatches, Parser};
use mcuprog_core::literal::{parse_direct, parse_int_auto, parse_literal};
use mcuprog_core::{memory, Action, HighVoltageMode, LiteralValue, LogLevel, StructuredArguments};
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

/// Flags that make the action argument optional
const INFO_FLAGS: &[&str] = &["-V", "--version", "-R", "--release-info"];

const ABOUT: &str = "\
Generic programmer of selected AVR, PIC and SAM devices

Basic actions:
    - ping: read the device ID or signature
    - read: read memories
    - write: write memories
    - erase: erase memories
    - verify: verify memories";

const EXAMPLES: &str = "\
Usage examples:

    Ping a device using the simulated tool:
    - mcuprog ping -t sim -d atmega4809 -i updi

    Read 64 bytes of flash from offset 0x80 in flash memory space:
    - mcuprog read -t sim -m flash -o 0x80 -b 64

    Write literal values 0x01, 0x02 to EEPROM at offset 16:
    - mcuprog write -t sim -m eeprom -o 16 -l 0x01 0x02

    Write more than one disjointed fuse in direct offset:value format:
    - mcuprog write -t sim -m fuses -D 1:0xe0 -D 4:0x10 -D 8:0xf0

    Erase a locked device:
    - mcuprog erase -t sim --chip-erase-locked-device

    Set target supply voltage (voltage provided by -l literal argument):
    - mcuprog setsupplyvoltage -t sim -l 3.3";

/// Parse a byte offset (hex, octal, binary or decimal)
fn parse_offset(s: &str) -> Result<u32, String> {
    let value = parse_int_auto(s).map_err(|e| e.to_string())?;
    u32::try_from(value).map_err(|_| format!("offset {} is out of range", s))
}

/// Generate dynamic help text for the tool argument
fn tool_help() -> String {
    format!(
        "tool to connect to [available: {}]",
        mcuprog_tools::tool_names_short()
    )
}

#[derive(Parser, Debug)]
#[command(name = "mcuprog")]
#[command(author, about = ABOUT, after_help = EXAMPLES)]
pub struct Cli {
    /// action to perform
    #[arg(value_enum, default_value_t = Action::Ping)]
    pub action: Action,

    /// device to program
    #[arg(short, long)]
    pub device: Option<String>,

    /// path to pack
    #[arg(short, long)]
    pub packpath: Option<PathBuf>,

    #[arg(short, long, help = tool_help())]
    pub tool: Option<String>,

    /// USB serial number of the unit to use
    #[arg(short, long)]
    pub serialnumber: Option<String>,

    #[arg(short, long, default_value = memory::ALL, help = memory::memory_help())]
    pub memory: String,

    /// memory byte offset to access
    #[arg(short, long, default_value = "0", value_parser = parse_offset, allow_negative_numbers = true)]
    pub offset: u32,

    /// number of bytes to access
    #[arg(short, long, default_value_t = 0)]
    pub bytes: u32,

    /// literal values to write
    #[arg(short, long, num_args = 1.., value_parser = parse_literal, allow_negative_numbers = true)]
    pub literal: Vec<LiteralValue>,

    /// direct offset:value to write
    #[arg(short = 'D', long, num_args = 1.., value_parser = parse_direct, allow_negative_numbers = true)]
    pub direct: Vec<LiteralValue>,

    /// file to write / read
    #[arg(short, long)]
    pub filename: Option<PathBuf>,

    /// clock frequency in Hz (bps) for programming interface (eg: '-c 32768' or '-c 115k' or '-c 1M')
    #[arg(short, long)]
    pub clk: Option<String>,

    /// UART to use for serial UPDI tool
    #[arg(short, long)]
    pub uart: Option<String>,

    /// programming interface to use
    #[arg(short, long)]
    pub interface: Option<String>,

    /// logging verbosity level
    #[arg(short, long, value_enum, default_value_t = LogLevel::Warning)]
    pub verbose: LogLevel,

    /// print mcuprog version number and exit
    #[arg(short = 'V', long)]
    pub version: bool,

    /// print mcuprog release details and exit
    #[arg(short = 'R', long)]
    pub release_info: bool,

    /// erase memory section before writing
    #[arg(long)]
    pub erase: bool,

    /// verify after write
    #[arg(long)]
    pub verify: bool,

    /// add timing output
    #[arg(short = 'x', long)]
    pub timing: bool,

    /// UPDI high-voltage activation mode
    #[arg(short = 'H', long, value_enum)]
    pub high_voltage: Option<HighVoltageMode>,

    /// writes the User Row on a locked device (UPDI devices only)
    #[arg(short = 'U', long)]
    pub user_row_locked_device: bool,

    /// execute a Chip Erase on a locked device (UPDI devices only)
    #[arg(short = 'C', long)]
    pub chip_erase_locked_device: bool,
}

impl From<Cli> for StructuredArguments {
    fn from(cli: Cli) -> Self {
        Self {
            action: cli.action,
            device: cli.device,
            packpath: cli.packpath,
            tool: cli.tool,
            serialnumber: cli.serialnumber,
            memory: cli.memory,
            offset: cli.offset,
            bytes: cli.bytes,
            literal: cli.literal,
            direct: cli.direct,
            filename: cli.filename,
            clk: cli.clk,
            uart: cli.uart,
            interface: cli.interface,
            verbose: cli.verbose,
            version: cli.version,
            release_info: cli.release_info,
            erase: cli.erase,
            verify: cli.verify,
            timing: cli.timing,
            high_voltage: cli.high_voltage,
            user_row_locked_device: cli.user_row_locked_device,
            chip_erase_locked_device: cli.chip_erase_locked_device,
        }
    }
}

/// Whether the raw arguments ask for version or release details
pub fn info_requested<T: AsRef<OsStr>>(raw: &[T]) -> bool {
    raw.iter()
        .skip(1)
        .any(|arg| INFO_FLAGS.iter().any(|flag| arg.as_ref() == OsStr::new(flag)))
}

/// Build the command; the action is required unless version or release
/// details are requested
pub fn command(info_requested: bool) -> clap::Command {
    let cmd = Cli::command();
    if info_requested {
        cmd
    } else {
        cmd.mut_arg("action", |arg| {
            arg.required(true).default_value(None::<&'static str>)
        })
    }
}

/// Parse arguments, returning the usage error instead of exiting
pub fn try_parse_from<I, T>(itr: I) -> Result<StructuredArguments, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let raw: Vec<OsString> = itr.into_iter().map(Into::into).collect();
    let matches = command(info_requested(&raw)).try_get_matches_from(raw)?;
    let cli = Cli::from_arg_matches(&matches)?;
    Ok(cli.into())
}

/// Parse the process arguments, exiting with a usage message on error
pub fn parse() -> StructuredArguments {
    try_parse_from(std::env::args_os()).unwrap_or_else(|e| e.exit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use mcuprog_core::Number;

    fn parse_ok(args: &[&str]) -> StructuredArguments {
        let mut raw = vec!["mcuprog"];
        raw.extend_from_slice(args);
        try_parse_from(raw).unwrap()
    }

    fn parse_err(args: &[&str]) -> ErrorKind {
        let mut raw = vec!["mcuprog"];
        raw.extend_from_slice(args);
        try_parse_from(raw).unwrap_err().kind()
    }

    #[test]
    fn test_command_is_valid() {
        command(false).debug_assert();
        command(true).debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = parse_ok(&["ping"]);
        assert_eq!(args.action, Action::Ping);
        assert_eq!(args.memory, memory::ALL);
        assert_eq!(args.offset, 0);
        assert_eq!(args.bytes, 0);
        assert_eq!(args.verbose, LogLevel::Warning);
        assert!(args.literal.is_empty());
        assert!(args.direct.is_empty());
        assert!(!args.version);
        assert_eq!(args.high_voltage, None);
    }

    #[test]
    fn test_action_required() {
        assert_eq!(parse_err(&[]), ErrorKind::MissingRequiredArgument);
        assert_eq!(parse_err(&["-t", "sim"]), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_action_optional_with_info_flags() {
        let args = parse_ok(&["-V"]);
        assert!(args.version);
        assert_eq!(args.action, Action::Ping);

        let args = parse_ok(&["--release-info"]);
        assert!(args.release_info);
        assert_eq!(args.action, Action::Ping);

        let args = parse_ok(&["read", "--version"]);
        assert_eq!(args.action, Action::Read);
    }

    #[test]
    fn test_info_requested_ignores_program_name() {
        assert!(!info_requested(&["-V"]));
        assert!(info_requested(&["mcuprog", "-R"]));
        assert!(!info_requested(&["mcuprog", "--verbose", "info"]));
    }

    #[test]
    fn test_action_names() {
        assert_eq!(parse_ok(&["getvoltage"]).action, Action::GetVoltage);
        assert_eq!(parse_ok(&["reboot-debugger"]).action, Action::RebootDebugger);
        assert_eq!(parse_ok(&["setsupplyvoltage"]).action, Action::SetSupplyVoltage);
        assert_eq!(parse_err(&["flash"]), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_write_literals() {
        let args = parse_ok(&["write", "-m", "eeprom", "-o", "16", "-l", "0x01", "0x02"]);
        assert_eq!(args.action, Action::Write);
        assert_eq!(args.memory, "eeprom");
        assert_eq!(args.offset, 16);
        assert_eq!(
            args.literal,
            vec![
                LiteralValue::Scalar(Number::Int(1)),
                LiteralValue::Scalar(Number::Int(2))
            ]
        );
    }

    #[test]
    fn test_literal_forms() {
        let args = parse_ok(&["setsupplyvoltage", "-l", "3.3"]);
        assert_eq!(args.literal, vec![LiteralValue::Scalar(Number::Float(3.3))]);

        let args = parse_ok(&["write", "-l", "4:0x10", "-1"]);
        assert_eq!(
            args.literal,
            vec![
                LiteralValue::Pair {
                    offset: 4,
                    value: Number::Int(16)
                },
                LiteralValue::Scalar(Number::Int(-1))
            ]
        );

        assert_eq!(parse_err(&["write", "-l", "abc"]), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_direct_accumulates() {
        let args = parse_ok(&["write", "-m", "fuses", "-D", "1:0xe0", "-D", "4:0x10", "8:0xf0"]);
        let offsets: Vec<i64> = args.direct.iter().filter_map(|d| d.offset()).collect();
        assert_eq!(offsets, vec![1, 4, 8]);
    }

    #[test]
    fn test_direct_requires_separator() {
        assert_eq!(parse_err(&["write", "-D", "0x10"]), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_offset_and_bytes() {
        let args = parse_ok(&["read", "-o", "0x80", "-b", "64"]);
        assert_eq!(args.offset, 0x80);
        assert_eq!(args.bytes, 64);

        assert_eq!(parse_ok(&["read", "-o", "0b1000"]).offset, 8);
        assert_eq!(parse_err(&["read", "-o", "-1"]), ErrorKind::ValueValidation);
        assert_eq!(parse_err(&["read", "-b", "0x10"]), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_flags_and_enums() {
        let args = parse_ok(&[
            "erase", "-v", "debug", "-x", "-H", "user-toggle-power", "-C", "-U", "--erase",
            "--verify", "-i", "updi", "-u", "/dev/ttyUSB0", "-c", "115k", "-s", "MCHP123",
        ]);
        assert_eq!(args.verbose, LogLevel::Debug);
        assert!(args.timing);
        assert_eq!(args.high_voltage, Some(HighVoltageMode::UserTogglePower));
        assert!(args.chip_erase_locked_device);
        assert!(args.user_row_locked_device);
        assert!(args.erase && args.verify);
        assert_eq!(args.interface.as_deref(), Some("updi"));
        assert_eq!(args.uart.as_deref(), Some("/dev/ttyUSB0"));
        assert_eq!(args.clk.as_deref(), Some("115k"));
        assert_eq!(args.serialnumber.as_deref(), Some("MCHP123"));

        assert_eq!(parse_err(&["ping", "-v", "trace"]), ErrorKind::InvalidValue);
    }
}
