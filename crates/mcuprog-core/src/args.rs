//! Structured argument record
//!
//! The command line front end produces one [`StructuredArguments`] per
//! invocation and hands it to an [`Engine`](crate::Engine).

use std::fmt;
use std::path::PathBuf;

use crate::level::LogLevel;
use crate::literal::LiteralValue;
use crate::memory;

/// Primary action to perform
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Action {
    /// Read the device ID or signature
    #[default]
    Ping,
    /// Erase memories
    Erase,
    /// Read memories
    Read,
    /// Write memories
    Write,
    /// Verify memories
    Verify,
    /// Read the sampled target voltage
    #[cfg_attr(feature = "clap", value(name = "getvoltage"))]
    GetVoltage,
    /// Read the target supply voltage setpoint
    #[cfg_attr(feature = "clap", value(name = "getsupplyvoltage"))]
    GetSupplyVoltage,
    /// Reboot the debugger
    #[cfg_attr(feature = "clap", value(name = "reboot-debugger"))]
    RebootDebugger,
    /// Set the target supply voltage
    #[cfg_attr(feature = "clap", value(name = "setsupplyvoltage"))]
    SetSupplyVoltage,
    /// Read the USB voltage
    #[cfg_attr(feature = "clap", value(name = "getusbvoltage"))]
    GetUsbVoltage,
    /// Reset the target
    Reset,
}

impl Action {
    /// Name as written on the command line
    pub fn name(self) -> &'static str {
        match self {
            Action::Ping => "ping",
            Action::Erase => "erase",
            Action::Read => "read",
            Action::Write => "write",
            Action::Verify => "verify",
            Action::GetVoltage => "getvoltage",
            Action::GetSupplyVoltage => "getsupplyvoltage",
            Action::RebootDebugger => "reboot-debugger",
            Action::SetSupplyVoltage => "setsupplyvoltage",
            Action::GetUsbVoltage => "getusbvoltage",
            Action::Reset => "reset",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// UPDI high-voltage activation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum HighVoltageMode {
    /// Tool toggles target power
    ToolTogglePower,
    /// User toggles target power when prompted
    UserTogglePower,
    /// High-voltage pulse without a power cycle
    SimpleUnsafePulse,
}

impl fmt::Display for HighVoltageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HighVoltageMode::ToolTogglePower => "tool-toggle-power",
            HighVoltageMode::UserTogglePower => "user-toggle-power",
            HighVoltageMode::SimpleUnsafePulse => "simple-unsafe-pulse",
        })
    }
}

/// Validated, typed command line arguments
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredArguments {
    /// Primary action
    pub action: Action,
    /// Target device identifier
    pub device: Option<String>,
    /// Device-description pack location
    pub packpath: Option<PathBuf>,
    /// Programming tool identifier
    pub tool: Option<String>,
    /// Tool USB serial number filter
    pub serialnumber: Option<String>,
    /// Memory region name or the `all` alias
    pub memory: String,
    /// Byte offset into the memory
    pub offset: u32,
    /// Number of bytes (0 means up to the end of the memory)
    pub bytes: u32,
    /// Values to write
    pub literal: Vec<LiteralValue>,
    /// Offset-qualified values to write
    pub direct: Vec<LiteralValue>,
    /// File to read from or write to
    pub filename: Option<PathBuf>,
    /// Programming clock frequency
    pub clk: Option<String>,
    /// Serial port for UART based programming
    pub uart: Option<String>,
    /// Programming interface
    pub interface: Option<String>,
    /// Console logging verbosity
    pub verbose: LogLevel,
    /// Print version and exit
    pub version: bool,
    /// Print release details and exit
    pub release_info: bool,
    /// Erase before writing
    pub erase: bool,
    /// Verify after writing
    pub verify: bool,
    /// Emit timing output
    pub timing: bool,
    /// High-voltage activation mode
    pub high_voltage: Option<HighVoltageMode>,
    /// Allow a user row write on a locked device
    pub user_row_locked_device: bool,
    /// Allow a chip erase on a locked device
    pub chip_erase_locked_device: bool,
}

impl StructuredArguments {
    /// Whether the memory selection is the `all` alias
    pub fn all_memories(&self) -> bool {
        memory::is_all(&self.memory)
    }

    /// Whether this invocation only asks for version or release details
    pub fn info_only(&self) -> bool {
        self.version || self.release_info
    }
}

impl Default for StructuredArguments {
    fn default() -> Self {
        Self {
            action: Action::Ping,
            device: None,
            packpath: None,
            tool: None,
            serialnumber: None,
            memory: memory::ALL.to_string(),
            offset: 0,
            bytes: 0,
            literal: Vec::new(),
            direct: Vec::new(),
            filename: None,
            clk: None,
            uart: None,
            interface: None,
            verbose: LogLevel::Warning,
            version: false,
            release_info: false,
            erase: false,
            verify: false,
            timing: false,
            high_voltage: None,
            user_row_locked_device: false,
            chip_erase_locked_device: false,
        }
    }
}
