//! Device-programming engine interface
//!
//! An engine owns everything that talks to hardware: opening a tool,
//! connecting to the target and accessing its memories. The front end only
//! hands it a [`StructuredArguments`] record and reports the outcome.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::args::{Action, StructuredArguments};

/// Errors reported by an engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// No tool was specified and none could be found
    #[error("no tool connected (use --tool to select one)")]
    NoToolConnected,
    /// Tool name does not match any available tool
    #[error("unknown tool '{name}' (available: {available})")]
    ToolNotFound {
        /// Requested tool name
        name: String,
        /// Comma separated list of available tools
        available: String,
    },
    /// Tool does not support the requested device
    #[error("device '{0}' is not supported")]
    DeviceNotSupported(String),
    /// Tool does not support the requested programming interface
    #[error("interface '{0}' is not supported")]
    InterfaceNotSupported(String),
    /// Memory name does not exist on the device
    #[error("memory '{0}' does not exist on this device")]
    UnknownMemory(String),
    /// Arguments are inconsistent for the requested action
    #[error("{0}")]
    InvalidArgument(String),
    /// Access outside the memory
    #[error("access of {len} bytes at offset 0x{offset:X} exceeds {memory} size 0x{size:X}")]
    AddressOutOfBounds {
        /// Memory name
        memory: String,
        /// Start offset
        offset: u32,
        /// Access length in bytes
        len: usize,
        /// Memory size in bytes
        size: usize,
    },
    /// Memory cannot be written or erased
    #[error("memory '{0}' is read-only")]
    ReadOnlyMemory(String),
    /// Device is locked and the operation needs an explicit override
    #[error("device is locked: {0}")]
    DeviceLocked(String),
    /// Memory content differs from the expected data
    #[error("verify failed for {memory} at offset 0x{offset:X}: expected 0x{expected:02X}, read 0x{found:02X}")]
    VerifyFailed {
        /// Memory name
        memory: String,
        /// Offset of the first mismatch
        offset: u32,
        /// Expected byte
        expected: u8,
        /// Byte read back
        found: u8,
    },
    /// Action is not available on this tool
    #[error("action '{0}' is not supported by this tool")]
    UnsupportedAction(Action),
    /// File access failed
    #[error("{}: {source}", .path.display())]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },
}

impl EngineError {
    /// Short, stable name for the kind of failure
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::NoToolConnected => "NoToolConnected",
            EngineError::ToolNotFound { .. } => "ToolNotFound",
            EngineError::DeviceNotSupported(_) => "DeviceNotSupported",
            EngineError::InterfaceNotSupported(_) => "InterfaceNotSupported",
            EngineError::UnknownMemory(_) => "UnknownMemory",
            EngineError::InvalidArgument(_) => "InvalidArgument",
            EngineError::AddressOutOfBounds { .. } => "AddressOutOfBounds",
            EngineError::ReadOnlyMemory(_) => "ReadOnlyMemory",
            EngineError::DeviceLocked(_) => "DeviceLocked",
            EngineError::VerifyFailed { .. } => "VerifyFailed",
            EngineError::UnsupportedAction(_) => "UnsupportedAction",
            EngineError::Io { .. } => "IoError",
        }
    }

    /// Wrap an I/O error with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Something that can carry out a structured command
///
/// Implemented by tools (talking to a target) and by the tool registry
/// (selecting a tool from the arguments and delegating to it).
pub trait Engine {
    /// Perform the action described by `args`
    fn run(&mut self, args: &StructuredArguments) -> Result<(), EngineError>;
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn run(&mut self, args: &StructuredArguments) -> Result<(), EngineError> {
        (**self).run(args)
    }
}
