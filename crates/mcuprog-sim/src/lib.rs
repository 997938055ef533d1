//! mcuprog-sim - Simulated programming tool
//!
//! This crate provides a programming tool that emulates a UPDI kit with a
//! target device held in memory. It's useful for testing and development
//! without real hardware.
//!
//! The simulated target keeps its memory contents for the lifetime of the
//! [`SimTool`], so a sequence of actions run through the same tool behaves
//! like a session with a real device.

mod device;

pub use device::{
    find_device, DeviceInfo, MemoryInfo, DEFAULT_DEVICE, DEVICES, LOCKBITS_UNLOCKED,
};

use std::collections::HashSet;
use std::fs;
use std::ops::Range;

use indicatif::{ProgressBar, ProgressStyle};
use mcuprog_core::{
    memory, Action, Engine, EngineError, LiteralValue, Number, StructuredArguments,
};

/// Programming interface spoken by the simulated kit
pub const INTERFACE: &str = "updi";

/// Target supply voltage after power-up, in volts
pub const DEFAULT_SUPPLY_VOLTAGE: f64 = 3.3;

/// Highest supply voltage the kit can provide, in volts
pub const MAX_SUPPLY_VOLTAGE: f64 = 5.5;

const USB_VOLTAGE: f64 = 5.0;

/// One contiguous block of data destined for a memory
#[derive(Debug, Clone, PartialEq, Eq)]
struct Block {
    /// Index into the device memory table
    memory: usize,
    offset: u32,
    data: Vec<u8>,
}

/// Simulated programming tool with an attached target
pub struct SimTool {
    device: &'static DeviceInfo,
    /// Memory contents, in the order of `device.memories`
    memories: Vec<Vec<u8>>,
    supply_voltage: f64,
}

impl SimTool {
    /// Create a tool attached to a freshly erased `device`
    pub fn new(device: &'static DeviceInfo) -> Self {
        let memories = device
            .memories
            .iter()
            .map(|m| {
                if m.name == memory::SIGNATURES {
                    device.signature.to_vec()
                } else {
                    vec![m.erased; m.size]
                }
            })
            .collect();

        Self {
            device,
            memories,
            supply_voltage: DEFAULT_SUPPLY_VOLTAGE,
        }
    }

    /// Create a tool for the named device, or the default device
    pub fn open(device: Option<&str>) -> Result<Self, EngineError> {
        let name = device.unwrap_or(DEFAULT_DEVICE);
        let info =
            find_device(name).ok_or_else(|| EngineError::DeviceNotSupported(name.to_string()))?;
        log::info!("Simulated tool attached to {}", info.name);
        Ok(Self::new(info))
    }

    /// The emulated device
    pub fn device(&self) -> &'static DeviceInfo {
        self.device
    }

    /// Contents of a memory
    pub fn memory(&self, name: &str) -> Option<&[u8]> {
        self.index_of(name).map(|i| self.memories[i].as_slice())
    }

    /// Mutable contents of a memory, bypassing all access checks
    pub fn memory_mut(&mut self, name: &str) -> Option<&mut [u8]> {
        self.index_of(name).map(|i| self.memories[i].as_mut_slice())
    }

    /// Current target supply voltage setpoint
    pub fn supply_voltage(&self) -> f64 {
        self.supply_voltage
    }

    /// Whether the lock bits are set
    pub fn is_locked(&self) -> bool {
        self.memory(memory::LOCKBITS)
            .is_some_and(|lock| lock.first() != Some(&LOCKBITS_UNLOCKED))
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.device
            .memories
            .iter()
            .position(|m| m.name.eq_ignore_ascii_case(name))
    }

    fn lookup(&self, name: &str) -> Result<usize, EngineError> {
        self.index_of(name)
            .ok_or_else(|| EngineError::UnknownMemory(name.to_string()))
    }

    fn info(&self, index: usize) -> &'static MemoryInfo {
        let memories: &'static [MemoryInfo] = self.device.memories;
        &memories[index]
    }

    /// Check that a memory may be accessed given the lock state
    fn guard(
        &self,
        index: usize,
        write: bool,
        args: &StructuredArguments,
    ) -> Result<(), EngineError> {
        let info = self.info(index);
        if write && !info.writable {
            return Err(EngineError::ReadOnlyMemory(info.name.to_string()));
        }
        if !self.is_locked() || info.name == memory::SIGNATURES || info.name == memory::LOCKBITS {
            return Ok(());
        }
        if write && info.name == memory::USER_ROW && args.user_row_locked_device {
            return Ok(());
        }
        Err(EngineError::DeviceLocked(format!(
            "{} is not accessible; use --chip-erase-locked-device to unlock",
            info.name
        )))
    }

    /// Byte range covered by `len` bytes at `offset` (0 = to the end)
    fn span(&self, index: usize, offset: u32, len: usize) -> Result<Range<usize>, EngineError> {
        let info = self.info(index);
        let start = offset as usize;
        let len = if len == 0 {
            info.size.saturating_sub(start)
        } else {
            len
        };

        match start.checked_add(len) {
            Some(end) if start < info.size && end <= info.size => Ok(start..end),
            _ => Err(EngineError::AddressOutOfBounds {
                memory: info.name.to_string(),
                offset,
                len,
                size: info.size,
            }),
        }
    }

    fn ping(&self) -> Result<(), EngineError> {
        let sig = self.memory(memory::SIGNATURES).unwrap_or(&self.device.signature);
        println!("Ping response: {}", hex_string(sig));
        Ok(())
    }

    fn chip_erase(&mut self, args: &StructuredArguments) -> Result<(), EngineError> {
        if self.is_locked() && !args.chip_erase_locked_device {
            return Err(EngineError::DeviceLocked(
                "use --chip-erase-locked-device to erase it".to_string(),
            ));
        }

        log::info!("Chip erase of {}", self.device.name);
        for (info, data) in self.device.memories.iter().zip(self.memories.iter_mut()) {
            if info.chip_erased {
                data.fill(info.erased);
            }
        }
        Ok(())
    }

    fn erase_memory(&mut self, index: usize, args: &StructuredArguments) -> Result<(), EngineError> {
        let info = self.info(index);
        if !info.erasable {
            return Err(EngineError::InvalidArgument(format!(
                "memory '{}' cannot be erased on its own",
                info.name
            )));
        }
        self.guard(index, true, args)?;

        log::info!("Erasing {}", info.name);
        self.memories[index].fill(info.erased);
        Ok(())
    }

    fn erase(&mut self, args: &StructuredArguments) -> Result<(), EngineError> {
        if args.all_memories() {
            self.chip_erase(args)?;
        } else {
            let index = self.lookup(&args.memory)?;
            self.erase_memory(index, args)?;
        }
        println!("Erased.");
        Ok(())
    }

    fn read(&self, args: &StructuredArguments) -> Result<(), EngineError> {
        let targets: Vec<usize> = if args.all_memories() {
            (0..self.memories.len()).collect()
        } else {
            vec![self.lookup(&args.memory)?]
        };

        if let Some(path) = &args.filename {
            let [index] = targets[..] else {
                return Err(EngineError::InvalidArgument(
                    "select a single memory with --memory when reading to a file".to_string(),
                ));
            };
            self.guard(index, false, args)?;
            let range = self.span(index, args.offset, args.bytes as usize)?;
            let data = &self.memories[index][range];
            fs::write(path, data).map_err(|e| EngineError::io(path, e))?;
            println!("Wrote {} bytes to {}", data.len(), path.display());
            return Ok(());
        }

        for index in targets {
            self.guard(index, false, args)?;
            // Offset and length only apply to an explicitly selected memory
            let range = if args.all_memories() {
                0..self.memories[index].len()
            } else {
                self.span(index, args.offset, args.bytes as usize)?
            };
            let start = range.start;
            print_memory(self.info(index).name, start, &self.memories[index][range]);
        }
        Ok(())
    }

    /// Gather the data to write or verify from literals, direct pairs or a file
    fn collect_blocks(&self, args: &StructuredArguments) -> Result<Vec<Block>, EngineError> {
        let mut blocks = Vec::new();

        if let Some(path) = &args.filename {
            let data = fs::read(path).map_err(|e| EngineError::io(path, e))?;
            let memory = if args.all_memories() {
                self.lookup(memory::FLASH)?
            } else {
                self.lookup(&args.memory)?
            };
            blocks.push(Block {
                memory,
                offset: args.offset,
                data,
            });
        }

        if args.literal.is_empty() && args.direct.is_empty() {
            if blocks.is_empty() {
                return Err(EngineError::InvalidArgument(
                    "nothing to do: use --literal, --direct or --filename".to_string(),
                ));
            }
            return Ok(blocks);
        }

        if args.all_memories() {
            return Err(EngineError::InvalidArgument(
                "literal values need a memory selected with --memory".to_string(),
            ));
        }
        let memory = self.lookup(&args.memory)?;

        let mut contiguous = Vec::new();
        for literal in args.literal.iter().chain(args.direct.iter()) {
            match literal {
                LiteralValue::Scalar(value) => contiguous.push(byte_value(*value)?),
                LiteralValue::Pair { offset, value } => blocks.push(Block {
                    memory,
                    offset: u32::try_from(*offset).map_err(|_| {
                        EngineError::InvalidArgument(format!("invalid offset {}", offset))
                    })?,
                    data: vec![byte_value(*value)?],
                }),
            }
        }
        if !contiguous.is_empty() {
            blocks.push(Block {
                memory,
                offset: args.offset,
                data: contiguous,
            });
        }

        Ok(blocks)
    }

    fn program(&mut self, block: &Block) -> Result<(), EngineError> {
        let info = self.info(block.memory);
        let range = self.span(block.memory, block.offset, block.data.len())?;

        let pb = if block.data.len() > info.page_size {
            let pb = ProgressBar::new(block.data.len() as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} Writing")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb
        } else {
            ProgressBar::hidden()
        };

        let target = &mut self.memories[block.memory][range];
        for (dst, src) in target
            .chunks_mut(info.page_size)
            .zip(block.data.chunks(info.page_size))
        {
            dst.copy_from_slice(src);
            pb.inc(src.len() as u64);
        }
        pb.finish_and_clear();

        log::debug!(
            "Wrote {} bytes to {} at offset 0x{:X}",
            block.data.len(),
            info.name,
            block.offset
        );
        Ok(())
    }

    fn compare(&self, block: &Block) -> Result<(), EngineError> {
        let range = self.span(block.memory, block.offset, block.data.len())?;
        let actual = &self.memories[block.memory][range];

        match actual.iter().zip(&block.data).position(|(a, e)| a != e) {
            None => Ok(()),
            Some(pos) => Err(EngineError::VerifyFailed {
                memory: self.info(block.memory).name.to_string(),
                offset: block.offset + pos as u32,
                expected: block.data[pos],
                found: actual[pos],
            }),
        }
    }

    fn write(&mut self, args: &StructuredArguments) -> Result<(), EngineError> {
        let blocks = self.collect_blocks(args)?;
        for block in &blocks {
            self.guard(block.memory, true, args)?;
            self.span(block.memory, block.offset, block.data.len())?;
        }

        if args.erase {
            let mut erased = HashSet::new();
            for block in &blocks {
                let info = self.info(block.memory);
                if !info.erasable {
                    log::debug!("{} is not erasable, writing without erase", info.name);
                } else if erased.insert(block.memory) {
                    self.erase_memory(block.memory, args)?;
                }
            }
        }

        for block in &blocks {
            self.program(block)?;
        }
        println!("Write complete.");

        if args.verify {
            for block in &blocks {
                self.compare(block)?;
            }
            println!("Verify successful.");
        }
        Ok(())
    }

    fn verify(&self, args: &StructuredArguments) -> Result<(), EngineError> {
        let blocks = self.collect_blocks(args)?;
        for block in &blocks {
            self.guard(block.memory, false, args)?;
            self.compare(block)?;
        }
        println!("Verify successful.");
        Ok(())
    }

    fn set_supply_voltage(&mut self, args: &StructuredArguments) -> Result<(), EngineError> {
        let volts = args
            .literal
            .first()
            .map(|l| l.value().as_f64())
            .ok_or_else(|| {
                EngineError::InvalidArgument(
                    "setsupplyvoltage needs a voltage given with --literal".to_string(),
                )
            })?;

        if !(0.0..=MAX_SUPPLY_VOLTAGE).contains(&volts) {
            return Err(EngineError::InvalidArgument(format!(
                "supply voltage {:.2}V out of range (0.00V - {:.2}V)",
                volts, MAX_SUPPLY_VOLTAGE
            )));
        }

        self.supply_voltage = volts;
        println!("Supply voltage set to {:.2}V", volts);
        Ok(())
    }
}

impl Engine for SimTool {
    fn run(&mut self, args: &StructuredArguments) -> Result<(), EngineError> {
        if let Some(interface) = &args.interface {
            if !interface.eq_ignore_ascii_case(INTERFACE) {
                return Err(EngineError::InterfaceNotSupported(interface.clone()));
            }
        }
        if let Some(device) = &args.device {
            if !device.eq_ignore_ascii_case(self.device.name) {
                return Err(EngineError::DeviceNotSupported(device.clone()));
            }
        }
        if let Some(mode) = args.high_voltage {
            log::info!("Using high-voltage activation: {}", mode);
        }
        if let Some(clk) = &args.clk {
            log::debug!("Clock setting '{}' has no effect on a simulated tool", clk);
        }

        log::debug!("{} on simulated {}", args.action, self.device.name);

        match args.action {
            Action::Ping => self.ping(),
            Action::Erase => self.erase(args),
            Action::Read => self.read(args),
            Action::Write => self.write(args),
            Action::Verify => self.verify(args),
            Action::GetVoltage => {
                println!("Measured voltage: {:.2}V", self.supply_voltage);
                Ok(())
            }
            Action::GetSupplyVoltage => {
                println!("Supply voltage set to {:.2}V", self.supply_voltage);
                Ok(())
            }
            Action::GetUsbVoltage => {
                println!("Measured USB voltage: {:.2}V", USB_VOLTAGE);
                Ok(())
            }
            Action::SetSupplyVoltage => self.set_supply_voltage(args),
            Action::RebootDebugger => {
                log::info!("Rebooting simulated tool");
                self.supply_voltage = DEFAULT_SUPPLY_VOLTAGE;
                println!("Debugger reboot requested");
                Ok(())
            }
            Action::Reset => {
                log::info!("Resetting {}", self.device.name);
                println!("Device reset");
                Ok(())
            }
        }
    }
}

fn byte_value(value: Number) -> Result<u8, EngineError> {
    value
        .as_int()
        .and_then(|v| u8::try_from(v).ok())
        .ok_or_else(|| {
            EngineError::InvalidArgument(format!("value {} does not fit in a byte", value))
        })
}

fn hex_string(data: &[u8]) -> String {
    data.iter().map(|b| format!("{:02X}", b)).collect()
}

fn print_memory(name: &str, base: usize, data: &[u8]) {
    println!("Memory type: {}", name);
    println!("{}", "-".repeat(56));
    for (i, chunk) in data.chunks(16).enumerate() {
        let bytes: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
        println!("0x{:06X}: {}", base + i * 16, bytes.join(" "));
    }
    println!();
}
