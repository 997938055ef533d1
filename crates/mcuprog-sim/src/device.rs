//! Devices known to the simulator

use mcuprog_core::memory;

/// Static description of one memory region
#[derive(Debug, Clone, Copy)]
pub struct MemoryInfo {
    /// Memory name
    pub name: &'static str,
    /// Size in bytes
    pub size: usize,
    /// Programming page size in bytes
    pub page_size: usize,
    /// Value of an erased byte
    pub erased: u8,
    /// Whether the memory can be written
    pub writable: bool,
    /// Whether the memory can be erased on its own
    pub erasable: bool,
    /// Whether a chip erase clears this memory
    pub chip_erased: bool,
}

/// Static description of a simulated device
#[derive(Debug)]
pub struct DeviceInfo {
    /// Device name
    pub name: &'static str,
    /// Signature bytes returned by ping
    pub signature: [u8; 3],
    /// Memory regions
    pub memories: &'static [MemoryInfo],
}

impl DeviceInfo {
    /// Look up a memory by name (case-insensitive)
    pub fn memory(&self, name: &str) -> Option<&'static MemoryInfo> {
        self.memories
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }
}

/// Lock bits value of an unlocked device
pub const LOCKBITS_UNLOCKED: u8 = 0xC5;

const fn region(name: &'static str, size: usize, page_size: usize) -> MemoryInfo {
    MemoryInfo {
        name,
        size,
        page_size,
        erased: 0xFF,
        writable: true,
        erasable: true,
        chip_erased: true,
    }
}

const fn fuses(size: usize) -> MemoryInfo {
    MemoryInfo {
        name: memory::FUSES,
        size,
        page_size: 1,
        erased: 0x00,
        writable: true,
        erasable: false,
        chip_erased: false,
    }
}

const LOCKBITS: MemoryInfo = MemoryInfo {
    name: memory::LOCKBITS,
    size: 1,
    page_size: 1,
    erased: LOCKBITS_UNLOCKED,
    writable: true,
    erasable: false,
    chip_erased: true,
};

const SIGNATURES: MemoryInfo = MemoryInfo {
    name: memory::SIGNATURES,
    size: 3,
    page_size: 1,
    erased: 0xFF,
    writable: false,
    erasable: false,
    chip_erased: false,
};

const fn user_row(size: usize) -> MemoryInfo {
    MemoryInfo {
        chip_erased: false,
        ..region(memory::USER_ROW, size, size)
    }
}

const ATMEGA4809_MEMORIES: &[MemoryInfo] = &[
    region(memory::FLASH, 48 * 1024, 128),
    region(memory::EEPROM, 256, 64),
    fuses(11),
    LOCKBITS,
    SIGNATURES,
    user_row(64),
];

const ATTINY817_MEMORIES: &[MemoryInfo] = &[
    region(memory::FLASH, 8 * 1024, 64),
    region(memory::EEPROM, 128, 32),
    fuses(11),
    LOCKBITS,
    SIGNATURES,
    user_row(32),
];

const AVR128DA48_MEMORIES: &[MemoryInfo] = &[
    region(memory::FLASH, 128 * 1024, 512),
    region(memory::EEPROM, 512, 1),
    fuses(16),
    LOCKBITS,
    SIGNATURES,
    user_row(32),
];

/// Devices the simulator can emulate
pub const DEVICES: &[DeviceInfo] = &[
    DeviceInfo {
        name: "atmega4809",
        signature: [0x1E, 0x96, 0x51],
        memories: ATMEGA4809_MEMORIES,
    },
    DeviceInfo {
        name: "attiny817",
        signature: [0x1E, 0x93, 0x20],
        memories: ATTINY817_MEMORIES,
    },
    DeviceInfo {
        name: "avr128da48",
        signature: [0x1E, 0x97, 0x0A],
        memories: AVR128DA48_MEMORIES,
    },
];

/// Device emulated when none is requested
pub const DEFAULT_DEVICE: &str = "atmega4809";

/// Find a device by name (case-insensitive)
pub fn find_device(name: &str) -> Option<&'static DeviceInfo> {
    DEVICES.iter().find(|d| d.name.eq_ignore_ascii_case(name))
}
