//! Memory region names
//!
//! Tools describe their memories with these names. The `all` alias selects
//! every memory the target has.

/// Alias selecting every memory region
pub const ALL: &str = "all";

/// Program memory
pub const FLASH: &str = "flash";
/// Data EEPROM
pub const EEPROM: &str = "eeprom";
/// Fuse bytes
pub const FUSES: &str = "fuses";
/// Lock bits
pub const LOCKBITS: &str = "lockbits";
/// Device signature
pub const SIGNATURES: &str = "signatures";
/// User row (user signature)
pub const USER_ROW: &str = "user_row";
/// Factory calibration row
pub const CALIBRATION_ROW: &str = "calibration_row";
/// Internal SRAM
pub const INTERNAL_SRAM: &str = "internal_sram";
/// PIC configuration words
pub const CONFIG_WORDS: &str = "config_words";
/// PIC debug executive area
pub const ICD: &str = "icd";

/// Every known memory name
pub const NAMES: &[&str] = &[
    FLASH,
    EEPROM,
    FUSES,
    LOCKBITS,
    SIGNATURES,
    USER_ROW,
    CALIBRATION_ROW,
    INTERNAL_SRAM,
    CONFIG_WORDS,
    ICD,
];

/// Whether `name` selects every memory
pub fn is_all(name: &str) -> bool {
    name.eq_ignore_ascii_case(ALL)
}

/// Whether `name` is a known memory name or alias
pub fn is_known(name: &str) -> bool {
    is_all(name) || NAMES.iter().any(|n| n.eq_ignore_ascii_case(name))
}

/// Help text for the memory selection argument
pub fn memory_help() -> String {
    let names: Vec<String> = NAMES.iter().map(|n| format!("'{}'", n)).collect();
    format!("memory area to access: {}, {}", ALL, names.join(", "))
}
