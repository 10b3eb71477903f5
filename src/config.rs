// Config module for shared configuration utilities

use crate::constants;
use clap::ValueEnum;
use std::fmt;
use std::path::PathBuf;

/// Catalog document schema versions the parser understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SchemaVersion {
    #[value(name = "4")]
    V4,
    #[value(name = "5")]
    V5,
    #[value(name = "6")]
    V6,
}

impl SchemaVersion {
    pub fn number(self) -> u8 {
        match self {
            SchemaVersion::V4 => 4,
            SchemaVersion::V5 => 5,
            SchemaVersion::V6 => 6,
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.number())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Architecture {
    #[value(name = "x86_64")]
    X86_64,
    #[value(name = "arm64")]
    Arm64,
}

impl Architecture {
    pub fn host() -> Self {
        match std::env::consts::ARCH {
            "aarch64" | "arm" => Architecture::Arm64,
            _ => Architecture::X86_64,
        }
    }

    /// Platform tags accepted for this architecture, in preference order.
    pub fn allowed_platforms(self) -> Vec<String> {
        let tags: &[&str] = match self {
            Architecture::Arm64 => &[constants::PLATFORM_UNIVERSAL, constants::PLATFORM_ARM64],
            Architecture::X86_64 => &[
                constants::PLATFORM_UNIVERSAL,
                constants::PLATFORM_X64,
                constants::PLATFORM_X86,
            ],
        };
        tags.iter().map(|t| t.to_string()).collect()
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Architecture::X86_64 => write!(f, "x86_64"),
            Architecture::Arm64 => write!(f, "arm64"),
        }
    }
}

/// Default destination root for download sessions.
pub fn output_dir() -> PathBuf {
    PathBuf::from(std::env::var("CCDL_DIR").unwrap_or_else(|_| ".".to_string()))
}

pub fn chunk_size() -> usize {
    std::env::var("CCDL_CHUNK_SIZE")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(constants::DEFAULT_CHUNK_SIZE)
}
