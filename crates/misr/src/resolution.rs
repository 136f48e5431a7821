//! The imager's two native resolutions and their block geometry.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::MisrError;

/// Along-track blocks per orbit.
pub const BLOCK_COUNT: usize = 180;

/// Fine samples per coarse sample along each axis.
pub const RESOLUTION_RATIO: usize = 4;

/// Grid resolution of a block-stacked array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MisrResolution {
    /// 1.1 km: 128 × 512 samples per block.
    #[serde(rename = "L")]
    Low,
    /// 275 m: 512 × 2048 samples per block.
    #[serde(rename = "H")]
    High,
}

impl MisrResolution {
    /// Parse a single-byte resolution flag (`L` or `H`, either case).
    pub fn from_flag(flag: u8) -> Result<Self, MisrError> {
        match flag {
            b'L' | b'l' => Ok(Self::Low),
            b'H' | b'h' => Ok(Self::High),
            other => Err(MisrError::InvalidResolutionFlag(
                char::from(other).to_string(),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "L",
            Self::High => "H",
        }
    }

    /// Along-track rows in one block.
    pub fn rows_per_block(&self) -> usize {
        match self {
            Self::Low => 128,
            Self::High => 512,
        }
    }

    /// Cross-track columns in one block.
    pub fn block_width(&self) -> usize {
        match self {
            Self::Low => 512,
            Self::High => 2048,
        }
    }

    /// Elements in one block.
    pub fn block_len(&self) -> usize {
        self.rows_per_block() * self.block_width()
    }

    /// Elements in a full 180-block stack.
    pub fn stack_len(&self) -> usize {
        BLOCK_COUNT * self.block_len()
    }

    /// Multiplier applied to the low-resolution offset table.
    pub fn offset_scale(&self) -> usize {
        match self {
            Self::Low => 1,
            Self::High => RESOLUTION_RATIO,
        }
    }
}

impl FromStr for MisrResolution {
    type Err = MisrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "l" | "low" | "1.1km" => Ok(Self::Low),
            "h" | "high" | "275m" => Ok(Self::High),
            _ => Err(MisrError::InvalidResolutionFlag(s.to_string())),
        }
    }
}

impl std::fmt::Display for MisrResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flag() {
        assert_eq!(MisrResolution::from_flag(b'L').unwrap(), MisrResolution::Low);
        assert_eq!(MisrResolution::from_flag(b'h').unwrap(), MisrResolution::High);
        assert!(matches!(
            MisrResolution::from_flag(b'M'),
            Err(MisrError::InvalidResolutionFlag(_))
        ));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("low".parse::<MisrResolution>().unwrap(), MisrResolution::Low);
        assert_eq!("H".parse::<MisrResolution>().unwrap(), MisrResolution::High);
        assert!("medium".parse::<MisrResolution>().is_err());
    }

    #[test]
    fn test_block_geometry() {
        assert_eq!(MisrResolution::Low.block_len(), 128 * 512);
        assert_eq!(MisrResolution::High.stack_len(), 180 * 512 * 2048);
        assert_eq!(
            MisrResolution::High.rows_per_block(),
            MisrResolution::Low.rows_per_block() * RESOLUTION_RATIO
        );
    }
}
