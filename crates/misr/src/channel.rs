//! Which radiance channels exist at which resolution.
//!
//! The nadir camera and the red band of every camera are recorded at 275 m;
//! everything else at 1.1 km. A coarse request for a fine channel is served by
//! 4×4 averaging. A fine request for a coarse channel cannot be served.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::downsample::downsample_4x4;
use crate::error::{MisrError, Result};
use crate::resolution::{MisrResolution, BLOCK_COUNT};

/// The nine view angles, fore to aft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Camera {
    Df,
    Cf,
    Bf,
    Af,
    An,
    Aa,
    Ba,
    Ca,
    Da,
}

impl Camera {
    pub const ALL: [Camera; 9] = [
        Camera::Df,
        Camera::Cf,
        Camera::Bf,
        Camera::Af,
        Camera::An,
        Camera::Aa,
        Camera::Ba,
        Camera::Ca,
        Camera::Da,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Df => "DF",
            Self::Cf => "CF",
            Self::Bf => "BF",
            Self::Af => "AF",
            Self::An => "AN",
            Self::Aa => "AA",
            Self::Ba => "BA",
            Self::Ca => "CA",
            Self::Da => "DA",
        }
    }
}

impl FromStr for Camera {
    type Err = MisrError;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_uppercase();
        Camera::ALL
            .into_iter()
            .find(|c| c.as_str() == upper)
            .ok_or_else(|| MisrError::UnknownCamera(s.to_string()))
    }
}

impl std::fmt::Display for Camera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Spectral bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    Blue,
    Green,
    Red,
    #[serde(rename = "NIR")]
    Nir,
}

impl Band {
    pub const ALL: [Band; 4] = [Band::Blue, Band::Green, Band::Red, Band::Nir];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blue => "Blue",
            Self::Green => "Green",
            Self::Red => "Red",
            Self::Nir => "NIR",
        }
    }

    /// Name of the radiance field for this band.
    pub fn radiance_field(&self) -> String {
        format!("{}_Radiance", self.as_str())
    }
}

impl FromStr for Band {
    type Err = MisrError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        let name = lower.strip_suffix("_radiance").unwrap_or(&lower);
        match name {
            "blue" => Ok(Self::Blue),
            "green" => Ok(Self::Green),
            "red" => Ok(Self::Red),
            "nir" => Ok(Self::Nir),
            _ => Err(MisrError::UnknownBand(s.to_string())),
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolution a channel is recorded at.
pub fn native_resolution(camera: Camera, band: Band) -> MisrResolution {
    if camera == Camera::An || band == Band::Red {
        MisrResolution::High
    } else {
        MisrResolution::Low
    }
}

/// What has to happen to a channel's native array before unstacking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelAction {
    /// Native resolution already matches.
    Direct,
    /// Average 4×4 windows of the fine array.
    Downsample,
}

/// How one camera/band pair is brought to the requested resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelPlan {
    pub camera: Camera,
    pub band: Band,
    pub native: MisrResolution,
    pub requested: MisrResolution,
    pub action: ChannelAction,
}

impl ChannelPlan {
    pub fn new(camera: Camera, band: Band, requested: MisrResolution) -> Result<Self> {
        let native = native_resolution(camera, band);
        let action = match (native, requested) {
            (n, r) if n == r => ChannelAction::Direct,
            (MisrResolution::High, MisrResolution::Low) => ChannelAction::Downsample,
            _ => {
                return Err(MisrError::UnsupportedResolution {
                    camera: camera.to_string(),
                    band: band.to_string(),
                    requested,
                })
            }
        };
        Ok(Self {
            camera,
            band,
            native,
            requested,
            action,
        })
    }

    /// Bring a native block stack to the requested resolution.
    pub fn prepare(&self, native: Vec<f64>) -> Result<Vec<f64>> {
        let expected = self.native.stack_len();
        if native.len() != expected {
            return Err(MisrError::shape_mismatch(
                "native radiance stack",
                expected,
                native.len(),
            ));
        }

        match self.action {
            ChannelAction::Direct => Ok(native),
            ChannelAction::Downsample => {
                tracing::debug!(
                    camera = %self.camera,
                    band = %self.band,
                    "Downsampling native high-resolution channel"
                );
                downsample_4x4(
                    &native,
                    BLOCK_COUNT,
                    self.native.rows_per_block(),
                    self.native.block_width(),
                )
            }
        }
    }
}
