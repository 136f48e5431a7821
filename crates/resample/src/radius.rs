//! Default search radius per instrument and resolution.
//!
//! The radius should be roughly the footprint diagonal of the coarser of the
//! two grids: large enough that every target cell inside the swath finds a
//! source cell, small enough that cells off the swath edge stay unmatched.

use serde::{Deserialize, Serialize};

use fusion_common::UserGrid;

use crate::error::{ResampleError, Result};

/// Instruments whose grids can take part in a fusion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instrument {
    /// Wide-swath multi-band scanner.
    Modis,
    /// Multi-angle imager.
    Misr,
    /// High-resolution pushbroom imager.
    Aster,
    /// A regular geographic grid described by the user.
    UserDefined,
}

impl Instrument {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "modis" => Some(Self::Modis),
            "misr" => Some(Self::Misr),
            "aster" => Some(Self::Aster),
            "user" | "user_defined" | "userdefined" => Some(Self::UserDefined),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Modis => "modis",
            Self::Misr => "misr",
            Self::Aster => "aster",
            Self::UserDefined => "user_defined",
        }
    }

    /// Resolution labels this instrument accepts.
    pub fn resolutions(&self) -> &'static [&'static str] {
        match self {
            Self::Modis => &["1KM", "500M", "250M"],
            Self::Misr => &["L", "H"],
            Self::Aster => &["TIR", "SWIR", "VNIR"],
            Self::UserDefined => &[],
        }
    }

    /// Default search radius in meters for a resolution label.
    ///
    /// User-defined grids have no label; use [`user_grid_radius`] instead.
    pub fn default_radius(&self, resolution: &str) -> Result<f64> {
        let label = resolution.trim().to_uppercase();
        let radius = match (self, label.as_str()) {
            (Self::Modis, "1KM") => 5040.0,
            (Self::Modis, "500M") => 2520.0,
            (Self::Modis, "250M") => 1260.0,
            (Self::Misr, "L") => 1155.0,
            (Self::Misr, "H") => 302.0,
            (Self::Aster, "TIR") => 95.0,
            (Self::Aster, "SWIR") => 32.0,
            (Self::Aster, "VNIR") => 17.0,
            _ => {
                return Err(ResampleError::config(format!(
                    "no default radius for {} resolution '{}'",
                    self, resolution
                )))
            }
        };
        Ok(radius)
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Search radius for a cell of `cell_size_m` meters: the cell diagonal.
pub fn radius_for_cell_size(cell_size_m: f64) -> Result<f64> {
    if !cell_size_m.is_finite() || cell_size_m <= 0.0 {
        return Err(ResampleError::InvalidRadius(cell_size_m));
    }
    Ok(cell_size_m * std::f64::consts::SQRT_2)
}

/// Search radius for a user-defined geographic grid.
pub fn user_grid_radius(grid: &UserGrid) -> Result<f64> {
    radius_for_cell_size(grid.cell_size_meters())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fusion_common::{BoundingBox, METERS_PER_DEGREE};

    #[test]
    fn test_instrument_defaults() {
        assert_eq!(Instrument::Modis.default_radius("1km").unwrap(), 5040.0);
        assert_eq!(Instrument::Modis.default_radius("250M").unwrap(), 1260.0);
        assert_eq!(Instrument::Misr.default_radius("L").unwrap(), 1155.0);
        assert_eq!(Instrument::Misr.default_radius("h").unwrap(), 302.0);
        assert_eq!(Instrument::Aster.default_radius("VNIR").unwrap(), 17.0);
    }

    #[test]
    fn test_unknown_resolution() {
        assert!(Instrument::Misr.default_radius("1KM").is_err());
        assert!(Instrument::UserDefined.default_radius("L").is_err());
    }

    #[test]
    fn test_every_listed_resolution_has_a_radius() {
        for instrument in [Instrument::Modis, Instrument::Misr, Instrument::Aster] {
            for label in instrument.resolutions() {
                assert!(instrument.default_radius(label).is_ok(), "{instrument} {label}");
            }
        }
    }

    #[test]
    fn test_cell_size_radius() {
        let r = radius_for_cell_size(1000.0).unwrap();
        assert!((r - 1414.213562373095).abs() < 1e-6);
        assert!(radius_for_cell_size(0.0).is_err());

        let grid = UserGrid::new(BoundingBox::new(0.0, 0.0, 1.0, 1.0), 0.01).unwrap();
        let r = user_grid_radius(&grid).unwrap();
        assert!((r - 0.01 * METERS_PER_DEGREE * std::f64::consts::SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn test_instrument_from_str() {
        assert_eq!(Instrument::from_str("MODIS"), Some(Instrument::Modis));
        assert_eq!(Instrument::from_str("user-defined"), Some(Instrument::UserDefined));
        assert_eq!(Instrument::from_str("viirs"), None);
    }
}
