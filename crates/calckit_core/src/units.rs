//! Length and volume units for the geometry formulas.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Unit the geometry inputs are given in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    Centimeter,
    #[default]
    Meter,
    Foot,
}

impl LengthUnit {
    pub const CHOICES: &'static str = "cm, m, ft";

    /// Metres per unit
    pub fn to_meters(self) -> f64 {
        match self {
            LengthUnit::Centimeter => 0.01,
            LengthUnit::Meter => 1.0,
            LengthUnit::Foot => 0.3048,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            LengthUnit::Centimeter => "cm",
            LengthUnit::Meter => "m",
            LengthUnit::Foot => "ft",
        }
    }
}

impl FromStr for LengthUnit {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cm" | "centimeter" | "centimeters" => Ok(LengthUnit::Centimeter),
            "m" | "meter" | "meters" | "metre" | "metres" => Ok(LengthUnit::Meter),
            "ft" | "foot" | "feet" => Ok(LengthUnit::Foot),
            other => Err(ParseError::UnknownChoice {
                field: "unit".into(),
                value: other.to_string(),
                expected: Self::CHOICES,
            }),
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Target unit for a converted volume output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeUnit {
    Liter,
    /// US liquid gallon
    Gallon,
}

impl VolumeUnit {
    pub const CHOICES: &'static str = "liter, gallon";

    /// Cubic metres per unit
    pub fn to_cubic_meters(self) -> f64 {
        match self {
            VolumeUnit::Liter => 0.001,
            VolumeUnit::Gallon => 0.003_785_411_784,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            VolumeUnit::Liter => "volume_liters",
            VolumeUnit::Gallon => "volume_gallons",
        }
    }
}

impl FromStr for VolumeUnit {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "liter" | "liters" | "litre" | "litres" => Ok(VolumeUnit::Liter),
            "gal" | "gallon" | "gallons" => Ok(VolumeUnit::Gallon),
            other => Err(ParseError::UnknownChoice {
                field: "volume_unit".into(),
                value: other.to_string(),
                expected: Self::CHOICES,
            }),
        }
    }
}

/// Convert a volume measured in `from`³ into `to`
pub fn convert_volume(volume: f64, from: LengthUnit, to: VolumeUnit) -> f64 {
    volume * from.to_meters().powi(3) / to.to_cubic_meters()
}
