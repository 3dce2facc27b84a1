//! Fixed code enumerations used in EGMS archive names.
//!
//! Each enumeration knows the exact token the archive API expects in its
//! filenames (`code()`), and parses user input case-insensitively.

use std::fmt;
use std::str::FromStr;

use super::AddressError;

/// Displacement component of an L3 grid tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    /// East-west displacement.
    East,
    /// Vertical (up-down) displacement.
    Up,
}

impl Channel {
    /// Both channels in archive order.
    pub const ALL: [Channel; 2] = [Channel::East, Channel::Up];

    /// Token used in archive names.
    pub fn code(&self) -> &'static str {
        match self {
            Channel::East => "E",
            Channel::Up => "U",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Channel {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "E" | "EAST" => Ok(Channel::East),
            "U" | "UP" | "VERTICAL" => Ok(Channel::Up),
            _ => Err(AddressError::unknown_code("channel", s)),
        }
    }
}

/// Multi-year processing run to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum YearRange {
    Y2018To2022,
    #[default]
    Y2019To2023,
    Y2020To2024,
}

impl YearRange {
    /// All published processing runs, oldest first.
    pub const ALL: [YearRange; 3] = [
        YearRange::Y2018To2022,
        YearRange::Y2019To2023,
        YearRange::Y2020To2024,
    ];

    /// Token used in archive names, e.g. `2019_2023`.
    pub fn code(&self) -> &'static str {
        match self {
            YearRange::Y2018To2022 => "2018_2022",
            YearRange::Y2019To2023 => "2019_2023",
            YearRange::Y2020To2024 => "2020_2024",
        }
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for YearRange {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept both `2019_2023` and `2019-2023`
        let normalized = s.trim().replace('-', "_");
        YearRange::ALL
            .into_iter()
            .find(|year| year.code() == normalized)
            .ok_or_else(|| AddressError::unknown_code("year range", s))
    }
}

/// Sentinel-1 interferometric wide swath.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Swath {
    Iw1,
    Iw2,
    Iw3,
}

impl Swath {
    pub const ALL: [Swath; 3] = [Swath::Iw1, Swath::Iw2, Swath::Iw3];

    pub fn code(&self) -> &'static str {
        match self {
            Swath::Iw1 => "IW1",
            Swath::Iw2 => "IW2",
            Swath::Iw3 => "IW3",
        }
    }
}

impl fmt::Display for Swath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Swath {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Swath::ALL
            .into_iter()
            .find(|swath| swath.code() == upper)
            .ok_or_else(|| AddressError::unknown_code("swath", s))
    }
}

/// Radar polarization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Polarization {
    Vv,
    Vh,
    Hh,
    Hv,
}

impl Polarization {
    pub const ALL: [Polarization; 4] = [
        Polarization::Vv,
        Polarization::Vh,
        Polarization::Hh,
        Polarization::Hv,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Polarization::Vv => "VV",
            Polarization::Vh => "VH",
            Polarization::Hh => "HH",
            Polarization::Hv => "HV",
        }
    }
}

impl fmt::Display for Polarization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Polarization {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Polarization::ALL
            .into_iter()
            .find(|pol| pol.code() == upper)
            .ok_or_else(|| AddressError::unknown_code("polarization", s))
    }
}

/// Processing sub-level of an orbit-addressed (L2) product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProcessingLevel {
    /// Basic processing in SAR geometry.
    #[default]
    L2A,
    /// Calibrated processing in SAR geometry.
    L2B,
}

impl ProcessingLevel {
    /// User-facing level name (`L2A` / `L2B`).
    pub fn code(&self) -> &'static str {
        match self {
            ProcessingLevel::L2A => "L2A",
            ProcessingLevel::L2B => "L2B",
        }
    }

    /// Token used by the archive API (`L2a` / `L2b`).
    pub fn archive_code(&self) -> &'static str {
        match self {
            ProcessingLevel::L2A => "L2a",
            ProcessingLevel::L2B => "L2b",
        }
    }
}

impl fmt::Display for ProcessingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ProcessingLevel {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L2A" => Ok(ProcessingLevel::L2A),
            "L2B" => Ok(ProcessingLevel::L2B),
            _ => Err(AddressError::unknown_code("processing level", s)),
        }
    }
}
