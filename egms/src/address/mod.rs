//! Tile addressing for the EGMS archive API.
//!
//! The archive serves two kinds of per-tile products:
//!
//! - **L3** tiles on a 100 km grid, addressed by an east/north index pair and
//!   a displacement [`Channel`].
//! - **L2a/L2b** bursts in SAR geometry, addressed by relative orbit, burst
//!   cycle, [`Swath`] and [`Polarization`].
//!
//! [`TileAddress`] is a closed sum over both. Every field is validated when
//! the tile is constructed, so request building downstream never has to
//! check for missing or out-of-range parameters.
//!
//! # Example
//!
//! ```
//! use egms::address::{Channel, GridTile, OrbitTileBuilder, Swath, Polarization, YearRange};
//!
//! let grid = GridTile::new(32, 31, Channel::East, YearRange::Y2019To2023).unwrap();
//! assert_eq!(grid.tile_code(), "E32N31");
//!
//! let orbit = OrbitTileBuilder::new()
//!     .relative_orbit(52)
//!     .burst_cycle(716)
//!     .swath(Swath::Iw2)
//!     .polarization(Polarization::Vv)
//!     .build()
//!     .unwrap();
//! assert_eq!(orbit.relative_orbit(), 52);
//! ```

mod codes;

use std::ops::RangeInclusive;

use thiserror::Error;

pub use codes::{Channel, Polarization, ProcessingLevel, Swath, YearRange};

/// East indices covered by the L3 grid.
pub const EAST_RANGE: RangeInclusive<u16> = 9..=65;

/// North indices covered by the L3 grid.
pub const NORTH_RANGE: RangeInclusive<u16> = 9..=55;

/// Valid Sentinel-1 relative orbit numbers.
pub const ORBIT_RANGE: RangeInclusive<u16> = 1..=999;

/// Valid burst cycle identifiers.
pub const BURST_CYCLE_RANGE: RangeInclusive<u16> = 1..=9999;

/// Errors raised while constructing a tile address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// A required orbit-mode parameter was not supplied.
    #[error("missing parameter '{0}' for orbit tile")]
    MissingParameter(&'static str),

    /// A numeric parameter is outside the range served by the archive.
    #[error("{field} {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: u16,
        min: u16,
        max: u16,
    },

    /// A code string did not match any known enumeration value.
    #[error("unknown {kind} '{value}'")]
    UnknownCode { kind: &'static str, value: String },
}

impl AddressError {
    pub(crate) fn unknown_code(kind: &'static str, value: &str) -> Self {
        AddressError::UnknownCode {
            kind,
            value: value.to_string(),
        }
    }
}

/// Checks that `value` lies within `range`.
pub(crate) fn check_range(
    field: &'static str,
    value: u16,
    range: &RangeInclusive<u16>,
) -> Result<u16, AddressError> {
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(AddressError::OutOfRange {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

/// An L3 tile on the 100 km grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridTile {
    east: u16,
    north: u16,
    channel: Channel,
    year: YearRange,
}

impl GridTile {
    /// Creates a grid tile, rejecting indices outside the grid extent.
    pub fn new(
        east: u16,
        north: u16,
        channel: Channel,
        year: YearRange,
    ) -> Result<Self, AddressError> {
        check_range("east", east, &EAST_RANGE)?;
        check_range("north", north, &NORTH_RANGE)?;
        Ok(Self::new_unchecked(east, north, channel, year))
    }

    /// Creates a grid tile whose indices were validated by the caller.
    pub(crate) fn new_unchecked(east: u16, north: u16, channel: Channel, year: YearRange) -> Self {
        Self {
            east,
            north,
            channel,
            year,
        }
    }

    pub fn east(&self) -> u16 {
        self.east
    }

    pub fn north(&self) -> u16 {
        self.north
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn year(&self) -> YearRange {
        self.year
    }

    /// Grid cell code, e.g. `E32N31`.
    pub fn tile_code(&self) -> String {
        format!("E{}N{}", self.east, self.north)
    }
}

/// An L2a/L2b burst addressed in SAR geometry.
///
/// Construct with [`OrbitTileBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrbitTile {
    relative_orbit: u16,
    burst_cycle: u16,
    swath: Swath,
    polarization: Polarization,
    level: ProcessingLevel,
    year: YearRange,
}

impl OrbitTile {
    /// Creates an orbit tile whose numbers were validated by the caller.
    pub(crate) fn new_unchecked(
        relative_orbit: u16,
        burst_cycle: u16,
        swath: Swath,
        polarization: Polarization,
        level: ProcessingLevel,
        year: YearRange,
    ) -> Self {
        Self {
            relative_orbit,
            burst_cycle,
            swath,
            polarization,
            level,
            year,
        }
    }

    pub fn relative_orbit(&self) -> u16 {
        self.relative_orbit
    }

    pub fn burst_cycle(&self) -> u16 {
        self.burst_cycle
    }

    pub fn swath(&self) -> Swath {
        self.swath
    }

    pub fn polarization(&self) -> Polarization {
        self.polarization
    }

    pub fn level(&self) -> ProcessingLevel {
        self.level
    }

    pub fn year(&self) -> YearRange {
        self.year
    }
}

/// Builder for [`OrbitTile`].
///
/// Relative orbit, burst cycle, swath and polarization are required;
/// [`build`](Self::build) fails with [`AddressError::MissingParameter`] when
/// any of them is absent. Level and year range fall back to their defaults.
#[derive(Debug, Clone, Default)]
pub struct OrbitTileBuilder {
    relative_orbit: Option<u16>,
    burst_cycle: Option<u16>,
    swath: Option<Swath>,
    polarization: Option<Polarization>,
    level: ProcessingLevel,
    year: YearRange,
}

impl OrbitTileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn relative_orbit(mut self, orbit: u16) -> Self {
        self.relative_orbit = Some(orbit);
        self
    }

    pub fn burst_cycle(mut self, burst_cycle: u16) -> Self {
        self.burst_cycle = Some(burst_cycle);
        self
    }

    pub fn swath(mut self, swath: Swath) -> Self {
        self.swath = Some(swath);
        self
    }

    pub fn polarization(mut self, polarization: Polarization) -> Self {
        self.polarization = Some(polarization);
        self
    }

    pub fn level(mut self, level: ProcessingLevel) -> Self {
        self.level = level;
        self
    }

    pub fn year(mut self, year: YearRange) -> Self {
        self.year = year;
        self
    }

    /// Validates the collected parameters and produces the tile.
    pub fn build(self) -> Result<OrbitTile, AddressError> {
        let relative_orbit = self
            .relative_orbit
            .ok_or(AddressError::MissingParameter("relative_orbit"))?;
        let burst_cycle = self
            .burst_cycle
            .ok_or(AddressError::MissingParameter("burst_cycle"))?;
        let swath = self.swath.ok_or(AddressError::MissingParameter("swath"))?;
        let polarization = self
            .polarization
            .ok_or(AddressError::MissingParameter("polarization"))?;

        Ok(OrbitTile::new_unchecked(
            check_range("relative_orbit", relative_orbit, &ORBIT_RANGE)?,
            check_range("burst_cycle", burst_cycle, &BURST_CYCLE_RANGE)?,
            swath,
            polarization,
            self.level,
            self.year,
        ))
    }
}

/// Address of one retrievable tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileAddress {
    /// L3 grid tile.
    Grid(GridTile),
    /// L2a/L2b burst.
    Orbit(OrbitTile),
}

impl TileAddress {
    /// Processing run this tile belongs to.
    pub fn year(&self) -> YearRange {
        match self {
            TileAddress::Grid(tile) => tile.year(),
            TileAddress::Orbit(tile) => tile.year(),
        }
    }
}

impl From<GridTile> for TileAddress {
    fn from(tile: GridTile) -> Self {
        TileAddress::Grid(tile)
    }
}

impl From<OrbitTile> for TileAddress {
    fn from(tile: OrbitTile) -> Self {
        TileAddress::Orbit(tile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_builder() -> OrbitTileBuilder {
        OrbitTileBuilder::new()
            .relative_orbit(52)
            .burst_cycle(716)
            .swath(Swath::Iw2)
            .polarization(Polarization::Vv)
    }

    #[test]
    fn test_grid_tile_rejects_out_of_extent() {
        let err = GridTile::new(8, 31, Channel::East, YearRange::default()).unwrap_err();
        assert_eq!(
            err,
            AddressError::OutOfRange {
                field: "east",
                value: 8,
                min: 9,
                max: 65
            }
        );

        assert!(GridTile::new(32, 56, Channel::Up, YearRange::default()).is_err());
        assert!(GridTile::new(65, 55, Channel::Up, YearRange::default()).is_ok());
    }

    #[test]
    fn test_orbit_builder_defaults() {
        let tile = complete_builder().build().unwrap();
        assert_eq!(tile.level(), ProcessingLevel::L2A);
        assert_eq!(tile.year(), YearRange::Y2019To2023);
        assert_eq!(tile.burst_cycle(), 716);
    }

    #[test]
    fn test_orbit_builder_reports_each_missing_parameter() {
        let cases = [
            (
                OrbitTileBuilder::new()
                    .burst_cycle(716)
                    .swath(Swath::Iw1)
                    .polarization(Polarization::Vv),
                "relative_orbit",
            ),
            (
                OrbitTileBuilder::new()
                    .relative_orbit(52)
                    .swath(Swath::Iw1)
                    .polarization(Polarization::Vv),
                "burst_cycle",
            ),
            (
                OrbitTileBuilder::new()
                    .relative_orbit(52)
                    .burst_cycle(716)
                    .polarization(Polarization::Vv),
                "swath",
            ),
            (
                OrbitTileBuilder::new()
                    .relative_orbit(52)
                    .burst_cycle(716)
                    .swath(Swath::Iw1),
                "polarization",
            ),
        ];

        for (builder, field) in cases {
            assert_eq!(
                builder.build().unwrap_err(),
                AddressError::MissingParameter(field)
            );
        }
    }

    #[test]
    fn test_orbit_builder_rejects_zero_orbit() {
        let err = complete_builder().relative_orbit(0).build().unwrap_err();
        assert!(matches!(
            err,
            AddressError::OutOfRange {
                field: "relative_orbit",
                ..
            }
        ));
    }

    #[test]
    fn test_tile_address_year() {
        let grid = GridTile::new(10, 10, Channel::Up, YearRange::Y2020To2024).unwrap();
        assert_eq!(TileAddress::from(grid).year(), YearRange::Y2020To2024);
    }
}
