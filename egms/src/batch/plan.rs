//! Batch enumeration.
//!
//! A [`BatchPlan`] is the cartesian product the user asked for: grid cells
//! times channels, or orbits times burst cycles times swaths times
//! polarizations. It fixes the task order and the name of the delivered
//! archive.
//!
//! # Task Order
//!
//! ```text
//! Grid:  east ─► north ─► channel
//! Orbit: orbit ─► burst cycle ─► swath ─► polarization
//! ```
//!
//! # Output Names
//!
//! | Plan                | Archive name                                      |
//! |---------------------|---------------------------------------------------|
//! | grid region         | `EGMS_L3_E{e0}-{e1}_N{n0}-{n1}_{year}_batch.zip`  |
//! | single grid cell    | `EGMS_L3_E{e}N{n}_{year}_batch.zip`               |
//! | orbit ranges        | `EGMS_{level}_batch_{year}.zip`                   |
//! | single orbit tile   | `EGMS_{level}_{orbit}_{burst}_{swath}_{pol}_{year}.zip` |

use std::ops::RangeInclusive;

use thiserror::Error;

use crate::address::{
    check_range, AddressError, Channel, GridTile, OrbitTile, Polarization, ProcessingLevel, Swath,
    TileAddress, YearRange, BURST_CYCLE_RANGE, EAST_RANGE, NORTH_RANGE, ORBIT_RANGE,
};
use crate::aggregate::OutputRequest;

/// Errors raised while planning a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// A range has its start after its end.
    #[error("{field} range is empty ({start} > {end})")]
    EmptyRange {
        field: &'static str,
        start: u16,
        end: u16,
    },

    /// A selection list (channels, swaths, polarizations) is empty.
    #[error("at least one {0} must be selected")]
    EmptySelection(&'static str),

    /// A range bound is outside what the archive serves.
    #[error(transparent)]
    Address(#[from] AddressError),
}

/// Grid tiles over a rectangular region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridBatch {
    east: RangeInclusive<u16>,
    north: RangeInclusive<u16>,
    channels: Vec<Channel>,
    year: YearRange,
    single_item: bool,
}

impl GridBatch {
    /// Plans every cell in `east` × `north`, for each selected channel.
    pub fn region(
        east: RangeInclusive<u16>,
        north: RangeInclusive<u16>,
        channels: &[Channel],
        year: YearRange,
    ) -> Result<Self, PlanError> {
        Self::validated(east, north, channels, year, false)
    }

    /// Plans one grid cell, for each selected channel.
    pub fn single(
        east: u16,
        north: u16,
        channels: &[Channel],
        year: YearRange,
    ) -> Result<Self, PlanError> {
        Self::validated(east..=east, north..=north, channels, year, true)
    }

    fn validated(
        east: RangeInclusive<u16>,
        north: RangeInclusive<u16>,
        channels: &[Channel],
        year: YearRange,
        single_item: bool,
    ) -> Result<Self, PlanError> {
        Ok(Self {
            east: checked_range("east", east, &EAST_RANGE)?,
            north: checked_range("north", north, &NORTH_RANGE)?,
            channels: selection("channel", channels)?,
            year,
            single_item,
        })
    }

    pub fn task_count(&self) -> usize {
        range_len(&self.east) * range_len(&self.north) * self.channels.len()
    }

    /// Addresses in task order, produced on demand.
    pub fn iter(&self) -> impl Iterator<Item = TileAddress> + '_ {
        let year = self.year;
        self.east.clone().flat_map(move |east| {
            self.north.clone().flat_map(move |north| {
                self.channels.iter().map(move |&channel| {
                    TileAddress::from(GridTile::new_unchecked(east, north, channel, year))
                })
            })
        })
    }

    pub fn addresses(&self) -> Vec<TileAddress> {
        self.iter().collect()
    }

    pub fn output_name(&self) -> String {
        if self.single_item {
            format!(
                "EGMS_L3_E{}N{}_{}_batch.zip",
                self.east.start(),
                self.north.start(),
                self.year
            )
        } else {
            format!(
                "EGMS_L3_E{}-{}_N{}-{}_{}_batch.zip",
                self.east.start(),
                self.east.end(),
                self.north.start(),
                self.north.end(),
                self.year
            )
        }
    }
}

/// L2a/L2b bursts over orbit and burst-cycle ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrbitBatch {
    orbits: RangeInclusive<u16>,
    burst_cycles: RangeInclusive<u16>,
    swaths: Vec<Swath>,
    polarizations: Vec<Polarization>,
    level: ProcessingLevel,
    year: YearRange,
    single_item: bool,
}

impl OrbitBatch {
    /// Plans every combination of orbit, burst cycle, swath and polarization.
    pub fn ranges(
        orbits: RangeInclusive<u16>,
        burst_cycles: RangeInclusive<u16>,
        swaths: &[Swath],
        polarizations: &[Polarization],
        level: ProcessingLevel,
        year: YearRange,
    ) -> Result<Self, PlanError> {
        Ok(Self {
            orbits: checked_range("relative_orbit", orbits, &ORBIT_RANGE)?,
            burst_cycles: checked_range("burst_cycle", burst_cycles, &BURST_CYCLE_RANGE)?,
            swaths: selection("swath", swaths)?,
            polarizations: selection("polarization", polarizations)?,
            level,
            year,
            single_item: false,
        })
    }

    /// Plans exactly one burst.
    pub fn single(tile: OrbitTile) -> Self {
        Self {
            orbits: tile.relative_orbit()..=tile.relative_orbit(),
            burst_cycles: tile.burst_cycle()..=tile.burst_cycle(),
            swaths: vec![tile.swath()],
            polarizations: vec![tile.polarization()],
            level: tile.level(),
            year: tile.year(),
            single_item: true,
        }
    }

    pub fn task_count(&self) -> usize {
        range_len(&self.orbits)
            * range_len(&self.burst_cycles)
            * self.swaths.len()
            * self.polarizations.len()
    }

    /// Addresses in task order, produced on demand.
    pub fn iter(&self) -> impl Iterator<Item = TileAddress> + '_ {
        let (level, year) = (self.level, self.year);
        self.orbits.clone().flat_map(move |orbit| {
            self.burst_cycles.clone().flat_map(move |burst_cycle| {
                self.swaths.iter().flat_map(move |&swath| {
                    self.polarizations.iter().map(move |&polarization| {
                        TileAddress::from(OrbitTile::new_unchecked(
                            orbit,
                            burst_cycle,
                            swath,
                            polarization,
                            level,
                            year,
                        ))
                    })
                })
            })
        })
    }

    pub fn addresses(&self) -> Vec<TileAddress> {
        self.iter().collect()
    }

    pub fn output_name(&self) -> String {
        if self.single_item {
            format!(
                "EGMS_{}_{:03}_{:04}_{}_{}_{}.zip",
                self.level,
                self.orbits.start(),
                self.burst_cycles.start(),
                self.swaths[0],
                self.polarizations[0],
                self.year
            )
        } else {
            format!("EGMS_{}_batch_{}.zip", self.level, self.year)
        }
    }
}

/// The full set of tiles for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchPlan {
    Grid(GridBatch),
    Orbit(OrbitBatch),
}

impl BatchPlan {
    /// Addresses in task order, produced on demand.
    pub fn iter(&self) -> Box<dyn Iterator<Item = TileAddress> + '_> {
        match self {
            BatchPlan::Grid(batch) => Box::new(batch.iter()),
            BatchPlan::Orbit(batch) => Box::new(batch.iter()),
        }
    }

    /// Addresses in task order.
    pub fn addresses(&self) -> Vec<TileAddress> {
        self.iter().collect()
    }

    pub fn task_count(&self) -> usize {
        match self {
            BatchPlan::Grid(batch) => batch.task_count(),
            BatchPlan::Orbit(batch) => batch.task_count(),
        }
    }

    /// Name of the container archive for this plan.
    pub fn output_name(&self) -> String {
        match self {
            BatchPlan::Grid(batch) => batch.output_name(),
            BatchPlan::Orbit(batch) => batch.output_name(),
        }
    }

    /// Whether the user asked for a single item rather than a batch.
    pub fn is_single_item(&self) -> bool {
        match self {
            BatchPlan::Grid(batch) => batch.single_item,
            BatchPlan::Orbit(batch) => batch.single_item,
        }
    }

    pub fn year(&self) -> YearRange {
        match self {
            BatchPlan::Grid(batch) => batch.year,
            BatchPlan::Orbit(batch) => batch.year,
        }
    }

    /// Aggregation settings matching this plan.
    pub fn output_request(&self, failure_manifest: bool) -> OutputRequest {
        OutputRequest {
            name_hint: self.output_name(),
            single_item: self.is_single_item(),
            failure_manifest,
        }
    }
}

impl From<GridBatch> for BatchPlan {
    fn from(batch: GridBatch) -> Self {
        BatchPlan::Grid(batch)
    }
}

impl From<OrbitBatch> for BatchPlan {
    fn from(batch: OrbitBatch) -> Self {
        BatchPlan::Orbit(batch)
    }
}

fn checked_range(
    field: &'static str,
    range: RangeInclusive<u16>,
    extent: &RangeInclusive<u16>,
) -> Result<RangeInclusive<u16>, PlanError> {
    if range.is_empty() {
        return Err(PlanError::EmptyRange {
            field,
            start: *range.start(),
            end: *range.end(),
        });
    }
    check_range(field, *range.start(), extent)?;
    check_range(field, *range.end(), extent)?;
    Ok(range)
}

/// Removes duplicates, keeping first-seen order.
fn selection<T: Copy + PartialEq>(field: &'static str, items: &[T]) -> Result<Vec<T>, PlanError> {
    let mut unique = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(item) {
            unique.push(*item);
        }
    }

    if unique.is_empty() {
        return Err(PlanError::EmptySelection(field));
    }
    Ok(unique)
}

fn range_len(range: &RangeInclusive<u16>) -> usize {
    usize::from(*range.end() - *range.start()) + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::OrbitTileBuilder;

    #[test]
    fn test_grid_region_order_east_north_channel() {
        let plan = GridBatch::region(10..=11, 25..=26, &Channel::ALL, YearRange::default()).unwrap();

        let cells: Vec<(u16, u16, Channel)> = plan
            .addresses()
            .into_iter()
            .map(|address| match address {
                TileAddress::Grid(tile) => (tile.east(), tile.north(), tile.channel()),
                TileAddress::Orbit(_) => panic!("grid plan produced orbit tile"),
            })
            .collect();

        assert_eq!(
            cells,
            vec![
                (10, 25, Channel::East),
                (10, 25, Channel::Up),
                (10, 26, Channel::East),
                (10, 26, Channel::Up),
                (11, 25, Channel::East),
                (11, 25, Channel::Up),
                (11, 26, Channel::East),
                (11, 26, Channel::Up),
            ]
        );
        assert_eq!(plan.task_count(), 8);
    }

    #[test]
    fn test_grid_output_names() {
        let region =
            GridBatch::region(10..=11, 25..=26, &[Channel::East], YearRange::default()).unwrap();
        assert_eq!(region.output_name(), "EGMS_L3_E10-11_N25-26_2019_2023_batch.zip");

        let single = GridBatch::single(32, 31, &Channel::ALL, YearRange::Y2020To2024).unwrap();
        assert_eq!(single.output_name(), "EGMS_L3_E32N31_2020_2024_batch.zip");
    }

    #[test]
    fn test_grid_rejects_inverted_range() {
        let (start, end) = (12, 10);
        let err = GridBatch::region(start..=end, 25..=26, &[Channel::Up], YearRange::default())
            .unwrap_err();
        assert_eq!(
            err,
            PlanError::EmptyRange {
                field: "east",
                start: 12,
                end: 10
            }
        );
    }

    #[test]
    fn test_grid_rejects_out_of_extent_bound() {
        let err =
            GridBatch::region(60..=70, 25..=26, &[Channel::Up], YearRange::default()).unwrap_err();
        assert!(matches!(err, PlanError::Address(AddressError::OutOfRange { value: 70, .. })));
    }

    #[test]
    fn test_selection_dedups_and_rejects_empty() {
        let plan = GridBatch::single(
            32,
            31,
            &[Channel::Up, Channel::Up, Channel::East],
            YearRange::default(),
        )
        .unwrap();
        assert_eq!(plan.task_count(), 2);

        let err = GridBatch::single(32, 31, &[], YearRange::default()).unwrap_err();
        assert_eq!(err, PlanError::EmptySelection("channel"));
    }

    #[test]
    fn test_orbit_ranges_order_and_count() {
        let plan = OrbitBatch::ranges(
            50..=51,
            715..=716,
            &[Swath::Iw1, Swath::Iw3],
            &[Polarization::Vv],
            ProcessingLevel::L2A,
            YearRange::default(),
        )
        .unwrap();

        assert_eq!(plan.task_count(), 8);

        let tiles: Vec<(u16, u16, Swath)> = plan
            .addresses()
            .into_iter()
            .map(|address| match address {
                TileAddress::Orbit(tile) => (tile.relative_orbit(), tile.burst_cycle(), tile.swath()),
                TileAddress::Grid(_) => panic!("orbit plan produced grid tile"),
            })
            .collect();
        assert_eq!(tiles[0], (50, 715, Swath::Iw1));
        assert_eq!(tiles[1], (50, 715, Swath::Iw3));
        assert_eq!(tiles[2], (50, 716, Swath::Iw1));
        assert_eq!(tiles[7], (51, 716, Swath::Iw3));

        assert_eq!(plan.output_name(), "EGMS_L2A_batch_2019_2023.zip");
    }

    #[test]
    fn test_widest_orbit_plan_is_enumerated_lazily() {
        let plan = BatchPlan::from(
            OrbitBatch::ranges(
                ORBIT_RANGE,
                BURST_CYCLE_RANGE,
                &Swath::ALL,
                &Polarization::ALL,
                ProcessingLevel::L2A,
                YearRange::default(),
            )
            .unwrap(),
        );

        assert_eq!(plan.task_count(), 999 * 9999 * 3 * 4);

        let first: Vec<(u16, u16, Swath, Polarization)> = plan
            .iter()
            .take(5)
            .map(|address| match address {
                TileAddress::Orbit(tile) => (
                    tile.relative_orbit(),
                    tile.burst_cycle(),
                    tile.swath(),
                    tile.polarization(),
                ),
                TileAddress::Grid(_) => panic!("orbit plan produced grid tile"),
            })
            .collect();
        assert_eq!(first[0], (1, 1, Swath::ALL[0], Polarization::ALL[0]));
        assert_eq!(first[1], (1, 1, Swath::ALL[0], Polarization::ALL[1]));
        assert_eq!(first[4], (1, 1, Swath::ALL[1], Polarization::ALL[0]));
    }

    #[test]
    fn test_orbit_rejects_empty_polarizations() {
        let err = OrbitBatch::ranges(
            50..=52,
            715..=717,
            &Swath::ALL,
            &[],
            ProcessingLevel::L2B,
            YearRange::default(),
        )
        .unwrap_err();
        assert_eq!(err, PlanError::EmptySelection("polarization"));
    }

    #[test]
    fn test_single_orbit_plan() {
        let tile = OrbitTileBuilder::new()
            .relative_orbit(52)
            .burst_cycle(716)
            .swath(Swath::Iw2)
            .polarization(Polarization::Vv)
            .level(ProcessingLevel::L2B)
            .build()
            .unwrap();
        let plan = BatchPlan::from(OrbitBatch::single(tile));

        assert_eq!(plan.addresses(), vec![TileAddress::Orbit(tile)]);
        assert!(plan.is_single_item());
        assert_eq!(plan.output_name(), "EGMS_L2B_052_0716_IW2_VV_2019_2023.zip");
    }

    #[test]
    fn test_output_request_follows_plan() {
        let plan = BatchPlan::from(
            GridBatch::region(10..=10, 25..=26, &[Channel::East], YearRange::default()).unwrap(),
        );

        let request = plan.output_request(true);

        assert_eq!(request.name_hint, "EGMS_L3_E10-10_N25-26_2019_2023_batch.zip");
        assert!(!request.single_item);
        assert!(request.failure_manifest);
    }
}
