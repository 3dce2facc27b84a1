//! Request identity construction.
//!
//! Turns a [`TileAddress`] into the archive URL to request and the filename
//! prefix the payload inside the returned archive must carry.
//!
//! # URL Patterns
//!
//! L3 grid tiles:
//! `{base}/EGMS_L3_E{e}N{n}_100km_{channel}_{year}_1.zip?id={token}`
//!
//! L2a/L2b bursts:
//! `{base}/EGMS_{L2a|L2b}_{orbit:03}_{burst:04}_{swath}_{pol}_{year}_1.zip?id={token}`

use crate::address::{GridTile, OrbitTile, TileAddress};

/// Base URL of the EGMS archive download API.
pub const DEFAULT_BASE_URL: &str = "https://egms.land.copernicus.eu/insar-api/archive/download";

/// Public access token accepted by the archive API.
pub const DEFAULT_TOKEN: &str = "fcf61f768a6141ca81d6e4851c86cf89";

/// Where tile archives are requested from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEndpoint {
    base_url: String,
    token: String,
}

impl ArchiveEndpoint {
    /// Creates an endpoint. A trailing `/` on the base URL is ignored.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            token: token.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl Default for ArchiveEndpoint {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_TOKEN)
    }
}

/// Everything needed to request one tile and recognise its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestIdentity {
    locator: String,
    filename_prefix: String,
    label: String,
}

impl RequestIdentity {
    /// Builds the identity for `address` against `endpoint`.
    pub fn build(address: &TileAddress, endpoint: &ArchiveEndpoint) -> Self {
        let (stem, label) = match address {
            TileAddress::Grid(tile) => (grid_stem(tile), grid_label(tile)),
            TileAddress::Orbit(tile) => {
                let label = orbit_label(tile);
                (format!("EGMS_{}_{}_1", label, tile.year()), label)
            }
        };

        let locator = format!(
            "{}/{}.zip?id={}",
            endpoint.base_url(),
            stem,
            endpoint.token()
        );

        Self {
            locator,
            filename_prefix: stem,
            label,
        }
    }

    /// Full URL of the tile archive.
    pub fn locator(&self) -> &str {
        &self.locator
    }

    /// Substring the payload filename must contain.
    pub fn filename_prefix(&self) -> &str {
        &self.filename_prefix
    }

    /// Short human-readable name for progress output.
    pub fn label(&self) -> &str {
        &self.label
    }
}

fn grid_stem(tile: &GridTile) -> String {
    format!(
        "EGMS_L3_{}_100km_{}_{}_1",
        tile.tile_code(),
        tile.channel(),
        tile.year()
    )
}

fn grid_label(tile: &GridTile) -> String {
    format!("{} {}", tile.tile_code(), tile.channel())
}

/// `L2a_052_0716_IW2_VV`
fn orbit_label(tile: &OrbitTile) -> String {
    format!(
        "{}_{:03}_{:04}_{}_{}",
        tile.level().archive_code(),
        tile.relative_orbit(),
        tile.burst_cycle(),
        tile.swath(),
        tile.polarization()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{
        Channel, GridTile, OrbitTileBuilder, Polarization, ProcessingLevel, Swath, YearRange,
    };
    use proptest::prelude::*;

    fn grid(east: u16, north: u16, channel: Channel) -> TileAddress {
        GridTile::new(east, north, channel, YearRange::Y2019To2023)
            .unwrap()
            .into()
    }

    #[test]
    fn test_grid_identity() {
        let identity = RequestIdentity::build(&grid(32, 31, Channel::East), &ArchiveEndpoint::default());

        assert_eq!(
            identity.locator(),
            "https://egms.land.copernicus.eu/insar-api/archive/download/\
             EGMS_L3_E32N31_100km_E_2019_2023_1.zip?id=fcf61f768a6141ca81d6e4851c86cf89"
        );
        assert_eq!(
            identity.filename_prefix(),
            "EGMS_L3_E32N31_100km_E_2019_2023_1"
        );
        assert_eq!(identity.label(), "E32N31 E");
    }

    #[test]
    fn test_orbit_identity_pads_and_remaps_level() {
        let tile = OrbitTileBuilder::new()
            .relative_orbit(52)
            .burst_cycle(716)
            .swath(Swath::Iw2)
            .polarization(Polarization::Vv)
            .level(ProcessingLevel::L2B)
            .year(YearRange::Y2020To2024)
            .build()
            .unwrap();
        let endpoint = ArchiveEndpoint::new("http://localhost:8080/download/", "abc");

        let identity = RequestIdentity::build(&tile.into(), &endpoint);

        assert_eq!(
            identity.locator(),
            "http://localhost:8080/download/EGMS_L2b_052_0716_IW2_VV_2020_2024_1.zip?id=abc"
        );
        assert_eq!(
            identity.filename_prefix(),
            "EGMS_L2b_052_0716_IW2_VV_2020_2024_1"
        );
        assert_eq!(identity.label(), "L2b_052_0716_IW2_VV");
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let endpoint = ArchiveEndpoint::new("http://host/api///", "t");
        assert_eq!(endpoint.base_url(), "http://host/api");
    }

    proptest! {
        #[test]
        fn prop_grid_identity_is_deterministic(
            east in 9u16..=65,
            north in 9u16..=55,
            up in any::<bool>(),
        ) {
            let channel = if up { Channel::Up } else { Channel::East };
            let endpoint = ArchiveEndpoint::default();
            let first = RequestIdentity::build(&grid(east, north, channel), &endpoint);
            let second = RequestIdentity::build(&grid(east, north, channel), &endpoint);

            prop_assert_eq!(&first, &second);
            prop_assert!(first.locator().contains(first.filename_prefix()));
        }

        #[test]
        fn prop_orbit_fields_are_fixed_width(orbit in 1u16..=999, burst in 1u16..=9999) {
            let tile = OrbitTileBuilder::new()
                .relative_orbit(orbit)
                .burst_cycle(burst)
                .swath(Swath::Iw1)
                .polarization(Polarization::Hh)
                .build()
                .unwrap();
            let identity = RequestIdentity::build(&tile.into(), &ArchiveEndpoint::default());

            let fields: Vec<&str> = identity.filename_prefix().split('_').collect();
            prop_assert_eq!(fields[2].len(), 3);
            prop_assert_eq!(fields[3].len(), 4);
            prop_assert_eq!(fields[2].parse::<u16>().unwrap(), orbit);
            prop_assert_eq!(fields[3].parse::<u16>().unwrap(), burst);
        }
    }
}
