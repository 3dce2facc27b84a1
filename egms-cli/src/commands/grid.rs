//! Grid command - fetch L3 tiles on the 100 km grid.

use clap::Args;
use egms::address::YearRange;
use egms::batch::{BatchPlan, GridBatch};

use super::common::{run_plan, ChannelChoice, FetchArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the grid command.
#[derive(Debug, Clone, Args)]
pub struct GridArgs {
    /// East index of a single grid cell (9-65)
    #[arg(long, requires = "north")]
    pub east: Option<u16>,

    /// North index of a single grid cell (9-55)
    #[arg(long, requires = "east")]
    pub north: Option<u16>,

    /// First east index of a region
    #[arg(long, conflicts_with = "east")]
    pub min_east: Option<u16>,

    /// Last east index of a region
    #[arg(long, conflicts_with = "east")]
    pub max_east: Option<u16>,

    /// First north index of a region
    #[arg(long, conflicts_with = "north")]
    pub min_north: Option<u16>,

    /// Last north index of a region
    #[arg(long, conflicts_with = "north")]
    pub max_north: Option<u16>,

    /// Displacement component(s) to fetch
    #[arg(long, value_enum, default_value_t = ChannelChoice::Both)]
    pub channel: ChannelChoice,

    #[command(flatten)]
    pub fetch: FetchArgs,
}

impl GridArgs {
    /// Turns the arguments into a plan for `year`.
    pub fn plan(&self, year: YearRange) -> Result<BatchPlan, CliError> {
        let channels = self.channel.channels();
        let batch = match (
            self.east,
            self.north,
            self.min_east,
            self.max_east,
            self.min_north,
            self.max_north,
        ) {
            (Some(east), Some(north), None, None, None, None) => {
                GridBatch::single(east, north, &channels, year)?
            }
            (None, None, Some(min_east), Some(max_east), Some(min_north), Some(max_north)) => {
                GridBatch::region(min_east..=max_east, min_north..=max_north, &channels, year)?
            }
            _ => {
                return Err(CliError::Config(
                    "Specify either --east and --north, or all of --min-east, --max-east, \
                     --min-north and --max-north"
                        .to_string(),
                ))
            }
        };
        Ok(batch.into())
    }
}

/// Run the grid command.
pub fn run(args: GridArgs, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("grid");

    let plan = args.plan(args.fetch.year(runner.config()))?;
    run_plan(&runner, plan, &args.fetch)
}
