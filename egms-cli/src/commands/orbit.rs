//! Orbit command - fetch L2a/L2b bursts in SAR geometry.

use clap::Args;
use egms::address::{OrbitTileBuilder, Polarization, ProcessingLevel, Swath, YearRange};
use egms::batch::{BatchPlan, OrbitBatch};

use super::common::{run_plan, FetchArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the orbit command.
#[derive(Debug, Clone, Args)]
pub struct OrbitArgs {
    /// Relative orbit of a single burst (1-999)
    #[arg(long)]
    pub orbit: Option<u16>,

    /// Burst cycle of a single burst (1-9999)
    #[arg(long)]
    pub burst: Option<u16>,

    /// First relative orbit of a range
    #[arg(long, conflicts_with = "orbit")]
    pub min_orbit: Option<u16>,

    /// Last relative orbit of a range
    #[arg(long, conflicts_with = "orbit")]
    pub max_orbit: Option<u16>,

    /// First burst cycle of a range
    #[arg(long, conflicts_with = "burst")]
    pub min_burst: Option<u16>,

    /// Last burst cycle of a range
    #[arg(long, conflicts_with = "burst")]
    pub max_burst: Option<u16>,

    /// Sub-swath (IW1, IW2, IW3); repeat for ranges
    #[arg(long = "swath")]
    pub swaths: Vec<Swath>,

    /// Polarization (VV, VH, HH, HV); repeat for ranges
    #[arg(long = "polarization")]
    pub polarizations: Vec<Polarization>,

    /// Processing level (L2A or L2B)
    #[arg(long, default_value_t = ProcessingLevel::L2A)]
    pub level: ProcessingLevel,

    #[command(flatten)]
    pub fetch: FetchArgs,
}

impl OrbitArgs {
    /// Turns the arguments into a plan for `year`.
    pub fn plan(&self, year: YearRange) -> Result<BatchPlan, CliError> {
        let ranges = (self.min_orbit, self.max_orbit, self.min_burst, self.max_burst);
        match (self.orbit, self.burst, ranges) {
            (Some(_), _, (None, None, None, None)) | (_, Some(_), (None, None, None, None)) => {
                self.single_plan(year)
            }
            (None, None, (Some(min_orbit), Some(max_orbit), Some(min_burst), Some(max_burst))) => {
                let batch = OrbitBatch::ranges(
                    min_orbit..=max_orbit,
                    min_burst..=max_burst,
                    &self.swaths,
                    &self.polarizations,
                    self.level,
                    year,
                )?;
                Ok(batch.into())
            }
            _ => Err(CliError::Config(
                "Specify either --orbit and --burst, or all of --min-orbit, --max-orbit, \
                 --min-burst and --max-burst"
                    .to_string(),
            )),
        }
    }

    fn single_plan(&self, year: YearRange) -> Result<BatchPlan, CliError> {
        let mut builder = OrbitTileBuilder::new().level(self.level).year(year);
        if let Some(orbit) = self.orbit {
            builder = builder.relative_orbit(orbit);
        }
        if let Some(burst) = self.burst {
            builder = builder.burst_cycle(burst);
        }
        if let Some(swath) = single_choice("--swath", &self.swaths)? {
            builder = builder.swath(swath);
        }
        if let Some(polarization) = single_choice("--polarization", &self.polarizations)? {
            builder = builder.polarization(polarization);
        }

        let tile = builder
            .build()
            .map_err(|e| CliError::Plan(e.into()))?;
        Ok(OrbitBatch::single(tile).into())
    }
}

/// At most one value is allowed for a single burst.
fn single_choice<T: Copy>(flag: &str, values: &[T]) -> Result<Option<T>, CliError> {
    match values {
        [] => Ok(None),
        [value] => Ok(Some(*value)),
        _ => Err(CliError::Config(format!(
            "{} may only be given once when fetching a single burst",
            flag
        ))),
    }
}

/// Run the orbit command.
pub fn run(args: OrbitArgs, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("orbit");

    let plan = args.plan(args.fetch.year(runner.config()))?;
    run_plan(&runner, plan, &args.fetch)
}
