//! Sequential, paced batch execution.
//!
//! The orchestrator visits every address in order:
//!
//! ```text
//! for each address
//!     RequestIdentity::build
//!     RateLimiter::acquire        (pacing)
//!     TileFetcher::fetch          ─┐
//!     extract_payload             ─┴─► FetchOutcome
//!     RateLimiter::release
//!     on_progress(completed, total, label)
//! ```
//!
//! A failed task is recorded and the run moves on; nothing is retried and
//! nothing short of cancellation stops the run early.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::limiter::{FixedIntervalLimiter, RateLimiter};
use super::outcome::{BatchResult, FailureReason, FetchOutcome};
use super::plan::BatchPlan;
use crate::address::TileAddress;
use crate::extract::extract_payload;
use crate::fetch::{HttpClient, TileFetcher};
use crate::identity::{ArchiveEndpoint, RequestIdentity};

/// Runs batches of tile tasks one after another.
pub struct BatchOrchestrator<C: HttpClient, L: RateLimiter = FixedIntervalLimiter> {
    fetcher: TileFetcher<C>,
    endpoint: ArchiveEndpoint,
    limiter: L,
    cancel: Option<Arc<AtomicBool>>,
}

impl<C: HttpClient> BatchOrchestrator<C, FixedIntervalLimiter> {
    /// Creates an orchestrator leaving `pacing_delay` between tasks.
    pub fn new(fetcher: TileFetcher<C>, endpoint: ArchiveEndpoint, pacing_delay: Duration) -> Self {
        Self::with_limiter(fetcher, endpoint, FixedIntervalLimiter::new(pacing_delay))
    }
}

impl<C: HttpClient, L: RateLimiter> BatchOrchestrator<C, L> {
    /// Creates an orchestrator with a custom rate limiter.
    pub fn with_limiter(fetcher: TileFetcher<C>, endpoint: ArchiveEndpoint, limiter: L) -> Self {
        Self {
            fetcher,
            endpoint,
            limiter,
            cancel: None,
        }
    }

    /// Stops the run before the next task once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn fetcher(&self) -> &TileFetcher<C> {
        &self.fetcher
    }

    /// Runs every task in `plan`.
    pub fn run_plan<F>(&self, plan: &BatchPlan, on_progress: F) -> BatchResult
    where
        F: FnMut(usize, usize, &str),
    {
        self.run_tasks(plan.iter(), plan.task_count(), on_progress)
    }

    /// Runs one task per address, in order.
    ///
    /// `on_progress` is called after each task with the 1-based number of
    /// completed tasks, the total, and the task's label.
    pub fn run<F>(&self, addresses: &[TileAddress], on_progress: F) -> BatchResult
    where
        F: FnMut(usize, usize, &str),
    {
        self.run_tasks(addresses.iter().copied(), addresses.len(), on_progress)
    }

    fn run_tasks<I, F>(&self, addresses: I, total: usize, mut on_progress: F) -> BatchResult
    where
        I: Iterator<Item = TileAddress>,
        F: FnMut(usize, usize, &str),
    {
        info!(tasks = total, "Starting batch");

        let mut outcomes = Vec::new();
        let mut cancelled = false;

        for (index, address) in addresses.enumerate() {
            if self.is_cancelled() {
                warn!(
                    completed = index,
                    total, "Batch cancelled before all tasks ran"
                );
                cancelled = true;
                break;
            }

            let identity = RequestIdentity::build(&address, &self.endpoint);
            self.limiter.acquire();
            outcomes.push(self.run_task(&address, &identity));
            self.limiter.release();

            on_progress(index + 1, total, identity.label());
        }

        let result = BatchResult::new(outcomes, total, cancelled);
        info!(
            attempted = result.attempted(),
            succeeded = result.succeeded(),
            failed = result.failed(),
            "Batch finished"
        );
        result
    }

    fn run_task(&self, address: &TileAddress, identity: &RequestIdentity) -> FetchOutcome {
        let payload = self
            .fetcher
            .fetch(identity)
            .map_err(FailureReason::from)
            .and_then(|archive| {
                extract_payload(&archive, identity.filename_prefix()).map_err(FailureReason::from)
            });

        match payload {
            Ok(payload) => {
                debug!(
                    tile = identity.label(),
                    file = %payload.filename,
                    bytes = payload.bytes.len(),
                    "Payload extracted"
                );
                FetchOutcome::Success {
                    address: *address,
                    payload,
                }
            }
            Err(reason) => {
                warn!(tile = identity.label(), error = %reason, "Tile task failed");
                FetchOutcome::Failure {
                    address: *address,
                    label: identity.label().to_string(),
                    reason,
                }
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{Channel, YearRange};
    use crate::batch::limiter::Unlimited;
    use crate::batch::plan::GridBatch;
    use crate::extract::tests::zip_with_entries;
    use crate::fetch::{FetchError, MockHttpClient, RoutedHttpClient};
    use std::sync::Mutex;
    use std::thread;
    use std::time::Instant;

    fn grid_plan() -> BatchPlan {
        GridBatch::region(10..=11, 25..=25, &Channel::ALL, YearRange::default())
            .unwrap()
            .into()
    }

    fn tile_archive(stem: &str) -> Vec<u8> {
        let payload_name = format!("{}.csv", stem);
        zip_with_entries(&[("readme.txt", "EGMS"), (payload_name.as_str(), "pid,mean\n")])
    }

    /// Client that takes `latency` per request and records when each ran.
    struct SlowHttpClient {
        latency: Duration,
        calls: Mutex<Vec<(Instant, Instant)>>,
    }

    impl HttpClient for SlowHttpClient {
        fn get(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
            let started = Instant::now();
            thread::sleep(self.latency);
            self.calls.lock().unwrap().push((started, Instant::now()));
            Err(FetchError::Status(503))
        }
    }

    fn unpaced<C: HttpClient>(client: C) -> BatchOrchestrator<C, Unlimited> {
        BatchOrchestrator::with_limiter(TileFetcher::new(client), ArchiveEndpoint::default(), Unlimited)
    }

    #[test]
    fn test_run_isolates_failures() {
        let client = RoutedHttpClient::new()
            .route(
                "E10N25_100km_E",
                Ok(tile_archive("EGMS_L3_E10N25_100km_E_2019_2023_1")),
            )
            .route("E10N25_100km_U", Err(FetchError::Transport("reset".into())))
            .route("E11N25_100km_E", Ok(b"not a zip".to_vec()))
            .route("E11N25_100km_U", Ok(tile_archive("unrelated")));

        let result = unpaced(client).run_plan(&grid_plan(), |_, _, _| {});

        assert_eq!(result.attempted(), 4);
        assert_eq!(result.succeeded(), 1);
        assert!(!result.cancelled());

        let reasons: Vec<_> = result.failures().map(|(_, reason)| reason.clone()).collect();
        assert_eq!(reasons[0], FailureReason::Transport("reset".into()));
        assert!(matches!(reasons[1], FailureReason::CorruptArchive(_)));
        assert_eq!(reasons[2], FailureReason::NoMatchingPayload);
    }

    #[test]
    fn test_progress_is_one_based_and_monotonic() {
        let orchestrator = unpaced(MockHttpClient {
            response: Err(FetchError::Status(500)),
        });

        let mut updates = Vec::new();
        orchestrator.run_plan(&grid_plan(), |completed, total, label| {
            updates.push((completed, total, label.to_string()));
        });

        assert_eq!(
            updates,
            vec![
                (1, 4, "E10N25 E".to_string()),
                (2, 4, "E10N25 U".to_string()),
                (3, 4, "E11N25 E".to_string()),
                (4, 4, "E11N25 U".to_string()),
            ]
        );
    }

    #[test]
    fn test_single_task_reports_one_step() {
        let plan: BatchPlan = GridBatch::single(32, 31, &[Channel::East], YearRange::default())
            .unwrap()
            .into();
        let orchestrator = unpaced(MockHttpClient {
            response: Err(FetchError::Status(404)),
        });

        let mut steps = 0;
        orchestrator.run_plan(&plan, |completed, total, _| {
            steps += 1;
            assert_eq!((completed, total), (1, 1));
        });
        assert_eq!(steps, 1);
    }

    #[test]
    fn test_cancel_flag_stops_between_tasks() {
        let flag = Arc::new(AtomicBool::new(false));
        let orchestrator = unpaced(MockHttpClient {
            response: Err(FetchError::Status(500)),
        })
        .with_cancel_flag(Arc::clone(&flag));

        let result = orchestrator.run_plan(&grid_plan(), |completed, _, _| {
            if completed == 2 {
                flag.store(true, Ordering::SeqCst);
            }
        });

        assert!(result.cancelled());
        assert_eq!(result.attempted(), 2);
        assert_eq!(result.planned(), 4);
    }

    #[test]
    fn test_requests_are_paced() {
        let delay = Duration::from_millis(30);
        let orchestrator = BatchOrchestrator::new(
            TileFetcher::new(RoutedHttpClient::new()),
            ArchiveEndpoint::default(),
            delay,
        );

        let started = Instant::now();
        orchestrator.run_plan(&grid_plan(), |_, _, _| {});

        let times = orchestrator.fetcher().client().request_times();
        assert_eq!(times.len(), 4);
        for pair in times.windows(2) {
            assert!(pair[1].duration_since(pair[0]) >= delay);
        }
        // No trailing delay after the last task
        assert!(started.elapsed() < delay * 4 + Duration::from_secs(1));
    }

    #[test]
    fn test_delay_follows_slow_tasks() {
        let delay = Duration::from_millis(30);
        let orchestrator = BatchOrchestrator::new(
            TileFetcher::new(SlowHttpClient {
                latency: delay * 2,
                calls: Mutex::new(Vec::new()),
            }),
            ArchiveEndpoint::default(),
            delay,
        );

        orchestrator.run_plan(&grid_plan(), |_, _, _| {});

        let calls = orchestrator.fetcher().client().calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 4);
        for pair in calls.windows(2) {
            let (_, previous_finish) = pair[0];
            let (next_start, _) = pair[1];
            assert!(next_start.duration_since(previous_finish) >= delay);
        }
    }

    #[test]
    fn test_run_plan_matches_run_over_addresses() {
        let plan = grid_plan();
        let orchestrator = unpaced(MockHttpClient {
            response: Err(FetchError::Status(404)),
        });

        let mut from_plan = Vec::new();
        orchestrator.run_plan(&plan, |done, total, label| {
            from_plan.push((done, total, label.to_string()))
        });
        let mut from_slice = Vec::new();
        orchestrator.run(&plan.addresses(), |done, total, label| {
            from_slice.push((done, total, label.to_string()))
        });

        assert_eq!(from_plan, from_slice);
    }
}
