//! Fetch cycles against the bot API and the timer that repeats them.
//!
//! A cycle calls the status, guilds and health endpoints in that order and
//! collects the results into a [`CycleReport`]. The report is built without
//! holding the state lock and applied to [`AppState`] in one step.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::Result;
use colored::Colorize;

use crate::analytics::logger;
use crate::api::DashboardApi;
use crate::model::{Guild, UserPresence};
use crate::state::AppState;

/// State shared between the poller thread and the HTTP server.
pub type SharedState = Arc<Mutex<AppState>>;

/// Longest single sleep while waiting for the next tick, so `stop` is
/// noticed promptly.
const STOP_POLL: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// One cycle
// ---------------------------------------------------------------------------

/// Result of one fetch cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    /// New user snapshot, if `/api/status` answered with `success: true`.
    pub users: Option<Vec<UserPresence>>,
    /// New guild snapshot, if `/api/guilds` answered with `success: true`.
    pub guilds: Option<Vec<Guild>>,
    /// Every endpoint succeeded and the bot reported itself connected.
    pub connected: bool,
    /// The error that aborted the cycle, if any.
    pub error: Option<String>,
}

/// Run one cycle: status → guilds → health.
///
/// An error on any endpoint aborts the rest of the cycle; snapshots already
/// collected are kept in the report. A `success: false` answer does not
/// abort but leaves the cycle disconnected.
pub fn fetch_cycle(api: &dyn DashboardApi) -> CycleReport {
    let mut report = CycleReport::default();
    match collect(api, &mut report) {
        Ok(all_ok) => report.connected = all_ok,
        Err(e) => {
            report.connected = false;
            report.error = Some(format!("{e:#}"));
        }
    }
    report
}

fn collect(api: &dyn DashboardApi, report: &mut CycleReport) -> Result<bool> {
    let status = api.fetch_status()?;
    let status_ok = status.success;
    if status_ok {
        report.users = Some(status.users);
    }

    let guilds = api.fetch_guilds()?;
    let guilds_ok = guilds.success;
    if guilds_ok {
        report.guilds = Some(guilds.guilds);
    }

    let health = api.fetch_health()?;

    Ok(status_ok && guilds_ok && health.is_connected())
}

/// Run one cycle, apply it to the shared state and record it.
pub fn run_tick(api: &dyn DashboardApi, state: &SharedState, log_ticks: bool) -> CycleReport {
    let started = Instant::now();
    let report = fetch_cycle(api);
    let duration_ms = started.elapsed().as_millis() as u64;

    if log_ticks {
        logger::log_tick(&report, duration_ms);
    }
    print_tick(&report, duration_ms);

    state
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .apply(report.clone());

    report
}

fn print_tick(report: &CycleReport, duration_ms: u64) {
    let time = chrono::Local::now().format("%H:%M:%S");
    let users = report
        .users
        .as_ref()
        .map_or_else(|| "-".to_string(), |u| u.len().to_string());
    let guilds = report
        .guilds
        .as_ref()
        .map_or_else(|| "-".to_string(), |g| g.len().to_string());

    match &report.error {
        Some(err) => eprintln!("{time} {} {err} ({duration_ms} ms)", "fetch failed:".red()),
        None if report.connected => println!(
            "{time} {} users={users} guilds={guilds} ({duration_ms} ms)",
            "ok".green()
        ),
        None => println!(
            "{time} {} users={users} guilds={guilds} ({duration_ms} ms)",
            "degraded".yellow()
        ),
    }
}

// ---------------------------------------------------------------------------
// Poller
// ---------------------------------------------------------------------------

/// Runs [`run_tick`] on a dedicated thread at a fixed period.
///
/// Ticks never overlap. When a tick takes longer than the period, the next
/// one starts as soon as it finishes and missed ticks are dropped.
pub struct Poller {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Start polling. The first tick runs immediately.
    pub fn spawn<A>(api: A, state: SharedState, interval: Duration, log_ticks: bool) -> Result<Self>
    where
        A: DashboardApi + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("guildwatch-poller".to_string())
            .spawn(move || poll_loop(&api, &state, interval, log_ticks, &stop_flag))?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Ask the poller to stop and wait for the current tick to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn poll_loop(
    api: &dyn DashboardApi,
    state: &SharedState,
    interval: Duration,
    log_ticks: bool,
    stop: &AtomicBool,
) {
    while !stop.load(Ordering::Relaxed) {
        let started = Instant::now();
        run_tick(api, state, log_ticks);

        let deadline = started + interval;
        while !stop.load(Ordering::Relaxed) {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep((deadline - now).min(STOP_POLL));
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GuildsResponse, HealthResponse, StatusResponse};
    use std::sync::atomic::AtomicUsize;

    struct Down;

    impl DashboardApi for Down {
        fn fetch_status(&self) -> Result<StatusResponse> {
            anyhow::bail!("connection refused")
        }
        fn fetch_guilds(&self) -> Result<GuildsResponse> {
            panic!("guilds must not be fetched after status failed")
        }
        fn fetch_health(&self) -> Result<HealthResponse> {
            panic!("health must not be fetched after status failed")
        }
    }

    #[test]
    fn error_aborts_remaining_endpoints() {
        let report = fetch_cycle(&Down);
        assert!(!report.connected);
        assert!(report.users.is_none());
        assert!(report.guilds.is_none());
        assert!(report.error.unwrap().contains("connection refused"));
    }

    /// Takes `delay` per status call and records how many calls overlap.
    struct Slow {
        delay: Duration,
        in_flight: Arc<AtomicUsize>,
        max_in_flight: Arc<AtomicUsize>,
        calls: Arc<AtomicUsize>,
    }

    impl DashboardApi for Slow {
        fn fetch_status(&self) -> Result<StatusResponse> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(self.delay);
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            anyhow::bail!("slow upstream")
        }
        fn fetch_guilds(&self) -> Result<GuildsResponse> {
            unreachable!()
        }
        fn fetch_health(&self) -> Result<HealthResponse> {
            unreachable!()
        }
    }

    #[test]
    fn overrunning_ticks_never_overlap() {
        use crate::config::schema::default_roles;

        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_in_flight = Arc::new(AtomicUsize::new(0));
        let calls = Arc::new(AtomicUsize::new(0));
        let api = Slow {
            delay: Duration::from_millis(60),
            in_flight: Arc::clone(&in_flight),
            max_in_flight: Arc::clone(&max_in_flight),
            calls: Arc::clone(&calls),
        };

        let state: SharedState = Arc::new(Mutex::new(AppState::new(default_roles())));
        let poller = Poller::spawn(api, state, Duration::from_millis(20), false).unwrap();
        thread::sleep(Duration::from_millis(400));
        poller.stop();

        assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(in_flight.load(Ordering::SeqCst), 0);
        // A 20 ms period would give ~20 ticks; 60 ms ticks allow at most ~7.
        let calls = calls.load(Ordering::SeqCst);
        assert!((1..=8).contains(&calls), "unexpected tick count {calls}");
    }

    #[test]
    fn poller_ticks_and_stops() {
        use crate::config::schema::default_roles;
        use crate::state::Connectivity;

        let state: SharedState = Arc::new(Mutex::new(AppState::new(default_roles())));
        let poller = Poller::spawn(Down, Arc::clone(&state), Duration::from_millis(20), false)
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while state.lock().unwrap().last_updated.is_none() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        poller.stop();

        let state = state.lock().unwrap();
        assert!(state.last_updated.is_some());
        assert_eq!(state.connectivity, Connectivity::Offline);
    }
}
