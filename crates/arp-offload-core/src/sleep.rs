//! Sleep request hand-off between the control panel and the suspend worker.
//!
//! The panel raises a [`SleepRequest`]; the [`SleepWorker`] waits for it and
//! makes exactly one bounded [`attempt_suspend`] per permit. A permit raised
//! while an attempt is running stays pending and yields one more attempt;
//! any number of raises collapse into that single permit.

use core::cell::Cell;

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Timer};
use log::{debug, info, warn};

use crate::app::AppContext;
use crate::config::SleepPolicy;

/// Single-slot permit: raising it twice before it is taken is the same as
/// raising it once.
pub struct SleepRequest {
    signal: Signal<CriticalSectionRawMutex, ()>,
}

impl Default for SleepRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl SleepRequest {
    pub const fn new() -> Self {
        Self {
            signal: Signal::new(),
        }
    }

    pub fn raise(&self) {
        self.signal.signal(());
    }

    /// Blocks until a permit is present and consumes it.
    pub async fn wait(&self) {
        self.signal.wait().await
    }

    pub fn is_pending(&self) -> bool {
        self.signal.signaled()
    }
}

/// The host side of the network stack as seen by the suspend worker.
#[allow(async_fn_in_trait)]
pub trait NetworkActivity {
    /// Completes on the next frame that crosses the interface.
    async fn activity(&mut self);

    /// Stops servicing the network stack so the host can deep-sleep.
    ///
    /// Returns `false`, leaving the stack running, if a frame arrived that
    /// [`activity`](Self::activity) has not reported yet.
    fn suspend(&mut self) -> bool;

    fn resume(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspendOutcome {
    /// No quiet window fit in the observation interval.
    Busy,
    /// The stack was suspended for the given time.
    Suspended(Duration),
}

/// Makes one bounded attempt to suspend the network stack.
///
/// Every frame restarts the quiet window. If a full `policy.window` of
/// silence fits inside `policy.interval`, the stack is suspended, stays
/// suspended until the next frame, and is resumed.
pub async fn attempt_suspend<N: NetworkActivity>(
    net: &mut N,
    policy: &SleepPolicy,
) -> SuspendOutcome {
    let deadline = Instant::now() + policy.interval;
    let mut window_start = Instant::now();

    loop {
        if window_start + policy.window > deadline {
            return SuspendOutcome::Busy;
        }
        match select(net.activity(), Timer::after(policy.window)).await {
            Either::First(()) => {
                debug!("network activity, restarting quiet window");
                window_start = Instant::now();
            }
            Either::Second(()) => {
                if net.suspend() {
                    break;
                }
                debug!("frame arrived at the end of the quiet window");
                window_start = Instant::now();
            }
        }
    }

    let since = Instant::now();
    info!("Network stack suspended");
    net.activity().await;
    net.resume();
    let suspended = since.elapsed();
    info!("Network stack resumed after {} ms", suspended.as_millis());
    SuspendOutcome::Suspended(suspended)
}

/// Accumulated time the network stack spent suspended.
pub struct SuspendLedger {
    inner: Mutex<CriticalSectionRawMutex, Cell<(Duration, u32)>>,
}

impl Default for SuspendLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl SuspendLedger {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Cell::new((Duration::from_ticks(0), 0))),
        }
    }

    pub fn record(&self, suspended: Duration) {
        self.inner.lock(|cell| {
            let (total, count) = cell.get();
            cell.set((total + suspended, count.saturating_add(1)));
        });
    }

    pub fn total(&self) -> Duration {
        self.inner.lock(|cell| cell.get().0)
    }

    /// Number of completed suspensions.
    pub fn count(&self) -> u32 {
        self.inner.lock(|cell| cell.get().1)
    }
}

pub struct SleepWorker<'a, N> {
    app: &'a AppContext,
    net: N,
    policy: SleepPolicy,
    attempts: u32,
}

impl<'a, N: NetworkActivity> SleepWorker<'a, N> {
    pub fn new(app: &'a AppContext, net: N, policy: SleepPolicy) -> Self {
        Self {
            app,
            net,
            policy,
            attempts: 0,
        }
    }

    /// Waits for one sleep request and services it.
    pub async fn run_once(&mut self) -> SuspendOutcome {
        self.app.sleep_request.wait().await;
        self.attempts = self.attempts.wrapping_add(1);
        info!(
            "Sleep request #{}, watching for network inactivity",
            self.attempts
        );

        let outcome = attempt_suspend(&mut self.net, &self.policy).await;
        match outcome {
            SuspendOutcome::Suspended(suspended) => self.app.ledger.record(suspended),
            SuspendOutcome::Busy => warn!("Network busy, host stays awake"),
        }
        outcome
    }

    pub async fn run(&mut self) -> ! {
        loop {
            let _ = self.run_once().await;
        }
    }

    /// Number of suspend attempts made so far.
    #[cfg(test)]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[cfg(test)]
    pub fn network(&self) -> &N {
        &self.net
    }
}
