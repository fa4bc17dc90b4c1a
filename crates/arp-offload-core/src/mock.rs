//! Scripted stand-ins for the socket, the station interface and the network
//! stack.

use std::cell::Cell;
use std::collections::VecDeque;
use std::string::String;
use std::vec::Vec;

use core::net::Ipv4Addr;

use embassy_time::{Duration, Instant, Timer};
use embedded_io_async::{ErrorKind, ErrorType, Read, Write};

use crate::app::AppContext;
use crate::config::SecurityMode;
use crate::connection::{ConnectionStatus, IpConfig, StationInterface};
use crate::panel::PanelState;
use crate::sleep::NetworkActivity;
use crate::stats::{CpuStats, CpuStatsSource};

/// In-memory socket: replays the given segments on read, records writes.
pub struct MockStream {
    incoming: VecDeque<Vec<u8>>,
    written: Vec<u8>,
    fail_writes: bool,
}

impl MockStream {
    pub fn new(segments: &[&[u8]]) -> Self {
        Self {
            incoming: segments.iter().map(|s| s.to_vec()).collect(),
            written: Vec::new(),
            fail_writes: false,
        }
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn written(&self) -> &[u8] {
        &self.written
    }

    pub fn written_str(&self) -> String {
        String::from_utf8_lossy(&self.written).into_owned()
    }
}

impl ErrorType for MockStream {
    type Error = ErrorKind;
}

impl Read for MockStream {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let Some(segment) = self.incoming.front_mut() else {
            return Ok(0);
        };
        let n = segment.len().min(buf.len());
        buf[..n].copy_from_slice(&segment[..n]);
        if n == segment.len() {
            let _ = self.incoming.pop_front();
        } else {
            let _ = segment.drain(..n);
        }
        Ok(n)
    }
}

impl Write for MockStream {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.fail_writes {
            return Err(ErrorKind::ConnectionReset);
        }
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }
}

/// Station interface with a fixed starting state. A successful join moves it
/// to `GlobalUp`.
pub struct MockStation {
    status: ConnectionStatus,
    fail_join: bool,
    calls: Cell<usize>,
    joins: usize,
    last_ssid: Option<String>,
}

impl MockStation {
    pub fn new(status: ConnectionStatus) -> Self {
        Self {
            status,
            fail_join: false,
            calls: Cell::new(0),
            joins: 0,
            last_ssid: None,
        }
    }

    pub fn failing_join(mut self) -> Self {
        self.fail_join = true;
        self
    }

    /// Calls of any kind made on the interface.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn joins(&self) -> usize {
        self.joins
    }

    pub fn last_ssid(&self) -> Option<String> {
        self.last_ssid.clone()
    }

    fn touch(&self) {
        self.calls.set(self.calls.get() + 1);
    }
}

impl StationInterface for MockStation {
    type Error = &'static str;

    fn status(&self) -> ConnectionStatus {
        self.touch();
        self.status
    }

    async fn join(
        &mut self,
        ssid: &str,
        _passphrase: &str,
        _security: SecurityMode,
    ) -> Result<(), Self::Error> {
        self.touch();
        self.joins += 1;
        self.last_ssid = Some(ssid.into());
        if self.fail_join {
            return Err("association rejected");
        }
        self.status = ConnectionStatus::GlobalUp;
        Ok(())
    }

    fn mac_address(&self) -> [u8; 6] {
        self.touch();
        [0x02, 0x00, 0x00, 0x12, 0x34, 0x56]
    }

    fn ip_config(&self) -> Option<IpConfig> {
        self.touch();
        self.status.is_up().then_some(IpConfig {
            address: Ipv4Addr::new(10, 0, 0, 7),
            netmask: Ipv4Addr::new(255, 255, 255, 0),
            gateway: Some(Ipv4Addr::new(10, 0, 0, 1)),
        })
    }

    async fn rssi(&mut self) -> Option<i8> {
        self.touch();
        Some(-48)
    }
}

/// Traffic pattern seen by [`MockNetwork`] while awake.
pub enum Traffic {
    /// No frames at all.
    Quiet,
    /// A frame every period, forever.
    Busy(Duration),
    /// A frame every period until the deadline, silence afterwards.
    Burst { until: Instant, period: Duration },
}

impl Traffic {
    pub fn burst(length: Duration, period: Duration) -> Self {
        Traffic::Burst {
            until: Instant::now() + length,
            period,
        }
    }
}

pub struct MockNetwork {
    traffic: Traffic,
    suspended: bool,
    /// Suspend calls to refuse, as if a frame had just arrived.
    late_frames: usize,
    pub suspends: usize,
    pub resumes: usize,
}

impl MockNetwork {
    /// Delay before the wake-up frame arrives while suspended.
    pub const WAKE_AFTER: Duration = Duration::from_millis(30);

    pub fn new(traffic: Traffic) -> Self {
        Self {
            traffic,
            suspended: false,
            late_frames: 0,
            suspends: 0,
            resumes: 0,
        }
    }

    pub fn with_late_frames(mut self, count: usize) -> Self {
        self.late_frames = count;
        self
    }
}

impl NetworkActivity for MockNetwork {
    async fn activity(&mut self) {
        if self.suspended {
            Timer::after(Self::WAKE_AFTER).await;
            return;
        }
        match self.traffic {
            Traffic::Quiet => core::future::pending().await,
            Traffic::Busy(period) => Timer::after(period).await,
            Traffic::Burst { until, period } => {
                if Instant::now() < until {
                    Timer::after(period).await
                } else {
                    core::future::pending().await
                }
            }
        }
    }

    fn suspend(&mut self) -> bool {
        if self.late_frames > 0 {
            self.late_frames -= 1;
            return false;
        }
        self.suspended = true;
        self.suspends += 1;
        true
    }

    fn resume(&mut self) {
        self.suspended = false;
        self.resumes += 1;
    }
}

pub struct MockState {
    pub app: AppContext,
    address: Option<Ipv4Addr>,
    cpu: Option<CpuStats>,
}

impl MockState {
    pub fn new() -> Self {
        Self {
            app: AppContext::new(),
            address: Some(Ipv4Addr::new(10, 0, 0, 7)),
            cpu: None,
        }
    }

    pub fn with_cpu_stats(mut self, cpu: CpuStats) -> Self {
        self.cpu = Some(cpu);
        self
    }

    pub fn without_address(mut self) -> Self {
        self.address = None;
        self
    }
}

impl CpuStatsSource for MockState {
    fn cpu_stats(&self) -> Option<CpuStats> {
        self.cpu
    }
}

impl PanelState for MockState {
    fn ip_address(&self) -> Option<Ipv4Addr> {
        self.address
    }

    fn app(&self) -> &AppContext {
        &self.app
    }
}
