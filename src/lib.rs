#![no_std]

pub mod activity;
pub mod station;

use core::net::Ipv4Addr;

use arp_offload_core::panel::PanelState;
use arp_offload_core::stats::{CpuStats, CpuStatsSource};
use arp_offload_core::AppContext;
use embassy_net::{tcp::TcpSocket, Stack};
use embassy_time::{Duration, Timer};
use esp_wifi::wifi::{WifiDevice, WifiStaDevice};
use log::{info, warn};

use crate::activity::ActivityDevice;

pub type NetStack = Stack<ActivityDevice<WifiDevice<'static, WifiStaDevice>>>;

/// Waits for the link and a DHCP lease, returning the leased address.
pub async fn wait_for_address(stack: &NetStack) -> Ipv4Addr {
    while !stack.is_link_up() {
        Timer::after(Duration::from_millis(500)).await;
    }

    info!("Waiting to get IP address...");
    loop {
        if let Some(config) = stack.config_v4() {
            let address = Ipv4Addr::from(config.address.address().0);
            info!("Got IP: {}", address);
            return address;
        }
        Timer::after(Duration::from_millis(500)).await;
    }
}

pub async fn close_socket(socket: &mut TcpSocket<'_>) {
    if let Err(e) = socket.flush().await {
        warn!("flush error: {:?}", e);
    }
    Timer::after(Duration::from_millis(50)).await;
    socket.close();
    Timer::after(Duration::from_millis(50)).await;
    socket.abort();
}

/// Running device as seen by the control panel pages.
pub struct Device {
    stack: &'static NetStack,
    app: &'static AppContext,
}

impl Device {
    pub fn new(stack: &'static NetStack, app: &'static AppContext) -> Self {
        Self { stack, app }
    }
}

impl CpuStatsSource for Device {
    #[cfg(feature = "cpu-stats")]
    fn cpu_stats(&self) -> Option<CpuStats> {
        // The executor keeps no idle or light-sleep accounting.
        Some(CpuStats {
            uptime: Duration::from_ticks(embassy_time::Instant::now().as_ticks()),
            idle: Duration::from_ticks(0),
            sleep: Duration::from_ticks(0),
            deep_sleep: self.app.ledger.total(),
        })
    }

    #[cfg(not(feature = "cpu-stats"))]
    fn cpu_stats(&self) -> Option<CpuStats> {
        None
    }
}

impl PanelState for Device {
    fn ip_address(&self) -> Option<Ipv4Addr> {
        self.stack
            .config_v4()
            .map(|config| Ipv4Addr::from(config.address.address().0))
    }

    fn app(&self) -> &AppContext {
        self.app
    }
}
