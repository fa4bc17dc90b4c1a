pub mod sleep;
pub mod web;

use arp_offload::station::EspStation;
use arp_offload::NetStack;
use arp_offload_core::config::{WifiCredentials, RECONNECT_DELAY};
use arp_offload_core::connection::connect;
use embassy_time::Timer;
use log::{error, info};

/// Re-joins the access point whenever the link drops.
#[embassy_executor::task]
pub async fn connection(mut station: EspStation, credentials: WifiCredentials<'static>) {
    info!("Starting connection task");
    loop {
        station.wait_for_disconnect().await;
        info!("Wi-Fi disconnected");
        loop {
            Timer::after(RECONNECT_DELAY).await;
            match connect(&mut station, &credentials).await {
                Ok(()) => break,
                Err(e) => error!("Failed to reconnect: {}", e),
            }
        }
    }
}

#[embassy_executor::task]
pub async fn net_task(stack: &'static NetStack) {
    stack.run().await
}
