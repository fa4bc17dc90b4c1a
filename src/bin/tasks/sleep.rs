use arp_offload::activity::{NetGate, WifiActivity};
use arp_offload_core::config::SleepPolicy;
use arp_offload_core::sleep::SleepWorker;
use arp_offload_core::AppContext;
use log::info;

#[embassy_executor::task]
pub async fn task_loop(app: &'static AppContext, gate: &'static NetGate) {
    info!("Starting sleep worker");
    let mut worker = SleepWorker::new(app, WifiActivity::new(gate), SleepPolicy::default());
    worker.run().await
}
