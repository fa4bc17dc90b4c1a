//! ARP offload demo: join the access point, then let a browser put the
//! network stack to sleep and wake it again.

#![no_std]
#![no_main]

mod tasks;

use arp_offload::activity::{ActivityDevice, NetGate};
use arp_offload::station::EspStation;
use arp_offload::{Device, NetStack};
use arp_offload_core::config::{WifiCredentials, MAX_RESOURCES};
use arp_offload_core::connection::connect;
use arp_offload_core::panel::{PanelState, ResourceTable};
use arp_offload_core::AppContext;
use embassy_executor::Spawner;
use embassy_net::{Stack, StackResources};
use embassy_time::{Duration, Timer};
use esp_alloc as _;
use esp_backtrace as _;
use esp_hal::{prelude::*, rng::Rng, timer::timg::TimerGroup};
use esp_println::println;
use esp_wifi::{init, wifi::WifiStaDevice, EspWifiController};
use log::info;

// When you are okay with using a nightly compiler it's better to use https://docs.rs/static_cell/2.1.0/static_cell/macro.make_static.html
macro_rules! mk_static {
    ($t:ty,$val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write(($val));
        x
    }};
}

#[esp_hal_embassy::main]
async fn main(spawner: Spawner) -> ! {
    esp_println::logger::init_logger_from_env();
    // ANSI escape: clear screen
    println!("\x1b[2J\x1b[;H");
    println!("===================================");
    println!("ESP32: ARP Offload Demo");
    println!("===================================\n");

    let mut config = esp_hal::Config::default();
    config.cpu_clock = CpuClock::max();
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(72 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let mut rng = Rng::new(peripherals.RNG);

    let init = &*mk_static!(
        EspWifiController<'static>,
        init(timg0.timer0, rng.clone(), peripherals.RADIO_CLK).expect("failed to initialise the radio")
    );

    let (wifi_interface, controller) =
        esp_wifi::wifi::new_with_mode(init, peripherals.WIFI, WifiStaDevice)
            .expect("failed to create the station interface");

    let timg1 = TimerGroup::new(peripherals.TIMG1);
    esp_hal_embassy::init(timg1.timer0);

    let gate = &*mk_static!(NetGate, NetGate::new());
    let device = ActivityDevice::new(wifi_interface, gate);
    let mac = device.mac_address();

    let config = embassy_net::Config::dhcpv4(Default::default());
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    let stack = &*mk_static!(
        NetStack,
        Stack::new(
            device,
            config,
            mk_static!(StackResources<4>, StackResources::<4>::new()),
            seed
        )
    );
    spawner
        .spawn(tasks::net_task(stack))
        .expect("failed to spawn the network task");

    let credentials =
        WifiCredentials::from_parts(option_env!("SSID"), option_env!("PASSWORD"), option_env!("AUTH_METHOD"));
    let mut station = EspStation::new(controller, stack, mac);
    if let Err(e) = connect(&mut station, &credentials).await {
        panic!(
            "Failed to connect to AP ({}). Check the SSID, PASSWORD and AUTH_METHOD build variables.",
            e
        );
    }

    let table = &*mk_static!(
        ResourceTable<MAX_RESOURCES>,
        ResourceTable::control_panel().expect("registering HTTP page resources failed")
    );
    let app = &*mk_static!(AppContext, AppContext::new());
    let device = &*mk_static!(Device, Device::new(stack, app));

    spawner
        .spawn(tasks::sleep::task_loop(app, gate))
        .expect("failed to spawn the sleep worker");
    spawner
        .spawn(tasks::web::task_loop(stack, table, device))
        .expect("failed to start HTTP server");
    spawner
        .spawn(tasks::connection(station, credentials))
        .expect("failed to spawn the connection task");

    if let Some(address) = device.ip_address() {
        info!(
            "HTTP server started successfully. Go to the webpage http://{}",
            address
        );
    }

    loop {
        Timer::after(Duration::from_secs(60)).await;
    }
}
