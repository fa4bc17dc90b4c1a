use core::net::Ipv4Addr;

use arp_offload_core::config::{SecurityMode, JOIN_TIMEOUT};
use arp_offload_core::connection::{
    station_status, ConnectionStatus, IpConfig, RadioState, StationInterface,
};
use embassy_time::with_timeout;
use esp_wifi::wifi::{
    AuthMethod, ClientConfiguration, Configuration, WifiController, WifiError, WifiEvent,
    WifiState,
};
use heapless::String;
use log::{info, warn};

use crate::{wait_for_address, NetStack};

#[derive(Debug)]
pub enum JoinError {
    /// SSID or passphrase too long for the driver.
    Credentials,
    Wifi(WifiError),
    /// Associated, but DHCP never produced an address.
    NoAddress,
}

fn auth_method(security: SecurityMode) -> AuthMethod {
    match security {
        SecurityMode::Open => AuthMethod::None,
        SecurityMode::Wep => AuthMethod::WEP,
        SecurityMode::WpaPsk => AuthMethod::WPA,
        SecurityMode::Wpa2Psk => AuthMethod::WPA2Personal,
        SecurityMode::WpaWpa2Psk => AuthMethod::WPAWPA2Personal,
        SecurityMode::Wpa3Psk => AuthMethod::WPA3Personal,
        SecurityMode::Wpa2Wpa3Psk => AuthMethod::WPA2WPA3Personal,
    }
}

/// `wifi_state()` stays `Invalid` until the radio has been started once.
fn radio_state(started: bool, state: WifiState) -> RadioState {
    if !started {
        return RadioState::Idle;
    }
    match state {
        WifiState::StaConnected => RadioState::Associated,
        WifiState::Invalid
        | WifiState::StaStarted
        | WifiState::StaDisconnected
        | WifiState::StaStopped => RadioState::Idle,
        _ => RadioState::Unsupported,
    }
}

/// The ESP32 radio in station mode, together with the stack running on it.
pub struct EspStation {
    controller: WifiController<'static>,
    stack: &'static NetStack,
    mac: [u8; 6],
    ssid: String<32>,
}

impl EspStation {
    pub fn new(controller: WifiController<'static>, stack: &'static NetStack, mac: [u8; 6]) -> Self {
        Self {
            controller,
            stack,
            mac,
            ssid: String::new(),
        }
    }

    pub async fn wait_for_disconnect(&mut self) {
        self.controller
            .wait_for_event(WifiEvent::StaDisconnected)
            .await;
    }
}

impl StationInterface for EspStation {
    type Error = JoinError;

    fn status(&self) -> ConnectionStatus {
        let started = matches!(self.controller.is_started(), Ok(true));
        let radio = radio_state(started, esp_wifi::wifi::wifi_state());
        station_status(radio, self.ip_config().as_ref())
    }

    async fn join(
        &mut self,
        ssid: &str,
        passphrase: &str,
        security: SecurityMode,
    ) -> Result<(), Self::Error> {
        self.ssid = ssid.try_into().map_err(|_| JoinError::Credentials)?;
        let client_config = Configuration::Client(ClientConfiguration {
            ssid: self.ssid.clone(),
            password: passphrase.try_into().map_err(|_| JoinError::Credentials)?,
            auth_method: auth_method(security),
            ..Default::default()
        });
        self.controller
            .set_configuration(&client_config)
            .map_err(JoinError::Wifi)?;

        if !matches!(self.controller.is_started(), Ok(true)) {
            info!("Starting wifi");
            self.controller.start_async().await.map_err(JoinError::Wifi)?;
            info!("Wifi started!");
        }

        self.controller.connect_async().await.map_err(JoinError::Wifi)?;
        info!("Wifi connected, waiting for an address");

        with_timeout(JOIN_TIMEOUT, wait_for_address(self.stack))
            .await
            .map(|_| ())
            .map_err(|_| JoinError::NoAddress)
    }

    fn mac_address(&self) -> [u8; 6] {
        self.mac
    }

    fn ip_config(&self) -> Option<IpConfig> {
        self.stack.config_v4().map(|config| IpConfig {
            address: Ipv4Addr::from(config.address.address().0),
            netmask: Ipv4Addr::from(config.address.netmask().0),
            gateway: config.gateway.map(|gateway| Ipv4Addr::from(gateway.0)),
        })
    }

    async fn rssi(&mut self) -> Option<i8> {
        match self.controller.scan_n_async::<8>().await {
            Ok((access_points, _)) => access_points
                .iter()
                .find(|ap| ap.ssid == self.ssid)
                .map(|ap| ap.signal_strength),
            Err(e) => {
                warn!("Scan for signal strength failed: {:?}", e);
                None
            }
        }
    }
}
