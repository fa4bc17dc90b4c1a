//! Brings the station interface up against the configured access point.

use core::fmt;
use core::net::Ipv4Addr;

use log::{error, info};

use crate::config::{SecurityMode, WifiCredentials};
use crate::{Error, Result};

/// Link state as reported by the station interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    /// Associated with a link-local address only.
    LocalUp,
    /// Associated with a routable address.
    GlobalUp,
    ErrorUnsupported,
}

impl ConnectionStatus {
    pub fn is_up(self) -> bool {
        matches!(self, ConnectionStatus::LocalUp | ConnectionStatus::GlobalUp)
    }
}

/// What the radio itself reports, before the IP layer is considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioState {
    /// Not started, stopped, or started without an association.
    Idle,
    Associated,
    /// Running in a mode a station cannot use.
    Unsupported,
}

/// Combines the radio state with the lease, if any.
///
/// An idle radio is always `Disconnected`, so [`connect`] will join it.
pub fn station_status(radio: RadioState, ip: Option<&IpConfig>) -> ConnectionStatus {
    match (radio, ip) {
        (RadioState::Idle, _) => ConnectionStatus::Disconnected,
        (RadioState::Unsupported, _) => ConnectionStatus::ErrorUnsupported,
        (RadioState::Associated, None) => ConnectionStatus::Connecting,
        (RadioState::Associated, Some(config)) if config.gateway.is_some() => {
            ConnectionStatus::GlobalUp
        }
        (RadioState::Associated, Some(_)) => ConnectionStatus::LocalUp,
    }
}

/// IPv4 settings handed out by the access point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpConfig {
    pub address: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub gateway: Option<Ipv4Addr>,
}

pub struct MacAddress(pub [u8; 6]);

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

/// The Wi-Fi radio operating as a client of an access point.
#[allow(async_fn_in_trait)]
pub trait StationInterface {
    type Error: fmt::Debug;

    fn status(&self) -> ConnectionStatus;

    /// Associates with the access point and waits for an address.
    async fn join(
        &mut self,
        ssid: &str,
        passphrase: &str,
        security: SecurityMode,
    ) -> core::result::Result<(), Self::Error>;

    fn mac_address(&self) -> [u8; 6];

    fn ip_config(&self) -> Option<IpConfig>;

    /// Signal strength of the associated access point in dBm.
    async fn rssi(&mut self) -> Option<i8>;
}

/// Logs the current link state. Only the two "up" states count as success;
/// a join still in progress is reported as an error.
pub fn print_connection_status<I: StationInterface>(station: &I) -> Result<()> {
    let status = station.status();
    let address = station.ip_config().map(|config| config.address);

    match status {
        ConnectionStatus::LocalUp | ConnectionStatus::GlobalUp => {
            let scope = if status == ConnectionStatus::LocalUp {
                "LOCAL UP"
            } else {
                "GLOBAL UP"
            };
            info!("Wi-Fi status: {}. Wi-Fi connection already established.", scope);
            if let Some(address) = address {
                info!("IP: {}", address);
            }
            Ok(())
        }
        ConnectionStatus::Connecting => {
            info!("Wi-Fi status: CONNECTING...");
            Err(Error::Connection)
        }
        ConnectionStatus::Disconnected => {
            info!("Wi-Fi status: DISCONNECTED");
            Err(Error::Connection)
        }
        ConnectionStatus::ErrorUnsupported => {
            info!("Wi-Fi status: UNSUPPORTED");
            Err(Error::Connection)
        }
    }
}

/// Joins the access point named in `credentials`.
///
/// An interface that is not disconnected is not re-joined; its status is
/// reported instead.
pub async fn connect<I: StationInterface>(
    station: &mut I,
    credentials: &WifiCredentials<'_>,
) -> Result<()> {
    let (Some(ssid), Some(passphrase)) = (credentials.ssid, credentials.passphrase) else {
        error!("Incorrect Wi-Fi credentials.");
        return Err(Error::InvalidArgument);
    };
    info!("SSID: {}, Security: {}", ssid, credentials.security);

    if station.status() != ConnectionStatus::Disconnected {
        return print_connection_status(station);
    }

    info!("Connecting to Wi-Fi AP: {}", ssid);
    if let Err(e) = station.join(ssid, passphrase, credentials.security).await {
        error!("Failed to connect to Wi-Fi AP: {:?}", e);
        return Err(Error::Connection);
    }

    info!("MAC\t : {}", MacAddress(station.mac_address()));
    let config = station.ip_config();
    if let Some(config) = config {
        info!("Netmask\t : {}", config.netmask);
        match config.gateway {
            Some(gateway) => info!("Gateway\t : {}", gateway),
            None => info!("Gateway\t : none"),
        }
    }
    match station.rssi().await {
        Some(rssi) => info!("RSSI\t : {}", rssi),
        None => info!("RSSI\t : unknown"),
    }
    if let Some(config) = config {
        info!("IP Addr\t : {}", config.address);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockStation;
    use embassy_futures::block_on;

    fn credentials(ssid: Option<&'static str>) -> WifiCredentials<'static> {
        WifiCredentials::from_parts(ssid, Some("hunter22"), None)
    }

    #[test]
    fn missing_ssid_is_rejected_without_touching_the_interface() {
        let mut station = MockStation::new(ConnectionStatus::Disconnected);
        assert_eq!(
            block_on(connect(&mut station, &credentials(None))),
            Err(Error::InvalidArgument)
        );
        assert_eq!(station.calls(), 0);
    }

    #[test]
    fn missing_passphrase_is_rejected() {
        let mut station = MockStation::new(ConnectionStatus::Disconnected);
        let creds = WifiCredentials::from_parts(Some("lab"), None, None);
        assert_eq!(
            block_on(connect(&mut station, &creds)),
            Err(Error::InvalidArgument)
        );
        assert_eq!(station.calls(), 0);
    }

    #[test]
    fn already_up_reports_status_instead_of_joining() {
        let mut station = MockStation::new(ConnectionStatus::GlobalUp);
        assert_eq!(block_on(connect(&mut station, &credentials(Some("lab")))), Ok(()));
        assert_eq!(station.joins(), 0);
    }

    #[test]
    fn connecting_state_short_circuits_to_an_error() {
        let mut station = MockStation::new(ConnectionStatus::Connecting);
        assert_eq!(
            block_on(connect(&mut station, &credentials(Some("lab")))),
            Err(Error::Connection)
        );
        assert_eq!(station.joins(), 0);
    }

    #[test]
    fn successful_join_brings_the_link_up() {
        let mut station = MockStation::new(ConnectionStatus::Disconnected);
        assert_eq!(block_on(connect(&mut station, &credentials(Some("lab")))), Ok(()));
        assert_eq!(station.joins(), 1);
        assert_eq!(station.last_ssid(), Some("lab".into()));
        assert_eq!(station.status(), ConnectionStatus::GlobalUp);
    }

    #[test]
    fn failed_join_is_a_connection_error() {
        let mut station = MockStation::new(ConnectionStatus::Disconnected).failing_join();
        assert_eq!(
            block_on(connect(&mut station, &credentials(Some("lab")))),
            Err(Error::Connection)
        );
        assert_eq!(station.joins(), 1);
    }

    #[test]
    fn status_report_accepts_only_up_states() {
        for (status, ok) in [
            (ConnectionStatus::Disconnected, false),
            (ConnectionStatus::Connecting, false),
            (ConnectionStatus::LocalUp, true),
            (ConnectionStatus::GlobalUp, true),
            (ConnectionStatus::ErrorUnsupported, false),
        ] {
            let station = MockStation::new(status);
            assert_eq!(print_connection_status(&station).is_ok(), ok, "{status:?}");
            assert_eq!(status.is_up(), ok);
        }
    }

    #[test]
    fn station_status_from_radio_and_lease() {
        let lease = IpConfig {
            address: Ipv4Addr::new(10, 0, 0, 7),
            netmask: Ipv4Addr::new(255, 255, 255, 0),
            gateway: Some(Ipv4Addr::new(10, 0, 0, 1)),
        };
        let link_local = IpConfig {
            gateway: None,
            ..lease
        };
        for (radio, ip, expected) in [
            (RadioState::Idle, None, ConnectionStatus::Disconnected),
            (RadioState::Idle, Some(&lease), ConnectionStatus::Disconnected),
            (RadioState::Associated, None, ConnectionStatus::Connecting),
            (RadioState::Associated, Some(&link_local), ConnectionStatus::LocalUp),
            (RadioState::Associated, Some(&lease), ConnectionStatus::GlobalUp),
            (RadioState::Unsupported, None, ConnectionStatus::ErrorUnsupported),
        ] {
            assert_eq!(station_status(radio, ip), expected, "{radio:?} {ip:?}");
        }
    }

    #[test]
    fn radio_that_was_never_started_gets_joined() {
        let mut station = MockStation::new(station_status(RadioState::Idle, None));
        assert_eq!(block_on(connect(&mut station, &credentials(Some("lab")))), Ok(()));
        assert_eq!(station.joins(), 1);
        assert!(station.status().is_up());
    }

    #[test]
    fn mac_address_formats_as_colon_separated_hex() {
        assert_eq!(
            MacAddress([0x00, 0x1a, 0x2b, 0x3c, 0x4d, 0xff]).to_string(),
            "00:1a:2b:3c:4d:ff"
        );
    }
}
