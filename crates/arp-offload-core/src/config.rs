//! Build-time configuration shared by the firmware and the control panel.

use core::fmt;
use core::str::FromStr;

use embassy_time::Duration;

/// Port the control panel listens on.
pub const HTTP_PORT: u16 = 80;
/// Upper bound for a rendered dynamic page.
pub const HTTP_BYTES_LEN: usize = 1024;
/// Upper bound for an incoming request head.
pub const REQUEST_BYTES_LEN: usize = 512;
/// Number of resources the control panel registers.
pub const MAX_RESOURCES: usize = 4;

/// Interval in which the worker looks for a quiet window.
pub const NETWORK_INACTIVE_INTERVAL: Duration = Duration::from_millis(500);
/// Continuous silence required before the network stack is suspended.
pub const NETWORK_INACTIVE_WINDOW: Duration = Duration::from_millis(250);

/// How long a join may take to produce an address.
pub const JOIN_TIMEOUT: Duration = Duration::from_secs(30);
/// Back-off before re-joining after the access point dropped us.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Security mode of the configured access point.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SecurityMode {
    Open,
    Wep,
    WpaPsk,
    #[default]
    Wpa2Psk,
    WpaWpa2Psk,
    Wpa3Psk,
    Wpa2Wpa3Psk,
}

impl FromStr for SecurityMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mode = s.trim();
        let table = [
            ("open", SecurityMode::Open),
            ("wep", SecurityMode::Wep),
            ("wpa", SecurityMode::WpaPsk),
            ("wpa2", SecurityMode::Wpa2Psk),
            ("wpa-wpa2", SecurityMode::WpaWpa2Psk),
            ("wpa3", SecurityMode::Wpa3Psk),
            ("wpa2-wpa3", SecurityMode::Wpa2Wpa3Psk),
        ];
        table
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(mode))
            .map(|(_, security)| *security)
            .ok_or(crate::Error::InvalidArgument)
    }
}

impl fmt::Display for SecurityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SecurityMode::Open => "open",
            SecurityMode::Wep => "wep",
            SecurityMode::WpaPsk => "wpa",
            SecurityMode::Wpa2Psk => "wpa2",
            SecurityMode::WpaWpa2Psk => "wpa-wpa2",
            SecurityMode::Wpa3Psk => "wpa3",
            SecurityMode::Wpa2Wpa3Psk => "wpa2-wpa3",
        };
        f.write_str(name)
    }
}

/// Access point credentials. A field is `None` when it was not configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WifiCredentials<'a> {
    pub ssid: Option<&'a str>,
    pub passphrase: Option<&'a str>,
    pub security: SecurityMode,
}

impl<'a> WifiCredentials<'a> {
    /// Builds credentials from raw build-time values. An unparsable security
    /// mode falls back to WPA2.
    pub fn from_parts(
        ssid: Option<&'a str>,
        passphrase: Option<&'a str>,
        security: Option<&str>,
    ) -> Self {
        let security = match security.map(SecurityMode::from_str) {
            Some(Ok(mode)) => mode,
            Some(Err(_)) => {
                log::warn!("Unknown security mode, using {}", SecurityMode::default());
                SecurityMode::default()
            }
            None => SecurityMode::default(),
        };
        Self {
            ssid,
            passphrase,
            security,
        }
    }
}

/// Timing of a single suspend attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepPolicy {
    pub interval: Duration,
    pub window: Duration,
}

impl SleepPolicy {
    /// A window longer than the interval could never be observed, so it is
    /// clamped to the interval.
    pub fn new(interval: Duration, window: Duration) -> Self {
        Self {
            interval,
            window: if window > interval { interval } else { window },
        }
    }
}

impl Default for SleepPolicy {
    fn default() -> Self {
        Self::new(NETWORK_INACTIVE_INTERVAL, NETWORK_INACTIVE_WINDOW)
    }
}
