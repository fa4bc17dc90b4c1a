//! Hardware-independent half of the ARP offload demo.
//!
//! A browser drives the device through four pages. The sleep page hands a
//! [`sleep::SleepRequest`] to the suspend worker, which suspends the network
//! stack once the link has been quiet long enough; the radio keeps answering
//! ARP in the meantime so the host can stay in deep sleep until real traffic
//! arrives.

#![cfg_attr(not(test), no_std)]

pub mod app;
pub mod buffer;
pub mod config;
pub mod connection;
mod error;
pub mod http;
pub mod pages;
pub mod panel;
pub mod sleep;
pub mod stats;

#[cfg(test)]
mod mock;

pub use app::AppContext;
pub use error::{Error, Result};
