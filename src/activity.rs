//! Activity tracking between the Wi-Fi driver and embassy-net.
//!
//! [`ActivityDevice`] sits under the network stack and reports every frame
//! that is actually received or transmitted to a [`NetGate`]. While the gate is
//! suspended, transmit tokens are withheld so the stack stays quiet; received
//! frames still pass and wake the suspend worker.

use core::sync::atomic::{AtomicBool, Ordering};
use core::task::Context;

use arp_offload_core::sleep::NetworkActivity;
use embassy_net_driver::{Capabilities, Driver, HardwareAddress, LinkState, RxToken, TxToken};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_sync::waitqueue::AtomicWaker;

pub struct NetGate {
    suspended: AtomicBool,
    activity: Signal<CriticalSectionRawMutex, ()>,
    tx_waker: AtomicWaker,
}

impl Default for NetGate {
    fn default() -> Self {
        Self::new()
    }
}

impl NetGate {
    pub const fn new() -> Self {
        Self {
            suspended: AtomicBool::new(false),
            activity: Signal::new(),
            tx_waker: AtomicWaker::new(),
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::Acquire)
    }

    fn note_activity(&self) {
        self.activity.signal(());
    }
}

pub struct ActivityDevice<D> {
    inner: D,
    gate: &'static NetGate,
}

impl<D: Driver> ActivityDevice<D> {
    pub fn new(inner: D, gate: &'static NetGate) -> Self {
        Self { inner, gate }
    }

    pub fn mac_address(&self) -> [u8; 6] {
        match self.inner.hardware_address() {
            HardwareAddress::Ethernet(mac) => mac,
            _ => [0; 6],
        }
    }
}

pub struct ActivityRx<T> {
    inner: T,
    gate: &'static NetGate,
}

impl<T: RxToken> RxToken for ActivityRx<T> {
    fn consume<R, F>(self, f: F) -> R
    where
        F: FnOnce(&mut [u8]) -> R,
    {
        self.gate.note_activity();
        self.inner.consume(f)
    }
}

pub struct ActivityTx<T> {
    inner: T,
    gate: &'static NetGate,
}

impl<T: TxToken> TxToken for ActivityTx<T> {
    fn consume<R, F>(self, len: usize, f: F) -> R
    where
        F: FnOnce(&mut [u8]) -> R,
    {
        self.gate.note_activity();
        self.inner.consume(len, f)
    }
}

impl<D: Driver> Driver for ActivityDevice<D> {
    type RxToken<'a>
        = ActivityRx<D::RxToken<'a>>
    where
        Self: 'a;
    type TxToken<'a>
        = ActivityTx<D::TxToken<'a>>
    where
        Self: 'a;

    fn receive(&mut self, cx: &mut Context<'_>) -> Option<(Self::RxToken<'_>, Self::TxToken<'_>)> {
        let gate = self.gate;
        self.inner.receive(cx).map(|(rx, tx)| {
            (
                ActivityRx { inner: rx, gate },
                ActivityTx { inner: tx, gate },
            )
        })
    }

    fn transmit(&mut self, cx: &mut Context<'_>) -> Option<Self::TxToken<'_>> {
        if self.gate.is_suspended() {
            self.gate.tx_waker.register(cx.waker());
            return None;
        }
        let gate = self.gate;
        self.inner
            .transmit(cx)
            .map(|tx| ActivityTx { inner: tx, gate })
    }

    fn link_state(&mut self, cx: &mut Context<'_>) -> LinkState {
        self.inner.link_state(cx)
    }

    fn capabilities(&self) -> Capabilities {
        self.inner.capabilities()
    }

    fn hardware_address(&self) -> HardwareAddress {
        self.inner.hardware_address()
    }
}

/// [`NetworkActivity`] backed by the frames seen by [`ActivityDevice`].
pub struct WifiActivity {
    gate: &'static NetGate,
}

impl WifiActivity {
    pub fn new(gate: &'static NetGate) -> Self {
        Self { gate }
    }
}

impl NetworkActivity for WifiActivity {
    async fn activity(&mut self) {
        self.gate.activity.wait().await
    }

    fn suspend(&mut self) -> bool {
        self.gate.suspended.store(true, Ordering::Release);
        // A frame seen after the quiet window but before the store above.
        if self.gate.activity.signaled() {
            self.gate.activity.reset();
            self.resume();
            return false;
        }
        true
    }

    fn resume(&mut self) {
        self.gate.suspended.store(false, Ordering::Release);
        self.gate.tx_waker.wake();
    }
}
