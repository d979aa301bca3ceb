//! Wallet connection state and the polling status monitor.
//!
//! The monitor owns the connection state and reconciles it against the
//! host wallet connector: a steady poll loop plus immediate refreshes on
//! connector events. The connector is an injected capability so the whole
//! thing can be driven by a fake in tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub const ERR_WALLET_UNAVAILABLE: &str = "wallet not available";
pub const ERR_WALLET_DISCONNECTED: &str = "wallet disconnected";
pub const ERR_CONNECT_FAILED: &str = "failed to connect wallet";
pub const ERR_STATUS_CHECK_FAILED: &str = "wallet status check failed";

/// Snapshot of the wallet link as last reconciled against the connector.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectionState {
    pub address: Option<String>,
    pub is_connecting: bool,
    pub last_error: Option<String>,
}

impl ConnectionState {
    /// Connected exactly when an address is held.
    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }
}

/// Capability handle for the host wallet connector.
pub trait WalletConnector {
    /// Resolve the currently active account address, if any.
    async fn active_address(&self) -> Result<Option<String>, String>;

    /// Ask the host to establish a connection. May fault.
    async fn request_connect(&self) -> Result<(), String>;
}

/// Keeps [`ConnectionState`] in sync with the connector.
///
/// Every committed state change is pushed through `on_change`, which the
/// view layer points at a signal.
pub struct StatusMonitor<C> {
    connector: Option<C>,
    state: Rc<RefCell<ConnectionState>>,
    issued: Cell<u64>,
    on_change: Box<dyn Fn(ConnectionState)>,
}

impl<C: WalletConnector> StatusMonitor<C> {
    pub fn new(connector: Option<C>, on_change: impl Fn(ConnectionState) + 'static) -> Self {
        Self {
            connector,
            state: Rc::new(RefCell::new(ConnectionState::default())),
            issued: Cell::new(0),
            on_change: Box::new(on_change),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    fn mutate(&self, f: impl FnOnce(&mut ConnectionState)) {
        f(&mut self.state.borrow_mut());
        (self.on_change)(self.state());
    }

    /// Probe the connector for the active address and reconcile.
    ///
    /// Each probe carries a sequence number; a response is only committed
    /// while its number is still the latest issued, so a slow probe can
    /// never overwrite the state a fresher one already wrote.
    pub async fn refresh_status(&self) {
        let seq = self.issued.get().wrapping_add(1);
        self.issued.set(seq);

        let Some(connector) = &self.connector else {
            self.mutate(|s| {
                s.address = None;
                s.last_error = Some(ERR_WALLET_UNAVAILABLE.to_string());
            });
            return;
        };

        let probe = connector.active_address().await;

        if seq != self.issued.get() {
            log::debug!("dropping stale wallet probe #{seq}");
            return;
        }

        self.mutate(|s| match probe {
            Ok(Some(addr)) => {
                // Addresses compare case-insensitively; hosts are not
                // consistent about checksummed casing.
                let changed = s
                    .address
                    .as_deref()
                    .map_or(true, |held| !held.eq_ignore_ascii_case(&addr));
                if changed {
                    s.address = Some(addr);
                }
                s.last_error = None;
            }
            Ok(None) => {
                if s.address.take().is_some() {
                    s.last_error = Some(ERR_WALLET_DISCONNECTED.to_string());
                }
            }
            Err(e) => {
                log::warn!("wallet status check failed: {e}");
                s.address = None;
                s.last_error = Some(ERR_STATUS_CHECK_FAILED.to_string());
            }
        });
    }

    /// Ask the host to connect, then re-probe after a short grace period.
    ///
    /// No-op while a connect is already in flight.
    pub async fn connect(&self) {
        if self.state.borrow().is_connecting {
            return;
        }
        let Some(connector) = &self.connector else {
            self.mutate(|s| s.last_error = Some(ERR_WALLET_UNAVAILABLE.to_string()));
            return;
        };

        self.mutate(|s| {
            s.is_connecting = true;
            s.last_error = None;
        });

        match connector.request_connect().await {
            Ok(()) => {
                connect_grace().await;
                self.refresh_status().await;
                if !self.state.borrow().is_connected() {
                    self.mutate(|s| s.last_error = Some(ERR_CONNECT_FAILED.to_string()));
                }
            }
            Err(e) => {
                log::warn!("wallet connect failed: {e}");
                let msg = if e.is_empty() {
                    ERR_CONNECT_FAILED.to_string()
                } else {
                    e
                };
                self.mutate(|s| s.last_error = Some(msg));
            }
        }

        self.mutate(|s| s.is_connecting = false);
    }

    /// Connector pushed an account change; reconcile immediately instead of
    /// waiting for the next poll tick.
    pub async fn handle_accounts_changed(&self) {
        self.refresh_status().await;
    }

    /// Connector reported a disconnect; drop the address right away.
    pub fn handle_disconnected(&self) {
        self.mutate(|s| {
            s.address = None;
            s.last_error = Some(ERR_WALLET_DISCONNECTED.to_string());
        });
    }
}

/// Short pause after a connect request so the host side can settle before
/// the follow-up probe. There is no JS timer off wasm; tests skip the wait.
async fn connect_grace() {
    #[cfg(target_arch = "wasm32")]
    gloo_timers::future::TimeoutFuture::new(crate::utils::constants::CONNECT_GRACE_MS).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::future::join;
    use std::future::Future;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// Yields to the executor exactly once, then resolves. Lets a test
    /// interleave two cooperative futures deterministically.
    #[derive(Default)]
    struct YieldOnce(bool);

    impl Future for YieldOnce {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                Poll::Ready(())
            } else {
                self.0 = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    #[derive(Default)]
    struct FakeConnector {
        /// Scripted responses, consumed front to back.
        addresses: RefCell<Vec<Result<Option<String>, String>>>,
        connect_result: RefCell<Option<Result<(), String>>>,
        connect_calls: Cell<u32>,
        /// When set, the next address probe yields once before answering.
        stall_next_probe: Cell<bool>,
        /// When set, connect requests yield once before answering.
        stall_connect: Cell<bool>,
    }

    impl FakeConnector {
        fn scripted(addresses: Vec<Result<Option<String>, String>>) -> Self {
            Self {
                addresses: RefCell::new(addresses),
                ..Self::default()
            }
        }
    }

    impl WalletConnector for &FakeConnector {
        async fn active_address(&self) -> Result<Option<String>, String> {
            if self.stall_next_probe.replace(false) {
                YieldOnce::default().await;
            }
            self.addresses.borrow_mut().remove(0)
        }

        async fn request_connect(&self) -> Result<(), String> {
            self.connect_calls.set(self.connect_calls.get() + 1);
            if self.stall_connect.get() {
                YieldOnce::default().await;
            }
            self.connect_result
                .borrow()
                .clone()
                .unwrap_or(Ok(()))
        }
    }

    fn monitor(connector: &FakeConnector) -> StatusMonitor<&FakeConnector> {
        StatusMonitor::new(Some(connector), |_| {})
    }

    #[test]
    fn adopting_an_address_marks_connected() {
        let fake = FakeConnector::scripted(vec![Ok(Some("0xAbC".into()))]);
        let m = monitor(&fake);

        block_on(m.refresh_status());

        let state = m.state();
        assert_eq!(state.address.as_deref(), Some("0xAbC"));
        assert!(state.is_connected());
        assert!(state.last_error.is_none());
    }

    #[test]
    fn connected_iff_address_present() {
        let fake = FakeConnector::scripted(vec![
            Ok(Some("0xAbC".into())),
            Ok(None),
            Ok(Some("0xDeF".into())),
        ]);
        let m = monitor(&fake);

        block_on(m.refresh_status());
        assert!(m.state().is_connected());
        block_on(m.refresh_status());
        assert!(!m.state().is_connected());
        assert!(m.state().address.is_none());
        block_on(m.refresh_status());
        assert!(m.state().is_connected());
    }

    #[test]
    fn case_variant_of_held_address_is_not_adopted() {
        let fake = FakeConnector::scripted(vec![
            Ok(Some("0xAbC".into())),
            Ok(Some("0xABC".into())),
        ]);
        let m = monitor(&fake);

        block_on(m.refresh_status());
        block_on(m.refresh_status());

        // Same account, different checksum casing: keep what we hold.
        assert_eq!(m.state().address.as_deref(), Some("0xAbC"));
    }

    #[test]
    fn losing_the_address_sets_disconnected_error() {
        let fake = FakeConnector::scripted(vec![Ok(Some("0xAbC".into())), Ok(None)]);
        let m = monitor(&fake);

        block_on(m.refresh_status());
        block_on(m.refresh_status());

        let state = m.state();
        assert!(!state.is_connected());
        assert_eq!(state.last_error.as_deref(), Some(ERR_WALLET_DISCONNECTED));
    }

    #[test]
    fn probe_while_already_disconnected_stays_quiet() {
        let fake = FakeConnector::scripted(vec![Ok(None)]);
        let m = monitor(&fake);

        block_on(m.refresh_status());

        let state = m.state();
        assert!(!state.is_connected());
        assert!(state.last_error.is_none());
    }

    #[test]
    fn probe_fault_maps_to_generic_error() {
        let fake = FakeConnector::scripted(vec![
            Ok(Some("0xAbC".into())),
            Err("rpc exploded".into()),
        ]);
        let m = monitor(&fake);

        block_on(m.refresh_status());
        block_on(m.refresh_status());

        let state = m.state();
        assert!(!state.is_connected());
        assert_eq!(state.last_error.as_deref(), Some(ERR_STATUS_CHECK_FAILED));
    }

    #[test]
    fn missing_connector_reports_unavailable() {
        let m: StatusMonitor<&FakeConnector> = StatusMonitor::new(None, |_| {});

        block_on(m.refresh_status());

        assert_eq!(m.state().last_error.as_deref(), Some(ERR_WALLET_UNAVAILABLE));
        assert!(!m.state().is_connected());
    }

    #[test]
    fn stale_probe_response_is_dropped() {
        let fake = FakeConnector::scripted(vec![
            Ok(Some("0xFresh".into())),
            Ok(Some("0xStale".into())),
        ]);
        fake.stall_next_probe.set(true);
        let m = monitor(&fake);

        // First refresh stalls mid-probe; the second completes and commits
        // "0xFresh". The first then resumes with "0xStale" but its sequence
        // number is no longer current.
        block_on(join(m.refresh_status(), m.refresh_status()));

        assert_eq!(m.state().address.as_deref(), Some("0xFresh"));
    }

    #[test]
    fn connect_adopts_address_and_clears_flag() {
        let fake = FakeConnector::scripted(vec![Ok(Some("0xAbC".into()))]);
        let m = monitor(&fake);

        block_on(m.connect());

        let state = m.state();
        assert!(state.is_connected());
        assert!(!state.is_connecting);
        assert!(state.last_error.is_none());
        assert_eq!(fake.connect_calls.get(), 1);
    }

    #[test]
    fn connect_without_resulting_address_surfaces_error() {
        let fake = FakeConnector::scripted(vec![Ok(None)]);
        let m = monitor(&fake);

        block_on(m.connect());

        let state = m.state();
        assert!(!state.is_connected());
        assert!(!state.is_connecting);
        assert_eq!(state.last_error.as_deref(), Some(ERR_CONNECT_FAILED));
    }

    #[test]
    fn connect_fault_message_becomes_visible_error() {
        let fake = FakeConnector::default();
        *fake.connect_result.borrow_mut() = Some(Err("user rejected".into()));
        let m = monitor(&fake);

        block_on(m.connect());

        let state = m.state();
        assert_eq!(state.last_error.as_deref(), Some("user rejected"));
        assert!(!state.is_connecting);
    }

    #[test]
    fn reentrant_connect_is_a_noop() {
        let fake = FakeConnector::scripted(vec![Ok(Some("0xAbC".into()))]);
        fake.stall_connect.set(true);
        let m = monitor(&fake);

        // The first connect stalls inside the connector; the second runs
        // while `is_connecting` is set and must not reach the connector.
        block_on(join(m.connect(), m.connect()));

        assert_eq!(fake.connect_calls.get(), 1);
        assert!(m.state().is_connected());
    }

    #[test]
    fn disconnect_event_drops_address_immediately() {
        let fake = FakeConnector::scripted(vec![Ok(Some("0xAbC".into()))]);
        let m = monitor(&fake);

        block_on(m.refresh_status());
        m.handle_disconnected();

        let state = m.state();
        assert!(!state.is_connected());
        assert_eq!(state.last_error.as_deref(), Some(ERR_WALLET_DISCONNECTED));
    }

    #[test]
    fn committed_changes_reach_the_subscriber() {
        let seen: Rc<RefCell<Vec<ConnectionState>>> = Rc::default();
        let sink = Rc::clone(&seen);
        let fake = FakeConnector::scripted(vec![Ok(Some("0xAbC".into()))]);
        let m = StatusMonitor::new(Some(&fake), move |s| sink.borrow_mut().push(s));

        block_on(m.refresh_status());

        let states = seen.borrow();
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].address.as_deref(), Some("0xAbC"));
    }
}
