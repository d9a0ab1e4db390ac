//! Checkout state machine and payment-status polling.
//!
//! Orchestrates the user-facing flow: validate the selection, create an
//! invoice, wait for the backend to report payment, then ask the host to
//! close the embedded view. Runs as a `tokio::spawn`ed polling task with a
//! bounded attempt budget, emitting `CheckoutEvent`s through an mpsc
//! channel. The rendering layer receives these and updates the screen.
//!
//! Exactly one checkout session is active at a time. The polling task is
//! owned by the session through its `JoinHandle`, so cancellation is a
//! single explicit call and no timer outlives the session that started it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::interval;

use crate::catalog::CatalogStore;
use crate::core::config;
use crate::host::HostBridge;
use crate::identity::LaunchContext;
use crate::invoice::{Invoice, InvoiceApi, InvoiceStatus};
use crate::pricing::PricingEngine;

/// Checkout flow errors.
///
/// All variants are user-visible except `Cancelled`, which the UI treats
/// as silence (the user asked for the teardown themselves).
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout requested with nothing selected
    #[error("Selection is empty")]
    EmptySelection,

    /// No acting user could be resolved from the launch context
    #[error("Could not determine user identity")]
    IdentityUnavailable,

    /// A session is already creating an invoice or awaiting payment
    #[error("A checkout is already in progress")]
    CheckoutInProgress,

    /// Backend rejected or was unreachable during invoice creation;
    /// carries the backend's message verbatim
    #[error("Invoice creation failed: {0}")]
    InvoiceCreation(String),

    /// Session was cancelled while the invoice request was in flight
    #[error("Checkout was cancelled")]
    Cancelled,
}

/// States of the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutPhase {
    #[default]
    Idle,
    /// Invoice request in flight
    InvoicePending,
    /// Invoice bound, polling for payment
    AwaitingPayment,
    /// Terminal success
    Paid,
    /// Invoice creation failed; checkout may be retried
    Failed,
    /// Payment wait stopped (cancel or poll budget exhausted);
    /// a manual re-check is still possible
    Abandoned,
}

impl CheckoutPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutPhase::Idle => "idle",
            CheckoutPhase::InvoicePending => "invoice_pending",
            CheckoutPhase::AwaitingPayment => "awaiting_payment",
            CheckoutPhase::Paid => "paid",
            CheckoutPhase::Failed => "failed",
            CheckoutPhase::Abandoned => "abandoned",
        }
    }
}

impl std::fmt::Display for CheckoutPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification sent through the mpsc channel to the rendering layer.
#[derive(Debug, Clone)]
pub enum CheckoutEvent {
    /// Invoice created; show the QR and start waiting
    AwaitingPayment { invoice: Invoice },
    /// Backend confirmed payment; the host was asked to close the view
    Paid { invoice_id: String },
    /// Automatic polling stopped without a payment
    Abandoned { invoice_id: String },
    /// Invoice creation failed; message is the backend's text
    Failed { message: String },
}

/// Polling strategy configuration.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Time between status checks
    pub interval: Duration,
    /// Checks before the wait is abandoned
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: config::poll::interval(),
            max_attempts: config::poll::MAX_ATTEMPTS,
        }
    }
}

impl PollConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the poll interval.
    #[must_use]
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the attempt budget.
    #[must_use]
    pub fn max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = max;
        self
    }
}

/// One checkout attempt: a selection snapshot, the computed amount bound
/// into the invoice, and the owned polling task.
#[derive(Debug)]
struct CheckoutSession {
    invoice: Invoice,
    selected: Vec<String>,
    poll_handle: Option<JoinHandle<()>>,
}

impl CheckoutSession {
    fn abort_polling(&mut self) {
        if let Some(handle) = self.poll_handle.take() {
            handle.abort();
        }
    }
}

impl Drop for CheckoutSession {
    // A dropped session must not leave its poll task ticking.
    fn drop(&mut self) {
        self.abort_polling();
    }
}

#[derive(Debug, Default)]
struct Inner {
    phase: CheckoutPhase,
    session: Option<CheckoutSession>,
    /// Bumped on every checkout start and cancel; in-flight work from a
    /// previous epoch discards its result instead of mutating the state.
    epoch: u64,
}

fn lock_inner(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Transition to `Paid` and fire the host close request, exactly once.
///
/// Guarded by phase + epoch under the lock: only the first observer of a
/// PAID status performs the transition, whether it is the polling task or
/// a manual re-check.
fn finish_paid(
    inner: &Mutex<Inner>,
    events: &mpsc::UnboundedSender<CheckoutEvent>,
    host: &dyn HostBridge,
    invoice_id: &str,
    epoch: u64,
) {
    let transitioned = {
        let mut guard = lock_inner(inner);
        if guard.epoch == epoch
            && matches!(guard.phase, CheckoutPhase::AwaitingPayment | CheckoutPhase::Abandoned)
        {
            guard.phase = CheckoutPhase::Paid;
            if let Some(session) = guard.session.as_mut() {
                session.invoice.status = InvoiceStatus::Paid;
                session.abort_polling();
            }
            true
        } else {
            false
        }
    };

    if transitioned {
        log::info!("✅ Invoice {} paid, requesting host close", invoice_id);
        host.request_close();
        let _ = events.send(CheckoutEvent::Paid {
            invoice_id: invoice_id.to_string(),
        });
    }
}

/// Orchestrates the checkout flow.
///
/// Sole owner of the active `CheckoutSession` and its polling task; no
/// other component reads or writes timer state.
#[derive(Clone)]
pub struct CheckoutController {
    api: Arc<dyn InvoiceApi>,
    host: Arc<dyn HostBridge>,
    poll: PollConfig,
    inner: Arc<Mutex<Inner>>,
    events: mpsc::UnboundedSender<CheckoutEvent>,
}

impl CheckoutController {
    /// Creates a controller and the event stream the rendering layer
    /// should consume.
    pub fn new(
        api: Arc<dyn InvoiceApi>,
        host: Arc<dyn HostBridge>,
        poll: PollConfig,
    ) -> (Self, mpsc::UnboundedReceiver<CheckoutEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Self {
            api,
            host,
            poll,
            inner: Arc::new(Mutex::new(Inner::default())),
            events: tx,
        };
        (controller, rx)
    }

    /// Current state of the flow.
    pub fn phase(&self) -> CheckoutPhase {
        lock_inner(&self.inner).phase
    }

    /// Invoice bound to the active session, if any.
    pub fn current_invoice(&self) -> Option<Invoice> {
        lock_inner(&self.inner).session.as_ref().map(|s| s.invoice.clone())
    }

    /// Selection snapshot the active session was created from. The
    /// confirmation screen renders this, not the live selection, so the
    /// summary always matches the invoice amount.
    pub fn current_selection(&self) -> Option<Vec<String>> {
        lock_inner(&self.inner).session.as_ref().map(|s| s.selected.clone())
    }

    /// Starts a checkout for the current selection.
    ///
    /// Guards: the selection must be non-empty and an acting user must be
    /// resolvable; a violation reports a validation error and the state
    /// stays put. While a session is creating an invoice or awaiting
    /// payment, further checkouts are rejected.
    ///
    /// The amount is computed from the live selection immediately before
    /// the backend call and sent for server-side validation.
    pub async fn checkout(
        &self,
        store: &CatalogStore,
        pricing: &PricingEngine,
        launch: &LaunchContext,
    ) -> Result<Invoice, CheckoutError> {
        let selected: Vec<String> = store.selected_ids().to_vec();
        if selected.is_empty() {
            return Err(CheckoutError::EmptySelection);
        }
        let user = launch.resolve().ok_or(CheckoutError::IdentityUnavailable)?;
        let amount = pricing.total(&selected);

        let epoch = {
            let mut guard = lock_inner(&self.inner);
            if matches!(
                guard.phase,
                CheckoutPhase::InvoicePending | CheckoutPhase::AwaitingPayment
            ) {
                return Err(CheckoutError::CheckoutInProgress);
            }
            // Dropping a stale session aborts its poll task, if any.
            guard.session = None;
            guard.phase = CheckoutPhase::InvoicePending;
            guard.epoch += 1;
            guard.epoch
        };

        log::info!(
            "🛒 Checkout started: user={}, {} item(s), amount={}",
            user,
            selected.len(),
            amount
        );

        match self.api.create_invoice(user, &selected, amount).await {
            Ok(invoice) => {
                let mut guard = lock_inner(&self.inner);
                if guard.epoch != epoch || guard.phase != CheckoutPhase::InvoicePending {
                    log::info!(
                        "Checkout cancelled while invoice {} was being created",
                        invoice.invoice_id
                    );
                    return Err(CheckoutError::Cancelled);
                }
                let handle = self.spawn_poll_task(invoice.invoice_id.clone(), epoch);
                guard.session = Some(CheckoutSession {
                    invoice: invoice.clone(),
                    selected,
                    poll_handle: Some(handle),
                });
                guard.phase = CheckoutPhase::AwaitingPayment;
                drop(guard);

                let _ = self.events.send(CheckoutEvent::AwaitingPayment {
                    invoice: invoice.clone(),
                });
                Ok(invoice)
            }
            Err(e) => {
                let message = e.to_string();
                let mut guard = lock_inner(&self.inner);
                if guard.epoch != epoch || guard.phase != CheckoutPhase::InvoicePending {
                    return Err(CheckoutError::Cancelled);
                }
                guard.phase = CheckoutPhase::Failed;
                guard.session = None;
                drop(guard);

                log::warn!("Invoice creation failed: {}", message);
                let _ = self.events.send(CheckoutEvent::Failed {
                    message: message.clone(),
                });
                Err(CheckoutError::InvoiceCreation(message))
            }
        }
    }

    /// One immediate out-of-band status check ("I already paid" or, after
    /// the budget ran out, "check again").
    ///
    /// Does not reset the scheduled polling interval. From `Abandoned`
    /// this issues exactly one more backend call; the session may still
    /// reach `Paid` that way, otherwise it stays abandoned.
    pub async fn check_now(&self) -> Option<InvoiceStatus> {
        let (invoice_id, epoch) = {
            let guard = lock_inner(&self.inner);
            match guard.phase {
                CheckoutPhase::AwaitingPayment | CheckoutPhase::Abandoned => {
                    let id = guard.session.as_ref()?.invoice.invoice_id.clone();
                    (id, guard.epoch)
                }
                _ => return None,
            }
        };

        log::info!("🔍 Manual status check for {}", invoice_id);
        let status = self.api.get_status(&invoice_id).await;
        if matches!(status, Some(InvoiceStatus::Paid)) {
            finish_paid(&self.inner, &self.events, self.host.as_ref(), &invoice_id, epoch);
        }
        status
    }

    /// Deterministic teardown for "user navigated away" or an explicit
    /// cancel action. Stops the polling task immediately; an in-flight
    /// invoice creation discards its result on completion.
    pub fn cancel(&self) {
        let mut guard = lock_inner(&self.inner);
        guard.epoch += 1;
        match guard.phase {
            CheckoutPhase::InvoicePending => {
                guard.phase = CheckoutPhase::Idle;
                guard.session = None;
                log::info!("Checkout cancelled while invoice creation was in flight");
            }
            CheckoutPhase::AwaitingPayment => {
                if let Some(session) = guard.session.as_mut() {
                    session.abort_polling();
                }
                guard.phase = CheckoutPhase::Abandoned;
                let invoice_id = guard.session.as_ref().map(|s| s.invoice.invoice_id.clone());
                drop(guard);

                log::info!("Payment wait cancelled");
                if let Some(invoice_id) = invoice_id {
                    let _ = self.events.send(CheckoutEvent::Abandoned { invoice_id });
                }
            }
            _ => {}
        }
    }

    fn spawn_poll_task(&self, invoice_id: String, epoch: u64) -> JoinHandle<()> {
        let api = Arc::clone(&self.api);
        let host = Arc::clone(&self.host);
        let inner = Arc::clone(&self.inner);
        let events = self.events.clone();
        let cfg = self.poll.clone();

        tokio::spawn(async move {
            let mut ticker = interval(cfg.interval);
            // The first interval tick completes immediately; consume it so
            // the first status check lands one full interval after creation.
            ticker.tick().await;

            log::info!(
                "⏳ Awaiting payment for {} (budget: {} checks every {:?})",
                invoice_id,
                cfg.max_attempts,
                cfg.interval
            );

            for attempt in 1..=cfg.max_attempts {
                ticker.tick().await;
                match api.get_status(&invoice_id).await {
                    Some(InvoiceStatus::Paid) => {
                        finish_paid(&inner, &events, host.as_ref(), &invoice_id, epoch);
                        return;
                    }
                    Some(InvoiceStatus::Pending) => {
                        log::debug!(
                            "Invoice {} still pending (check {}/{})",
                            invoice_id,
                            attempt,
                            cfg.max_attempts
                        );
                    }
                    None => {
                        // Transient backend hiccup; skip the tick, keep waiting.
                        log::debug!(
                            "Status check {}/{} for {} skipped",
                            attempt,
                            cfg.max_attempts,
                            invoice_id
                        );
                    }
                }
            }

            // Budget exhausted without ever observing PAID.
            let abandoned = {
                let mut guard = lock_inner(&inner);
                if guard.epoch == epoch && guard.phase == CheckoutPhase::AwaitingPayment {
                    guard.phase = CheckoutPhase::Abandoned;
                    true
                } else {
                    false
                }
            };
            if abandoned {
                log::warn!(
                    "Payment wait abandoned for {} after {} checks",
                    invoice_id,
                    cfg.max_attempts
                );
                let _ = events.send(CheckoutEvent::Abandoned { invoice_id });
            }
        })
    }
}
