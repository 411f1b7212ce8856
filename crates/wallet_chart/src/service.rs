//! ChartLoadingService — owns the load state of one metric chart.
//!
//! [`ChartLoadingService`] is created for a fixed currency and fetcher. Each
//! [`update_chart_type`](ChartLoadingService::update_chart_type) call cancels
//! the fetch in flight, publishes [`LoadState::Loading`] and starts a new
//! fetch on the runtime. Every fetch is tagged with a generation number; a
//! result is published only while its generation is still the newest one, so
//! a superseded fetch can never overwrite a newer state even if aborting its
//! task comes too late.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};
use wallet_core::{Clearable, Currency};

use crate::error::{FetchError, ServiceError};
use crate::fetcher::ChartDataFetcher;
use crate::model::{ChartState, ChartType, LoadState};
use crate::subject::{StateReceiver, StateSubject};

/// Bookkeeping for the single fetch this service may have in flight.
#[derive(Default)]
struct InFlight {
    generation: u64,
    task: Option<JoinHandle<()>>,
    cleared: bool,
}

/// State shared between the service and its fetch tasks.
struct Shared {
    in_flight: Mutex<InFlight>,
    subject: StateSubject<ChartState>,
}

impl Shared {
    /// Publish the outcome of fetch `generation` unless it has been
    /// superseded or the service was cleared.
    fn publish_result(&self, generation: u64, state: ChartState) -> bool {
        let mut in_flight = self.in_flight.lock();
        if in_flight.cleared || in_flight.generation != generation {
            trace!(
                generation,
                current = in_flight.generation,
                "Dropping superseded chart result"
            );
            return false;
        }
        // The task is finishing; detach its handle instead of aborting it.
        in_flight.task = None;
        self.subject.publish(state)
    }
}

/// Text of a panic payload raised by a fetcher.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Loads chart points for one currency and exposes the progress as a
/// replaying state stream.
pub struct ChartLoadingService {
    currency: Currency,
    fetcher: Arc<dyn ChartDataFetcher>,
    runtime: Handle,
    shared: Arc<Shared>,
}

impl ChartLoadingService {
    /// Create a service that runs its fetches on the current tokio runtime.
    pub fn new(
        currency: Currency,
        fetcher: Arc<dyn ChartDataFetcher>,
    ) -> Result<Self, ServiceError> {
        let runtime = Handle::try_current().map_err(|_| ServiceError::NoRuntime)?;
        Ok(Self::with_handle(currency, fetcher, runtime))
    }

    /// Create a service that runs its fetches on `runtime`.
    pub fn with_handle(
        currency: Currency,
        fetcher: Arc<dyn ChartDataFetcher>,
        runtime: Handle,
    ) -> Self {
        Self {
            currency,
            fetcher,
            runtime,
            shared: Arc::new(Shared {
                in_flight: Mutex::new(InFlight::default()),
                subject: StateSubject::new(LoadState::Loading),
            }),
        }
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn chart_types(&self) -> Vec<ChartType> {
        self.fetcher.chart_types()
    }

    pub fn title(&self) -> String {
        self.fetcher.title()
    }

    /// The most recently published state.
    pub fn state(&self) -> ChartState {
        self.shared.subject.current()
    }

    /// Subscribe to state changes; the current state is delivered first.
    pub fn subscribe(&self) -> StateReceiver<ChartState> {
        self.shared.subject.subscribe()
    }

    /// Whether a fetch started by this service has not reported back yet.
    pub fn is_fetching(&self) -> bool {
        self.shared.in_flight.lock().task.is_some()
    }

    /// Cancel the fetch in flight, publish `Loading` and start fetching
    /// `chart_type`. Returns without waiting for the fetch.
    ///
    /// Ignored after [`clear`](Self::clear).
    pub fn update_chart_type(&self, chart_type: ChartType) {
        let mut in_flight = self.shared.in_flight.lock();
        if in_flight.cleared {
            debug!(%chart_type, "Chart service already cleared; ignoring update");
            return;
        }

        if let Some(task) = in_flight.task.take() {
            task.abort();
        }
        in_flight.generation += 1;
        let generation = in_flight.generation;

        self.shared.subject.publish(LoadState::Loading);

        debug!(
            currency = %self.currency.code,
            %chart_type,
            generation,
            "Fetching chart"
        );

        let fetcher = Arc::clone(&self.fetcher);
        let shared = Arc::clone(&self.shared);
        let currency_code = self.currency.code.clone();

        // Spawned while the lock is held: the task cannot publish before its
        // handle is recorded.
        let task = self.runtime.spawn(async move {
            let outcome = AssertUnwindSafe(fetcher.fetch(&currency_code, chart_type))
                .catch_unwind()
                .await;
            let state = match outcome {
                Ok(Ok(points)) => LoadState::Success((chart_type, points)),
                Ok(Err(e)) => {
                    debug!(%chart_type, generation, "Chart fetch failed: {e}");
                    LoadState::Error(e)
                }
                Err(payload) => {
                    let msg = panic_message(payload.as_ref());
                    warn!(%chart_type, generation, "Chart fetcher panicked: {msg}");
                    LoadState::Error(FetchError::Other(format!("fetcher panicked: {msg}")))
                }
            };
            shared.publish_result(generation, state);
        });
        in_flight.task = Some(task);
    }

    /// Cancel the fetch in flight and end every subscriber stream.
    /// Idempotent.
    pub fn clear(&self) {
        let mut in_flight = self.shared.in_flight.lock();
        if in_flight.cleared {
            return;
        }
        in_flight.cleared = true;
        if let Some(task) = in_flight.task.take() {
            task.abort();
        }
        self.shared.subject.complete();
        debug!(currency = %self.currency.code, "Chart service cleared");
    }

    pub fn is_cleared(&self) -> bool {
        self.shared.in_flight.lock().cleared
    }
}

impl Clearable for ChartLoadingService {
    fn clear(&self) {
        ChartLoadingService::clear(self);
    }
}

impl Drop for ChartLoadingService {
    fn drop(&mut self) {
        self.clear();
    }
}
