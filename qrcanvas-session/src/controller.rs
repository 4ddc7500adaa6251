//! Regeneration controller.
//!
//! State machine `idle → generating → {ready | error}`. Every payload change
//! re-enters `generating` with a fresh generation id; a completion is applied
//! only if its id is still the latest issued. Superseded completions are
//! dropped silently, so the displayed matrix always belongs to the last
//! payload submitted, whatever order the encodings finish in.

use std::sync::Arc;

use qrcanvas_core::{EncodingError, ErrorCorrection, SymbolMatrix};
use tokio::sync::watch;

use crate::provider::MatrixProvider;
use crate::scheduler::Scheduler;

/// Monotonic id of a generation request.
pub type GenerationId = u64;

/// What the controller currently displays.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderStatus {
    /// Nothing submitted yet, or reset.
    Idle,
    /// Waiting for the latest request.
    Generating,
    /// The latest request produced this matrix.
    Ready(Arc<SymbolMatrix>),
    /// The latest request was rejected; no matrix is shown.
    Error(EncodingError),
}

impl RenderStatus {
    /// Short lowercase name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Generating => "generating",
            Self::Ready(_) => "ready",
            Self::Error(_) => "error",
        }
    }

    /// Whether the latest request has finished (or none was made).
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Generating)
    }
}

/// Snapshot published to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    /// Latest generation id issued.
    pub generation: GenerationId,
    /// Current status.
    pub status: RenderStatus,
}

impl ControllerState {
    /// The displayed matrix, only when ready.
    #[must_use]
    pub fn matrix(&self) -> Option<Arc<SymbolMatrix>> {
        match &self.status {
            RenderStatus::Ready(matrix) => Some(Arc::clone(matrix)),
            _ => None,
        }
    }
}

/// Result of delivering a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The completion was the latest and is now displayed.
    Applied,
    /// The generation was superseded, reset, or already settled; the
    /// result was dropped.
    Stale {
        /// Generation that was completing.
        generation: GenerationId,
        /// Latest generation at the time.
        latest: GenerationId,
    },
}

/// Re-invokes the matrix provider on payload change.
#[derive(Clone)]
pub struct RegenerationController {
    provider: Arc<dyn MatrixProvider>,
    scheduler: Arc<dyn Scheduler>,
    state_tx: Arc<watch::Sender<ControllerState>>,
    level: ErrorCorrection,
}

impl RegenerationController {
    /// Create an idle controller.
    #[must_use]
    pub fn new(
        provider: Arc<dyn MatrixProvider>,
        scheduler: Arc<dyn Scheduler>,
        level: ErrorCorrection,
    ) -> Self {
        let (state_tx, _) = watch::channel(ControllerState {
            generation: 0,
            status: RenderStatus::Idle,
        });
        Self {
            provider,
            scheduler,
            state_tx: Arc::new(state_tx),
            level,
        }
    }

    /// Error-correction level used for new requests.
    #[must_use]
    pub fn error_correction(&self) -> ErrorCorrection {
        self.level
    }

    /// Change the level for subsequent requests. In-flight requests keep theirs.
    pub fn set_error_correction(&mut self, level: ErrorCorrection) {
        self.level = level;
    }

    /// Submit a payload. Returns immediately with the new generation id.
    #[tracing::instrument(name = "submit_payload", skip(self, payload), fields(bytes = payload.len()))]
    pub fn submit(&self, payload: &str) -> GenerationId {
        let mut generation = 0;
        self.state_tx.send_modify(|state| {
            state.generation += 1;
            state.status = RenderStatus::Generating;
            generation = state.generation;
        });
        tracing::debug!(generation, level = %self.level, "Issued regeneration");

        let provider = Arc::clone(&self.provider);
        let state_tx = Arc::clone(&self.state_tx);
        let level = self.level;
        let payload = payload.to_owned();
        self.scheduler.spawn(Box::pin(async move {
            let result = provider.encode(&payload, level).await;
            apply_completion(&state_tx, generation, result);
        }));

        generation
    }

    /// Return to idle. In-flight requests become stale.
    pub fn reset(&self) {
        self.state_tx.send_modify(|state| {
            state.generation += 1;
            state.status = RenderStatus::Idle;
        });
        tracing::debug!("Controller reset");
    }

    /// Deliver a completion for `generation`.
    ///
    /// Scheduled tasks call this themselves; it is public so callers driving a
    /// custom provider can complete requests directly.
    pub fn complete(
        &self,
        generation: GenerationId,
        result: Result<SymbolMatrix, EncodingError>,
    ) -> Completion {
        apply_completion(&self.state_tx, generation, result)
    }

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> ControllerState {
        self.state_tx.borrow().clone()
    }

    /// The displayed matrix, if ready.
    #[must_use]
    pub fn current_matrix(&self) -> Option<Arc<SymbolMatrix>> {
        self.state_tx.borrow().matrix()
    }

    /// Observe state transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.state_tx.subscribe()
    }

    /// Wait until the latest request settles into ready, error or idle.
    pub async fn wait_settled(&self) -> ControllerState {
        let mut rx = self.state_tx.subscribe();
        loop {
            {
                let state = rx.borrow_and_update();
                if state.status.is_settled() {
                    return state.clone();
                }
            }
            if rx.changed().await.is_err() {
                return self.state();
            }
        }
    }
}

/// Apply `result` if `generation` is the latest and still pending; otherwise drop it.
fn apply_completion(
    state_tx: &watch::Sender<ControllerState>,
    generation: GenerationId,
    result: Result<SymbolMatrix, EncodingError>,
) -> Completion {
    let mut outcome = Completion::Applied;
    state_tx.send_if_modified(|state| {
        // Only the request currently being waited on may settle the state.
        if state.generation != generation
            || !matches!(state.status, RenderStatus::Generating)
        {
            outcome = Completion::Stale {
                generation,
                latest: state.generation,
            };
            return false;
        }
        state.status = match result {
            Ok(matrix) => RenderStatus::Ready(Arc::new(matrix)),
            Err(err) => RenderStatus::Error(err),
        };
        true
    });

    match outcome {
        Completion::Applied => {
            let status = state_tx.borrow().status.name();
            tracing::debug!(generation, status, "Applied generation");
        }
        Completion::Stale { latest, .. } => {
            tracing::debug!(generation, latest, "Dropped stale generation");
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::scheduler::ManualScheduler;

    /// Encodes a payload as an all-dark matrix sized by its length; "bad" is rejected.
    struct EchoProvider;

    #[async_trait]
    impl MatrixProvider for EchoProvider {
        async fn encode(
            &self,
            payload: &str,
            _level: ErrorCorrection,
        ) -> Result<SymbolMatrix, EncodingError> {
            if payload == "bad" {
                return Err(EncodingError::Rejected("bad payload".to_string()));
            }
            let size = payload.len().max(1);
            SymbolMatrix::from_modules(size, vec![true; size * size])
                .map_err(|e| EncodingError::Rejected(e.to_string()))
        }
    }

    fn controller() -> (RegenerationController, Arc<ManualScheduler>) {
        let scheduler = Arc::new(ManualScheduler::new());
        let controller = RegenerationController::new(
            Arc::new(EchoProvider),
            Arc::clone(&scheduler) as Arc<dyn Scheduler>,
            ErrorCorrection::Medium,
        );
        (controller, scheduler)
    }

    #[tokio::test]
    async fn test_idle_to_ready() {
        let (controller, scheduler) = controller();
        assert_eq!(controller.state().status, RenderStatus::Idle);

        let generation = controller.submit("abc");
        assert_eq!(generation, 1);
        assert_eq!(controller.state().status, RenderStatus::Generating);
        assert!(controller.current_matrix().is_none());

        scheduler.run_all().await;
        let matrix = controller.current_matrix().expect("ready");
        assert_eq!(matrix.size(), 3);
    }

    #[tokio::test]
    async fn test_submit_does_not_block() {
        let (controller, scheduler) = controller();
        controller.submit("a");
        controller.submit("ab");
        assert_eq!(scheduler.pending(), 2);
        assert_eq!(controller.state().generation, 2);
    }

    #[tokio::test]
    async fn test_last_submitted_wins_when_completed_out_of_order() {
        let (controller, scheduler) = controller();
        controller.submit("aaaa");
        controller.submit("bb");

        // B finishes first, then A.
        assert!(scheduler.run_last().await);
        assert_eq!(controller.current_matrix().expect("ready").size(), 2);
        assert!(scheduler.run_next().await);
        assert_eq!(controller.current_matrix().expect("still B").size(), 2);
    }

    #[tokio::test]
    async fn test_stale_completion_reported() {
        let (controller, _scheduler) = controller();
        let first = controller.submit("a");
        let second = controller.submit("bb");

        let matrix = SymbolMatrix::from_modules(1, vec![true]).expect("matrix");
        assert_eq!(
            controller.complete(first, Ok(matrix)),
            Completion::Stale {
                generation: first,
                latest: second,
            }
        );
        assert_eq!(controller.state().status, RenderStatus::Generating);
    }

    #[test]
    fn test_completion_only_settles_a_pending_request() {
        let (controller, _scheduler) = controller();
        let matrix = || SymbolMatrix::from_modules(1, vec![true]).expect("matrix");

        // Nothing pending on a fresh controller.
        assert!(matches!(
            controller.complete(0, Ok(matrix())),
            Completion::Stale { .. }
        ));
        assert_eq!(controller.state().status, RenderStatus::Idle);

        // Reset leaves nothing pending either.
        controller.submit("a");
        controller.reset();
        let latest = controller.state().generation;
        assert!(matches!(
            controller.complete(latest, Ok(matrix())),
            Completion::Stale { .. }
        ));
        assert_eq!(controller.state().status, RenderStatus::Idle);

        // A settled generation cannot be completed twice.
        let generation = controller.submit("b");
        assert_eq!(controller.complete(generation, Ok(matrix())), Completion::Applied);
        assert!(matches!(
            controller.complete(
                generation,
                Err(EncodingError::Rejected("late".to_string()))
            ),
            Completion::Stale { .. }
        ));
        assert!(controller.current_matrix().is_some());
    }

    #[tokio::test]
    async fn test_error_clears_matrix() {
        let (controller, scheduler) = controller();
        controller.submit("ok");
        scheduler.run_all().await;
        assert!(controller.current_matrix().is_some());

        controller.submit("bad");
        scheduler.run_all().await;
        assert!(controller.current_matrix().is_none());
        assert!(matches!(controller.state().status, RenderStatus::Error(_)));
    }

    #[tokio::test]
    async fn test_reset_invalidates_in_flight() {
        let (controller, scheduler) = controller();
        controller.submit("abc");
        controller.reset();
        scheduler.run_all().await;
        assert_eq!(controller.state().status, RenderStatus::Idle);
        assert_eq!(controller.state().generation, 2);
    }

    #[tokio::test]
    async fn test_subscribers_observe_transitions() {
        let (controller, scheduler) = controller();
        let mut rx = controller.subscribe();

        controller.submit("xy");
        assert!(rx.has_changed().expect("sender alive"));
        assert_eq!(rx.borrow_and_update().status.name(), "generating");

        scheduler.run_all().await;
        assert!(rx.has_changed().expect("sender alive"));
        assert_eq!(rx.borrow_and_update().status.name(), "ready");
    }

    #[tokio::test]
    async fn test_stale_completion_does_not_notify() {
        let (controller, scheduler) = controller();
        controller.submit("a");
        controller.submit("b");
        let mut rx = controller.subscribe();
        rx.borrow_and_update();

        // Run the superseded request only.
        assert!(scheduler.run_next().await);
        assert!(!rx.has_changed().expect("sender alive"));
    }

    #[tokio::test]
    async fn test_wait_settled_returns_latest() {
        let (controller, scheduler) = controller();
        controller.submit("abcde");
        let waiter = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.wait_settled().await })
        };
        scheduler.run_all().await;
        let state = waiter.await.expect("join");
        assert_eq!(state.matrix().expect("ready").size(), 5);
    }
}
