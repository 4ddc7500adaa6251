//! Rendering session.
//!
//! Ties together the regeneration controller, the active render config and the
//! selected logo. Matrix generation and logo decoding run independently on the
//! session's scheduler; [`RenderSession::draw`] composes whichever matrix and
//! logo are currently valid.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use qrcanvas_core::{LogoSource, RenderConfig};
use qrcanvas_renderer::{compose, load_logo, render_to_svg, LogoImage, QrGraphic};
use tokio::sync::watch;

use crate::controller::{ControllerState, GenerationId, RegenerationController};
use crate::error::{SessionError, SessionResult};
use crate::logo_store::{LogoHandle, LogoStore};
use crate::provider::{EncoderProvider, MatrixProvider};
use crate::scheduler::{run_blocking, Scheduler, TokioScheduler};

/// Loading state of the selected logo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoStatus {
    /// No logo selected.
    None,
    /// Decoding in progress.
    Loading,
    /// Decoded and drawn with the symbol.
    Ready,
    /// Decoding failed; the symbol is drawn without a logo.
    Failed(String),
}

impl LogoStatus {
    /// Whether decoding has finished (or nothing is selected).
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Loading)
    }
}

/// The currently selected logo.
#[derive(Debug, Default)]
struct LogoSlot {
    /// Bumped on every select or clear; stale decodes compare against it.
    seq: u64,
    handle: Option<LogoHandle>,
    image: Option<Arc<LogoImage>>,
}

type SharedSlot = Arc<Mutex<LogoSlot>>;

fn lock_slot(slot: &SharedSlot) -> MutexGuard<'_, LogoSlot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One styled symbol being edited.
pub struct RenderSession {
    controller: RegenerationController,
    scheduler: Arc<dyn Scheduler>,
    config: RenderConfig,
    store: LogoStore,
    last_payload: Option<String>,
    logo: SharedSlot,
    logo_tx: Arc<watch::Sender<LogoStatus>>,
    closed: bool,
}

impl RenderSession {
    /// Create a session. Starts loading `config.logo` if one is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(
        config: RenderConfig,
        provider: Arc<dyn MatrixProvider>,
        scheduler: Arc<dyn Scheduler>,
    ) -> SessionResult<Self> {
        config.validate()?;
        let controller =
            RegenerationController::new(provider, Arc::clone(&scheduler), config.error_correction);
        let (logo_tx, _) = watch::channel(LogoStatus::None);
        let initial_logo = config.logo.clone();

        let mut session = Self {
            controller,
            scheduler,
            config,
            store: LogoStore::new(),
            last_payload: None,
            logo: SharedSlot::default(),
            logo_tx: Arc::new(logo_tx),
            closed: false,
        };
        if let Some(source) = initial_logo {
            session.select_logo(source)?;
        }
        Ok(session)
    }

    /// Create a session using the `qrcode` encoder on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error outside a tokio runtime or if the configuration is invalid.
    pub fn with_default_encoder(config: RenderConfig) -> SessionResult<Self> {
        let scheduler: Arc<dyn Scheduler> = Arc::new(TokioScheduler::try_current()?);
        Self::new(
            config,
            Arc::new(EncoderProvider::qrcode(Arc::clone(&scheduler))),
            scheduler,
        )
    }

    fn ensure_open(&self) -> SessionResult<()> {
        if self.closed {
            Err(SessionError::Closed)
        } else {
            Ok(())
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Store tracking this session's logo handles.
    #[must_use]
    pub fn logo_store(&self) -> &LogoStore {
        &self.store
    }

    /// Last payload submitted.
    #[must_use]
    pub fn payload(&self) -> Option<&str> {
        self.last_payload.as_deref()
    }

    /// Submit a new payload. Returns without waiting for the encoder.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] after [`close`](Self::close).
    #[tracing::instrument(skip(self, payload), fields(bytes = payload.len()))]
    pub fn set_payload(&mut self, payload: &str) -> SessionResult<GenerationId> {
        self.ensure_open()?;
        self.last_payload = Some(payload.to_owned());
        Ok(self.controller.submit(payload))
    }

    /// Replace the configuration.
    ///
    /// A changed error-correction level re-encodes the last payload; a changed
    /// logo source reselects (or clears) the logo.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is closed or the configuration is invalid.
    #[tracing::instrument(skip_all, fields(size = config.target_pixel_size, style = %config.style))]
    pub fn set_config(&mut self, config: RenderConfig) -> SessionResult<()> {
        self.ensure_open()?;
        config.validate()?;

        let level_changed = config.error_correction != self.config.error_correction;
        let logo_changed = config.logo != self.config.logo;
        let new_logo = config.logo.clone();
        self.config = config;

        if level_changed {
            self.controller
                .set_error_correction(self.config.error_correction);
            if let Some(payload) = self.last_payload.clone() {
                tracing::debug!(level = %self.config.error_correction, "Re-encoding for new level");
                self.controller.submit(&payload);
            }
        }
        if logo_changed {
            match new_logo {
                Some(source) => self.select_logo(source)?,
                None => self.clear_logo(),
            }
        }
        Ok(())
    }

    /// Select a logo. The previous logo's handle is released immediately and
    /// the new one is decoded in the background.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] after [`close`](Self::close).
    #[tracing::instrument(skip_all, fields(source = %source.describe()))]
    pub fn select_logo(&mut self, source: LogoSource) -> SessionResult<()> {
        self.ensure_open()?;

        let seq = {
            let mut slot = lock_slot(&self.logo);
            slot.seq += 1;
            slot.image = None;
            // Replacing the handle drops, and so releases, the previous one.
            slot.handle = Some(self.store.acquire(&source));
            self.logo_tx.send_replace(LogoStatus::Loading);
            slot.seq
        };

        let slot = Arc::clone(&self.logo);
        let logo_tx = Arc::clone(&self.logo_tx);
        let scheduler = Arc::clone(&self.scheduler);
        self.scheduler.spawn(Box::pin(async move {
            let decoded = match run_blocking(scheduler.as_ref(), move || load_logo(&source)).await {
                Some(result) => result.map_err(|e| e.to_string()),
                None => Err("logo task failed".to_string()),
            };
            apply_logo(&slot, &logo_tx, seq, decoded);
        }));
        Ok(())
    }

    /// Remove the logo and release its handle.
    pub fn clear_logo(&mut self) {
        self.release_logo();
    }

    fn release_logo(&self) {
        let mut slot = lock_slot(&self.logo);
        slot.seq += 1;
        slot.image = None;
        if let Some(handle) = slot.handle.take() {
            handle.release();
        }
        self.logo_tx.send_replace(LogoStatus::None);
    }

    /// Current controller snapshot.
    #[must_use]
    pub fn status(&self) -> ControllerState {
        self.controller.state()
    }

    /// Observe controller transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.controller.subscribe()
    }

    /// Current logo status.
    #[must_use]
    pub fn logo_status(&self) -> LogoStatus {
        self.logo_tx.borrow().clone()
    }

    /// Observe logo transitions.
    #[must_use]
    pub fn subscribe_logo(&self) -> watch::Receiver<LogoStatus> {
        self.logo_tx.subscribe()
    }

    /// Compose the current matrix and logo.
    ///
    /// Returns `Ok(None)` unless the controller is ready.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is closed or composition fails.
    pub fn draw(&self) -> SessionResult<Option<QrGraphic>> {
        self.ensure_open()?;
        let Some(matrix) = self.controller.current_matrix() else {
            return Ok(None);
        };
        let logo = lock_slot(&self.logo).image.clone();
        let graphic = compose(&matrix, &self.config, logo)?;
        Ok(Some(graphic))
    }

    /// Compose and serialize to SVG.
    ///
    /// # Errors
    ///
    /// Same as [`draw`](Self::draw).
    pub fn draw_svg(&self) -> SessionResult<Option<String>> {
        Ok(self.draw()?.as_ref().map(render_to_svg))
    }

    /// Wait for the latest payload to settle.
    pub async fn wait_ready(&self) -> ControllerState {
        self.controller.wait_settled().await
    }

    /// Wait for the selected logo to finish decoding.
    pub async fn wait_logo_settled(&self) -> LogoStatus {
        let mut rx = self.logo_tx.subscribe();
        loop {
            {
                let status = rx.borrow_and_update();
                if status.is_settled() {
                    return status.clone();
                }
            }
            if rx.changed().await.is_err() {
                return self.logo_status();
            }
        }
    }

    /// End the session: drop in-flight results and release the logo handle.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.controller.reset();
        self.release_logo();
        tracing::debug!("Session closed");
    }

    /// Whether [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for RenderSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Apply a decode result if `seq` is still the selected logo.
fn apply_logo(
    slot: &SharedSlot,
    logo_tx: &watch::Sender<LogoStatus>,
    seq: u64,
    decoded: Result<LogoImage, String>,
) {
    let mut slot = lock_slot(slot);
    if slot.seq != seq {
        tracing::debug!(seq, latest = slot.seq, "Dropped stale logo decode");
        return;
    }
    match decoded {
        Ok(image) => {
            tracing::debug!(
                width = image.width,
                height = image.height,
                "Logo decoded"
            );
            slot.image = Some(Arc::new(image));
            logo_tx.send_replace(LogoStatus::Ready);
        }
        Err(reason) => {
            tracing::warn!(%reason, "Logo failed to load, drawing without it");
            if let Some(handle) = slot.handle.take() {
                handle.release();
            }
            logo_tx.send_replace(LogoStatus::Failed(reason));
        }
    }
}

#[cfg(test)]
mod tests {
    use qrcanvas_core::ModuleStyle;

    use super::*;
    use crate::scheduler::ManualScheduler;

    fn session() -> (RenderSession, Arc<ManualScheduler>) {
        let scheduler = Arc::new(ManualScheduler::new());
        let shared: Arc<dyn Scheduler> = Arc::clone(&scheduler) as Arc<dyn Scheduler>;
        let session = RenderSession::new(
            RenderConfig::new(180, ModuleStyle::Dot),
            Arc::new(EncoderProvider::qrcode(Arc::clone(&shared))),
            shared,
        )
        .expect("valid config");
        (session, scheduler)
    }

    #[tokio::test]
    async fn test_draw_before_ready_is_empty() {
        let (mut session, scheduler) = session();
        assert!(session.draw().expect("open").is_none());

        session.set_payload("hello").expect("open");
        assert!(session.draw().expect("open").is_none());

        scheduler.run_all().await;
        let graphic = session.draw().expect("open").expect("ready");
        assert_eq!(graphic.size, 180);
        assert!(graphic.logo.is_none());
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let scheduler: Arc<dyn Scheduler> = Arc::new(ManualScheduler::new());
        let result = RenderSession::new(
            RenderConfig::new(0, ModuleStyle::Square),
            Arc::new(EncoderProvider::qrcode(Arc::clone(&scheduler))),
            scheduler,
        );
        assert!(matches!(result, Err(SessionError::Config(_))));
    }

    #[tokio::test]
    async fn test_closed_session_rejects_calls() {
        let (mut session, _scheduler) = session();
        session.close();
        assert!(session.is_closed());
        assert!(matches!(
            session.set_payload("x"),
            Err(SessionError::Closed)
        ));
        assert!(matches!(session.draw(), Err(SessionError::Closed)));
    }

    #[tokio::test]
    async fn test_level_change_reencodes_last_payload() {
        let (mut session, scheduler) = session();
        session.set_payload("level").expect("open");
        scheduler.run_all().await;
        let before = session.status().generation;

        let mut config = session.config().clone();
        config.error_correction = qrcanvas_core::ErrorCorrection::High;
        session.set_config(config).expect("valid");
        assert_eq!(session.status().generation, before + 1);
        assert_eq!(scheduler.pending(), 1);
    }

    #[tokio::test]
    async fn test_style_change_does_not_reencode() {
        let (mut session, scheduler) = session();
        session.set_payload("style").expect("open");
        scheduler.run_all().await;

        let mut config = session.config().clone();
        config.style = ModuleStyle::Diamond;
        session.set_config(config).expect("valid");
        assert_eq!(scheduler.pending(), 0);
        assert!(session.draw().expect("open").is_some());
    }

    #[tokio::test]
    async fn test_clear_logo_releases_handle() {
        let (mut session, _scheduler) = session();
        session
            .select_logo(LogoSource::Bytes(vec![0, 1, 2]))
            .expect("open");
        assert_eq!(session.logo_store().live_count(), 1);
        assert_eq!(session.logo_status(), LogoStatus::Loading);

        session.clear_logo();
        assert_eq!(session.logo_store().live_count(), 0);
        assert_eq!(session.logo_status(), LogoStatus::None);
    }

    #[test]
    fn test_manual_session_runs_without_runtime() {
        let (mut session, scheduler) = session();
        session.set_payload("no runtime").expect("open");
        session
            .select_logo(LogoSource::Bytes(b"not an image".to_vec()))
            .expect("open");

        futures::executor::block_on(scheduler.run_all());
        assert!(session.draw().expect("open").is_some());
        assert!(matches!(session.logo_status(), LogoStatus::Failed(_)));
    }
}
