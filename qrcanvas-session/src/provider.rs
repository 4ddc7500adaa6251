//! Async matrix providers.

use std::sync::Arc;

use async_trait::async_trait;
use qrcanvas_core::{EncodingError, ErrorCorrection, QrcodeEncoder, SymbolEncoder, SymbolMatrix};

use crate::scheduler::{run_blocking, Scheduler};

/// Supplies symbol matrices for payloads.
#[async_trait]
pub trait MatrixProvider: Send + Sync {
    /// Encode `payload` at `level`.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError`] when the encoder rejects the payload.
    async fn encode(
        &self,
        payload: &str,
        level: ErrorCorrection,
    ) -> Result<SymbolMatrix, EncodingError>;
}

/// Runs a blocking [`SymbolEncoder`] through a scheduler's blocking path.
pub struct EncoderProvider<E> {
    encoder: Arc<E>,
    scheduler: Arc<dyn Scheduler>,
}

impl<E> EncoderProvider<E> {
    /// Wrap an encoder; blocking encodes run on `scheduler`.
    #[must_use]
    pub fn new(encoder: E, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            encoder: Arc::new(encoder),
            scheduler,
        }
    }
}

impl EncoderProvider<QrcodeEncoder> {
    /// The `qrcode`-backed encoder.
    #[must_use]
    pub fn qrcode(scheduler: Arc<dyn Scheduler>) -> Self {
        Self::new(QrcodeEncoder::new(), scheduler)
    }
}

impl<E> Clone for EncoderProvider<E> {
    fn clone(&self) -> Self {
        Self {
            encoder: Arc::clone(&self.encoder),
            scheduler: Arc::clone(&self.scheduler),
        }
    }
}

#[async_trait]
impl<E> MatrixProvider for EncoderProvider<E>
where
    E: SymbolEncoder + 'static,
{
    async fn encode(
        &self,
        payload: &str,
        level: ErrorCorrection,
    ) -> Result<SymbolMatrix, EncodingError> {
        let encoder = Arc::clone(&self.encoder);
        let payload = payload.to_owned();
        run_blocking(self.scheduler.as_ref(), move || encoder.encode(&payload, level))
            .await
            .unwrap_or_else(|| Err(EncodingError::Rejected("encoder task failed".to_string())))
    }
}
