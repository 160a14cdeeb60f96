//! # Cancellation
//!
//! Every handler takes a [`CancelToken`]. Once the owning [`CancelSource`]
//! fires (or is dropped), pending repository calls are abandoned and the
//! handler returns [`AppError::Cancelled`] without touching the store again.
//!
//! ```text
//! CancelSource ──watch──► CancelToken (clone per request)
//!                             │
//!                             ▼
//!         tokio::select! { biased; cancelled, repository call }
//! ```

use std::future::Future;

use tokio::sync::watch;

use crate::error::{AppError, AppResult};

/// Owner side. Dropping it also cancels every token.
#[derive(Debug)]
pub struct CancelSource {
    tx: watch::Sender<bool>,
}

impl CancelSource {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        CancelSource { tx }
    }

    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: Some(self.tx.subscribe()),
        }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Default for CancelSource {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct CancelToken {
    // None: can never be cancelled
    rx: Option<watch::Receiver<bool>>,
}

impl CancelToken {
    /// A token nobody can cancel.
    pub fn never() -> Self {
        CancelToken { rx: None }
    }

    pub fn is_cancelled(&self) -> bool {
        match &self.rx {
            Some(rx) => *rx.borrow() || rx.has_changed().is_err(),
            None => false,
        }
    }

    pub fn check(&self) -> AppResult<()> {
        if self.is_cancelled() {
            return Err(AppError::Cancelled);
        }
        Ok(())
    }

    /// Resolves once cancellation is requested. Pends forever for
    /// [`CancelToken::never`].
    pub async fn cancelled(&self) {
        let Some(rx) = &self.rx else {
            return std::future::pending().await;
        };
        let mut rx = rx.clone();
        // An Err means the source was dropped.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Runs `fut` unless cancellation wins first.
    pub async fn run<T, E, F>(&self, fut: F) -> AppResult<T>
    where
        F: Future<Output = Result<T, E>>,
        AppError: From<E>,
    {
        self.check()?;
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(AppError::Cancelled),
            result = fut => result.map_err(AppError::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mercado_db::DbError;
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_completes_when_not_cancelled() {
        let source = CancelSource::new();
        let token = source.token();
        let value = token.run(async { Ok::<_, DbError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_cancel_before_start() {
        let source = CancelSource::new();
        let token = source.token();
        source.cancel();

        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(AppError::Cancelled)));
        let result = token.run(async { Ok::<_, DbError>(()) }).await;
        assert!(matches!(result, Err(AppError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancel_during_pending_call() {
        let source = CancelSource::new();
        let token = source.token();

        let task = tokio::spawn(async move {
            token
                .run(async {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok::<_, DbError>(())
                })
                .await
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        source.cancel();

        let result = task.await.unwrap();
        assert!(matches!(result, Err(AppError::Cancelled)));
    }

    #[tokio::test]
    async fn test_dropped_source_cancels() {
        let token = CancelSource::new().token();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_never_token() {
        let token = CancelToken::never();
        assert!(!token.is_cancelled());
        assert_eq!(token.run(async { Ok::<_, DbError>(1) }).await.unwrap(), 1);
    }
}
