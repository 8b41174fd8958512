//! Confirming a proposed session

use chrono::{DateTime, Local};
use focuslock_core::{FocusBackend, SessionRequest};
use focuslock_util::{FocusError, Result};

/// Confirm `request` on `backend`.
///
/// A failed start keeps the proposal, and `retry` decides whether to send
/// it again. Declining cancels the proposal and returns the last error.
pub async fn confirm_with_retry(
    request: &mut SessionRequest,
    backend: &dyn FocusBackend,
    mut retry: impl FnMut(&FocusError) -> bool,
) -> Result<DateTime<Local>> {
    loop {
        match request.confirm(backend).await {
            Ok(end) => return Ok(end),
            Err(e) if request.pending().is_some() && retry(&e) => continue,
            Err(e) => {
                if request.pending().is_some() {
                    request.cancel()?;
                }
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focuslock_core::MockBackend;

    #[tokio::test]
    async fn retry_resends_the_same_proposal() {
        let backend = MockBackend::new();
        backend.set_failure(Some(FocusError::store("database is locked")));

        let mut request = SessionRequest::new();
        request.propose(1, 0).unwrap();

        let mut asked = 0;
        let end = confirm_with_retry(&mut request, &backend, |e| {
            asked += 1;
            assert_eq!(*e, FocusError::store("database is locked"));
            backend.set_failure(None);
            true
        })
        .await
        .unwrap();

        assert_eq!(asked, 1);
        assert_eq!(request, SessionRequest::Idle);
        assert_eq!(backend.calls(), vec!["start_session", "start_session"]);
        assert_eq!(backend.get_config().await.unwrap().lock_end_time, Some(end));
    }

    #[tokio::test]
    async fn declining_cancels_the_proposal() {
        let backend = MockBackend::new();
        backend.set_failure(Some(FocusError::ipc("focuslockd is not running")));

        let mut request = SessionRequest::new();
        request.propose(0, 30).unwrap();

        let err = confirm_with_retry(&mut request, &backend, |_| false)
            .await
            .unwrap_err();
        assert_eq!(err, FocusError::ipc("focuslockd is not running"));
        assert_eq!(request, SessionRequest::Idle);
        assert_eq!(backend.calls(), vec!["start_session"]);
    }

    #[tokio::test]
    async fn nothing_proposed_never_asks() {
        let backend = MockBackend::new();
        let mut request = SessionRequest::new();

        let err = confirm_with_retry(&mut request, &backend, |_| panic!("asked to retry"))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(backend.calls().is_empty());
    }
}
