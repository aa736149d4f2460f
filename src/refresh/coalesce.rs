use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::debug;

use super::error::AuthRefreshError;
use super::refresher::TokenRefresher;
use crate::models::RefreshedToken;

type InFlight = Shared<BoxFuture<'static, Result<RefreshedToken, AuthRefreshError>>>;

/// Lets every caller that asks for a refresh while one is already running
/// await that same call instead of starting its own.
pub struct CoalescingRefresher {
    inner: Arc<dyn TokenRefresher>,
    in_flight: Mutex<Option<InFlight>>,
}

impl CoalescingRefresher {
    pub fn new(inner: Arc<dyn TokenRefresher>) -> Self {
        CoalescingRefresher {
            inner,
            in_flight: Mutex::new(None),
        }
    }

    fn join_or_start(&self) -> InFlight {
        let mut slot = self.in_flight.lock().expect("refresh slot mutex poisoned");
        if let Some(pending) = slot.as_ref() {
            debug!("Joining in-flight refresh via '{}'", self.inner.get_name());
            return pending.clone();
        }
        let inner = self.inner.clone();
        let pending = async move { inner.refresh().await }.boxed().shared();
        *slot = Some(pending.clone());
        pending
    }
}

#[async_trait::async_trait]
impl TokenRefresher for CoalescingRefresher {
    fn get_name(&self) -> &str {
        self.inner.get_name()
    }

    async fn refresh(&self) -> Result<RefreshedToken, AuthRefreshError> {
        let pending = self.join_or_start();
        let result = pending.clone().await;

        // The first waiter to finish frees the slot; later 401s start anew.
        let mut slot = self.in_flight.lock().expect("refresh slot mutex poisoned");
        if slot.as_ref().is_some_and(|current| current.ptr_eq(&pending)) {
            *slot = None;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct SlowRefresher {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl TokenRefresher for SlowRefresher {
        fn get_name(&self) -> &str {
            "slow"
        }

        async fn refresh(&self) -> Result<RefreshedToken, AuthRefreshError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(RefreshedToken {
                access_token: format!("token-{call}"),
                roles: Some([1].into_iter().collect()),
                user_id: Some("u".to_string()),
            })
        }
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_refresh() {
        let inner = Arc::new(SlowRefresher {
            calls: AtomicUsize::new(0),
        });
        let refresher = CoalescingRefresher::new(inner.clone());

        let (a, b) = tokio::join!(refresher.refresh(), refresher.refresh());

        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.unwrap().access_token, "token-1");
        assert_eq!(b.unwrap().access_token, "token-1");
    }

    #[tokio::test]
    async fn sequential_callers_refresh_again() {
        let inner = Arc::new(SlowRefresher {
            calls: AtomicUsize::new(0),
        });
        let refresher = CoalescingRefresher::new(inner.clone());

        let first = refresher.refresh().await.unwrap();
        let second = refresher.refresh().await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(first.access_token, "token-1");
        assert_eq!(second.access_token, "token-2");
    }
}
