//! Mount scope for a view.

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Lifetime of a mounted view.
///
/// Work started through [`ViewScope::run`] yields nothing once the view is
/// unmounted, so a late response never reaches unmounted state. The
/// underlying fetch is not aborted: it still lands in the cache for the
/// next reader. Clones share the scope.
#[derive(Debug, Clone, Default)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `work`, yielding `None` if the view unmounts first.
    pub async fn run<F: Future>(&self, work: F) -> Option<F::Output> {
        if self.token.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            () = self.token.cancelled() => {
                debug!("View unmounted, discarding result");
                None
            }
            output = work => Some(output),
        }
    }

    /// Unmount the view.
    pub fn unmount(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// A scope that unmounts with this one but can also unmount on its own.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_mounted_scope_delivers() {
        let scope = ViewScope::new();
        assert_eq!(scope.run(async { 4 }).await, Some(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_result_is_dropped_after_unmount() {
        let scope = ViewScope::new();
        let unmount = scope.clone();

        let pending = tokio::spawn(async move {
            scope
                .run(async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "orders"
                })
                .await
        });

        tokio::time::sleep(Duration::from_secs(1)).await;
        unmount.unmount();

        assert_eq!(pending.await.ok().flatten(), None);
        assert!(!unmount.is_mounted());
    }

    #[tokio::test]
    async fn test_child_unmounts_with_parent() {
        let parent = ViewScope::new();
        let child = parent.child();
        parent.unmount();
        assert!(!child.is_mounted());
        assert_eq!(child.run(async { 1 }).await, None);
    }
}
