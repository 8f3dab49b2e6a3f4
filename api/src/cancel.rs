//! Cancellation contract shared by every backend call.

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;

use futures::future::{AbortHandle, Abortable, Aborted};

/// Cooperative cancellation scope.
///
/// Clones share one scope. Every future run through [`CancelToken::run`] is
/// aborted when the scope is cancelled, including futures registered after the
/// cancellation (they resolve to `Err(Aborted)` on first poll).
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Rc<RefCell<Scope>>,
}

#[derive(Debug, Default)]
struct Scope {
    cancelled: bool,
    next_id: u64,
    handles: HashMap<u64, AbortHandle>,
}

/// Drops a run's handle from the scope once the run finishes or is dropped.
struct Registration {
    scope: Rc<RefCell<Scope>>,
    id: u64,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.scope.borrow_mut().handles.remove(&self.id);
    }
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let handles = {
            let mut scope = self.inner.borrow_mut();
            if scope.cancelled {
                return;
            }
            scope.cancelled = true;
            std::mem::take(&mut scope.handles)
        };
        for handle in handles.into_values() {
            handle.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.borrow().cancelled
    }

    pub async fn run<F: Future>(&self, future: F) -> Result<F::Output, Aborted> {
        let (handle, registration) = AbortHandle::new_pair();
        let _registered = {
            let mut scope = self.inner.borrow_mut();
            if scope.cancelled {
                handle.abort();
                None
            } else {
                let id = scope.next_id;
                scope.next_id += 1;
                scope.handles.insert(id, handle);
                Some(Registration {
                    scope: Rc::clone(&self.inner),
                    id,
                })
            }
        };
        Abortable::new(future, registration).await
    }

    #[cfg(test)]
    fn live_runs(&self) -> usize {
        self.inner.borrow().handles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::future::pending;

    #[test]
    fn completes_when_not_cancelled() {
        let token = CancelToken::new();
        assert_eq!(block_on(token.run(async { 7 })), Ok(7));
    }

    #[test]
    fn futures_registered_after_cancel_abort_immediately() {
        let token = CancelToken::new();
        token.cancel();
        assert!(token.is_cancelled());
        assert_eq!(block_on(token.run(pending::<()>())), Err(Aborted));
    }

    #[test]
    fn cancel_reaches_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        let pending_run = clone.run(pending::<()>());
        futures::pin_mut!(pending_run);

        let waker = futures::task::noop_waker();
        let mut cx = std::task::Context::from_waker(&waker);
        assert!(pending_run.as_mut().poll(&mut cx).is_pending());

        token.cancel();
        assert_eq!(
            pending_run.as_mut().poll(&mut cx),
            std::task::Poll::Ready(Err(Aborted))
        );
    }

    #[test]
    fn finished_runs_leave_the_scope() {
        let token = CancelToken::new();
        for i in 0..1000 {
            assert_eq!(block_on(token.run(async move { i })), Ok(i));
        }
        assert_eq!(token.live_runs(), 0);
    }

    #[test]
    fn dropped_runs_leave_the_scope() {
        let token = CancelToken::new();
        let mut run = Box::pin(token.run(pending::<()>()));

        let waker = futures::task::noop_waker();
        let mut cx = std::task::Context::from_waker(&waker);
        assert!(run.as_mut().poll(&mut cx).is_pending());
        assert_eq!(token.live_runs(), 1);

        drop(run);
        assert_eq!(token.live_runs(), 0);
    }
}
