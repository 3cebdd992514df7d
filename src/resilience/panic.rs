//! Panic isolation for request futures.
//!
//! A panic hook is installed once per process. Panics raised on a thread
//! while an isolation scope is being polled there have their backtrace
//! stashed for the catching scope instead of being printed. Every other panic
//! goes to the hook that was installed before.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Once;
use std::task::{Context, Poll};

use futures_util::FutureExt;

/// Upper bound on a captured backtrace, in bytes.
pub const MAX_TRACE_BYTES: usize = 16 * 1024;

static INSTALL_HOOK: Once = Once::new();

thread_local! {
    static SCOPE_DEPTH: Cell<usize> = const { Cell::new(0) };
    static CAPTURED: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// A caught panic.
#[derive(Debug, Clone)]
pub struct PanicReport {
    /// The panic payload, when it was a string.
    pub message: String,
    /// Location and backtrace of the panic site, at most [`MAX_TRACE_BYTES`].
    pub trace: String,
}

/// Poll `future` inside an isolation scope, converting a panic into a
/// [`PanicReport`].
pub async fn isolate<F>(future: F) -> Result<F::Output, PanicReport>
where
    F: Future,
{
    install_hook();
    let scoped = Scoped {
        inner: Box::pin(future),
    };
    AssertUnwindSafe(scoped).catch_unwind().await.map_err(report)
}

/// Run `f` inside an isolation scope, converting a panic into a
/// [`PanicReport`].
pub fn catch<T>(f: impl FnOnce() -> T) -> Result<T, PanicReport> {
    install_hook();
    let result = {
        let _scope = ScopeGuard::enter();
        std::panic::catch_unwind(AssertUnwindSafe(f))
    };
    result.map_err(report)
}

fn report(payload: Box<dyn Any + Send>) -> PanicReport {
    // The hook ran on this thread during the same poll or call.
    let trace = CAPTURED
        .with(|captured| captured.borrow_mut().take())
        .unwrap_or_else(|| Backtrace::force_capture().to_string());
    PanicReport {
        message: panic_message(payload.as_ref()),
        trace: truncate(trace, MAX_TRACE_BYTES),
    }
}

fn install_hook() {
    INSTALL_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if SCOPE_DEPTH.with(Cell::get) == 0 {
                previous(info);
                return;
            }
            let location = info
                .location()
                .map(ToString::to_string)
                .unwrap_or_else(|| "<unknown>".to_string());
            let trace = format!("panicked at {location}\n{}", Backtrace::force_capture());
            CAPTURED.with(|captured| *captured.borrow_mut() = Some(trace));
        }));
    });
}

struct ScopeGuard;

impl ScopeGuard {
    fn enter() -> Self {
        SCOPE_DEPTH.with(|depth| depth.set(depth.get() + 1));
        ScopeGuard
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        SCOPE_DEPTH.with(|depth| depth.set(depth.get() - 1));
    }
}

/// Marks the current thread as isolated for the duration of each poll.
struct Scoped<F> {
    inner: Pin<Box<F>>,
}

impl<F: Future> Future for Scoped<F> {
    type Output = F::Output;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let _scope = ScopeGuard::enter();
        self.inner.as_mut().poll(cx)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn truncate(mut trace: String, limit: usize) -> String {
    if trace.len() > limit {
        let mut cut = limit;
        while !trace.is_char_boundary(cut) {
            cut -= 1;
        }
        trace.truncate(cut);
    }
    trace
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completed_future_passes_through() {
        let out = isolate(async { 7 }).await.unwrap();
        assert_eq!(out, 7);
    }

    #[tokio::test]
    async fn panic_is_reported_with_site() {
        let report = isolate(async {
            tokio::task::yield_now().await;
            panic!("boom at {}", 42);
        })
        .await
        .map(|()| ())
        .unwrap_err();

        assert_eq!(report.message, "boom at 42");
        assert!(report.trace.starts_with("panicked at "));
        assert!(report.trace.contains("panic.rs"));
        assert!(report.trace.len() <= MAX_TRACE_BYTES);
    }

    #[tokio::test]
    async fn static_str_payload() {
        let report = isolate(async { panic!("static") }).await.map(|()| ()).unwrap_err();
        assert_eq!(report.message, "static");
    }

    #[test]
    fn scope_depth_is_restored_after_panic() {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let _ = rt.block_on(isolate(async { panic!("x") })).map(|()| ());
        assert_eq!(SCOPE_DEPTH.with(Cell::get), 0);
    }

    #[test]
    fn synchronous_panic_is_caught() {
        assert_eq!(catch(|| 3).unwrap(), 3);

        let report = catch(|| -> u8 { panic!("invalid route") }).unwrap_err();
        assert_eq!(report.message, "invalid route");
        assert!(report.trace.starts_with("panicked at "));
        assert_eq!(SCOPE_DEPTH.with(Cell::get), 0);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let trace = "é".repeat(10);
        let cut = truncate(trace, 5);
        assert_eq!(cut, "éé");
        assert_eq!(truncate("short".to_string(), 16), "short");
    }
}
