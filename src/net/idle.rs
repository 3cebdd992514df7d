//! Per-connection keep-alive timeout.
//!
//! [`IdleTimeoutAcceptor`] wraps every accepted socket in an [`IdleStream`]
//! and the connection's service in an [`ActivityService`] before handing both
//! to the next acceptor (plain or TLS). The two share an [`Activity`] count of
//! requests in progress. While that count is zero the stream fails with
//! `TimedOut` once no read or write has made progress for the idle duration,
//! which makes hyper drop the connection. While a request is in progress the
//! deadline is held open; the write timeout bounds the request instead.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use axum_server::accept::{Accept, DefaultAcceptor};
use futures_util::future::BoxFuture;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::time::{Instant, Sleep};
use tower::Service;

/// Acceptor applying a keep-alive timeout beneath `A`.
#[derive(Debug, Clone)]
pub struct IdleTimeoutAcceptor<A = DefaultAcceptor> {
    inner: A,
    idle: Duration,
}

impl<A> IdleTimeoutAcceptor<A> {
    pub fn new(inner: A, idle: Duration) -> Self {
        Self { inner, idle }
    }
}

impl<A, I, S> Accept<I, S> for IdleTimeoutAcceptor<A>
where
    A: Accept<IdleStream<I>, ActivityService<S>>,
    I: AsyncRead + AsyncWrite + Unpin,
{
    type Stream = A::Stream;
    type Service = A::Service;
    type Future = A::Future;

    fn accept(&self, stream: I, service: S) -> Self::Future {
        let activity = Activity::default();
        self.inner.accept(
            IdleStream::new(stream, self.idle, activity.clone()),
            ActivityService::new(service, activity),
        )
    }
}

/// Number of requests in progress on one connection.
#[derive(Debug, Clone, Default)]
pub struct Activity(Arc<AtomicUsize>);

impl Activity {
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire) > 0
    }

    /// Mark a request in progress until the guard drops.
    pub fn begin(&self) -> Busy {
        self.0.fetch_add(1, Ordering::AcqRel);
        Busy(self.clone())
    }
}

/// Guard returned by [`Activity::begin`].
#[derive(Debug)]
pub struct Busy(Activity);

impl Drop for Busy {
    fn drop(&mut self) {
        (self.0).0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Counts a connection's requests from dispatch until the response is
/// produced (or the request future is dropped).
#[derive(Debug, Clone)]
pub struct ActivityService<S> {
    inner: S,
    activity: Activity,
}

impl<S> ActivityService<S> {
    pub fn new(inner: S, activity: Activity) -> Self {
        Self { inner, activity }
    }
}

impl<S, R> Service<R> for ActivityService<S>
where
    S: Service<R>,
    S::Response: 'static,
    S::Error: 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<S::Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: R) -> Self::Future {
        let busy = self.activity.begin();
        let response = self.inner.call(req);
        Box::pin(async move {
            let result = response.await;
            drop(busy);
            result
        })
    }
}

/// A stream that errors after a period without I/O progress, unless its
/// connection has a request in progress.
#[derive(Debug)]
pub struct IdleStream<S> {
    inner: S,
    idle: Duration,
    deadline: Pin<Box<Sleep>>,
    activity: Activity,
}

impl<S> IdleStream<S> {
    pub fn new(inner: S, idle: Duration, activity: Activity) -> Self {
        Self {
            inner,
            idle,
            deadline: Box::pin(tokio::time::sleep(idle)),
            activity,
        }
    }

    fn touch(&mut self) {
        let next = Instant::now() + self.idle;
        self.deadline.as_mut().reset(next);
    }

    fn expired<T>(&mut self, cx: &mut Context<'_>) -> Poll<io::Result<T>> {
        match self.deadline.as_mut().poll(cx) {
            Poll::Ready(()) => Poll::Ready(Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "connection idle timeout",
            ))),
            Poll::Pending => Poll::Pending,
        }
    }

    fn progress<T>(&mut self, cx: &mut Context<'_>, polled: Poll<io::Result<T>>) -> Poll<io::Result<T>> {
        match polled {
            Poll::Ready(result) => {
                self.touch();
                Poll::Ready(result)
            }
            // The idle window restarts from the last poll of a busy connection.
            Poll::Pending if self.activity.is_busy() => {
                self.touch();
                Poll::Pending
            }
            Poll::Pending => self.expired(cx),
        }
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for IdleStream<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let polled = Pin::new(&mut this.inner).poll_read(cx, buf);
        this.progress(cx, polled)
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for IdleStream<S> {
    fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let polled = Pin::new(&mut this.inner).poll_write(cx, buf);
        this.progress(cx, polled)
    }

    fn poll_write_vectored(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let polled = Pin::new(&mut this.inner).poll_write_vectored(cx, bufs);
        this.progress(cx, polled)
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let polled = Pin::new(&mut this.inner).poll_flush(cx);
        this.progress(cx, polled)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}
