//! Stream copying between locators.
//!
//! [`Copier::transfer`] is the one place bytes move. Everything else wraps it
//! in a completion policy:
//!
//! - [`Copier::copy`]: the callback fires exactly once on success and never
//!   on failure. Failures are logged and swallowed.
//! - [`Copier::copy_reporting`]: the callback fires exactly once on every
//!   path, carrying either the destination or the reason it failed.
//! - [`spawn_copy`]: `copy_reporting` on a background thread, with the
//!   outcome delivered over a one-shot channel. The flow coordinator runs
//!   every copy this way.
//!
//! Both streams are owned values, so they are closed on every exit path,
//! error paths included.

use crate::error::CopyError;
use crate::locator::Locator;
use crate::resolver::ContentResolver;
use crossbeam_channel::{Receiver, TryRecvError};
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, error};

pub const DEFAULT_CHUNK_SIZE: usize = 2048;
/// Upper bound for a single read buffer (16 MiB).
pub const MAX_CHUNK_SIZE: usize = 16 * 1024 * 1024;

pub type CopyOutcome = Result<Locator, CopyError>;

/// Cooperative cancellation, checked before every chunk.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Copier {
    chunk_size: usize,
}

impl Default for Copier {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Copier {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.clamp(1, MAX_CHUNK_SIZE),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Copies every byte from `source` to `destination`, returning the count.
    pub fn transfer<R: ContentResolver + ?Sized>(
        &self,
        resolver: &R,
        source: &Locator,
        destination: &Locator,
        cancel: Option<&CancelToken>,
    ) -> Result<u64, CopyError> {
        let started = Instant::now();
        debug!(%source, %destination, "copy started");

        let mut input = resolver.open_read(source)?;
        let mut output = resolver.open_write(destination)?;

        let mut buf = vec![0u8; self.chunk_size];
        let mut copied: u64 = 0;
        loop {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                return Err(CopyError::Cancelled { copied });
            }

            let len = match input.read(&mut buf) {
                Ok(0) => break,
                Ok(len) => len,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => return Err(CopyError::Read { copied, source }),
            };

            output
                .write_all(&buf[..len])
                .map_err(|source| CopyError::Write { copied, source })?;
            copied += len as u64;
        }

        output
            .flush()
            .map_err(|source| CopyError::Write { copied, source })?;

        debug!(
            %destination,
            bytes = copied,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "copy finished"
        );
        Ok(copied)
    }

    pub fn copy<R, F>(&self, resolver: &R, source: &Locator, destination: &Locator, on_complete: F)
    where
        R: ContentResolver + ?Sized,
        F: FnOnce(Locator),
    {
        match self.transfer(resolver, source, destination, None) {
            Ok(_) => on_complete(destination.clone()),
            Err(e) => error!(%source, %destination, "copy failed: {}", e),
        }
    }

    pub fn copy_reporting<R, F>(
        &self,
        resolver: &R,
        source: &Locator,
        destination: &Locator,
        cancel: Option<&CancelToken>,
        on_complete: F,
    ) where
        R: ContentResolver + ?Sized,
        F: FnOnce(CopyOutcome),
    {
        let outcome = self
            .transfer(resolver, source, destination, cancel)
            .map(|_| destination.clone());
        if let Err(e) = &outcome {
            error!(%source, %destination, "copy failed: {}", e);
        }
        on_complete(outcome);
    }
}

/// A copy running on a background thread.
///
/// The outcome can be taken exactly once: both [`CopyHandle::wait`] and a
/// successful [`CopyHandle::try_outcome`] consume the handle.
#[derive(Debug)]
pub struct CopyHandle {
    destination: Locator,
    cancel: CancelToken,
    outcome: Receiver<CopyOutcome>,
    thread: Option<JoinHandle<()>>,
}

impl CopyHandle {
    pub fn destination(&self) -> &Locator {
        &self.destination
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn wait(mut self) -> CopyOutcome {
        let outcome = self.outcome.recv().unwrap_or(Err(CopyError::WorkerLost));
        self.join();
        outcome
    }

    /// Returns the outcome if the copy has finished, or the handle back if not.
    pub fn try_outcome(mut self) -> Result<CopyOutcome, Self> {
        match self.outcome.try_recv() {
            Ok(outcome) => {
                self.join();
                Ok(outcome)
            }
            Err(TryRecvError::Empty) => Err(self),
            Err(TryRecvError::Disconnected) => {
                self.join();
                Ok(Err(CopyError::WorkerLost))
            }
        }
    }

    fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

pub fn spawn_copy<R>(
    copier: Copier,
    resolver: Arc<R>,
    source: Locator,
    destination: Locator,
    cancel: CancelToken,
) -> io::Result<CopyHandle>
where
    R: ContentResolver,
{
    let (tx, rx) = crossbeam_channel::bounded(1);

    let worker_cancel = cancel.clone();
    let worker_destination = destination.clone();
    let thread = thread::Builder::new()
        .name("picstash-copy".to_string())
        .spawn(move || {
            copier.copy_reporting(
                &*resolver,
                &source,
                &worker_destination,
                Some(&worker_cancel),
                move |outcome| {
                    let _ = tx.send(outcome);
                },
            );
        })?;

    Ok(CopyHandle {
        destination,
        cancel,
        outcome: rx,
        thread: Some(thread),
    })
}
