//! Persistence backends for whole documents.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::format::FormatError;
use crate::page::PageSnapshot;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("storage error: {0}")]
    Other(String),
}

impl From<FormatError> for StorageError {
    fn from(err: FormatError) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async storage operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Trait for document storage backends.
///
/// Reads and writes are awaited completions; a caller must await one
/// operation before issuing a dependent one on the same store, so a document
/// is never observed half-loaded.
pub trait Storage: Send + Sync {
    /// Persist a page sequence under `name`.
    fn save(&self, name: &str, pages: &[PageSnapshot]) -> BoxFuture<'_, StorageResult<()>>;

    /// Load the page sequence stored under `name`.
    fn load(&self, name: &str) -> BoxFuture<'_, StorageResult<Vec<PageSnapshot>>>;

    /// Delete the document stored under `name`.
    fn delete(&self, name: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all stored document names.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check whether a document exists under `name`.
    fn exists(&self, name: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Minimal blocking executor for driving storage futures in tests.
#[cfg(test)]
pub(crate) fn block_on<F: Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        match f.as_mut().poll(&mut cx) {
            Poll::Ready(result) => return result,
            Poll::Pending => {}
        }
    }
}
