//! Inkleaf Core Library
//!
//! Document and history engine for the Inkleaf multi-page drawing surface:
//! stable object identity, reversible edit commands, page snapshot
//! serialization, clipboard, and the versioned interchange format. Rendering,
//! drawing tools and UI live in the embedding application; this crate only
//! maintains one consistent model of what the document currently contains.

pub mod clipboard;
pub mod format;
pub mod history;
pub mod ids;
pub mod objects;
pub mod page;
pub mod session;
pub mod storage;
pub mod surface;

pub use clipboard::{ClipboardBridge, DroppedFile, IngestReport};
pub use format::{DocumentFile, FORMAT_VERSION, FormatError, PageRenderer};
pub use history::{EditEntry, EditKind, HistoryLedger, ReplayState};
pub use ids::{IdAllocator, ObjectId};
pub use objects::{Collection, Image, ImageFormat, PageObject, Stroke, TextBox};
pub use page::{PageSnapshot, PageStore};
pub use session::{DocumentSession, SessionEvent};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use surface::Surface;
