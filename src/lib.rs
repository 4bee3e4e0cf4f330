//! Pagehost: Page/Frame Ownership Graph
//!
//! A page owns a dynamic set of frames; observers register with a page to be told,
//! synchronously, when frames are created or destroyed. Frames are exclusively owned
//! by their page and every other reference (registry entries, observer lists, page
//! directory slots, frame handles) is non-owning and checked for liveness before use.

pub mod config;
pub mod context;
pub mod error;
pub mod frame;
pub mod handle;
pub mod logging;
pub mod observer;
pub mod page;
pub mod platform;
pub mod shutdown;
pub mod types;

pub use context::BrowserContext;
pub use error::{HostError, RegistryError};
pub use frame::{Frame, FrameRef, FrameRegistry};
pub use handle::FrameHandle;
pub use observer::{ObserverRegistration, PageObserver};
pub use page::{CreateParams, Page, PageDirectory, PageLifecycle, PageRef};
pub use shutdown::{ShutdownPolicy, ShutdownReport};
pub use types::{FrameId, ObserverId, PageId};
