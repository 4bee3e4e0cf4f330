//! Browser context
//!
//! Explicit process-wide state: the frame registry, the page directory, the lifecycle
//! lock serializing multi-step operations, the shutdown policy and the optional
//! platform engine. Contexts are cheap to clone and share one state.
//!
//! [`BrowserContext::global`] is created on first use and lives for the rest of the
//! process. Pages remove themselves from it when dropped.

use crate::config::HostConfig;
use crate::error::HostError;
use crate::frame::FrameRegistry;
use crate::page::{Page, PageDirectory};
use crate::platform::{PlatformEngine, SessionId, UserId};
use crate::shutdown::{self, ShutdownPolicy, ShutdownReport};
use crate::types::{FrameId, PageId};
use parking_lot::{ReentrantMutex, ReentrantMutexGuard, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::info;

static GLOBAL_CONTEXT: OnceLock<BrowserContext> = OnceLock::new();

#[derive(Clone)]
pub struct BrowserContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    registry: FrameRegistry,
    directory: PageDirectory,
    // Reentrant so observer callbacks may call back into the context.
    lifecycle: ReentrantMutex<()>,
    next_page_id: AtomicU64,
    policy: ShutdownPolicy,
    platform: RwLock<Option<Arc<dyn PlatformEngine>>>,
}

impl Default for BrowserContext {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserContext {
    pub fn new() -> Self {
        Self::with_settings(0, ShutdownPolicy::default())
    }

    pub fn from_config(config: &HostConfig) -> Self {
        Self::with_settings(config.frames.first_frame_id, config.shutdown.policy)
    }

    fn with_settings(first_frame_id: u64, policy: ShutdownPolicy) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                registry: FrameRegistry::with_first_id(first_frame_id),
                directory: PageDirectory::new(),
                lifecycle: ReentrantMutex::new(()),
                next_page_id: AtomicU64::new(0),
                policy,
                platform: RwLock::new(None),
            }),
        }
    }

    /// The process-wide context
    pub fn global() -> &'static BrowserContext {
        GLOBAL_CONTEXT.get_or_init(BrowserContext::new)
    }

    pub fn registry(&self) -> &FrameRegistry {
        &self.inner.registry
    }

    pub fn directory(&self) -> &PageDirectory {
        &self.inner.directory
    }

    pub fn policy(&self) -> ShutdownPolicy {
        self.inner.policy
    }

    pub fn create_page(&self, title: impl Into<String>) -> Page {
        Page::create(self, title)
    }

    /// Simulate the renderer hosting `frame_id` going away.
    pub fn shutdown(&self, frame_id: FrameId) -> Result<ShutdownReport, HostError> {
        shutdown::shutdown(self, frame_id)
    }

    pub fn attach_platform(&self, engine: Arc<dyn PlatformEngine>) {
        *self.inner.platform.write() = Some(engine);
    }

    pub fn detach_platform(&self) -> Option<Arc<dyn PlatformEngine>> {
        self.inner.platform.write().take()
    }

    pub fn connect_user(&self, user_id: UserId) -> Result<SessionId, HostError> {
        let engine = self.platform()?;
        let session = engine.connect(user_id);
        info!(user_id, session, "Connected platform user");
        Ok(session)
    }

    pub fn disconnect_user(&self, user_id: UserId) -> Result<(), HostError> {
        self.platform()?.disconnect(user_id);
        info!(user_id, "Disconnected platform user");
        Ok(())
    }

    fn platform(&self) -> Result<Arc<dyn PlatformEngine>, HostError> {
        self.inner
            .platform
            .read()
            .clone()
            .ok_or(HostError::NoPlatform)
    }

    pub(crate) fn lifecycle_guard(&self) -> ReentrantMutexGuard<'_, ()> {
        self.inner.lifecycle.lock()
    }

    pub(crate) fn allocate_page_id(&self) -> PageId {
        PageId(self.inner.next_page_id.fetch_add(1, Ordering::SeqCst))
    }
}
