//! External shutdown trigger
//!
//! Models a renderer going away underneath a frame: the frame id is resolved through
//! the frame registry, its entry is removed, and the current page destroys frames
//! with the usual notify-then-release protocol.
//!
//! Every check runs before any mutation, so a failed shutdown leaves the registry,
//! the directory and all pages untouched.

use crate::context::BrowserContext;
use crate::error::HostError;
use crate::types::{FrameId, PageId};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Which frames a shutdown releases
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShutdownPolicy {
    /// Release exactly the requested frame. The current page must own it.
    #[default]
    MatchId,
    /// Release every frame of the current page, whichever id was requested.
    ///
    /// This reproduces destroy-by-position: shutting down a later frame also
    /// releases the page's first frame.
    FirstOwned,
}

/// Outcome of a successful shutdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    pub page: PageId,
    pub requested: FrameId,
    /// Released frames in release order
    pub released: Vec<FrameId>,
}

pub fn shutdown(context: &BrowserContext, frame_id: FrameId) -> Result<ShutdownReport, HostError> {
    let _guard = context.lifecycle_guard();

    let owner = context
        .registry()
        .with_frame(frame_id, |frame| frame.owner())
        .map_err(|_| HostError::FrameNotFound(frame_id))?;
    let page = context.directory().current()?;
    let owned = owner == page.id();
    // Re-entered from a frame_destroyed callback for this very frame.
    if owned && page.is_releasing(frame_id) {
        return Err(HostError::FrameDestroyed(frame_id));
    }

    let released = match context.policy() {
        ShutdownPolicy::MatchId => {
            if !owned {
                return Err(HostError::FrameNotOwned {
                    frame: frame_id,
                    page: page.id(),
                });
            }
            context.registry().unregister(frame_id);
            page.destroy_frame(frame_id)?;
            vec![frame_id]
        }
        ShutdownPolicy::FirstOwned => {
            if !page.has_releasable_frames() {
                return Err(HostError::EmptyFrameSet(page.id()));
            }
            if owned {
                context.registry().unregister(frame_id);
            } else {
                // The frame lives on another page; its entry must stay.
                warn!(
                    frame_id = %frame_id,
                    owner = %owner,
                    page_id = %page.id(),
                    "Shutdown target is not owned by the current page"
                );
            }
            page.destroy_all_frames()?
        }
    };

    info!(
        frame_id = %frame_id,
        page_id = %page.id(),
        released = released.len(),
        "Renderer shutdown"
    );
    Ok(ShutdownReport {
        page: page.id(),
        requested: frame_id,
        released,
    })
}
