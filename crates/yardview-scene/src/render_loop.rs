//! Per-frame driver.
//!
//! The widget layer schedules [`RenderLoop::tick`] from its frame clock.
//! A tick advances control damping (or re-enables controls that a
//! programmatic camera assignment suspended) and renders the chain.

use yardview_core::Result;

use crate::pipeline::Pipeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Idle,
    Running,
    Cancelled,
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Rendered { camera_moved: bool },
    /// Loop not running or pipeline not set up
    Skipped,
}

#[derive(Debug, Default)]
pub struct RenderLoop {
    state: LoopState,
    ticks: u64,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Start ticking. A cancelled loop never restarts; each mount gets a
    /// new loop.
    pub fn start(&mut self) -> bool {
        if self.state != LoopState::Idle {
            return false;
        }
        self.state = LoopState::Running;
        true
    }

    /// Stop for good. Returns true only on the first call.
    pub fn cancel(&mut self) -> bool {
        if self.state == LoopState::Cancelled {
            return false;
        }
        self.state = LoopState::Cancelled;
        tracing::debug!(ticks = self.ticks, "render loop cancelled");
        true
    }

    pub fn tick(&mut self, pipeline: &mut Pipeline) -> Result<TickOutcome> {
        if !self.is_running() || !pipeline.is_initialized() {
            return Ok(TickOutcome::Skipped);
        }
        let camera_moved = pipeline.advance_controls();
        pipeline.render()?;
        self.ticks += 1;
        Ok(TickOutcome::Rendered { camera_moved })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yardview_settings::SceneConfig;

    #[test]
    fn test_cancel_once() {
        let mut render_loop = RenderLoop::new();
        assert!(render_loop.start());
        assert!(!render_loop.start());
        assert!(render_loop.cancel());
        assert!(!render_loop.cancel());
        assert!(!render_loop.start());
        assert_eq!(render_loop.state(), LoopState::Cancelled);
    }

    #[test]
    fn test_tick_without_pipeline_is_skipped() {
        let mut render_loop = RenderLoop::new();
        let mut pipeline = Pipeline::new(&SceneConfig::default());
        render_loop.start();
        assert_eq!(render_loop.tick(&mut pipeline).unwrap(), TickOutcome::Skipped);
        assert_eq!(render_loop.ticks(), 0);
    }
}
