//! Frame driver owning the shared chain storage.

pub mod queue;
pub mod registry;

use std::sync::Arc;
use std::time::Instant;

use log::{Level, debug, log_enabled, trace};
use parking_lot::{Condvar, Mutex, RwLock};

pub use queue::{RegistrationEvent, RegistrationQueue};
pub use registry::ChainRegistry;

use crate::{
    config::SchedulerConfig,
    core::{BoneChain, ChainId},
    dynamics::FramePipeline,
    rig::BoneTransforms,
    utils::{
        logging::{ScopedTimer, warn_if_frame_budget_exceeded},
        profiling::FrameProfile,
    },
};

/// Outcome of asking the scheduler for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// The frame ran to completion and poses were written back.
    Completed,
    /// The frame was handed to the worker pool.
    Dispatched,
    /// The previous frame is still running; nothing was done.
    Skipped,
    /// No chain is registered.
    Idle,
}

struct CompletedFrame {
    registry: ChainRegistry,
    profile: FrameProfile,
}

type FrameSlot = Arc<(Mutex<Option<CompletedFrame>>, Condvar)>;

/// Drives the registration sync point and the frame pipeline.
///
/// Storage is owned by the scheduler between frames and by the running job while a
/// dispatched frame is in flight.
pub struct FrameScheduler {
    config: SchedulerConfig,
    pipeline: FramePipeline,
    queue: RegistrationQueue,
    registry: Option<ChainRegistry>,
    in_flight: Option<FrameSlot>,
    last_profile: FrameProfile,
    frames: u64,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        let mut pipeline = FramePipeline::new(config.update_rate);
        pipeline.set_parallel(config.parallel);
        debug!(
            "jiggle scheduler ready: {} slots, {} Hz, parallel: {}",
            config.capacity,
            config.update_rate,
            pipeline.parallel()
        );

        Self {
            config,
            pipeline,
            queue: RegistrationQueue::new(),
            registry: Some(ChainRegistry::with_capacity(config.capacity)),
            in_flight: None,
            last_profile: FrameProfile::default(),
            frames: 0,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// A handle chain owners can keep to enqueue registrations from any thread.
    pub fn queue(&self) -> RegistrationQueue {
        self.queue.clone()
    }

    /// Enqueues `chain`; it is absorbed at the next frame's sync point.
    pub fn register(&self, chain: impl Into<Arc<BoneChain>>) {
        self.queue.register(chain);
    }

    /// Enqueues removal of `id`; it is evicted at the next frame's sync point.
    pub fn unregister(&self, id: ChainId) {
        self.queue.unregister(id);
    }

    /// Storage between frames. `None` while a dispatched frame is running.
    pub fn registry(&self) -> Option<&ChainRegistry> {
        self.registry.as_ref()
    }

    pub fn is_frame_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn last_profile(&self) -> &FrameProfile {
        &self.last_profile
    }

    /// Number of frames that ran to completion.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Runs one frame on the calling thread.
    pub fn update<B>(&mut self, bones: &mut B, dt: f32) -> FrameStatus
    where
        B: BoneTransforms + Sync + ?Sized,
    {
        if !self.reclaim() {
            trace!("jiggle frame still running, skipping update");
            return FrameStatus::Skipped;
        }
        if !self.sync_point() {
            return FrameStatus::Idle;
        }
        let Some(registry) = self.registry.as_mut() else {
            return FrameStatus::Idle;
        };

        let _timer = ScopedTimer::new("jiggle frame");
        let profile = self.pipeline.run(registry, bones, sanitize_dt(dt));
        self.record(profile);
        FrameStatus::Completed
    }

    /// Runs one frame on the worker pool against shared bones.
    ///
    /// The job reads `bones` for the simulation and write-locks it for the write-back.
    pub fn dispatch<B>(&mut self, bones: Arc<RwLock<B>>, dt: f32) -> FrameStatus
    where
        B: BoneTransforms + Send + Sync + 'static,
    {
        if !self.reclaim() {
            trace!("jiggle frame still running, skipping dispatch");
            return FrameStatus::Skipped;
        }
        if !self.sync_point() {
            return FrameStatus::Idle;
        }
        let Some(mut registry) = self.registry.take() else {
            return FrameStatus::Idle;
        };

        let pipeline = self.pipeline;
        let dt = sanitize_dt(dt);
        self.launch(move || {
            let start = Instant::now();
            let mut profile = pipeline.simulate(&mut registry, &*bones.read(), dt);
            pipeline.write_back(&mut registry, &mut *bones.write(), &mut profile);
            profile.total_frame_time = start.elapsed();
            CompletedFrame { registry, profile }
        })
    }

    #[cfg(feature = "parallel")]
    fn launch<F>(&mut self, job: F) -> FrameStatus
    where
        F: FnOnce() -> CompletedFrame + Send + 'static,
    {
        let slot: FrameSlot = Arc::new((Mutex::new(None), Condvar::new()));
        let signal = Arc::clone(&slot);
        rayon::spawn(move || {
            let frame = job();
            let (done, ready) = &*signal;
            *done.lock() = Some(frame);
            ready.notify_all();
        });
        self.in_flight = Some(slot);
        FrameStatus::Dispatched
    }

    #[cfg(not(feature = "parallel"))]
    fn launch<F>(&mut self, job: F) -> FrameStatus
    where
        F: FnOnce() -> CompletedFrame + Send + 'static,
    {
        self.finish(job());
        FrameStatus::Completed
    }

    /// Blocks until the in-flight frame, if any, has completed.
    pub fn wait(&mut self) {
        let Some(slot) = self.in_flight.take() else {
            return;
        };
        let frame = {
            let (done, ready) = &*slot;
            let mut done = done.lock();
            while done.is_none() {
                ready.wait(&mut done);
            }
            done.take()
        };
        if let Some(frame) = frame {
            self.finish(frame);
        }
    }

    /// Joins the in-flight frame, drops pending registrations, and releases storage.
    pub fn shutdown(&mut self) {
        self.wait();
        self.queue.clear();
        if let Some(registry) = self.registry.as_mut() {
            registry.clear();
        }
        debug!("jiggle scheduler shut down after {} frames", self.frames);
    }

    /// Takes back storage from a finished job. `false` while it is still running.
    fn reclaim(&mut self) -> bool {
        let Some(slot) = self.in_flight.as_ref() else {
            return true;
        };
        let frame = slot.0.lock().take();
        match frame {
            Some(frame) => {
                self.in_flight = None;
                self.finish(frame);
                true
            }
            None => false,
        }
    }

    fn finish(&mut self, frame: CompletedFrame) {
        self.registry = Some(frame.registry);
        self.record(frame.profile);
    }

    /// Applies queued registrations. Returns whether any chain is live afterwards.
    fn sync_point(&mut self) -> bool {
        let Some(registry) = self.registry.as_mut() else {
            return false;
        };
        let applied = self.queue.apply_to(registry);
        if applied > 0 {
            debug!(
                "applied {applied} registration events, {} chains live",
                registry.len()
            );
        }
        !registry.chains().is_empty()
    }

    fn record(&mut self, profile: FrameProfile) {
        self.last_profile = profile;
        self.frames += 1;
        if log_enabled!(Level::Debug) {
            profile.report();
        }
        if let Some(budget_ms) = self.config.frame_budget_ms {
            warn_if_frame_budget_exceeded(profile.total_frame_time, budget_ms);
        }
    }
}

impl Drop for FrameScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() { dt.max(0.0) } else { 0.0 }
}
