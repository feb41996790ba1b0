//! Coordination between the main context and the render worker.
//!
//! The worker owns the engine and, after `setCanvas`, the drawing surface.
//! The main context owns input: it samples pointer motion at a fixed period
//! and forwards clicks immediately. The two sides share nothing but the
//! command and reply channels.

pub mod animation;
pub mod config;
pub mod coordinator;
pub mod sampler;
pub mod worker;

pub use animation::{FadeScheduler, Hover};
pub use config::{AnimationPolicy, ConfigError, MapConfig, Timing};
pub use coordinator::{CoordinatorError, MainCoordinator, Notifier};
pub use sampler::PointerSampler;
pub use worker::{RenderWorker, WorkerHandle, spawn_worker};
