//! The skybar agent core: timeline construction, hour-aligned refresh
//! scheduling, and the pipeline tying location, weather, and rendering
//! together.

pub mod pipeline;
pub mod render;
pub mod schedule;
pub mod timeline;

pub use pipeline::{AgentEvent, AgentHandle, PipelineCoordinator, PipelineSnapshot};
pub use render::{Renderer, TextRenderer};
pub use schedule::{RefreshScheduler, ScheduleError};
pub use timeline::{build, collect, filter_entries, DisplayEntry, EntryKind};
