mod ai_log;
mod context_dump;
mod project;
mod task;
mod version;

pub use ai_log::*;
pub use context_dump::*;
pub use project::*;
pub use task::*;
pub use version::*;
