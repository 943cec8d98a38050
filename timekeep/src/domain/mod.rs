mod ids;
mod project;
mod statistics;
mod timer;

pub use ids::*;
pub use project::*;
pub use statistics::*;
pub use timer::*;
