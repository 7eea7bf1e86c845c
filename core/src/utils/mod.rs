//! Utility functions and helpers
//!
//! Filesystem access, temporary artifact naming and operation timing used by
//! the engine components.

pub mod fs;
pub mod naming;
pub mod timer;

pub use fs::{FileAccess, LocalFileAccess};
pub use naming::temp_artifact_name;
pub use timer::Timer;
