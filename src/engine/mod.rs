//! Progress engine: cursor resolution, completion recording and the session
//! that sequences checkpoints and exports around them.

pub mod counters;
pub mod cursor;
pub mod recorder;
pub mod session;

pub use counters::Counters;
pub use cursor::{current_task, resolve_cursor, CurrentTask, Cursor};
pub use recorder::record_completion;
pub use session::{AnnotationSession, RecoveryReport, Submission};
