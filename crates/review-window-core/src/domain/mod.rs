//! Domain model: repository identity, review events, windows, commit states.
//!
//! ここにある型は純粋な値で、I/O も時刻の取得も行わない。

pub mod event;
pub mod ids;
pub mod repo;
pub mod status;
pub mod window;

pub use event::ReviewEvent;
pub use ids::{CompletionId, Id, IdMarker};
pub use repo::{PrNumber, RepoId, Sha};
pub use status::{CommitState, STATUS_CONTEXT, pending_description, success_description};
pub use window::{DurationParseError, ReviewWindow};
