//! Scanner workflow: accumulate scanned identifiers, validate them against the
//! backend, and run confirmation-gated bulk delivery or deletion.

mod accumulator;
mod backend;
mod batch;
mod confirm;
mod error;
mod refresh;
mod volume;

pub use accumulator::{
    Accumulator, BATCH_DELETE_WORD, BulkResult, RemovalPolicy, ScanOutcome, delete_track,
};
pub use backend::{CalendarBackend, ScanBackend, TrackDeletion};
pub use batch::ScanBatch;
pub use confirm::ConfirmationPolicy;
pub use error::{Action, ScanError};
pub use refresh::RefreshSignal;
pub use volume::VolumeView;
