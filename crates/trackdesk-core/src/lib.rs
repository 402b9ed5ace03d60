pub mod config;
pub mod error;
pub mod session;
pub mod status;
pub mod track;
pub mod track_number;

pub use config::Config;
pub use error::CoreError;
pub use session::{
    Credentials, FileSessionStore, MemorySessionStore, Role, SessionContext, SessionStore,
    UserProfile,
};
pub use status::TrackStatus;
pub use track::{ScannedTrackRecord, TimelineEvent, TrackDetails, UserTrack, VolumeDay, VolumeTrack};
pub use track_number::{join_track_numbers, normalize_track_number, split_track_numbers};
