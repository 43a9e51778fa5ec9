mod ids;
mod index_status;
mod playlist;
mod track;

pub use ids::{PlaylistId, TrackId};
pub use index_status::{IndexState, IndexStatus};
pub use playlist::{Playlist, PlaylistEntry, PlaylistSummary};
pub use track::{NewTrack, Track};
