//! Domain types shared across the workspace

mod comment;
mod ids;
mod track;
mod user;

pub use comment::{Comment, CreateComment};
pub use ids::{CommentId, TrackId, Username};
pub use track::{CreateTrack, Track};
pub use user::{CreateUser, Credential, UpdateProfile, User, UserStats};
