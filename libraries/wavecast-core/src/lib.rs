//! Wavecast Core
//!
//! Platform-agnostic domain types, storage traits, and error handling for
//! Wavecast.
//!
//! This crate provides the foundational building blocks shared by the server
//! and the storage backend.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `User`, `Track`, `Comment`, and their newtype IDs
//! - **Storage Traits**: `CredentialStore`, `PlayStore`
//! - **Error Handling**: Unified `WavecastError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use wavecast_core::types::{TrackId, Username};
//!
//! let owner = Username::new("alice");
//! let track = TrackId::generate();
//!
//! assert_eq!(owner.as_str(), "alice");
//! assert_ne!(track, TrackId::generate());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use error::{Result, WavecastError};
pub use storage::{CredentialStore, PlayStore};

// Export all types
pub use types::{
    // Users
    CreateUser, Credential, UpdateProfile, User, UserStats,
    // Tracks
    CreateTrack, Track,
    // Comments
    Comment, CreateComment,
    // IDs
    CommentId, TrackId, Username,
};
