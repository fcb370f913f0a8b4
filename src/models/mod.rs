//! Data models for Checkpost

pub mod checkpoint;
pub mod enums;
pub mod patrol;
pub mod scan;
pub mod user;

// Re-export commonly used types
pub use checkpoint::{Checkpoint, CheckpointSummary};
pub use enums::{CheckpointType, Role};
pub use patrol::{ActivePatrol, GpsTrack, PatrolSession};
pub use scan::{NewScan, Scan, ScanDetails};
pub use user::{User, UserClaims};
