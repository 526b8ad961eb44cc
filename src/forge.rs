//! Pull request publishing on the code hosting service.

/// Connection settings for the hosting service.
pub mod config;

/// GitHub API client implementation.
pub mod github;

/// Request and response types shared by forge implementations.
pub mod request;

/// Pull request title/body rendering.
pub mod summary;

/// Common trait for forge platform abstraction.
pub mod traits;
