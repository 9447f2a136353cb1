pub mod health;
pub mod intent;
pub mod views;

// Re-export command functions for convenience
pub use health::health;
pub use intent::intent;
pub use views::{compare, emerging, evolution, frequency, overlap, trending, ScopeArgs};
