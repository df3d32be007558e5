//! Domain module - Core wishlist monitoring logic
//!
//! Pure types and logic: item identity, price handling, snapshot diffing,
//! and the persistence seam. Nothing in here performs IO.
//!
//! Modern Rust module organization (Rust 2018+ style):
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod events;
pub mod item;
pub mod normalize;
pub mod price;
pub mod reconcile;
pub mod repositories;
pub mod target;

// Re-export commonly used items for convenience
pub use events::{ChangeEvent, ChangeKind, ChangeSet, PriceChange, RemovedItem};
pub use item::{ItemRecord, RawCandidate, RawPrice};
pub use reconcile::{PriorItem, diff_snapshots};
pub use repositories::SnapshotRepository;
pub use target::TargetResolver;
