//! Tracked item model shared by tasks and medicines
//!
//! Both variants go through the same store and storage contract; the
//! variant-specific fields live in [`ItemKind`].

mod item;

pub use item::*;
