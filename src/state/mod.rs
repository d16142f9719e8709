//! In-process mutable state
//!
//! This module contains state that lives for the lifetime of the process

pub mod views;

pub use views::ViewTracker;
