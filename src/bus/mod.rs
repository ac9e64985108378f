//! Event bus module
//!
//! Decouples the financial contexts: producers publish facts, subscribers in
//! other contexts react on their own tasks.

mod event_bus;

pub use event_bus::{DispatchHandle, Event, EventBus};
