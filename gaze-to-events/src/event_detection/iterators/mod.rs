//! Provides iterators to convert per-sample signals into events.
pub(crate) mod event;

pub(crate) use event::EventFilter;
