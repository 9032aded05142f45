//! Tick history: the JSONL log written by the poller and the summaries
//! computed from it.

pub mod logger;
pub mod reporter;
