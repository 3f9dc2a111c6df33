//! Tracks time spent on a handful of social media sites, keeps daily totals and warns once the
//! daily limit is exceeded. The browser extension talks to [host] over native messaging, [cli]
//! displays and manages what was recorded.
//!

pub mod cli;
pub mod host;
pub mod notify;
pub mod storage;
pub mod tracker;
pub mod usage;
pub mod utils;
