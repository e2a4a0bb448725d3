//! Terminal film catalogue browser.
//!
//! The browsing core ([`browse`]) is a synchronous state machine: user
//! events and fetch completions go in, [`browse::FetchRequest`]s come out.
//! The TUI executes those requests against [`catalogue`] and [`store`] on
//! background tasks and feeds the completions back.

pub mod app;
pub mod browse;
pub mod catalogue;
pub mod config;
pub mod store;
pub mod ui;
pub mod util;
