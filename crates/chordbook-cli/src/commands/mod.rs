pub mod chart;
pub mod common;
pub mod completions;
pub mod config;
pub mod remote;
pub mod setlist;
pub mod sync;
