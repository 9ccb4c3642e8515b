#![forbid(unsafe_code)]

pub mod api;
pub mod bundle;
pub mod cli;
pub mod config;
pub mod error;
pub mod extension;
pub mod extract;
pub mod formats;
pub mod generation;
pub mod handoff;
pub mod logging;
pub mod marketplace;
pub mod page;
pub mod selection;
pub mod session;
