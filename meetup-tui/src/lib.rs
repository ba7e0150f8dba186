// Library interface for the meetup client (also used by integration tests)
#[macro_use]
pub mod logging;

pub mod api;
pub mod app;
pub mod clock;
pub mod config;
pub mod feed;
pub mod terminal;
pub mod ui;
