pub mod config;
pub mod players;
pub mod poller;
pub mod track_info;
