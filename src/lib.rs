#[macro_use]
extern crate log;

pub mod bot;
pub mod cli;
pub mod config;
pub mod runner;
pub mod transmission;

pub use config::Config;
pub use transmission::TransmissionClient;
