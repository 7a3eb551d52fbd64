pub mod assistant;
pub mod chat;
pub mod cli;
pub mod completion;
pub mod config;
pub mod doctor;
pub mod error;
pub mod intent;
pub mod profiles;
pub mod provider;
pub mod search;
pub mod speech;
pub mod telemetry;
pub mod voice;
pub mod weather;
