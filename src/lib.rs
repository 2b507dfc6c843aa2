pub mod aggregate;
pub mod calendar;
pub mod config;
pub mod dataset;
pub mod error;
pub mod output;
pub mod reports;
pub mod source;
