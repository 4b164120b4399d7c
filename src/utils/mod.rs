pub mod config;
pub mod context;
pub mod docker;
pub mod output;
pub mod paths;
pub mod tools;
