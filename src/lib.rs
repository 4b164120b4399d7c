//! Satchel packages Python applications as single-file Linux AppImages.
//!
//! The core of the crate decides, per app and per host platform, where
//! build steps execute: directly on the host, or inside a generated
//! build-environment container. Tool verification state lives in a
//! [`utils::tools::ToolRegistry`] shared across build phases, so a later
//! phase derived from an earlier one never repeats verification work.

pub mod commands;
pub mod utils;
