//! Command-line front-end for maskmap profiles and settings.

pub mod commands;
pub mod logging;
pub mod replay;
pub mod settings;
pub mod workspace;
