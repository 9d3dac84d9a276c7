// src/packages/mod.rs

//! Installed-package queries
//!
//! Wrappers around the system `rpm` tool. The engine only consumes their
//! line-oriented text output.

pub mod rpm_query;

pub use rpm_query::{InstalledRpmInfo, is_rpm_available, list_installed_packages};
