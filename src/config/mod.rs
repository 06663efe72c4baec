//! Configuration loading and management for the attendance engine.
//!
//! This module provides the schedule anchors, lunch window, workdays and
//! the ordered permission keyword table, either from built-in defaults or
//! from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use attendance_engine::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config/default").unwrap();
//! println!("Exit anchor: {}", loader.config().exit_anchor);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    LunchWindow, PermissionRule, PermissionsFile, ScheduleConfig, ScheduleFile,
    default_permission_rules,
};
