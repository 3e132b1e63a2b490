//! Configuration types.
//!
//! The rule set and safety parameters arrive already loaded; this module
//! only defines their shape, defaults and validation.

mod settings;

pub use settings::{
    ConfigError, FilterConfig, SafetyConfig, SelectionSettings, Settings, MAX_AGE_DAYS,
    MAX_BATCH_SIZE, MAX_PAGE_SIZE,
};
