//! Storage bindings: configurations, locations, and their resolution

mod config;
mod location;
mod resolver;

pub use config::{
    split_dir_list, ConfigSource, Configuration, LEGACY_INPUT_DIR, LEGACY_OUTPUT_DIR,
    MODERN_INPUT_DIR, MODERN_OUTPUT_DIR,
};
pub use location::Location;
pub use resolver::{BindingResolver, NodeLocations};
