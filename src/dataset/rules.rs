//! Built-in naming rules, one per storage family

use super::Dataset;
use crate::binding::Location;

/// Maps a location of one scheme family to a dataset identity.
pub trait SchemeRule: Send + Sync {
    fn dataset(&self, location: &Location) -> Dataset;
}

/// Local filesystem: namespace is the bare scheme, name the absolute path.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileRule;

impl SchemeRule for LocalFileRule {
    fn dataset(&self, location: &Location) -> Dataset {
        Dataset::new(location.scheme(), non_empty_path(location))
    }
}

/// Distributed filesystems and object stores.
///
/// The cluster (or bucket) is part of the namespace, so the same path on two
/// clusters names two datasets.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorityRule;

impl SchemeRule for AuthorityRule {
    fn dataset(&self, location: &Location) -> Dataset {
        let namespace = match location.authority() {
            Some(authority) => format!("{}://{}", location.scheme(), authority),
            None => location.scheme().to_string(),
        };
        Dataset::new(namespace, non_empty_path(location))
    }
}

/// `jdbc:<driver>://host[:port]/database`
///
/// The `jdbc:` wrapper is dropped from the namespace; the name is the
/// database path without its leading slash.
#[derive(Debug, Clone, Copy, Default)]
pub struct JdbcRule;

impl SchemeRule for JdbcRule {
    fn dataset(&self, location: &Location) -> Dataset {
        let driver = location
            .scheme()
            .strip_prefix("jdbc:")
            .unwrap_or(location.scheme());
        let namespace = format!("{}://{}", driver, location.authority().unwrap_or(""));
        Dataset::new(namespace, location.path().trim_start_matches('/'))
    }
}

fn non_empty_path(location: &Location) -> &str {
    match location.path() {
        "" => "/",
        path => path,
    }
}
