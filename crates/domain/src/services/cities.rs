//! City option grouping.

use std::collections::HashSet;

use uuid::Uuid;

use crate::models::location::CityOption;

/// Collapses locations into one option per city name.
///
/// Each city keeps the id of its first occurrence, and options appear in the
/// order their city was first seen. Blank names are skipped.
pub fn group_cities<I, S>(locations: I) -> Vec<CityOption>
where
    I: IntoIterator<Item = (Uuid, S)>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut options = Vec::new();

    for (id, name) in locations {
        let name = name.as_ref();
        if name.trim().is_empty() {
            continue;
        }
        if seen.insert(name.to_string()) {
            options.push(CityOption {
                id,
                name: name.to_string(),
            });
        }
    }

    options
}
