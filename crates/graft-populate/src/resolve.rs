use std::sync::Arc;

use graft_db::{Catalog, Schema};

use crate::request::PathOptions;
use crate::step::{Plan, PopulateStep};

/// Turn a dotted path into a plan of populate steps, starting at `root`.
///
/// Segments accumulate until they name a reference in the current schema;
/// that prefix becomes a step and the walk continues from the target
/// collection with whatever is left. Per-call `overrides` are keyed by the
/// full dotted path from the root and win over schema defaults.
///
/// The walk stops early when a target collection has no registered schema;
/// that step is still planned and fails when it runs.
pub fn resolve(catalog: &Catalog, root: &Schema, path: &str, overrides: &PathOptions) -> Plan {
    let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    let mut steps = Vec::new();
    let mut current: Option<Arc<Schema>> = None;
    let mut base = 0;

    for end in 0..segments.len() {
        let schema = current.as_deref().unwrap_or(root);
        let relative = segments[base..=end].join(".");
        let full = segments[..=end].join(".");

        let defaults = schema.default_options(&relative).unwrap_or_default();
        let options = match overrides.get(&full) {
            Some(extra) => defaults.merge(extra),
            None => defaults,
        };
        let Some(target) = options.reference.clone() else {
            continue;
        };

        steps.push(PopulateStep::new(
            schema.name.clone(),
            relative,
            target.clone(),
            options,
        ));
        base = end + 1;
        match catalog.get(&target) {
            Some(next) => current = Some(next),
            None => break,
        }
    }

    Plan {
        path: path.to_string(),
        steps,
    }
}
