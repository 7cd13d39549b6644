//! Copying declared defaults into slots.
//!
//! This is the first step in composing configuration: every `Var` with both
//! a `Default` and a `Slot` has its default written to all of its targets.
//! Higher-priority sources (command line, config file, environment) are
//! applied afterwards by the caller and simply overwrite these values.
//!
//! Run this only on a tree that passed [`validate`](crate::validate). A
//! [`DefaultsError`] means validation was skipped or is broken; callers
//! should treat it as fatal.

use thiserror::Error;
use tracing::{debug, info};

use crate::node::{Element, ElementKind, Node, NodeKind};
use crate::value::ValueType;

/// Invariant violations found while applying defaults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefaultsError {
    /// The node passed as a variable is some other kind.
    #[error("expected a Var, found {0}")]
    NotAVar(NodeKind),
    /// A default that does not fit the variable's slot.
    #[error("Default of Var {var:?} is a {found}, which cannot be stored in a {slot} Slot")]
    TypeMismatch {
        var: String,
        found: ElementKind,
        slot: ValueType,
    },
}

/// Counts from [`apply_all_defaults`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultsReport {
    /// Variables visited.
    pub vars_found: usize,
    /// Variables whose default was written.
    pub filled: usize,
}

/// Writes the `Default` of `var` into every target of its `Slot`.
///
/// Returns `Ok(false)` when the variable has no default or no slot. Either
/// every target is written or none is.
///
/// # Examples
///
/// ```
/// use tri_core::build::*;
/// use tri_core::{Target, apply_defaults, shared};
///
/// let datadir = shared(String::from("/not/the/default/path"));
/// let v = var("datadir")
///     .with(brief("where data lives"))
///     .with(default("~/.pod"))
///     .with(slot([Target::bind(&datadir)]));
///
/// assert_eq!(apply_defaults(&v), Ok(true));
/// assert_eq!(*datadir.lock().unwrap(), "~/.pod");
/// ```
pub fn apply_defaults(var: &Node) -> Result<bool, DefaultsError> {
    if var.kind != NodeKind::Var {
        return Err(DefaultsError::NotAVar(var.kind));
    }
    let Some(default) = var.find(NodeKind::Default).and_then(|d| d.elements.first()) else {
        return Ok(false);
    };
    let targets: Vec<_> = var.slot_targets().collect();
    let Some(slot_type) = targets.first().map(|t| t.value_type()) else {
        return Ok(false);
    };

    let mismatch = || DefaultsError::TypeMismatch {
        var: var.name().unwrap_or_default().to_string(),
        found: default.kind(),
        slot: slot_type,
    };
    let Element::Value(value) = default else {
        return Err(mismatch());
    };
    if targets.iter().any(|t| t.value_type() != value.value_type()) {
        return Err(mismatch());
    }

    for target in &targets {
        target.assign(value);
    }
    debug!(
        var = var.name(),
        value = %value,
        targets = targets.len(),
        "applied default"
    );
    Ok(true)
}

/// Applies defaults for the variables of an `Application` and of each of
/// its commands.
///
/// # Errors
///
/// Stops at the first [`DefaultsError`].
pub fn apply_all_defaults(app: &Node) -> Result<DefaultsReport, DefaultsError> {
    let mut report = DefaultsReport::default();
    let vars = app.vars().chain(app.commands().flat_map(|c| c.vars()));
    for var in vars {
        report.vars_found += 1;
        if apply_defaults(var)? {
            report.filled += 1;
        }
    }
    info!(
        app = app.name(),
        vars = report.vars_found,
        filled = report.filled,
        "defaults applied"
    );
    Ok(report)
}
