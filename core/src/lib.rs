//! Declarative specification trees for command-line applications.
//!
//! This crate defines the model an application uses to declare its command
//! line, and the validator that certifies such a declaration before anything
//! is parsed:
//!
//! - [`Node`]: a tagged, ordered sequence of [`Element`]s. Its
//!   [`NodeKind`] says what it is (`Application`, `Command`, `Var`,
//!   `Brief`, …). Constructors for every kind live in [`build`].
//! - [`Value`] / [`ValueType`]: the closed set of types a variable can hold.
//! - [`Target`]: a write capability into storage owned by the application,
//!   grouped into a `Slot`.
//! - [`validate`] / [`Validator`]: recursive, fail-fast validation returning
//!   the first [`ValidationError`] together with its position in the tree.
//! - [`apply_defaults`] / [`apply_all_defaults`]: copy each declared
//!   `Default` into the targets of its `Slot`.
//! - [`Outline`]: a serializable summary of a validated tree.
//!
//! # Example
//!
//! ```
//! use tri_core::build::*;
//! use tri_core::{Target, apply_all_defaults, shared, validate};
//!
//! let datadir = shared(String::from("/not/the/default/path"));
//!
//! let app = application("appname")
//!     .with(brief("an example application"))
//!     .with(version(0, 1, 1).with("alpha"))
//!     .with(default_command("ctl"))
//!     .with(var("datadir")
//!         .with(short('d'))
//!         .with(brief("where data is kept"))
//!         .with(default("~/.pod"))
//!         .with(slot([Target::bind(&datadir)])))
//!     .with(commands([command("ctl")
//!         .with(brief("control the node"))
//!         .with_action(|_| 0)]));
//!
//! validate(&app).expect("declaration is valid");
//! apply_all_defaults(&app).unwrap();
//! assert_eq!(*datadir.lock().unwrap(), "~/.pod");
//! ```

mod defaults;
mod node;
mod outline;
mod policy;
mod slot;
mod validate;
mod value;

pub use defaults::{DefaultsError, DefaultsReport, apply_all_defaults, apply_defaults};
pub use node::{Action, Element, ElementKind, Node, NodeKind, build};
pub use outline::{CommandOutline, ExampleOutline, Outline, TriggerOutline, VarOutline};
pub use policy::{
    DEFAULT_MAX_SNIPPET_LEN, DEFAULT_MAX_TEXT_LEN, DEFAULT_MAX_VERSION_COMPONENT,
    DEFAULT_MIN_NAME_LEN, ValidationPolicy,
};
pub use slot::{Setter, Shared, SlotValue, Target, shared};
pub use validate::{Arity, ValidationError, Validator, validate};
pub use value::{Value, ValueType};
