//! Storage-location capabilities used by `Slot` nodes.
//!
//! A [`Target`] never owns the storage it writes to. It wraps a typed
//! [`Setter`] supplied by the embedding application, usually built from a
//! [`Shared`] cell with [`Target::bind`] or from a closure with
//! [`Target::from_fn`].
//!
//! # Examples
//!
//! ```
//! use tri_core::{Target, Value, ValueType, shared};
//!
//! let datadir = shared(String::from("/var/lib/app"));
//! let target = Target::bind(&datadir);
//! assert_eq!(target.value_type(), ValueType::Text);
//!
//! assert!(target.assign(&Value::from("~/.pod")));
//! assert_eq!(*datadir.lock().unwrap(), "~/.pod");
//!
//! // A value of another type is refused and nothing is written.
//! assert!(!target.assign(&Value::from(3i64)));
//! assert_eq!(*datadir.lock().unwrap(), "~/.pod");
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::value::{Value, ValueType};

/// Application-owned storage that can be bound into a slot.
pub type Shared<T> = Arc<Mutex<T>>;

/// Wraps `value` in a [`Shared`] cell.
pub fn shared<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}

/// Write capability for one storage location of type `T`.
pub struct Setter<T>(Arc<dyn Fn(T) + Send + Sync>);

impl<T> Setter<T> {
    pub fn new(f: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Writes `value` to the location.
    pub fn set(&self, value: T) {
        (self.0)(value)
    }
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

/// Rust types that may back a slot, one per [`ValueType`].
pub trait SlotValue: Sized + Send + 'static {
    const TYPE: ValueType;

    /// Tags a setter with this type.
    fn into_target(setter: Setter<Self>) -> Target;
}

macro_rules! slot_value {
    ($ty:ty, $variant:ident) => {
        impl SlotValue for $ty {
            const TYPE: ValueType = ValueType::$variant;

            fn into_target(setter: Setter<Self>) -> Target {
                Target::$variant(setter)
            }
        }
    };
}

slot_value!(bool, Bool);
slot_value!(String, Text);
slot_value!(Vec<String>, TextList);
slot_value!(i64, Integer);
slot_value!(u32, Unsigned);
slot_value!(f64, Float);
slot_value!(Duration, Duration);

/// A typed reference to one caller-owned storage location.
#[derive(Clone)]
pub enum Target {
    Bool(Setter<bool>),
    Text(Setter<String>),
    TextList(Setter<Vec<String>>),
    Integer(Setter<i64>),
    Unsigned(Setter<u32>),
    Float(Setter<f64>),
    Duration(Setter<Duration>),
}

impl Target {
    /// Builds a target from a closure that receives the resolved value.
    pub fn from_fn<T: SlotValue>(f: impl Fn(T) + Send + Sync + 'static) -> Self {
        T::into_target(Setter::new(f))
    }

    /// Builds a target that overwrites the contents of `cell`.
    ///
    /// A poisoned lock is still written to; the previous holder's panic does
    /// not make the stored value unusable for a plain overwrite.
    pub fn bind<T: SlotValue>(cell: &Shared<T>) -> Self {
        let cell = Arc::clone(cell);
        Self::from_fn(move |value: T| {
            let mut guard = cell.lock().unwrap_or_else(PoisonError::into_inner);
            *guard = value;
        })
    }

    /// Returns the type of value this target stores.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Bool,
            Self::Text(_) => ValueType::Text,
            Self::TextList(_) => ValueType::TextList,
            Self::Integer(_) => ValueType::Integer,
            Self::Unsigned(_) => ValueType::Unsigned,
            Self::Float(_) => ValueType::Float,
            Self::Duration(_) => ValueType::Duration,
        }
    }

    /// Writes `value` through this target.
    ///
    /// Returns `false` without writing when the value's type differs from
    /// [`value_type`](Self::value_type).
    pub fn assign(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Bool(s), Value::Bool(v)) => s.set(*v),
            (Self::Text(s), Value::Text(v)) => s.set(v.clone()),
            (Self::TextList(s), Value::TextList(v)) => s.set(v.clone()),
            (Self::Integer(s), Value::Integer(v)) => s.set(*v),
            (Self::Unsigned(s), Value::Unsigned(v)) => s.set(*v),
            (Self::Float(s), Value::Float(v)) => s.set(*v),
            (Self::Duration(s), Value::Duration(v)) => s.set(*v),
            _ => return false,
        }
        true
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Target({})", self.value_type())
    }
}
