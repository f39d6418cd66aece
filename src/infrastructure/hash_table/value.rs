//! Stored values, value tags and operation outcomes

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::types::TableResult;

/// Value tag, the discriminant of a stored [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueTag {
    /// Owned text
    Text,
    /// Signed integer number
    Integer,
    /// Floating-point number
    Float,
    /// Opaque shared reference
    Reference,
}

impl fmt::Display for ValueTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueTag::Text => write!(f, "TEXT"),
            ValueTag::Integer => write!(f, "INTEGER"),
            ValueTag::Float => write!(f, "FLOAT"),
            ValueTag::Reference => write!(f, "REFERENCE"),
        }
    }
}

/// Opaque reference value
///
/// The table never looks inside a reference. Two references are equal only
/// when they are handles to the same allocation.
#[derive(Clone)]
pub struct Reference(Arc<dyn Any + Send + Sync>);

impl Reference {
    /// Wrap a value in a new shared handle
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Reference(Arc::new(value))
    }

    /// Wrap an existing shared handle
    pub fn from_arc(handle: Arc<dyn Any + Send + Sync>) -> Self {
        Reference(handle)
    }

    /// Borrow the referenced value if it has type `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.0).downcast_ref::<T>()
    }

    /// True if both handles point at the same allocation
    pub fn ptr_eq(&self, other: &Reference) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Number of live handles to the referenced allocation
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0) as *const ()
    }
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reference({:p})", self.addr())
    }
}

/// A stored value
///
/// Equality follows the insert-or-update rule: text compares by content,
/// numbers with `==` (so a NaN float never equals itself), references by
/// identity, and values of different tags are never equal.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Reference(Reference),
}

impl Value {
    /// Build a text value from a private copy of `value`
    pub fn try_text(value: &str) -> TableResult<Self> {
        Ok(Value::Text(copy_text(value)?))
    }

    /// Tag of this value
    pub fn tag(&self) -> ValueTag {
        match self {
            Value::Text(_) => ValueTag::Text,
            Value::Integer(_) => ValueTag::Integer,
            Value::Float(_) => ValueTag::Float,
            Value::Reference(_) => ValueTag::Reference,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Value::Reference(reference) => Some(reference),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => write!(f, "{}", text),
            Value::Integer(number) => write!(f, "{}", number),
            Value::Float(number) => write!(f, "{}", number),
            Value::Reference(reference) => write!(f, "{:p}", reference.addr()),
        }
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Value::Integer(number)
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Value::Float(number)
    }
}

impl From<Reference> for Value {
    fn from(reference: Reference) -> Self {
        Value::Reference(reference)
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

/// A value on its way into a chain
///
/// Comparing against the stored value needs no allocation. The owned
/// [`Value`] is only built once the chain decides to store it.
pub(crate) trait PendingValue {
    fn tag(&self) -> ValueTag;

    /// True if `stored` equals this value under the insert-or-update rule
    fn matches(&self, stored: &Value) -> bool;

    fn try_into_value(self) -> TableResult<Value>;
}

impl PendingValue for Value {
    fn tag(&self) -> ValueTag {
        Value::tag(self)
    }

    fn matches(&self, stored: &Value) -> bool {
        self == stored
    }

    fn try_into_value(self) -> TableResult<Value> {
        Ok(self)
    }
}

/// Caller-owned text, copied only when it is stored
pub(crate) struct BorrowedText<'a>(pub &'a str);

impl PendingValue for BorrowedText<'_> {
    fn tag(&self) -> ValueTag {
        ValueTag::Text
    }

    fn matches(&self, stored: &Value) -> bool {
        stored.as_text() == Some(self.0)
    }

    fn try_into_value(self) -> TableResult<Value> {
        Value::try_text(self.0)
    }
}

/// Outcome of a table operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Insert created a new entry
    Added,
    /// Insert overwrote the value of an existing entry
    Replaced,
    /// Insert found the identical key/value pair already stored
    AlreadyPresent,
    /// Delete removed an entry
    Deleted,
    /// Lookup or delete found no entry for the key
    NotFound,
    /// Lookup found an entry
    Found,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Added => write!(f, "ADDED"),
            Outcome::Replaced => write!(f, "REPLACED"),
            Outcome::AlreadyPresent => write!(f, "ALREADY_PRESENT"),
            Outcome::Deleted => write!(f, "DELETED"),
            Outcome::NotFound => write!(f, "NOT_FOUND"),
            Outcome::Found => write!(f, "FOUND"),
        }
    }
}

/// Copy text into a freshly allocated string, reporting allocation failure
/// instead of aborting.
pub(crate) fn copy_text(text: &str) -> TableResult<String> {
    let mut copy = String::new();
    copy.try_reserve_exact(text.len())?;
    copy.push_str(text);
    Ok(copy)
}
