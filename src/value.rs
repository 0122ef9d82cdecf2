//! Values crossing the host boundary.
//!
//! The host hands every argument over as a [`Value`]. Objects minted by this
//! crate travel as [`Value::User`] carrying a [`Handle`]; anything the host
//! received from some other module arrives as [`Value::Foreign`].

use std::fmt;

/// Opaque reference to a slot in an [`ObjectStore`](crate::ObjectStore).
///
/// The generation changes every time a slot is reused, so a handle that
/// outlived its object never resolves to whatever took its place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

impl Handle {
    pub(crate) fn slot(self) -> usize {
        self.index
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<user-ptr {}.{}>", self.index, self.generation)
    }
}

/// A host value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Nil,
    T,
    Integer(i64),
    Symbol(String),
    Str(String),
    Cons(Box<Value>, Box<Value>),
    User(Handle),
    Foreign(u64),
}

impl Value {
    pub fn symbol(name: impl Into<String>) -> Self {
        Value::Symbol(name.into())
    }

    pub fn cons(car: Value, cdr: Value) -> Self {
        Value::Cons(Box::new(car), Box::new(cdr))
    }

    pub fn from_bool(b: bool) -> Self {
        if b {
            Value::T
        } else {
            Value::Nil
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Host truthiness: everything except `nil` is true.
    pub fn is_truthy(&self) -> bool {
        !self.is_nil()
    }

    pub fn as_handle(&self) -> Option<Handle> {
        match self {
            Value::User(handle) => Some(*handle),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Value::Symbol(name) => Some(name),
            _ => None,
        }
    }
}

impl From<Handle> for Value {
    fn from(handle: Handle) -> Self {
        Value::User(handle)
    }
}

impl From<Option<Handle>> for Value {
    fn from(handle: Option<Handle>) -> Self {
        handle.map_or(Value::Nil, Value::User)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Integer(n as i64)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::T => f.write_str("t"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Symbol(name) => f.write_str(name),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Cons(car, cdr) => write!(f, "({car} . {cdr})"),
            Value::User(handle) => write!(f, "{handle}"),
            Value::Foreign(id) => write!(f, "#<foreign {id:#x}>"),
        }
    }
}
