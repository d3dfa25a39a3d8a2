//! Error types for the network object model.
//!
//! Failures come in two tiers. [`NomError`] covers referential problems:
//! unknown indices, duplicate ids, a node still wired into reactions, an
//! empty undo stack, or malformed serialized input. [`ValueError`] covers
//! input that is well-formed but out of range, or an index that exists but is
//! not part of the relation the caller named. Callers branch on the tier with
//! [`Error::is_value`] and on the kind with [`Error::code`].

use crate::model::Role;
use thiserror::Error;

pub type NomResult<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NomError {
    #[error("id not found: '{0}'")]
    IdNotFound(String),

    #[error("id already exists: '{0}'")]
    IdRepeat(String),

    #[error("node {0} still participates in a reaction")]
    NodeNotFree(u32),

    #[error("network index not found: {0}")]
    NetIndex(u32),

    #[error("reaction index not found: {0}")]
    ReactionIndex(u32),

    #[error("node index not found: {0}")]
    NodeIndex(u32),

    #[error("compartment index not found: {0}")]
    CompartmentIndex(u32),

    #[error("stoichiometry must be positive, got {0}")]
    Stoich(f64),

    #[error("{0} stack is empty")]
    StackEmpty(&'static str),

    #[error("malformed network data: {0}")]
    Json(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValueError {
    #[error("{param} out of range: {got}")]
    OutOfRange { param: &'static str, got: f64 },

    #[error("reaction needs at least one reactant and one product")]
    EmptySide,

    #[error("reactant and product sets are identical")]
    IdenticalSides,

    #[error("node {node} is not a {role:?} of reaction {reaction}")]
    NotInRelation { node: u32, reaction: u32, role: Role },

    #[error("primitive index {0} out of range")]
    PrimitiveIndex(i32),

    #[error("property '{property}' not supported by {primitive}")]
    UnsupportedProperty { property: String, primitive: &'static str },

    #[error("property '{0}' given a value of the wrong type")]
    PropertyType(String),

    #[error("unknown composite shape index {0}")]
    UnknownShape(usize),

    #[error("inconsistent state: {0}")]
    Inconsistent(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Nom(#[from] NomError),

    #[error(transparent)]
    Value(#[from] ValueError),
}

impl Error {
    pub fn is_value(&self) -> bool {
        matches!(self, Error::Value(_))
    }

    /// Numeric error code shared with scripting front-ends.
    pub fn code(&self) -> i32 {
        match self {
            Error::Nom(e) => match e {
                NomError::IdNotFound(_) => -2,
                NomError::IdRepeat(_) => -3,
                NomError::NodeNotFree(_) => -4,
                NomError::NetIndex(_) => -5,
                NomError::ReactionIndex(_) => -6,
                NomError::NodeIndex(_) => -7,
                NomError::Stoich(_) => -8,
                NomError::StackEmpty(_) => -9,
                NomError::Json(_) => -10,
                NomError::CompartmentIndex(_) => -13,
            },
            Error::Value(_) => -12,
        }
    }
}

pub(crate) fn out_of_range(param: &'static str, got: f64) -> Error {
    ValueError::OutOfRange { param, got }.into()
}

/// Fails with `OutOfRange` unless `ok` holds and `v` is finite.
pub(crate) fn ensure(ok: bool, param: &'static str, v: f64) -> NomResult<()> {
    if ok && v.is_finite() { Ok(()) } else { Err(out_of_range(param, v)) }
}

/// Ids of every entity share one length cap.
pub(crate) fn ensure_id(id: &str) -> NomResult<()> {
    ensure(id.len() <= crate::geometry::limits::MAX_ID_LEN, "id length", id.len() as f64)
}
