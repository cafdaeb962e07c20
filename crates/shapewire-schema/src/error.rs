use thiserror::Error;

use crate::{ShapeId, ShapeType};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("invalid shape id: {0:?}")]
    InvalidShapeId(String),
    #[error("duplicate member {member:?} in {shape}")]
    DuplicateMember { shape: ShapeId, member: String },
    #[error("empty member name in {0}")]
    EmptyMemberName(ShapeId),
    #[error("{shape} is a {shape_type} and cannot have members")]
    MembersOnScalar { shape: ShapeId, shape_type: ShapeType },
    #[error("shape {0} was declared but never defined")]
    Unresolved(ShapeId),
    #[error("shape {id} declared as {declared} but defined as {defined}")]
    TypeMismatch {
        id: ShapeId,
        declared: ShapeType,
        defined: ShapeType,
    },
    #[error("shape {0} is already defined")]
    AlreadyDefined(ShapeId),
    #[error("{0} is a member schema, not a shape")]
    NotAShape(ShapeId),
    #[error("member target {0} does not use the registered definition")]
    Shadowed(ShapeId),
}
