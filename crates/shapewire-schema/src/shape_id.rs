//! Shape identifiers: `namespace#Name` and `namespace#Name$member`.

use std::fmt;
use std::str::FromStr;

use crate::SchemaError;

/// Identity of a shape, or of one member of a shape when `member` is set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId {
    pub namespace: String,
    pub name: String,
    pub member: Option<String>,
}

impl ShapeId {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            member: None,
        }
    }

    /// Returns the id of the member `member` of this shape.
    pub fn with_member(&self, member: impl Into<String>) -> Self {
        Self {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            member: Some(member.into()),
        }
    }

    /// Returns the id of the containing shape (drops the member part).
    pub fn root(&self) -> Self {
        Self {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            member: None,
        }
    }

    pub fn is_member(&self) -> bool {
        self.member.is_some()
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.namespace, self.name)?;
        if let Some(member) = &self.member {
            write!(f, "${member}")?;
        }
        Ok(())
    }
}

impl FromStr for ShapeId {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SchemaError::InvalidShapeId(s.to_owned());
        let (namespace, rest) = s.split_once('#').ok_or_else(invalid)?;
        let (name, member) = match rest.split_once('$') {
            Some((name, member)) => (name, Some(member)),
            None => (rest, None),
        };
        if namespace.is_empty() || name.is_empty() || name.contains('#') {
            return Err(invalid());
        }
        match member {
            Some(m) if m.is_empty() || m.contains('$') => Err(invalid()),
            _ => Ok(Self {
                namespace: namespace.to_owned(),
                name: name.to_owned(),
                member: member.map(str::to_owned),
            }),
        }
    }
}
