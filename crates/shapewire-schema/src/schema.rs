//! Schema nodes and member derivation.

use std::fmt;
use std::sync::{Arc, LazyLock, OnceLock};

use indexmap::IndexMap;

use crate::traits::{StaticTrait, Trait, TraitMap};
use crate::{SchemaError, ShapeId, ShapeType};

pub type Members = IndexMap<String, Arc<Schema>>;

static NO_MEMBERS: LazyLock<Members> = LazyLock::new(IndexMap::new);

/// Static description of a shape: identity, type, members and traits.
///
/// Schemas are built once and shared read-only behind `Arc`. A member schema
/// does not copy its target; it keeps a [`Target`] and forwards member and
/// trait lookups to it, which is what lets a structure refer to itself.
pub struct Schema {
    id: ShapeId,
    shape_type: ShapeType,
    traits: TraitMap,
    members: Members,
    target: Option<Target>,
}

impl Schema {
    /// A shape without members.
    pub fn new(id: ShapeId, shape_type: ShapeType) -> Arc<Schema> {
        Self::with_traits(id, shape_type, TraitMap::new())
    }

    pub fn with_traits(id: ShapeId, shape_type: ShapeType, traits: TraitMap) -> Arc<Schema> {
        Arc::new(Schema {
            id,
            shape_type,
            traits,
            members: Members::new(),
            target: None,
        })
    }

    /// Derives the member `name` of `container` from `target`.
    ///
    /// The member takes the target's type and members. Its traits start from
    /// the target's and `traits` override them id by id.
    pub fn new_member(
        container: &ShapeId,
        name: &str,
        target: impl Into<Target>,
        traits: TraitMap,
    ) -> Arc<Schema> {
        let target = target.into();
        Arc::new(Schema {
            id: container.root().with_member(name),
            shape_type: target.shape_type(),
            traits,
            members: Members::new(),
            target: Some(target),
        })
    }

    pub fn builder(id: ShapeId, shape_type: ShapeType) -> SchemaBuilder {
        SchemaBuilder::new(id, shape_type)
    }

    pub fn id(&self) -> &ShapeId {
        &self.id
    }

    pub fn shape_type(&self) -> ShapeType {
        self.shape_type
    }

    /// Member name when this schema describes a member.
    pub fn member_name(&self) -> Option<&str> {
        self.id.member.as_deref()
    }

    pub fn is_member(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    /// Members in declaration order. For a member schema these are the
    /// target's members; empty for scalars and unresolved targets.
    pub fn members(&self) -> &Members {
        match &self.target {
            Some(target) => target.resolve().map(|t| t.members()).unwrap_or(&*NO_MEMBERS),
            None => &self.members,
        }
    }

    pub fn member(&self, name: &str) -> Option<&Schema> {
        self.members().get(name).map(|m| m.as_ref())
    }

    /// Traits declared directly on this schema (not inherited from a target).
    pub fn own_traits(&self) -> &TraitMap {
        &self.traits
    }

    /// Own traits overlaid on the target's traits.
    pub fn traits(&self) -> TraitMap {
        match self.target.as_ref().and_then(Target::resolve) {
            Some(target) => self.traits.merged_over(&target.traits()),
            None => self.traits.clone(),
        }
    }

    /// Typed trait lookup. Own traits win over the target's.
    pub fn get_trait<T: StaticTrait>(&self) -> Option<&T> {
        self.traits.get::<T>().or_else(|| {
            self.target
                .as_ref()
                .and_then(Target::resolve)
                .and_then(|t| t.get_trait::<T>())
        })
    }

    pub fn trait_by_id(&self, id: &str) -> Option<&dyn Trait> {
        self.traits.get_by_id(id).or_else(|| {
            self.target
                .as_ref()
                .and_then(Target::resolve)
                .and_then(|t| t.trait_by_id(id))
        })
    }

    pub fn has_trait<T: StaticTrait>(&self) -> bool {
        self.get_trait::<T>().is_some()
    }
}

/// Free-function form of [`Schema::get_trait`].
pub fn schema_trait<T: StaticTrait>(schema: &Schema) -> Option<&T> {
    schema.get_trait::<T>()
}

impl fmt::Debug for Schema {
    // Members are listed by name only: schema graphs may be cyclic.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("id", &self.id.to_string())
            .field("type", &self.shape_type)
            .field("members", &self.members().keys().collect::<Vec<_>>())
            .field("traits", &self.traits.ids().collect::<Vec<_>>())
            .finish()
    }
}

struct Slot {
    id: ShapeId,
    shape_type: ShapeType,
    schema: OnceLock<Arc<Schema>>,
}

/// Reference from a member to the shape it targets.
///
/// A target is either already resolved (built from an existing schema) or a
/// placeholder declared through [`crate::SchemaRegistry::declare`] and filled
/// later by [`crate::SchemaRegistry::define`].
#[derive(Clone)]
pub struct Target(Arc<Slot>);

impl Target {
    pub(crate) fn placeholder(id: ShapeId, shape_type: ShapeType) -> Self {
        Target(Arc::new(Slot {
            id,
            shape_type,
            schema: OnceLock::new(),
        }))
    }

    pub fn id(&self) -> &ShapeId {
        &self.0.id
    }

    pub fn shape_type(&self) -> ShapeType {
        self.0.shape_type
    }

    pub fn resolve(&self) -> Option<&Arc<Schema>> {
        self.0.schema.get()
    }

    pub fn is_resolved(&self) -> bool {
        self.resolve().is_some()
    }

    pub(crate) fn fill(&self, schema: Arc<Schema>) -> Result<(), SchemaError> {
        if schema.shape_type() != self.shape_type() {
            return Err(SchemaError::TypeMismatch {
                id: self.id().clone(),
                declared: self.shape_type(),
                defined: schema.shape_type(),
            });
        }
        self.0
            .schema
            .set(schema)
            .map_err(|_| SchemaError::AlreadyDefined(self.id().clone()))
    }

    pub(crate) fn same_slot(&self, other: &Target) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<&Arc<Schema>> for Target {
    fn from(schema: &Arc<Schema>) -> Self {
        Target(Arc::new(Slot {
            id: schema.id().clone(),
            shape_type: schema.shape_type(),
            schema: OnceLock::from(Arc::clone(schema)),
        }))
    }
}

impl From<&LazyLock<Arc<Schema>>> for Target {
    fn from(schema: &LazyLock<Arc<Schema>>) -> Self {
        Target::from(&**schema)
    }
}

impl From<&Target> for Target {
    fn from(target: &Target) -> Self {
        target.clone()
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("id", &self.id().to_string())
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

/// Builds an aggregate (or annotated scalar) schema.
///
/// Construction problems are collected and reported by [`SchemaBuilder::build`]
/// so generated schema tables fail at initialization, not at use.
pub struct SchemaBuilder {
    id: ShapeId,
    shape_type: ShapeType,
    traits: TraitMap,
    members: Members,
    error: Option<SchemaError>,
}

impl SchemaBuilder {
    pub fn new(id: ShapeId, shape_type: ShapeType) -> Self {
        Self {
            id,
            shape_type,
            traits: TraitMap::new(),
            members: Members::new(),
            error: None,
        }
    }

    pub fn with_trait<T: Trait>(mut self, value: T) -> Self {
        self.traits.insert(value);
        self
    }

    pub fn member(self, name: &str, target: impl Into<Target>) -> Self {
        self.member_with_traits(name, target, TraitMap::new())
    }

    pub fn member_with_traits(
        mut self,
        name: &str,
        target: impl Into<Target>,
        traits: TraitMap,
    ) -> Self {
        if self.error.is_some() {
            return self;
        }
        if !self.shape_type.is_aggregate() {
            self.error = Some(SchemaError::MembersOnScalar {
                shape: self.id.clone(),
                shape_type: self.shape_type,
            });
        } else if name.is_empty() {
            self.error = Some(SchemaError::EmptyMemberName(self.id.clone()));
        } else if self.members.contains_key(name) {
            self.error = Some(SchemaError::DuplicateMember {
                shape: self.id.clone(),
                member: name.to_owned(),
            });
        } else {
            let member = Schema::new_member(&self.id, name, target, traits);
            self.members.insert(name.to_owned(), member);
        }
        self
    }

    pub fn build(self) -> Result<Arc<Schema>, SchemaError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(Arc::new(Schema {
            id: self.id,
            shape_type: self.shape_type,
            traits: self.traits,
            members: self.members,
            target: None,
        }))
    }
}
