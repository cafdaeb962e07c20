//! Two-phase schema construction for recursive shape graphs.
//!
//! Shapes that are referenced before they exist are first *declared*, which
//! yields a [`Target`] members can point at, and later *defined*. Once every
//! shape is defined, [`SchemaRegistry::validate`] checks the whole graph.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::schema::{Schema, Target};
use crate::{SchemaError, ShapeId, ShapeType};

#[derive(Debug, Default)]
pub struct SchemaRegistry {
    slots: IndexMap<ShapeId, Target>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `id` with its shape type and returns a target for it.
    ///
    /// Declaring the same id twice returns the same target; the types must
    /// agree.
    pub fn declare(&mut self, id: ShapeId, shape_type: ShapeType) -> Result<Target, SchemaError> {
        if let Some(existing) = self.slots.get(&id) {
            if existing.shape_type() != shape_type {
                return Err(SchemaError::TypeMismatch {
                    id,
                    declared: existing.shape_type(),
                    defined: shape_type,
                });
            }
            return Ok(existing.clone());
        }
        let target = Target::placeholder(id.clone(), shape_type);
        self.slots.insert(id, target.clone());
        Ok(target)
    }

    /// Defines a shape, filling its placeholder if one was declared.
    pub fn define(&mut self, schema: Arc<Schema>) -> Result<Target, SchemaError> {
        if schema.is_member() {
            return Err(SchemaError::NotAShape(schema.id().clone()));
        }
        let id = schema.id().clone();
        match self.slots.get(&id) {
            Some(slot) => {
                slot.fill(schema)?;
                Ok(slot.clone())
            }
            None => {
                let target = Target::from(&schema);
                self.slots.insert(id, target.clone());
                Ok(target)
            }
        }
    }

    pub fn get(&self, id: &ShapeId) -> Option<&Arc<Schema>> {
        self.slots.get(id).and_then(Target::resolve)
    }

    pub fn target(&self, id: &ShapeId) -> Option<&Target> {
        self.slots.get(id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Defined schemas in declaration order.
    pub fn schemas(&self) -> impl Iterator<Item = &Arc<Schema>> + '_ {
        self.slots.values().filter_map(Target::resolve)
    }

    /// Build-time validation pass.
    ///
    /// Every declared shape must be defined, and every member of every defined
    /// shape must point at a resolved target of the declared type. A member
    /// whose target carries this registry's id must use this registry's slot.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for (id, slot) in &self.slots {
            let schema = slot
                .resolve()
                .ok_or_else(|| SchemaError::Unresolved(id.clone()))?;
            for member in schema.members().values() {
                let Some(target) = member.target() else {
                    continue;
                };
                if !target.is_resolved() {
                    return Err(SchemaError::Unresolved(target.id().clone()));
                }
                if let Some(registered) = self.slots.get(target.id()) {
                    if !registered.same_slot(target) && !Self::same_schema(registered, target) {
                        return Err(SchemaError::Shadowed(target.id().clone()));
                    }
                }
            }
        }
        Ok(())
    }

    fn same_schema(a: &Target, b: &Target) -> bool {
        match (a.resolve(), b.resolve()) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude;

    fn id(name: &str) -> ShapeId {
        ShapeId::new("com.example", name)
    }

    #[test]
    fn recursive_structure() {
        let mut registry = SchemaRegistry::new();
        let node = registry.declare(id("Node"), ShapeType::Structure).unwrap();
        let schema = Schema::builder(id("Node"), ShapeType::Structure)
            .member("value", &prelude::INTEGER)
            .member("next", &node)
            .build()
            .unwrap();
        registry.define(schema).unwrap();
        registry.validate().unwrap();

        let node = registry.get(&id("Node")).unwrap();
        let next = node.member("next").unwrap();
        assert_eq!(next.shape_type(), ShapeType::Structure);
        // the cycle is walkable
        let next_next = next.member("next").unwrap();
        assert!(next_next.member("value").is_some());
    }

    #[test]
    fn mutual_recursion_through_list() {
        let mut registry = SchemaRegistry::new();
        let tree = registry.declare(id("Tree"), ShapeType::Structure).unwrap();
        let children = Schema::builder(id("Children"), ShapeType::List)
            .member("member", &tree)
            .build()
            .unwrap();
        let children = registry.define(children).unwrap();
        let tree_schema = Schema::builder(id("Tree"), ShapeType::Structure)
            .member("children", &children)
            .build()
            .unwrap();
        registry.define(tree_schema).unwrap();
        registry.validate().unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.schemas().count(), 2);
    }

    #[test]
    fn undefined_declaration_fails_validation() {
        let mut registry = SchemaRegistry::new();
        registry.declare(id("Ghost"), ShapeType::Structure).unwrap();
        let err = registry.validate().unwrap_err();
        assert!(matches!(err, SchemaError::Unresolved(ref i) if i == &id("Ghost")));
    }

    #[test]
    fn member_pointing_at_foreign_placeholder_fails() {
        let mut other = SchemaRegistry::new();
        let ghost = other.declare(id("Ghost"), ShapeType::Structure).unwrap();
        let mut registry = SchemaRegistry::new();
        let holder = Schema::builder(id("Holder"), ShapeType::Structure)
            .member("g", &ghost)
            .build()
            .unwrap();
        registry.define(holder).unwrap();
        assert!(matches!(registry.validate(), Err(SchemaError::Unresolved(_))));
    }

    #[test]
    fn type_mismatch_on_define() {
        let mut registry = SchemaRegistry::new();
        registry.declare(id("Thing"), ShapeType::Union).unwrap();
        let schema = Schema::builder(id("Thing"), ShapeType::Structure).build().unwrap();
        let err = registry.define(schema).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::TypeMismatch { declared: ShapeType::Union, defined: ShapeType::Structure, .. }
        ));
    }

    #[test]
    fn double_definition_rejected() {
        let mut registry = SchemaRegistry::new();
        registry.declare(id("Once"), ShapeType::Structure).unwrap();
        let a = Schema::builder(id("Once"), ShapeType::Structure).build().unwrap();
        let b = Schema::builder(id("Once"), ShapeType::Structure).build().unwrap();
        registry.define(a).unwrap();
        assert!(matches!(registry.define(b), Err(SchemaError::AlreadyDefined(_))));
    }

    #[test]
    fn member_schema_is_not_a_shape() {
        let mut registry = SchemaRegistry::new();
        let holder = Schema::builder(id("Holder"), ShapeType::Structure)
            .member("a", &prelude::STRING)
            .build()
            .unwrap();
        let member = Arc::clone(holder.members().get("a").unwrap());
        assert!(matches!(registry.define(member), Err(SchemaError::NotAShape(_))));
    }
}
