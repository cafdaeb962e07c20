use std::any::Any;
use std::sync::Arc;

use shapewire_schema::traits::{JsonName, Sensitive};
use shapewire_schema::{
    prelude, Schema, SchemaError, SchemaRegistry, ShapeId, ShapeType, StaticTrait, Trait, TraitMap,
};

fn id(name: &str) -> ShapeId {
    ShapeId::new("com.example.graph", name)
}

#[derive(Debug, PartialEq)]
struct Pagination {
    page_size: &'static str,
}

impl StaticTrait for Pagination {
    const ID: &'static str = "com.example.graph#pagination";
}

impl Trait for Pagination {
    fn trait_id(&self) -> &'static str {
        Self::ID
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// `Tree { label, children: Forest }`, `Forest = list<Tree>`.
fn tree_graph() -> (SchemaRegistry, Arc<Schema>, Arc<Schema>) {
    let mut registry = SchemaRegistry::new();
    let tree_ref = registry.declare(id("Tree"), ShapeType::Structure).unwrap();
    let forest_ref = registry.declare(id("Forest"), ShapeType::List).unwrap();

    let forest = Schema::builder(id("Forest"), ShapeType::List)
        .member("member", &tree_ref)
        .build()
        .unwrap();
    let tree = Schema::builder(id("Tree"), ShapeType::Structure)
        .with_trait(Pagination { page_size: "limit" })
        .member_with_traits(
            "label",
            &prelude::STRING,
            TraitMap::new().with(JsonName("Label".into())),
        )
        .member("children", &forest_ref)
        .build()
        .unwrap();

    registry.define(Arc::clone(&forest)).unwrap();
    registry.define(Arc::clone(&tree)).unwrap();
    (registry, tree, forest)
}

#[test]
fn mutual_recursion_resolves_both_ways() {
    let (registry, tree, forest) = tree_graph();
    registry.validate().unwrap();
    assert_eq!(registry.len(), 2);

    let children = tree.member("children").unwrap();
    assert_eq!(children.shape_type(), ShapeType::List);
    let item = children.member("member").unwrap();
    assert_eq!(item.shape_type(), ShapeType::Structure);
    // walking the cycle lands on the same members
    let again = item.member("children").unwrap().member("member").unwrap();
    assert_eq!(
        again.members().keys().collect::<Vec<_>>(),
        vec!["label", "children"]
    );
    assert!(Arc::ptr_eq(
        registry.get(&id("Forest")).unwrap(),
        &forest
    ));
}

#[test]
fn member_traits_overlay_target_traits() {
    let (registry, tree, _) = tree_graph();
    registry.validate().unwrap();

    let label = tree.member("label").unwrap();
    assert_eq!(label.id().to_string(), "com.example.graph#Tree$label");
    assert_eq!(label.get_trait::<JsonName>(), Some(&JsonName("Label".into())));

    // a member targeting Tree inherits the custom trait
    let item = tree.member("children").unwrap().member("member").unwrap();
    assert_eq!(
        item.get_trait::<Pagination>(),
        Some(&Pagination { page_size: "limit" })
    );
    assert!(item.own_traits().is_empty());
    assert!(!item.has_trait::<Sensitive>());
    assert!(item.trait_by_id(Pagination::ID).is_some());
}

#[test]
fn undefined_declarations_fail_validation() {
    let mut registry = SchemaRegistry::new();
    let missing = registry.declare(id("Missing"), ShapeType::Structure).unwrap();
    let holder = Schema::builder(id("Holder"), ShapeType::Structure)
        .member("inner", &missing)
        .build()
        .unwrap();
    registry.define(holder).unwrap();
    assert_eq!(
        registry.validate(),
        Err(SchemaError::Unresolved(id("Missing")))
    );
    assert!(registry.get(&id("Missing")).is_none());
}

#[test]
fn conflicting_definitions_are_rejected() {
    let mut registry = SchemaRegistry::new();
    registry.declare(id("Tree"), ShapeType::Structure).unwrap();
    assert!(matches!(
        registry.declare(id("Tree"), ShapeType::Union),
        Err(SchemaError::TypeMismatch { .. })
    ));
    assert!(matches!(
        registry.define(Schema::new(id("Tree"), ShapeType::Map)),
        Err(SchemaError::TypeMismatch { .. })
    ));
    registry
        .define(Schema::new(id("Tree"), ShapeType::Structure))
        .unwrap();
    assert_eq!(
        registry
            .define(Schema::new(id("Tree"), ShapeType::Structure))
            .unwrap_err(),
        SchemaError::AlreadyDefined(id("Tree"))
    );
}

#[test]
fn members_must_point_at_the_registered_shape() {
    let mut registry = SchemaRegistry::new();
    let leaf = Schema::new(id("Leaf"), ShapeType::Structure);
    registry.define(Arc::clone(&leaf)).unwrap();

    let impostor = Schema::new(id("Leaf"), ShapeType::Structure);
    let holder = Schema::builder(id("Holder"), ShapeType::Structure)
        .member("leaf", &impostor)
        .build()
        .unwrap();
    registry.define(holder).unwrap();
    assert_eq!(registry.validate(), Err(SchemaError::Shadowed(id("Leaf"))));
}
