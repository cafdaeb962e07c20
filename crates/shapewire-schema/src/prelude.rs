//! Shared schemas for the `smithy.api` prelude shapes.

use std::sync::{Arc, LazyLock};

use crate::{Schema, ShapeId, ShapeType};

pub const PRELUDE_NAMESPACE: &str = "smithy.api";

fn prelude(name: &str, shape_type: ShapeType) -> Arc<Schema> {
    Schema::new(ShapeId::new(PRELUDE_NAMESPACE, name), shape_type)
}

pub static BLOB: LazyLock<Arc<Schema>> = LazyLock::new(|| prelude("Blob", ShapeType::Blob));
pub static BOOLEAN: LazyLock<Arc<Schema>> =
    LazyLock::new(|| prelude("Boolean", ShapeType::Boolean));
pub static STRING: LazyLock<Arc<Schema>> = LazyLock::new(|| prelude("String", ShapeType::String));
pub static TIMESTAMP: LazyLock<Arc<Schema>> =
    LazyLock::new(|| prelude("Timestamp", ShapeType::Timestamp));
pub static BYTE: LazyLock<Arc<Schema>> = LazyLock::new(|| prelude("Byte", ShapeType::Byte));
pub static SHORT: LazyLock<Arc<Schema>> = LazyLock::new(|| prelude("Short", ShapeType::Short));
pub static INTEGER: LazyLock<Arc<Schema>> =
    LazyLock::new(|| prelude("Integer", ShapeType::Integer));
pub static LONG: LazyLock<Arc<Schema>> = LazyLock::new(|| prelude("Long", ShapeType::Long));
pub static FLOAT: LazyLock<Arc<Schema>> = LazyLock::new(|| prelude("Float", ShapeType::Float));
pub static DOUBLE: LazyLock<Arc<Schema>> = LazyLock::new(|| prelude("Double", ShapeType::Double));
pub static BIG_INTEGER: LazyLock<Arc<Schema>> =
    LazyLock::new(|| prelude("BigInteger", ShapeType::BigInteger));
pub static BIG_DECIMAL: LazyLock<Arc<Schema>> =
    LazyLock::new(|| prelude("BigDecimal", ShapeType::BigDecimal));
pub static DOCUMENT: LazyLock<Arc<Schema>> =
    LazyLock::new(|| prelude("Document", ShapeType::Document));
