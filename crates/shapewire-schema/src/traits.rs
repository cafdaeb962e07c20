//! Schema traits: typed annotations looked up by trait id.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A named annotation attached to a schema.
///
/// Trait instances are stored type-erased in a [`TraitMap`] and recovered with
/// [`TraitMap::get`] (or [`crate::Schema::get_trait`]) by downcasting.
pub trait Trait: Any + fmt::Debug + Send + Sync {
    fn trait_id(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
}

/// A trait with a statically known id, usable for typed lookup.
pub trait StaticTrait: Trait + Sized {
    const ID: &'static str;
}

macro_rules! impl_trait {
    ($ty:ty, $id:literal) => {
        impl StaticTrait for $ty {
            const ID: &'static str = $id;
        }

        impl Trait for $ty {
            fn trait_id(&self) -> &'static str {
                <Self as StaticTrait>::ID
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

/// Binds a member to an HTTP header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpHeader(pub String);
impl_trait!(HttpHeader, "smithy.api#httpHeader");

/// Binds a member to a query string parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpQuery(pub String);
impl_trait!(HttpQuery, "smithy.api#httpQuery");

/// Binds a member to a URI label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpLabel;
impl_trait!(HttpLabel, "smithy.api#httpLabel");

/// Binds a member to the whole HTTP body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpPayload;
impl_trait!(HttpPayload, "smithy.api#httpPayload");

/// Overrides the JSON object key used for a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonName(pub String);
impl_trait!(JsonName, "smithy.api#jsonName");

/// Marks data that must not be logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sensitive;
impl_trait!(Sensitive, "smithy.api#sensitive");

/// Marks a blob or union as a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Streaming;
impl_trait!(Streaming, "smithy.api#streaming");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Required;
impl_trait!(Required, "smithy.api#required");

/// Wire representation of a timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimestampFormat {
    /// Seconds since the Unix epoch, fractional part carries milliseconds.
    #[default]
    EpochSeconds,
    /// RFC 3339 date-time, always in UTC.
    DateTime,
    /// IMF-fixdate as used by HTTP (`Sun, 06 Nov 1994 08:49:37 GMT`).
    HttpDate,
}

impl TimestampFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EpochSeconds => "epoch-seconds",
            Self::DateTime => "date-time",
            Self::HttpDate => "http-date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampFormatTrait(pub TimestampFormat);
impl_trait!(TimestampFormatTrait, "smithy.api#timestampFormat");

/// Trait set of a schema, keyed by trait id. At most one instance per id;
/// inserting an id that is already present replaces it.
#[derive(Clone, Default)]
pub struct TraitMap {
    entries: IndexMap<&'static str, Arc<dyn Trait>>,
}

impl TraitMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with<T: Trait>(mut self, value: T) -> Self {
        self.insert(value);
        self
    }

    pub fn insert<T: Trait>(&mut self, value: T) {
        self.insert_arc(Arc::new(value));
    }

    pub fn insert_arc(&mut self, value: Arc<dyn Trait>) {
        self.entries.insert(value.trait_id(), value);
    }

    /// Typed lookup. Absence and type mismatch both yield `None`.
    pub fn get<T: StaticTrait>(&self) -> Option<&T> {
        self.entries
            .get(T::ID)
            .and_then(|t| t.as_any().downcast_ref::<T>())
    }

    pub fn get_by_id(&self, id: &str) -> Option<&dyn Trait> {
        self.entries.get(id).map(|t| t.as_ref())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    /// Returns `base` overlaid with `self`: entries of `self` win on collision.
    pub fn merged_over(&self, base: &TraitMap) -> TraitMap {
        let mut merged = base.clone();
        for value in self.entries.values() {
            merged.insert_arc(Arc::clone(value));
        }
        merged
    }
}

impl fmt::Debug for TraitMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.values()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A trait that reuses another trait's id, to exercise downcast failure.
    #[derive(Debug)]
    struct Impostor;

    impl Trait for Impostor {
        fn trait_id(&self) -> &'static str {
            JsonName::ID
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn typed_lookup() {
        let traits = TraitMap::new()
            .with(JsonName("Name".into()))
            .with(Sensitive);
        assert_eq!(traits.get::<JsonName>(), Some(&JsonName("Name".into())));
        assert_eq!(traits.get::<Sensitive>(), Some(&Sensitive));
        assert_eq!(traits.get::<HttpHeader>(), None);
        assert_eq!(traits.len(), 2);
    }

    #[test]
    fn type_mismatch_is_absence() {
        let traits = TraitMap::new().with(Impostor);
        assert!(traits.contains(JsonName::ID));
        assert_eq!(traits.get::<JsonName>(), None);
    }

    #[test]
    fn insert_replaces_same_id() {
        let mut traits = TraitMap::new().with(JsonName("a".into()));
        traits.insert(JsonName("b".into()));
        assert_eq!(traits.len(), 1);
        assert_eq!(traits.get::<JsonName>().map(|j| j.0.as_str()), Some("b"));
    }

    #[test]
    fn merge_prefers_overlay() {
        let base = TraitMap::new()
            .with(JsonName("base".into()))
            .with(Sensitive);
        let overlay = TraitMap::new().with(JsonName("member".into()));
        let merged = overlay.merged_over(&base);
        assert_eq!(merged.get::<JsonName>().map(|j| j.0.as_str()), Some("member"));
        assert!(merged.get::<Sensitive>().is_some());
    }

    #[test]
    fn timestamp_format_config_names() {
        let fmt: TimestampFormat = serde_json::from_str("\"http-date\"").unwrap();
        assert_eq!(fmt, TimestampFormat::HttpDate);
        assert_eq!(TimestampFormat::default().as_str(), "epoch-seconds");
    }
}
