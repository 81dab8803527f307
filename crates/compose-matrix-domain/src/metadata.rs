//! Metadata views: typed accessors over string-keyed metadata dictionaries.
//!
//! A metadata view is a getter-only shape (property names and declared types).
//! Instead of generating a concrete type per shape, a provider builds one
//! dispatch table per distinct shape, mapping each property to an accessor
//! closure, and hands out lightweight proxies that borrow the dictionary.

use crate::error::MetadataViewError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Metadata as handed out by a composition engine.
pub type MetadataDictionary = BTreeMap<String, Value>;

type ViewResult<T> = std::result::Result<T, MetadataViewError>;

/// Declared return type of a metadata view property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredType {
    Bool,
    Integer,
    Float,
    String,
    /// Any scalar value.
    Any,
    Sequence(Box<DeclaredType>),
}

impl DeclaredType {
    pub fn sequence_of(item: DeclaredType) -> Self {
        DeclaredType::Sequence(Box::new(item))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, DeclaredType::Sequence(_))
    }
}

/// One member of a view shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeMember {
    Getter {
        name: String,
        return_type: DeclaredType,
    },
    Setter {
        name: String,
    },
    Method {
        name: String,
    },
}

impl ShapeMember {
    pub fn name(&self) -> &str {
        match self {
            ShapeMember::Getter { name, .. }
            | ShapeMember::Setter { name }
            | ShapeMember::Method { name } => name,
        }
    }
}

/// The shape of a metadata view interface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetadataViewShape {
    pub name: String,
    pub members: Vec<ShapeMember>,
}

impl MetadataViewShape {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Add a property getter (builder style).
    pub fn getter(mut self, name: impl Into<String>, return_type: DeclaredType) -> Self {
        self.members.push(ShapeMember::Getter {
            name: name.into(),
            return_type,
        });
        self
    }

    /// Add an arbitrary member (builder style).
    pub fn member(mut self, member: ShapeMember) -> Self {
        self.members.push(member);
        self
    }

    /// Property getters as `(name, declared type)` pairs.
    pub fn getters(&self) -> impl Iterator<Item = (&str, &DeclaredType)> {
        self.members.iter().filter_map(|m| match m {
            ShapeMember::Getter { name, return_type } => Some((name.as_str(), return_type)),
            _ => None,
        })
    }

    /// Why this shape cannot back a metadata view, if it cannot.
    fn unsupported_reason(&self) -> Option<String> {
        let mut seen = HashSet::new();
        for member in &self.members {
            match member {
                ShapeMember::Getter { name, .. } => {
                    if !seen.insert(name.as_str()) {
                        return Some(format!("property {name} is declared twice"));
                    }
                }
                ShapeMember::Setter { name } => {
                    return Some(format!("member {name} is a setter"));
                }
                ShapeMember::Method { name } => {
                    return Some(format!("member {name} is a method"));
                }
            }
        }
        None
    }
}

/// Provides metadata view proxies for arbitrary view shapes.
pub trait MetadataViewProvider: Send + Sync {
    /// Whether this provider can build a proxy for `shape`.
    fn is_metadata_view_supported(&self, shape: &MetadataViewShape) -> bool;

    /// Build a typed accessor over `metadata`.
    ///
    /// `metadata` is expected to hold one entry per property of `shape`; a
    /// missing entry fails with [`MetadataViewError::MissingMetadataKey`].
    fn create_proxy<'a>(
        &self,
        shape: &MetadataViewShape,
        metadata: &'a MetadataDictionary,
    ) -> ViewResult<MetadataProxy<'a>>;
}

type Accessor = Arc<
    dyn for<'m> Fn(&'m MetadataDictionary) -> ViewResult<&'m Value> + Send + Sync,
>;

fn accessor<F>(f: F) -> Accessor
where
    F: for<'m> Fn(&'m MetadataDictionary) -> ViewResult<&'m Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Read-plus-convert closures for one view shape.
struct DispatchTable {
    view: String,
    /// Declaration order, for key validation.
    properties: Vec<String>,
    accessors: HashMap<String, Accessor>,
}

impl DispatchTable {
    fn build(shape: &MetadataViewShape) -> Self {
        let mut properties = Vec::new();
        let mut accessors = HashMap::new();

        for (name, declared) in shape.getters() {
            let view = shape.name.clone();
            let property = name.to_string();
            let unwrap_sequence = !declared.is_sequence();

            let read = accessor(move |metadata: &MetadataDictionary| {
                let raw = metadata.get(&property).ok_or_else(|| {
                    MetadataViewError::MissingMetadataKey {
                        view: view.clone(),
                        property: property.clone(),
                    }
                })?;
                convert(raw, unwrap_sequence).ok_or_else(|| MetadataViewError::EmptySequence {
                    view: view.clone(),
                    property: property.clone(),
                })
            });

            properties.push(name.to_string());
            accessors.insert(name.to_string(), read);
        }

        Self {
            view: shape.name.clone(),
            properties,
            accessors,
        }
    }
}

/// The one representation conversion: a scalar property backed by a
/// sequence reads the sequence's first element. `None` for an empty sequence.
fn convert(raw: &Value, unwrap_sequence: bool) -> Option<&Value> {
    match raw {
        Value::Array(items) if unwrap_sequence => items.first(),
        other => Some(other),
    }
}

/// Typed accessor over a borrowed metadata dictionary.
#[derive(Clone)]
pub struct MetadataProxy<'a> {
    table: Arc<DispatchTable>,
    metadata: &'a MetadataDictionary,
}

impl<'a> MetadataProxy<'a> {
    pub fn view_name(&self) -> &str {
        &self.table.view
    }

    /// Declared property names, in declaration order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.table.properties.iter().map(String::as_str)
    }

    /// Read `property`, applying the sequence-to-scalar conversion.
    pub fn get(&self, property: &str) -> ViewResult<&'a Value> {
        let read = self.table.accessors.get(property).ok_or_else(|| {
            MetadataViewError::UnknownProperty {
                view: self.table.view.clone(),
                property: property.to_string(),
            }
        })?;
        read(self.metadata)
    }

    /// Read `property` as `T`.
    pub fn get_as<T: DeserializeOwned>(&self, property: &str) -> ViewResult<T> {
        let value = self.get(property)?;
        T::deserialize(value).map_err(|e| MetadataViewError::TypeMismatch {
            view: self.table.view.clone(),
            property: property.to_string(),
            reason: e.to_string(),
        })
    }
}

impl std::fmt::Debug for MetadataProxy<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataProxy")
            .field("view", &self.table.view)
            .field("properties", &self.table.properties)
            .finish()
    }
}

/// Metadata view provider backed by cached dispatch tables.
///
/// Tables are built on first use of a shape and shared afterwards; the
/// provider can be shared across threads.
#[derive(Default)]
pub struct DispatchTableProvider {
    tables: RwLock<HashMap<MetadataViewShape, Arc<DispatchTable>>>,
}

impl DispatchTableProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct shapes with a cached table.
    pub fn cached_shapes(&self) -> usize {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn table_for(&self, shape: &MetadataViewShape) -> Arc<DispatchTable> {
        if let Some(table) = self
            .tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(shape)
        {
            return Arc::clone(table);
        }

        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let table = tables.entry(shape.clone()).or_insert_with(|| {
            debug!(view = %shape.name, members = shape.members.len(), "Building metadata view dispatch table");
            Arc::new(DispatchTable::build(shape))
        });
        Arc::clone(table)
    }
}

impl MetadataViewProvider for DispatchTableProvider {
    fn is_metadata_view_supported(&self, shape: &MetadataViewShape) -> bool {
        shape.unsupported_reason().is_none()
    }

    fn create_proxy<'a>(
        &self,
        shape: &MetadataViewShape,
        metadata: &'a MetadataDictionary,
    ) -> ViewResult<MetadataProxy<'a>> {
        if let Some(reason) = shape.unsupported_reason() {
            return Err(MetadataViewError::UnsupportedShape {
                view: shape.name.clone(),
                reason,
            });
        }

        let table = self.table_for(shape);
        if let Some(missing) = table.properties.iter().find(|p| !metadata.contains_key(*p)) {
            return Err(MetadataViewError::MissingMetadataKey {
                view: table.view.clone(),
                property: missing.clone(),
            });
        }

        Ok(MetadataProxy { table, metadata })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn part_view() -> MetadataViewShape {
        MetadataViewShape::new("IPartMetadata")
            .getter("Name", DeclaredType::String)
            .getter("Priority", DeclaredType::Integer)
    }

    fn metadata(entries: &[(&str, Value)]) -> MetadataDictionary {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_getter_only_shape_supported() {
        let provider = DispatchTableProvider::new();
        assert!(provider.is_metadata_view_supported(&part_view()));
        assert!(provider.is_metadata_view_supported(&MetadataViewShape::new("IEmpty")));
    }

    #[test]
    fn test_shape_with_method_or_setter_unsupported() {
        let provider = DispatchTableProvider::new();
        let with_method = part_view().member(ShapeMember::Method {
            name: "Refresh".to_string(),
        });
        let with_setter = part_view().member(ShapeMember::Setter {
            name: "Name".to_string(),
        });
        assert!(!provider.is_metadata_view_supported(&with_method));
        assert!(!provider.is_metadata_view_supported(&with_setter));
    }

    #[test]
    fn test_duplicate_getter_unsupported() {
        let provider = DispatchTableProvider::new();
        let shape = part_view().getter("Name", DeclaredType::Any);
        assert!(!provider.is_metadata_view_supported(&shape));
    }

    #[test]
    fn test_create_proxy_unsupported_shape_errors() {
        let provider = DispatchTableProvider::new();
        let shape = part_view().member(ShapeMember::Method {
            name: "Refresh".to_string(),
        });
        let dict = metadata(&[("Name", json!("X")), ("Priority", json!(1))]);
        let err = provider.create_proxy(&shape, &dict).unwrap_err();
        assert!(matches!(err, MetadataViewError::UnsupportedShape { .. }));
        assert_eq!(provider.cached_shapes(), 0);
    }

    #[test]
    fn test_scalar_property_unwraps_sequence() {
        let provider = DispatchTableProvider::new();
        let dict = metadata(&[("Name", json!("X")), ("Priority", json!([5]))]);
        let proxy = provider.create_proxy(&part_view(), &dict).unwrap();

        assert_eq!(proxy.get_as::<i64>("Priority").unwrap(), 5);
        assert_eq!(proxy.get_as::<String>("Name").unwrap(), "X");
    }

    #[test]
    fn test_sequence_property_passes_through() {
        let provider = DispatchTableProvider::new();
        let shape = MetadataViewShape::new("ITagged")
            .getter("Tags", DeclaredType::sequence_of(DeclaredType::String));
        let dict = metadata(&[("Tags", json!(["a", "b"]))]);
        let proxy = provider.create_proxy(&shape, &dict).unwrap();

        assert_eq!(proxy.get_as::<Vec<String>>("Tags").unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_scalar_value_passes_through() {
        let provider = DispatchTableProvider::new();
        let dict = metadata(&[("Name", json!("X")), ("Priority", json!(7))]);
        let proxy = provider.create_proxy(&part_view(), &dict).unwrap();
        assert_eq!(proxy.get("Priority").unwrap(), &json!(7));
    }

    #[test]
    fn test_missing_key_fails_fast() {
        let provider = DispatchTableProvider::new();
        let dict = metadata(&[("Priority", json!(1))]);
        let err = provider.create_proxy(&part_view(), &dict).unwrap_err();
        assert_eq!(
            err,
            MetadataViewError::MissingMetadataKey {
                view: "IPartMetadata".to_string(),
                property: "Name".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_sequence_for_scalar_is_error() {
        let provider = DispatchTableProvider::new();
        let dict = metadata(&[("Name", json!("X")), ("Priority", json!([]))]);
        let proxy = provider.create_proxy(&part_view(), &dict).unwrap();
        assert!(matches!(
            proxy.get("Priority").unwrap_err(),
            MetadataViewError::EmptySequence { .. }
        ));
    }

    #[test]
    fn test_unknown_property_and_type_mismatch() {
        let provider = DispatchTableProvider::new();
        let dict = metadata(&[("Name", json!("X")), ("Priority", json!("high"))]);
        let proxy = provider.create_proxy(&part_view(), &dict).unwrap();

        assert!(matches!(
            proxy.get("Color").unwrap_err(),
            MetadataViewError::UnknownProperty { .. }
        ));
        assert!(matches!(
            proxy.get_as::<i64>("Priority").unwrap_err(),
            MetadataViewError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn test_dispatch_table_reused_per_shape() {
        let provider = DispatchTableProvider::new();
        let first = metadata(&[("Name", json!("A")), ("Priority", json!(1))]);
        let second = metadata(&[("Name", json!("B")), ("Priority", json!(2))]);

        let a = provider.create_proxy(&part_view(), &first).unwrap();
        let b = provider.create_proxy(&part_view(), &second).unwrap();
        assert!(Arc::ptr_eq(&a.table, &b.table));
        assert_eq!(provider.cached_shapes(), 1);

        assert_eq!(a.get_as::<String>("Name").unwrap(), "A");
        assert_eq!(b.get_as::<String>("Name").unwrap(), "B");
    }

    #[test]
    fn test_proxy_reads_are_borrowed() {
        let provider = DispatchTableProvider::new();
        let dict = metadata(&[("Name", json!("X")), ("Priority", json!(3))]);
        let proxy = provider.create_proxy(&part_view(), &dict).unwrap();
        let name = proxy.get("Name").unwrap();
        assert!(std::ptr::eq(name, &dict["Name"]));
        assert_eq!(proxy.property_names().collect::<Vec<_>>(), vec!["Name", "Priority"]);
    }
}
