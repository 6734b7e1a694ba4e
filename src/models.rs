//! Wire types exchanged with the orchestrator over stdin/stdout.
//!
//! Requests are decoded strictly: any top-level field outside the declared
//! shape rejects the whole document. Plugins pick the concrete `Source`,
//! `Version` and params types; nested strictness is up to their own serde
//! attributes.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Name/value pair shown next to a version by the orchestrator.
pub struct MetadataField {
    pub name: String,
    pub value: String,
}

impl MetadataField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
/// Input to a check: the configured source plus the last known version.
///
/// `version` is `None` on the very first check (field missing or `null`), in
/// which case only the latest version should be reported.
pub struct CheckRequest<S, V> {
    pub source: S,
    pub version: Option<V>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
/// Input to a get: which version to fetch into the target directory.
///
/// A missing `params` block decodes as `G::default()`.
pub struct GetRequest<S, V, G> {
    pub source: S,
    pub version: V,
    #[serde(default)]
    pub params: G,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
/// Input to a put. There is no version; the put produces one.
pub struct PutRequest<S, P> {
    pub source: S,
    #[serde(default)]
    pub params: P,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Output of get and put: the version now present plus display metadata.
pub struct Response<V> {
    pub version: V,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub metadata: Vec<MetadataField>,
}

impl<V> Response<V> {
    pub fn new(version: V) -> Self {
        Self {
            version,
            metadata: Vec::new(),
        }
    }

    /// Append a metadata field, keeping insertion order.
    pub fn with_metadata(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push(MetadataField::new(name, value));
        self
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<MetadataField>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<MetadataField>>::deserialize(deserializer)?.unwrap_or_default())
}
