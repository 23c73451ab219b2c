//! Entity name module.
//!
//! Provides the `Name` type, an interned string identifier for demons,
//! skills, races and elements. Uses `Arc<str>` so the cross-reference
//! lists and level indices can share names with the entity tables.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::sync::Arc;

/// Interned string identifier for compendium entities.
///
/// Clones share the same underlying allocation. `Name` borrows as `str`,
/// so tables keyed by `Name` can be queried with plain string slices.
///
/// # Examples
///
/// ```rust
/// use demon_compendium::Name;
/// use std::collections::HashMap;
///
/// let mut levels: HashMap<Name, i32> = HashMap::new();
/// levels.insert(Name::new("Pixie"), 2);
/// levels.insert(String::from("Cerberus").into(), 40);
///
/// // Lookups take a borrowed `&str`, no `Name` needed.
/// assert_eq!(levels.get("Cerberus"), Some(&40));
/// assert!(levels.get("Mara").is_none());
/// ```
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Name(Arc<str>);

impl Serialize for Name {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Name::from(s))
    }
}

impl Name {
    /// Create a new `Name` from a string slice.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use demon_compendium::Name;
    ///
    /// let race = Name::new("Beast");
    /// assert_eq!(race.as_str(), "Beast");
    /// ```
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    /// Get the string representation of this `Name`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
