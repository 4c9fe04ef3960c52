//! Element identifiers backed by a global string interner.
//!
//! Every element, type tag and business object handle in an Easel diagram is
//! named by an [`Id`]. Ids are `Copy`, cheap to hash and compare, and resolve
//! back to their string form on demand.

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner shared by all identifiers.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

/// Runs `f` with exclusive access to the interner.
fn with_interner<R>(f: impl FnOnce(&mut DefaultStringInterner) -> R) -> R {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock");
    f(&mut interner)
}

/// Interned identifier of a diagram element, type tag or business object.
///
/// # Examples
///
/// ```
/// use easel_core::identifier::Id;
///
/// let task = Id::new("Task_1");
/// assert_eq!(task, "Task_1");
///
/// let label = task.with_suffix("label");
/// assert_eq!(label, "Task_1_label");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Interns `name` and returns its identifier.
    pub fn new(name: &str) -> Self {
        Self(with_interner(|interner| interner.get_or_intern(name)))
    }

    /// Returns a new id formed as `<self>_<suffix>`.
    ///
    /// Used to derive ids for companion elements such as external labels.
    pub fn with_suffix(&self, suffix: &str) -> Self {
        with_interner(|interner| {
            let base = interner
                .resolve(self.0)
                .expect("Symbol should exist in interner");
            let derived = format!("{base}_{suffix}");
            Self(interner.get_or_intern(&derived))
        })
    }

    /// Returns the owned string form of this id.
    pub fn as_string(&self) -> String {
        with_interner(|interner| {
            interner
                .resolve(self.0)
                .expect("Symbol should exist in interner")
                .to_owned()
        })
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl std::str::FromStr for Id {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        with_interner(|interner| interner.resolve(self.0) == Some(other))
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_string())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::new(&name))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_new_interns_equal_names() {
        let id1 = Id::new("Task_1");
        let id2 = Id::new("Task_1");
        let id3 = Id::new("Task_2");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert_eq!(id1, "Task_1");
    }

    #[test]
    fn test_with_suffix() {
        let id = Id::new("Flow_7");
        assert_eq!(id.with_suffix("label"), "Flow_7_label");
        assert_eq!(id.with_suffix("label"), id.with_suffix("label"));
    }

    #[test]
    fn test_display_and_from_str() {
        let id: Id = "Gateway_3".parse().expect("infallible");
        assert_eq!(format!("{id}"), "Gateway_3");
        assert_eq!(id.as_string(), "Gateway_3");
    }

    #[test]
    fn test_partial_eq_str() {
        let id = Id::new("Process_1");
        assert!(id == "Process_1");
        assert!(id != "Process_2");

        let owned = String::from("Process_1");
        assert!(id == owned.as_str());
    }

    #[test]
    fn test_hash_lookup() {
        let mut map = HashMap::new();
        map.insert(Id::new("a"), 1);
        map.insert(Id::new("b"), 2);

        assert_eq!(map.get(&Id::new("a")), Some(&1));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_serde_as_string() {
        #[derive(Serialize, Deserialize)]
        struct Holder {
            id: Id,
        }

        let holder: Holder = serde::Deserialize::deserialize(
            serde::de::value::MapDeserializer::<_, serde::de::value::Error>::new(
                [("id", "Event_9")].into_iter(),
            ),
        )
        .expect("deserializes");
        assert_eq!(holder.id, "Event_9");
    }
}
