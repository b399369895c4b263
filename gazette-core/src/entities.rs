//! Named entities extracted from an article body.
//!
//! Only three classes are tracked: locations, persons and organizations. Labels produced by an
//! extractor are mapped with [`EntityClass::from_label`]; anything that does not map to one of the
//! three classes (for instance a miscellaneous class) is dropped.
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// The entity classes kept on indexed documents.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EntityClass {
    Location,
    Person,
    Organization,
}

impl EntityClass {
    /// Maps a raw extractor label onto a tracked class.
    ///
    /// Accepts the usual CoNLL and OntoNotes spellings, case-insensitively. Returns `None` for
    /// every other label.
    pub fn from_label(label: impl AsRef<str>) -> Option<EntityClass> {
        match label.as_ref().trim().to_ascii_uppercase().as_str() {
            "LOC" | "LOCATION" | "GPE" => Some(EntityClass::Location),
            "PER" | "PERSON" => Some(EntityClass::Person),
            "ORG" | "ORGANIZATION" | "ORGANISATION" => Some(EntityClass::Organization),
            _ => None,
        }
    }

    /// Name of the document field holding this class.
    pub fn field_name(self) -> &'static str {
        match self {
            EntityClass::Location => "entity_location",
            EntityClass::Person => "entity_person",
            EntityClass::Organization => "entity_organization",
        }
    }
}

/// The three entity sets derived from one article body.
///
/// Sets never contain duplicates. They are ordered, so materializing them into lists is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityBundle {
    pub location: BTreeSet<String>,
    pub person: BTreeSet<String>,
    pub organization: BTreeSet<String>,
}

impl EntityBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a surface string to the set of `class`. Blank strings are ignored.
    ///
    /// Returns true if the surface was not yet present.
    pub fn insert(&mut self, class: EntityClass, surface: impl AsRef<str>) -> bool {
        let surface = surface.as_ref().trim();
        if surface.is_empty() {
            return false;
        }
        self.get_mut(class).insert(surface.to_string())
    }

    /// Adds a surface string under a raw extractor label.
    ///
    /// Returns the class it was filed under, or `None` when the label is not tracked.
    pub fn insert_labelled(
        &mut self,
        label: impl AsRef<str>,
        surface: impl AsRef<str>,
    ) -> Option<EntityClass> {
        let class = EntityClass::from_label(label)?;
        self.insert(class, surface);
        Some(class)
    }

    pub fn get(&self, class: EntityClass) -> &BTreeSet<String> {
        match class {
            EntityClass::Location => &self.location,
            EntityClass::Person => &self.person,
            EntityClass::Organization => &self.organization,
        }
    }

    fn get_mut(&mut self, class: EntityClass) -> &mut BTreeSet<String> {
        match class {
            EntityClass::Location => &mut self.location,
            EntityClass::Person => &mut self.person,
            EntityClass::Organization => &mut self.organization,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.location.is_empty() && self.person.is_empty() && self.organization.is_empty()
    }

    pub fn len(&self) -> usize {
        self.location.len() + self.person.len() + self.organization.len()
    }
}

impl<S: AsRef<str>> FromIterator<(EntityClass, S)> for EntityBundle {
    fn from_iter<T: IntoIterator<Item = (EntityClass, S)>>(iter: T) -> Self {
        let mut bundle = EntityBundle::default();
        for (class, surface) in iter {
            bundle.insert(class, surface);
        }
        bundle
    }
}
