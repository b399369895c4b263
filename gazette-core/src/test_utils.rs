#![allow(clippy::missing_panics_doc)]
//! Fixtures shared by the tests of the workspace crates.
use pretty_assertions::assert_eq;

use crate::document::Document;
use crate::entities::{EntityBundle, EntityClass};
use crate::record::Record;

/// A record with a body derived from its id, so every record is distinct.
pub fn record(id: usize) -> Record {
    Record::new(
        id,
        "politique",
        format!("Titre {id}"),
        format!("Corps de l'article {id}."),
    )
}

/// `count` records with contiguous ids.
pub fn records(count: usize) -> Vec<Record> {
    (0..count).map(record).collect()
}

/// Builds a bundle from three slices of surfaces.
pub fn bundle(locations: &[&str], persons: &[&str], organizations: &[&str]) -> EntityBundle {
    locations
        .iter()
        .map(|s| (EntityClass::Location, *s))
        .chain(persons.iter().map(|s| (EntityClass::Person, *s)))
        .chain(organizations.iter().map(|s| (EntityClass::Organization, *s)))
        .collect()
}

/// Asserts the ids of `documents` are exactly `0..documents.len()`, in order.
pub fn assert_contiguous_ids(documents: &[Document]) {
    let ids = documents
        .iter()
        .map(|doc| doc.id().expect("document without numeric id"))
        .collect::<Vec<_>>();
    let expected = (0..documents.len() as u64).collect::<Vec<_>>();

    assert_eq!(ids, expected);
}
