use gazette_core::indexing::{
    BodyField, Document, EntityBundle, EntityClass, FIELD_CATEGORY, FIELD_ID, FIELD_TITLE,
    FIELD_URL, Record,
};
use serde_json::Value;
use strum::IntoEnumIterator as _;

/// Maps a record, and optionally its entities, onto the flat document written to the index.
///
/// Fields are added in a fixed order: `id`, `category`, `title`, the body, `url` when present and
/// then one list per entity class. Entity fields are only added when a bundle is given, so a run
/// without enrichment produces documents without any `entity_*` key. A bundle with empty sets
/// produces empty lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentBuilder {
    body_field: BodyField,
}

impl DocumentBuilder {
    pub fn new(body_field: BodyField) -> Self {
        Self { body_field }
    }

    pub fn body_field(&self) -> BodyField {
        self.body_field
    }

    pub fn build(&self, record: &Record, entities: Option<&EntityBundle>) -> Document {
        let mut document = Document::new()
            .with_field(FIELD_ID, record.id)
            .with_field(FIELD_CATEGORY, record.category.as_str())
            .with_field(FIELD_TITLE, record.title.as_str())
            .with_field(self.body_field.field_name(), record.body.as_str());

        if let Some(url) = &record.url {
            document.insert(FIELD_URL, url.as_str());
        }

        if let Some(bundle) = entities {
            for class in EntityClass::iter() {
                let surfaces = bundle
                    .get(class)
                    .iter()
                    .cloned()
                    .map(Value::String)
                    .collect::<Vec<_>>();
                document.insert(class.field_name(), surfaces);
            }
        }

        document
    }
}

#[cfg(test)]
mod tests {
    use gazette_core::test_utils::{bundle, record};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_enriched_document() {
        let record = Record::new(
            3,
            "international",
            "Sommet",
            "Paris accueille l'ONU et Marie Curie.",
        );
        let entities = bundle(&["Paris"], &["Marie Curie"], &["ONU"]);

        let document = DocumentBuilder::default().build(&record, Some(&entities));

        assert_eq!(
            document.to_value(),
            json!({
                "id": 3,
                "category": "international",
                "title": "Sommet",
                "content": "Paris accueille l'ONU et Marie Curie.",
                "entity_location": ["Paris"],
                "entity_person": ["Marie Curie"],
                "entity_organization": ["ONU"],
            })
        );
    }

    #[test]
    fn test_no_entity_fields_without_bundle() {
        let document = DocumentBuilder::default().build(&record(0), None);

        assert!(document.keys().all(|key| !key.starts_with("entity_")));
        assert_eq!(document.len(), 4);
    }

    #[test]
    fn test_empty_bundle_yields_empty_lists() {
        let document = DocumentBuilder::default().build(&record(1), Some(&EntityBundle::new()));

        assert_eq!(document.get("entity_person"), Some(&json!([])));
        assert_eq!(document.len(), 7);
    }

    #[test]
    fn test_description_body_and_url() {
        let record = record(2).with_url("https://ex.ci/2");

        let document = DocumentBuilder::new(BodyField::Description).build(&record, None);

        assert!(!document.contains_key("content"));
        assert_eq!(
            document.get("description"),
            Some(&json!("Corps de l'article 2."))
        );
        assert_eq!(document.get("url"), Some(&json!("https://ex.ci/2")));
    }

    #[test]
    fn test_rebuild_is_byte_identical() {
        let builder = DocumentBuilder::default();
        let entities = bundle(&["Dakar", "Abidjan"], &[], &["CEDEAO"]);

        let first = serde_json::to_string(&builder.build(&record(5), Some(&entities))).unwrap();
        let second = serde_json::to_string(&builder.build(&record(5), Some(&entities))).unwrap();

        assert_eq!(first, second);
        assert!(first.contains(r#""entity_location":["Abidjan","Dakar"]"#));
    }
}
