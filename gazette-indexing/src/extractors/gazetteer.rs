//! Lexicon based named entity extraction
//!
//! A `Gazetteer` recognizes the surfaces listed in a lexicon and labels them with the class of
//! their entry. It is deterministic and cheap enough to run on every article of a corpus, and
//! its output has the same shape as a statistical model's: labelled, non overlapping spans.
use std::collections::HashSet;
use std::path::Path;

use gazette_core::{
    EntityExtractor, ExtractionError,
    indexing::{EntityBundle, EntityClass},
};
use itertools::Itertools as _;
use regex::{Regex, RegexBuilder};

/// Compiled patterns of large lexicons easily exceed the default limit of the regex crate.
const MATCHER_SIZE_LIMIT: usize = 1 << 28;

/// Extracts entities by matching the surfaces of a lexicon.
///
/// Entries whose label is not one of the tracked classes (for instance `MISC`) still take part in
/// matching. A longer miscellaneous span therefore masks the shorter tracked surfaces inside it,
/// and is then dropped from the result.
///
/// # Example
///
/// ```
/// # use gazette_indexing::extractors::Gazetteer;
/// # use gazette_core::EntityExtractor;
/// let gazetteer = Gazetteer::from_entries(
///     [("Dakar", "LOC"), ("Macky Sall", "PER"), ("CEDEAO", "ORG")],
///     false,
/// )
/// .unwrap();
///
/// let bundle = gazetteer.extract("Macky Sall reçoit la CEDEAO à Dakar.").unwrap();
/// assert!(bundle.location.contains("Dakar"));
/// assert!(bundle.person.contains("Macky Sall"));
/// assert!(bundle.organization.contains("CEDEAO"));
/// ```
#[derive(Debug, Clone)]
pub struct Gazetteer {
    matcher: Option<Regex>,
    /// Entries in alternation order, capture group `i + 1` matches `entries[i]`
    entries: Vec<Entry>,
}

#[derive(Debug, Clone)]
struct Entry {
    surface: String,
    class: Option<EntityClass>,
}

impl Gazetteer {
    /// Builds a gazetteer from `(surface, label)` pairs.
    ///
    /// When a surface is listed more than once, the first entry wins.
    ///
    /// # Errors
    ///
    /// Errors if an entry has a blank surface or label, or if the matcher cannot be compiled.
    pub fn from_entries<S, L>(
        entries: impl IntoIterator<Item = (S, L)>,
        case_insensitive: bool,
    ) -> Result<Self, ExtractionError>
    where
        S: AsRef<str>,
        L: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut kept = Vec::new();

        for (index, (surface, label)) in entries.into_iter().enumerate() {
            let (surface, label) = (surface.as_ref().trim(), label.as_ref().trim());
            if surface.is_empty() || label.is_empty() {
                return Err(ExtractionError::MalformedLexicon {
                    line: index + 1,
                    reason: "blank surface or label".to_string(),
                });
            }

            if seen.insert(normalize(surface, case_insensitive)) {
                kept.push(Entry {
                    surface: surface.to_string(),
                    class: EntityClass::from_label(label),
                });
            }
        }

        // Longest surfaces first, so the leftmost match is also the longest
        let entries = kept
            .into_iter()
            .sorted_by(|a, b| {
                let (a, b) = (&a.surface, &b.surface);
                b.chars().count().cmp(&a.chars().count()).then(a.cmp(b))
            })
            .collect::<Vec<_>>();

        let matcher = if entries.is_empty() {
            None
        } else {
            Some(build_matcher(&entries, case_insensitive)?)
        };

        tracing::debug!(num_entries = entries.len(), case_insensitive, "Compiled gazetteer");

        Ok(Self { matcher, entries })
    }

    /// Loads a lexicon file with one `surface<TAB>label` entry per line.
    ///
    /// Blank lines and lines starting with `#` are ignored.
    ///
    /// # Errors
    ///
    /// Errors if the file cannot be read, a line has no label, or the matcher cannot be compiled.
    pub fn from_path(
        path: impl AsRef<Path>,
        case_insensitive: bool,
    ) -> Result<Self, ExtractionError> {
        let path = path.as_ref();
        let content =
            fs_err::read_to_string(path).map_err(|source| ExtractionError::LexiconIo {
                path: path.to_path_buf(),
                source,
            })?;

        let entries = parse_lexicon(&content)?;
        tracing::info!(path = %path.display(), num_lines = entries.len(), "Loaded lexicon");

        Self::from_entries(entries, case_insensitive)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Key used to detect duplicate entries. Matching itself relies on the case folding of the regex.
fn normalize(surface: &str, case_insensitive: bool) -> String {
    if case_insensitive {
        surface.to_lowercase()
    } else {
        surface.to_string()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// One alternation with a capture group per entry.
fn build_matcher(entries: &[Entry], case_insensitive: bool) -> Result<Regex, ExtractionError> {
    let alternation = entries
        .iter()
        .map(|Entry { surface, .. }| {
            let mut pattern = String::from("(");
            if surface.starts_with(is_word_char) {
                pattern.push_str(r"\b");
            }
            pattern.push_str(&regex::escape(surface));
            if surface.ends_with(is_word_char) {
                pattern.push_str(r"\b");
            }
            pattern.push(')');
            pattern
        })
        .join("|");

    Ok(RegexBuilder::new(&alternation)
        .case_insensitive(case_insensitive)
        .size_limit(MATCHER_SIZE_LIMIT)
        .build()?)
}

fn parse_lexicon(content: &str) -> Result<Vec<(String, String)>, ExtractionError> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| {
            let (surface, label) = line.split_once('\t').ok_or_else(|| {
                ExtractionError::MalformedLexicon {
                    line: index + 1,
                    reason: "expected `surface<TAB>label`".to_string(),
                }
            })?;
            if surface.trim().is_empty() || label.trim().is_empty() {
                return Err(ExtractionError::MalformedLexicon {
                    line: index + 1,
                    reason: "blank surface or label".to_string(),
                });
            }
            Ok((surface.trim().to_string(), label.trim().to_string()))
        })
        .collect()
}

impl EntityExtractor for Gazetteer {
    #[tracing::instrument(skip_all, name = "extractors.gazetteer", fields(text_len = text.len()))]
    fn extract(&self, text: &str) -> Result<EntityBundle, ExtractionError> {
        let mut bundle = EntityBundle::default();
        let Some(matcher) = &self.matcher else {
            return Ok(bundle);
        };

        for captures in matcher.captures_iter(text) {
            let entry = captures
                .iter()
                .skip(1)
                .position(|group| group.is_some())
                .and_then(|index| self.entries.get(index));

            match entry {
                Some(Entry {
                    surface,
                    class: Some(class),
                }) => {
                    bundle.insert(*class, surface);
                }
                Some(Entry {
                    surface,
                    class: None,
                }) => {
                    tracing::trace!(surface = %surface, "Dropping span of untracked class");
                }
                None => {}
            }
        }

        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use temp_dir::TempDir;

    use super::*;

    fn gazetteer() -> Gazetteer {
        Gazetteer::from_entries(
            [
                ("Paris", "LOC"),
                ("Côte d'Ivoire", "LOC"),
                ("Ivoire", "LOC"),
                ("Alassane Ouattara", "PER"),
                ("ONU", "ORG"),
                ("Union africaine", "ORG"),
                ("Coupe d'Afrique des nations", "MISC"),
                ("Afrique", "LOC"),
            ],
            false,
        )
        .unwrap()
    }

    #[test]
    fn test_empty_text() {
        let bundle = gazetteer().extract("").unwrap();

        assert!(bundle.location.is_empty());
        assert!(bundle.person.is_empty());
        assert!(bundle.organization.is_empty());
    }

    #[test]
    fn test_extracts_three_classes() {
        let bundle = gazetteer()
            .extract("Alassane Ouattara a rencontré l'ONU et l'Union africaine à Paris.")
            .unwrap();

        assert_eq!(bundle.location.iter().collect::<Vec<_>>(), vec!["Paris"]);
        assert_eq!(
            bundle.person.iter().collect::<Vec<_>>(),
            vec!["Alassane Ouattara"]
        );
        assert_eq!(
            bundle.organization.iter().collect::<Vec<_>>(),
            vec!["ONU", "Union africaine"]
        );
    }

    #[test]
    fn test_deduplicates_repeated_mentions() {
        let bundle = gazetteer().extract("Paris, Paris et encore Paris.").unwrap();

        assert_eq!(bundle.location.len(), 1);
    }

    #[test]
    fn test_longest_span_wins() {
        let bundle = gazetteer()
            .extract("La Côte d'Ivoire accueille la compétition.")
            .unwrap();

        assert_eq!(
            bundle.location.iter().collect::<Vec<_>>(),
            vec!["Côte d'Ivoire"]
        );
    }

    #[test]
    fn test_untracked_span_masks_and_is_dropped() {
        let bundle = gazetteer()
            .extract("La Coupe d'Afrique des nations commence demain.")
            .unwrap();

        assert!(bundle.is_empty());
    }

    #[test]
    fn test_respects_word_boundaries() {
        let bundle = gazetteer().extract("Les Parisiens et l'ONUSIDA.").unwrap();

        assert!(bundle.is_empty());
    }

    #[test]
    fn test_case_insensitive_returns_canonical_surface() {
        let gazetteer = Gazetteer::from_entries([("Dakar", "LOC")], true).unwrap();

        let bundle = gazetteer.extract("DAKAR et dakar").unwrap();

        assert_eq!(bundle.location.iter().collect::<Vec<_>>(), vec!["Dakar"]);
    }

    #[test]
    fn test_case_insensitive_follows_unicode_case_folding() {
        // Lowercasing gives `αθηνας` with a final sigma, the text spells it `αθηνασ`
        let gazetteer = Gazetteer::from_entries([("ΑΘΗΝΑΣ", "LOC")], true).unwrap();

        let bundle = gazetteer.extract("στην αθηνασ σήμερα").unwrap();

        assert_eq!(bundle.location.iter().collect::<Vec<_>>(), vec!["ΑΘΗΝΑΣ"]);
    }

    #[test]
    fn test_case_insensitive_keeps_first_entry() {
        let gazetteer =
            Gazetteer::from_entries([("Sénégal", "LOC"), ("SÉNÉGAL", "ORG")], true).unwrap();

        let bundle = gazetteer.extract("Le sénégal vote.").unwrap();

        assert_eq!(gazetteer.len(), 1);
        assert_eq!(bundle.location.iter().collect::<Vec<_>>(), vec!["Sénégal"]);
        assert!(bundle.organization.is_empty());
    }

    #[test]
    fn test_empty_lexicon() {
        let gazetteer = Gazetteer::from_entries(Vec::<(&str, &str)>::new(), false).unwrap();

        assert!(gazetteer.is_empty());
        assert!(gazetteer.extract("Paris").unwrap().is_empty());
    }

    #[test]
    fn test_from_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.child("lexicon.tsv");
        std::fs::write(&path, "# surface\tlabel\n\nBamako\tLOC\nMINUSMA\tORG\n").unwrap();

        let gazetteer = Gazetteer::from_path(&path, false).unwrap();
        let bundle = gazetteer.extract("La MINUSMA quitte Bamako.").unwrap();

        assert_eq!(gazetteer.len(), 2);
        assert!(bundle.location.contains("Bamako"));
        assert!(bundle.organization.contains("MINUSMA"));
    }

    #[test]
    fn test_malformed_lexicon() {
        let dir = TempDir::new().unwrap();
        let path = dir.child("lexicon.tsv");
        std::fs::write(&path, "Bamako\tLOC\nMINUSMA\n").unwrap();

        let result = Gazetteer::from_path(&path, false);

        assert!(matches!(
            result,
            Err(ExtractionError::MalformedLexicon { line: 2, .. })
        ));
    }

    #[test]
    fn test_missing_lexicon() {
        let result = Gazetteer::from_path("/no/such/lexicon.tsv", false);

        assert!(matches!(result, Err(ExtractionError::LexiconIo { .. })));
    }
}
