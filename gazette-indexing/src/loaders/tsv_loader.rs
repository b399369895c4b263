//! Load press articles from tab separated files
use std::path::{Path, PathBuf};

use futures_util::{StreamExt as _, stream};
use gazette_core::{
    Loader, SourceReadError,
    indexing::{Record, RecordStream},
    util::non_blank,
};

const COLUMN_CATEGORY: &str = "category";
const COLUMN_HEADLINE: &str = "headline";
const COLUMN_TEXT: &str = "text";
const COLUMN_URL: &str = "url";

/// The `TsvLoader` reads one or more tab separated files and yields their rows as records.
///
/// Files are read fully and concatenated in the order they were given. Ids are assigned over
/// the concatenation, so they are contiguous from zero regardless of file boundaries.
///
/// Required columns are `category`, `headline` and `text`; `url` is optional. Column order does
/// not matter.
///
/// # Example
///
/// ```no_run
/// # use gazette_indexing as indexing;
/// # use gazette_indexing::loaders::TsvLoader;
/// indexing::Pipeline::from_loader(TsvLoader::new(["data/train.tsv", "data/test.tsv"]));
/// ```
#[derive(Clone, Debug, Default)]
pub struct TsvLoader {
    pub(crate) paths: Vec<PathBuf>,
}

/// Positions of the known columns in a file header.
#[derive(Debug)]
struct Columns {
    category: usize,
    headline: usize,
    text: usize,
    url: Option<usize>,
}

impl Columns {
    fn from_headers(path: &Path, headers: &csv::StringRecord) -> Result<Self, SourceReadError> {
        let position = |name: &str| headers.iter().position(|header| header == name);
        let required = |name: &'static str| {
            position(name).ok_or_else(|| SourceReadError::MissingColumn {
                path: path.to_path_buf(),
                column: name,
            })
        };

        Ok(Self {
            category: required(COLUMN_CATEGORY)?,
            headline: required(COLUMN_HEADLINE)?,
            text: required(COLUMN_TEXT)?,
            url: position(COLUMN_URL),
        })
    }
}

impl TsvLoader {
    /// Creates a new `TsvLoader` for the given files, read in order.
    pub fn new<P: Into<PathBuf>>(paths: impl IntoIterator<Item = P>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Appends another file to read after the current ones.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.push(path.into());
        self
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Reads all files and returns the merged, renumbered records.
    ///
    /// # Errors
    ///
    /// Fails if there are no files, or if any file is missing, unreadable, malformed, lacks a
    /// required column or has a row without a required value.
    pub fn load(&self) -> Result<Vec<Record>, SourceReadError> {
        if self.paths.is_empty() {
            return Err(SourceReadError::NoSources);
        }

        let mut records = Vec::new();
        for path in &self.paths {
            let before = records.len();
            read_file(path, &mut records)?;
            tracing::debug!(
                path = %path.display(),
                num_records = records.len() - before,
                "Read source file"
            );
        }

        Ok(records)
    }
}

/// Reads the rows of one file, numbering them after the records already read.
fn read_file(path: &Path, records: &mut Vec<Record>) -> Result<(), SourceReadError> {
    let bytes = fs_err::read(path).map_err(|source| SourceReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let malformed = |source: csv::Error| SourceReadError::Malformed {
        path: path.to_path_buf(),
        source: source.into(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(bytes.as_slice());

    let columns = Columns::from_headers(path, reader.headers().map_err(malformed)?)?;

    for row in reader.records() {
        let row = row.map_err(malformed)?;
        let line = row.position().map_or(0, csv::Position::line);
        let required = |index: usize, field: &'static str| {
            row.get(index)
                .filter(|value| !value.trim().is_empty())
                .map(ToString::to_string)
                .ok_or_else(|| SourceReadError::MissingField {
                    path: path.to_path_buf(),
                    line,
                    field,
                })
        };

        records.push(Record {
            id: records.len(),
            category: required(columns.category, COLUMN_CATEGORY)?,
            title: required(columns.headline, COLUMN_HEADLINE)?,
            body: required(columns.text, COLUMN_TEXT)?,
            url: columns.url.and_then(|index| row.get(index)).and_then(non_blank),
        });
    }

    Ok(())
}

impl Loader for TsvLoader {
    /// Converts the `TsvLoader` into a stream of records.
    ///
    /// All files are read before the first record is yielded. If any file fails, the stream
    /// consists of that single error.
    fn into_stream(self) -> RecordStream {
        stream::once(async move { self.load() })
            .flat_map(|result| -> RecordStream { result.into() })
            .boxed()
            .into()
    }

    fn into_stream_boxed(self: Box<Self>) -> RecordStream {
        self.into_stream()
    }
}
