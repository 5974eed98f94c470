//! Dictionary payload as served to the solver.
//!
//! The payload is a JSON object whose `words` array holds one entry per
//! lemma. Each entry is a list of tokens: spellings of the word, plus the
//! affixes that attach to it (tokens starting or ending with `-`).
//!
//! ```json
//! {"words": [["casa"], ["-es", "peça", "peces-"]]}
//! ```
//!
//! Parsing is all-or-nothing: a malformed payload is reported as a
//! [`DictionaryError`] and no entries are handed out.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Marker that turns a token into an affix when it starts or ends with it.
pub const AFFIX_MARKER: char = '-';

/// Strategy for reading the dictionary file.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map the file and parse straight from the mapping.
    #[default]
    Mmap,
    /// Read the whole file into an owned buffer first.
    Owned,
}

impl LoadMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "mmap" => Some(LoadMode::Mmap),
            "owned" => Some(LoadMode::Owned),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("failed to read dictionary {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed dictionary payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// One dictionary record: word spellings and their affixes, as supplied.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DictionaryEntry(pub Vec<String>);

impl DictionaryEntry {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(tokens.into_iter().map(Into::into).collect())
    }

    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    /// Split the tokens into `(words, affixes)`, keeping source order.
    pub fn partition(&self) -> (Vec<&str>, Vec<&str>) {
        self.0
            .iter()
            .map(String::as_str)
            .partition(|token| !is_affix(token))
    }
}

/// Top-level JSON document.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct DictionaryPayload {
    pub words: Vec<DictionaryEntry>,
}

impl DictionaryPayload {
    pub fn from_json_str(raw: &str) -> Result<Self, DictionaryError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_slice(raw: &[u8]) -> Result<Self, DictionaryError> {
        Ok(serde_json::from_slice(raw)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DictionaryError> {
        Ok(serde_json::from_reader(io::BufReader::new(reader))?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P, mode: LoadMode) -> Result<Self, DictionaryError> {
        let path = path.as_ref();
        let io_err = |source| DictionaryError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut file = File::open(path).map_err(io_err)?;
        match mode {
            LoadMode::Mmap => {
                // The mapping is dropped before returning; nothing outlives it.
                let map = unsafe { Mmap::map(&file) }.map_err(io_err)?;
                Self::from_slice(&map)
            }
            LoadMode::Owned => {
                let mut buf = Vec::new();
                file.read_to_end(&mut buf).map_err(io_err)?;
                Self::from_slice(&buf)
            }
        }
    }
}

/// True when `token` starts or ends with the [`AFFIX_MARKER`].
pub fn is_affix(token: &str) -> bool {
    token.starts_with(AFFIX_MARKER) || token.ends_with(AFFIX_MARKER)
}
