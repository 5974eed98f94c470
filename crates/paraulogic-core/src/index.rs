use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use bitvec::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::dictionary::{DictionaryEntry, DictionaryError, DictionaryPayload, LoadMode};
use crate::normalize::{is_ignorable, normalize};

pub(crate) type BitSet = BitVec<usize, Lsb0>;

/// Immutable lookup structure built once from the dictionary.
///
/// Every normalized word gets a slot in a single sorted list; each character
/// maps to a bitset over those slots, so iterating a bucket yields its words
/// deduplicated and in lexicographic order.
#[derive(Debug, Clone, Default)]
pub struct WordIndex {
    words: Vec<String>,
    affixes: Vec<Vec<String>>,
    by_char: BTreeMap<char, BitSet>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub words: usize,
    pub characters: usize,
    pub affixes: usize,
    pub buckets: Vec<(char, usize)>,
}

impl WordIndex {
    pub fn build<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a DictionaryEntry>,
    {
        let mut affixes_of: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut entry_count = 0usize;
        let mut overwritten = 0usize;

        for entry in entries {
            entry_count += 1;
            let (words, affixes) = entry.partition();
            for word in words {
                let plain = normalize(word);
                let owned = affixes.iter().map(|a| a.to_string()).collect();
                if let Some(previous) = affixes_of.insert(plain, owned) {
                    overwritten += 1;
                    debug!("affixes of {word:?} replace earlier {previous:?}");
                }
            }
        }

        let n = affixes_of.len();
        let mut words = Vec::with_capacity(n);
        let mut affixes = Vec::with_capacity(n);
        let mut by_char: BTreeMap<char, BitSet> = BTreeMap::new();

        for (idx, (word, word_affixes)) in affixes_of.into_iter().enumerate() {
            for ch in word.chars().filter(|c| !is_ignorable(*c)) {
                by_char
                    .entry(ch)
                    .or_insert_with(|| bitvec![usize, Lsb0; 0; n])
                    .set(idx, true);
            }
            words.push(word);
            affixes.push(word_affixes);
        }

        info!(
            "indexed {} words from {entry_count} entries across {} characters",
            words.len(),
            by_char.len()
        );
        if overwritten > 0 {
            info!("{overwritten} duplicate words kept the affixes of their last entry");
        }

        Self {
            words,
            affixes,
            by_char,
        }
    }

    pub fn from_payload(payload: &DictionaryPayload) -> Self {
        Self::build(&payload.words)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, DictionaryError> {
        let payload = DictionaryPayload::from_json_str(raw)?;
        Ok(Self::from_payload(&payload))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DictionaryError> {
        let payload = DictionaryPayload::from_reader(reader)?;
        Ok(Self::from_payload(&payload))
    }

    pub fn build_from_file<P: AsRef<Path>>(path: P) -> Result<Arc<Self>, DictionaryError> {
        Self::build_from_file_with_mode(path, LoadMode::default())
    }

    pub fn build_from_file_with_mode<P: AsRef<Path>>(
        path: P,
        mode: LoadMode,
    ) -> Result<Arc<Self>, DictionaryError> {
        let payload = DictionaryPayload::from_file(path, mode)?;
        Ok(Arc::new(Self::from_payload(&payload)))
    }

    /// Number of distinct normalized words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// All normalized words, sorted.
    pub fn words(&self) -> impl Iterator<Item = &str> + '_ {
        self.words.iter().map(String::as_str)
    }

    /// Index keys, sorted.
    pub fn characters(&self) -> impl Iterator<Item = char> + '_ {
        self.by_char.keys().copied()
    }

    /// Words containing `c`, sorted and without repeats. Empty when `c` is
    /// not a key.
    pub fn words_containing(&self, c: char) -> impl Iterator<Item = &str> + '_ {
        self.by_char
            .get(&c)
            .into_iter()
            .flat_map(move |bits| bits.iter_ones().map(move |idx| self.words[idx].as_str()))
    }

    /// Raw affixes registered for a normalized word.
    pub fn affixes_of(&self, word: &str) -> Option<&[String]> {
        self.position(word).map(|idx| self.affixes[idx].as_slice())
    }

    pub fn contains_word(&self, word: &str) -> bool {
        self.position(word).is_some()
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            words: self.words.len(),
            characters: self.by_char.len(),
            affixes: self.affixes.iter().map(Vec::len).sum(),
            buckets: self
                .by_char
                .iter()
                .map(|(c, bits)| (*c, bits.count_ones()))
                .collect(),
        }
    }

    pub(crate) fn bucket(&self, c: char) -> Option<&BitSet> {
        self.by_char.get(&c)
    }

    pub(crate) fn buckets(&self) -> impl Iterator<Item = (char, &BitSet)> + '_ {
        self.by_char.iter().map(|(c, bits)| (*c, bits))
    }

    pub(crate) fn word_at(&self, idx: usize) -> Option<(&str, &[String])> {
        let word = self.words.get(idx)?;
        let affixes = self.affixes.get(idx)?;
        Some((word.as_str(), affixes.as_slice()))
    }

    fn position(&self, word: &str) -> Option<usize> {
        self.words
            .binary_search_by(|w| w.as_str().cmp(word))
            .ok()
    }
}
