use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::index::WordIndex;
use crate::normalize::is_ignorable;

/// Solutions must be longer than this many characters.
pub const MIN_WORD_LEN: usize = 2;

/// Separator between a word and its affixes in [`Solution::display_lines`].
pub const DISPLAY_SEPARATOR: &str = " | ";

/// Characters a solution may be spelled with.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LetterSet(BTreeSet<char>);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LetterError {
    #[error("invalid character in letters: {0:?}")]
    InvalidChar(char),
    #[error("a letter is required")]
    Empty,
    #[error("expected a single letter, got {0:?}")]
    NotSingle(String),
}

impl LetterSet {
    /// Collect letters from input slots. Each slot contributes its first
    /// character lower-cased; empty slots contribute nothing.
    pub fn from_slots<I, S>(slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(slots.into_iter().filter_map(|s| slot_letter(s.as_ref())).collect())
    }

    pub fn insert(&mut self, c: char) -> bool {
        self.0.insert(c)
    }

    pub fn contains(&self, c: char) -> bool {
        self.0.contains(&c)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.0.iter().copied()
    }

    /// Whether every non-ignorable character of `text` is in the set.
    /// `text` is compared as given, without normalization.
    pub fn admits(&self, text: &str) -> bool {
        text.chars().all(|c| is_ignorable(c) || self.contains(c))
    }
}

impl FromStr for LetterSet {
    type Err = LetterError;

    /// Parse a compact letter string such as `"abcdefg"` or `"a, b, c"`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut set = LetterSet::default();
        for c in raw.chars() {
            if c.is_whitespace() || c == ',' {
                continue;
            }
            if !c.is_alphabetic() {
                return Err(LetterError::InvalidChar(c));
            }
            set.0.extend(c.to_lowercase().next());
        }
        Ok(set)
    }
}

impl fmt::Display for LetterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|c| write!(f, "{c}"))
    }
}

fn slot_letter(slot: &str) -> Option<char> {
    slot.chars().next().and_then(|c| c.to_lowercase().next())
}

/// Parse the single mandatory letter.
pub fn parse_required(raw: &str) -> Result<char, LetterError> {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    let Some(first) = chars.next() else {
        return Err(LetterError::Empty);
    };
    if chars.next().is_some() {
        return Err(LetterError::NotSingle(trimmed.to_string()));
    }
    if !first.is_alphabetic() {
        return Err(LetterError::InvalidChar(first));
    }
    first.to_lowercase().next().ok_or(LetterError::Empty)
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    pub allowed: LetterSet,
    pub required: Option<char>,
}

impl Query {
    /// `required` is not added to `allowed`; a query whose allowed set lacks
    /// the required letter has no solutions.
    pub fn new(allowed: LetterSet, required: Option<char>) -> Self {
        Self { allowed, required }
    }

    pub fn from_slots<I, S>(slots: I, required_slot: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed: LetterSet::from_slots(slots),
            required: slot_letter(required_slot),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    /// Valid words in lexicographic order.
    pub words: Vec<String>,
    /// Usable affixes of every valid word, in dictionary order.
    pub affixes: BTreeMap<String, Vec<String>>,
}

impl Solution {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn affixes_of(&self, word: &str) -> &[String] {
        self.affixes.get(word).map(Vec::as_slice).unwrap_or_default()
    }

    /// `word` or `word | affix | affix`, one line per valid word.
    pub fn display_lines(&self) -> Vec<String> {
        self.words.iter().map(|w| self.display_line(w)).collect()
    }

    pub fn display_line(&self, word: &str) -> String {
        let affixes = self.affixes_of(word);
        if affixes.is_empty() {
            return word.to_string();
        }
        let mut line = String::from(word);
        for affix in affixes {
            line.push_str(DISPLAY_SEPARATOR);
            line.push_str(affix);
        }
        line
    }
}

/// Find every indexed word containing `query.required` and spelled only
/// with `query.allowed`, together with its usable affixes.
pub fn solve(index: &WordIndex, query: &Query) -> Solution {
    let Some(required) = query.required else {
        return Solution::default();
    };
    let Some(bucket) = index.bucket(required) else {
        return Solution::default();
    };

    let mut candidates = bucket.clone();
    for (c, bits) in index.buckets() {
        if query.allowed.contains(c) {
            continue;
        }
        let mask = !bits.clone();
        candidates &= &mask;
        if candidates.not_any() {
            return Solution::default();
        }
    }

    let mut solution = Solution::default();
    for idx in candidates.iter_ones() {
        let Some((word, affixes)) = index.word_at(idx) else {
            continue;
        };
        if word.chars().count() <= MIN_WORD_LEN {
            continue;
        }
        let usable = affixes
            .iter()
            .filter(|affix| query.allowed.admits(affix))
            .cloned()
            .collect();
        solution.words.push(word.to_string());
        solution.affixes.insert(word.to_string(), usable);
    }
    solution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::DictionaryEntry;

    fn make_index(entries: &[&[&str]]) -> WordIndex {
        let entries: Vec<DictionaryEntry> =
            entries.iter().map(|e| DictionaryEntry::new(e.iter().copied())).collect();
        WordIndex::build(&entries)
    }

    fn query(letters: &str, required: char) -> Query {
        Query::new(letters.parse().unwrap(), Some(required))
    }

    #[test]
    fn slots_drop_empty_entries_and_lowercase() {
        let set = LetterSet::from_slots(["A", "", "ç", "b", "", "bc", "a"]);
        assert_eq!(set.iter().collect::<String>(), "abç");
        assert!(!set.contains('c'));
        let q = Query::from_slots(["", ""], "");
        assert!(q.allowed.is_empty());
        assert_eq!(q.required, None);
    }

    #[test]
    fn parses_letter_strings() {
        let set: LetterSet = "Ab, ç d".parse().unwrap();
        assert_eq!(set.to_string(), "abdç");
        let dotted: LetterSet = "İab".parse().unwrap();
        assert_eq!(dotted.len(), 3);
        assert_eq!(dotted.to_string(), "abi");
        assert_eq!(
            "ab1".parse::<LetterSet>(),
            Err(LetterError::InvalidChar('1'))
        );
    }

    #[test]
    fn parses_required_letter() {
        assert_eq!(parse_required(" C "), Ok('c'));
        assert_eq!(parse_required("ç"), Ok('ç'));
        assert_eq!(parse_required(""), Err(LetterError::Empty));
        assert_eq!(
            parse_required("ab"),
            Err(LetterError::NotSingle("ab".into()))
        );
        assert_eq!(parse_required("-"), Err(LetterError::InvalidChar('-')));
    }

    #[test]
    fn filters_short_words() {
        let index = make_index(&[&["ca"], &["cas"], &["a"]]);
        let solution = solve(&index, &query("acs", 'a'));
        assert_eq!(solution.words, vec!["cas"]);
    }

    #[test]
    fn missing_required_letter_yields_nothing() {
        let index = make_index(&[&["casa"]]);
        assert!(solve(&index, &query("acs", 'z')).is_empty());
        assert!(solve(&index, &Query::new("acs".parse().unwrap(), None)).is_empty());
    }

    #[test]
    fn required_letter_must_be_allowed() {
        let index = make_index(&[&["casa"]]);
        assert!(solve(&index, &query("as", 'c')).is_empty());
    }

    #[test]
    fn ignorable_characters_do_not_disqualify() {
        let index = make_index(&[&["col·lecció"], &["d'aigua"], &["porta avions"]]);
        let solution = solve(&index, &query("coleli", 'c'));
        assert_eq!(solution.words, vec!["col·leccio"]);
        let solution = solve(&index, &query("daigu", 'g'));
        assert_eq!(solution.words, vec!["d'aigua"]);
    }

    #[test]
    fn affixes_are_matched_raw() {
        let index = make_index(&[&["casa", "-és", "-es", "-x"]]);
        let solution = solve(&index, &query("acse", 'c'));
        assert_eq!(solution.affixes_of("casa"), ["-es"]);
    }

    #[test]
    fn words_without_affixes_get_empty_list() {
        let index = make_index(&[&["sac"]]);
        let solution = solve(&index, &query("acs", 's'));
        assert_eq!(solution.affixes.get("sac"), Some(&Vec::new()));
    }

    #[test]
    fn formats_display_lines() {
        let index = make_index(&[&["casa", "-es", "-ot"], &["sac"]]);
        let solution = solve(&index, &query("acseot", 'a'));
        assert_eq!(solution.display_lines(), vec!["casa | -es | -ot", "sac"]);
    }
}
