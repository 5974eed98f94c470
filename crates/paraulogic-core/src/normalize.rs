//! Canonical form of dictionary words.
//!
//! Lookups are accent-insensitive: `normalize` lower-cases a word and strips
//! every combining diacritic except the cedilla, so `"Café"` and `"cafe"`
//! share a key while `"plaça"` keeps its `ç`.

use unicode_normalization::UnicodeNormalization;

/// Punctuation that never becomes an index key and never disqualifies a word.
pub const IGNORED_CHARACTERS: [char; 4] = ['·', '-', '\'', '’'];

const COMBINING_CEDILLA: char = '\u{0327}';

/// Lower-case `word`, drop its diacritics (cedilla excepted) and return the
/// composed result.
pub fn normalize(word: &str) -> String {
    word.chars()
        .flat_map(char::to_lowercase)
        .nfd()
        .filter(|c| !is_stripped_mark(*c))
        .nfc()
        .collect()
}

/// Whitespace and the [`IGNORED_CHARACTERS`].
pub fn is_ignorable(c: char) -> bool {
    c.is_whitespace() || IGNORED_CHARACTERS.contains(&c)
}

fn is_stripped_mark(c: char) -> bool {
    matches!(c, '\u{0300}'..='\u{036f}') && c != COMBINING_CEDILLA
}
