//! Dictionary index and solver for the Paraulògic letter puzzle.
//!
//! A [`WordIndex`] is built once from the dictionary payload and shared
//! read-only afterwards. [`solve`] answers a [`Query`] (allowed letters plus
//! the mandatory center letter) with the matching words and, for each word,
//! the affixes that can also be spelled with the allowed letters.
//!
//! ```rust
//! use paraulogic_core::{Query, WordIndex, solve};
//!
//! let index = WordIndex::from_json_str(r#"{"words": [["casa", "-es"], ["sac"]]}"#).unwrap();
//! let query = Query::new("acse".parse().unwrap(), Some('c'));
//! let solution = solve(&index, &query);
//! assert_eq!(solution.display_lines(), vec!["casa | -es", "sac"]);
//! ```

pub mod dictionary;
pub mod index;
pub mod normalize;
pub mod solver;

pub use dictionary::{DictionaryEntry, DictionaryError, DictionaryPayload, LoadMode, is_affix};
pub use index::{IndexStats, WordIndex};
pub use normalize::{IGNORED_CHARACTERS, is_ignorable, normalize};
pub use solver::{LetterError, LetterSet, MIN_WORD_LEN, Query, Solution, parse_required, solve};
