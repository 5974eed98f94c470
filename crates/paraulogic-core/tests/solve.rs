use std::path::PathBuf;

use paraulogic_core::{
    DictionaryEntry, LetterSet, LoadMode, Query, WordIndex, is_ignorable, normalize, solve,
};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("words.json")
}

fn fixture_index() -> WordIndex {
    let index = WordIndex::build_from_file(fixture_path()).expect("load fixture");
    WordIndex::clone(&index)
}

fn letters(raw: &str) -> LetterSet {
    raw.parse().expect("letters")
}

#[test]
fn solves_scenario_with_cedilla() {
    let entries = vec![
        DictionaryEntry::new(["casa"]),
        DictionaryEntry::new(["-es", "peça", "pecesx-"]),
    ];
    let index = WordIndex::build(&entries);
    let solution = solve(&index, &Query::new(letters("caspeç"), Some('c')));
    assert_eq!(solution.words, vec!["casa"]);

    let solution = solve(&index, &Query::new(letters("caspeç"), Some('ç')));
    assert_eq!(solution.words, vec!["peça"]);
    assert_eq!(solution.affixes_of("peça"), ["-es"]);
    assert!(!solution.affixes_of("peça").contains(&"pecesx-".to_string()));
}

#[test]
fn empty_dictionary_solves_to_nothing() {
    let index = WordIndex::build(&Vec::<DictionaryEntry>::new());
    for (allowed, required) in [("abcdefg", Some('a')), ("", Some('a')), ("abc", None)] {
        let solution = solve(&index, &Query::new(letters(allowed), required));
        assert!(solution.words.is_empty());
        assert!(solution.affixes.is_empty());
    }
}

#[test]
fn loads_fixture_in_both_modes() {
    for mode in [LoadMode::Mmap, LoadMode::Owned] {
        let index = WordIndex::build_from_file_with_mode(fixture_path(), mode).unwrap();
        assert!(index.contains_word("peça"));
        assert!(index.contains_word("apat"));
        assert!(index.contains_word("cap"));
        assert_eq!(index.affixes_of("ceb"), index.affixes_of("ceps"));
    }
}

#[test]
fn solutions_respect_length_and_letters() {
    let index = fixture_index();
    let queries = [
        ("aspetc", 'a'),
        ("aspetc", 's'),
        ("colei", 'l'),
        ("daiguc", 'a'),
        ("capeç", 'c'),
        ("aeipsc", 'e'),
    ];
    for (allowed, required) in queries {
        let allowed = letters(allowed);
        let query = Query::new(allowed.clone(), Some(required));
        let solution = solve(&index, &query);
        assert!(!solution.is_empty(), "{allowed} / {required}");
        for word in &solution.words {
            assert!(word.chars().count() > 2, "{word} is too short");
            assert!(word.contains(required), "{word} lacks {required}");
            for ch in word.chars().filter(|c| !is_ignorable(*c)) {
                assert!(allowed.contains(ch), "{word} uses {ch}");
            }
        }
        let mut sorted = solution.words.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted, solution.words);
    }
}

#[test]
fn affixes_are_an_ordered_subset() {
    let index = fixture_index();
    let allowed = letters("aspetco");
    let solution = solve(&index, &Query::new(allowed.clone(), Some('a')));
    assert_eq!(solution.affixes.len(), solution.words.len());
    for word in &solution.words {
        let registered = index.affixes_of(word).expect("registered");
        let expected: Vec<String> = registered
            .iter()
            .filter(|affix| {
                affix
                    .chars()
                    .all(|c| is_ignorable(c) || allowed.contains(c))
            })
            .cloned()
            .collect();
        assert_eq!(solution.affixes_of(word), expected.as_slice(), "{word}");
    }
    assert_eq!(solution.affixes_of("casa"), ["-es", "-ota"]);
    assert_eq!(solution.affixes_of("pas"), ["-sos", "-ets"]);
    assert_eq!(
        solution.display_lines(),
        vec![
            "apat",
            "cap",
            "cas",
            "casa | -es | -ota",
            "pas | -sos | -ets",
            "pasta | -es",
            "sac | -s"
        ]
    );
}

#[test]
fn cedilla_affixes_need_the_cedilla_letter() {
    let index = fixture_index();
    let solution = solve(&index, &Query::new(letters("capi"), Some('c')));
    assert_eq!(solution.words, vec!["cap"]);
    assert_eq!(solution.affixes_of("cap"), ["capi-"]);
    let solution = solve(&index, &Query::new(letters("capiç"), Some('c')));
    assert_eq!(solution.affixes_of("cap"), ["-ça", "capi-"]);
}

#[test]
fn queries_from_input_slots() {
    let index = fixture_index();
    let query = Query::from_slots(["S", "", "a", "C", "", "", ""], "c");
    let solution = solve(&index, &query);
    assert_eq!(solution.words, vec!["cas", "casa", "sac"]);
}

#[test]
fn index_buckets_hold_exactly_the_words_with_that_character() {
    let index = fixture_index();
    for word in index.words() {
        assert_eq!(normalize(word), word);
    }
    for c in index.characters() {
        let bucket: Vec<&str> = index.words_containing(c).collect();
        let expected: Vec<&str> = index.words().filter(|w| w.contains(c)).collect();
        assert_eq!(bucket, expected, "bucket {c}");
    }
}
