//! Orthographic and morphological rules used by the linguistic extractor.
//!
//! Affix lists are compiled into anchored alternations, so a rule matches
//! when the word starts (or ends) with one of the listed affixes as a whole.

use regex::Regex;
use std::sync::LazyLock;

/// Prefixes typical of English words.
pub const ENGLISH_PREFIXES: &[&str] = &[
    "anti", "de", "dis", "en", "fore", "in", "mid", "mis", "non", "over", "pre", "re", "semi",
    "sub", "super", "trans", "un", "under",
];

/// Suffixes typical of English words.
pub const ENGLISH_SUFFIXES: &[&str] = &[
    "able", "ible", "al", "ial", "ed", "en", "er", "est", "ful", "ic", "ing", "ion", "ty", "ive",
    "less", "ment", "ness", "ous", "s", "y",
];

/// Prefixes typical of Croatian words.
pub const CROATIAN_PREFIXES: &[&str] = &[
    "bez", "be", "bes", "beš", "beza", "iz", "is", "iza", "među", "na", "nad", "nat", "ne", "o",
    "ob", "op", "od", "ot", "po", "pod", "pot", "pra", "pre", "pred", "pri", "pro", "raz", "ras",
    "raš", "raza", "s", "sa", "z", "su", "u", "uz",
];

/// Inflectional and derivational suffixes typical of Croatian words.
pub const CROATIAN_SUFFIXES: &[&str] = &[
    "skoga", "skima", "skom", "skoj", "skog", "skim", "skih", "noga", "sku", "sko", "ski", "ske",
    "ska", "nom", "noj", "nog", "nim", "nih", "na", "nu", "no", "ni", "ne", "anjima", "enjima",
    "stvima", "ovima", "evima", "enoga", "anoga", "anjem", "enjem", "stvom", "stvo", "stva",
    "stvu", "anje", "enje", "anja", "enja", "enom", "enoj", "enog", "enim", "enih", "anom", "anoj",
    "anog", "anim", "anih", "ano", "ovi", "ova", "oga", "ima", "evi", "eva", "ove", "eve", "enu",
    "eni", "ene", "anu", "ani", "ane", "ena", "ana", "ama", "om", "og", "im", "ih", "em", "oj",
    "u", "o", "i", "e", "a",
];

/// Letters that only occur in English words.
pub const ENGLISH_LETTERS: &str = "qwxy";

/// Letters that only occur in Croatian words.
pub const CROATIAN_LETTERS: &str = "čćđšž";

/// Compiled rule set, shared by every extractor in the process.
pub struct RuleSet {
    english_prefix: Regex,
    croatian_prefix: Regex,
    english_suffix: Regex,
    croatian_suffix: Regex,
    english_letters: Regex,
    croatian_letters: Regex,
}

static RULES: LazyLock<RuleSet> = LazyLock::new(RuleSet::compile);

/// The process-wide rule set.
pub fn rules() -> &'static RuleSet {
    &RULES
}

fn alternation(affixes: &[&str]) -> String {
    affixes
        .iter()
        .map(|a| regex::escape(a))
        .collect::<Vec<_>>()
        .join("|")
}

impl RuleSet {
    fn compile() -> Self {
        let build = |pattern: String| Regex::new(&pattern).expect("built-in rule must compile");
        Self {
            english_prefix: build(format!("^(?:{})", alternation(ENGLISH_PREFIXES))),
            croatian_prefix: build(format!("^(?:{})", alternation(CROATIAN_PREFIXES))),
            english_suffix: build(format!("(?:{})$", alternation(ENGLISH_SUFFIXES))),
            // at least one character must precede a Croatian ending
            croatian_suffix: build(format!(".+(?:{})$", alternation(CROATIAN_SUFFIXES))),
            english_letters: build(format!("[{ENGLISH_LETTERS}]")),
            croatian_letters: build(format!("[{CROATIAN_LETTERS}]")),
        }
    }

    /// Two consecutive identical characters.
    ///
    /// The `regex` crate has no backreferences, so this one is a window scan.
    pub fn has_doubled_letter(&self, word: &str) -> bool {
        let mut chars = word.chars();
        let Some(mut prev) = chars.next() else {
            return false;
        };
        for c in chars {
            if c == prev {
                return true;
            }
            prev = c;
        }
        false
    }

    pub fn has_hyphen(&self, word: &str) -> bool {
        word.contains('-')
    }

    pub fn has_english_letter(&self, word: &str) -> bool {
        self.english_letters.is_match(word)
    }

    pub fn has_croatian_letter(&self, word: &str) -> bool {
        self.croatian_letters.is_match(word)
    }

    pub fn has_english_prefix(&self, word: &str) -> bool {
        self.english_prefix.is_match(word)
    }

    pub fn has_croatian_prefix(&self, word: &str) -> bool {
        self.croatian_prefix.is_match(word)
    }

    pub fn has_english_suffix(&self, word: &str) -> bool {
        self.english_suffix.is_match(word)
    }

    pub fn has_croatian_suffix(&self, word: &str) -> bool {
        self.croatian_suffix.is_match(word)
    }
}
