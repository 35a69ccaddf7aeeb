//! Fixed vocabularies for keyword extraction.
//!
//! Every facet is an ordered table of tagged rules. Order is priority: for
//! first-match facets (gender, category, sub-category) the earliest matching
//! rule wins.

use crate::types::Gender;

/// How a rule's keywords are tested against the query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Keyword may appear anywhere, including inside a longer word
    Substring,
    /// Keyword must be a whole token
    Word,
}

/// Lower-cased query plus its word tokens
#[derive(Debug, Clone)]
pub struct QueryText {
    pub lowered: String,
    tokens: Vec<String>,
}

impl QueryText {
    pub fn new(raw: &str) -> Self {
        let lowered = raw.to_lowercase();
        let tokens = lowered
            .split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '\u{2019}'))
            .filter(|t| !t.is_empty())
            .map(|t| t.replace('\u{2019}', "'"))
            .collect();
        Self { lowered, tokens }
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lowered.contains(needle)
    }

    pub fn contains_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.contains(n))
    }

    pub fn has_word(&self, word: &str) -> bool {
        self.tokens.iter().any(|t| t == word)
    }

    pub fn matches(&self, keyword: &str, mode: MatchMode) -> bool {
        match mode {
            MatchMode::Substring => self.contains(keyword),
            MatchMode::Word => self.has_word(keyword),
        }
    }
}

/// A facet value triggered by any of its keywords
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule<T> {
    pub value: T,
    pub keywords: &'static [&'static str],
    pub mode: MatchMode,
}

impl<T: Copy> KeywordRule<T> {
    pub fn matches(&self, text: &QueryText) -> bool {
        self.keywords.iter().any(|k| text.matches(k, self.mode))
    }
}

/// Return the value of the first rule that fires
pub fn first_match<T: Copy>(rules: &[KeywordRule<T>], text: &QueryText) -> Option<T> {
    rules.iter().find(|r| r.matches(text)).map(|r| r.value)
}

/// Return the value of every rule that fires, in table order
pub fn all_matches<T: Copy>(rules: &[KeywordRule<T>], text: &QueryText) -> Vec<T> {
    rules.iter().filter(|r| r.matches(text)).map(|r| r.value).collect()
}

pub const CLEAR_PHRASES: &[&str] = &["clear", "reset", "remove all"];
pub const ADDITIVE_MODIFIERS: &[&str] = &["also", "add", "include"];
pub const REPLACE_MODIFIERS: &[&str] = &["change to", "switch to", "instead"];

// Whole-word matching keeps "men" from firing inside "women".
pub const GENDER_RULES: &[KeywordRule<Gender>] = &[
    KeywordRule {
        value: Gender::Men,
        keywords: &["men", "male", "mens", "men's", "man"],
        mode: MatchMode::Word,
    },
    KeywordRule {
        value: Gender::Women,
        keywords: &["women", "female", "womens", "women's", "woman"],
        mode: MatchMode::Word,
    },
];

pub const CATEGORY_RULES: &[KeywordRule<&str>] = &[
    KeywordRule {
        value: "Tops",
        keywords: &["tops", "shirts", "t-shirts"],
        mode: MatchMode::Substring,
    },
    KeywordRule {
        value: "Bottoms",
        keywords: &["bottoms", "pants", "jeans", "trousers"],
        mode: MatchMode::Substring,
    },
    KeywordRule {
        value: "Dresses",
        keywords: &["dresses", "dress"],
        mode: MatchMode::Substring,
    },
    KeywordRule {
        value: "Outerwear",
        keywords: &["outerwear", "jackets", "coats"],
        mode: MatchMode::Substring,
    },
];

pub const SUB_CATEGORY_RULES: &[KeywordRule<&str>] = &[
    KeywordRule { value: "T-shirts", keywords: &["t-shirts", "tshirts"], mode: MatchMode::Substring },
    KeywordRule { value: "Shirts", keywords: &["shirts", "formal shirts"], mode: MatchMode::Substring },
    KeywordRule { value: "Blouses", keywords: &["blouses"], mode: MatchMode::Substring },
    KeywordRule { value: "Jeans", keywords: &["jeans"], mode: MatchMode::Substring },
    KeywordRule { value: "Shorts", keywords: &["shorts"], mode: MatchMode::Substring },
    KeywordRule { value: "Jackets", keywords: &["jackets"], mode: MatchMode::Substring },
    KeywordRule { value: "Coats", keywords: &["coats"], mode: MatchMode::Substring },
    KeywordRule { value: "Polos", keywords: &["polos"], mode: MatchMode::Substring },
    KeywordRule { value: "Trousers", keywords: &["trousers"], mode: MatchMode::Substring },
];

/// Base color tokens and the catalog display name each maps to
pub const COLOR_RULES: &[KeywordRule<&str>] = &[
    KeywordRule { value: "Black", keywords: &["black"], mode: MatchMode::Word },
    KeywordRule { value: "Navy Blue", keywords: &["blue"], mode: MatchMode::Word },
    KeywordRule { value: "Green", keywords: &["green"], mode: MatchMode::Word },
    KeywordRule { value: "Red", keywords: &["red"], mode: MatchMode::Word },
    KeywordRule { value: "White", keywords: &["white"], mode: MatchMode::Word },
    KeywordRule { value: "Charcoal Gray", keywords: &["gray", "grey"], mode: MatchMode::Word },
    KeywordRule { value: "Pastel Pink", keywords: &["pink"], mode: MatchMode::Word },
    KeywordRule { value: "Purple", keywords: &["purple"], mode: MatchMode::Word },
    KeywordRule { value: "Mustard Yellow", keywords: &["yellow"], mode: MatchMode::Word },
    KeywordRule { value: "Rust Orange", keywords: &["orange"], mode: MatchMode::Word },
    KeywordRule { value: "Beige", keywords: &["beige"], mode: MatchMode::Word },
    KeywordRule { value: "Burgundy", keywords: &["burgundy"], mode: MatchMode::Word },
    KeywordRule { value: "Olive Green", keywords: &["olive"], mode: MatchMode::Word },
    KeywordRule { value: "Charcoal Gray", keywords: &["charcoal"], mode: MatchMode::Word },
    KeywordRule { value: "Navy Blue", keywords: &["navy"], mode: MatchMode::Word },
    KeywordRule { value: "Rust Orange", keywords: &["rust"], mode: MatchMode::Word },
    KeywordRule { value: "Mustard Yellow", keywords: &["mustard"], mode: MatchMode::Word },
    KeywordRule { value: "Pastel Pink", keywords: &["pastel"], mode: MatchMode::Word },
];

pub const SIZE_RULES: &[KeywordRule<&str>] = &[
    KeywordRule { value: "XS", keywords: &["xs"], mode: MatchMode::Word },
    KeywordRule { value: "S", keywords: &["s", "small"], mode: MatchMode::Word },
    KeywordRule { value: "M", keywords: &["m", "medium"], mode: MatchMode::Word },
    KeywordRule { value: "L", keywords: &["l", "large"], mode: MatchMode::Word },
    KeywordRule { value: "XL", keywords: &["xl"], mode: MatchMode::Word },
    KeywordRule { value: "XXL", keywords: &["xxl"], mode: MatchMode::Word },
];

/// Follow-ups offered when exactly one category is active
pub fn adjacent_category_suggestions(category: &str) -> &'static [&'static str] {
    match category {
        "Tops" => &["Change to bottoms", "Show dresses"],
        "Bottoms" => &["Change to tops", "Show outerwear"],
        "Dresses" => &["Change to tops", "Show bottoms"],
        "Outerwear" => &["Change to tops", "Show dresses"],
        _ => &[],
    }
}

/// Generic category browsing prompts
pub const BROWSE_SUGGESTIONS: [&str; 3] = ["Show me tops", "Find dresses", "Browse outerwear"];
pub const CLEARED_SUGGESTIONS: [&str; 3] = ["Show me tops", "Find dresses", "Browse all clothing"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_women_does_not_fire_men_rule() {
        let text = QueryText::new("show women's jackets");
        assert_eq!(first_match(GENDER_RULES, &text), Some(Gender::Women));
        let text = QueryText::new("dresses for women");
        assert_eq!(first_match(GENDER_RULES, &text), Some(Gender::Women));
    }

    #[test]
    fn test_category_first_bucket_wins() {
        // "shirts" (Tops) is checked before "jeans" (Bottoms)
        let text = QueryText::new("shirts and jeans");
        assert_eq!(first_match(CATEGORY_RULES, &text), Some("Tops"));
    }

    #[test]
    fn test_sizes_are_whole_words() {
        let text = QueryText::new("show me tops in black");
        assert!(all_matches(SIZE_RULES, &text).is_empty());
        let text = QueryText::new("size m or large");
        assert_eq!(all_matches(SIZE_RULES, &text), vec!["M", "L"]);
    }

    #[test]
    fn test_color_words_do_not_match_inside_words() {
        let text = QueryText::new("reduce to 300");
        assert!(all_matches(COLOR_RULES, &text).is_empty());
    }

    #[test]
    fn test_adjacency_unknown_category() {
        assert!(adjacent_category_suggestions("Accessories").is_empty());
    }
}
