use rand::{seq::SliceRandom, Rng};

pub const DEFAULT_WORDS: [&str; 5] = ["Pen", "Paper", "Refrigerator", "Television", "Laptop"];
pub const DEFAULT_WORD_CHOICES: usize = 3;

const CLUE_PLACEHOLDER: char = '_';

/// Vocabulary the drawer's word options are drawn from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    words: Vec<String>,
    word_choices: usize,
}

impl GameConfig {
    /// Builds a config, falling back to the defaults for an empty vocabulary
    /// or a zero choice count.
    pub fn new(words: Vec<String>, word_choices: usize) -> Self {
        let words: Vec<String> = words
            .into_iter()
            .map(|word| word.trim().to_string())
            .filter(|word| !word.is_empty())
            .collect();
        let defaults = Self::default();
        Self {
            words: if words.is_empty() {
                defaults.words
            } else {
                words
            },
            word_choices: if word_choices == 0 {
                defaults.word_choices
            } else {
                word_choices
            },
        }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn word_choices(&self) -> usize {
        self.word_choices
    }

    /// Picks the drawer's options, with replacement.
    pub fn word_options<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<String> {
        (0..self.word_choices)
            .filter_map(|_| self.words.choose(rng).cloned())
            .collect()
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            words: DEFAULT_WORDS.iter().map(|word| word.to_string()).collect(),
            word_choices: DEFAULT_WORD_CHOICES,
        }
    }
}

/// One placeholder per character of `word`.
pub fn mask(word: &str) -> String {
    word.chars().map(|_| CLUE_PLACEHOLDER).collect()
}
