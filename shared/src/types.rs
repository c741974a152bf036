//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Supported languages
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    #[serde(alias = "bn")]
    Bangla,
    #[serde(alias = "en")]
    English,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Bangla => "bn",
            Language::English => "en",
        }
    }

    /// Parse a language code, falling back to Bangla
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Language::English,
            _ => Language::Bangla,
        }
    }
}

/// A message carried in both supported languages
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct LocalizedText {
    pub en: &'static str,
    pub bn: &'static str,
}

impl LocalizedText {
    pub const fn new(en: &'static str, bn: &'static str) -> Self {
        Self { en, bn }
    }

    pub fn get(&self, language: Language) -> &'static str {
        match language {
            Language::Bangla => self.bn,
            Language::English => self.en,
        }
    }
}

/// Convert ASCII digits in a string to Bangla digits
pub fn to_bangla_digits(value: &str) -> String {
    const DIGITS: [char; 10] = ['০', '১', '২', '৩', '৪', '৫', '৬', '৭', '৮', '৯'];
    value
        .chars()
        .map(|c| match c.to_digit(10) {
            Some(d) => DIGITS[d as usize],
            None => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_code() {
        assert_eq!(Language::from_code("en"), Language::English);
        assert_eq!(Language::from_code("EN"), Language::English);
        assert_eq!(Language::from_code("bn"), Language::Bangla);
        assert_eq!(Language::from_code("fr"), Language::Bangla);
    }

    #[test]
    fn test_bangla_digits() {
        assert_eq!(to_bangla_digits("48 hours"), "৪৮ hours");
        assert_eq!(to_bangla_digits(""), "");
    }
}
