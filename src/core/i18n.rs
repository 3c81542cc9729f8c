//! Localization boundary.
//!
//! Every user-facing string is requested through [`Translator::translate`]
//! with a [`Dictionary`]. The engine never branches on the active locale.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Supported locale codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    pub const ALL: [Self; 2] = [Self::En, Self::Es];

    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Self::En),
            "es" => Ok(Self::Es),
            other => Err(format!("unsupported locale: {other}")),
        }
    }
}

/// One string in every supported locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dictionary {
    pub en: &'static str,
    pub es: &'static str,
}

impl Dictionary {
    pub const fn new(en: &'static str, es: &'static str) -> Self {
        Self { en, es }
    }
}

/// Translation capability handed to everything that produces user-facing text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Translator {
    locale: Locale,
}

impl Translator {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Pick the entry for the active locale, falling back to English when a
    /// translation is missing.
    pub fn translate(&self, dictionary: &Dictionary) -> &'static str {
        let text = match self.locale {
            Locale::En => dictionary.en,
            Locale::Es => dictionary.es,
        };
        if text.is_empty() {
            dictionary.en
        } else {
            text
        }
    }

    /// Translate and substitute `{name}` placeholders.
    pub fn translate_with(&self, dictionary: &Dictionary, args: &[(&str, &str)]) -> String {
        let mut text = self.translate(dictionary).to_string();
        for (name, value) in args {
            text = text.replace(&format!("{{{name}}}"), value);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREETING: Dictionary = Dictionary::new("Hello {name}", "Hola {name}");
    const UNTRANSLATED: Dictionary = Dictionary::new("Only English", "");

    #[test]
    fn test_translate_by_locale() {
        assert_eq!(Translator::new(Locale::En).translate(&GREETING), "Hello {name}");
        assert_eq!(Translator::new(Locale::Es).translate(&GREETING), "Hola {name}");
    }

    #[test]
    fn test_missing_translation_falls_back() {
        assert_eq!(Translator::new(Locale::Es).translate(&UNTRANSLATED), "Only English");
    }

    #[test]
    fn test_placeholders() {
        let text = Translator::new(Locale::Es).translate_with(&GREETING, &[("name", "Acme")]);
        assert_eq!(text, "Hola Acme");
    }

    #[test]
    fn test_locale_parsing() {
        assert_eq!("ES".parse::<Locale>().unwrap(), Locale::Es);
        assert!("fr".parse::<Locale>().is_err());
    }
}
