//! UI language selection.
//!
//! The chosen locale travels in the `lang` cookie; message catalogs live with
//! the front end.

use serde::{Deserialize, Serialize};

pub const LOCALE_COOKIE: &str = "lang";
/// One year, in seconds.
pub const LOCALE_COOKIE_MAX_AGE: u64 = 60 * 60 * 24 * 365;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "no")]
    No,
    #[serde(rename = "es-MX")]
    EsMx,
    #[serde(rename = "sw")]
    Sw,
    #[serde(rename = "tr")]
    Tr,
    #[serde(rename = "zh-TW")]
    ZhTw,
}

impl Locale {
    pub const ALL: [Locale; 6] = [
        Locale::En,
        Locale::No,
        Locale::EsMx,
        Locale::Sw,
        Locale::Tr,
        Locale::ZhTw,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::No => "no",
            Locale::EsMx => "es-MX",
            Locale::Sw => "sw",
            Locale::Tr => "tr",
            Locale::ZhTw => "zh-TW",
        }
    }

    /// Name of the language in that language.
    pub fn label(self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::No => "Norsk",
            Locale::EsMx => "Español (MX)",
            Locale::Sw => "Kiswahili",
            Locale::Tr => "Türkçe",
            Locale::ZhTw => "繁體中文",
        }
    }

    /// Case-insensitive exact match against the supported codes.
    pub fn parse(input: &str) -> Option<Locale> {
        let input = input.trim();
        Self::ALL
            .into_iter()
            .find(|l| l.code().eq_ignore_ascii_case(input))
    }

    /// Like [`Locale::parse`], falling back to the default for missing or
    /// unknown input.
    pub fn normalize(input: Option<&str>) -> Locale {
        input.and_then(Self::parse).unwrap_or_default()
    }

    /// `Set-Cookie` value that persists this choice.
    pub fn cookie(self) -> String {
        format!(
            "{LOCALE_COOKIE}={}; Path=/; Max-Age={LOCALE_COOKIE_MAX_AGE}; SameSite=Lax",
            self.code()
        )
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
