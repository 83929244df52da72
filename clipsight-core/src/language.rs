use clap::ValueEnum;
use serde::Serialize;
use std::fmt;

/// Languages the bundled speech and text recognition backends understand.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Language {
    #[clap(name = "english")]
    English,
    #[clap(name = "chinese")]
    Chinese,
    #[clap(name = "german")]
    German,
    #[clap(name = "spanish")]
    Spanish,
    #[clap(name = "russian")]
    Russian,
    #[clap(name = "korean")]
    Korean,
    #[clap(name = "french")]
    French,
    #[clap(name = "japanese")]
    Japanese,
    #[clap(name = "portuguese")]
    Portuguese,
    #[clap(name = "turkish")]
    Turkish,
    #[clap(name = "polish")]
    Polish,
    #[clap(name = "dutch")]
    Dutch,
    #[clap(name = "arabic")]
    Arabic,
    #[clap(name = "italian")]
    Italian,
    #[clap(name = "hindi")]
    Hindi,
    #[clap(name = "vietnamese")]
    Vietnamese,
}

impl Language {
    /// ISO 639-1 code, the form speech services accept.
    pub fn as_lang_code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Chinese => "zh",
            Language::German => "de",
            Language::Spanish => "es",
            Language::Russian => "ru",
            Language::Korean => "ko",
            Language::French => "fr",
            Language::Japanese => "ja",
            Language::Portuguese => "pt",
            Language::Turkish => "tr",
            Language::Polish => "pl",
            Language::Dutch => "nl",
            Language::Arabic => "ar",
            Language::Italian => "it",
            Language::Hindi => "hi",
            Language::Vietnamese => "vi",
        }
    }

    /// Traineddata name used by the tesseract backend.
    pub fn tesseract_code(&self) -> &'static str {
        match self {
            Language::English => "eng",
            Language::Chinese => "chi_sim",
            Language::German => "deu",
            Language::Spanish => "spa",
            Language::Russian => "rus",
            Language::Korean => "kor",
            Language::French => "fra",
            Language::Japanese => "jpn",
            Language::Portuguese => "por",
            Language::Turkish => "tur",
            Language::Polish => "pol",
            Language::Dutch => "nld",
            Language::Arabic => "ara",
            Language::Italian => "ita",
            Language::Hindi => "hin",
            Language::Vietnamese => "vie",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let possible_value = self.to_possible_value().unwrap();
        write!(f, "{}", possible_value.get_name())
    }
}
