//! Fixed choices offered by the form: picklists, target languages and the
//! carousel shown above the inputs.

use serde::Serialize;

use crate::config::Config;

pub const SOIL_TYPES: &[&str] = &[
    "Loamy", "Clayey", "Sandy", "Silty", "Peaty", "Saline", "Chalky", "Organic",
];

pub const CROP_TYPES: &[&str] = &[
    "Wheat", "Rice", "Corn", "Soybean", "Barley", "Sugarcane", "Cotton", "Tomato", "Potato",
    "Maize",
];

pub const WEATHER_PATTERNS: &[&str] = &[
    "Sunny", "Rainy", "Cloudy", "Windy", "Snowy", "Humid", "Dry", "Stormy",
];

/// A translation target offered in the language selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    /// Form value, e.g. "tamil".
    pub name: &'static str,
    /// ISO 639-1 code sent to the translation service.
    pub code: &'static str,
    pub label: &'static str,
}

pub const LANGUAGES: &[Language] = &[
    Language { name: "english", code: "en", label: "English" },
    Language { name: "tamil", code: "ta", label: "Tamil" },
    Language { name: "hindi", code: "hi", label: "Hindi" },
    Language { name: "arabic", code: "ar", label: "Arabic" },
];

/// Look up a language by form value or ISO code, ignoring case and
/// surrounding whitespace.
pub fn find_language(key: &str) -> Option<&'static Language> {
    let key = key.trim();
    LANGUAGES
        .iter()
        .find(|l| l.name.eq_ignore_ascii_case(key) || l.code.eq_ignore_ascii_case(key))
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Slide {
    pub key: &'static str,
    pub src: &'static str,
    pub alt: &'static str,
}

pub const CAROUSEL: &[Slide] = &[
    Slide {
        key: "1",
        src: "https://via.placeholder.com/800x400?text=Loamy+Soil",
        alt: "Loamy Soil",
    },
    Slide {
        key: "2",
        src: "https://via.placeholder.com/800x400?text=Crop+Varieties",
        alt: "Crops",
    },
    Slide {
        key: "3",
        src: "https://via.placeholder.com/800x400?text=Weather+Patterns",
        alt: "Weather",
    },
    Slide {
        key: "4",
        src: "https://via.placeholder.com/800x400?text=Organic+Fertilizers",
        alt: "Organic Fertilizers",
    },
];

/// Everything the page needs to build the form.
#[derive(Debug, Clone, Serialize)]
pub struct FormOptions {
    pub title: String,
    pub soil: &'static [&'static str],
    pub crop: &'static [&'static str],
    pub weather: &'static [&'static str],
    pub languages: &'static [Language],
    pub default_language: String,
    pub carousel: &'static [Slide],
}

impl FormOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            title: config.title.clone(),
            soil: SOIL_TYPES,
            crop: CROP_TYPES,
            weather: WEATHER_PATTERNS,
            languages: LANGUAGES,
            default_language: config.translate.default_language.clone(),
            carousel: if config.form.show_carousel { CAROUSEL } else { &[] },
        }
    }
}
