//! Translation between store locale tags and Lokalise language codes.
//!
//! The stores use hyphenated tags (`en-US`, `zh-Hans`, `iw-IL`) while the
//! service uses underscores and, for a number of languages, bare language
//! codes (`en`, `zh_CN`, `he`). Conversion is separator substitution followed
//! by a per-domain override table keyed by the substituted form.
//!
//! A handful of store tags are legacy aliases: they are accepted on the way to
//! the service but the way back yields the current tag, so they do not
//! round-trip. They are listed in [`asymmetric_aliases`].

use crate::MetadataDomain;

/// Conversion direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Store tag → service code.
    ToService,
    /// Service code → store tag.
    ToStore,
}

/// A locale known in both forms for one domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocaleCode {
    store_form: String,
    service_form: String,
}

impl LocaleCode {
    /// Builds a locale from its store tag.
    pub fn from_store(domain: MetadataDomain, code: &str) -> Self {
        Self {
            store_form: code.to_string(),
            service_form: to_service(code, domain),
        }
    }

    /// Builds a locale from its service code.
    pub fn from_service(domain: MetadataDomain, code: &str) -> Self {
        Self {
            store_form: to_store(code, domain),
            service_form: code.to_string(),
        }
    }

    /// Store tag, e.g. `en-US`.
    pub fn store_form(&self) -> &str {
        &self.store_form
    }

    /// Service code, e.g. `en`.
    pub fn service_form(&self) -> &str {
        &self.service_form
    }
}

/// Converts a locale code in the given direction.
pub fn normalize(code: &str, direction: Direction, domain: MetadataDomain) -> String {
    let (from, to) = match direction {
        Direction::ToService => ('-', '_'),
        Direction::ToStore => ('_', '-'),
    };
    let substituted = code.replace(from, &to.to_string());

    overrides(domain, direction)
        .iter()
        .find(|(key, _)| *key == substituted)
        .map(|(_, value)| (*value).to_string())
        .unwrap_or(substituted)
}

/// Store tag → service code.
pub fn to_service(code: &str, domain: MetadataDomain) -> String {
    normalize(code, Direction::ToService, domain)
}

/// Service code → store tag.
pub fn to_store(code: &str, domain: MetadataDomain) -> String {
    normalize(code, Direction::ToStore, domain)
}

/// Override table for a domain and direction, keyed by the substituted form.
pub fn overrides(domain: MetadataDomain, direction: Direction) -> &'static [(&'static str, &'static str)] {
    match (domain, direction) {
        (MetadataDomain::AppStore, Direction::ToService) => APP_STORE_TO_SERVICE,
        (MetadataDomain::AppStore, Direction::ToStore) => APP_STORE_TO_STORE,
        (MetadataDomain::GooglePlay, Direction::ToService) => GOOGLE_PLAY_TO_SERVICE,
        (MetadataDomain::GooglePlay, Direction::ToStore) => GOOGLE_PLAY_TO_STORE,
    }
}

/// Store tags that are converted to the service but never produced back.
pub fn asymmetric_aliases(domain: MetadataDomain) -> &'static [&'static str] {
    match domain {
        MetadataDomain::AppStore => &["zh-CN", "zh-TW"],
        MetadataDomain::GooglePlay => &["et-EE", "lv-LV", "lt-LT", "sl-SI"],
    }
}

/// Store languages supported for a domain.
pub fn languages(domain: MetadataDomain) -> &'static [&'static str] {
    match domain {
        MetadataDomain::AppStore => APP_STORE_LANGUAGES,
        MetadataDomain::GooglePlay => GOOGLE_PLAY_LANGUAGES,
    }
}

/// Supported languages in service form.
pub fn service_languages(domain: MetadataDomain) -> Vec<String> {
    let mut codes: Vec<String> = languages(domain)
        .iter()
        .map(|code| to_service(code, domain))
        .collect();
    codes.sort();
    codes.dedup();
    codes
}

/// Whether a store tag is in the domain's language list.
pub fn is_supported(code: &str, domain: MetadataDomain) -> bool {
    languages(domain).contains(&code)
}

const APP_STORE_TO_SERVICE: &[(&str, &str)] = &[
    ("en_US", "en"),
    ("de_DE", "de"),
    ("es_ES", "es"),
    ("fr_FR", "fr"),
    ("zh_Hans", "zh_CN"),
    ("zh_Hant", "zh_TW"),
];

const APP_STORE_TO_STORE: &[(&str, &str)] = &[
    ("en", "en-US"),
    ("de", "de-DE"),
    ("es", "es-ES"),
    ("fr", "fr-FR"),
    ("zh-CN", "zh-Hans"),
    ("zh-TW", "zh-Hant"),
];

const GOOGLE_PLAY_TO_SERVICE: &[(&str, &str)] = &[
    ("tr_TR", "tr"),
    ("hy_AM", "hy"),
    ("my_MM", "my"),
    ("cs_CZ", "cs"),
    ("da_DK", "da"),
    ("fi_FI", "fi"),
    ("iw_IL", "he"),
    ("hu_HU", "hu"),
    ("ja_JP", "ja"),
    ("ko_KR", "ko"),
    ("ky_KG", "ky"),
    ("lo_LA", "lo"),
    ("mr_IN", "mr"),
    ("no_NO", "no"),
    ("pl_PL", "pl"),
    ("si_LK", "si"),
    // legacy tags, one-way
    ("et_EE", "et"),
    ("lv_LV", "lv"),
    ("lt_LT", "lt"),
    ("sl_SI", "sl"),
];

const GOOGLE_PLAY_TO_STORE: &[(&str, &str)] = &[
    ("tr", "tr-TR"),
    ("hy", "hy-AM"),
    ("my", "my-MM"),
    ("cs", "cs-CZ"),
    ("da", "da-DK"),
    ("fi", "fi-FI"),
    ("he", "iw-IL"),
    ("hu", "hu-HU"),
    ("ja", "ja-JP"),
    ("ko", "ko-KR"),
    ("ky", "ky-KG"),
    ("lo", "lo-LA"),
    ("mr", "mr-IN"),
    ("no", "no-NO"),
    ("pl", "pl-PL"),
    ("si", "si-LK"),
];

const APP_STORE_LANGUAGES: &[&str] = &[
    "ar-SA", "ca", "cs", "da", "de-DE", "el", "en-AU", "en-CA", "en-GB", "en-US", "es-ES",
    "es-MX", "fi", "fr-CA", "fr-FR", "he", "hi", "hr", "hu", "id", "it", "ja", "ko", "ms",
    "nl-NL", "no", "pl", "pt-BR", "pt-PT", "ro", "ru", "sk", "sv", "th", "tr", "uk", "vi",
    "zh-Hans", "zh-Hant", "zh-CN", "zh-TW",
];

const GOOGLE_PLAY_LANGUAGES: &[&str] = &[
    "af", "am", "ar", "hy-AM", "az-AZ", "bn-BD", "eu-ES", "be", "bg", "my-MM", "ca", "zh-HK",
    "zh-CN", "zh-TW", "hr", "cs-CZ", "da-DK", "nl-NL", "en-AU", "en-IN", "en-SG", "en-ZA",
    "en-CA", "en-GB", "en-US", "et", "fil", "fi-FI", "fr-FR", "fr-CA", "gl-ES", "ka-GE",
    "de-DE", "el-GR", "iw-IL", "hi-IN", "hu-HU", "is-IS", "id", "it-IT", "ja-JP", "kn-IN",
    "km-KH", "ko-KR", "ky-KG", "lo-LA", "lv", "lt", "mk-MK", "ms", "ml-IN", "mr-IN", "mn-MN",
    "ne-NP", "no-NO", "fa", "pl-PL", "pt-BR", "pt-PT", "ro", "rm", "ru-RU", "sr", "si-LK",
    "sk", "sl", "es-419", "es-ES", "es-US", "sw", "sv-SE", "ta-IN", "te-IN", "th", "tr-TR",
    "uk", "vi", "zu",
];
