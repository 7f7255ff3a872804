//! Request and response bodies for the Lokalise API.

use crate::Platform;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A key to create, without translations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewKey {
    pub key_name: String,
    pub platforms: Vec<Platform>,
}

impl NewKey {
    pub fn new(key_name: impl Into<String>, platform: Platform) -> Self {
        Self {
            key_name: key_name.into(),
            platforms: vec![platform],
        }
    }
}

/// Per-item failure reported inside a successful bulk response.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: Option<i64>,
    /// The offending item as echoed by the service.
    #[serde(flatten)]
    pub item: BTreeMap<String, serde_json::Value>,
}

/// Response of a bulk key creation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateKeysResponse {
    #[serde(default)]
    pub keys: Vec<RemoteKey>,
    #[serde(default)]
    pub errors: Vec<ItemError>,
}

/// Response of a key listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListKeysResponse {
    #[serde(default)]
    pub keys: Vec<RemoteKey>,
}

/// A key as returned by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteKey {
    pub key_id: u64,
    pub key_name: KeyName,
    #[serde(default)]
    pub translations: Vec<RemoteTranslation>,
}

impl RemoteKey {
    /// The key's name, if the service sent a usable one.
    pub fn name(&self) -> Option<&str> {
        self.key_name.resolve()
    }
}

/// Key names come back either as a plain string or per platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum KeyName {
    Plain(String),
    PerPlatform(BTreeMap<String, String>),
}

impl KeyName {
    /// Prefers the `other` platform name, then any non-empty one.
    pub fn resolve(&self) -> Option<&str> {
        match self {
            KeyName::Plain(name) => Some(name.as_str()).filter(|n| !n.is_empty()),
            KeyName::PerPlatform(names) => names
                .get(Platform::Other.as_str())
                .filter(|n| !n.is_empty())
                .or_else(|| names.values().find(|n| !n.is_empty()))
                .map(String::as_str),
        }
    }
}

/// One translation of a listed key.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteTranslation {
    pub language_iso: String,
    #[serde(default)]
    pub translation: Option<String>,
}

/// Translations to set on an existing key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyUpdate {
    pub key_id: u64,
    pub platforms: Vec<Platform>,
    pub translations: Vec<TranslationUpdate>,
}

/// One translation to set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationUpdate {
    pub language_iso: String,
    pub translation: String,
}

/// Response of a language creation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateLanguagesResponse {
    #[serde(default)]
    pub languages: Vec<serde_json::Value>,
    #[serde(default)]
    pub errors: Vec<ItemError>,
}

/// Options for an asynchronous bundle export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRequest {
    pub format: String,
    pub original_filenames: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_structure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_empty_as: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_comments: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace_breaks: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filter_langs: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include_tags: Vec<String>,
}

impl ExportRequest {
    /// `Localizable.strings` files inside `<lang>.lproj` directories.
    pub fn ios_strings() -> Self {
        Self {
            format: "strings".to_string(),
            original_filenames: false,
            bundle_structure: Some("%LANG_ISO%.lproj/Localizable.%FORMAT%".to_string()),
            export_empty_as: Some("base".to_string()),
            include_comments: None,
            replace_breaks: None,
            filter_langs: Vec::new(),
            include_tags: Vec::new(),
        }
    }

    /// Android `strings.xml` files inside `values-<lang>` directories.
    pub fn android_xml() -> Self {
        Self {
            format: "xml".to_string(),
            original_filenames: false,
            bundle_structure: Some("values-%LANG_ISO%/strings.%FORMAT%".to_string()),
            export_empty_as: Some("base".to_string()),
            include_comments: Some(false),
            replace_breaks: Some(true),
            filter_langs: Vec::new(),
            include_tags: Vec::new(),
        }
    }

    /// Restrict the export to these languages.
    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        self.filter_langs = languages;
        self
    }

    /// Restrict the export to keys carrying one of these tags.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.include_tags = tags;
        self
    }
}

/// Response of an export start call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartExportResponse {
    #[serde(default)]
    pub process_id: Option<String>,
}

/// Envelope of a process read.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessResponse {
    pub process: ProcessInfo,
}

/// A server-side process as reported by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessInfo {
    pub process_id: String,
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<ProcessDetails>,
}

/// Process details; only the download URL is of interest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessDetails {
    #[serde(default)]
    pub download_url: Option<String>,
}

/// A translation file to import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileUpload {
    pub filename: String,
    /// Base64-encoded file contents.
    pub data: String,
    pub lang_iso: String,
    pub convert_placeholders: bool,
    pub slashn_to_linebreak: bool,
}

/// Response of a file upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub process: Option<ProcessInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_name_variants() {
        let key: RemoteKey = serde_json::from_str(
            r#"{"key_id": 7, "key_name": {"ios": "", "android": "", "web": "", "other": "appstore.app.name"}}"#,
        )
        .unwrap();
        assert_eq!(key.name(), Some("appstore.app.name"));
        assert!(key.translations.is_empty());

        let key: RemoteKey =
            serde_json::from_str(r#"{"key_id": 8, "key_name": "googleplay.app.title"}"#).unwrap();
        assert_eq!(key.name(), Some("googleplay.app.title"));
    }

    #[test]
    fn test_key_name_falls_back_to_any_platform() {
        let name = KeyName::PerPlatform(BTreeMap::from([
            ("ios".to_string(), "ios.name".to_string()),
            ("other".to_string(), String::new()),
        ]));
        assert_eq!(name.resolve(), Some("ios.name"));
        assert_eq!(KeyName::Plain(String::new()).resolve(), None);
    }

    #[test]
    fn test_export_request_serialization() {
        let request = ExportRequest::android_xml().with_languages(vec!["en".to_string()]);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["format"], "xml");
        assert_eq!(json["bundle_structure"], "values-%LANG_ISO%/strings.%FORMAT%");
        assert_eq!(json["filter_langs"][0], "en");
        assert!(json.get("include_tags").is_none());

        let json = serde_json::to_value(ExportRequest::ios_strings()).unwrap();
        assert!(json.get("replace_breaks").is_none());
        assert_eq!(json["export_empty_as"], "base");
    }

    #[test]
    fn test_item_error_keeps_item() {
        let response: CreateKeysResponse = serde_json::from_str(
            r#"{"keys": [], "errors": [{"message": "This key name is already taken", "code": 400, "key_name": {"other": "a.b"}}]}"#,
        )
        .unwrap();
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].code, Some(400));
        assert!(response.errors[0].item.contains_key("key_name"));
    }

    #[test]
    fn test_process_deserialization() {
        let response: ProcessResponse = serde_json::from_str(
            r#"{"project_id": "p", "process": {"process_id": "abc", "type": "async-export", "status": "finished", "message": "", "details": {"download_url": "https://example.com/b.zip"}}}"#,
        )
        .unwrap();
        assert_eq!(response.process.status, "finished");
        assert_eq!(
            response.process.details.unwrap().download_url.as_deref(),
            Some("https://example.com/b.zip")
        );
    }
}
