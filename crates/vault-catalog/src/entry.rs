//! Mapping of `info.json` files to records.
//!
//! Entry metadata uses hyphenated keys and loose types: numbers where text is expected,
//! a legacy comma-separated `years-used` string next to the newer `seasons-used` list,
//! and section-specific keys. Everything is normalized into [`Record`] fields here.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use vault_index::{FieldValue, Record};

use crate::Category;

/// Metadata file inside every entry directory.
pub const INFO_FILE: &str = "info.json";

/// Raw contents of an `info.json` file.
///
/// Unknown keys are ignored. Every known key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EntryInfo {
    /// Display title.
    title: Option<Value>,
    /// Author or team name.
    author: Option<Value>,
    /// Free-form description.
    description: Option<Value>,
    /// FTC team number.
    team_number: Option<Value>,
    /// Preview image file name inside the entry directory.
    preview_image_name: Option<Value>,
    /// Seasons the entry was used in.
    seasons_used: Option<Value>,
    /// Legacy form of `seasons-used`.
    years_used: Option<Value>,
    /// Downloadable archive of a code entry.
    download_name: Option<Value>,
    /// Programming language of a code entry.
    language: Option<Value>,
    /// Whether the entry was used in competition.
    used_in_comp: Option<Value>,
    /// Document file of a portfolio entry.
    file_name: Option<Value>,
    /// Awards won by a portfolio.
    awards_won: Option<Value>,
    /// Onshape document of a CAD entry.
    onshape_link: Option<Value>,
}

impl EntryInfo {
    /// Parses the contents of an `info.json` file.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    /// Converts the entry into a record.
    ///
    /// `entry_dir` is the directory the file was read from; file names are resolved
    /// against it.
    pub fn into_record(self, category: &Category, entry_name: &str, entry_dir: &Path) -> Record {
        let mut record = Record::new(format!("{category}/{entry_name}"));

        set(&mut record, "title", self.title.as_ref());
        set(&mut record, "author", self.author.as_ref());
        set(&mut record, "description", self.description.as_ref());
        set(&mut record, "team_number", self.team_number.as_ref());
        set_file(
            &mut record,
            "preview_image_url",
            self.preview_image_name.as_ref(),
            entry_dir,
        );
        let seasons = normalize_seasons(self.seasons_used.as_ref(), self.years_used.as_ref());
        if let Some(seasons) = seasons {
            record.set("seasons_used", seasons);
        }

        match category.section() {
            "code" => {
                set_file(&mut record, "download_url", self.download_name.as_ref(), entry_dir);
                set(&mut record, "language", self.language.as_ref());
                set(&mut record, "used_in_comp", self.used_in_comp.as_ref());
            }
            "portfolios" => {
                set_file(&mut record, "download_url", self.file_name.as_ref(), entry_dir);
                set(&mut record, "awards_won", self.awards_won.as_ref());
            }
            "cad" => {
                set(&mut record, "used_in_comp", self.used_in_comp.as_ref());
                set(&mut record, "onshape_link", self.onshape_link.as_ref());
            }
            _ => {}
        }
        record
    }
}

/// Sets a field from a JSON value, skipping absent keys and objects.
fn set(record: &mut Record, name: &str, value: Option<&Value>) {
    if let Some(value) = value.and_then(field_value) {
        record.set(name, value);
    }
}

/// Sets a field to the path of a file named by a JSON string.
fn set_file(record: &mut Record, name: &str, value: Option<&Value>, entry_dir: &Path) {
    if let Some(file) = value.and_then(scalar_text).filter(|f| !f.is_empty()) {
        record.set(name, entry_dir.join(file).display().to_string());
    }
}

/// Converts a JSON value to a field value.
///
/// Numbers become text. Arrays keep their scalar items. Objects have no field form.
pub fn field_value(value: &Value) -> Option<FieldValue> {
    match value {
        Value::Null => Some(FieldValue::Missing),
        Value::Bool(flag) => Some(FieldValue::Flag(*flag)),
        Value::Number(_) | Value::String(_) => scalar_text(value).map(FieldValue::Text),
        Value::Array(items) => Some(FieldValue::List(
            items.iter().filter_map(scalar_text).collect(),
        )),
        Value::Object(_) => None,
    }
}

/// Text of a string, number or boolean.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Resolves the seasons an entry was used in.
///
/// A `seasons-used` list is taken as is. Otherwise the legacy `years-used` value is
/// split on commas and each short `YY-YY` form is expanded to `20YY-20YY`.
pub fn normalize_seasons(seasons: Option<&Value>, years: Option<&Value>) -> Option<Vec<String>> {
    if let Some(Value::Array(items)) = seasons {
        return Some(
            items
                .iter()
                .filter_map(scalar_text)
                .filter(|s| !s.is_empty())
                .collect(),
        );
    }

    let legacy = match years.or(seasons)? {
        Value::Array(items) => items.iter().filter_map(scalar_text).collect::<Vec<_>>(),
        Value::Null | Value::Object(_) => return None,
        other => scalar_text(other)
            .map(|text| text.split(',').map(str::to_string).collect())
            .unwrap_or_default(),
    };

    Some(
        legacy
            .iter()
            .map(|season| expand_season(season.trim()))
            .filter(|s| !s.is_empty())
            .collect(),
    )
}

/// Expands `24-25` to `2024-2025`; anything else is returned unchanged.
fn expand_season(season: &str) -> String {
    match season.split_once('-') {
        Some((start, end))
            if start.len() == 2
                && end.len() == 2
                && start.bytes().chain(end.bytes()).all(|b| b.is_ascii_digit()) =>
        {
            format!("20{start}-20{end}")
        }
        _ => season.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serde_json::json;

    use super::*;

    fn category(name: &str) -> Category {
        name.parse().unwrap()
    }

    fn record(category_name: &str, info: &Value) -> Record {
        let info: EntryInfo = serde_json::from_value(info.clone()).unwrap();
        info.into_record(
            &category(category_name),
            "entry",
            &PathBuf::from("/mirror").join(category_name).join("entry"),
        )
    }

    #[test]
    fn common_fields_for_every_section() {
        let record = record(
            "cad/drivetrains",
            &json!({
                "title": "Swerve",
                "author": "Team Rocket",
                "description": "A swerve drive",
                "team-number": 12345,
                "preview-image-name": "preview.png",
                "seasons-used": ["2023-2024"],
                "onshape-link": "https://cad.example/swerve",
                "used-in-comp": true,
                "language": "Java"
            }),
        );

        assert_eq!(record.id, "cad/drivetrains/entry");
        assert_eq!(record.text("title"), "Swerve");
        assert_eq!(record.text("team_number"), "12345");
        assert!(record.text("preview_image_url").ends_with("preview.png"));
        assert_eq!(record.get("used_in_comp"), Some(&FieldValue::Flag(true)));
        assert_eq!(record.text("onshape_link"), "https://cad.example/swerve");
        assert!(record.get("language").is_none());
    }

    #[test]
    fn code_fields() {
        let record = record(
            "code/teleop",
            &json!({
                "title": "Field Centric",
                "download-name": "fieldcentric.zip",
                "language": "Kotlin",
                "used-in-comp": false,
                "awards-won": ["Think"]
            }),
        );
        assert!(record.text("download_url").ends_with("fieldcentric.zip"));
        assert_eq!(record.text("language"), "Kotlin");
        assert_eq!(record.get("used_in_comp"), Some(&FieldValue::Flag(false)));
        assert!(record.get("awards_won").is_none());
    }

    #[test]
    fn portfolio_fields() {
        let record = record(
            "portfolios/portfolios",
            &json!({
                "file-name": "portfolio.pdf",
                "awards-won": ["Inspire", "Think"],
                "onshape-link": "ignored"
            }),
        );
        assert!(record.text("download_url").ends_with("portfolio.pdf"));
        assert_eq!(
            record.get("awards_won"),
            Some(&FieldValue::List(vec!["Inspire".into(), "Think".into()]))
        );
        assert!(record.get("onshape_link").is_none());
    }

    #[test]
    fn missing_keys_are_absent_fields() {
        let record = record("cad/claws", &json!({"title": "Claw"}));
        assert_eq!(record.fields.len(), 1);
    }

    #[test]
    fn nested_objects_are_ignored() {
        let record = record("cad/claws", &json!({"title": {"en": "Claw"}, "author": "Ben"}));
        assert!(record.get("title").is_none());
        assert_eq!(record.text("author"), "Ben");
    }

    #[test]
    fn seasons_list_wins_over_years() {
        let seasons = json!(["2024-2025"]);
        let years = json!("22-23");
        assert_eq!(
            normalize_seasons(Some(&seasons), Some(&years)),
            Some(vec!["2024-2025".to_string()])
        );
    }

    #[test]
    fn legacy_years_are_expanded() {
        let years = json!("22-23, 2023-2024 ,24-25,");
        assert_eq!(
            normalize_seasons(None, Some(&years)),
            Some(vec![
                "2022-2023".to_string(),
                "2023-2024".to_string(),
                "2024-2025".to_string()
            ])
        );
        assert_eq!(normalize_seasons(None, None), None);
    }

    #[test]
    fn short_forms_only_expand_when_numeric() {
        assert_eq!(expand_season("24-25"), "2024-2025");
        assert_eq!(expand_season("ab-cd"), "ab-cd");
        assert_eq!(expand_season("2024"), "2024");
    }

    #[test]
    fn numbers_become_text() {
        assert_eq!(
            field_value(&json!(18219)),
            Some(FieldValue::Text("18219".into()))
        );
        assert_eq!(
            field_value(&json!(["a", 2, {"x": 1}])),
            Some(FieldValue::List(vec!["a".into(), "2".into()]))
        );
        assert_eq!(field_value(&json!(null)), Some(FieldValue::Missing));
        assert_eq!(field_value(&json!({})), None);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(EntryInfo::parse("{\"title\": ").is_err());
        assert!(EntryInfo::parse("\"just text\"").is_err());
    }
}
