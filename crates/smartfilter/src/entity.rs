//! # Filterable Entities
//!
//! The compiled predicate never sees storage rows. It asks the entity for
//! one [`FieldValue`] per field through [`Filterable`], so any adapter can
//! plug its own row type in.
//!
//! [`SeriesRecord`] is the reference implementation used by the in-memory
//! catalog, the CLI and the tests.

use crate::catalog::{describe_field, FilterField, PersonRole};
use crate::model::SortField;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// The runtime value of one field on one entity.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    /// Several texts, e.g. every file path of a series. Text operators match
    /// when any element matches.
    Texts(Vec<String>),
    /// Ordinal within the field's enum domain.
    Enum(u8),
    Number(f64),
    /// `None` when the entity has no date for this field (e.g. never read).
    Date(Option<DateTime<Utc>>),
    Duration(Duration),
    /// Member tokens of a collection field.
    Members(Vec<String>),
}

/// A value an entity is ordered by.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Text(String),
    Number(f64),
    Date(Option<DateTime<Utc>>),
}

impl SortKey {
    /// Total order. Missing dates sort before present ones; keys of
    /// different shapes fall back to equal so the id tiebreak decides.
    pub fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Date(a), SortKey::Date(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// An entity a compiled filter can be evaluated against.
pub trait Filterable {
    /// Stable identity, used as the final sort tiebreak.
    fn id(&self) -> i64;

    /// The value of `field`, or `None` when the entity does not carry it.
    fn field_value(&self, field: FilterField) -> Option<FieldValue>;

    fn sort_key(&self, field: SortField) -> SortKey;
}

/// A series row as exported from the catalog.
///
/// Enum fields hold variant names (or ordinals as text); collection fields
/// hold member tokens, typically ids or names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeriesRecord {
    pub id: i64,
    pub name: String,
    pub original_name: Option<String>,
    pub localized_name: Option<String>,
    pub sort_name: Option<String>,
    pub summary: String,
    pub publication_status: String,
    pub age_rating: String,
    pub language: String,
    pub library: String,
    pub format: String,
    pub want_to_read: bool,
    pub user_rating: Option<f64>,
    pub average_rating: Option<f64>,
    /// Percent of pages read, 0-100.
    pub read_progress: f64,
    pub release_year: Option<i32>,
    pub avg_hours_to_read: i64,
    pub folder_path: String,
    pub file_paths: Vec<String>,
    pub tags: Vec<String>,
    pub collection_tags: Vec<String>,
    pub genres: Vec<String>,
    pub people: BTreeMap<PersonRole, Vec<String>>,
    pub last_read: Option<DateTime<Utc>>,
    pub created: Option<DateTime<Utc>>,
    pub last_modified: Option<DateTime<Utc>>,
    pub last_chapter_added: Option<DateTime<Utc>>,
}

impl SeriesRecord {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Default::default()
        }
    }

    fn enum_value(field: FilterField, literal: &str) -> Option<FieldValue> {
        let domain = describe_field(field)?.domain?;
        domain.parse(literal).map(FieldValue::Enum)
    }

    /// Every name the series is known by. Text operators on the name field
    /// match when any of them matches.
    fn names(&self) -> Vec<String> {
        let alternates = [&self.original_name, &self.localized_name, &self.sort_name];
        std::iter::once(self.name.clone())
            .chain(
                alternates
                    .into_iter()
                    .flatten()
                    .filter(|name| !name.is_empty())
                    .cloned(),
            )
            .collect()
    }

    fn single_member(token: &str) -> FieldValue {
        if token.is_empty() {
            FieldValue::Members(Vec::new())
        } else {
            FieldValue::Members(vec![token.to_string()])
        }
    }
}

impl Filterable for SeriesRecord {
    fn id(&self) -> i64 {
        self.id
    }

    fn field_value(&self, field: FilterField) -> Option<FieldValue> {
        if let Some(role) = describe_field(field).and_then(|spec| spec.role) {
            return Some(FieldValue::Members(
                self.people.get(&role).cloned().unwrap_or_default(),
            ));
        }

        match field {
            FilterField::None => None,
            FilterField::Summary => Some(FieldValue::Text(self.summary.clone())),
            FilterField::SeriesName => Some(FieldValue::Texts(self.names())),
            FilterField::Path => Some(FieldValue::Text(self.folder_path.clone())),
            FilterField::FilePath => Some(FieldValue::Texts(self.file_paths.clone())),
            FilterField::PublicationStatus => Self::enum_value(field, &self.publication_status),
            FilterField::AgeRating => Self::enum_value(field, &self.age_rating),
            FilterField::WantToRead => Some(FieldValue::Enum(u8::from(self.want_to_read))),
            FilterField::UserRating => self.user_rating.map(FieldValue::Number),
            FilterField::AverageRating => self.average_rating.map(FieldValue::Number),
            FilterField::ReadProgress => Some(FieldValue::Number(self.read_progress)),
            FilterField::ReleaseYear => self.release_year.map(|year| FieldValue::Number(year.into())),
            FilterField::ReadTime => Duration::try_hours(self.avg_hours_to_read).map(FieldValue::Duration),
            FilterField::ReadingDate => Some(FieldValue::Date(self.last_read)),
            FilterField::Languages => Some(Self::single_member(&self.language)),
            FilterField::Libraries => Some(Self::single_member(&self.library)),
            FilterField::Formats => Some(Self::single_member(&self.format)),
            FilterField::Tags => Some(FieldValue::Members(self.tags.clone())),
            FilterField::CollectionTags => Some(FieldValue::Members(self.collection_tags.clone())),
            FilterField::Genres => Some(FieldValue::Members(self.genres.clone())),
            // Person-role fields are resolved through the catalog above.
            _ => None,
        }
    }

    fn sort_key(&self, field: SortField) -> SortKey {
        match field {
            SortField::SortName => SortKey::Text(
                self.sort_name
                    .as_deref()
                    .unwrap_or(&self.name)
                    .to_lowercase(),
            ),
            SortField::CreatedDate => SortKey::Date(self.created),
            SortField::LastModifiedDate => SortKey::Date(self.last_modified),
            SortField::LastChapterAdded => SortKey::Date(self.last_chapter_added),
            SortField::TimeToRead => SortKey::Number(self.avg_hours_to_read as f64),
            SortField::ReleaseYear => SortKey::Number(self.release_year.map_or(0.0, f64::from)),
            SortField::ReadProgress => SortKey::Number(self.read_progress),
            SortField::AverageRating => SortKey::Number(self.average_rating.unwrap_or(0.0)),
        }
    }
}

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;

    /// Builder for series rows in tests.
    pub struct SeriesFixture {
        record: SeriesRecord,
    }

    impl SeriesFixture {
        pub fn new(id: i64, name: &str) -> Self {
            Self {
                record: SeriesRecord::new(id, name),
            }
        }

        pub fn localized_name(mut self, name: &str) -> Self {
            self.record.localized_name = Some(name.to_string());
            self
        }

        pub fn original_name(mut self, name: &str) -> Self {
            self.record.original_name = Some(name.to_string());
            self
        }

        pub fn age_rating(mut self, rating: &str) -> Self {
            self.record.age_rating = rating.to_string();
            self
        }

        pub fn status(mut self, status: &str) -> Self {
            self.record.publication_status = status.to_string();
            self
        }

        pub fn genres(mut self, genres: &[&str]) -> Self {
            self.record.genres = genres.iter().map(|g| g.to_string()).collect();
            self
        }

        pub fn tags(mut self, tags: &[&str]) -> Self {
            self.record.tags = tags.iter().map(|t| t.to_string()).collect();
            self
        }

        pub fn person(mut self, role: PersonRole, names: &[&str]) -> Self {
            self.record
                .people
                .insert(role, names.iter().map(|n| n.to_string()).collect());
            self
        }

        pub fn summary(mut self, summary: &str) -> Self {
            self.record.summary = summary.to_string();
            self
        }

        pub fn release_year(mut self, year: i32) -> Self {
            self.record.release_year = Some(year);
            self
        }

        pub fn read_progress(mut self, percent: f64) -> Self {
            self.record.read_progress = percent;
            self
        }

        pub fn hours_to_read(mut self, hours: i64) -> Self {
            self.record.avg_hours_to_read = hours;
            self
        }

        pub fn last_read(mut self, at: DateTime<Utc>) -> Self {
            self.record.last_read = Some(at);
            self
        }

        pub fn files(mut self, paths: &[&str]) -> Self {
            self.record.file_paths = paths.iter().map(|p| p.to_string()).collect();
            self
        }

        pub fn library(mut self, library: &str) -> Self {
            self.record.library = library.to_string();
            self
        }

        pub fn want_to_read(mut self) -> Self {
            self.record.want_to_read = true;
            self
        }

        pub fn build(self) -> SeriesRecord {
            self.record
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::SeriesFixture;
    use super::*;

    #[test]
    fn person_fields_resolve_by_role() {
        let series = SeriesFixture::new(1, "Saga")
            .person(PersonRole::Writer, &["Brian K. Vaughan"])
            .build();
        assert_eq!(
            series.field_value(FilterField::Writers),
            Some(FieldValue::Members(vec!["Brian K. Vaughan".into()]))
        );
        assert_eq!(
            series.field_value(FilterField::Colorist),
            Some(FieldValue::Members(vec![]))
        );
    }

    #[test]
    fn series_name_covers_every_alternate_name() {
        let mut series = SeriesFixture::new(1, "Shingeki no Kyojin")
            .localized_name("Attack on Titan")
            .original_name("")
            .build();
        series.sort_name = Some("Shingeki".into());
        assert_eq!(
            series.field_value(FilterField::SeriesName),
            Some(FieldValue::Texts(vec![
                "Shingeki no Kyojin".into(),
                "Attack on Titan".into(),
                "Shingeki".into(),
            ]))
        );
    }

    #[test]
    fn enum_fields_parse_stored_names() {
        let series = SeriesFixture::new(1, "Saga").age_rating("Mature").status("2").build();
        assert_eq!(series.field_value(FilterField::AgeRating), Some(FieldValue::Enum(11)));
        assert_eq!(series.field_value(FilterField::PublicationStatus), Some(FieldValue::Enum(2)));
    }

    #[test]
    fn unknown_enum_name_has_no_value() {
        let series = SeriesFixture::new(1, "Saga").age_rating("Spicy").build();
        assert_eq!(series.field_value(FilterField::AgeRating), None);
    }

    #[test]
    fn empty_single_valued_collections_have_no_members() {
        let series = SeriesRecord::new(1, "Saga");
        assert_eq!(series.field_value(FilterField::Libraries), Some(FieldValue::Members(vec![])));
    }

    #[test]
    fn sort_name_falls_back_to_name() {
        let mut series = SeriesRecord::new(1, "The Saga");
        assert_eq!(series.sort_key(SortField::SortName), SortKey::Text("the saga".into()));
        series.sort_name = Some("Saga, The".into());
        assert_eq!(series.sort_key(SortField::SortName), SortKey::Text("saga, the".into()));
    }

    #[test]
    fn missing_dates_sort_first() {
        let now = Utc::now();
        assert_eq!(SortKey::Date(None).compare(&SortKey::Date(Some(now))), Ordering::Less);
    }

    #[test]
    fn deserializes_export_row() {
        let json = r#"{
            "id": 7, "name": "Berserk", "ageRating": "Mature",
            "genres": ["Action", "Horror"],
            "people": {"writer": ["Kentaro Miura"]},
            "lastRead": "2024-05-01T10:00:00Z"
        }"#;
        let series: SeriesRecord = serde_json::from_str(json).unwrap();
        assert_eq!(series.id, 7);
        assert_eq!(series.people[&PersonRole::Writer], vec!["Kentaro Miura"]);
        assert!(series.last_read.is_some());
    }
}
