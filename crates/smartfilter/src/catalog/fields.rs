//! Field specifications and registry.
//!
//! Every filterable field has one row in [`FIELDS`]. The row decides the
//! value kind the compiler parses literals into and the operators that are
//! legal against it.

use super::domains::{EnumDomain, PersonRole};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The semantic type of a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Free text, compared directly or by case-insensitive substring.
    Text,
    /// A closed set of named values, compared by ordinal.
    Enum,
    Number,
    Date,
    Duration,
    /// A set of related records (tags, genres, people, libraries).
    /// Comparisons test membership rather than equality.
    EntityCollection,
}

/// A filterable field. The discriminant is the stable wire id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
#[repr(i32)]
pub enum FilterField {
    /// Placeholder for a row the user has not filled in yet.
    None = -1,
    Summary = 0,
    SeriesName = 1,
    PublicationStatus = 2,
    Languages = 3,
    AgeRating = 4,
    UserRating = 5,
    Tags = 6,
    CollectionTags = 7,
    Translators = 8,
    Characters = 9,
    Publisher = 10,
    Editor = 11,
    CoverArtist = 12,
    Letterer = 13,
    Colorist = 14,
    Inker = 15,
    Penciller = 16,
    Writers = 17,
    Genres = 18,
    Libraries = 19,
    ReadProgress = 20,
    Formats = 21,
    ReleaseYear = 22,
    ReadTime = 23,
    Path = 24,
    FilePath = 25,
    WantToRead = 26,
    ReadingDate = 27,
    AverageRating = 28,
    Imprint = 29,
    Team = 30,
    Location = 31,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown filter field id {0}")]
pub struct UnknownFieldId(pub i32);

impl FilterField {
    pub fn id(self) -> i32 {
        self as i32
    }
}

impl From<FilterField> for i32 {
    fn from(field: FilterField) -> Self {
        field.id()
    }
}

impl TryFrom<i32> for FilterField {
    type Error = UnknownFieldId;

    fn try_from(id: i32) -> Result<Self, Self::Error> {
        field_from_id(id).ok_or(UnknownFieldId(id))
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match describe_field(*self) {
            Some(spec) => f.write_str(spec.label),
            None => write!(f, "field #{}", self.id()),
        }
    }
}

/// Static metadata about one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub field: FilterField,
    /// Machine name, used by the CLI and in configuration.
    pub name: &'static str,
    /// Human readable label for UI and error messages.
    pub label: &'static str,
    pub kind: ValueKind,
    /// Whether statements may target this field at all.
    pub filterable: bool,
    /// Set for person-role fields.
    pub role: Option<PersonRole>,
    /// Set for `Enum` fields.
    pub domain: Option<EnumDomain>,
    /// Where the value lives on a series row, e.g. `genres` or
    /// `people[writer]`. Empty for the placeholder.
    pub entity_path: &'static str,
}

impl FieldDescriptor {
    const fn new(
        field: FilterField,
        name: &'static str,
        label: &'static str,
        kind: ValueKind,
    ) -> Self {
        Self {
            field,
            name,
            label,
            kind,
            filterable: true,
            role: None,
            domain: None,
            entity_path: "",
        }
    }

    const fn person(field: FilterField, name: &'static str, label: &'static str, role: PersonRole) -> Self {
        let mut spec = Self::new(field, name, label, ValueKind::EntityCollection);
        spec.role = Some(role);
        spec
    }

    const fn enumeration(
        field: FilterField,
        name: &'static str,
        label: &'static str,
        domain: EnumDomain,
    ) -> Self {
        let mut spec = Self::new(field, name, label, ValueKind::Enum);
        spec.domain = Some(domain);
        spec
    }

    const fn at(mut self, entity_path: &'static str) -> Self {
        self.entity_path = entity_path;
        self
    }

    const fn placeholder(mut self) -> Self {
        self.filterable = false;
        self
    }
}

/// Registry of all fields.
///
/// This is the single source of truth for field metadata: adding a field
/// means adding a variant and a row here.
pub const FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new(FilterField::None, "none", "None", ValueKind::Text).placeholder(),
    // Text
    FieldDescriptor::new(FilterField::Summary, "summary", "Summary", ValueKind::Text).at("summary"),
    FieldDescriptor::new(FilterField::SeriesName, "seriesName", "Series Name", ValueKind::Text).at("name"),
    FieldDescriptor::new(FilterField::Path, "path", "Path", ValueKind::Text).at("folderPath"),
    FieldDescriptor::new(FilterField::FilePath, "filePath", "File Path", ValueKind::Text).at("filePaths"),
    // Enumerations
    FieldDescriptor::enumeration(
        FilterField::PublicationStatus,
        "publicationStatus",
        "Publication Status",
        EnumDomain::PublicationStatus,
    )
    .at("publicationStatus"),
    FieldDescriptor::enumeration(
        FilterField::AgeRating,
        "ageRating",
        "Age Rating",
        EnumDomain::AgeRating,
    )
    .at("ageRating"),
    FieldDescriptor::enumeration(
        FilterField::WantToRead,
        "wantToRead",
        "Want To Read",
        EnumDomain::Boolean,
    )
    .at("wantToRead"),
    // Numbers
    FieldDescriptor::new(FilterField::UserRating, "userRating", "User Rating", ValueKind::Number).at("userRating"),
    FieldDescriptor::new(FilterField::ReadProgress, "readProgress", "Read Progress", ValueKind::Number).at("readProgress"),
    FieldDescriptor::new(FilterField::ReleaseYear, "releaseYear", "Release Year", ValueKind::Number).at("releaseYear"),
    FieldDescriptor::new(FilterField::AverageRating, "averageRating", "Average Rating", ValueKind::Number).at("averageRating"),
    // Dates and durations
    FieldDescriptor::new(FilterField::ReadingDate, "readingDate", "Reading Date", ValueKind::Date).at("lastRead"),
    FieldDescriptor::new(FilterField::ReadTime, "readTime", "Read Time", ValueKind::Duration).at("avgHoursToRead"),
    // Collections
    FieldDescriptor::new(FilterField::Languages, "languages", "Languages", ValueKind::EntityCollection).at("language"),
    FieldDescriptor::new(FilterField::Tags, "tags", "Tags", ValueKind::EntityCollection).at("tags"),
    FieldDescriptor::new(
        FilterField::CollectionTags,
        "collectionTags",
        "Collection Tags",
        ValueKind::EntityCollection,
    )
    .at("collectionTags"),
    FieldDescriptor::new(FilterField::Genres, "genres", "Genres", ValueKind::EntityCollection).at("genres"),
    FieldDescriptor::new(FilterField::Libraries, "libraries", "Libraries", ValueKind::EntityCollection).at("library"),
    FieldDescriptor::new(FilterField::Formats, "formats", "Formats", ValueKind::EntityCollection).at("format"),
    // People by role
    FieldDescriptor::person(FilterField::Writers, "writers", "Writers", PersonRole::Writer).at("people[writer]"),
    FieldDescriptor::person(FilterField::Penciller, "penciller", "Penciller", PersonRole::Penciller).at("people[penciller]"),
    FieldDescriptor::person(FilterField::Inker, "inker", "Inker", PersonRole::Inker).at("people[inker]"),
    FieldDescriptor::person(FilterField::Colorist, "colorist", "Colorist", PersonRole::Colorist).at("people[colorist]"),
    FieldDescriptor::person(FilterField::Letterer, "letterer", "Letterer", PersonRole::Letterer).at("people[letterer]"),
    FieldDescriptor::person(FilterField::CoverArtist, "coverArtist", "Cover Artist", PersonRole::CoverArtist).at("people[coverArtist]"),
    FieldDescriptor::person(FilterField::Editor, "editor", "Editor", PersonRole::Editor).at("people[editor]"),
    FieldDescriptor::person(FilterField::Publisher, "publisher", "Publisher", PersonRole::Publisher).at("people[publisher]"),
    FieldDescriptor::person(FilterField::Characters, "characters", "Characters", PersonRole::Character).at("people[character]"),
    FieldDescriptor::person(FilterField::Translators, "translators", "Translators", PersonRole::Translator).at("people[translator]"),
    FieldDescriptor::person(FilterField::Imprint, "imprint", "Imprint", PersonRole::Imprint).at("people[imprint]"),
    FieldDescriptor::person(FilterField::Team, "team", "Team", PersonRole::Team).at("people[team]"),
    FieldDescriptor::person(FilterField::Location, "location", "Location", PersonRole::Location).at("people[location]"),
];

/// Look up a field's descriptor.
pub fn describe_field(field: FilterField) -> Option<&'static FieldDescriptor> {
    FIELDS.iter().find(|spec| spec.field == field)
}

/// Resolve a wire id. Unknown ids come from newer or older encodings.
pub fn field_from_id(id: i32) -> Option<FilterField> {
    FIELDS.iter().find(|spec| spec.field.id() == id).map(|spec| spec.field)
}

/// Look up a field by its machine name, ignoring case.
pub fn field_by_name(name: &str) -> Option<FilterField> {
    FIELDS
        .iter()
        .find(|spec| spec.name.eq_ignore_ascii_case(name))
        .map(|spec| spec.field)
}

/// The catalog field that holds people with the given role.
pub fn field_for_role(role: PersonRole) -> Option<FilterField> {
    FIELDS
        .iter()
        .find(|spec| spec.role == Some(role))
        .map(|spec| spec.field)
}

/// All fields a statement may target.
pub fn filterable_fields() -> impl Iterator<Item = &'static FieldDescriptor> {
    FIELDS.iter().filter(|spec| spec.filterable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_id_has_exactly_one_row() {
        let ids: HashSet<i32> = FIELDS.iter().map(|spec| spec.field.id()).collect();
        assert_eq!(ids.len(), FIELDS.len());
        for id in -1..=31 {
            assert!(field_from_id(id).is_some(), "missing row for id {}", id);
        }
    }

    #[test]
    fn unknown_id_returns_none() {
        assert!(field_from_id(32).is_none());
        assert!(field_from_id(-2).is_none());
        assert_eq!(FilterField::try_from(400), Err(UnknownFieldId(400)));
    }

    #[test]
    fn person_fields_are_collections_with_a_role() {
        let spec = describe_field(FilterField::Writers).unwrap();
        assert_eq!(spec.kind, ValueKind::EntityCollection);
        assert_eq!(spec.role, Some(PersonRole::Writer));
        assert_eq!(field_for_role(PersonRole::Colorist), Some(FilterField::Colorist));
    }

    #[test]
    fn every_role_maps_to_one_field() {
        let roles: Vec<_> = FIELDS.iter().filter_map(|spec| spec.role).collect();
        let unique: HashSet<_> = roles.iter().collect();
        assert_eq!(roles.len(), unique.len());
        assert_eq!(roles.len(), 13);
    }

    #[test]
    fn enum_fields_declare_a_domain() {
        for spec in FIELDS {
            assert_eq!(spec.kind == ValueKind::Enum, spec.domain.is_some(), "{}", spec.name);
        }
    }

    #[test]
    fn entity_paths_name_series_row_keys() {
        let row = serde_json::to_value(crate::entity::SeriesRecord::default()).unwrap();
        for spec in filterable_fields() {
            match spec.role {
                Some(role) => assert_eq!(spec.entity_path, format!("people[{}]", role)),
                None => assert!(
                    row.get(spec.entity_path).is_some(),
                    "{} points at missing key {:?}",
                    spec.name,
                    spec.entity_path
                ),
            }
        }
        assert_eq!(describe_field(FilterField::None).unwrap().entity_path, "");
    }

    #[test]
    fn placeholder_is_not_filterable() {
        assert!(!describe_field(FilterField::None).unwrap().filterable);
        assert!(filterable_fields().all(|spec| spec.field != FilterField::None));
    }

    #[test]
    fn field_by_name_ignores_case() {
        assert_eq!(field_by_name("seriesname"), Some(FilterField::SeriesName));
        assert_eq!(field_by_name("READINGDATE"), Some(FilterField::ReadingDate));
        assert_eq!(field_by_name("nope"), None);
    }

    #[test]
    fn serializes_as_wire_id() {
        assert_eq!(serde_json::to_string(&FilterField::Genres).unwrap(), "18");
        let field: FilterField = serde_json::from_str("27").unwrap();
        assert_eq!(field, FilterField::ReadingDate);
        assert!(serde_json::from_str::<FilterField>("99").is_err());
    }
}
