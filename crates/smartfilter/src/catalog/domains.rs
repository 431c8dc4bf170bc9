//! Enumeration domains and person roles.
//!
//! Enum fields compare by ordinal. A literal may name the variant
//! (case-insensitive) or give its ordinal directly, so `"Teen"` and `"8"`
//! both select the same age rating.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed value set behind an `Enum` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumDomain {
    PublicationStatus,
    AgeRating,
    Boolean,
}

const PUBLICATION_STATUS: &[(&str, u8)] = &[
    ("OnGoing", 0),
    ("Hiatus", 1),
    ("Completed", 2),
    ("Cancelled", 3),
    ("Ended", 4),
];

const AGE_RATING: &[(&str, u8)] = &[
    ("Unknown", 0),
    ("RatingPending", 1),
    ("EarlyChildhood", 2),
    ("Everyone", 3),
    ("G", 4),
    ("Everyone10Plus", 5),
    ("PG", 6),
    ("KidsToAdults", 7),
    ("Teen", 8),
    ("MaturePlus15", 9),
    ("Mature17Plus", 10),
    ("Mature", 11),
    ("R18Plus", 12),
    ("AdultsOnlyPlus18", 13),
    ("X18Plus", 14),
];

const BOOLEAN: &[(&str, u8)] = &[("False", 0), ("True", 1)];

impl EnumDomain {
    /// All `(name, ordinal)` pairs of this domain, in ordinal order.
    pub fn variants(self) -> &'static [(&'static str, u8)] {
        match self {
            EnumDomain::PublicationStatus => PUBLICATION_STATUS,
            EnumDomain::AgeRating => AGE_RATING,
            EnumDomain::Boolean => BOOLEAN,
        }
    }

    /// Resolve a literal to an ordinal of this domain.
    pub fn parse(self, literal: &str) -> Option<u8> {
        let literal = literal.trim();
        if let Ok(ordinal) = literal.parse::<u8>() {
            return self
                .variants()
                .iter()
                .find(|(_, o)| *o == ordinal)
                .map(|(_, o)| *o);
        }
        self.variants()
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(literal))
            .map(|(_, o)| *o)
    }

    pub fn name_of(self, ordinal: u8) -> Option<&'static str> {
        self.variants()
            .iter()
            .find(|(_, o)| *o == ordinal)
            .map(|(name, _)| *name)
    }
}

/// The role a person holds on a series. Each role maps to exactly one
/// person-role field in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PersonRole {
    Writer,
    Penciller,
    Inker,
    Colorist,
    Letterer,
    CoverArtist,
    Editor,
    Publisher,
    Character,
    Translator,
    Imprint,
    Team,
    Location,
}

impl fmt::Display for PersonRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PersonRole::Writer => "writer",
            PersonRole::Penciller => "penciller",
            PersonRole::Inker => "inker",
            PersonRole::Colorist => "colorist",
            PersonRole::Letterer => "letterer",
            PersonRole::CoverArtist => "coverArtist",
            PersonRole::Editor => "editor",
            PersonRole::Publisher => "publisher",
            PersonRole::Character => "character",
            PersonRole::Translator => "translator",
            PersonRole::Imprint => "imprint",
            PersonRole::Team => "team",
            PersonRole::Location => "location",
        };
        f.write_str(name)
    }
}
