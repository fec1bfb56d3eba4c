//! Whisky entry notes and their fixed field grammar.
//!
//! An entry note looks like this:
//!
//! ```text
//! # Glen Scotia 15
//! - [ ] Kühlgefiltert
//! - [x] Gefärbt
//! - Typ: Single Malt
//! - Region: Campbeltown
//! - Destillerie: [[Glen Scotia]]
//! - Alter: 15 Jahre
//! - Stärke: 46% vol.
//! - Reifung: Bourbon, Oloroso
//! ```
//!
//! Lines must appear in exactly this order. Blank lines between them are
//! skipped and anything after the cask line is ignored.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A single line of the entry grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// `# <name>`
    Name,
    /// `- [<c>] Kühlgefiltert`
    ChillFiltered,
    /// `- [<c>] Gefärbt`
    Coloured,
    /// `- Typ: <value>`
    Kind,
    /// `- Region: <value>`
    Region,
    /// `- Destillerie: <value>`
    Distillery,
    /// `- Alter: <value>`
    Age,
    /// `- Stärke: <value>% ...`
    Strength,
    /// `- Reifung: <value>`
    Casks,
}

impl Field {
    /// All fields in the order they must appear.
    pub const ORDER: [Self; 9] = [
        Self::Name,
        Self::ChillFiltered,
        Self::Coloured,
        Self::Kind,
        Self::Region,
        Self::Distillery,
        Self::Age,
        Self::Strength,
        Self::Casks,
    ];

    /// Human readable name used in diagnostics.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Name => "heading",
            Self::ChillFiltered => "chill filtering checkbox",
            Self::Coloured => "colouring checkbox",
            Self::Kind => "type",
            Self::Region => "region",
            Self::Distillery => "distillery",
            Self::Age => "age",
            Self::Strength => "strength",
            Self::Casks => "casks",
        }
    }

    fn pattern(self) -> &'static Regex {
        &LINE_PATTERNS[self as usize]
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

// Indexed by `Field as usize`; capture group 1 holds the raw value.
static LINE_PATTERNS: Lazy<[Regex; 9]> = Lazy::new(|| {
    [
        r"^# (.*?)\s*$",
        r"^- \[(.)\] Kühlgefiltert\s*$",
        r"^- \[(.)\] Gefärbt\s*$",
        r"^- Typ: (.*?)\s*$",
        r"^- Region: (.*?)\s*$",
        r"^- Destillerie: (.*?)\s*$",
        r"^- Alter: (.*?)\s*$",
        r"^- Stärke: ([^%]*)%.*$",
        r"^- Reifung: (.*?)\s*$",
    ]
    .map(|p| Regex::new(p).expect("entry line patterns are valid"))
});

/// Reason a note could not be turned into a [`WhiskyEntry`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    /// The note ended before this field was found.
    #[error("missing {field} line")]
    Missing {
        /// The field that was expected next
        field: Field,
    },

    /// A line was found where this field was expected, but it did not match.
    #[error("expected {field} line at line {line}")]
    Unexpected {
        /// The field that was expected
        field: Field,
        /// 1-based line number of the offending line
        line: usize,
    },

    /// The note file exists but could not be read as UTF-8 text.
    #[error("cannot read note: {message}")]
    Unreadable {
        /// Underlying IO error
        message: String,
    },
}

/// Structured data extracted from one whisky note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WhiskyEntry {
    /// Name taken from the heading
    pub name: String,
    /// Whether the whisky is chill filtered
    pub chill_filtered: bool,
    /// Whether colouring was added
    pub coloured: bool,
    /// Single Malt, Grain, Blend, ...
    pub kind: String,
    /// Region of origin
    pub region: String,
    /// Distillery name without wiki-link brackets
    pub distillery: String,
    /// Age statement
    pub age: String,
    /// Alcohol by volume, period-decimal (`"40.5"`)
    pub abv: String,
    /// Cask information
    pub casks: String,
}

impl WhiskyEntry {
    /// Parses the full text of a note.
    ///
    /// # Errors
    ///
    /// Returns an [`EntryError`] naming the first field that is absent or
    /// does not match. No partially filled entry is ever produced.
    pub fn parse(text: &str) -> Result<Self, EntryError> {
        let mut values: Vec<&str> = Vec::with_capacity(Field::ORDER.len());

        for (index, line) in text.lines().enumerate() {
            let Some(&field) = Field::ORDER.get(values.len()) else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            let captures = field
                .pattern()
                .captures(line)
                .ok_or(EntryError::Unexpected {
                    field,
                    line: index + 1,
                })?;
            values.push(captures.get(1).map_or("", |m| m.as_str()));
        }

        if let Some(&field) = Field::ORDER.get(values.len()) {
            return Err(EntryError::Missing { field });
        }

        Ok(Self {
            name: values[0].to_string(),
            chill_filtered: is_checked(values[1]),
            coloured: is_checked(values[2]),
            kind: values[3].to_string(),
            region: values[4].to_string(),
            distillery: values[5]
                .trim_matches(|c| c == '[' || c == ']')
                .to_string(),
            age: values[6].to_string(),
            abv: normalize_abv(values[7]),
            casks: values[8].to_string(),
        })
    }
}

impl FromStr for WhiskyEntry {
    type Err = EntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn is_checked(marker: &str) -> bool {
    !marker.trim().is_empty()
}

fn normalize_abv(raw: &str) -> String {
    raw.trim().replace(',', ".")
}
