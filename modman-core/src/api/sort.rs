//! Search result sort keys and their spellings.

use std::fmt;
use std::str::FromStr;

/// How the catalog orders search results.
///
/// The discriminants are the numeric sort values the addon API expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum SortType {
    #[default]
    Featured = 0,
    Popularity = 1,
    LastUpdate = 2,
    Name = 3,
    Author = 4,
    TotalDownloads = 5,
}

impl SortType {
    fn canonical(self) -> &'static str {
        match self {
            SortType::Featured => "featured",
            SortType::Popularity => "popularity",
            SortType::LastUpdate => "lastupdate",
            SortType::Name => "name",
            SortType::Author => "author",
            SortType::TotalDownloads => "totaldownloads",
        }
    }
}

impl fmt::Display for SortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical())
    }
}

impl FromStr for SortType {
    type Err = String;

    /// Accepts the numeric value or several case-insensitive alias
    /// spellings per key; non-alphanumeric characters are stripped before
    /// matching, so `last-update` and `Last_Update` both parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "0" | "f" | "feat" | "featured" => Ok(SortType::Featured),
            "1" | "p" | "pop" | "popularity" => Ok(SortType::Popularity),
            "2" | "l" | "last" | "u" | "up" | "update" | "lastupdate" => Ok(SortType::LastUpdate),
            "3" | "n" | "name" => Ok(SortType::Name),
            "4" | "a" | "auth" | "author" => Ok(SortType::Author),
            "5" | "t" | "total" | "d" | "down" | "downloads" | "totaldownloads" => {
                Ok(SortType::TotalDownloads)
            }
            _ => Err(format!("{s} is not a valid sort type")),
        }
    }
}
