//! Row-to-key functions fed to the grouped aggregations.
//!
//! Two genre keys exist on purpose and give different answers:
//! [`genre_ids`] explodes a row into one key per genre, while
//! [`joined_genre_key`] turns the whole list into a single compound key.

use crate::table::MovieRow;
use crate::types::MonthPeriod;

/// Every genre of the row; a three-genre movie counts toward three groups.
pub fn genre_ids(row: &MovieRow) -> Vec<u32> {
    row.record.genre_ids.clone()
}

/// The genre list as one key, e.g. `[28, 12]` becomes `"28, 12"`.
/// Rows without genres share the empty key.
pub fn joined_genre_key(row: &MovieRow) -> String {
    row.record
        .genre_ids
        .iter()
        .map(|g| g.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn release_month(row: &MovieRow) -> MonthPeriod { row.period() }

/// English name of a TMDB movie genre id.
pub fn genre_name(id: u32) -> Option<&'static str> {
    let name = match id {
        28 => "Action",
        12 => "Adventure",
        16 => "Animation",
        35 => "Comedy",
        80 => "Crime",
        99 => "Documentary",
        18 => "Drama",
        10751 => "Family",
        14 => "Fantasy",
        36 => "History",
        27 => "Horror",
        10402 => "Music",
        9648 => "Mystery",
        10749 => "Romance",
        878 => "Science Fiction",
        10770 => "TV Movie",
        53 => "Thriller",
        10752 => "War",
        37 => "Western",
        _ => return None,
    };
    Some(name)
}
