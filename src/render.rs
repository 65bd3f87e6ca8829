//! Pure mapping from backend records to display records.
//!
//! Nothing here touches the terminal. The `ui` module draws what these
//! functions return, so every fallback rule is testable without a frame.

use crate::api::{AdminStats, MovieDetail, MovieSummary, UserMetric};
use chrono::{DateTime, NaiveDateTime};

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const MISSING_YEAR: &str = "—";
pub const MISSING_RATING: &str = "N/A";
pub const MISSING_STAT: &str = "—";
pub const CARD_PLACEHOLDER: &str = "https://via.placeholder.com/300x450?text=No+Image";
pub const DETAIL_PLACEHOLDER: &str = "https://via.placeholder.com/220x330?text=No+Image";

/// Per-endpoint annotation appended under a card.
pub type Annotate = fn(&MovieSummary) -> String;

#[derive(Debug, Clone, PartialEq)]
pub struct MovieCard {
    /// `None` when the record carries no usable id; such cards cannot be opened.
    pub id: Option<i64>,
    pub title: String,
    pub year: String,
    pub rating: String,
    pub poster: String,
    pub extra: Option<String>,
}

impl MovieCard {
    pub fn meta(&self) -> String {
        format!("{} · ⭐ {}", self.year, self.rating)
    }
}

pub fn render_movies(movies: &[MovieSummary], extra: Option<Annotate>) -> Vec<MovieCard> {
    movies
        .iter()
        .map(|m| MovieCard {
            id: m.key(),
            title: m.title.clone().unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            year: release_year(m.release_date.as_deref().or(m.year.as_deref())),
            rating: m
                .rating_tmdb
                .or(m.vote_average)
                .map(format_rating)
                .unwrap_or_else(|| MISSING_RATING.to_string()),
            poster: m
                .poster
                .clone()
                .or_else(|| m.poster_path.clone())
                .unwrap_or_else(|| CARD_PLACEHOLDER.to_string()),
            extra: extra.map(|f| f(m)),
        })
        .collect()
}

/// Predicted score on personalised recommendations.
pub fn taste_match(m: &MovieSummary) -> String {
    match m.predicted_rating {
        Some(score) => format!("Taste Match: {:.2}", score),
        None => format!("Taste Match: {}", MISSING_RATING),
    }
}

/// The user's own rating on watch history entries.
pub fn user_rating(m: &MovieSummary) -> String {
    let rating = m
        .rating
        .map(format_rating)
        .unwrap_or_else(|| MISSING_RATING.to_string());
    format!("Your Rating: {}", rating)
}

/// Leading four characters of a date-ish string, when they are a year.
pub fn release_year(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .and_then(|s| s.get(..4))
        .filter(|y| y.bytes().all(|b| b.is_ascii_digit()))
        .map(str::to_string)
        .unwrap_or_else(|| MISSING_YEAR.to_string())
}

/// At most two decimals, trailing zeros dropped: 7.0 → "7", 7.25 → "7.25".
pub fn format_rating(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailCard {
    pub title: String,
    pub poster: String,
    pub release: String,
    pub rating: String,
    pub genres: String,
    pub cast: String,
    pub overview: String,
}

pub fn detail_card(movie: &MovieDetail) -> DetailCard {
    let or_na = |v: &Option<String>| v.clone().unwrap_or_else(|| MISSING_RATING.to_string());
    DetailCard {
        title: movie.title.clone().unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        poster: movie
            .poster
            .clone()
            .unwrap_or_else(|| DETAIL_PLACEHOLDER.to_string()),
        release: movie
            .release_date
            .clone()
            .unwrap_or_else(|| "Unknown".to_string()),
        rating: movie
            .rating_tmdb
            .or(movie.vote_average)
            .map(format_rating)
            .unwrap_or_else(|| MISSING_RATING.to_string()),
        genres: or_na(&movie.genres),
        cast: or_na(&movie.cast),
        overview: or_na(&movie.overview),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatTile {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserRow {
    pub user_id: String,
    pub ratings_count: String,
    pub avg_rating: String,
    pub last_activity: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdminPanel {
    pub tiles: [StatTile; 4],
    pub rows: Vec<UserRow>,
}

impl AdminPanel {
    /// Tiles with every value missing, shown before or without metrics.
    pub fn placeholder() -> Self {
        admin_panel(&AdminStats::default())
    }
}

pub fn admin_panel(stats: &AdminStats) -> AdminPanel {
    let stat = |v: &Option<String>| v.clone().unwrap_or_else(|| MISSING_STAT.to_string());
    AdminPanel {
        tiles: [
            StatTile {
                label: "Total Users",
                value: stat(&stats.total_users),
            },
            StatTile {
                label: "Total Movies",
                value: stat(&stats.total_movies),
            },
            StatTile {
                label: "Total Ratings",
                value: stat(&stats.total_ratings),
            },
            StatTile {
                label: "Recent Activity",
                value: stat(&stats.recent_ratings),
            },
        ],
        rows: stats.user_metrics.iter().map(user_row).collect(),
    }
}

fn user_row(metric: &UserMetric) -> UserRow {
    UserRow {
        user_id: metric
            .user_id
            .clone()
            .unwrap_or_else(|| MISSING_STAT.to_string()),
        ratings_count: metric
            .ratings_count
            .clone()
            .unwrap_or_else(|| MISSING_STAT.to_string()),
        avg_rating: metric
            .avg_rating
            .map(|r| format!("{:.2}", r))
            .unwrap_or_else(|| MISSING_STAT.to_string()),
        last_activity: metric
            .last_activity
            .as_deref()
            .map(format_activity)
            .unwrap_or_else(|| MISSING_STAT.to_string()),
    }
}

/// Normalise a timestamp to `YYYY-MM-DD HH:MM`. Unrecognised input is shown
/// as-is.
pub fn format_activity(raw: &str) -> String {
    const OUT: &str = "%Y-%m-%d %H:%M";
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.format(OUT).to_string();
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return dt.format(OUT).to_string();
        }
    }
    if let Some(dt) = s
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
    {
        return dt.format(OUT).to_string();
    }
    raw.to_string()
}
