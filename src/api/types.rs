use super::lenient;
use super::ApiError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A movie as returned by the list endpoints. Endpoints disagree on field
/// names, so every known spelling is captured and the renderer picks.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct MovieSummary {
    #[serde(default, deserialize_with = "lenient::id")]
    pub movie_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub poster: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub poster_path: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub release_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub rating_tmdb: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub vote_average: Option<f64>,
    /// Present on `/recommend` results.
    #[serde(default, deserialize_with = "lenient::number")]
    pub predicted_rating: Option<f64>,
    /// The user's own rating, present on `/user/history` results.
    #[serde(default, deserialize_with = "lenient::number")]
    pub rating: Option<f64>,
}

impl MovieSummary {
    /// `movie_id` wins over `id` when both are present.
    pub fn key(&self) -> Option<i64> {
        self.movie_id.or(self.id)
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct MovieDetail {
    #[serde(default, deserialize_with = "lenient::id")]
    pub movie_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub poster: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub release_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub rating_tmdb: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub vote_average: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub genres: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub cast: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub overview: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct UserMetric {
    #[serde(default, deserialize_with = "lenient::text")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub ratings_count: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub avg_rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub last_activity: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AdminStats {
    #[serde(default, deserialize_with = "lenient::text")]
    pub total_users: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub total_movies: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub total_ratings: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub recent_ratings: Option<String>,
    #[serde(default, deserialize_with = "lenient::records")]
    pub user_metrics: Vec<UserMetric>,
}

#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoginResponse {
    #[serde(default, deserialize_with = "lenient::text")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient::id")]
    pub user_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub username: Option<String>,
}

/// Decode a list endpoint body. The body must be an array; entries that are
/// not objects are skipped rather than failing the whole list.
pub fn decode_movie_list(value: Value) -> Result<Vec<MovieSummary>, ApiError> {
    match value {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()),
        other => Err(ApiError::Decode(serde::de::Error::custom(format!(
            "expected a list of movies, got {}",
            kind(&other)
        )))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_heterogeneous_list() {
        let movies = decode_movie_list(json!([
            { "movie_id": 1, "id": 99, "title": "Toy Story", "poster": "a.jpg", "poster_path": "b.jpg" },
            { "id": "2", "title": 1995, "release_date": "1995-10-30", "vote_average": "7.9" },
            { "title": null, "rating_tmdb": "high" },
            "garbage",
            null
        ]))
        .unwrap();

        assert_eq!(movies.len(), 3);
        assert_eq!(movies[0].key(), Some(1));
        assert_eq!(movies[1].key(), Some(2));
        assert_eq!(movies[1].title.as_deref(), Some("1995"));
        assert_eq!(movies[1].vote_average, Some(7.9));
        assert_eq!(movies[2], MovieSummary::default());
    }

    #[test]
    fn test_non_list_body_is_rejected() {
        let err = decode_movie_list(json!({ "detail": "Not Found" })).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        assert!(err.to_string().contains("an object"));
    }

    #[test]
    fn test_detail_joins_lists() {
        let detail: MovieDetail = serde_json::from_value(json!({
            "movie_id": 42,
            "title": "Heat",
            "genres": ["Action", "Crime"],
            "cast": "Al Pacino, Robert De Niro"
        }))
        .unwrap();
        assert_eq!(detail.genres.as_deref(), Some("Action, Crime"));
        assert_eq!(detail.cast.as_deref(), Some("Al Pacino, Robert De Niro"));
        assert!(detail.overview.is_none());
    }

    #[test]
    fn test_admin_stats_tolerates_partial_body() {
        // The shipped backend only reports these three fields.
        let stats: AdminStats = serde_json::from_value(json!({
            "total_users": 2,
            "total_movies": 1200,
            "models_status": "active"
        }))
        .unwrap();
        assert_eq!(stats.total_users.as_deref(), Some("2"));
        assert!(stats.total_ratings.is_none());
        assert!(stats.user_metrics.is_empty());
    }

    #[test]
    fn test_admin_user_metrics() {
        let stats: AdminStats = serde_json::from_value(json!({
            "user_metrics": [
                { "user_id": 1, "ratings_count": 20, "avg_rating": 3.456, "last_activity": "2024-05-01T10:00:00Z" },
                { "user_id": 3 },
                7
            ]
        }))
        .unwrap();
        assert_eq!(stats.user_metrics.len(), 2);
        assert_eq!(stats.user_metrics[0].avg_rating, Some(3.456));
        assert_eq!(stats.user_metrics[1].ratings_count, None);
    }

    #[test]
    fn test_login_request_debug_hides_password() {
        let req = LoginRequest {
            username: "admin".to_string(),
            password: "admin".to_string(),
        };
        let shown = format!("{:?}", req);
        assert!(shown.contains("<redacted>"));
        assert!(!shown.contains("\"admin\", password: \"admin\""));
    }
}
