use crate::api::{
    endpoints, AdminStats, ApiError, InFlight, LoginRequest, LoginResponse, MovieDetail,
    MovieSummary,
};
use tracing::warn;

pub const RECOMMEND_COUNT: u32 = 12;
pub const TRENDING_LIMIT: u32 = 20;
pub const GENRE_COUNT: u32 = 20;
pub const SIMILAR_COUNT: u32 = 15;

/// A request sequence run under one gateway claim.
#[derive(Debug, Clone)]
pub enum Load {
    Recommend(i64),
    Trending,
    /// Lower-cased genre name as the backend expects it.
    Genre(String),
    Search(String),
    History(i64),
    /// Detail, then similar movies.
    Movie(i64),
    Admin(String),
    Login(LoginRequest),
}

#[derive(Debug)]
pub enum Loaded {
    Movies(Vec<MovieSummary>),
    Movie {
        detail: MovieDetail,
        /// `None` when the similar-movies call failed.
        similar: Option<Vec<MovieSummary>>,
    },
    Admin(AdminStats),
    Login(LoginResponse),
}

impl Load {
    pub async fn execute(self, flight: &InFlight) -> Result<Loaded, ApiError> {
        match self {
            Load::Recommend(user_id) => flight
                .get_movies(&endpoints::recommend(user_id, RECOMMEND_COUNT))
                .await
                .map(Loaded::Movies),
            Load::Trending => flight
                .get_movies(&endpoints::trending(TRENDING_LIMIT))
                .await
                .map(Loaded::Movies),
            Load::Genre(genre) => flight
                .get_movies(&endpoints::genre(&genre, GENRE_COUNT))
                .await
                .map(Loaded::Movies),
            Load::Search(query) => flight
                .get_movies(&endpoints::search(&query))
                .await
                .map(Loaded::Movies),
            Load::History(user_id) => flight
                .get_movies(&endpoints::history(user_id))
                .await
                .map(Loaded::Movies),
            Load::Movie(id) => {
                let detail = flight.get_json(&endpoints::movie(id)).await?;
                let similar = match flight
                    .get_movies(&endpoints::similar(id, SIMILAR_COUNT))
                    .await
                {
                    Ok(similar) => Some(similar),
                    Err(e) => {
                        warn!(movie_id = id, error = %e, "similar movies unavailable");
                        None
                    }
                };
                Ok(Loaded::Movie { detail, similar })
            }
            Load::Admin(username) => flight
                .get_json(&endpoints::admin_stats(&username))
                .await
                .map(Loaded::Admin),
            Load::Login(request) => flight
                .post_json(endpoints::LOGIN_PATH, &request)
                .await
                .map(Loaded::Login),
        }
    }
}
