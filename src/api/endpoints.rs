//! Request builders for every endpoint the client consumes.

/// A GET request: a path plus scalar query parameters, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub path: String,
    pub query: Vec<(&'static str, String)>,
}

impl Request {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn param(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    /// `path?k=v&...` with percent-encoded values. Used for logging and for
    /// matching requests in tests.
    pub fn target(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let pairs: Vec<String> = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect();
        format!("{}?{}", self.path, pairs.join("&"))
    }
}

pub const LOGIN_PATH: &str = "/login";

pub fn trending(limit: u32) -> Request {
    Request::new("/trending").param("limit", limit)
}

pub fn genre(genre: &str, n: u32) -> Request {
    Request::new("/recommend/genre")
        .param("genre", genre)
        .param("n", n)
}

pub fn recommend(user_id: i64, n: u32) -> Request {
    Request::new("/recommend")
        .param("user_id", user_id)
        .param("n", n)
}

pub fn history(user_id: i64) -> Request {
    Request::new("/user/history").param("user_id", user_id)
}

pub fn search(query: &str) -> Request {
    Request::new("/search").param("query", query)
}

pub fn movie(id: i64) -> Request {
    Request::new(format!("/movie/{}", id))
}

pub fn similar(movie_id: i64, n: u32) -> Request {
    Request::new("/similar")
        .param("movie_id", movie_id)
        .param("n", n)
}

pub fn admin_stats(username: &str) -> Request {
    Request::new("/admin/stats").param("username", username)
}
