use crate::render::{AdminPanel, Annotate, DetailCard, MovieCard};

/// Input mode for the search bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// What occupies the view area. Exactly one screen is live at a time, and
/// entering a screen builds a fresh value, so nothing leaks between them.
#[derive(Debug, Clone)]
pub enum View {
    Login(LoginForm),
    Home(Grid),
    Trending(Grid),
    Genres(GenreView),
    Search { query: String, grid: Grid },
    History(Grid),
    MovieDetail(DetailView),
    Admin(AdminView),
}

impl View {
    /// Section heading; the detail and login screens have none.
    pub fn title(&self) -> Option<String> {
        match self {
            View::Login(_) | View::MovieDetail(_) => None,
            View::Home(_) => Some("Handpicked For You".to_string()),
            View::Trending(_) => Some("Trending Now".to_string()),
            View::Genres(GenreView::Picker { .. }) => Some("Pick a Genre".to_string()),
            View::Genres(GenreView::Results { genre, .. }) => Some(format!("Genre: {}", genre)),
            View::Search { query, .. } => Some(format!("Search: \"{}\"", query)),
            View::History(_) => Some("Your Watch History".to_string()),
            View::Admin(_) => Some("Admin Dashboard".to_string()),
        }
    }

    /// The movie grid, on screens that show one.
    pub fn grid(&self) -> Option<&Grid> {
        match self {
            View::Home(grid)
            | View::Trending(grid)
            | View::History(grid)
            | View::Search { grid, .. }
            | View::Genres(GenreView::Results { grid, .. }) => Some(grid),
            _ => None,
        }
    }

    pub fn grid_mut(&mut self) -> Option<&mut Grid> {
        match self {
            View::Home(grid)
            | View::Trending(grid)
            | View::History(grid)
            | View::Search { grid, .. }
            | View::Genres(GenreView::Results { grid, .. }) => Some(grid),
            _ => None,
        }
    }

    pub fn is_login(&self) -> bool {
        matches!(self, View::Login(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Skeleton placeholders while the request is out.
    Loading(usize),
    Cards(Vec<MovieCard>),
    /// The request succeeded with nothing to show.
    Empty(&'static str),
    Error(String),
}

#[derive(Debug, Clone)]
pub struct Grid {
    pub body: Body,
    pub selected: usize,
    pub annotate: Option<Annotate>,
    pub empty_message: &'static str,
}

impl Grid {
    pub fn loading(skeletons: usize, annotate: Option<Annotate>, empty_message: &'static str) -> Self {
        Self {
            body: Body::Loading(skeletons),
            selected: 0,
            annotate,
            empty_message,
        }
    }

    pub fn cards(&self) -> &[MovieCard] {
        match &self.body {
            Body::Cards(cards) => cards,
            _ => &[],
        }
    }

    pub fn selected_card(&self) -> Option<&MovieCard> {
        self.cards().get(self.selected)
    }
}

#[derive(Debug, Clone)]
pub enum GenreView {
    Picker { selected: usize },
    Results { genre: String, grid: Grid },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailBody {
    Loading,
    Ready {
        card: DetailCard,
        /// Empty when the similar-movies call failed or found nothing.
        similar: Vec<MovieCard>,
        selected: usize,
    },
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub movie_id: i64,
    pub body: DetailBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminStatus {
    Loading,
    Ready,
    /// No username in the session, so nothing was requested.
    NoUsername,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdminView {
    pub panel: AdminPanel,
    pub status: AdminStatus,
    pub selected: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Username,
    Password,
}

impl LoginField {
    pub fn toggle(self) -> Self {
        match self {
            Self::Username => Self::Password,
            Self::Password => Self::Username,
        }
    }
}

#[derive(Clone, Default, PartialEq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub focus: LoginField,
    pub error: Option<String>,
    pub submitting: bool,
}

impl LoginForm {
    pub fn field_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("focus", &self.focus)
            .field("error", &self.error)
            .field("submitting", &self.submitting)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_titles() {
        let grid = Grid::loading(2, None, "No results.");
        assert_eq!(View::Home(grid.clone()).title().as_deref(), Some("Handpicked For You"));
        assert_eq!(
            View::Genres(GenreView::Picker { selected: 0 }).title().as_deref(),
            Some("Pick a Genre")
        );
        assert_eq!(
            View::Genres(GenreView::Results { genre: "Action".to_string(), grid: grid.clone() })
                .title()
                .as_deref(),
            Some("Genre: Action")
        );
        assert_eq!(
            View::Search { query: "heat".to_string(), grid }.title().as_deref(),
            Some("Search: \"heat\"")
        );
        assert_eq!(View::Login(LoginForm::default()).title(), None);
    }

    #[test]
    fn test_login_form_debug_hides_password() {
        let form = LoginForm {
            username: "abdullah".to_string(),
            password: "hunter2".to_string(),
            ..LoginForm::default()
        };
        assert!(!format!("{:?}", form).contains("hunter2"));
    }

    #[test]
    fn test_field_focus() {
        let mut form = LoginForm::default();
        form.field_mut().push('a');
        form.focus = form.focus.toggle();
        form.field_mut().push('b');
        assert_eq!(form.username, "a");
        assert_eq!(form.password, "b");
    }
}
