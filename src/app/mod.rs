mod load;
mod view;

pub use load::{Load, Loaded};
pub use view::{
    AdminStatus, AdminView, Body, DetailBody, DetailView, GenreView, Grid, InputMode, LoginField,
    LoginForm, View,
};

use crate::api::{ApiError, Gateway, InFlight, LoginRequest, LoginResponse, Transport};
use crate::render::{self, AdminPanel};
use crate::session::{
    configure_navbar_for_role, Landing, Nav, Role, Session, SessionManager, SessionStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

pub const GENRES: [&str; 6] = ["Action", "Comedy", "Drama", "Romance", "Thriller", "Animation"];

pub const LOAD_ERROR: &str = "Something went wrong loading data.";
pub const LOGIN_MISSING_FIELDS: &str = "Please enter username and password.";
pub const LOGIN_REJECTED: &str = "Invalid username or password.";
pub const LOGIN_UNREACHABLE: &str = "Could not reach the server.";

const NO_MOVIES: &str = "No movies found.";
const NO_HISTORY: &str = "No history found.";
const NO_RESULTS: &str = "No results.";

/// Width of one card column in the grid, border included.
pub const CARD_WIDTH: u16 = 28;

/// Where the user asked to go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Trending,
    Genres,
    Genre(String),
    History,
    Search(String),
    Movie(i64),
    Back,
    Admin,
    Login,
}

#[derive(Debug)]
pub enum AppEvent {
    Loaded {
        generation: u64,
        result: Result<Loaded, ApiError>,
    },
}

/// Everything needed to build an `App` again after a reload.
#[derive(Clone)]
pub struct AppContext {
    pub transport: Arc<dyn Transport>,
    pub session_path: PathBuf,
    pub skeleton_cards: usize,
}

/// Main application state.
pub struct App {
    gateway: Gateway,
    session: SessionManager,
    session_rx: watch::Receiver<Session>,
    generation: u64,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
    skeleton_cards: usize,

    pub view: View,
    pub should_quit: bool,
    /// Set by logout. The main loop drops this `App` and boots a new one.
    pub reload: bool,
    pub show_help: bool,
    pub input_mode: InputMode,
    pub search_input: String,
    pub columns: usize,
    pub status_msg: String,
}

impl App {
    pub fn new(gateway: Gateway, session: SessionManager, skeleton_cards: usize) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let session_rx = session.subscribe();
        Self {
            gateway,
            session,
            session_rx,
            generation: 0,
            events_tx,
            events_rx,
            skeleton_cards,

            view: View::Login(LoginForm::default()),
            should_quit: false,
            reload: false,
            show_help: false,
            input_mode: InputMode::Normal,
            search_input: String::new(),
            columns: 1,
            status_msg: String::new(),
        }
    }

    /// Fresh gateway, session read from disk, initial view routed by role.
    pub fn boot(ctx: &AppContext) -> Self {
        let session = SessionManager::open(SessionStore::new(&ctx.session_path));
        let mut app = Self::new(
            Gateway::new(Arc::clone(&ctx.transport)),
            session,
            ctx.skeleton_cards,
        );
        app.bootstrap();
        app
    }

    /// Route purely from the persisted session; nothing is verified remotely.
    pub fn bootstrap(&mut self) {
        let session = self.session.current();
        match session.landing() {
            Landing::Admin => {
                self.enter_admin();
            }
            Landing::Home => {
                self.navigate(Route::Home);
            }
            Landing::Login => {
                if let Err(e) = self.session.clear() {
                    warn!(error = %e, "could not clear partial session");
                }
                self.navigate(Route::Login);
            }
        }
        info!(role = ?session.role, "bootstrapped");
    }

    pub fn session(&self) -> Session {
        self.session_rx.borrow().clone()
    }

    pub fn role(&self) -> Option<Role> {
        self.session_rx.borrow().role
    }

    pub fn nav(&self) -> Nav {
        configure_navbar_for_role(self.role())
    }

    pub fn is_busy(&self) -> bool {
        self.gateway.is_busy()
    }

    /// The single view transition. Returns `false` when the route was
    /// ignored, in which case nothing on screen changed.
    pub fn navigate(&mut self, route: Route) -> bool {
        if !self.allows(&route) {
            debug!(?route, role = ?self.role(), "route not available");
            return false;
        }

        let user_id = self.session_rx.borrow().user_id;
        match route {
            Route::Login => {
                self.enter(View::Login(LoginForm::default()));
                true
            }
            Route::Genres => {
                self.enter(View::Genres(GenreView::Picker { selected: 0 }));
                true
            }
            Route::Back | Route::Home => match user_id {
                Some(id) => self.start(
                    Load::Recommend(id),
                    View::Home(self.loading_grid(Some(render::taste_match), NO_MOVIES)),
                ),
                None => false,
            },
            Route::Trending => {
                self.start(Load::Trending, View::Trending(self.loading_grid(None, NO_MOVIES)))
            }
            Route::Genre(genre) => {
                let load = Load::Genre(genre.to_lowercase());
                let grid = self.loading_grid(None, NO_MOVIES);
                self.start(load, View::Genres(GenreView::Results { genre, grid }))
            }
            Route::History => match user_id {
                Some(id) => self.start(
                    Load::History(id),
                    View::History(self.loading_grid(Some(render::user_rating), NO_HISTORY)),
                ),
                None => false,
            },
            Route::Search(query) => {
                let query = query.trim().to_string();
                if query.is_empty() {
                    return false;
                }
                let grid = self.loading_grid(None, NO_RESULTS);
                self.start(Load::Search(query.clone()), View::Search { query, grid })
            }
            Route::Movie(id) => self.start(
                Load::Movie(id),
                View::MovieDetail(DetailView {
                    movie_id: id,
                    body: DetailBody::Loading,
                }),
            ),
            Route::Admin => self.enter_admin(),
        }
    }

    fn allows(&self, route: &Route) -> bool {
        let nav = self.nav();
        match route {
            Route::Login => true,
            Route::Home | Route::Back | Route::Movie(_) => nav.home,
            Route::Trending => nav.trending,
            Route::Genres | Route::Genre(_) => nav.genres,
            Route::History => nav.history,
            Route::Search(_) => nav.search,
            Route::Admin => self.role() == Some(Role::Admin),
        }
    }

    fn loading_grid(&self, annotate: Option<render::Annotate>, empty: &'static str) -> Grid {
        Grid::loading(self.skeleton_cards, annotate, empty)
    }

    /// Admin metrics load once per entry. Without a username the panel shows
    /// placeholders and nothing is requested.
    fn enter_admin(&mut self) -> bool {
        let username = self.session_rx.borrow().username.clone();
        let mut view = AdminView {
            panel: AdminPanel::placeholder(),
            status: AdminStatus::NoUsername,
            selected: 0,
        };
        match username {
            Some(name) => {
                view.status = AdminStatus::Loading;
                self.start(Load::Admin(name), View::Admin(view))
            }
            None => {
                warn!("admin session has no username, metrics not loaded");
                self.enter(View::Admin(view));
                true
            }
        }
    }

    fn enter(&mut self, view: View) -> u64 {
        self.generation += 1;
        self.view = view;
        self.input_mode = InputMode::Normal;
        self.status_msg.clear();
        self.generation
    }

    /// Claim the gateway, then switch view and send the request. A busy
    /// gateway leaves everything as it was.
    fn start(&mut self, load: Load, view: View) -> bool {
        let Some(flight) = self.gateway.try_begin() else {
            debug!(?load, "request already in flight, ignoring");
            return false;
        };
        let generation = self.enter(view);
        self.dispatch(flight, load, generation);
        true
    }

    fn dispatch(&self, flight: InFlight, load: Load, generation: u64) {
        debug!(generation, ?load, "request started");
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = load.execute(&flight).await;
            drop(flight);
            // The receiver is gone once the App has been replaced.
            let _ = tx.send(AppEvent::Loaded { generation, result });
        });
    }

    /// Apply every response that has arrived so far.
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }
    }

    #[cfg(test)]
    pub async fn next_event(&mut self) {
        if let Some(event) = self.events_rx.recv().await {
            self.handle_event(event);
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        let AppEvent::Loaded { generation, result } = event;
        if generation != self.generation {
            debug!(generation, current = self.generation, "dropping stale response");
            return;
        }

        if self.view.is_login() {
            self.finish_login(result);
            return;
        }

        match (&mut self.view, result) {
            (View::MovieDetail(detail), Ok(Loaded::Movie { detail: movie, similar })) => {
                detail.body = DetailBody::Ready {
                    card: render::detail_card(&movie),
                    similar: render::render_movies(&similar.unwrap_or_default(), None),
                    selected: 0,
                };
            }
            (View::MovieDetail(detail), Err(e)) => {
                warn!(movie_id = detail.movie_id, error = %e, "movie detail failed");
                detail.body = DetailBody::Error(LOAD_ERROR.to_string());
            }
            (View::Admin(admin), Ok(Loaded::Admin(stats))) => {
                admin.panel = render::admin_panel(&stats);
                admin.status = AdminStatus::Ready;
            }
            (View::Admin(admin), Err(e)) => {
                warn!(error = %e, "admin metrics load failed");
                admin.status = AdminStatus::Failed(e.user_message());
            }
            (view, Ok(Loaded::Movies(movies))) => {
                if let Some(grid) = view.grid_mut() {
                    let cards = render::render_movies(&movies, grid.annotate);
                    grid.selected = 0;
                    grid.body = if cards.is_empty() {
                        Body::Empty(grid.empty_message)
                    } else {
                        Body::Cards(cards)
                    };
                }
            }
            (view, Err(e)) => {
                warn!(title = ?view.title(), error = %e, "load failed");
                if let Some(grid) = view.grid_mut() {
                    grid.body = Body::Error(LOAD_ERROR.to_string());
                }
            }
            (_, Ok(other)) => {
                debug!(?other, "response does not fit the current view");
            }
        }
    }

    /// Validate the form and send the credentials. Returns `false` when
    /// nothing was sent.
    pub fn submit_login(&mut self) -> bool {
        let View::Login(form) = &mut self.view else {
            return false;
        };
        let username = form.username.trim().to_string();
        if username.is_empty() || form.password.is_empty() {
            form.error = Some(LOGIN_MISSING_FIELDS.to_string());
            return false;
        }
        let Some(flight) = self.gateway.try_begin() else {
            return false;
        };
        form.error = None;
        form.submitting = true;
        let request = LoginRequest {
            username,
            password: form.password.clone(),
        };
        self.dispatch(flight, Load::Login(request), self.generation);
        true
    }

    fn finish_login(&mut self, result: Result<Loaded, ApiError>) {
        let View::Login(form) = &mut self.view else {
            return;
        };
        form.submitting = false;
        match result {
            Ok(Loaded::Login(response)) => {
                let typed = form.username.trim().to_string();
                self.complete_login(response, typed);
            }
            Ok(other) => debug!(?other, "unexpected response on the login screen"),
            Err(e) => {
                form.password.clear();
                form.error = Some(login_failure_message(&e).to_string());
            }
        }
    }

    /// Persist the session from a successful login and route by role.
    fn complete_login(&mut self, response: LoginResponse, typed_username: String) {
        let session = match session_from_login(response, &typed_username) {
            Ok(session) => session,
            Err(message) => {
                if let View::Login(form) = &mut self.view {
                    form.error = Some(message);
                }
                return;
            }
        };
        let role = session.role;
        if let Err(e) = self.session.update(session) {
            warn!(error = %e, "could not persist session");
            if let View::Login(form) = &mut self.view {
                form.error = Some(e.to_string());
            }
            return;
        }
        info!(role = ?role, "logged in");

        match role {
            Some(Role::Admin) => self.navigate(Route::Admin),
            _ => self.navigate(Route::Home),
        };
    }

    /// Clear the session and ask the main loop for a full reload.
    pub fn logout(&mut self) {
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "could not clear session file");
        }
        info!("logged out");
        self.reload = true;
    }

    pub fn update_layout(&mut self, width: u16) {
        self.columns = (width.saturating_sub(2) / CARD_WIDTH).max(1) as usize;
    }

    /// Move the selection on the current screen. Grids move by whole rows
    /// vertically; lists and the similar carousel move one step either way.
    pub fn move_selection(&mut self, dx: isize, dy: isize) {
        let columns = self.columns.max(1) as isize;
        match &mut self.view {
            View::Genres(GenreView::Picker { selected }) => {
                *selected = step(*selected, dx + dy, GENRES.len());
            }
            View::MovieDetail(DetailView {
                body: DetailBody::Ready { similar, selected, .. },
                ..
            }) => {
                *selected = step(*selected, dx + dy, similar.len());
            }
            View::Admin(admin) => {
                admin.selected = step(admin.selected, dy, admin.panel.rows.len());
            }
            view => {
                if let Some(grid) = view.grid_mut() {
                    let len = grid.cards().len();
                    grid.selected = step(grid.selected, dx + dy * columns, len);
                }
            }
        }
    }

    /// Enter on the current selection: open a card or pick a genre.
    pub fn open_selected(&mut self) -> bool {
        let target = match &self.view {
            View::Genres(GenreView::Picker { selected }) => {
                GENRES.get(*selected).map(|g| Route::Genre(g.to_string()))
            }
            View::MovieDetail(DetailView {
                body: DetailBody::Ready { similar, selected, .. },
                ..
            }) => similar.get(*selected).and_then(|card| card.id.map(Route::Movie)),
            view => view
                .grid()
                .and_then(|grid| grid.selected_card())
                .and_then(|card| card.id.map(Route::Movie)),
        };
        match target {
            Some(route) => self.navigate(route),
            None => {
                if self.view.grid().is_some_and(|g| g.selected_card().is_some()) {
                    self.status_msg = "This movie has no id and cannot be opened".to_string();
                }
                false
            }
        }
    }

    pub fn begin_search(&mut self) {
        if self.nav().search {
            self.input_mode = InputMode::Editing;
        }
    }

    /// Run the typed query. The input stays open if the gateway was busy.
    pub fn submit_search(&mut self) -> bool {
        let query = self.search_input.clone();
        if self.navigate(Route::Search(query.clone())) {
            return true;
        }
        if query.trim().is_empty() {
            self.input_mode = InputMode::Normal;
        }
        false
    }
}

/// Inline message for a failed `POST /login`.
pub fn login_failure_message(error: &ApiError) -> &'static str {
    if error.is_auth_failure() {
        info!("login rejected");
        LOGIN_REJECTED
    } else {
        warn!(error = %error, "login failed");
        LOGIN_UNREACHABLE
    }
}

/// Turn a login response into the session to persist. Roles other than
/// user and admin are refused, as is a user without an id. The typed
/// username stands in when the response omits one.
pub fn session_from_login(response: LoginResponse, typed_username: &str) -> Result<Session, String> {
    let role = response.role.as_deref().and_then(Role::parse);
    match (role, response.user_id) {
        (None, _) => {
            warn!(role = ?response.role, "login returned an unsupported role");
            Err(format!(
                "Unsupported role: {}",
                response.role.as_deref().unwrap_or("none")
            ))
        }
        (Some(Role::User), None) => {
            warn!("login returned a user without an id");
            Err("Login response had no user id.".to_string())
        }
        (role, user_id) => Ok(Session {
            user_id,
            role,
            username: response
                .username
                .or_else(|| Some(typed_username.to_string()).filter(|u| !u.is_empty())),
        }),
    }
}

/// Offset an index by `delta`, clamped to `0..len`.
fn step(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    current
        .saturating_add_signed(delta)
        .min(len - 1)
}
