mod api;
mod app;
mod config;
mod render;
mod session;
mod ui;

use api::{Gateway, HttpTransport, LoginRequest, LoginResponse, endpoints};
use app::{App, AppContext, GenreView, InputMode, Route, View};
use clap::{Parser, Subcommand};
use config::Config;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use session::{Landing, SessionManager, SessionStore};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Terminal front end for the Cinephile movie recommendation API
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to a config.json (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the config file
    #[arg(short, long, global = true)]
    backend: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the terminal UI (default)
    Run,
    /// Sign in without the UI and remember the session
    Login {
        #[arg(short, long)]
        username: String,
        /// Prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Forget the remembered session
    Logout,
    /// Show the remembered session and where the UI would start
    Whoami,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(url) = cli.backend {
        config.backend_url = url;
    }
    init_logging(&config)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let transport = HttpTransport::new(&config.backend_url, config.request_timeout())?;
            let ctx = AppContext {
                transport: Arc::new(transport),
                session_path: config.session_path()?,
                skeleton_cards: config.skeleton_cards,
            };
            info!(backend = %config.backend_url, "starting");

            // Init terminal
            let mut terminal = ratatui::init();

            // Main loop
            let result = run_app(&mut terminal, &ctx).await;

            // Restore terminal
            ratatui::restore();

            if let Err(e) = result {
                error!(error = %e, "terminal UI failed");
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Login { username, password } => {
            login(&config, username, password).await?;
        }
        Commands::Logout => {
            let path = config.session_path()?;
            SessionStore::new(&path).clear()?;
            info!(path = %path.display(), "session cleared from the command line");
            eprintln!("Logged out.");
        }
        Commands::Whoami => {
            let session = SessionManager::open(SessionStore::new(config.session_path()?)).current();
            match session.landing() {
                Landing::Login => println!("Not logged in."),
                landing => {
                    let role = session.role.map(|r| r.as_str()).unwrap_or("none");
                    println!("Username: {}", session.username.as_deref().unwrap_or("—"));
                    println!("Role:     {}", role);
                    println!(
                        "User ID:  {}",
                        session.user_id.map(|id| id.to_string()).unwrap_or_else(|| "—".to_string())
                    );
                    let start = if landing == Landing::Admin { "admin panel" } else { "home" };
                    println!("Starts at the {}.", start);
                }
            }
        }
    }

    Ok(())
}

/// Logs go to a file; the terminal belongs to the UI.
fn init_logging(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let path = config.log_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

async fn login(
    config: &Config,
    username: String,
    password: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let password = match password {
        Some(p) => p,
        None => rpassword::prompt_password("Password: ")?,
    };
    let username = username.trim().to_string();
    if username.is_empty() || password.is_empty() {
        return Err(app::LOGIN_MISSING_FIELDS.into());
    }

    let transport = HttpTransport::new(&config.backend_url, config.request_timeout())?;
    let gateway = Gateway::new(Arc::new(transport));
    let flight = gateway.try_begin().ok_or("another request is in flight")?;
    let request = LoginRequest {
        username: username.clone(),
        password,
    };
    let response: LoginResponse = flight
        .post_json(endpoints::LOGIN_PATH, &request)
        .await
        .map_err(|e| app::login_failure_message(&e))?;
    drop(flight);

    let session = app::session_from_login(response, &username)?;
    SessionManager::open(SessionStore::new(config.session_path()?)).update(session.clone())?;
    info!(role = ?session.role, "logged in from the command line");
    eprintln!(
        "Logged in as {} ({}).",
        session.username.as_deref().unwrap_or(&username),
        session.role.map(|r| r.as_str()).unwrap_or("none")
    );
    Ok(())
}

async fn run_app(
    terminal: &mut ratatui::DefaultTerminal,
    ctx: &AppContext,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::boot(ctx);
    app.update_layout(terminal.size()?.width);

    loop {
        app.drain_events();
        terminal.draw(|frame| ui::render(&app, frame))?;

        if app.should_quit {
            return Ok(());
        }

        if app.reload {
            info!("reloading after logout");
            app = App::boot(ctx);
            app.update_layout(terminal.size()?.width);
            continue;
        }

        // Poll for events with a 100ms timeout so responses get drawn promptly
        if crossterm::event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    handle_key(&mut app, key);
                }
                Event::Resize(width, _) => {
                    app.update_layout(width);
                }
                _ => {}
            }
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // If help is showing, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    if app.view.is_login() {
        handle_login_key(app, key);
        return;
    }
    if app.input_mode == InputMode::Editing {
        handle_search_input(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('?') => {
            app.show_help = true;
        }
        KeyCode::Char('q') => {
            app.should_quit = true;
        }
        KeyCode::Char('h') => {
            app.navigate(Route::Home);
        }
        KeyCode::Char('t') => {
            app.navigate(Route::Trending);
        }
        KeyCode::Char('g') => {
            app.navigate(Route::Genres);
        }
        KeyCode::Char('w') => {
            app.navigate(Route::History);
        }
        KeyCode::Char('/') => {
            app.begin_search();
        }
        KeyCode::Char('L') => {
            app.logout();
        }
        KeyCode::Enter => {
            app.open_selected();
        }
        KeyCode::Esc | KeyCode::Char('b') => match app.view {
            View::MovieDetail(_) => {
                app.navigate(Route::Back);
            }
            View::Genres(GenreView::Results { .. }) => {
                app.navigate(Route::Genres);
            }
            _ => {}
        },
        KeyCode::Left => app.move_selection(-1, 0),
        KeyCode::Right => app.move_selection(1, 0),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(0, -1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(0, 1),
        _ => {}
    }
}

fn handle_login_key(app: &mut App, key: KeyEvent) {
    let View::Login(form) = &mut app.view else {
        return;
    };
    if form.submitting {
        return;
    }
    match key.code {
        KeyCode::Esc => {
            app.should_quit = true;
        }
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            form.focus = form.focus.toggle();
        }
        KeyCode::Enter => {
            app.submit_login();
        }
        KeyCode::Backspace => {
            form.field_mut().pop();
        }
        KeyCode::Char(c) => {
            form.field_mut().push(c);
        }
        _ => {}
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            if app.submit_search() {
                app.search_input.clear();
            }
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            app.search_input.pop();
        }
        KeyCode::Char(c) => {
            app.search_input.push(c);
        }
        _ => {}
    }
}
