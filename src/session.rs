use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

pub const USER_ID_KEY: &str = "user_id";
pub const ROLE_KEY: &str = "role";
pub const USERNAME_KEY: &str = "username";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is corrupt: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

/// Where a session lands on startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    Login,
    Home,
    Admin,
}

/// Who is signed in. Every field may be missing in a partial or tampered
/// store; `landing` decides what that means.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user_id: Option<i64>,
    pub role: Option<Role>,
    pub username: Option<String>,
}

impl Session {
    pub fn from_entries(entries: &BTreeMap<String, String>) -> Self {
        Self {
            user_id: entries.get(USER_ID_KEY).and_then(|v| v.trim().parse().ok()),
            role: entries.get(ROLE_KEY).and_then(|v| Role::parse(v)),
            username: entries
                .get(USERNAME_KEY)
                .filter(|v| !v.trim().is_empty())
                .cloned(),
        }
    }

    pub fn to_entries(&self) -> BTreeMap<String, String> {
        let mut entries = BTreeMap::new();
        if let Some(id) = self.user_id {
            entries.insert(USER_ID_KEY.to_string(), id.to_string());
        }
        if let Some(role) = self.role {
            entries.insert(ROLE_KEY.to_string(), role.as_str().to_string());
        }
        if let Some(name) = &self.username {
            entries.insert(USERNAME_KEY.to_string(), name.clone());
        }
        entries
    }

    /// Admins land on the panel even without a username; users need an id.
    pub fn landing(&self) -> Landing {
        match self.role {
            Some(Role::Admin) => Landing::Admin,
            Some(Role::User) if self.user_id.is_some() => Landing::Home,
            _ => Landing::Login,
        }
    }
}

/// String key/value entries persisted as a JSON object on disk.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty store.
    pub fn load(&self) -> Result<BTreeMap<String, String>, SessionError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }

    /// Remove every entry.
    pub fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not remove session file, blanking it");
                self.save(&BTreeMap::new())
            }
        }
    }
}

/// The one place the session changes. Readers subscribe instead of going to
/// the store.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<SessionStore>,
    tx: Arc<watch::Sender<Session>>,
}

impl SessionManager {
    /// Read the persisted session. An unreadable store counts as signed out.
    pub fn open(store: SessionStore) -> Self {
        let session = match store.load() {
            Ok(entries) => Session::from_entries(&entries),
            Err(e) => {
                warn!(path = %store.path().display(), error = %e, "ignoring unreadable session");
                Session::default()
            }
        };
        debug!(?session, "session loaded");
        let (tx, _rx) = watch::channel(session);
        Self {
            store: Arc::new(store),
            tx: Arc::new(tx),
        }
    }

    pub fn current(&self) -> Session {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    pub fn update(&self, session: Session) -> Result<(), SessionError> {
        self.store.save(&session.to_entries())?;
        self.tx.send_replace(session);
        Ok(())
    }

    /// Subscribers see the signed-out session even if the store could not be
    /// cleared.
    pub fn clear(&self) -> Result<(), SessionError> {
        let result = self.store.clear();
        self.tx.send_replace(Session::default());
        result
    }
}

/// Which navigation controls are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Nav {
    pub visible: bool,
    pub home: bool,
    pub trending: bool,
    pub genres: bool,
    pub history: bool,
    pub search: bool,
    pub logout: bool,
}

/// Admins get logout only; users get the full consumer navigation.
pub fn configure_navbar_for_role(role: Option<Role>) -> Nav {
    let Some(role) = role else {
        return Nav::default();
    };
    let consumer = role == Role::User;
    Nav {
        visible: true,
        home: consumer,
        trending: consumer,
        genres: consumer,
        history: consumer,
        search: consumer,
        logout: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_landing() {
        let admin = Session::from_entries(&entries(&[("role", "admin")]));
        assert_eq!(admin.landing(), Landing::Admin);

        let user = Session::from_entries(&entries(&[("role", "user"), ("user_id", "7")]));
        assert_eq!(user.landing(), Landing::Home);

        let no_id = Session::from_entries(&entries(&[("role", "user")]));
        assert_eq!(no_id.landing(), Landing::Login);

        let bad_id = Session::from_entries(&entries(&[("role", "user"), ("user_id", "null")]));
        assert_eq!(bad_id.landing(), Landing::Login);

        let unknown = Session::from_entries(&entries(&[("role", "root"), ("user_id", "1")]));
        assert_eq!(unknown.landing(), Landing::Login);

        assert_eq!(Session::default().landing(), Landing::Login);
    }

    #[test]
    fn test_entries_roundtrip_uses_three_keys() {
        let session = Session {
            user_id: Some(7),
            role: Some(Role::User),
            username: Some("abdullah".to_string()),
        };
        let stored = session.to_entries();
        assert_eq!(
            stored.keys().collect::<Vec<_>>(),
            vec!["role", "user_id", "username"]
        );
        assert_eq!(Session::from_entries(&stored), session);
    }

    #[test]
    fn test_store_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("session.json"));
        assert!(store.load().unwrap().is_empty());

        store.save(&entries(&[("role", "admin"), ("username", "admin")])).unwrap();
        assert_eq!(store.load().unwrap().len(), 2);

        store.clear().unwrap();
        assert!(store.load().unwrap().is_empty());
        // Clearing twice is fine.
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_store_opens_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "][").unwrap();
        let manager = SessionManager::open(SessionStore::new(&path));
        assert_eq!(manager.current(), Session::default());
    }

    #[test]
    fn test_manager_notifies_subscribers() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        let manager = SessionManager::open(store.clone());
        let mut rx = manager.subscribe();
        assert!(!rx.has_changed().unwrap());

        let session = Session {
            user_id: Some(2),
            role: Some(Role::Admin),
            username: Some("admin".to_string()),
        };
        manager.update(session.clone()).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), session);
        assert_eq!(store.load().unwrap().len(), 3);

        manager.clear().unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Session::default());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_navbar_for_role() {
        let hidden = configure_navbar_for_role(None);
        assert!(!hidden.visible);
        assert!(!hidden.logout);

        let admin = configure_navbar_for_role(Some(Role::Admin));
        assert!(admin.visible && admin.logout);
        assert!(!admin.home && !admin.trending && !admin.genres && !admin.history && !admin.search);

        let user = configure_navbar_for_role(Some(Role::User));
        assert!(user.visible && user.logout);
        assert!(user.home && user.trending && user.genres && user.history && user.search);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse(" user "), Some(Role::User));
        assert_eq!(Role::parse("Admin"), None);
    }
}
