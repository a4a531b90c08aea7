//! Admin mode switch.
//!
//! Decides whether destructive operations (delete one, clear all) are
//! offered. Admin mode is on when either:
//!
//! - the configured origin host is a loopback name, or
//! - someone typed the shared admin password once, on this machine, and the
//!   remembered flag is still on disk.
//!
//! This is a usability switch and not an authorization system. The password
//! is a constant compiled into the binary, compared in plain text, and the
//! remembered flag is an unprotected JSON file that anything with access to
//! the data directory can create or delete. The origin host comes from
//! configuration and can be set to anything. Nothing here stops a user from
//! calling the backend directly.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};

/// The shared admin password.
pub const ADMIN_SECRET: &str = "admin123";

/// Host names treated as "running on the operator's own machine".
pub const TRUSTED_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "0.0.0.0"];

/// What is written to the session file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionState {
    is_admin: bool,
}

/// Outcome of an [`AccessGate::elevate`] attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elevation {
    /// Password matched; admin mode is on and remembered.
    Granted,
    /// Password did not match; nothing changed.
    Denied,
}

/// Current mode as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Deletes allowed.
    Admin,
    /// View and export only.
    ReadOnly,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => f.write_str("管理员模式"),
            Self::ReadOnly => f.write_str("只读模式"),
        }
    }
}

/// The admin mode switch.
#[derive(Debug, Clone)]
pub struct AccessGate {
    trusted_origin: bool,
    elevated: bool,
    state_path: PathBuf,
}

impl AccessGate {
    /// Build the gate from the origin host and the remembered flag at
    /// `state_path`.
    ///
    /// A missing or unreadable state file means "not elevated".
    #[must_use]
    pub fn load(origin_host: Option<&str>, state_path: impl Into<PathBuf>) -> Self {
        let state_path = state_path.into();
        let trusted_origin = origin_host.is_some_and(Self::is_trusted_host);
        let elevated = read_state(&state_path).is_admin;
        debug!(trusted_origin, elevated, "Access gate loaded");

        Self {
            trusted_origin,
            elevated,
            state_path,
        }
    }

    /// Build the gate from configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::load(
            config.gate.origin_host.as_deref(),
            config.session_state_path(),
        )
    }

    /// Whether `host` is one of [`TRUSTED_HOSTS`].
    #[must_use]
    pub fn is_trusted_host(host: &str) -> bool {
        TRUSTED_HOSTS.contains(&host)
    }

    /// Whether the origin host signal is on.
    #[must_use]
    pub fn trusted_origin(&self) -> bool {
        self.trusted_origin
    }

    /// Whether the remembered password flag is on.
    #[must_use]
    pub fn elevated(&self) -> bool {
        self.elevated
    }

    /// Where the remembered flag is stored.
    #[must_use]
    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Try to switch on admin mode with the shared password.
    ///
    /// A wrong password leaves everything untouched. There is no attempt
    /// counter or lockout.
    ///
    /// # Errors
    ///
    /// Returns an error if the password matched but the flag could not be
    /// written; the gate then stays as it was.
    pub fn elevate(&mut self, secret: &str) -> Result<Elevation> {
        if secret != ADMIN_SECRET {
            return Ok(Elevation::Denied);
        }

        write_state(&self.state_path, &SessionState { is_admin: true })?;
        self.elevated = true;
        Ok(Elevation::Granted)
    }

    /// Forget the remembered password flag.
    ///
    /// The origin host signal is unaffected, so a loopback origin stays in
    /// admin mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file exists but cannot be removed.
    pub fn revoke(&mut self) -> Result<()> {
        match std::fs::remove_file(&self.state_path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => {
                return Err(Error::SessionPersist {
                    path: self.state_path.clone(),
                    source,
                })
            }
        }
        self.elevated = false;
        Ok(())
    }

    /// Whether destructive operations are allowed.
    #[must_use]
    pub fn can_mutate(&self) -> bool {
        self.trusted_origin || self.elevated
    }

    /// Fail with [`Error::NotPermitted`] unless [`AccessGate::can_mutate`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotPermitted`] in read-only mode.
    pub fn require_mutation(&self) -> Result<()> {
        if self.can_mutate() {
            Ok(())
        } else {
            Err(Error::NotPermitted)
        }
    }

    /// The current mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        if self.can_mutate() {
            Mode::Admin
        } else {
            Mode::ReadOnly
        }
    }
}

fn read_state(path: &Path) -> SessionState {
    match std::fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!("Ignoring unreadable session state {}: {}", path.display(), e);
            SessionState::default()
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => SessionState::default(),
        Err(e) => {
            warn!("Cannot read session state {}: {}", path.display(), e);
            SessionState::default()
        }
    }
}

fn write_state(path: &Path, state: &SessionState) -> Result<()> {
    let persist_err = |source: std::io::Error| Error::SessionPersist {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(persist_err)?;
        }
    }
    let json = serde_json::to_string(state)?;
    std::fs::write(path, json).map_err(persist_err)
}
