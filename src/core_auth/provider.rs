use anyhow::{Context, Result};
use bcrypt::verify;
use log::{info, warn};
use std::collections::HashMap;
use std::fs;

use crate::core_error::FtpError;
use crate::core_ftpcommand::ftpcommand::FtpCommand;

/// One step of the login handshake: the reply to emit and, when the
/// handshake is not finished, the single command expected next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthStep {
    pub next: Option<FtpCommand>,
    pub code: u16,
    pub message: String,
}

impl AuthStep {
    pub fn done(code: u16, message: impl Into<String>) -> Self {
        Self {
            next: None,
            code,
            message: message.into(),
        }
    }

    pub fn expect(next: FtpCommand, code: u16, message: impl Into<String>) -> Self {
        Self {
            next: Some(next),
            code,
            message: message.into(),
        }
    }
}

/// Authentication collaborator consumed by the session state machine.
/// Each call either advances the handshake or fails with an auth error,
/// in which case the caller resets to unauthenticated.
pub trait Authenticator: Send + Sync {
    fn set_user(&self, username: &str) -> Result<AuthStep, FtpError>;
    fn set_password(&self, username: &str, password: &str) -> Result<AuthStep, FtpError>;
    fn set_account(&self, username: &str, account: &str) -> Result<AuthStep, FtpError>;
}

/// `user:bcrypt-hash[:account]` line from the passwd file. An empty hash
/// means the user logs in on USER alone; a third field demands ACCT with
/// that exact value after PASS.
#[derive(Debug, Clone)]
pub struct PasswdEntry {
    username: String,
    hashed_password: String,
    account: Option<String>,
}

impl PasswdEntry {
    pub fn from_line(line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.split(':').collect();
        if parts.len() != 2 && parts.len() != 3 {
            return None;
        }
        Some(PasswdEntry {
            username: parts[0].to_string(),
            hashed_password: parts[1].to_string(),
            account: parts.get(2).map(|s| s.to_string()),
        })
    }

    pub fn get_username(&self) -> &str {
        &self.username
    }

    pub fn get_hashed_password(&self) -> &str {
        &self.hashed_password
    }
}

/// Passwd-file-backed authenticator with optional anonymous access.
pub struct FileAuthenticator {
    entries: HashMap<String, PasswdEntry>,
    allow_anonymous: bool,
}

impl FileAuthenticator {
    pub fn new(allow_anonymous: bool) -> Self {
        Self {
            entries: HashMap::new(),
            allow_anonymous,
        }
    }

    pub fn from_file(path: &str, allow_anonymous: bool) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read passwd file: {}", path))?;
        let mut entries = HashMap::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match PasswdEntry::from_line(line) {
                Some(entry) => {
                    entries.insert(entry.get_username().to_string(), entry);
                }
                None => warn!("Skipping malformed passwd line"),
            }
        }
        info!("Loaded {} user entries from {}", entries.len(), path);
        Ok(Self {
            entries,
            allow_anonymous,
        })
    }

    pub fn with_entry(mut self, entry: PasswdEntry) -> Self {
        self.entries.insert(entry.get_username().to_string(), entry);
        self
    }

    fn is_anonymous(&self, username: &str) -> bool {
        self.allow_anonymous && username.eq_ignore_ascii_case("anonymous")
    }
}

impl Authenticator for FileAuthenticator {
    fn set_user(&self, username: &str) -> Result<AuthStep, FtpError> {
        if self.is_anonymous(username) {
            return Ok(AuthStep::expect(
                FtpCommand::PASS,
                331,
                "Anonymous login okay, send your complete email address as password.",
            ));
        }
        match self.entries.get(username) {
            Some(entry) if entry.get_hashed_password().is_empty() => {
                Ok(AuthStep::done(230, "User logged in, proceed."))
            }
            // Unknown usernames also get 331 so the reply does not leak
            // which accounts exist.
            _ => Ok(AuthStep::expect(
                FtpCommand::PASS,
                331,
                "User name okay, need password.",
            )),
        }
    }

    fn set_password(&self, username: &str, password: &str) -> Result<AuthStep, FtpError> {
        if self.is_anonymous(username) {
            return Ok(AuthStep::done(230, "Anonymous user logged in, proceed."));
        }
        let entry = self
            .entries
            .get(username)
            .ok_or_else(|| FtpError::AuthRejected("invalid username or password".into()))?;
        if !verify(password, entry.get_hashed_password()).unwrap_or(false) {
            return Err(FtpError::AuthRejected("invalid username or password".into()));
        }
        if entry.account.is_some() {
            Ok(AuthStep::expect(
                FtpCommand::ACCT,
                332,
                "Need account for login.",
            ))
        } else {
            Ok(AuthStep::done(230, "User logged in, proceed."))
        }
    }

    fn set_account(&self, username: &str, account: &str) -> Result<AuthStep, FtpError> {
        let entry = self
            .entries
            .get(username)
            .ok_or_else(|| FtpError::AuthRejected("invalid account".into()))?;
        match &entry.account {
            Some(expected) if expected == account => {
                Ok(AuthStep::done(230, "User logged in, proceed."))
            }
            Some(_) => Err(FtpError::AuthRejected("invalid account".into())),
            None => Ok(AuthStep::done(230, "Account not required, proceed.")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bcrypt::{hash, DEFAULT_COST};

    fn authenticator() -> FileAuthenticator {
        let hashed = hash("secret", DEFAULT_COST).unwrap();
        FileAuthenticator::new(true)
            .with_entry(PasswdEntry::from_line(&format!("alice:{}", hashed)).unwrap())
            .with_entry(PasswdEntry::from_line(&format!("bob:{}:books", hashed)).unwrap())
            .with_entry(PasswdEntry::from_line("guest:").unwrap())
    }

    #[test]
    fn passwd_lines_parse_with_and_without_account() {
        assert!(PasswdEntry::from_line("user:hash").is_some());
        assert!(PasswdEntry::from_line("user:hash:acct").is_some());
        assert!(PasswdEntry::from_line("user").is_none());
        assert!(PasswdEntry::from_line("a:b:c:d").is_none());
    }

    #[test]
    fn anonymous_completes_on_pass() {
        let auth = authenticator();
        let step = auth.set_user("anonymous").unwrap();
        assert_eq!(step.next, Some(FtpCommand::PASS));
        assert_eq!(step.code, 331);
        let step = auth.set_password("anonymous", "me@example.org").unwrap();
        assert_eq!(step.next, None);
        assert_eq!(step.code, 230);
    }

    #[test]
    fn passwordless_user_completes_immediately() {
        let auth = authenticator();
        let step = auth.set_user("guest").unwrap();
        assert_eq!(step.next, None);
        assert_eq!(step.code, 230);
    }

    #[test]
    fn account_entry_demands_acct_after_pass() {
        let auth = authenticator();
        let step = auth.set_password("bob", "secret").unwrap();
        assert_eq!(step.next, Some(FtpCommand::ACCT));
        assert_eq!(step.code, 332);
        let step = auth.set_account("bob", "books").unwrap();
        assert_eq!(step.code, 230);
        assert!(auth.set_account("bob", "wrong").is_err());
    }

    #[test]
    fn wrong_password_is_an_auth_error() {
        let auth = authenticator();
        let err = auth.set_password("alice", "nope").unwrap_err();
        assert_eq!(err.reply_code(), 530);
    }
}
