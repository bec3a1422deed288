use std::net::SocketAddr;

use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_network::data_conn::DataConnection;
use crate::core_network::registry::DataConnectionRegistry;

/// Login handshake progression. Any failed step falls back to
/// `NotLoggedIn`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    NotLoggedIn,
    UserNamed(String),
    PasswordAccepted(String),
    Authenticated(String),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            AuthState::NotLoggedIn => None,
            AuthState::UserNamed(u)
            | AuthState::PasswordAccepted(u)
            | AuthState::Authenticated(u) => Some(u),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferType {
    Ascii,
    Image,
}

impl TransferType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferType::Ascii => "A",
            TransferType::Image => "I",
        }
    }
}

/// RECORD is accepted but behaves exactly like FILE here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Structure {
    File,
    Record,
}

/// Per-control-connection state. One session exists per connection and is
/// owned by that connection's task; only the command currently executing
/// mutates it.
#[derive(Debug)]
pub struct Session {
    pub peer: SocketAddr,
    pub local: SocketAddr,
    pub auth: AuthState,
    pub cwd: String,
    pub last_reply_code: u16,
    /// The one legal next command after an intermediate reply, if any.
    pub expected_next: Option<FtpCommand>,
    pub transfer_type: TransferType,
    pub structure: Structure,
    pub data_conn: Option<DataConnection>,
    /// MLSX facts currently enabled (subset of type/size/modify).
    pub mlst_facts: Vec<String>,
    /// Whether the surrounding transport can secure this channel.
    pub secure_capable: bool,
}

impl Session {
    pub fn new(peer: SocketAddr, local: SocketAddr, secure_capable: bool) -> Self {
        Self {
            peer,
            local,
            auth: AuthState::NotLoggedIn,
            cwd: String::from("/"),
            last_reply_code: 0,
            expected_next: None,
            transfer_type: TransferType::Ascii,
            structure: Structure::File,
            data_conn: None,
            mlst_facts: default_mlst_facts(),
            secure_capable,
        }
    }

    /// Drops any pending data channel and releases its passive
    /// registration. Called whenever a new channel supersedes the old one
    /// and on session teardown.
    pub fn discard_data_conn(&mut self, registry: &DataConnectionRegistry) {
        if let Some(conn) = self.data_conn.take() {
            if let Some(local) = conn.local_addr() {
                registry.remove(self.peer.ip(), local);
            }
        }
    }

    /// Logical re-initialization (REIN, also performed by QUIT): back to
    /// the state right after connect, login discarded.
    pub fn reinitialize(&mut self, registry: &DataConnectionRegistry) {
        self.discard_data_conn(registry);
        self.auth = AuthState::NotLoggedIn;
        self.cwd = String::from("/");
        self.expected_next = None;
        self.transfer_type = TransferType::Ascii;
        self.structure = Structure::File;
        self.mlst_facts = default_mlst_facts();
    }
}

fn default_mlst_facts() -> Vec<String> {
    vec!["type".to_string(), "size".to_string(), "modify".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(
            "10.0.0.7:51000".parse().unwrap(),
            "127.0.0.1:2121".parse().unwrap(),
            false,
        )
    }

    #[test]
    fn new_sessions_start_unauthenticated_at_the_root() {
        let session = session();
        assert_eq!(session.auth, AuthState::NotLoggedIn);
        assert_eq!(session.cwd, "/");
        assert_eq!(session.transfer_type, TransferType::Ascii);
        assert!(session.expected_next.is_none());
    }

    #[test]
    fn reinitialize_discards_login_and_settings() {
        let registry = DataConnectionRegistry::new(40000, 40100);
        let mut session = session();
        session.auth = AuthState::Authenticated("alice".into());
        session.cwd = "/pub".into();
        session.transfer_type = TransferType::Image;
        session.expected_next = Some(FtpCommand::NOOP);
        session.reinitialize(&registry);
        assert_eq!(session.auth, AuthState::NotLoggedIn);
        assert_eq!(session.cwd, "/");
        assert_eq!(session.transfer_type, TransferType::Ascii);
        assert!(session.expected_next.is_none());
    }
}
