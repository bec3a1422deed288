use crate::core_error::FtpError;
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_transfer::Transfer;
use crate::session::Session;

/// Business-logic hook points around the command and transfer lifecycle.
/// All methods have no-op defaults; implementors override what they need.
pub trait FtpHooks: Send + Sync {
    /// Called before a parsed command is dispatched.
    fn before_run_command(&self, _session: &Session, _verb: FtpCommand, _arg: &str) {}

    /// Called after a command produced its reply (the early reply, for
    /// transfer commands).
    fn after_run_command_ok(&self, _session: &Session, _verb: FtpCommand, _code: u16) {}

    /// Called after a command failed; the error has already been mapped to
    /// its reply code.
    fn after_run_command_ko(&self, _session: &Session, _verb: FtpCommand, _error: &FtpError) {}

    /// Called exactly once per transfer, whatever the outcome, with the
    /// verb, final status, and target path on the finalized transfer.
    fn after_transfer_done(&self, _transfer: &Transfer) {}

    fn help_message(&self, topic: &str) -> String {
        if topic.is_empty() {
            "The following commands are recognized: USER PASS ACCT CWD CDUP TYPE STRU \
             PORT EPRT PASV EPSV LIST NLST MLSD MLST SIZE MDTM XCRC XMD5 XSHA1 \
             RETR STOR APPE STOU FEAT OPTS SYST NOOP REIN QUIT HELP."
                .to_string()
        } else {
            format!("No detailed help for {}.", topic.to_ascii_uppercase())
        }
    }

    /// Extra lines appended to the FEAT block.
    fn feat_extensions(&self) -> Vec<String> {
        Vec::new()
    }

    /// Chance to service OPTS for features this engine does not know.
    /// Returning `None` yields a 502 to the client.
    fn opts_message(&self, _args: &str) -> Option<String> {
        None
    }
}

/// Hook implementation used when the embedder installs nothing.
pub struct DefaultHooks;

impl FtpHooks for DefaultHooks {}
