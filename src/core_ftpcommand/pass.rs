use log::{info, warn};

use crate::core_error::FtpError;
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::{CommandContext, CommandOutcome};
use crate::reply::Reply;
use crate::session::AuthState;

/// Handles the PASS FTP command.
///
/// PASS is only meaningful right after USER; without one it is an auth
/// error and the session stays unauthenticated. A rejected password also
/// resets the handshake (fail-closed).
pub async fn handle_pass_command(
    ctx: &mut CommandContext<'_>,
    arg: &str,
) -> Result<CommandOutcome, FtpError> {
    let username = match &ctx.session.auth {
        AuthState::UserNamed(u) => u.clone(),
        _ => {
            warn!("PASS without a preceding USER from {}", ctx.session.peer);
            ctx.session.auth = AuthState::NotLoggedIn;
            return Err(FtpError::NotAuthenticated);
        }
    };

    // An empty password is the provider's call (anonymous mailboxes).
    match ctx.auth.set_password(&username, arg) {
        Ok(step) => {
            if step.next == Some(FtpCommand::ACCT) {
                ctx.session.auth = AuthState::PasswordAccepted(username);
                ctx.session.expected_next = step.next;
            } else {
                info!("User {} logged in ({})", username, ctx.session.peer);
                ctx.session.auth = AuthState::Authenticated(username);
            }
            Ok(CommandOutcome::Reply(Reply::new(step.code, step.message)))
        }
        Err(error) => {
            warn!("Password rejected for {} ({})", username, ctx.session.peer);
            ctx.session.auth = AuthState::NotLoggedIn;
            Err(error)
        }
    }
}
