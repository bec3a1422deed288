use log::{info, warn};

use crate::core_error::FtpError;
use crate::core_ftpcommand::{CommandContext, CommandOutcome};
use crate::reply::Reply;
use crate::session::AuthState;

/// Handles the ACCT FTP command, the optional third step of the login
/// handshake. Valid only after USER and PASS; failure resets the session
/// to unauthenticated.
pub async fn handle_acct_command(
    ctx: &mut CommandContext<'_>,
    arg: &str,
) -> Result<CommandOutcome, FtpError> {
    let username = match &ctx.session.auth {
        AuthState::PasswordAccepted(u) => u.clone(),
        _ => {
            warn!("ACCT without USER/PASS from {}", ctx.session.peer);
            ctx.session.auth = AuthState::NotLoggedIn;
            return Err(FtpError::NotAuthenticated);
        }
    };
    if arg.is_empty() {
        ctx.session.auth = AuthState::NotLoggedIn;
        return Err(FtpError::MissingArgument);
    }

    match ctx.auth.set_account(&username, arg) {
        Ok(step) => {
            info!("User {} logged in with account ({})", username, ctx.session.peer);
            ctx.session.auth = AuthState::Authenticated(username);
            Ok(CommandOutcome::Reply(Reply::new(step.code, step.message)))
        }
        Err(error) => {
            warn!("Account rejected for {} ({})", username, ctx.session.peer);
            ctx.session.auth = AuthState::NotLoggedIn;
            Err(error)
        }
    }
}
