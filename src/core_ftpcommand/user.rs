use log::info;

use crate::core_error::FtpError;
use crate::core_ftpcommand::{CommandContext, CommandOutcome};
use crate::reply::Reply;
use crate::session::AuthState;

/// Handles the USER FTP command.
///
/// USER always restarts the login handshake: any prior authentication is
/// discarded before the provider is consulted. Depending on the provider,
/// the handshake either completes immediately (230) or demands PASS next
/// (331).
pub async fn handle_user_command(
    ctx: &mut CommandContext<'_>,
    arg: &str,
) -> Result<CommandOutcome, FtpError> {
    if arg.is_empty() {
        return Err(FtpError::MissingArgument);
    }
    ctx.session.auth = AuthState::NotLoggedIn;
    ctx.session.expected_next = None;

    let step = ctx.auth.set_user(arg)?;
    if step.next.is_none() {
        info!("User {} logged in on USER alone ({})", arg, ctx.session.peer);
        ctx.session.auth = AuthState::Authenticated(arg.to_string());
    } else {
        info!("Username {} accepted, awaiting password ({})", arg, ctx.session.peer);
        ctx.session.auth = AuthState::UserNamed(arg.to_string());
        ctx.session.expected_next = step.next;
    }
    Ok(CommandOutcome::Reply(Reply::new(step.code, step.message)))
}
