use crate::core_error::FtpError;
use crate::core_ftpcommand::{CommandContext, CommandOutcome};
use crate::reply::Reply;
use crate::session::TransferType;

/// Handles the TYPE FTP command.
///
/// ASCII (optionally with the N format control) and IMAGE are supported.
/// Other representation types and format controls get 504 rather than 502:
/// the verb itself is implemented, the parameter is not.
pub async fn handle_type_command(
    ctx: &mut CommandContext<'_>,
    arg: &str,
) -> Result<CommandOutcome, FtpError> {
    let mut parts = arg.split_whitespace();
    let primary = parts.next().map(|p| p.to_ascii_uppercase());
    let secondary = parts.next().map(|p| p.to_ascii_uppercase());

    match primary.as_deref() {
        // An absent argument restores the protocol default.
        None => {
            ctx.session.transfer_type = TransferType::Ascii;
            Ok(CommandOutcome::Reply(Reply::new(200, "Type set to A N.")))
        }
        Some("A") => match secondary.as_deref() {
            None | Some("N") => {
                ctx.session.transfer_type = TransferType::Ascii;
                Ok(CommandOutcome::Reply(Reply::new(200, "Type set to A.")))
            }
            Some(other) => Err(FtpError::ParameterNotImplemented(format!(
                "format control {}",
                other
            ))),
        },
        Some("I") => match secondary {
            None => {
                ctx.session.transfer_type = TransferType::Image;
                Ok(CommandOutcome::Reply(Reply::new(200, "Type set to I.")))
            }
            Some(other) => Err(FtpError::BadArgument(format!(
                "unexpected parameter {}",
                other
            ))),
        },
        Some(other) => Err(FtpError::ParameterNotImplemented(format!(
            "representation type {}",
            other
        ))),
    }
}
