use crate::core_error::FtpError;
use crate::core_ftpcommand::{CommandContext, CommandOutcome};
use crate::reply::Reply;
use crate::session::Structure;

/// Handles the STRU FTP command. Only FILE structure affects anything;
/// RECORD is accepted for compatibility, PAGE is not implemented.
pub async fn handle_stru_command(
    ctx: &mut CommandContext<'_>,
    arg: &str,
) -> Result<CommandOutcome, FtpError> {
    match arg.to_ascii_uppercase().as_str() {
        "" => Err(FtpError::MissingArgument),
        "F" => {
            ctx.session.structure = Structure::File;
            Ok(CommandOutcome::Reply(Reply::new(200, "Structure set to F.")))
        }
        "R" => {
            ctx.session.structure = Structure::Record;
            Ok(CommandOutcome::Reply(Reply::new(200, "Structure set to R.")))
        }
        other => Err(FtpError::ParameterNotImplemented(format!(
            "structure {}",
            other
        ))),
    }
}
