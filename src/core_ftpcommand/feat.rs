use crate::core_error::FtpError;
use crate::core_ftpcommand::{CommandContext, CommandOutcome};
use crate::reply::Reply;

/// Handles the FEAT FTP command (RFC 2389).
///
/// The security block (AUTH TLS, PBSZ, PROT) is only advertised when the
/// deployment is actually capable of it.
pub async fn handle_feat_command(
    ctx: &mut CommandContext<'_>,
    _arg: &str,
) -> Result<CommandOutcome, FtpError> {
    let mut lines: Vec<String> = vec!["Extensions supported:".to_string()];
    if ctx.session.secure_capable {
        lines.push(" AUTH TLS".to_string());
        lines.push(" PBSZ".to_string());
        lines.push(" PROT".to_string());
    }
    for feature in [
        " EPRT",
        " EPSV",
        " MDTM",
        " MLSD",
        " MLST type*;size*;modify*;",
        " SIZE",
        " UTF8",
        " XCRC",
        " XMD5",
        " XSHA1",
    ] {
        lines.push(feature.to_string());
    }
    for extra in ctx.hooks.feat_extensions() {
        lines.push(format!(" {}", extra));
    }
    lines.push("End".to_string());
    Ok(CommandOutcome::Reply(Reply::multiline(211, lines)))
}
