use crate::core_error::FtpError;
use crate::core_ftpcommand::{CommandContext, CommandOutcome};
use crate::reply::Reply;

const KNOWN_FACTS: [&str; 3] = ["type", "size", "modify"];

/// Handles the OPTS FTP command (RFC 2389).
///
/// `OPTS MLST fact1;fact2;` reselects the facts emitted by MLST/MLSD.
/// Unknown fact names are silently dropped, an empty list clears the
/// selection. Anything other than MLST is delegated to the hooks; with no
/// taker the option is unimplemented (502).
pub async fn handle_opts_command(
    ctx: &mut CommandContext<'_>,
    arg: &str,
) -> Result<CommandOutcome, FtpError> {
    if arg.is_empty() {
        return Err(FtpError::MissingArgument);
    }
    let (feature, rest) = match arg.split_once(char::is_whitespace) {
        Some((f, r)) => (f, r.trim()),
        None => (arg, ""),
    };

    if feature.eq_ignore_ascii_case("MLST") {
        let mut facts: Vec<String> = Vec::new();
        for fact in rest.split(';') {
            let fact = fact.trim().to_ascii_lowercase();
            if KNOWN_FACTS.contains(&fact.as_str()) && !facts.contains(&fact) {
                facts.push(fact);
            }
        }
        let listing: String = facts.iter().map(|f| format!("{};", f)).collect();
        ctx.session.mlst_facts = facts;
        return Ok(CommandOutcome::Reply(Reply::new(
            200,
            format!("MLST OPTS {}", listing),
        )));
    }

    match ctx.hooks.opts_message(arg) {
        Some(message) => Ok(CommandOutcome::Reply(Reply::new(200, message))),
        None => Err(FtpError::NotImplemented),
    }
}
