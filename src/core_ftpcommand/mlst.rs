use crate::core_error::FtpError;
use crate::core_fs::{virtual_path, EntryMeta};
use crate::core_ftpcommand::{CommandContext, CommandOutcome};
use crate::reply::Reply;

/// Renders the enabled MLSX facts for one entry, in the session's selected
/// order, each terminated by `;`. Also used by MLSD lines.
pub(super) fn format_facts(entry: &EntryMeta, facts: &[String]) -> String {
    let mut rendered = String::new();
    for fact in facts {
        match fact.as_str() {
            "type" => {
                rendered.push_str(if entry.is_dir { "type=dir;" } else { "type=file;" });
            }
            "size" => {
                if !entry.is_dir {
                    rendered.push_str(&format!("size={};", entry.size));
                }
            }
            "modify" => {
                if let Some(modified) = entry.modified {
                    rendered.push_str(&format!(
                        "modify={};",
                        modified.format("%Y%m%d%H%M%S")
                    ));
                }
            }
            _ => {}
        }
    }
    rendered
}

/// Handles the MLST FTP command (RFC 3659): facts for a single entry on
/// the control channel, as a 250 multiline reply with the fact line
/// indented by one space.
pub async fn handle_mlst_command(
    ctx: &mut CommandContext<'_>,
    arg: &str,
) -> Result<CommandOutcome, FtpError> {
    let vpath = virtual_path(&ctx.session.cwd, arg);
    if !ctx.fs.exists(&vpath) {
        return Err(FtpError::ActionNotTaken(format!("{}: no such file", vpath)));
    }
    let entry = ctx.fs.stat_entry(&vpath)?;
    let facts = format_facts(&entry, &ctx.session.mlst_facts);
    Ok(CommandOutcome::Reply(Reply::multiline(
        250,
        vec![
            format!("Listing {}", vpath),
            format!(" {} {}", facts, vpath),
            "End".to_string(),
        ],
    )))
}
