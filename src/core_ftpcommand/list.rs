use chrono::{DateTime, Utc};

use crate::core_error::FtpError;
use crate::core_fs::{virtual_path, EntryMeta};
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::mlst::format_facts;
use crate::core_ftpcommand::{data_limiter, open_data_stream, CommandContext, CommandOutcome};
use crate::core_transfer::{spawn_transfer, Transfer, TransferPayload};
use crate::reply::Reply;

/// Handles the LIST, NLST and MLSD FTP commands. The listing text is built
/// before the data channel opens, then streamed by the transfer executor;
/// the early 150 goes out first and the final reply follows the transfer.
pub async fn handle_list_command(
    ctx: &mut CommandContext<'_>,
    verb: FtpCommand,
    arg: &str,
) -> Result<CommandOutcome, FtpError> {
    // Clients habitually send `LIST -la`; flags are not paths.
    let arg = if arg.starts_with('-') { "" } else { arg };
    let vpath = virtual_path(&ctx.session.cwd, arg);

    let entries = if ctx.fs.is_dir(&vpath) {
        ctx.fs.list_entries(&vpath)?
    } else if ctx.fs.is_file(&vpath) && verb != FtpCommand::MLSD {
        vec![ctx.fs.stat_entry(&vpath)?]
    } else {
        return Err(FtpError::ActionNotTaken(format!(
            "{}: no such file or directory",
            vpath
        )));
    };

    let mut text = String::new();
    for entry in &entries {
        let line = match verb {
            FtpCommand::NLST => entry.name.clone(),
            FtpCommand::MLSD => {
                format!("{} {}", format_facts(entry, &ctx.session.mlst_facts), entry.name)
            }
            _ => long_line(entry),
        };
        text.push_str(&line);
        text.push_str("\r\n");
    }

    let stream = open_data_stream(ctx).await?;
    let limiter = data_limiter(ctx);
    let done = spawn_transfer(
        Transfer::new(verb, vpath.clone()),
        stream,
        TransferPayload::Listing(text),
        limiter,
        ctx.config.download_buffer_size(),
    );
    Ok(CommandOutcome::Transfer {
        early: Reply::new(
            150,
            format!("Opening data connection for {} of {}.", verb, vpath),
        ),
        done,
    })
}

/// One `ls -l` style line. Permissions are cosmetic; the engine has no
/// notion of per-file modes.
fn long_line(entry: &EntryMeta) -> String {
    let flag = if entry.is_dir { 'd' } else { '-' };
    format!(
        "{}rw-r--r-- 1 ftp ftp {:>12} {} {}",
        flag,
        entry.size,
        timestamp(entry.modified),
        entry.name
    )
}

fn timestamp(modified: Option<DateTime<Utc>>) -> String {
    match modified {
        Some(m) => m.format("%b %e %H:%M").to_string(),
        None => String::from("Jan  1 00:00"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn long_lines_mark_directories() {
        let entry = EntryMeta {
            name: "pub".into(),
            is_dir: true,
            size: 4096,
            modified: Some(Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap()),
        };
        let line = long_line(&entry);
        assert!(line.starts_with('d'));
        assert!(line.ends_with(" pub"));
        assert!(line.contains("Mar 14 09:26"));
    }

    #[test]
    fn missing_mtime_gets_a_placeholder() {
        let entry = EntryMeta {
            name: "a.txt".into(),
            is_dir: false,
            size: 7,
            modified: None,
        };
        assert!(long_line(&entry).contains("Jan  1 00:00"));
    }
}
