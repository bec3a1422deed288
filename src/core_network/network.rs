use anyhow::Result;
use log::{debug, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

use crate::config::Config;
use crate::constants::MAX_COMMAND_LENGTH;
use crate::core_auth::Authenticator;
use crate::core_fs::FileSystem;
use crate::core_ftpcommand::ftpcommand::{split_command_line, FtpCommand};
use crate::core_ftpcommand::{handlers, CommandContext, CommandOutcome};
use crate::core_network::registry::DataConnectionRegistry;
use crate::core_throttle::{BandwidthLimiter, ThroughputMonitor};
use crate::core_transfer::TransferStatus;
use crate::hooks::FtpHooks;
use crate::reply::Reply;
use crate::session::Session;

/// Shared collaborators handed to every control connection.
#[derive(Clone)]
pub struct SessionDeps {
    pub config: Arc<Config>,
    pub registry: Arc<DataConnectionRegistry>,
    pub fs: Arc<dyn FileSystem>,
    pub auth: Arc<dyn Authenticator>,
    pub hooks: Arc<dyn FtpHooks>,
    pub global_monitor: Option<Arc<ThroughputMonitor>>,
}

/// Accept loop: one spawned task per control connection.
pub async fn serve(listener: TcpListener, deps: SessionDeps) -> Result<()> {
    loop {
        let (socket, peer) = listener.accept().await?;
        info!("New control connection from {}", peer);
        let deps = deps.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, peer, deps).await {
                warn!("Session {} ended with error: {}", peer, e);
            }
            info!("Control connection closed for {}", peer);
        });
    }
}

/// Drives one control connection: greeting, then the read/dispatch/reply
/// loop until QUIT, end-of-stream, or idle timeout. All replies are written
/// here, never by command handlers, so reply ordering is single-sourced.
///
/// Teardown (passive registration release, limiter stop) runs on every exit
/// path, including a reply write that fails mid-session.
pub async fn handle_connection(
    socket: TcpStream,
    peer: SocketAddr,
    deps: SessionDeps,
) -> Result<()> {
    let local = socket.local_addr()?;
    let (read_half, mut write_half) = socket.into_split();
    let mut reader = BufReader::new(read_half);
    let mut session = Session::new(peer, local, deps.config.server.tls_capable);
    let limiter = BandwidthLimiter::for_channel(
        deps.config.bandwidth.session_rate,
        deps.global_monitor.clone(),
    );
    limiter.on_connect("control");

    let result = command_loop(&mut reader, &mut write_half, &limiter, &mut session, &deps).await;

    session.discard_data_conn(&deps.registry);
    deps.registry.remove_owner(peer);
    limiter.on_close();
    result
}

async fn command_loop(
    reader: &mut BufReader<OwnedReadHalf>,
    writer: &mut OwnedWriteHalf,
    limiter: &BandwidthLimiter,
    session: &mut Session,
    deps: &SessionDeps,
) -> Result<()> {
    let peer = session.peer;
    let greeting = Reply::new(220, deps.config.server.greeting.clone());
    write_reply(writer, limiter, session, &greeting).await?;

    let idle = Duration::from_secs(deps.config.server.idle_timeout_secs);
    loop {
        let text = match timeout(idle, read_command_line(reader)).await {
            Err(_) => {
                let bye = Reply::new(421, "Idle timeout; closing control connection.");
                let _ = write_reply(writer, limiter, session, &bye).await;
                break;
            }
            Ok(Ok(LineRead::Eof)) => break,
            Ok(Ok(LineRead::TooLong(read))) => {
                limiter.on_read(read as u64).await;
                let reply = Reply::new(500, "Command line too long.");
                write_reply(writer, limiter, session, &reply).await?;
                continue;
            }
            Ok(Ok(LineRead::Line(text, read))) => {
                limiter.on_read(read as u64).await;
                text
            }
            Ok(Err(e)) => {
                warn!("Control read from {} failed: {}", peer, e);
                break;
            }
        };

        let (verb_str, arg) = split_command_line(&text);
        if verb_str.is_empty() {
            continue;
        }
        let Some(verb) = FtpCommand::from_str(verb_str) else {
            debug!("{} sent unrecognized command {}", peer, verb_str);
            let reply = Reply::new(500, "Syntax error, command unrecognized.");
            write_reply(writer, limiter, session, &reply).await?;
            continue;
        };
        // The PASS argument never reaches the log.
        if verb == FtpCommand::PASS {
            debug!("{} -> PASS", peer);
        } else {
            debug!("{} -> {} {}", peer, verb, arg);
        }

        let result = {
            let mut ctx = CommandContext {
                config: &deps.config,
                session: &mut *session,
                registry: &deps.registry,
                fs: &deps.fs,
                auth: &deps.auth,
                hooks: &deps.hooks,
                global_monitor: &deps.global_monitor,
            };
            handlers::dispatch(&mut ctx, verb, arg).await
        };
        match result {
            Ok(CommandOutcome::Reply(reply)) => {
                write_reply(writer, limiter, session, &reply).await?;
            }
            Ok(CommandOutcome::Quit(reply)) => {
                write_reply(writer, limiter, session, &reply).await?;
                break;
            }
            Ok(CommandOutcome::Transfer { early, done }) => {
                write_reply(writer, limiter, session, &early).await?;
                // No further commands are read until the transfer settles,
                // so the early/final pair can never interleave.
                let finished = match done.await {
                    Ok(t) => t,
                    Err(_) => {
                        let reply = Reply::new(421, "Transfer worker failed.");
                        write_reply(writer, limiter, session, &reply).await?;
                        continue;
                    }
                };
                deps.hooks.after_transfer_done(&finished);
                let reply = match finished.status() {
                    TransferStatus::Failure(reason) => {
                        Reply::new(550, format!("Transfer failed: {}.", reason))
                    }
                    _ => Reply::new(
                        226,
                        format!("Transfer complete ({} bytes).", finished.bytes()),
                    ),
                };
                write_reply(writer, limiter, session, &reply).await?;
            }
            Err(error) => {
                debug!("{} {} rejected: {}", peer, verb, error);
                write_reply(writer, limiter, session, &error.to_reply()).await?;
            }
        }
    }
    Ok(())
}

/// One control line off the wire, with the raw byte count for throughput
/// accounting.
#[derive(Debug)]
enum LineRead {
    Line(String, usize),
    /// The line exceeded the command-length cap. Its bytes were consumed
    /// up to the next LF but never buffered.
    TooLong(usize),
    Eof,
}

/// Reads one LF-terminated line without ever holding more than the
/// command-length cap in memory. An oversized line is drained to its
/// terminator and reported as such, so the session keeps parsing at the
/// next line no matter how much the peer streams.
async fn read_command_line<R>(reader: &mut R) -> std::io::Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    let mut line: Vec<u8> = Vec::new();
    let mut read = 0usize;
    let mut overflow = false;
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            // End-of-stream; an unterminated partial line still counts.
            return Ok(if overflow {
                LineRead::TooLong(read)
            } else if line.is_empty() {
                LineRead::Eof
            } else {
                LineRead::Line(String::from_utf8_lossy(&line).into_owned(), read)
            });
        }
        let (take, terminated) = match available.iter().position(|&b| b == b'\n') {
            Some(pos) => (pos + 1, true),
            None => (available.len(), false),
        };
        if !overflow {
            if line.len() + take > MAX_COMMAND_LENGTH {
                overflow = true;
                line = Vec::new();
            } else {
                line.extend_from_slice(&available[..take]);
            }
        }
        reader.consume(take);
        read += take;
        if terminated {
            return Ok(if overflow {
                LineRead::TooLong(read)
            } else {
                LineRead::Line(String::from_utf8_lossy(&line).into_owned(), read)
            });
        }
    }
}

/// Encodes and writes one reply, charging the control channel's limiter
/// and recording the code on the session.
async fn write_reply(
    writer: &mut OwnedWriteHalf,
    limiter: &BandwidthLimiter,
    session: &mut Session,
    reply: &Reply,
) -> std::io::Result<()> {
    let encoded = reply.encode();
    limiter.on_write_msg(encoded.as_str()).await;
    writer.write_all(encoded.as_bytes()).await?;
    writer.flush().await?;
    session.last_reply_code = reply.code();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn short_lines_pass_through_with_their_byte_count() {
        let mut reader = BufReader::new(&b"NOOP\r\nSYST\r\n"[..]);
        match read_command_line(&mut reader).await.unwrap() {
            LineRead::Line(text, read) => {
                assert_eq!(text.trim(), "NOOP");
                assert_eq!(read, 6);
            }
            other => panic!("unexpected {:?}", other),
        }
        match read_command_line(&mut reader).await.unwrap() {
            LineRead::Line(text, _) => assert_eq!(text.trim(), "SYST"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            read_command_line(&mut reader).await.unwrap(),
            LineRead::Eof
        ));
    }

    #[tokio::test]
    async fn an_unterminated_trailing_line_is_still_delivered() {
        let mut reader = BufReader::new(&b"QUIT"[..]);
        match read_command_line(&mut reader).await.unwrap() {
            LineRead::Line(text, read) => {
                assert_eq!(text, "QUIT");
                assert_eq!(read, 4);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn oversized_lines_are_drained_without_being_buffered() {
        // A megabyte of newline-free bytes, then a terminator and a
        // normal command.
        let mut payload = vec![b'x'; 1024 * 1024];
        payload.push(b'\n');
        payload.extend_from_slice(b"SYST\r\n");
        let mut reader = BufReader::new(payload.as_slice());
        match read_command_line(&mut reader).await.unwrap() {
            LineRead::TooLong(read) => assert_eq!(read, 1024 * 1024 + 1),
            other => panic!("unexpected {:?}", other),
        }
        match read_command_line(&mut reader).await.unwrap() {
            LineRead::Line(text, _) => assert_eq!(text.trim(), "SYST"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn oversized_line_ending_in_eof_is_reported_too_long() {
        let payload = vec![b'x'; MAX_COMMAND_LENGTH * 3];
        let mut reader = BufReader::new(payload.as_slice());
        match read_command_line(&mut reader).await.unwrap() {
            LineRead::TooLong(read) => assert_eq!(read, MAX_COMMAND_LENGTH * 3),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn a_line_exactly_at_the_cap_is_accepted() {
        let mut payload = vec![b'a'; MAX_COMMAND_LENGTH - 1];
        payload.push(b'\n');
        let mut reader = BufReader::new(payload.as_slice());
        assert!(matches!(
            read_command_line(&mut reader).await.unwrap(),
            LineRead::Line(_, _)
        ));

        let mut payload = vec![b'a'; MAX_COMMAND_LENGTH];
        payload.push(b'\n');
        let mut reader = BufReader::new(payload.as_slice());
        assert!(matches!(
            read_command_line(&mut reader).await.unwrap(),
            LineRead::TooLong(_)
        ));
    }
}
