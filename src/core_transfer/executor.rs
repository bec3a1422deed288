use log::{error, info};
use std::path::PathBuf;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

use crate::core_throttle::BandwidthLimiter;
use crate::core_transfer::transfer::Transfer;

/// What moves over the data channel.
#[derive(Debug)]
pub enum TransferPayload {
    /// Pre-computed listing text, written out and done.
    Listing(String),
    /// File content streamed to the peer (RETR).
    SendFile { path: PathBuf },
    /// Bytes accepted from the peer until end-of-stream (STOR/APPE/STOU).
    ReceiveFile { path: PathBuf, append: bool },
}

/// Runs one transfer to completion on its own task and hands the finalized
/// `Transfer` back through the returned receiver. The control session sends
/// its early reply first, then awaits this receiver for the final one, so
/// exactly one terminal status reaches the session.
pub fn spawn_transfer(
    mut transfer: Transfer,
    stream: TcpStream,
    payload: TransferPayload,
    limiter: BandwidthLimiter,
    buffer_size: usize,
) -> oneshot::Receiver<Transfer> {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        limiter.on_connect("data");
        run_transfer(&mut transfer, stream, payload, &limiter, buffer_size).await;
        limiter.on_close();
        debug_assert!(transfer.is_finalized());
        // Receiver gone means the control session died; nothing to report to.
        let _ = tx.send(transfer);
    });
    rx
}

async fn run_transfer(
    transfer: &mut Transfer,
    mut stream: TcpStream,
    payload: TransferPayload,
    limiter: &BandwidthLimiter,
    buffer_size: usize,
) {
    match payload {
        TransferPayload::Listing(text) => {
            limiter.on_write_msg(text.as_str()).await;
            match stream.write_all(text.as_bytes()).await {
                Ok(()) => {
                    transfer.add_bytes(text.len() as u64);
                    let _ = stream.shutdown().await;
                    transfer.finalize_success();
                }
                Err(e) => {
                    error!("Failed to write listing: {}", e);
                    transfer.finalize_failure(format!("listing write failed: {}", e));
                }
            }
        }
        TransferPayload::SendFile { path } => {
            send_file(transfer, &mut stream, &path, limiter, buffer_size).await;
        }
        TransferPayload::ReceiveFile { path, append } => {
            receive_file(transfer, &mut stream, &path, append, limiter, buffer_size).await;
        }
    }
    info!(
        "Transfer {} {} finished: {:?} after {} bytes",
        transfer.verb(),
        transfer.path(),
        transfer.status(),
        transfer.bytes()
    );
}

/// Streams the whole file to the peer. A peer that closes the data channel
/// before everything is written is a failure; once the last byte is out,
/// the transfer is complete.
async fn send_file(
    transfer: &mut Transfer,
    stream: &mut TcpStream,
    path: &PathBuf,
    limiter: &BandwidthLimiter,
    buffer_size: usize,
) {
    let mut file = match File::open(path).await {
        Ok(f) => f,
        Err(e) => {
            error!("Failed to open {:?}: {}", path, e);
            transfer.finalize_failure(format!("open failed: {}", e));
            return;
        }
    };
    let mut buffer = vec![0u8; buffer_size];
    loop {
        let n = match file.read(&mut buffer).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                transfer.finalize_failure(format!("file read failed: {}", e));
                return;
            }
        };
        limiter.on_write(n as u64).await;
        if let Err(e) = stream.write_all(&buffer[..n]).await {
            transfer.finalize_failure(format!("peer closed data channel early: {}", e));
            return;
        }
        transfer.add_bytes(n as u64);
    }
    let _ = stream.shutdown().await;
    transfer.finalize_success();
}

/// Accepts bytes until the peer signals end-of-stream. Success is reported
/// only on an explicit end-of-stream; a mid-transfer disconnect is a
/// failure even if bytes already landed on disk.
async fn receive_file(
    transfer: &mut Transfer,
    stream: &mut TcpStream,
    path: &PathBuf,
    append: bool,
    limiter: &BandwidthLimiter,
    buffer_size: usize,
) {
    let open_result = if append {
        OpenOptions::new().append(true).create(true).open(path).await
    } else {
        File::create(path).await
    };
    let mut file = match open_result {
        Ok(f) => f,
        Err(e) => {
            error!("Failed to create {:?}: {}", path, e);
            transfer.finalize_failure(format!("create failed: {}", e));
            return;
        }
    };
    let mut buffer = vec![0u8; buffer_size];
    loop {
        let n = match stream.read(&mut buffer).await {
            Ok(0) => break, // explicit end-of-stream
            Ok(n) => n,
            Err(e) => {
                transfer.finalize_failure(format!("data channel broke mid-transfer: {}", e));
                return;
            }
        };
        limiter.on_read(n as u64).await;
        if let Err(e) = file.write_all(&buffer[..n]).await {
            transfer.finalize_failure(format!("file write failed: {}", e));
            return;
        }
        transfer.add_bytes(n as u64);
    }
    if let Err(e) = file.flush().await {
        transfer.finalize_failure(format!("file flush failed: {}", e));
        return;
    }
    transfer.finalize_success();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_ftpcommand::ftpcommand::FtpCommand;
    use crate::core_transfer::transfer::TransferStatus;
    use tokio::net::TcpListener;

    async fn socket_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = tokio::spawn(async move { TcpStream::connect(addr).await.unwrap() });
        let (server, _) = listener.accept().await.unwrap();
        (server, client.await.unwrap())
    }

    fn scratch_file(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("oxidftpd-xfer-{}-{}", tag, std::process::id()))
    }

    #[tokio::test]
    async fn listing_transfer_writes_everything_and_succeeds() {
        let (server, mut client) = socket_pair().await;
        let transfer = Transfer::new(FtpCommand::LIST, "/");
        let rx = spawn_transfer(
            transfer,
            server,
            TransferPayload::Listing("a.txt\r\nb.txt\r\n".to_string()),
            BandwidthLimiter::default(),
            8192,
        );
        let mut received = String::new();
        client.read_to_string(&mut received).await.unwrap();
        assert_eq!(received, "a.txt\r\nb.txt\r\n");
        let done = rx.await.unwrap();
        assert_eq!(done.status(), &TransferStatus::Success);
        assert_eq!(done.bytes(), 14);
    }

    #[tokio::test]
    async fn store_succeeds_only_on_explicit_end_of_stream() {
        let path = scratch_file("stor-ok");
        let (server, mut client) = socket_pair().await;
        let rx = spawn_transfer(
            Transfer::new(FtpCommand::STOR, "/up.bin"),
            server,
            TransferPayload::ReceiveFile {
                path: path.clone(),
                append: false,
            },
            BandwidthLimiter::default(),
            8192,
        );
        client.write_all(b"payload bytes").await.unwrap();
        client.shutdown().await.unwrap();
        let done = rx.await.unwrap();
        assert_eq!(done.status(), &TransferStatus::Success);
        assert_eq!(done.bytes(), 13);
        assert_eq!(std::fs::read(&path).unwrap(), b"payload bytes");
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn store_reports_failure_on_mid_transfer_disconnect() {
        let path = scratch_file("stor-abort");
        let (server, client) = socket_pair().await;
        let rx = spawn_transfer(
            Transfer::new(FtpCommand::STOR, "/up.bin"),
            server,
            TransferPayload::ReceiveFile {
                path: path.clone(),
                append: false,
            },
            BandwidthLimiter::default(),
            8192,
        );
        // RST instead of an orderly shutdown.
        client.set_linger(Some(std::time::Duration::ZERO)).unwrap();
        drop(client);
        let done = rx.await.unwrap();
        assert!(matches!(done.status(), TransferStatus::Failure(_)));
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn retrieve_streams_the_whole_file() {
        let path = scratch_file("retr");
        std::fs::write(&path, b"file body").unwrap();
        let (server, mut client) = socket_pair().await;
        let rx = spawn_transfer(
            Transfer::new(FtpCommand::RETR, "/file.bin"),
            server,
            TransferPayload::SendFile { path: path.clone() },
            BandwidthLimiter::default(),
            8192,
        );
        let mut received = Vec::new();
        client.read_to_end(&mut received).await.unwrap();
        assert_eq!(received, b"file body");
        let done = rx.await.unwrap();
        assert_eq!(done.status(), &TransferStatus::Success);
        assert_eq!(done.bytes(), 9);
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn append_extends_the_existing_file() {
        let path = scratch_file("appe");
        std::fs::write(&path, b"first;").unwrap();
        let (server, mut client) = socket_pair().await;
        let rx = spawn_transfer(
            Transfer::new(FtpCommand::APPE, "/log.txt"),
            server,
            TransferPayload::ReceiveFile {
                path: path.clone(),
                append: true,
            },
            BandwidthLimiter::default(),
            8192,
        );
        client.write_all(b"second").await.unwrap();
        client.shutdown().await.unwrap();
        let done = rx.await.unwrap();
        assert_eq!(done.status(), &TransferStatus::Success);
        assert_eq!(std::fs::read(&path).unwrap(), b"first;second");
        let _ = std::fs::remove_file(path);
    }
}
