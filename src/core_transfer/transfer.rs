use log::warn;

use crate::core_ftpcommand::ftpcommand::FtpCommand;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferStatus {
    InProgress,
    Success,
    Failure(String),
}

/// One executed data operation. Finalized exactly once; the first terminal
/// transition wins and later ones are ignored with a warning.
#[derive(Debug)]
pub struct Transfer {
    verb: FtpCommand,
    path: String,
    status: TransferStatus,
    bytes: u64,
}

impl Transfer {
    pub fn new(verb: FtpCommand, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
            status: TransferStatus::InProgress,
            bytes: 0,
        }
    }

    pub fn verb(&self) -> FtpCommand {
        self.verb
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn status(&self) -> &TransferStatus {
        &self.status
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn add_bytes(&mut self, n: u64) {
        self.bytes += n;
    }

    pub fn is_finalized(&self) -> bool {
        self.status != TransferStatus::InProgress
    }

    pub fn finalize_success(&mut self) {
        self.finalize(TransferStatus::Success);
    }

    pub fn finalize_failure(&mut self, reason: impl Into<String>) {
        self.finalize(TransferStatus::Failure(reason.into()));
    }

    fn finalize(&mut self, status: TransferStatus) {
        if self.is_finalized() {
            warn!(
                "Ignoring second finalization of {} {} ({:?} already set)",
                self.verb, self.path, self.status
            );
            return;
        }
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_terminal_transition_wins() {
        let mut transfer = Transfer::new(FtpCommand::STOR, "/up.bin");
        assert!(!transfer.is_finalized());
        transfer.finalize_failure("peer closed early");
        transfer.finalize_success();
        assert_eq!(
            transfer.status(),
            &TransferStatus::Failure("peer closed early".into())
        );
    }

    #[test]
    fn byte_count_accumulates() {
        let mut transfer = Transfer::new(FtpCommand::RETR, "/file.bin");
        transfer.add_bytes(4096);
        transfer.add_bytes(100);
        assert_eq!(transfer.bytes(), 4196);
    }
}
