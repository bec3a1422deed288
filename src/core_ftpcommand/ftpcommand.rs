#[derive(Eq, Hash, PartialEq, Debug, Clone, Copy)]
pub enum FtpCommand {
    USER,
    PASS,
    ACCT,
    REIN,
    QUIT,
    NOOP,
    SYST,
    HELP,
    FEAT,
    OPTS,
    TYPE,
    STRU,
    PWD,
    CWD,
    CDUP,
    PORT,
    EPRT,
    PASV,
    EPSV,
    LIST,
    NLST,
    MLSD,
    MLST,
    SIZE,
    MDTM,
    XCRC,
    XMD5,
    XSHA1,
    RETR,
    STOR,
    APPE,
    STOU,
}

impl FtpCommand {
    pub fn from_str(cmd: &str) -> Option<FtpCommand> {
        match cmd.to_ascii_uppercase().as_str() {
            "USER" => Some(FtpCommand::USER),
            "PASS" => Some(FtpCommand::PASS),
            "ACCT" => Some(FtpCommand::ACCT),
            "REIN" => Some(FtpCommand::REIN),
            "QUIT" => Some(FtpCommand::QUIT),
            "NOOP" => Some(FtpCommand::NOOP),
            "SYST" => Some(FtpCommand::SYST),
            "HELP" => Some(FtpCommand::HELP),
            "FEAT" => Some(FtpCommand::FEAT),
            "OPTS" => Some(FtpCommand::OPTS),
            "TYPE" => Some(FtpCommand::TYPE),
            "STRU" => Some(FtpCommand::STRU),
            "PWD" | "XPWD" => Some(FtpCommand::PWD),
            "CWD" => Some(FtpCommand::CWD),
            "CDUP" => Some(FtpCommand::CDUP),
            "PORT" => Some(FtpCommand::PORT),
            "EPRT" => Some(FtpCommand::EPRT),
            "PASV" => Some(FtpCommand::PASV),
            "EPSV" => Some(FtpCommand::EPSV),
            "LIST" => Some(FtpCommand::LIST),
            "NLST" => Some(FtpCommand::NLST),
            "MLSD" => Some(FtpCommand::MLSD),
            "MLST" => Some(FtpCommand::MLST),
            "SIZE" => Some(FtpCommand::SIZE),
            "MDTM" => Some(FtpCommand::MDTM),
            "XCRC" => Some(FtpCommand::XCRC),
            "XMD5" => Some(FtpCommand::XMD5),
            "XSHA1" => Some(FtpCommand::XSHA1),
            "RETR" => Some(FtpCommand::RETR),
            "STOR" => Some(FtpCommand::STOR),
            "APPE" => Some(FtpCommand::APPE),
            "STOU" => Some(FtpCommand::STOU),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FtpCommand::USER => "USER",
            FtpCommand::PASS => "PASS",
            FtpCommand::ACCT => "ACCT",
            FtpCommand::REIN => "REIN",
            FtpCommand::QUIT => "QUIT",
            FtpCommand::NOOP => "NOOP",
            FtpCommand::SYST => "SYST",
            FtpCommand::HELP => "HELP",
            FtpCommand::FEAT => "FEAT",
            FtpCommand::OPTS => "OPTS",
            FtpCommand::TYPE => "TYPE",
            FtpCommand::STRU => "STRU",
            FtpCommand::PWD => "PWD",
            FtpCommand::CWD => "CWD",
            FtpCommand::CDUP => "CDUP",
            FtpCommand::PORT => "PORT",
            FtpCommand::EPRT => "EPRT",
            FtpCommand::PASV => "PASV",
            FtpCommand::EPSV => "EPSV",
            FtpCommand::LIST => "LIST",
            FtpCommand::NLST => "NLST",
            FtpCommand::MLSD => "MLSD",
            FtpCommand::MLST => "MLST",
            FtpCommand::SIZE => "SIZE",
            FtpCommand::MDTM => "MDTM",
            FtpCommand::XCRC => "XCRC",
            FtpCommand::XMD5 => "XMD5",
            FtpCommand::XSHA1 => "XSHA1",
            FtpCommand::RETR => "RETR",
            FtpCommand::STOR => "STOR",
            FtpCommand::APPE => "APPE",
            FtpCommand::STOU => "STOU",
        }
    }

    /// Verbs usable before the login handshake completes.
    pub fn allowed_before_login(&self) -> bool {
        matches!(
            self,
            FtpCommand::USER
                | FtpCommand::PASS
                | FtpCommand::ACCT
                | FtpCommand::REIN
                | FtpCommand::QUIT
                | FtpCommand::NOOP
                | FtpCommand::SYST
                | FtpCommand::HELP
                | FtpCommand::FEAT
                | FtpCommand::OPTS
        )
    }

    /// Verbs that open a data-channel transfer.
    pub fn is_transfer(&self) -> bool {
        matches!(
            self,
            FtpCommand::LIST
                | FtpCommand::NLST
                | FtpCommand::MLSD
                | FtpCommand::RETR
                | FtpCommand::STOR
                | FtpCommand::APPE
                | FtpCommand::STOU
        )
    }
}

impl std::fmt::Display for FtpCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Splits one CRLF-trimmed control line into its verb and raw argument.
/// The argument keeps internal whitespace (paths may contain spaces).
pub fn split_command_line(line: &str) -> (&str, &str) {
    let trimmed = line.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((verb, arg)) => (verb, arg.trim()),
        None => (trimmed, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbs_parse_case_insensitively() {
        assert_eq!(FtpCommand::from_str("epsv"), Some(FtpCommand::EPSV));
        assert_eq!(FtpCommand::from_str("Mlsd"), Some(FtpCommand::MLSD));
        assert_eq!(FtpCommand::from_str("BOGUS"), None);
    }

    #[test]
    fn xpwd_aliases_pwd() {
        assert_eq!(FtpCommand::from_str("XPWD"), Some(FtpCommand::PWD));
    }

    #[test]
    fn command_line_splits_verb_and_argument() {
        assert_eq!(split_command_line("RETR some file.txt"), ("RETR", "some file.txt"));
        assert_eq!(split_command_line("PASV"), ("PASV", ""));
        assert_eq!(split_command_line("  TYPE I  "), ("TYPE", "I"));
    }
}
