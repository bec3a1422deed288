use thiserror::Error;

use crate::reply::Reply;

/// Command-level failures, grouped by the reply-code class they map to.
///
/// Every variant converts to exactly one control-channel reply; none of
/// them terminate the control connection on their own.
#[derive(Debug, Error)]
pub enum FtpError {
    #[error("Syntax error in parameters or arguments.")]
    MissingArgument,

    #[error("Syntax error in parameters or arguments: {0}.")]
    BadArgument(String),

    #[error("Command not implemented.")]
    NotImplemented,

    #[error("Command not implemented for that parameter: {0}.")]
    ParameterNotImplemented(String),

    #[error("Bad sequence of commands.")]
    BadSequence,

    #[error("Not logged in.")]
    NotAuthenticated,

    #[error("Authentication failed: {0}.")]
    AuthRejected(String),

    #[error("Service not available: {0}.")]
    ServiceUnavailable(String),

    #[error("Cannot open data connection: {0}.")]
    DataConnection(String),

    #[error("Extended address is not parsable: {0}.")]
    ExtendedAddress(String),

    #[error("Requested action not taken: {0}.")]
    ActionNotTaken(String),

    #[error("Requested action not taken: {0}.")]
    Io(#[from] std::io::Error),
}

impl FtpError {
    pub fn reply_code(&self) -> u16 {
        match self {
            FtpError::MissingArgument | FtpError::BadArgument(_) => 501,
            FtpError::NotImplemented => 502,
            FtpError::ParameterNotImplemented(_) => 504,
            FtpError::BadSequence => 503,
            FtpError::NotAuthenticated | FtpError::AuthRejected(_) => 530,
            FtpError::ServiceUnavailable(_) => 421,
            FtpError::DataConnection(_) => 425,
            FtpError::ExtendedAddress(_) => 522,
            FtpError::ActionNotTaken(_) | FtpError::Io(_) => 550,
        }
    }

    pub fn to_reply(&self) -> Reply {
        Reply::new(self.reply_code(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_map_to_their_reply_class() {
        assert_eq!(FtpError::MissingArgument.reply_code(), 501);
        assert_eq!(FtpError::NotImplemented.reply_code(), 502);
        assert_eq!(FtpError::BadSequence.reply_code(), 503);
        assert_eq!(
            FtpError::ParameterNotImplemented("E".into()).reply_code(),
            504
        );
        assert_eq!(FtpError::NotAuthenticated.reply_code(), 530);
        assert_eq!(FtpError::DataConnection("x".into()).reply_code(), 425);
        assert_eq!(FtpError::ExtendedAddress("x".into()).reply_code(), 522);
        assert_eq!(FtpError::ActionNotTaken("x".into()).reply_code(), 550);
    }

    #[test]
    fn provider_io_faults_surface_as_5xx() {
        let err = FtpError::from(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        assert_eq!(err.reply_code(), 550);
        assert!(err.to_reply().encode().starts_with("550 "));
    }
}
