/// A control-channel reply: a three-digit code plus one or more text lines.
///
/// Single-line replies render as `NNN text\r\n`. Multi-line replies use the
/// RFC 959 continuation form: `NNN-first`, bare middle lines, `NNN last`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    code: u16,
    lines: Vec<String>,
}

impl Reply {
    pub fn new(code: u16, text: impl Into<String>) -> Self {
        Self {
            code,
            lines: vec![text.into()],
        }
    }

    /// Builds a multi-line reply. `lines` must hold at least the opening
    /// and closing line; anything in between is emitted verbatim.
    pub fn multiline(code: u16, lines: Vec<String>) -> Self {
        debug_assert!(lines.len() >= 2);
        Self { code, lines }
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn encode(&self) -> String {
        if self.lines.len() == 1 {
            return format!("{} {}\r\n", self.code, self.lines[0]);
        }
        let mut out = String::new();
        let last = self.lines.len() - 1;
        for (i, line) in self.lines.iter().enumerate() {
            if i == 0 {
                out.push_str(&format!("{}-{}\r\n", self.code, line));
            } else if i == last {
                out.push_str(&format!("{} {}\r\n", self.code, line));
            } else {
                out.push_str(line);
                out.push_str("\r\n");
            }
        }
        out
    }
}

impl std::fmt::Display for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.code, self.lines.last().map(String::as_str).unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_encoding() {
        let reply = Reply::new(200, "Command okay.");
        assert_eq!(reply.encode(), "200 Command okay.\r\n");
    }

    #[test]
    fn multiline_encoding_uses_continuation_form() {
        let reply = Reply::multiline(
            211,
            vec![
                "Extensions supported:".to_string(),
                " EPRT".to_string(),
                " EPSV".to_string(),
                "End".to_string(),
            ],
        );
        assert_eq!(
            reply.encode(),
            "211-Extensions supported:\r\n EPRT\r\n EPSV\r\n211 End\r\n"
        );
    }
}
