use std::net::{IpAddr, SocketAddr};

use crate::core_error::FtpError;

/// Decodes an RFC 2428 extended address, `|protocol|address|port|` with
/// protocol 1 = IPv4 and 2 = IPv6. Every malformed shape (wrong delimiter
/// count, unsupported protocol, unparsable address or port) is the same
/// rejection class, distinct from a missing argument.
pub fn parse_extended_address(arg: &str) -> Result<SocketAddr, FtpError> {
    let mut chars = arg.chars();
    let delimiter = chars
        .next()
        .ok_or_else(|| FtpError::ExtendedAddress("empty address".into()))?;
    let parts: Vec<&str> = arg.split(delimiter).collect();
    // "|1|127.0.0.1|2100|" splits into ["", "1", "127.0.0.1", "2100", ""].
    if parts.len() != 5 || !parts[0].is_empty() || !parts[4].is_empty() {
        return Err(FtpError::ExtendedAddress(format!(
            "expected |protocol|address|port|, got {}",
            arg
        )));
    }

    let ip: IpAddr = match parts[1] {
        "1" => parts[2]
            .parse::<std::net::Ipv4Addr>()
            .map(IpAddr::V4)
            .map_err(|_| FtpError::ExtendedAddress(format!("bad IPv4 address {}", parts[2])))?,
        "2" => parts[2]
            .parse::<std::net::Ipv6Addr>()
            .map(IpAddr::V6)
            .map_err(|_| FtpError::ExtendedAddress(format!("bad IPv6 address {}", parts[2])))?,
        other => {
            return Err(FtpError::ExtendedAddress(format!(
                "unsupported protocol {}",
                other
            )))
        }
    };

    let port: u16 = parts[3]
        .parse()
        .map_err(|_| FtpError::ExtendedAddress(format!("bad port {}", parts[3])))?;
    if port == 0 {
        return Err(FtpError::ExtendedAddress("port 0 not usable".into()));
    }

    Ok(SocketAddr::new(ip, port))
}

/// EPSV reply body: only the port travels, the client reuses the control
/// channel's address.
pub fn encode_extended_passive(port: u16) -> String {
    format!("(|||{}|)", port)
}

/// Legacy PASV encoding: four address octets plus the port split into two
/// bytes. IPv4 only.
pub fn encode_passive(addr: SocketAddr) -> Result<String, FtpError> {
    match addr.ip() {
        IpAddr::V4(ip) => {
            let octets = ip.octets();
            let port = addr.port();
            Ok(format!(
                "{},{},{},{},{},{}",
                octets[0],
                octets[1],
                octets[2],
                octets[3],
                port / 256,
                port % 256
            ))
        }
        IpAddr::V6(_) => Err(FtpError::ParameterNotImplemented(
            "PASV over IPv6; use EPSV".into(),
        )),
    }
}

/// Decodes the PORT argument, `h1,h2,h3,h4,p1,p2`.
pub fn parse_port_address(arg: &str) -> Result<SocketAddr, FtpError> {
    let parts: Vec<&str> = arg.split(',').map(str::trim).collect();
    if parts.len() != 6 {
        return Err(FtpError::BadArgument(format!(
            "expected h1,h2,h3,h4,p1,p2, got {}",
            arg
        )));
    }
    let mut numbers = [0u8; 6];
    for (i, part) in parts.iter().enumerate() {
        numbers[i] = part
            .parse()
            .map_err(|_| FtpError::BadArgument(format!("bad PORT octet {}", part)))?;
    }
    let ip = std::net::Ipv4Addr::new(numbers[0], numbers[1], numbers[2], numbers[3]);
    let port = u16::from(numbers[4]) * 256 + u16::from(numbers[5]);
    if port == 0 {
        return Err(FtpError::BadArgument("port 0 not usable".into()));
    }
    Ok(SocketAddr::new(IpAddr::V4(ip), port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv4_extended_address_parses() {
        let addr = parse_extended_address("|1|127.0.0.1|2100|").unwrap();
        assert_eq!(addr, "127.0.0.1:2100".parse().unwrap());
    }

    #[test]
    fn ipv6_extended_address_parses() {
        let addr = parse_extended_address("|2|::1|6446|").unwrap();
        assert_eq!(addr, "[::1]:6446".parse().unwrap());
    }

    #[test]
    fn malformed_extended_addresses_are_one_rejection_class() {
        for bad in [
            "|1|127.0.0.1|2100",   // missing trailing delimiter
            "|1|127.0.0.1|",       // missing port field
            "|1|127.0.0.1|abc|",   // non-numeric port
            "|3|127.0.0.1|2100|",  // unsupported protocol
            "|2|127.0.0.1|2100|",  // protocol/address mismatch
            "|1|127.0.0.1|0|",     // unusable port
            "",
        ] {
            let err = parse_extended_address(bad).unwrap_err();
            assert_eq!(err.reply_code(), 522, "input {:?}", bad);
        }
    }

    #[test]
    fn extended_passive_reply_embeds_only_the_port() {
        assert_eq!(encode_extended_passive(2100), "(|||2100|)");
    }

    #[test]
    fn passive_encoding_splits_the_port_into_two_bytes() {
        let encoded = encode_passive("192.168.1.2:2122".parse().unwrap()).unwrap();
        assert_eq!(encoded, "192,168,1,2,8,74");
    }

    #[test]
    fn port_argument_round_trips() {
        let addr = parse_port_address("192,168,1,2,8,74").unwrap();
        assert_eq!(addr, "192.168.1.2:2122".parse().unwrap());
        assert!(parse_port_address("192,168,1,2,8").is_err());
        assert!(parse_port_address("192,168,1,2,8,x").is_err());
    }
}
