use std::fmt::{self, Display};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Unsupported protocol number: {0}")]
    UnsupportedProtocol(u8),
}

/// IPヘッダーの上位プロトコル番号
///
/// ICMP Echoの送受信で現れるものに限定している
///
/// 参照:
/// - [IANA Protocol Numbers](https://www.iana.org/assignments/protocol-numbers/protocol-numbers.xhtml)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// IPv6 Hop-by-Hop Option
    /// ref: RFC8200
    HOPOPT = 0,

    /// Internet Control Message
    /// ref: RFC792
    ICMP = 1,

    /// Internet Group Management
    /// ref: RFC1112
    IGMP = 2,

    /// Transmission Control
    /// ref: RFC9293
    TCP = 6,

    /// User Datagram
    /// ref: RFC768
    UDP = 17,

    /// Routing Header for IPv6
    IPv6Route = 43,

    /// Fragment Header for IPv6
    IPv6Frag = 44,

    /// ICMP for IPv6
    /// ref: RFC4443
    IPv6ICMP = 58,

    /// No Next Header for IPv6
    IPv6NoNxt = 59,

    /// Destination Options for IPv6
    IPv6Opts = 60,
}

impl Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Protocol::HOPOPT => "HOPOPT",
            Protocol::ICMP => "ICMP",
            Protocol::IGMP => "IGMP",
            Protocol::TCP => "TCP",
            Protocol::UDP => "UDP",
            Protocol::IPv6Route => "IPv6-Route",
            Protocol::IPv6Frag => "IPv6-Frag",
            Protocol::IPv6ICMP => "IPv6-ICMP",
            Protocol::IPv6NoNxt => "IPv6-NoNxt",
            Protocol::IPv6Opts => "IPv6-Opts",
        };
        write!(f, "{name}")
    }
}

impl From<Protocol> for u8 {
    fn from(protocol: Protocol) -> Self {
        protocol as u8
    }
}

impl TryFrom<u8> for Protocol {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Protocol::HOPOPT),
            1 => Ok(Protocol::ICMP),
            2 => Ok(Protocol::IGMP),
            6 => Ok(Protocol::TCP),
            17 => Ok(Protocol::UDP),
            43 => Ok(Protocol::IPv6Route),
            44 => Ok(Protocol::IPv6Frag),
            58 => Ok(Protocol::IPv6ICMP),
            59 => Ok(Protocol::IPv6NoNxt),
            60 => Ok(Protocol::IPv6Opts),
            value => Err(ProtocolError::UnsupportedProtocol(value)),
        }
    }
}
