use std::net::{IpAddr, SocketAddr};

/// Information about the peer that sent a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientInfo<'a> {
    remote_addr: Option<&'a str>,
    user_agent: Option<&'a str>,
}

impl<'a> ClientInfo<'a> {
    pub(crate) fn new(remote_addr: Option<&'a str>, user_agent: Option<&'a str>) -> Self {
        Self {
            remote_addr,
            user_agent,
        }
    }

    /// Remote address as reported by the transport, or `""`.
    #[must_use]
    pub fn ip_string(&self) -> &'a str {
        self.remote_addr.unwrap_or("")
    }

    /// `User-Agent` header, or `""`.
    #[must_use]
    pub fn user_agent(&self) -> &'a str {
        self.user_agent.unwrap_or("")
    }

    /// Parsed remote address.
    ///
    /// Accepts a bare address or `addr:port`. IPv4-mapped IPv6 addresses are
    /// reported as IPv4. Unparseable input yields `None`.
    #[must_use]
    pub fn ip(&self) -> Option<IpAddr> {
        let raw = self.remote_addr?.trim();
        raw.parse::<IpAddr>()
            .or_else(|_| raw.parse::<SocketAddr>().map(|sa| sa.ip()))
            .ok()
            .map(|ip| ip.to_canonical())
    }
}
