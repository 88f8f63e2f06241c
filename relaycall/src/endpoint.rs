use crate::InvalidEndpoint;
use std::{
    fmt,
    net::{IpAddr, Ipv6Addr},
    str::FromStr,
};

/// Defines the address of a gRPC target with a `host` and a `port`.
///
/// The target is usually a reverse proxy in front of the real service, but
/// nothing in this crate distinguishes a proxied address from a direct one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// A domain name or an IP literal.
    host: String,
    /// The target port.
    port: u16,
}

impl Endpoint {
    /// Create an [`Endpoint`] from a valid `host` and `port`.
    ///
    /// This function will fail if the `host` is neither an IP literal nor a valid
    /// domain name, or if `port` is zero.
    pub fn from_parts<T: ToString>(host: T, port: u16) -> Result<Self, InvalidEndpoint> {
        let host = host.to_string();
        let input = || format!("{}:{}", host, port);

        if port == 0 {
            return Err(InvalidEndpoint::new(input(), "port must be non-zero"));
        }

        // Accept `[::1]` as well as the bare literal.
        let unbracketed = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(&host);
        if let Ok(ip) = unbracketed.parse::<IpAddr>() {
            return Ok(Self {
                host: ip.to_string(),
                port,
            });
        }

        validate_hostname(&host).map_err(|reason| InvalidEndpoint::new(input(), reason))?;

        Ok(Self { host, port })
    }

    /// Get the `host` part of an `Endpoint`.
    ///
    /// IPv6 literals are returned without brackets.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Get the `port` part of an `Endpoint`.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The `http://` uri tonic connects to.
    pub fn uri(&self) -> String {
        format!("http://{}", self)
    }
}

fn validate_hostname(host: &str) -> Result<(), String> {
    if host.is_empty() {
        return Err("empty host".to_string());
    }

    if let Some(c) = host
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_')))
    {
        return Err(format!("invalid character {:?} in host", c));
    }

    hickory_resolver::Name::from_ascii(host)
        .map(|_| ())
        .map_err(|err| format!("invalid host: {}", err))
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.parse::<Ipv6Addr>().is_ok() {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// ```
/// let endpoint: relaycall::Endpoint = "nginx:8080".parse().unwrap();
/// assert_eq!(endpoint.host(), "nginx");
/// assert_eq!(endpoint.port(), 8080);
///
/// assert!("nginx:80a".parse::<relaycall::Endpoint>().is_err());
/// ```
impl FromStr for Endpoint {
    type Err = InvalidEndpoint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| InvalidEndpoint::new(s, "expected `host:port`"))?;

        if host.contains(':') && !host.starts_with('[') {
            return Err(InvalidEndpoint::new(
                s,
                "IPv6 addresses must be enclosed in brackets",
            ));
        }

        if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidEndpoint::new(s, "port must be decimal digits only"));
        }

        let port = port
            .parse::<u16>()
            .map_err(|err| InvalidEndpoint::new(s, format!("invalid port: {}", err)))?;

        Self::from_parts(host, port)
    }
}

impl TryFrom<&str> for Endpoint {
    type Error = InvalidEndpoint;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl TryFrom<String> for Endpoint {
    type Error = InvalidEndpoint;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// ```
/// let endpoint = relaycall::Endpoint::try_from(("localhost", 8090)).unwrap();
/// assert_eq!(endpoint.host(), "localhost");
/// assert_eq!(endpoint.port(), 8090);
/// ```
impl TryFrom<(&str, u16)> for Endpoint {
    type Error = InvalidEndpoint;

    fn try_from((host, port): (&str, u16)) -> Result<Self, Self::Error> {
        Self::from_parts(host, port)
    }
}

/// ```
/// let endpoint = relaycall::Endpoint::try_from((String::from("localhost"), 8090)).unwrap();
/// assert_eq!(endpoint.host(), "localhost");
/// assert_eq!(endpoint.port(), 8090);
/// ```
impl TryFrom<(String, u16)> for Endpoint {
    type Error = InvalidEndpoint;

    fn try_from((host, port): (String, u16)) -> Result<Self, Self::Error> {
        Self::from_parts(host, port)
    }
}
