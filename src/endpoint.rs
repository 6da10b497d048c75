use crate::error::{ProbeError, Result};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 7575;

/// Which side of the room router protocol the probe emulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Server,
}

impl Role {
    pub fn path(self) -> &'static str {
        match self {
            Role::Client => "/client",
            Role::Server => "/server",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Role::Client => "client",
            Role::Server => "server",
        })
    }
}

impl FromStr for Role {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "client" | "/client" => Ok(Role::Client),
            "server" | "/server" => Ok(Role::Server),
            other => Err(ProbeError::Config(format!("unknown role {:?}", other))),
        }
    }
}

/// Where the probe connects. Validated on construction and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    secure: bool,
    host: String,
    port: u16,
    role: Role,
    client_id: Uuid,
    room_id: Option<u32>,
}

impl Endpoint {
    pub fn new(
        host: &str,
        port: u16,
        role: Role,
        client_id: Uuid,
        room_id: Option<u32>,
    ) -> Result<Self> {
        Self::build(false, host, port, role, client_id, room_id)
    }

    /// Same as [`Endpoint::new`] but over `wss://`.
    pub fn new_secure(
        host: &str,
        port: u16,
        role: Role,
        client_id: Uuid,
        room_id: Option<u32>,
    ) -> Result<Self> {
        Self::build(true, host, port, role, client_id, room_id)
    }

    fn build(
        secure: bool,
        host: &str,
        port: u16,
        role: Role,
        client_id: Uuid,
        room_id: Option<u32>,
    ) -> Result<Self> {
        // IPv6 literals are stored without their URL brackets
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        if host.is_empty() {
            return Err(ProbeError::Config("host is empty".to_string()));
        }
        if port == 0 {
            return Err(ProbeError::Config("port must be non-zero".to_string()));
        }
        if secure && !cfg!(feature = "tls") {
            return Err(ProbeError::Config(
                "wss endpoints need the `tls` feature".to_string(),
            ));
        }
        match (role, room_id) {
            (Role::Client, None) => {
                return Err(ProbeError::Config(
                    "client endpoints need a room_id".to_string(),
                ))
            }
            (Role::Server, Some(_)) => {
                return Err(ProbeError::Config(
                    "server endpoints do not take a room_id".to_string(),
                ))
            }
            _ => {}
        }

        Ok(Endpoint {
            secure,
            host: host.to_string(),
            port,
            role,
            client_id,
            room_id,
        })
    }

    /// Parse a full `ws://host:port/<role>?client_id=..[&room_id=..]` URL.
    pub fn parse(url: &str) -> Result<Self> {
        let uri: http::Uri = url
            .parse()
            .map_err(|e| ProbeError::Config(format!("invalid url {:?}: {}", url, e)))?;

        let secure = match uri.scheme_str() {
            Some("ws") => false,
            Some("wss") => true,
            Some(other) => {
                return Err(ProbeError::Config(format!(
                    "unsupported scheme {:?}",
                    other
                )))
            }
            None => return Err(ProbeError::Config(format!("{:?} has no scheme", url))),
        };
        let host = uri
            .host()
            .ok_or_else(|| ProbeError::Config(format!("{:?} has no host", url)))?;
        let port = uri
            .port_u16()
            .unwrap_or(if secure { 443 } else { 80 });
        let role: Role = uri.path().parse()?;

        let mut client_id = None;
        let mut room_id = None;
        for pair in uri.query().unwrap_or("").split('&').filter(|p| !p.is_empty()) {
            let mut kv = pair.splitn(2, '=');
            let key = kv.next().unwrap_or("");
            let value = kv.next().unwrap_or("");
            match key {
                "client_id" => {
                    let id = value.parse::<Uuid>().map_err(|e| {
                        ProbeError::Config(format!("invalid client_id {:?}: {}", value, e))
                    })?;
                    client_id = Some(id);
                }
                "room_id" => {
                    let id = value.parse::<u32>().map_err(|e| {
                        ProbeError::Config(format!("invalid room_id {:?}: {}", value, e))
                    })?;
                    room_id = Some(id);
                }
                other => {
                    return Err(ProbeError::Config(format!(
                        "unknown query parameter {:?}",
                        other
                    )))
                }
            }
        }
        let client_id = client_id
            .ok_or_else(|| ProbeError::Config(format!("{:?} has no client_id", url)))?;

        Self::build(secure, host, port, role, client_id, room_id)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn room_id(&self) -> Option<u32> {
        self.room_id
    }

    /// Request target for the upgrade request line.
    pub fn path_and_query(&self) -> String {
        let mut target = format!("{}?client_id={}", self.role.path(), self.client_id);
        if let Some(room_id) = self.room_id {
            target.push_str(&format!("&room_id={}", room_id));
        }
        target
    }

    /// Host as it appears in a URL authority, bracketed if it is an IPv6 literal.
    fn url_host(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        }
    }

    /// Value for the `Host` header. The port is omitted when it is the scheme default.
    pub fn host_header(&self) -> String {
        let default_port = if self.secure { 443 } else { 80 };
        if self.port == default_port {
            self.url_host()
        } else {
            format!("{}:{}", self.url_host(), self.port)
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}://{}:{}{}",
            if self.secure { "wss" } else { "ws" },
            self.url_host(),
            self.port,
            self.path_and_query()
        )
    }
}
