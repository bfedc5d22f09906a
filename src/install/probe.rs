use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tracing::debug;

use crate::error::InstallError;

pub const DEFAULT_MONGODB_PORT: u16 = 27017;
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MongoTarget {
    /// `mongodb+srv://`: a single host name resolved through DNS.
    pub srv: bool,
    pub hosts: Vec<(String, u16)>,
    pub database: Option<String>,
}

/// Split a MongoDB connection string into its host list.
pub fn parse_mongodb_uri(uri: &str) -> Result<MongoTarget, String> {
    let uri = uri.trim();
    let (srv, rest) = if let Some(rest) = uri.strip_prefix("mongodb+srv://") {
        (true, rest)
    } else if let Some(rest) = uri.strip_prefix("mongodb://") {
        (false, rest)
    } else {
        return Err("Database URI must start with mongodb:// or mongodb+srv://".into());
    };

    let (authority, path) = match rest.find(['/', '?']) {
        Some(i) => rest.split_at(i),
        None => (rest, ""),
    };
    let host_list = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    if host_list.is_empty() {
        return Err("Database URI has no host".into());
    }

    let mut hosts = Vec::new();
    for raw in host_list.split(',') {
        hosts.push(parse_host(raw)?);
    }
    if srv && (hosts.len() != 1 || raw_has_port(host_list)) {
        return Err("mongodb+srv:// takes exactly one host name without a port".into());
    }

    let database = path
        .strip_prefix('/')
        .map(|p| p.split('?').next().unwrap_or_default())
        .filter(|db| !db.is_empty())
        .map(String::from);

    Ok(MongoTarget {
        srv,
        hosts,
        database,
    })
}

fn raw_has_port(host: &str) -> bool {
    match host.rfind(']') {
        Some(end) => host[end..].contains(':'),
        None => host.contains(':'),
    }
}

fn parse_host(raw: &str) -> Result<(String, u16), String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("Database URI has an empty host".into());
    }
    let (host, port) = if let Some(rest) = raw.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .ok_or_else(|| format!("Unterminated IPv6 host in {raw}"))?;
        (host, tail.strip_prefix(':'))
    } else {
        match raw.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (raw, None),
        }
    };
    let port = match port {
        Some(p) => p
            .parse::<u16>()
            .map_err(|_| format!("Invalid port in host {raw}"))?,
        None => DEFAULT_MONGODB_PORT,
    };
    if host.is_empty() {
        return Err("Database URI has an empty host".into());
    }
    Ok((host.to_string(), port))
}

/// Mask the password component of a connection string for logs.
pub fn redact_uri(uri: &str) -> String {
    let Some((scheme, rest)) = uri.split_once("://") else {
        return uri.to_string();
    };
    let authority_end = rest.find(['/', '?']).unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(authority_end);
    match authority.rsplit_once('@') {
        Some((userinfo, hosts)) => {
            let user = userinfo.split_once(':').map_or(userinfo, |(u, _)| u);
            format!("{scheme}://{user}:***@{hosts}{tail}")
        }
        None => uri.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeReport {
    pub host: String,
    pub port: u16,
    pub elapsed_ms: u64,
}

impl ProbeReport {
    pub fn message(&self) -> String {
        format!(
            "Connected to {}:{} in {} ms",
            self.host, self.port, self.elapsed_ms
        )
    }
}

/// Check that the database named by `uri` is reachable.
///
/// Plain URIs succeed when any listed host accepts a TCP connection within
/// `timeout`; SRV URIs succeed when the host name resolves.
pub async fn probe_database(uri: &str, timeout: Duration) -> Result<ProbeReport, InstallError> {
    let target = parse_mongodb_uri(uri).map_err(InstallError::Database)?;
    let started = Instant::now();
    let mut last_error = String::from("no hosts to try");

    for (host, port) in &target.hosts {
        debug!(host = %host, port, srv = target.srv, "probing database host");
        let attempt = if target.srv {
            resolve(host, *port, timeout).await
        } else {
            connect(host, *port, timeout).await
        };
        match attempt {
            Ok(()) => {
                return Ok(ProbeReport {
                    host: host.clone(),
                    port: *port,
                    elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                });
            }
            Err(e) => last_error = e,
        }
    }
    Err(InstallError::Database(last_error))
}

async fn connect(host: &str, port: u16, timeout: Duration) -> Result<(), String> {
    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(format!("Cannot reach {host}:{port}: {e}")),
        Err(_) => Err(format!(
            "Timed out connecting to {host}:{port} after {}s",
            timeout.as_secs()
        )),
    }
}

async fn resolve(host: &str, port: u16, timeout: Duration) -> Result<(), String> {
    match tokio::time::timeout(timeout, tokio::net::lookup_host((host, port))).await {
        Ok(Ok(mut addrs)) => match addrs.next() {
            Some(_) => Ok(()),
            None => Err(format!("{host} resolved to no addresses")),
        },
        Ok(Err(e)) => Err(format!("Cannot resolve {host}: {e}")),
        Err(_) => Err(format!("Timed out resolving {host}")),
    }
}
