//! Default hostname/IPv4 probe.
//!
//! The resolver consumes this through the [`HostProbe`] trait so tests can substitute a
//! deterministic double instead of depending on the machine's actual network configuration.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum HostProbeError {
    #[error("could not determine hostname: {0}")]
    Hostname(String),
    #[error("could not determine a non-loopback IPv4 address: {0}")]
    Ipv4(String),
}

/// Probes the host for its hostname and primary, non-loopback IPv4 address.
pub trait HostProbe {
    fn hostname(&self) -> Result<String, HostProbeError>;
    fn local_ipv4(&self) -> Result<String, HostProbeError>;
}

/// The default probe used outside of tests: the OS hostname and the address the kernel would
/// route a packet to a public address from (a dial-and-inspect trick, not an actual send).
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHostProbe;

impl HostProbe for DefaultHostProbe {
    #[cfg(target_family = "unix")]
    fn hostname(&self) -> Result<String, HostProbeError> {
        nix::unistd::gethostname()
            .map_err(|e| HostProbeError::Hostname(e.to_string()))?
            .into_string()
            .map_err(|_| HostProbeError::Hostname("hostname is not valid UTF-8".to_string()))
    }

    #[cfg(not(target_family = "unix"))]
    fn hostname(&self) -> Result<String, HostProbeError> {
        std::env::var("COMPUTERNAME")
            .map_err(|e| HostProbeError::Hostname(e.to_string()))
    }

    fn local_ipv4(&self) -> Result<String, HostProbeError> {
        use std::net::UdpSocket;

        // Connecting a UDP socket performs no I/O by itself; it only asks the kernel's
        // routing table which local interface/address it would use to reach the target.
        let socket =
            UdpSocket::bind("0.0.0.0:0").map_err(|e| HostProbeError::Ipv4(e.to_string()))?;
        socket
            .connect("8.8.8.8:80")
            .map_err(|e| HostProbeError::Ipv4(e.to_string()))?;
        let addr = socket
            .local_addr()
            .map_err(|e| HostProbeError::Ipv4(e.to_string()))?;

        match addr.ip() {
            std::net::IpAddr::V4(v4) if !v4.is_loopback() => Ok(v4.to_string()),
            other => Err(HostProbeError::Ipv4(format!(
                "resolved non-routable address {other}"
            ))),
        }
    }
}
