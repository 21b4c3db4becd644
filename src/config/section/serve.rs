//! `[serve]`: the development preview server.
//!
//! ```toml
//! [serve]
//! interface = "0.0.0.0"   # reachable from the LAN; default is 127.0.0.1
//! port = 3000
//! ws_port = 35729         # live reload socket
//! ```
//!
//! Busy ports are retried upward, so the printed address may differ.

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    pub interface: IpAddr,
    pub port: u16,
    pub ws_port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            ws_port: 35729,
        }
    }
}

impl ServeConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for (field, port) in [
            (FieldPath::new("serve.port"), self.port),
            (FieldPath::new("serve.ws_port"), self.ws_port),
        ] {
            if port == 0 {
                diag.error(field, "must be a fixed port, not 0");
            }
        }

        // Both ports retry upward, so nearby values would collide
        if self.port != 0 && self.ws_port != 0 && self.port.abs_diff(self.ws_port) < 10 {
            diag.error_with_hint(
                FieldPath::new("serve.ws_port"),
                "must be at least 10 away from `port`",
                "the default live reload port is 35729",
            );
        }
    }
}
