use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Identity and build details of the running service instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    #[serde(default)]
    pub ip: Option<IpAddr>,
    /// NIC identifier as the backend serializes it.
    #[serde(default)]
    pub nic: Option<String>,
    #[serde(default)]
    pub web_port: i32,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub commit: String,
    #[serde(default)]
    pub build_time: String,
    #[serde(default)]
    pub debug_mode: String,
    /// Epoch seconds at which the service started.
    #[serde(default)]
    pub service_start_time: i64,
}

impl ServiceInfo {
    /// Elapsed seconds since the service started, clamped at zero for
    /// skewed clocks.
    pub fn uptime_secs(&self, now_epoch: i64) -> u64 {
        (now_epoch - self.service_start_time).max(0) as u64
    }
}
