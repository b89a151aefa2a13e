use serde::Serialize;
use tabled::Tabled;

use forge_core::file::UploadedFile;
use forge_core::machine::Machine;
use forge_core::uptime::format_duration;
use forge_core::version::ServiceInfo;

/// Display row for `machine list`.
#[derive(Debug, Serialize, Tabled)]
pub struct MachineRow {
    #[tabled(rename = "NAME")]
    pub name: String,
    #[tabled(rename = "MAC")]
    pub mac: String,
    #[tabled(rename = "IP")]
    pub ip: String,
    #[tabled(rename = "TYPE")]
    pub machine_type: String,
    #[tabled(rename = "FIRST ASSIGNED")]
    pub first_assigned: String,
    #[tabled(rename = "LAST ASSIGNED")]
    pub last_assigned: String,
}

impl MachineRow {
    /// Build a row, humanizing the assignment timestamps against `now`.
    pub fn from_machine(m: &Machine, now_epoch: i64) -> Self {
        Self {
            name: m.name.clone(),
            mac: m.nic.to_string(),
            ip: m.ip.to_string(),
            machine_type: m.machine_type.to_string(),
            first_assigned: age(m.first_assigned, now_epoch),
            last_assigned: age(m.last_assigned, now_epoch),
        }
    }
}

fn age(then_epoch: i64, now_epoch: i64) -> String {
    if then_epoch <= 0 || then_epoch > now_epoch {
        return "-".to_string();
    }
    format!("{} ago", format_duration((now_epoch - then_epoch) as u64))
}

/// Display row for `var list` and `machine show`.
#[derive(Debug, Serialize, Tabled)]
pub struct VariableRow {
    #[tabled(rename = "NAME")]
    pub name: String,
    #[tabled(rename = "VALUE")]
    pub value: String,
}

/// Display row for `file list`.
#[derive(Debug, Serialize, Tabled)]
pub struct FileRow {
    #[tabled(rename = "NAME")]
    pub name: String,
    #[tabled(rename = "SIZE")]
    pub size: String,
    #[tabled(rename = "MODIFIED")]
    pub modified: String,
}

impl FileRow {
    pub fn from_file(f: &UploadedFile, now_epoch: i64) -> Self {
        Self {
            name: f.name.clone(),
            size: human_size(f.size.max(0) as u64),
            modified: age(f.last_modified, now_epoch),
        }
    }
}

/// Display row for `version`.
#[derive(Debug, Serialize, Tabled)]
pub struct VersionRow {
    #[tabled(rename = "VERSION")]
    pub version: String,
    #[tabled(rename = "COMMIT")]
    pub commit: String,
    #[tabled(rename = "BUILD TIME")]
    pub build_time: String,
    #[tabled(rename = "UPTIME")]
    pub uptime: String,
}

impl VersionRow {
    pub fn from_info(info: &ServiceInfo, now_epoch: i64) -> Self {
        Self {
            version: info.version.clone(),
            commit: info.commit.clone(),
            build_time: info.build_time.clone(),
            uptime: format_duration(info.uptime_secs(now_epoch)),
        }
    }
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = "B";
    for next in UNITS {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{:.1} {}", value, unit)
}
