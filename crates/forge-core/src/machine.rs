use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::mac::MacAddr;

/// Distinguishes normal servers from statically assigned ones, and from
/// the BMCs inside those machines. Wire encoding is the backend's
/// integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub enum MachineType {
    Normal,
    Static,
    Bmc,
}

impl From<MachineType> for i16 {
    fn from(t: MachineType) -> i16 {
        match t {
            MachineType::Normal => 1,
            MachineType::Static => 2,
            MachineType::Bmc => 3,
        }
    }
}

impl TryFrom<i16> for MachineType {
    type Error = String;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(MachineType::Normal),
            2 => Ok(MachineType::Static),
            3 => Ok(MachineType::Bmc),
            other => Err(format!("unknown machine type code {}", other)),
        }
    }
}

impl fmt::Display for MachineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineType::Normal => write!(f, "normal"),
            MachineType::Static => write!(f, "static"),
            MachineType::Bmc => write!(f, "bmc"),
        }
    }
}

/// A managed bare-metal host as reported by the provisioning service.
///
/// Machines are created by the backend when they first appear on the
/// network; the console only lists, inspects, and deletes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    pub name: String,
    pub nic: MacAddr,
    pub ip: IpAddr,
    #[serde(rename = "type")]
    pub machine_type: MachineType,
    /// Epoch seconds of the first lease assignment.
    pub first_assigned: i64,
    /// Epoch seconds of the most recent lease assignment.
    pub last_assigned: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_machine_type_codes_round_trip() {
        for t in [MachineType::Normal, MachineType::Static, MachineType::Bmc] {
            let code: i16 = t.into();
            assert_eq!(MachineType::try_from(code).unwrap(), t);
        }
        assert!(MachineType::try_from(0).is_err());
        assert!(MachineType::try_from(7).is_err());
    }

    #[test]
    fn test_machine_deserializes_backend_shape() {
        let json = r#"{
            "name": "node-ab12",
            "nic": "52:54:00:12:34:56",
            "ip": "192.168.10.7",
            "type": 1,
            "firstAssigned": 1461234567,
            "lastAssigned": 1461239999
        }"#;
        let m: Machine = serde_json::from_str(json).unwrap();
        assert_eq!(m.name, "node-ab12");
        assert_eq!(m.nic.to_string(), "52:54:00:12:34:56");
        assert_eq!(m.ip.to_string(), "192.168.10.7");
        assert_eq!(m.machine_type, MachineType::Normal);
        assert_eq!(m.last_assigned, 1461239999);
    }

    #[test]
    fn test_machine_serializes_camel_case() {
        let m = Machine {
            name: "n".into(),
            nic: "aa:bb:cc:dd:ee:ff".parse().unwrap(),
            ip: "10.0.0.1".parse().unwrap(),
            machine_type: MachineType::Bmc,
            first_assigned: 1,
            last_assigned: 2,
        };
        let v: serde_json::Value = serde_json::to_value(&m).unwrap();
        assert_eq!(v["type"], 3);
        assert_eq!(v["firstAssigned"], 1);
        assert!(v.get("machine_type").is_none());
    }
}
