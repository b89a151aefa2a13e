// forge-core: Pure types, MAC addresses, config, duration formatting
// No internal forge dependencies — this is the foundation crate.

pub mod config;
pub mod file;
pub mod mac;
pub mod machine;
pub mod upload;
pub mod uptime;
pub mod version;
