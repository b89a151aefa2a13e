//! # forgectl — admin console for the Blacksmith provisioning service
//!
//! Facade crate that re-exports the forgectl workspace crates so
//! consumers can depend on a single `forgectl` library.
//!
//! ## Crate breakdown
//!
//! | Module | Crate | Purpose |
//! |--------|-------|---------|
//! | [`core`] | forge-core | Machine/variable/file types, MAC addresses, config, uptime formatting |
//! | [`client`] | forge-client | Typed async client for the service REST API, uploads with progress |
//! | [`cli`] | forge-cli | Clap commands, table/json/yaml output, progress bars |

pub use forge_cli as cli;
pub use forge_client as client;
pub use forge_core as core;
