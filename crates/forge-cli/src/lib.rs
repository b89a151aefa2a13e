// forge-cli: Clap commands, UI, output rendering
// Depends on forge-core and forge-client.

pub mod commands;
pub mod display;
pub mod logging;
pub mod output;
pub mod ui;

pub use commands::run;
