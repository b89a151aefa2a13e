use std::collections::BTreeMap;

use serde::Serialize;
use tabled::Tabled;
use tabled::settings::Style;

use crate::display::VariableRow;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable table (default).
    #[default]
    Table,
    /// JSON output.
    Json,
    /// YAML output.
    Yaml,
}

impl OutputFormat {
    /// Parse from CLI string argument; anything unrecognized falls
    /// back to the table view.
    pub fn from_str_arg(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "yaml" | "yml" => Self::Yaml,
            _ => Self::Table,
        }
    }
}

/// Render a listing (machines, files, variable rows) in the requested
/// format.
pub fn render_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    println!("{}", list_to_string(items, format));
}

/// Render a single record, e.g. the version/uptime card.
pub fn render_one<T: Serialize + Tabled>(item: &T, format: OutputFormat) {
    println!("{}", one_to_string(item, format));
}

/// Variable collections keep the backend's map shape in json/yaml
/// output and get NAME/VALUE rows in the table view; keys come out
/// sorted either way.
pub fn render_variables(variables: &BTreeMap<String, String>, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let rows: Vec<VariableRow> = variables
                .iter()
                .map(|(name, value)| VariableRow {
                    name: name.clone(),
                    value: value.clone(),
                })
                .collect();
            render_list(&rows, format);
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(variables).unwrap_or_default()
            );
        }
        OutputFormat::Yaml => println!("{}", yaml_string(variables)),
    }
}

fn list_to_string<T: Serialize + Tabled>(items: &[T], format: OutputFormat) -> String {
    match format {
        OutputFormat::Table if items.is_empty() => "(none)".to_string(),
        OutputFormat::Table => rounded_table(tabled::Table::new(items)),
        OutputFormat::Json => serde_json::to_string_pretty(items).unwrap_or_default(),
        OutputFormat::Yaml => yaml_string(items),
    }
}

fn one_to_string<T: Serialize + Tabled>(item: &T, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => rounded_table(tabled::Table::new(std::iter::once(item))),
        OutputFormat::Json => serde_json::to_string_pretty(item).unwrap_or_default(),
        OutputFormat::Yaml => yaml_string(item),
    }
}

fn rounded_table(mut table: tabled::Table) -> String {
    table.with(Style::rounded()).to_string()
}

fn yaml_string<T: Serialize + ?Sized>(value: &T) -> String {
    serde_yaml::to_string(value)
        .unwrap_or_default()
        .trim_end()
        .to_string()
}
