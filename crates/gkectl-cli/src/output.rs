use serde::Serialize;
use tabled::Tabled;

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
    /// Parse from CLI string argument.
    pub fn from_str_arg(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "yaml" | "yml" => Self::Yaml,
            _ => Self::Table,
        }
    }
}

/// Render rows in the requested format. `empty` is printed instead of an
/// empty table; JSON/YAML render the empty list as-is so output stays
/// machine-readable.
pub fn render_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat, empty: &str) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("{}", empty);
            } else {
                let table = tabled::Table::new(items)
                    .with(tabled::settings::Style::rounded())
                    .to_string();
                println!("{}", table);
            }
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(items).unwrap_or_default()
            );
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(items).unwrap_or_default());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str_arg("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_arg("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_arg("yaml"), OutputFormat::Yaml);
        assert_eq!(OutputFormat::from_str_arg("yml"), OutputFormat::Yaml);
        assert_eq!(OutputFormat::from_str_arg("table"), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_arg("anything"), OutputFormat::Table);
    }

    #[derive(Serialize, Tabled)]
    struct TestRow {
        name: String,
        nodes: i32,
    }

    #[test]
    fn test_render_does_not_panic() {
        let rows = vec![TestRow {
            name: "t1".to_string(),
            nodes: 3,
        }];
        render_list(&rows, OutputFormat::Table, "none");
        render_list(&rows, OutputFormat::Json, "none");
        render_list(&rows, OutputFormat::Yaml, "none");
    }

    #[test]
    fn test_render_empty_list() {
        let rows: Vec<TestRow> = Vec::new();
        render_list(&rows, OutputFormat::Table, "No clusters found.");
        render_list(&rows, OutputFormat::Json, "No clusters found.");
    }
}
