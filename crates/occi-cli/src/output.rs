//! output formats known to the rendering layer

#[derive(clap::ValueEnum, serde::Serialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum OutputFormat {
    Json,
    JsonPretty,
    #[default]
    Plain,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::JsonPretty => f.write_str("json_pretty"),
            OutputFormat::Plain => f.write_str("plain"),
        }
    }
}
