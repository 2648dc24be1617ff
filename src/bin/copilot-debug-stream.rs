//! Decode a captured agent response offline.
//!
//! This binary reads a saved event stream and prints the text the agent
//! streamed, concatenated in order.
//!
//! # Usage
//!
//! ```bash
//! # Print the streamed text
//! copilot-debug-stream --file response.txt
//!
//! # Structured output
//! copilot-debug-stream --file response.txt --format json
//! ```

use arrrg::CommandLine;
use arrrg_derive::CommandLine;
use serde::Serialize;
use utf8path::Path;

use copilot_debug::concat_file;

/// Output format for the decoded content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum OutputFormat {
    /// Plain text format (default) - the content only.
    #[default]
    Text,
    /// JSON format - structured output suitable for parsing.
    Json,
    /// YAML format - structured output in YAML format.
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            _ => Err(format!(
                "Invalid output format: {}. Valid options: text, json, yaml",
                s
            )),
        }
    }
}

/// Command-line arguments for the copilot-debug-stream tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
struct Args {
    /// File holding the captured stream.
    #[arrrg(optional, "Parse agent responses from a file", "FILE")]
    file: Option<String>,

    /// Output format (text, json, yaml).
    #[arrrg(optional, "Output format: text, json, yaml", "FORMAT")]
    format: Option<String>,
}

#[derive(Serialize)]
struct Decoded<'a> {
    file: &'a str,
    content: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, free) = Args::from_command_line_relaxed("copilot-debug-stream --file <FILE>");

    let Some(file) = args.file.or_else(|| free.into_iter().next()) else {
        eprintln!("Error: --file [file] is required");
        std::process::exit(1);
    };
    let output_format: OutputFormat = match args.format {
        Some(format) => format.parse().map_err(|e| format!("Invalid format: {}", e))?,
        None => OutputFormat::Text,
    };

    let content = match concat_file(&Path::from(file.as_str())) {
        Ok(content) => content,
        Err(err) => {
            eprintln!("Error parsing file: {err}");
            std::process::exit(1);
        }
    };

    match output_format {
        OutputFormat::Text => println!("{content}"),
        OutputFormat::Json => {
            let decoded = Decoded {
                file: &file,
                content,
            };
            println!("{}", serde_json::to_string_pretty(&decoded)?);
        }
        OutputFormat::Yaml => {
            let decoded = Decoded {
                file: &file,
                content,
            };
            print!("{}", serde_yaml::to_string(&decoded)?);
        }
    }
    Ok(())
}
