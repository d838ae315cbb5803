use serde_json::Value;
use std::io::{self, Read};

/// Read piped input from stdin as JSON, falling back to YAML.
/// Returns None when stdin is a TTY or the pipe is empty.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

fn parse_piped(buffer: &str) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => Ok(Some(value)),
        Err(json_err) => {
            log::debug!("stdin is not JSON ({json_err}); trying YAML");
            let value: Value = serde_yaml::from_str(trimmed)
                .map_err(|e| format!("stdin is neither JSON ({json_err}) nor YAML ({e})"))?;
            Ok(Some(value))
        }
    }
}
