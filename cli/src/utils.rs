use toolrun_core::error::CliError;

/// Parses one `--env KEY=VALUE` flag. Matching single or double quotes
/// around the value are stripped.
pub fn parse_env_pair(raw: &str) -> Result<(String, String), CliError> {
    let (k, v) = raw
        .split_once('=')
        .ok_or_else(|| CliError::Config(format!("invalid --env '{raw}' (expected KEY=VALUE)")))?;
    let key = k.trim();
    if key.is_empty() {
        return Err(CliError::Config(format!("invalid --env '{raw}' (empty key)")));
    }
    Ok((key.to_string(), unquote(v.trim()).to_string()))
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2 {
        let bytes = value.as_bytes();
        let (first, last) = (bytes[0], bytes[value.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}
