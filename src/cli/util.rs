use super::runner::OutputMode;

#[must_use]
pub fn parse_output_mode(s: Option<&str>) -> OutputMode {
    match s.map(str::to_ascii_lowercase).as_deref() {
        Some("json") => OutputMode::Json,
        Some("plain") => OutputMode::Plain,
        _ => OutputMode::Human,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_mode_parsing() {
        assert_eq!(parse_output_mode(Some("JSON")), OutputMode::Json);
        assert_eq!(parse_output_mode(Some("plain")), OutputMode::Plain);
        assert_eq!(parse_output_mode(Some("fancy")), OutputMode::Human);
        assert_eq!(parse_output_mode(None), OutputMode::Human);
    }
}
