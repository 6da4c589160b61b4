//! Argument extraction and output comparison for functional tests.

const SEPARATOR: &str = "--";
const RUN_KEYWORD: &str = "cargo run";

/// Extract program arguments from a human-authored command.
///
/// - Everything after a standalone `--` token, whitespace split.
/// - Otherwise, for a command starting with `cargo run`, the rest of the
///   command minus the leading cargo options (tokens starting with `-` that
///   are not numbers).
/// - Otherwise nothing.
///
/// ```rust
/// use kata_grader::matching::args_from_command;
///
/// assert_eq!(args_from_command(Some("cargo run -- 32 F")), vec!["32", "F"]);
/// assert!(args_from_command(Some("cargo run --quiet")).is_empty());
/// assert!(args_from_command(None).is_empty());
/// ```
pub fn args_from_command(command: Option<&str>) -> Vec<String> {
    let Some(command) = command else {
        return Vec::new();
    };

    let mut tokens = command.split_whitespace();
    if tokens.any(|token| token == SEPARATOR) {
        return tokens.map(String::from).collect();
    }

    match command.trim_start().strip_prefix(RUN_KEYWORD) {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest
            .split_whitespace()
            .skip_while(|token| is_cargo_option(token))
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

fn is_cargo_option(token: &str) -> bool {
    token.starts_with('-') && token.parse::<f64>().is_err()
}

/// Compare program output against the expected text.
///
/// Both sides are normalised (CRLF to LF, surrounding whitespace trimmed).
/// The match passes when the expected text equals the actual output or occurs
/// anywhere inside it, so `"5"` also matches `"15"`.
pub fn output_matches(actual: &str, expected: &str) -> bool {
    let actual = normalize(actual);
    let expected = normalize(expected);
    actual == expected || actual.contains(&expected)
}

fn normalize(text: &str) -> String {
    text.replace("\r\n", "\n").trim().to_string()
}
