//! Indented rendering of JSON documents for display.

/// Re-indents a JSON document with two spaces and puts `prefix` in front of
/// every line, including the first one.
///
/// # Errors
/// - `data` is not valid JSON
pub fn indent(data: &[u8], prefix: &str) -> Result<String, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_slice(data)?;
    let pretty = serde_json::to_string_pretty(&value)?;

    let lines: Vec<String> = pretty.lines().map(|line| format!("{prefix}{line}")).collect();
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_prefixes_every_line() {
        let got = indent(br#"{"sub":"someone@test","group":["a","b"]}"#, "  ").unwrap();

        let want = [
            "  {",
            r#"    "sub": "someone@test","#,
            r#"    "group": ["#,
            r#"      "a","#,
            r#"      "b""#,
            "    ]",
            "  }",
        ]
        .join("\n");
        assert_eq!(got, want);
    }

    #[test]
    fn test_indent_keeps_key_order() {
        let got = indent(br#"{"z":1,"a":2}"#, "").unwrap();

        assert!(got.find("\"z\"").unwrap() < got.find("\"a\"").unwrap());
    }

    #[test]
    fn test_indent_invalid_json() {
        assert!(indent(b"{not json", "  ").is_err());
    }
}
