//! POSIX shell quoting

/// Quote `arg` as a single shell word.
///
/// The value is wrapped in single quotes; an embedded `'` closes the quote,
/// emits `"'"` and reopens it.
pub fn escape_shell_arg(arg: &str) -> String {
    let mut out = String::with_capacity(arg.len() + 2);
    out.push('\'');
    for ch in arg.chars() {
        if ch == '\'' {
            out.push_str("'\"'\"'");
        } else {
            out.push(ch);
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_value() {
        assert_eq!(escape_shell_arg("/var/log"), "'/var/log'");
        assert_eq!(escape_shell_arg(""), "''");
    }

    #[test]
    fn test_embedded_quote() {
        assert_eq!(escape_shell_arg("O'Brien"), "'O'\"'\"'Brien'");
    }

    #[test]
    fn test_round_trip_through_shell_words() {
        for value in [
            "O'Brien",
            "two words",
            "*.log",
            "$(rm -rf /)",
            "'",
            "a\"b'c",
            "tab\there",
            "{other}",
        ] {
            let words = shell_words::split(&escape_shell_arg(value)).unwrap();
            assert_eq!(words, vec![value.to_string()], "value: {value}");
        }
    }
}
