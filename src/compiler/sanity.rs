//! Last structural check on generated code before it is returned.

/// Verifies bracket balance outside strings and comments and the presence of
/// the version annotation and strategy declaration.
pub fn check_structure(code: &str) -> Result<(), String> {
    if !code.contains("//@version=") {
        return Err("missing //@version= annotation".to_string());
    }
    if !code.contains("strategy(") {
        return Err("missing strategy( declaration".to_string());
    }

    let mut open: Vec<(char, usize)> = Vec::new();
    for (line_no, line) in code.lines().enumerate().map(|(i, l)| (i + 1, l)) {
        let mut chars = line.chars().peekable();
        let mut quote: Option<char> = None;
        while let Some(c) = chars.next() {
            if let Some(q) = quote {
                match c {
                    '\\' => {
                        chars.next();
                    }
                    c if c == q => quote = None,
                    _ => {}
                }
                continue;
            }
            match c {
                '/' if chars.peek() == Some(&'/') => break,
                '"' | '\'' => quote = Some(c),
                '(' | '[' => open.push((c, line_no)),
                ')' | ']' => {
                    let expected = if c == ')' { '(' } else { '[' };
                    match open.pop() {
                        Some((found, _)) if found == expected => {}
                        Some((found, opened_at)) => {
                            return Err(format!(
                                "'{}' on line {} closes '{}' opened on line {}",
                                c, line_no, found, opened_at
                            ));
                        }
                        None => return Err(format!("unmatched '{}' on line {}", c, line_no)),
                    }
                }
                _ => {}
            }
        }
        if quote.is_some() {
            return Err(format!("unterminated string on line {}", line_no));
        }
    }

    match open.last() {
        Some((c, line_no)) => Err(format!("unclosed '{}' opened on line {}", c, line_no)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "//@version=5\nstrategy(\"Test\", overlay=true)\n";

    #[test]
    fn test_balanced_code_passes() {
        let code = format!("{}[a, b] = ta.bb(close, 20, 2.0)\nplot(a)\n", HEADER);
        assert_eq!(check_structure(&code), Ok(()));
    }

    #[test]
    fn test_brackets_in_strings_and_comments_are_ignored() {
        let code = format!(
            "{}// ERROR: unmatched ) here\nplot(close, title=\"Price (\")\n",
            HEADER
        );
        assert!(check_structure(&code).is_ok());
    }

    #[test]
    fn test_unbalanced_code_fails() {
        let code = format!("{}plot(close\n", HEADER);
        assert!(check_structure(&code).unwrap_err().contains("unclosed '('"));

        let code = format!("{}x = [a, b)\n", HEADER);
        assert!(check_structure(&code).is_err());
    }

    #[test]
    fn test_missing_header_fails() {
        assert!(check_structure("plot(close)\n").is_err());
        assert!(check_structure("//@version=5\nplot(close)\n").is_err());
    }
}
