//! Quote and escape aware text primitives
//!
//! Every routine here treats a single quote `'` as toggling an in-literal
//! flag unless it is preceded by an unescaped backslash; `\'` denotes a
//! literal quote inside a string. Separators and group delimiters are only
//! recognized outside quoted regions, and a quoted region interrupts a
//! partial separator match (separators must be contiguous in the raw
//! text).

/// Quote character for string literals
pub const QUOTE: char = '\'';

/// Escape character
pub const ESCAPE: char = '\\';

/// Whether the character at `index` is escaped by a preceding backslash
fn is_escaped(chars: &[char], index: usize) -> bool {
    index > 0 && chars[index - 1] == ESCAPE
}

/// True iff `needle` occurs as a contiguous run outside quoted regions
pub fn contains_ignoring_quotes(text: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let chars: Vec<char> = text.chars().collect();
    let needle_chars: Vec<char> = needle.chars().collect();
    let mut in_quote = false;
    let mut matched = 0;

    for (i, &c) in chars.iter().enumerate() {
        if c == QUOTE && !is_escaped(&chars, i) {
            in_quote = !in_quote;
            matched = 0;
            continue;
        }
        if in_quote {
            continue;
        }
        if c == needle_chars[matched] {
            matched += 1;
        } else if c == needle_chars[0] {
            matched = 1;
        } else {
            matched = 0;
        }
        if matched == needle_chars.len() {
            return true;
        }
    }
    false
}

/// Split on contiguous separator occurrences outside quotes
///
/// The trailing remainder is always emitted as a final piece, so
/// `a&&b` splits to `["a", "b"]` and `a&&` splits to `["a", ""]`.
pub fn split_ignoring_quotes(text: &str, separator: &str) -> Vec<String> {
    split_with_capacity(text, separator, 0)
}

/// Bounded variant of [`split_ignoring_quotes`]
///
/// Behaves identically but preallocates exactly `limit + 1` slots for the
/// common case of operator splits with a known piece count.
pub fn split_ignoring_quotes_bounded(text: &str, separator: &str, limit: usize) -> Vec<String> {
    split_with_capacity(text, separator, limit + 1)
}

fn split_with_capacity(text: &str, separator: &str, capacity: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let sep_chars: Vec<char> = separator.chars().collect();
    let mut pieces = Vec::with_capacity(capacity);
    if sep_chars.is_empty() {
        pieces.push(text.to_string());
        return pieces;
    }

    let mut buffer = String::new();
    let mut in_quote = false;
    let mut matched = 0;

    for (i, &c) in chars.iter().enumerate() {
        buffer.push(c);
        if c == QUOTE && !is_escaped(&chars, i) {
            in_quote = !in_quote;
            matched = 0;
            continue;
        }
        if in_quote {
            continue;
        }
        if c == sep_chars[matched] {
            matched += 1;
        } else if c == sep_chars[0] {
            matched = 1;
        } else {
            matched = 0;
        }
        if matched == sep_chars.len() {
            buffer.truncate(buffer.len() - separator.len());
            pieces.push(std::mem::take(&mut buffer));
            matched = 0;
        }
    }
    pieces.push(buffer);
    pieces
}

/// Contents of each top-level balanced group, quote-aware
///
/// Nested groups are retained verbatim inside their parent's content:
/// `extract_balanced("((a))&&(b)", '(', ')')` is `["(a)", "b"]`.
pub fn extract_balanced(text: &str, open: char, close: char) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut groups = Vec::new();
    let mut buffer = String::new();
    let mut in_quote = false;
    let mut depth = 0usize;

    for (i, &c) in chars.iter().enumerate() {
        if c == QUOTE && !is_escaped(&chars, i) {
            in_quote = !in_quote;
        }
        if !in_quote {
            if c == open {
                depth += 1;
                if depth == 1 {
                    continue;
                }
            } else if c == close && depth > 0 {
                depth -= 1;
                if depth == 0 {
                    groups.push(std::mem::take(&mut buffer));
                    continue;
                }
            }
        }
        if depth > 0 {
            buffer.push(c);
        }
    }
    groups
}

/// Trimmed literal text between consecutive top-level groups
///
/// Used to find the `&&`/`||` operators joining parenthesized groups:
/// `extract_between_groups("(a) && (b)||(c)", '(', ')')` is
/// `["&&", "||"]`. Text before the first group or after the last is not
/// between groups and is dropped.
pub fn extract_between_groups(text: &str, open: char, close: char) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut between = Vec::new();
    let mut buffer = String::new();
    let mut in_quote = false;
    let mut depth = 0usize;
    let mut collecting = false;

    for (i, &c) in chars.iter().enumerate() {
        if c == QUOTE && !is_escaped(&chars, i) {
            in_quote = !in_quote;
        }
        if !in_quote {
            if c == open {
                depth += 1;
                if depth == 1 {
                    if collecting {
                        between.push(buffer.trim().to_string());
                        buffer.clear();
                        collecting = false;
                    }
                    continue;
                }
            } else if c == close && depth > 0 {
                depth -= 1;
                if depth == 0 {
                    collecting = true;
                    continue;
                }
            }
        }
        if depth == 0 && collecting {
            buffer.push(c);
        }
    }
    between
}

/// Split at top-level `&&`/`||` occurrences, outside quotes and parens
///
/// Returns the segments and, in order, the operator found between each
/// consecutive pair. A segment may be a parenthesized group or bare leaf
/// text; `(a||b)&&c` yields `(["(a||b)", "c"], ["&&"])`.
pub fn split_top_level(text: &str) -> (Vec<String>, Vec<String>) {
    let chars: Vec<char> = text.chars().collect();
    let mut segments = Vec::new();
    let mut operators = Vec::new();
    let mut buffer = String::new();
    let mut in_quote = false;
    let mut depth = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == QUOTE && !is_escaped(&chars, i) {
            in_quote = !in_quote;
        }
        if !in_quote {
            if c == '(' {
                depth += 1;
            } else if c == ')' {
                depth = depth.saturating_sub(1);
            } else if depth == 0 && (c == '&' || c == '|') && chars.get(i + 1) == Some(&c) {
                segments.push(std::mem::take(&mut buffer));
                operators.push(if c == '&' { "&&" } else { "||" }.to_string());
                i += 2;
                continue;
            }
        }
        buffer.push(c);
        i += 1;
    }
    segments.push(buffer);
    (segments, operators)
}

/// Strip one outer paren layer when it wraps the whole text
///
/// `(a||b)` becomes `a||b`; `(a)&&(b)` is returned unchanged because the
/// first group closes before the end.
pub fn unwrap_outer_group(text: &str) -> String {
    let trimmed = text.trim();
    let chars: Vec<char> = trimmed.chars().collect();
    if chars.first() != Some(&'(') || chars.last() != Some(&')') {
        return trimmed.to_string();
    }

    let mut in_quote = false;
    let mut depth = 0usize;
    for (i, &c) in chars.iter().enumerate() {
        if c == QUOTE && !is_escaped(&chars, i) {
            in_quote = !in_quote;
        }
        if in_quote {
            continue;
        }
        if c == '(' {
            depth += 1;
        } else if c == ')' {
            depth -= 1;
            if depth == 0 && i < chars.len() - 1 {
                return trimmed.to_string();
            }
        }
    }
    chars[1..chars.len() - 1].iter().collect()
}

/// Normalize a leaf condition: drop spacing and redundant parentheses
///
/// Spaces outside quotes are removed. A leading run of `(` is stripped,
/// also when prefixed by `&&` or `||`. The trailing run of `)` is stripped
/// only when the text both starts with `(` and ends with `)` and is not a
/// method chain (an unquoted `.` with no decimal-number shape), where the
/// closing parens belong to the calls.
pub fn strip_spacing_and_parens(text: &str) -> String {
    let raw: Vec<char> = text.chars().collect();
    let mut cleaned = String::with_capacity(text.len());
    let mut in_quote = false;
    for (i, &c) in raw.iter().enumerate() {
        if c == QUOTE && !is_escaped(&raw, i) {
            in_quote = !in_quote;
        }
        if c == ' ' && !in_quote {
            continue;
        }
        cleaned.push(c);
    }

    let chars: Vec<char> = cleaned.chars().collect();
    let mut start = 0;
    if cleaned.starts_with("&&(") || cleaned.starts_with("||(") {
        while start < chars.len() && matches!(chars[start], '&' | '|' | '(') {
            start += 1;
        }
    } else if cleaned.starts_with('(') {
        while start < chars.len() && chars[start] == '(' {
            start += 1;
        }
    }

    let mut end = chars.len();
    if cleaned.starts_with('(') && cleaned.ends_with(')') {
        let method_chain =
            contains_ignoring_quotes(&cleaned, ".") && !contains_decimal_shape(&cleaned);
        if !method_chain {
            while end > start && chars[end - 1] == ')' {
                end -= 1;
            }
        }
    }

    chars[start..end].iter().collect()
}

/// Rewrite `\'` to a literal quote
pub fn process_escapes(text: &str) -> String {
    text.replace("\\'", "'")
}

/// Whether the text contains a decimal-number shape (digit, point, digit)
pub fn contains_decimal_shape(text: &str) -> bool {
    let chars: Vec<char> = text.chars().collect();
    chars.windows(3).any(|w| {
        w[0].is_ascii_digit() && w[1] == '.' && w[2].is_ascii_digit()
    })
}

/// Whether the whole text is a decimal literal, optional leading minus
pub fn is_decimal_literal(text: &str) -> bool {
    let body = text.strip_prefix('-').unwrap_or(text);
    let mut parts = body.splitn(2, '.');
    let (Some(int_part), Some(frac_part)) = (parts.next(), parts.next()) else {
        return false;
    };
    !int_part.is_empty()
        && !frac_part.is_empty()
        && int_part.chars().all(|c| c.is_ascii_digit())
        && frac_part.chars().all(|c| c.is_ascii_digit())
}

/// Whole text is an integer literal, optional leading minus
pub fn is_integer_literal(text: &str) -> bool {
    let body = text.strip_prefix('-').unwrap_or(text);
    !body.is_empty() && body.chars().all(|c| c.is_ascii_digit())
}

/// Whole text is wrapped in single quotes
pub fn is_quoted(text: &str) -> bool {
    text.len() >= 2 && text.starts_with(QUOTE) && text.ends_with(QUOTE)
}

/// Strip one layer of surrounding quotes if present
pub fn unquote(text: &str) -> &str {
    if is_quoted(text) {
        &text[1..text.len() - 1]
    } else {
        text
    }
}
