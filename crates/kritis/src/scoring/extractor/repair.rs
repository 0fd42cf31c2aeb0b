/// Structural state of a possibly truncated JSON text.
#[derive(Debug, Default)]
struct Scan {
    closers: Vec<char>,
    in_string: bool,
    escaped: bool,
    string_is_key: bool,
    last_significant: Option<char>,
    last_comma: Option<usize>,
}

/// Walk the text tracking strings, escapes and open containers.
///
/// Returns `None` when a closer does not match the innermost open container;
/// such text cannot be fixed by appending.
fn scan(text: &str) -> Option<Scan> {
    let mut state = Scan::default();

    for (idx, c) in text.char_indices() {
        if state.in_string {
            if state.escaped {
                state.escaped = false;
            } else if c == '\\' {
                state.escaped = true;
            } else if c == '"' {
                state.in_string = false;
                state.last_significant = Some('"');
            }
            continue;
        }

        match c {
            '"' => {
                state.string_is_key = state.closers.last() == Some(&'}')
                    && matches!(state.last_significant, Some('{') | Some(','));
                state.in_string = true;
            }
            '{' => state.closers.push('}'),
            '[' => state.closers.push(']'),
            '}' | ']' => {
                if state.closers.pop() != Some(c) {
                    return None;
                }
            }
            ',' => state.last_comma = Some(idx),
            _ => {}
        }

        if !c.is_whitespace() && c != '"' {
            state.last_significant = Some(c);
        }
    }

    Some(state)
}

fn close(text: &str, state: &Scan) -> String {
    let mut repaired = text.to_string();

    if state.in_string {
        if state.escaped {
            repaired.pop();
        }
        repaired.push('"');
        if state.string_is_key {
            repaired.push_str(": null");
        }
    } else {
        let trimmed_len = repaired.trim_end().len();
        repaired.truncate(trimmed_len);
        if repaired.ends_with(',') {
            repaired.pop();
        } else if repaired.ends_with(':') {
            repaired.push_str(" null");
        }
    }

    repaired.extend(state.closers.iter().rev());
    repaired
}

/// Candidate completions for a truncated payload, most faithful first.
///
/// The first closes everything at the cut-off point; the second drops the
/// trailing partial member by cutting back to the last structural comma.
pub(crate) fn repair_candidates(text: &str) -> Vec<String> {
    let Some(state) = scan(text) else {
        return Vec::new();
    };
    if state.closers.is_empty() && !state.in_string {
        return Vec::new();
    }

    let mut candidates = vec![close(text, &state)];

    if let Some(cut) = state.last_comma {
        let head = &text[..cut];
        if let Some(head_state) = scan(head) {
            if !head_state.in_string {
                candidates.push(close(head, &head_state));
            }
        }
    }

    candidates
}
