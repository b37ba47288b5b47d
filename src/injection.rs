//! Injection mode: extract bb snippets from foreign-language comments.
//!
//! A host file in any language can carry bb fragments inside its comments by
//! tagging the comment opener with `bb`:
//!
//! ```text
//! //bb ∆ = { unit: pizza }
//! #bb 2∆
//! /*bb 3∆ */
//! <!--bb 4∆ -->
//! ```
//!
//! The pre-filter scans for the tagged prefixes, collects each region's
//! contents (closing marker excluded; inline regions keep their newline),
//! and concatenates everything into one bb source string for the normal
//! pipeline. Unclosed multi-line regions run to the end of the file
//! silently.

/// Comment forms that end at a closing marker.
const BLOCK_FORMS: &[(&str, &str)] = &[
    ("<!--bb", "-->"),
    ("\"\"\"bb", "\"\"\""),
    ("'''bb", "'''"),
    ("```bb", "```"),
    ("/*bb", "*/"),
    ("{-bb", "-}"),
];

/// Comment forms that end at the next newline.
const LINE_FORMS: &[&str] = &["//bb", "--bb", "#bb"];

/// Collect the bb contents of every tagged comment region in `input`.
pub fn extract(input: &str) -> String {
    let mut collected = String::new();
    let mut pos = 0;

    'scan: while pos < input.len() {
        let rest = &input[pos..];

        for (prefix, closer) in BLOCK_FORMS {
            if rest.starts_with(prefix) {
                let body = &rest[prefix.len()..];
                match body.find(closer) {
                    Some(end) => {
                        collected.push_str(&body[..end]);
                        pos += prefix.len() + end + closer.len();
                    }
                    None => {
                        // unclosed region: take the rest of the file
                        collected.push_str(body);
                        pos = input.len();
                    }
                }
                continue 'scan;
            }
        }

        for prefix in LINE_FORMS {
            if rest.starts_with(prefix) {
                let body = &rest[prefix.len()..];
                match body.find('\n') {
                    Some(end) => {
                        // the newline separates this snippet from the next
                        collected.push_str(&body[..=end]);
                        pos += prefix.len() + end + 1;
                    }
                    None => {
                        collected.push_str(body);
                        pos = input.len();
                    }
                }
                continue 'scan;
            }
        }

        let width = rest.chars().next().map(char::len_utf8).unwrap_or(1);
        pos += width;
    }

    collected
}
