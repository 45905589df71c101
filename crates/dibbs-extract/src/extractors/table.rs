//! Locating a table block inside one page of text.

use tracing::debug;

/// True when the first whitespace-separated token of `line` has no digits.
///
/// A blank line has no tokens and counts as true, so blank lines end a
/// table block.
pub fn starts_with_word_without_digits(line: &str) -> bool {
    match line.split_whitespace().next() {
        Some(word) => !word.chars().any(char::is_numeric),
        None => true,
    }
}

/// Cut the block belonging to the table whose header contains `header`.
///
/// Emits the header line as-is, then every line from `skip_count` lines after
/// it (trimmed), stopping before the first line that starts with a digit-free
/// word. Each emitted line ends with `\n`. Returns `None` when no line
/// contains the header.
pub fn extract_table(page_text: &str, header: &str, skip_count: usize) -> Option<String> {
    let lines: Vec<&str> = page_text.split('\n').collect();
    let header_index = lines.iter().position(|line| line.contains(header))?;

    let mut output = String::new();
    output.push_str(lines[header_index]);
    output.push('\n');

    for line in lines.iter().skip(header_index + skip_count) {
        let line = line.trim();
        if starts_with_word_without_digits(line) {
            break;
        }
        output.push_str(line);
        output.push('\n');
    }

    debug!(
        "Table '{}' yielded {} lines",
        header.trim(),
        output.lines().count()
    );

    Some(output)
}
