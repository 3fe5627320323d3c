/// Longest run of consecutive blank lines kept in cleaned text.
const MAX_BLANK_RUN: usize = 3;

/// Collapse runs of blank lines down to at most three.
///
/// A line is blank when it is empty after trimming. Non-blank lines are kept
/// verbatim. Splitting and joining on `\n` makes the operation idempotent.
pub fn clean_text(text: &str) -> String {
    let mut kept = Vec::new();
    let mut blank_run = 0usize;

    for line in text.split('\n') {
        if line.trim().is_empty() {
            blank_run += 1;
        } else {
            blank_run = 0;
        }
        if blank_run <= MAX_BLANK_RUN {
            kept.push(line);
        }
    }

    kept.join("\n")
}
