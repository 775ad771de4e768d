//! Write/read classification.

const WRITE_KEYWORDS: [&str; 11] = [
    "INSERT", "UPDATE", "DELETE", "CREATE", "DROP", "ALTER", "TRUNCATE", "REPLACE", "MERGE",
    "CALL", "EXEC",
];

/// True if the statement's first keyword (trimmed, case-insensitive) is a
/// write keyword. Stable under leading whitespace and case.
pub fn is_write(sql: &str) -> bool {
    let first_word: String = sql
        .trim_start()
        .chars()
        .take_while(|c| c.is_alphabetic())
        .collect();
    WRITE_KEYWORDS.contains(&first_word.to_ascii_uppercase().as_str())
}
