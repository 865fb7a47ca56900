//! # bghelper Text Helpers (`common::text`)
//!
//! File: cli/src/common/text.rs
//!
//! Small string utilities used when assembling command lines from user input
//! and when splitting command output into lines.
//!
//! - **`string_to_list`**: `"a, b;c | d"` becomes `["a", "b", "c", "d"]`.
//! - **`get_list_from_arg_strings`**: The same, flattened over several arguments.
//! - **`splitlines`** / **`splitlines_and_strip`**: Split on `\n` or `\r\n`,
//!   dropping empty lines.

/// Splits `s` on `,`, `;` or `|` (with any surrounding whitespace), dropping empty items.
pub fn string_to_list(s: &str) -> Vec<String> {
    s.split([',', ';', '|'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Flattens `string_to_list` over each argument.
pub fn get_list_from_arg_strings<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    args.iter()
        .flat_map(|arg| string_to_list(arg.as_ref()))
        .collect()
}

/// Splits on `\n` / `\r\n`, dropping empty lines.
pub fn splitlines(s: &str) -> Vec<String> {
    s.lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Like [`splitlines`], with every line trimmed (whitespace-only lines are dropped).
pub fn splitlines_and_strip(s: &str) -> Vec<String> {
    s.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
