/// Uppercases the first character: `"chorus"` → `"Chorus"`.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Appends `count` spaces.
pub fn pad(line: &mut String, count: usize) {
    line.extend(std::iter::repeat_n(' ', count));
}

#[cfg(test)]
pub(crate) fn assert_rendered(input: &str, options: &crate::RenderOptions, expected: &str) {
    let document = crate::parse_song(input);
    let rendered = crate::render(&document, options).to_string();
    pretty_assertions::assert_eq!(
        rendered.trim_end(),
        expected.trim_matches('\n'),
        "rendered output mismatch"
    );
}
