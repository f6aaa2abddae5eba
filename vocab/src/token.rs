// Unicode whitespace plus the information separators U+001C..U+001F.
fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\x1c'..='\x1f').contains(&c)
}

pub fn tokenize(line: &str) -> impl Iterator<Item = &str> {
    line.split(is_separator).filter(|token| !token.is_empty())
}

/// Lower-cased, with every `,` and `.` removed.
pub fn normalize(token: &str) -> String {
    let mut word = token.to_lowercase();
    word.retain(|c| c != ',' && c != '.');
    word
}

pub fn words(line: &str) -> impl Iterator<Item = String> + '_ {
    tokenize(line).map(normalize)
}
