/// A chord marker lifted out of a content line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordToken {
    /// Text between `[` and `]`, as written.
    pub symbol: String,
    /// Character offset into the lyric text at which the chord sounds.
    pub position: usize,
}

impl ChordToken {
    pub fn new(symbol: impl Into<String>, position: usize) -> Self {
        Self {
            symbol: symbol.into(),
            position,
        }
    }
}

/// Removes every `[SYMBOL]` marker from `line`, returning the chords with
/// their lyric positions and the remaining lyric text.
///
/// Positions count characters, not bytes. An unclosed `[` is kept as lyric
/// text, and empty markers are dropped.
pub fn split_chords_and_lyrics(line: &str) -> (Vec<ChordToken>, String) {
    let mut chords = Vec::new();
    let mut lyrics = String::with_capacity(line.len());
    let mut lyric_len = 0;
    let mut rest = line;

    while let Some(open) = rest.find('[') {
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find(']') else {
            break;
        };
        let symbol = &after_open[..close];

        // `[a [G]`: the first bracket is lyric text, retry from the inner one.
        if let Some(inner) = symbol.rfind('[') {
            let literal = &rest[..open + 1 + inner];
            lyrics.push_str(literal);
            lyric_len += literal.chars().count();
            rest = &rest[open + 1 + inner..];
            continue;
        }

        let before = &rest[..open];
        lyrics.push_str(before);
        lyric_len += before.chars().count();

        if !symbol.trim().is_empty() {
            chords.push(ChordToken::new(symbol, lyric_len));
        }
        rest = &after_open[close + 1..];
    }

    lyrics.push_str(rest);
    (chords, lyrics)
}

/// Inverse of [`split_chords_and_lyrics`]: writes each chord back as an
/// inline marker in front of the lyric character at its position.
pub fn join_chords_and_lyrics(chords: &[ChordToken], lyrics: &str) -> String {
    let mut line = String::with_capacity(lyrics.len() + chords.len() * 4);
    let mut pending = chords.iter().peekable();

    for (index, c) in lyrics.chars().enumerate() {
        while let Some(chord) = pending.next_if(|chord| chord.position <= index) {
            line.push('[');
            line.push_str(&chord.symbol);
            line.push(']');
        }
        line.push(c);
    }
    for chord in pending {
        line.push('[');
        line.push_str(&chord.symbol);
        line.push(']');
    }

    line
}

/// Rewrites the symbol of every chord marker in `line` through `f`.
pub fn map_chords(line: &str, mut f: impl FnMut(&str) -> String) -> String {
    let (chords, lyrics) = split_chords_and_lyrics(line);
    if chords.is_empty() {
        return line.to_string();
    }
    let mapped: Vec<ChordToken> = chords
        .into_iter()
        .map(|chord| ChordToken::new(f(&chord.symbol), chord.position))
        .collect();
    join_chords_and_lyrics(&mapped, &lyrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_basic() {
        let (chords, lyrics) = split_chords_and_lyrics("[G]Hello [C]world");
        assert_eq!(lyrics, "Hello world");
        assert_eq!(chords, vec![ChordToken::new("G", 0), ChordToken::new("C", 6)]);
    }

    #[test]
    fn test_split_adjacent_and_trailing() {
        let (chords, lyrics) = split_chords_and_lyrics("[Am][G]Sing it [D]");
        assert_eq!(lyrics, "Sing it ");
        assert_eq!(
            chords,
            vec![
                ChordToken::new("Am", 0),
                ChordToken::new("G", 0),
                ChordToken::new("D", 8),
            ]
        );
    }

    #[test]
    fn test_split_counts_characters() {
        let (chords, lyrics) = split_chords_and_lyrics("Über [C]alles, café [F]au lait");
        assert_eq!(lyrics, "Über alles, café au lait");
        assert_eq!(chords[0].position, 5);
        assert_eq!(chords[1].position, 17);
    }

    #[test]
    fn test_split_malformed_markers() {
        let (chords, lyrics) = split_chords_and_lyrics("no chords here");
        assert!(chords.is_empty());
        assert_eq!(lyrics, "no chords here");

        let (chords, lyrics) = split_chords_and_lyrics("open [G bracket");
        assert!(chords.is_empty());
        assert_eq!(lyrics, "open [G bracket");

        let (chords, lyrics) = split_chords_and_lyrics("a [b [G]c");
        assert_eq!(lyrics, "a [b c");
        assert_eq!(chords, vec![ChordToken::new("G", 5)]);

        let (chords, lyrics) = split_chords_and_lyrics("empty []marker");
        assert!(chords.is_empty());
        assert_eq!(lyrics, "empty marker");
    }

    #[test]
    fn test_positions_never_decrease() {
        for line in [
            "[C]a[D]b[E]c",
            "[C][D][E]",
            "x[C]  [D]y[E]",
            "[G]Hel[C]lo [D/F#]wor[Em7]ld[A]",
        ] {
            let (chords, _) = split_chords_and_lyrics(line);
            assert!(
                chords.windows(2).all(|w| w[0].position <= w[1].position),
                "{}",
                line
            );
        }
    }

    #[test]
    fn test_join_restores_line() {
        for line in ["[G]Hello [C]world", "[Am][G]Sing it [D]", "plain", "x[C]  [D]y"] {
            let (chords, lyrics) = split_chords_and_lyrics(line);
            assert_eq!(join_chords_and_lyrics(&chords, &lyrics), line);
        }
    }

    #[test]
    fn test_map_chords() {
        let mapped = map_chords("[G]Hello [C]world", |symbol| format!("{}7", symbol));
        assert_eq!(mapped, "[G7]Hello [C7]world");
        assert_eq!(map_chords("no chords", |_| unreachable!()), "no chords");
    }
}
