use chordsheet::{
    ChordDisplayMode, ParserOptions, RenderOptions, SectionBody, SongIndex, parse_song,
    parse_song_with_diagnostics, parse_song_with_options, render,
};
use pretty_assertions::assert_eq;

const TEST_SONG: &str = "{meta: title Test Song}
{start_of_verse}
[G]Hello [C]world
{end_of_verse}
";

fn shifted(semitones: i32) -> RenderOptions {
    RenderOptions {
        transpose_semitones: semitones,
        ..Default::default()
    }
}

#[test]
fn test_transposed_song_text() {
    let song = render(&parse_song(TEST_SONG), &shifted(2));
    assert_eq!(
        song.to_string(),
        "Test Song
Key: A

[Verse]
A     D
Hello world
"
    );
}

#[test]
fn test_extreme_shifts_wrap_around() {
    let document = parse_song(TEST_SONG);
    for (semitones, chords, key) in [
        (i32::MAX, "D     G", "D"),
        (i32::MIN, "B     E", "B"),
        (i32::MIN + 1, "C     F", "C"),
    ] {
        let song = render(&document, &shifted(semitones));
        assert_eq!(song.key.as_deref(), Some(key));
        match &song.sections[0].body {
            SectionBody::Lines(lines) => assert_eq!(lines[0].chords.as_deref(), Some(chords)),
            SectionBody::Repeat(_) => panic!("expected lines"),
        }

        let options = RenderOptions {
            nashville: true,
            ..shifted(semitones)
        };
        let text = render(&document, &options).to_string();
        assert!(text.contains("I     IV"), "{}", text);
    }
}

#[test]
fn test_unknown_chords_survive_every_shift() {
    let document = parse_song("{start_of_verse}\n[XYZ123]Lyrics\n{end_of_verse}");
    for semitones in -12..=12 {
        for nashville in [false, true] {
            let options = RenderOptions {
                nashville,
                ..shifted(semitones)
            };
            let text = render(&document, &options).to_string();
            assert!(text.contains("XYZ123"), "{}", text);
            assert!(text.contains("Lyrics"), "{}", text);
        }
    }
}

#[test]
fn test_compact_repeats() {
    let input = r#"
{start_of_chorus}
[C]La
{end_of_chorus}
{start_of_verse}
[G]Hey
{end_of_verse}
{start_of_chorus}
[C]La
{end_of_chorus}
{start_of_chorus}
[C]La
{end_of_chorus}
"#;
    let options = RenderOptions {
        compact: true,
        ..Default::default()
    };
    let song = render(&parse_song(input), &options);
    let bodies: Vec<_> = song
        .sections
        .iter()
        .map(|section| match &section.body {
            SectionBody::Lines(lines) => format!("{}: {} line(s)", section.label, lines.len()),
            SectionBody::Repeat(marker) => marker.clone(),
        })
        .collect();
    assert_eq!(
        bodies,
        vec![
            "Chorus: 1 line(s)",
            "Verse: 1 line(s)",
            "(Repeat Chorus ×2)",
            "(Repeat Chorus ×3)",
        ]
    );
}

#[test]
fn test_metadata_keys_are_case_insensitive() {
    for input in ["{meta: Title Blue Moon}", "{meta: title Blue Moon}"] {
        let document = parse_song(input);
        assert_eq!(document.meta("title"), Some("Blue Moon"));
        assert_eq!(document.title(), Some("Blue Moon"));
    }
}

#[test]
fn test_orphan_lines_are_reported() {
    let output = parse_song_with_diagnostics(
        "stray line\n{start_of_verse}\n[G]Kept\n{end_of_verse}\nanother stray\n",
    );
    assert_eq!(output.document.sections.len(), 1);
    assert_eq!(output.document.sections[0].lines.len(), 1);
    assert_eq!(output.orphan_lines(), 2);
}

#[test]
fn test_song_index_flow() {
    let index = SongIndex::from_json(
        r#"{"songs": [{
            "id": 12,
            "title": "Index Song",
            "artist": "Somebody",
            "content":
                "{meta: key D}\n{start_of_chorus}\n[D]Sing [A7]out [Bm]loud\n{end_of_chorus}",
            "first_line": "Sing out loud"
        }]}"#,
    )
    .unwrap();
    let record = index.get("12").unwrap();

    let options = RenderOptions {
        nashville: true,
        chord_display: ChordDisplayMode::All,
        ..Default::default()
    };
    let song = record.render(&options);
    assert_eq!(song.id.as_deref(), Some("12"));
    assert_eq!(song.title.as_deref(), Some("Index Song"));

    let json = serde_json::to_value(&song).unwrap();
    assert_eq!(json["id"], "12");
    assert_eq!(json["key"], "D");
    assert_eq!(json["sections"][0]["kind"], "chorus");
    assert_eq!(json["sections"][0]["body"]["type"], "lines");
    assert_eq!(json["sections"][0]["body"]["value"][0]["chords"], "I    V7  vi");
    assert_eq!(json["sections"][0]["body"]["value"][0]["lyrics"], "Sing out loud");
}

#[test]
fn test_transposed_markup_round_trip() {
    let document =
        parse_song("{meta: key G}\n{start_of_verse: Intro}\n[G]One [D/F#]two\n{end_of_verse}\n");
    let transposed = chordsheet::transforms::transpose::transform(&document, 3);
    let markup = transposed.to_string();
    assert!(markup.contains("{meta: key Bb}"), "{}", markup);
    assert!(markup.contains("[Bb]One [F/A]two"), "{}", markup);

    let reparsed = parse_song(&markup);
    assert_eq!(reparsed, transposed);
}

#[test]
fn test_comment_directives_are_opt_in() {
    let input = "{start_of_verse}\n{comment: softly}\n{c: x}\n[G]Go\n{end_of_verse}\n";

    let song = render(&parse_song(input), &RenderOptions::default());
    assert_eq!(song.to_string(), "Key: G\n\n[Verse]\nG\nGo\n");

    let options = ParserOptions {
        extended_directives: true,
    };
    let document = parse_song_with_options(input, options).document;
    let song = render(&document, &RenderOptions::default());
    assert_eq!(song.to_string(), "Key: G\n\n[Verse]\nsoftly\nx\nG\nGo\n");
}
