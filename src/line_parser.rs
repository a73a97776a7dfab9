use crate::document::SectionKind;

/// What a single source line means to the song parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    Blank,
    Meta { key: String, value: String },
    MetaWithoutValue { key: String },
    StartSection { kind: SectionKind, label: Option<String> },
    EndSection { kind: SectionKind },
    Comment(String),
    /// A well-formed `{...}` line that carries no meaning here.
    IgnoredDirective { name: String },
    /// Starts with `{` but never closes; kept as text.
    Unbalanced(String),
    Content(String),
}

// Directive names stored under a metadata key.
const METADATA_DIRECTIVES: &[(&str, &str)] = &[
    ("title", "title"),
    ("t", "title"),
    ("subtitle", "subtitle"),
    ("st", "subtitle"),
    ("artist", "artist"),
    ("composer", "composer"),
    ("lyricist", "lyricist"),
    ("album", "album"),
    ("year", "year"),
    ("key", "key"),
    ("tempo", "tempo"),
    ("time", "time"),
    ("capo", "capo"),
    ("copyright", "copyright"),
];

const COMMENT_DIRECTIVES: &[&str] = &["comment", "c", "comment_italic", "ci", "comment_box", "cb"];

fn short_section_directive(name: &str) -> Option<(bool, SectionKind)> {
    match name {
        "sov" => Some((true, SectionKind::Verse)),
        "eov" => Some((false, SectionKind::Verse)),
        "soc" => Some((true, SectionKind::Chorus)),
        "eoc" => Some((false, SectionKind::Chorus)),
        "sob" => Some((true, SectionKind::Bridge)),
        "eob" => Some((false, SectionKind::Bridge)),
        _ => None,
    }
}

fn parse_meta_argument(argument: Option<&str>) -> ParsedLine {
    let Some(argument) = argument else {
        return ParsedLine::IgnoredDirective {
            name: "meta".to_string(),
        };
    };
    match argument.split_once(char::is_whitespace) {
        Some((key, value)) if !value.trim().is_empty() => ParsedLine::Meta {
            key: key.to_lowercase(),
            value: value.trim().to_string(),
        },
        Some((key, _)) => ParsedLine::MetaWithoutValue {
            key: key.to_lowercase(),
        },
        None => ParsedLine::MetaWithoutValue {
            key: argument.to_lowercase(),
        },
    }
}

fn parse_directive(inner: &str, extended: bool) -> ParsedLine {
    let (name, argument) = match inner.split_once(':') {
        Some((name, argument)) => (name.trim(), Some(argument.trim())),
        None => (inner.trim(), None),
    };
    let name = name.to_ascii_lowercase();
    let argument = argument.filter(|argument| !argument.is_empty());

    if name == "meta" {
        return parse_meta_argument(argument);
    }

    if let Some(kind) = name.strip_prefix("start_of_").and_then(SectionKind::from_name) {
        return ParsedLine::StartSection {
            kind,
            label: argument.map(str::to_string),
        };
    }

    if let Some(kind) = name.strip_prefix("end_of_").and_then(SectionKind::from_name) {
        return ParsedLine::EndSection { kind };
    }

    if extended {
        return parse_extended_directive(name, argument);
    }

    ParsedLine::IgnoredDirective { name }
}

// Shorthand metadata, comments and `so*`/`eo*` section aliases.
fn parse_extended_directive(name: String, argument: Option<&str>) -> ParsedLine {
    if COMMENT_DIRECTIVES.contains(&name.as_str()) {
        return match argument {
            Some(text) => ParsedLine::Comment(text.to_string()),
            None => ParsedLine::IgnoredDirective { name },
        };
    }

    if let Some((is_start, kind)) = short_section_directive(&name) {
        return if is_start {
            ParsedLine::StartSection {
                kind,
                label: argument.map(str::to_string),
            }
        } else {
            ParsedLine::EndSection { kind }
        };
    }

    if let Some((_, key)) = METADATA_DIRECTIVES.iter().find(|(alias, _)| *alias == name) {
        return match argument {
            Some(value) => ParsedLine::Meta {
                key: key.to_string(),
                value: value.to_string(),
            },
            None => ParsedLine::MetaWithoutValue {
                key: key.to_string(),
            },
        };
    }

    ParsedLine::IgnoredDirective { name }
}

/// Classifies a line using only `meta`, `start_of_*` and `end_of_*`; every
/// other directive is ignored.
pub fn parse_line(line: &str) -> ParsedLine {
    classify_line(line, false)
}

/// Like [`parse_line`], also reading metadata shorthands such as `{title: ..}`,
/// `{comment: ..}` lines and the `sov`/`soc`/`sob` section aliases.
pub fn parse_extended_line(line: &str) -> ParsedLine {
    classify_line(line, true)
}

fn classify_line(line: &str, extended: bool) -> ParsedLine {
    let trimmed = line.trim();

    if trimmed.is_empty() {
        return ParsedLine::Blank;
    }

    if let Some(body) = trimmed.strip_prefix('{') {
        return match body.strip_suffix('}') {
            Some(inner) => parse_directive(inner, extended),
            None => ParsedLine::Unbalanced(line.to_string()),
        };
    }

    ParsedLine::Content(line.to_string())
}
