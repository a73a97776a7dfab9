use crate::document::{Document, Section, SectionLine};
use crate::line_parser::{ParsedLine, parse_extended_line, parse_line};
use thiserror::Error;
use tracing::{debug, warn};

/// Something the parser skipped or dropped. None of these stop a parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("Line #{line}: malformed directive \"{text}\" kept as text")]
    MalformedDirective { line: usize, text: String },
    #[error("Line #{line}: directive \"{name}\" ignored")]
    UnknownDirective { line: usize, name: String },
    #[error("Line #{line}: meta \"{key}\" has no value")]
    MissingMetaValue { line: usize, key: String },
    #[error("Line #{line}: content outside of any section dropped: \"{text}\"")]
    OrphanContent { line: usize, text: String },
    #[error("Line #{line}: section \"{label}\" is never closed")]
    UnterminatedSection { line: usize, label: String },
}

/// Parse result; always produced, whatever the input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParseOutput {
    pub document: Document,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutput {
    pub fn orphan_lines(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::OrphanContent { .. }))
            .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParserOptions {
    /// Also read metadata shorthands (`{title: ..}`, `{key: ..}`), `{comment: ..}`
    /// lines and the `sov`/`soc`/`sob` aliases. Off by default, in which case
    /// those are ignored like any other unknown directive.
    pub extended_directives: bool,
}

pub struct SongParser {
    options: ParserOptions,
    output: ParseOutput,
    // index into `sections` and the line that opened it
    current: Option<(usize, usize)>,
}

pub fn parse_song(content: &str) -> Document {
    parse_song_with_diagnostics(content).document
}

pub fn parse_song_with_diagnostics(content: &str) -> ParseOutput {
    let mut parser = SongParser::new();
    parser.parse(content)
}

pub fn parse_song_with_options(content: &str, options: ParserOptions) -> ParseOutput {
    let mut parser = SongParser::with_options(options);
    parser.parse(content)
}

impl Default for SongParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SongParser {
    pub fn new() -> Self {
        Self::with_options(ParserOptions::default())
    }

    pub fn with_options(options: ParserOptions) -> Self {
        Self {
            options,
            output: ParseOutput::default(),
            current: None,
        }
    }

    pub fn parse(&mut self, content: &str) -> ParseOutput {
        let classify = if self.options.extended_directives {
            parse_extended_line
        } else {
            parse_line
        };
        for (line_idx, line) in content.lines().enumerate() {
            self.feed(line_idx + 1, classify(line));
        }

        if let Some((index, opened_at)) = self.current.take() {
            let label = self.output.document.sections[index].label.clone();
            self.output.diagnostics.push(Diagnostic::UnterminatedSection {
                line: opened_at,
                label,
            });
        }

        let output = std::mem::take(&mut self.output);
        let orphans = output.orphan_lines();
        if orphans > 0 {
            warn!("Dropped {} line(s) outside of any section", orphans);
        }
        output
    }

    fn push_line(&mut self, line: usize, section_line: SectionLine) {
        match self.current {
            Some((index, _)) => self.output.document.sections[index]
                .lines
                .push(section_line),
            None => match section_line {
                SectionLine::Lyrics(text) => {
                    self.output
                        .diagnostics
                        .push(Diagnostic::OrphanContent { line, text });
                }
                SectionLine::Comment(text) => {
                    debug!("Line #{}: comment \"{}\" outside of a section", line, text)
                }
            },
        }
    }

    fn feed(&mut self, line: usize, parsed: ParsedLine) {
        match parsed {
            ParsedLine::Blank => {}
            ParsedLine::Meta { key, value } => {
                self.output.document.set_meta(&key, value);
            }
            ParsedLine::MetaWithoutValue { key } => {
                debug!("Line #{}: meta \"{}\" without value", line, key);
                self.output
                    .diagnostics
                    .push(Diagnostic::MissingMetaValue { line, key });
            }
            ParsedLine::StartSection { kind, label } => {
                let sections = &mut self.output.document.sections;
                sections.push(Section::new(kind, label));
                self.current = Some((sections.len() - 1, line));
            }
            ParsedLine::EndSection { .. } => {
                self.current = None;
            }
            ParsedLine::Comment(text) => self.push_line(line, SectionLine::Comment(text)),
            ParsedLine::IgnoredDirective { name } => {
                debug!("Line #{}: directive \"{}\" ignored", line, name);
                self.output
                    .diagnostics
                    .push(Diagnostic::UnknownDirective { line, name });
            }
            ParsedLine::Unbalanced(text) => {
                self.output.diagnostics.push(Diagnostic::MalformedDirective {
                    line,
                    text: text.clone(),
                });
                self.push_line(line, SectionLine::Lyrics(text));
            }
            ParsedLine::Content(text) => self.push_line(line, SectionLine::Lyrics(text)),
        }
    }
}
