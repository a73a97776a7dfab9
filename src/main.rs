use anyhow::{Context, Result, bail};
use chordsheet::transforms::apply_transforms;
use chordsheet::{
    ChordDisplayMode, Document, Key, ParserOptions, RenderOptions, Settings, SongIndex,
    parse_song_with_options, render,
};
use clap::{Arg, Command};
use std::path::Path;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(feature = "midi")]
use chordsheet::midi;

#[derive(Debug, PartialEq)]
enum InputFormat {
    Markup,
    Index,
}

#[derive(Debug, PartialEq)]
enum OutputFormat {
    Text,
    Json,
    Markup,
    Midi,
}

fn extension(file_path: &str) -> Result<String> {
    Path::new(file_path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .ok_or_else(|| anyhow::anyhow!("File has no extension: {}", file_path))
}

fn detect_input_format(file_path: &str) -> Result<InputFormat> {
    let extension = extension(file_path)?;
    match extension.as_str() {
        "cho" | "chopro" | "chordpro" | "crd" | "txt" => Ok(InputFormat::Markup),
        "json" => Ok(InputFormat::Index),
        _ => Err(anyhow::anyhow!("Unsupported input extension: .{}", extension)),
    }
}

fn detect_output_format(file_path: &str) -> Result<OutputFormat> {
    let extension = extension(file_path)?;
    match extension.as_str() {
        "txt" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        "cho" | "chopro" | "chordpro" => Ok(OutputFormat::Markup),
        "mid" | "midi" => Ok(OutputFormat::Midi),
        _ => Err(anyhow::anyhow!("Unsupported output extension: .{}", extension)),
    }
}

fn load_song(
    input_file: &str,
    song_id: Option<&str>,
    parser_options: ParserOptions,
) -> Result<(Document, Option<String>)> {
    let input_format = detect_input_format(input_file)
        .with_context(|| format!("Failed to detect input file format: {}", input_file))?;

    let (output, id) = match input_format {
        InputFormat::Markup => {
            debug!("Reading markup file: {}", input_file);
            let content = std::fs::read_to_string(input_file)
                .with_context(|| format!("Failed to read input file: {}", input_file))?;
            (
                parse_song_with_options(&content, parser_options),
                song_id.map(String::from),
            )
        }
        InputFormat::Index => {
            let Some(song_id) = song_id else {
                bail!("--song is required when reading a song index");
            };
            let index = SongIndex::load(input_file)?;
            let record = index
                .get(song_id)
                .ok_or_else(|| anyhow::anyhow!("Song {} not found in {}", song_id, input_file))?;
            (
                record.parse_with_options(parser_options),
                Some(record.id.clone()),
            )
        }
    };

    for diagnostic in &output.diagnostics {
        warn!("{}", diagnostic);
    }
    Ok((output.document, id))
}

fn main() -> Result<()> {
    let matches = Command::new("chordsheet")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render ChordPro songs with chords over lyrics")
        .arg(
            Arg::new("input")
                .help("Input file (.cho, .chordpro, .txt or a .json song index)")
                .required(true)
                .value_name("INPUT_FILE")
                .index(1),
        )
        .arg(
            Arg::new("output")
                .help("Output file (.txt, .json, .cho or .mid); prints text when omitted")
                .value_name("OUTPUT_FILE")
                .index(2),
        )
        .arg(
            Arg::new("song")
                .help("Song id to pick from a song index")
                .long("song")
                .short('s')
                .value_name("ID"),
        )
        .arg(
            Arg::new("transpose")
                .help("Transpose by semitones (e.g. +2, -3)")
                .long("transpose")
                .short('t')
                .allow_hyphen_values(true)
                .value_name("SEMITONES")
                .value_parser(clap::value_parser!(i32)),
        )
        .arg(
            Arg::new("key")
                .help("Key the song is written in, when it does not say (e.g. G, Em, Bb)")
                .long("key")
                .short('k')
                .value_name("KEY"),
        )
        .arg(
            Arg::new("nashville")
                .help("Show chords as Nashville numbers")
                .long("nashville")
                .short('n')
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("compact")
                .help("Collapse repeated sections to a repeat marker")
                .long("compact")
                .short('c')
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("chords")
                .help("Which chords to show: all, first-only or none")
                .long("chords")
                .value_name("MODE")
                .value_parser(clap::value_parser!(ChordDisplayMode)),
        )
        .arg(
            Arg::new("extended")
                .help("Also read shorthand directives such as {title:}, {soc} and {comment:}")
                .long("extended")
                .short('x')
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("settings")
                .help("Settings file with saved display preferences")
                .long("settings")
                .value_name("SETTINGS_FILE"),
        )
        .arg(
            Arg::new("verbose")
                .help("Enable verbose output")
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let verbose = matches.get_flag("verbose");
    let directive = if verbose {
        "chordsheet=debug"
    } else {
        "chordsheet=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with_writer(std::io::stderr)
        .init();

    debug!("chordsheet v{}", env!("CARGO_PKG_VERSION"));

    let Some(input_file) = matches.get_one::<String>("input") else {
        bail!("No input file given");
    };
    let output_file = matches.get_one::<String>("output");
    let settings_file = matches.get_one::<String>("settings");

    let parser_options = ParserOptions {
        extended_directives: matches.get_flag("extended"),
    };
    let (document, song_id) = load_song(
        input_file,
        matches.get_one::<String>("song").map(String::as_str),
        parser_options,
    )?;

    let mut settings = settings_file
        .map(Settings::load_or_default)
        .unwrap_or_default();
    let mut options: RenderOptions = settings.render_options(song_id.as_deref());

    if let Some(&semitones) = matches.get_one::<i32>("transpose") {
        options.transpose_semitones = semitones;
        if let (Some(path), Some(id)) = (settings_file, song_id.as_deref()) {
            settings.remember_transposition(id, semitones);
            settings.save(path)?;
            debug!("Saved transposition {} for song {}", semitones, id);
        }
    }
    if let Some(key) = matches.get_one::<String>("key") {
        options.key = Some(
            key.parse::<Key>()
                .with_context(|| format!("Invalid --key value: {}", key))?,
        );
    }
    if matches.get_flag("nashville") {
        options.nashville = true;
    }
    if matches.get_flag("compact") {
        options.compact = true;
    }
    if let Some(&mode) = matches.get_one::<ChordDisplayMode>("chords") {
        options.chord_display = mode;
    }
    debug!("Render options: {:?}", options);

    let Some(output_file) = output_file else {
        let mut rendered = render(&document, &options);
        rendered.id = song_id;
        print!("{}", rendered);
        return Ok(());
    };

    let output_format = detect_output_format(output_file)
        .with_context(|| format!("Failed to detect output file format: {}", output_file))?;

    let bytes = match output_format {
        OutputFormat::Text | OutputFormat::Json => {
            let mut rendered = render(&document, &options);
            rendered.id = song_id;
            if output_format == OutputFormat::Json {
                serde_json::to_string_pretty(&rendered)
                    .context("Failed to serialize rendered song")?
                    .into_bytes()
            } else {
                rendered.to_string().into_bytes()
            }
        }
        OutputFormat::Markup => apply_transforms(&document, &options.chord_transform(&document))
            .to_string()
            .into_bytes(),
        OutputFormat::Midi => {
            #[cfg(feature = "midi")]
            {
                midi::convert_song_to_midi(&document, &options, &Default::default())
                    .context("Failed to convert song to MIDI")?
            }
            #[cfg(not(feature = "midi"))]
            {
                bail!("MIDI support is not enabled. Compile with --features midi");
            }
        }
    };

    std::fs::write(output_file, &bytes)
        .with_context(|| format!("Failed to write output file: {}", output_file))?;
    info!("Wrote {} ({} bytes)", output_file, bytes.len());

    Ok(())
}
