use richtext_core::render::{render, PlainTextAdapter};
use richtext_core::{accessibility_label, parse, RenderConfig, RichTextError, StyledText};
use std::env;
use std::fs;
use std::process;
use tracing_subscriber::EnvFilter;

struct Options {
    file: String,
    config: Option<String>,
    width: Option<usize>,
    max_lines: usize,
}

fn usage() -> ! {
    eprintln!("Usage: richtext-render <file.html> [--config <file.yaml|file.json>] [--width N] [--max-lines N]");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  richtext-render note.html");
    eprintln!("  richtext-render note.html --config styles.yaml --width 40 --max-lines 3");
    process::exit(1);
}

fn parse_args(args: &[String]) -> Option<Options> {
    let mut file = None;
    let mut config = None;
    let mut width = None;
    let mut max_lines = 0;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => config = Some(iter.next()?.clone()),
            "--width" => width = Some(iter.next()?.parse().ok()?),
            "--max-lines" => max_lines = iter.next()?.parse().ok()?,
            other if other.starts_with("--") => return None,
            other => file = Some(other.to_string()),
        }
    }

    Some(Options {
        file: file?,
        config,
        width,
        max_lines,
    })
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(options) = parse_args(&args) else {
        usage();
    };

    match run(&options) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("✗ {} could not be rendered:", options.file);
            print_error(&e);
            process::exit(1);
        }
    }
}

fn run(options: &Options) -> Result<(), RichTextError> {
    let config = match &options.config {
        Some(path) => RenderConfig::from_file(path)?,
        None => RenderConfig::default(),
    };
    let markup = fs::read_to_string(&options.file).map_err(|e| RichTextError::Io {
        path: options.file.clone(),
        reason: e.to_string(),
    })?;

    let styled = parse(&markup, &config);
    print_fragments(&styled);
    println!();
    println!("label: {}", accessibility_label(&styled));

    if let Some(width) = options.width {
        let mut adapter = PlainTextAdapter::new(width);
        let handle = render(&mut adapter, &styled, &config, options.max_lines);
        println!();
        for line in adapter.output() {
            println!("|{}", line);
        }
        if handle.truncated {
            println!("(truncated to {} lines)", options.max_lines);
        }
    }
    Ok(())
}

fn print_fragments(styled: &StyledText) {
    println!("direction: {:?}", styled.direction());
    for fragment in styled.fragments() {
        let style = &fragment.style;
        let mut flags = Vec::new();
        if style.is_bold() {
            flags.push("bold".to_string());
        }
        if style.is_italic() {
            flags.push("italic".to_string());
        }
        if style.text_decoration.has_underline() {
            flags.push("underline".to_string());
        }
        if style.text_decoration.has_line_through() {
            flags.push("line-through".to_string());
        }
        if let Some(color) = style.color {
            flags.push(color.to_hex());
        }
        if let Some(link) = &style.link {
            flags.push(format!("link={}", link));
        }
        if let Some(direction) = style.direction {
            flags.push(format!("{:?}", direction).to_lowercase());
        }
        println!(
            "{:>4}..{:<4} {:>5.1}pt {:?} [{}]",
            fragment.range.start,
            fragment.range.end,
            style.font_size,
            fragment.text,
            flags.join(", ")
        );
    }
}

fn print_error(error: &RichTextError) {
    match error {
        RichTextError::Io { path, reason } => {
            eprintln!("  Failed to read '{}':", path);
            eprintln!("    {}", reason);
        }
        RichTextError::InvalidConfig { property, reason } => {
            eprintln!("  Invalid config value for '{}':", property);
            eprintln!("    {}", reason);
        }
        RichTextError::YamlError(msg) => {
            eprintln!("  YAML error:");
            eprintln!("    {}", msg);
        }
        RichTextError::JsonError(msg) => {
            eprintln!("  JSON error:");
            eprintln!("    {}", msg);
        }
        e => {
            eprintln!("  {}", e);
        }
    }
}
