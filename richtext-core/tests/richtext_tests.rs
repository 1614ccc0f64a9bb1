use pretty_assertions::assert_eq;
use richtext_core::diagnostics::CollectingDiagnostics;
use richtext_core::layout::{layout_paragraph, CellMeasure};
use richtext_core::truncate::{truncate, Truncation};
use richtext_core::{
    accessibility_label, parse, parse_with_diagnostics, BlockKind, Color, Diagnostic,
    RenderConfig, RichTextError, StyledText, TagStyle, TagStyles, TextDirection,
};
use std::fs;
use std::path::PathBuf;

fn get_fixture_path(filename: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("fixtures");
    path.push(filename);
    path
}

fn fragment_texts(styled: &StyledText) -> Vec<&str> {
    styled.fragments().iter().map(|f| f.text.as_str()).collect()
}

// Scenarios

#[test]
fn test_bold_fragment() {
    let styled = parse("<b>Hello</b> world", &RenderConfig::default());
    assert_eq!(fragment_texts(&styled), vec!["Hello", " world"]);
    assert!(styled.fragments()[0].style.is_bold());
    assert!(!styled.fragments()[1].style.is_bold());
}

#[test]
fn test_bullet_list() {
    let styled = parse(
        "<ul><li>First</li><li>Second</li></ul>",
        &RenderConfig::default(),
    );
    assert_eq!(styled.text(), "• First\n• Second");
    assert_eq!(styled.blocks().len(), 2);
    assert!(styled
        .blocks()
        .iter()
        .all(|b| matches!(b.kind, BlockKind::ListItem { level: 1, .. })));
}

#[test]
fn test_javascript_link_is_plain_text() {
    let styled = parse(
        r#"<a href="javascript:alert(1)">Link</a>"#,
        &RenderConfig::default(),
    );
    assert_eq!(fragment_texts(&styled), vec!["Link"]);
    assert_eq!(styled.fragments()[0].style.link, None);
    assert_eq!(styled.fragments()[0].style.color, None);
}

#[test]
fn test_empty_input() {
    let styled = parse("", &RenderConfig::default());
    assert!(styled.fragments().is_empty());
    assert_eq!(styled.text(), "");
}

#[test]
fn test_truncation_avoids_mid_word_cut() {
    let styled = parse("Hello World Wide Web", &RenderConfig::default());
    let layout = layout_paragraph(&styled, 15.0, &CellMeasure);
    let Truncation::Truncated(result) = truncate(&styled, Some(&layout), 1, &CellMeasure) else {
        panic!("expected truncation");
    };
    assert_eq!(&styled.text()[..result.raw_cut], "Hello World Wi");
    assert_eq!(result.text.text(), "Hello World…");
    let last = result.text.fragments().last().map(|f| f.text.as_str());
    assert_eq!(last, Some("…"));
}

#[test]
fn test_strong_override_adds_color() {
    let config = RenderConfig {
        tag_styles: TagStyles::new().with(
            "strong",
            TagStyle {
                color: Color::parse("#FF0000"),
                ..TagStyle::default()
            },
        ),
        ..RenderConfig::default()
    };
    let styled = parse("<strong>Bold</strong>", &config);
    let style = &styled.fragments()[0].style;
    assert!(style.is_bold());
    assert_eq!(style.color, Some(Color::rgb(0xFF, 0, 0)));
}

// Fixtures

#[test]
fn test_release_notes_fixture() {
    let markup = fs::read_to_string(get_fixture_path("release-notes.html")).unwrap();
    let diagnostics = CollectingDiagnostics::new();
    let styled = parse_with_diagnostics(&markup, &RenderConfig::default(), &diagnostics);

    assert_eq!(
        styled.text(),
        "Release notes\n\
         This release makes rendering faster and fixes a few bugs.\n\
         • Lists nest properly\n\
         • Links like the docs are blue\n\
         Unsafe links stay plain text."
    );
    assert_eq!(
        diagnostics.events(),
        vec![Diagnostic::RejectedLink {
            href: "javascript:alert(1)".to_string()
        }]
    );
    assert!(styled.validate().is_ok());

    let links: Vec<_> = styled
        .fragments()
        .iter()
        .filter_map(|f| f.style.link.as_deref().map(|l| (f.text.as_str(), l)))
        .collect();
    assert_eq!(links, vec![("the docs", "https://example.com/docs")]);
}

#[test]
fn test_release_notes_accessibility_label() {
    let markup = fs::read_to_string(get_fixture_path("release-notes.html")).unwrap();
    let styled = parse(&markup, &RenderConfig::default());
    assert_eq!(
        accessibility_label(&styled),
        "Release notes. This release makes rendering faster and fixes a few bugs. \
         Lists nest properly, Links like the docs are blue. Unsafe links stay plain text."
    );
}

#[test]
fn test_yaml_config_fixture() {
    let config = RenderConfig::from_file(get_fixture_path("styles.yaml")).unwrap();
    assert_eq!(config.font_size, 16.0);
    assert!(config.detect_links.web_urls);
    assert!(!config.detect_links.emails);

    let markup = fs::read_to_string(get_fixture_path("release-notes.html")).unwrap();
    let styled = parse(&markup, &config);

    let heading = &styled.fragments()[0];
    assert_eq!(heading.text, "Release notes");
    assert_eq!(heading.style.font_size, 20.0);
    assert!(heading.style.is_bold());

    let strong = styled
        .fragments()
        .iter()
        .find(|f| f.text == "rendering")
        .unwrap();
    assert!(strong.style.is_bold());
    assert_eq!(strong.style.color, Some(Color::rgb(0xFF, 0, 0)));

    let link = styled
        .fragments()
        .iter()
        .find(|f| f.style.link.is_some())
        .unwrap();
    assert!(!link.style.text_decoration.has_underline());
    assert_eq!(link.style.color, Some(Color::rgb(0x00, 0x7A, 0xFF)));

    let body = styled.fragments().last().unwrap();
    assert_eq!(body.style.color, Some(Color::rgb(0x33, 0x33, 0x33)));
    assert_eq!(body.style.font_size, 16.0);
}

#[test]
fn test_invalid_config_fixture() {
    let result = RenderConfig::from_file(get_fixture_path("invalid-font-size.yaml"));
    assert!(matches!(
        result,
        Err(RichTextError::InvalidConfig { ref property, .. }) if property == "fontSize"
    ));
}

// Behaviour across modules

#[test]
fn test_reparse_is_identical() {
    let markup = "<p dir=\"auto\">שלום <b>world</b></p><ol><li>a<li>b</ol>";
    let config = RenderConfig::default();
    assert_eq!(parse(markup, &config), parse(markup, &config));
}

#[test]
fn test_rtl_paragraph_direction() {
    let styled = parse("<p>مرحبا بالعالم</p>", &RenderConfig::default());
    assert_eq!(styled.direction(), TextDirection::Rtl);
}

#[test]
fn test_auto_links_in_plain_text() {
    let config = RenderConfig::from_yaml_str("detectLinks:\n  webUrls: true\n  emails: true\n")
        .unwrap();
    let styled = parse("Write to ann@example.org or see www.example.com.", &config);
    let links: Vec<_> = styled
        .fragments()
        .iter()
        .filter_map(|f| f.style.link.as_deref())
        .collect();
    assert_eq!(links, vec!["mailto:ann@example.org", "https://www.example.com"]);
}

#[test]
fn test_utf16_ranges_for_native_apis() {
    let styled = parse("😀 <b>bold</b>", &RenderConfig::default());
    let bold = &styled.fragments()[1];
    assert_eq!(bold.range, 5..9);
    assert_eq!(styled.utf16_range(&bold.range), 3..7);
}

#[test]
fn test_truncation_keeps_list_blocks_in_bounds() {
    let styled = parse(
        "<ul><li>alpha beta gamma</li><li>delta epsilon</li></ul>",
        &RenderConfig::default(),
    );
    let layout = layout_paragraph(&styled, 12.0, &CellMeasure);
    let Truncation::Truncated(result) = truncate(&styled, Some(&layout), 2, &CellMeasure) else {
        panic!("expected truncation");
    };
    assert!(result.text.validate().is_ok());
    assert!(result.cut <= result.raw_cut);
    assert!(result
        .text
        .blocks()
        .iter()
        .all(|b| b.range.end <= result.visible_len));
}

#[test]
fn test_root_dir_decides_paragraph_direction() {
    use richtext_core::render::{render, PlainTextAdapter};

    let config = RenderConfig::default();
    let styled = parse(r#"<div dir="rtl">Hello world</div>"#, &config);
    assert_eq!(styled.direction(), TextDirection::Rtl);

    let mut adapter = PlainTextAdapter::new(13);
    render(&mut adapter, &styled, &config, 0);
    assert_eq!(adapter.output(), &["  Hello world".to_string()]);
}

#[test]
fn test_decoration_override_layers_over_outer_strike() {
    let json = r#"{"tagStyles": {"u": {"textDecorationLine": "underline"}}}"#;
    let config = RenderConfig::from_json_str(json).unwrap();
    let styled = parse("<s>a<u>b</u></s>", &config);
    let b = &styled.fragments()[1];
    assert_eq!(b.text, "b");
    assert!(b.style.text_decoration.has_underline());
    assert!(b.style.text_decoration.has_line_through());
}

#[test]
fn test_out_of_range_list_start_never_panics() {
    let styled = parse(
        r#"<ol start="18446744073709551615"><li>a</li><li>b</li></ol><ol start="-1"><li>c</li></ol>"#,
        &RenderConfig::default(),
    );
    assert!(styled.validate().is_ok());
    assert!(styled.text().ends_with("1. c"));
}
