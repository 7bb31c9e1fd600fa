//! Integration tests for rendering stored documents.

use folio::model::{DocumentNode, HeadingLevel, Mark};
use folio::render::{excerpt, to_text, FALLBACK_MARKUP};
use folio::{
    extract_metadata, render, render_batch, serialize, RenderOptions, SlugPolicy, StoredDocument,
};
use regex::Regex;
use serde_json::json;

fn text(t: &str) -> DocumentNode {
    DocumentNode::text(t)
}

fn para(t: &str) -> DocumentNode {
    DocumentNode::paragraph(vec![text(t)])
}

fn heading(level: HeadingLevel, t: &str) -> DocumentNode {
    DocumentNode::heading(level, vec![text(t)])
}

fn words(n: usize) -> String {
    vec!["word"; n].join(" ")
}

fn sample_post() -> DocumentNode {
    DocumentNode::doc(vec![
        heading(HeadingLevel::H1, "Building My Portfolio"),
        para("Intro text."),
        heading(HeadingLevel::H2, "Setup & Tools"),
        DocumentNode::bullet_list(vec![
            DocumentNode::list_item(vec![para("Rust")]),
            DocumentNode::list_item(vec![para("Tiptap")]),
        ]),
        heading(HeadingLevel::H3, "Café Notes"),
        DocumentNode::blockquote(vec![para("Ship it.")]),
        DocumentNode::code_block(Some("sh"), "cargo run"),
        DocumentNode::image("https://img.test/a.png", Some("Screenshot")),
    ])
}

#[test]
fn test_render_full_post() {
    let rendered = render(&serialize(&sample_post()), &RenderOptions::default());
    assert_eq!(
        rendered.markup,
        "<h1 id=\"building-my-portfolio\">Building My Portfolio</h1>\
         <p>Intro text.</p>\
         <h2 id=\"setup-tools\">Setup &amp; Tools</h2>\
         <ul><li><p>Rust</p></li><li><p>Tiptap</p></li></ul>\
         <h3 id=\"cafe-notes\">Café Notes</h3>\
         <blockquote><p>Ship it.</p></blockquote>\
         <pre><code class=\"language-sh\">cargo run</code></pre>\
         <img src=\"https://img.test/a.png\" alt=\"Screenshot\">"
    );

    let ids: Vec<&str> = rendered.headings.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["building-my-portfolio", "setup-tools", "cafe-notes"]);
    assert_eq!(rendered.headings[1].text, "Setup & Tools");
    assert_eq!(rendered.headings[2].level, 3);
    assert_eq!(rendered.estimated_read_minutes, 1);

    assert_eq!(rendered.stats.heading_count, 3);
    assert_eq!(rendered.stats.list_item_count, 2);
    assert_eq!(rendered.stats.code_block_count, 1);
    assert_eq!(rendered.stats.image_count, 1);
}

#[test]
fn test_metadata_matches_render() {
    let options = RenderOptions::default();
    let rendered = render(&serialize(&sample_post()), &options);
    let metadata = extract_metadata(&rendered.markup, &options.metadata_options());

    assert_eq!(metadata.headings, rendered.headings);
    assert_eq!(metadata.estimated_read_minutes, rendered.estimated_read_minutes);
    assert_eq!(metadata.word_count, rendered.stats.word_count);
}

#[test]
fn test_duplicate_headings() {
    let doc = DocumentNode::doc(vec![
        heading(HeadingLevel::H2, "Intro"),
        heading(HeadingLevel::H2, "Intro"),
        heading(HeadingLevel::H3, "Intro"),
    ]);

    let rendered = render(&serialize(&doc), &RenderOptions::default());
    let ids: Vec<&str> = rendered.headings.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["intro", "intro-2", "intro-3"]);

    let preserved = render(
        &serialize(&doc),
        &RenderOptions::new().with_slug_policy(SlugPolicy::Preserve),
    );
    assert!(preserved.headings.iter().all(|h| h.id == "intro"));
    assert_eq!(
        extract_metadata(
            &preserved.markup,
            &RenderOptions::new()
                .with_slug_policy(SlugPolicy::Preserve)
                .metadata_options()
        )
        .headings,
        preserved.headings
    );
}

#[test]
fn test_symbol_only_heading_gets_anchor() {
    let doc = DocumentNode::doc(vec![heading(HeadingLevel::H2, "!!!")]);
    let rendered = render(&serialize(&doc), &RenderOptions::default());
    assert_eq!(rendered.markup, "<h2 id=\"section\">!!!</h2>");
}

#[test]
fn test_reading_time_scales() {
    let minutes = |n: usize| {
        let doc = DocumentNode::doc(vec![para(&words(n))]);
        render(&serialize(&doc), &RenderOptions::default()).estimated_read_minutes
    };
    assert_eq!(minutes(1), 1);
    assert_eq!(minutes(200), 1);
    assert_eq!(minutes(450), 2);
    assert_eq!(minutes(1000), 5);

    let doc = DocumentNode::doc(vec![para(&words(1000))]);
    let slow = render(&serialize(&doc), &RenderOptions::new().with_words_per_minute(100));
    assert_eq!(slow.estimated_read_minutes, 10);
}

#[test]
fn test_block_tags_separate_words() {
    let doc = DocumentNode::doc(vec![
        para("end"),
        para("start"),
        DocumentNode::paragraph(vec![text("a"), DocumentNode::HardBreak, text("b")]),
    ]);
    let rendered = render(&serialize(&doc), &RenderOptions::default());
    assert_eq!(rendered.stats.word_count, 4);
}

#[test]
fn test_mark_nesting_order() {
    let doc = DocumentNode::doc(vec![DocumentNode::paragraph(vec![
        DocumentNode::marked("x", [Mark::Italic, Mark::Bold]),
        DocumentNode::marked("y", [Mark::Italic]),
    ])]);
    let rendered = render(&serialize(&doc), &RenderOptions::default());
    assert_eq!(
        rendered.markup,
        "<p><em><strong>x</strong>y</em></p>"
    );
}

#[test]
fn test_link_markup_and_schemes() {
    let doc = DocumentNode::doc(vec![DocumentNode::paragraph(vec![
        DocumentNode::marked("ok", [Mark::link("https://x.test/?a=1&b=2")]),
        text(" "),
        DocumentNode::marked("bad", [Mark::link("javascript:alert(1)")]),
        text(" "),
        DocumentNode::marked("mail", [Mark::link("mailto:me@x.test")]),
    ])]);
    let rendered = render(&serialize(&doc), &RenderOptions::default());
    assert_eq!(
        rendered.markup,
        "<p><a target=\"_blank\" rel=\"noopener noreferrer nofollow\" href=\"https://x.test/?a=1&amp;b=2\">ok</a> \
         bad \
         <a target=\"_blank\" rel=\"noopener noreferrer nofollow\" href=\"mailto:me@x.test\">mail</a></p>"
    );
    assert_eq!(rendered.stats.link_count, 2);
}

#[test]
fn test_malformed_documents_fall_back() {
    let options = RenderOptions::default();
    let cases = [
        json!({"type": "doc", "content": [{"type": "table"}]}),
        json!({"type": "doc", "content": [{"type": "heading", "attrs": {"level": 7}, "content": [{"type": "text", "text": "x"}]}]}),
        json!({"type": "doc", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "x", "marks": [{"type": "underline"}]}]}]}),
        json!({"type": "doc", "content": [{"type": "image", "attrs": {"src": ""}}]}),
        json!("not a document"),
    ];

    for value in cases {
        let rendered = render(&StoredDocument::from_value(value), &options);
        assert_eq!(rendered.markup, FALLBACK_MARKUP);
        assert!(rendered.headings.is_empty());
        assert_eq!(rendered.estimated_read_minutes, 1);
    }
}

#[test]
fn test_render_batch_isolates_failures() {
    let good = serialize(&DocumentNode::doc(vec![para("fine")]));
    let bad = StoredDocument::from_value(json!({"type": "doc", "content": 3}));
    let docs = vec![good.clone(), bad, good];

    for options in [RenderOptions::default(), RenderOptions::new().sequential()] {
        let results = render_batch(&docs, &options);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].markup, "<p>fine</p>");
        assert_eq!(results[1].markup, FALLBACK_MARKUP);
        assert_eq!(results[2].markup, "<p>fine</p>");
    }
}

#[test]
fn test_render_is_deterministic() {
    let stored = serialize(&sample_post());
    let options = RenderOptions::default();
    assert_eq!(render(&stored, &options), render(&stored, &options));
}

#[test]
fn test_plain_text_and_excerpt() {
    let doc = sample_post();
    let plain = to_text(&doc);
    assert!(plain.starts_with("Building My Portfolio\n\nIntro text."));
    assert!(plain.contains("- Rust\n- Tiptap"));
    assert!(plain.contains("> Ship it."));

    let short = excerpt(&doc, 30);
    assert!(short.ends_with('…'));
    assert!(short.chars().count() <= 31);
    assert!(short.starts_with("Building My Portfolio"));
}

fn heading_texts() -> Vec<String> {
    let mut texts: Vec<String> = [
        "!!!",
        "   ",
        "Café Résumé",
        "日本語",
        "Ünïcödé \u{2014} dash",
        "a--b",
        "-leading and trailing-",
        "C# & Rust",
        "Section",
        "v2.0 / v3.0",
        "Ｆｕｌｌｗｉｄｔｈ １２３",
        "tab\tseparated\nlines",
        "Intro",
        "Intro",
        "Intro 2",
        "intro-2",
    ]
    .iter()
    .map(|t| t.to_string())
    .collect();
    // Mixed ASCII, accents, symbols and separators.
    let pieces = ["Ä", "b", " ", "-", "&", "9", "ß", "\u{301}", "_", "é"];
    for seed in 0..40usize {
        let text: String = (0..(seed % 7) + 1)
            .map(|i| pieces[(seed * 7 + i * 3) % pieces.len()])
            .collect();
        texts.push(text);
    }
    texts
}

#[test]
fn test_heading_ids_are_valid_slugs() {
    let slug_pattern = Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").unwrap();
    let blocks: Vec<DocumentNode> = heading_texts()
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let level = HeadingLevel::new((i % 3) as u8 + 1).unwrap();
            DocumentNode::heading(level, vec![text(t)])
        })
        .collect();
    let count = blocks.len();
    let doc = DocumentNode::doc(blocks);

    let options = RenderOptions::default();
    let rendered = render(&serialize(&doc), &options);
    assert_eq!(rendered.headings.len(), count);

    let mut seen = std::collections::HashSet::new();
    for entry in &rendered.headings {
        assert!(slug_pattern.is_match(&entry.id), "bad anchor {:?} for {:?}", entry.id, entry.text);
        assert!(seen.insert(entry.id.clone()), "duplicate anchor {:?}", entry.id);
        assert!(rendered.markup.contains(&format!(" id=\"{}\"", entry.id)));
    }

    let metadata = extract_metadata(&rendered.markup, &options.metadata_options());
    assert_eq!(metadata.headings, rendered.headings);
}

#[test]
fn test_styled_heading_ids_match_metadata() {
    let doc = DocumentNode::doc(vec![
        DocumentNode::heading(
            HeadingLevel::H2,
            vec![
                text("Setup "),
                DocumentNode::marked("& Tools", [Mark::Bold]),
                DocumentNode::marked(" <fast>", [Mark::Code, Mark::link("/tools")]),
            ],
        ),
        heading(HeadingLevel::H2, "Setup & Tools <fast>"),
    ]);

    let options = RenderOptions::default();
    let rendered = render(&serialize(&doc), &options);
    let ids: Vec<&str> = rendered.headings.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["setup-tools-fast", "setup-tools-fast-2"]);
    assert_eq!(
        extract_metadata(&rendered.markup, &options.metadata_options()).headings,
        rendered.headings
    );
}

#[test]
fn test_markdown_link_without_target_renders_as_text() {
    let stored = folio::markdown_to_stored("Intro paragraph with [a link]( ) inside.\n\n## Heading");
    let rendered = render(&stored, &RenderOptions::default());
    assert_eq!(
        rendered.markup,
        "<p>Intro paragraph with a link inside.</p><h2 id=\"heading\">Heading</h2>"
    );
    assert_eq!(rendered.stats.link_count, 0);
}
