//! Integration tests for the stored-document codec.

use folio::model::{schema, DocumentNode, HeadingLevel, Mark};
use folio::{
    deserialize, deserialize_or_placeholder, from_json, serialize, to_json, Error, JsonFormat,
    StoredDocument,
};
use serde_json::json;

fn rich_post() -> DocumentNode {
    DocumentNode::doc(vec![
        DocumentNode::heading(HeadingLevel::H1, vec![DocumentNode::text("Release notes")]),
        DocumentNode::paragraph(vec![
            DocumentNode::text("Read "),
            DocumentNode::marked(
                "the guide",
                [
                    Mark::Bold,
                    Mark::Link {
                        href: "https://guide.test".into(),
                        target: Some("_blank".into()),
                    },
                ],
            ),
            DocumentNode::HardBreak,
            DocumentNode::marked("then ship", [Mark::Italic, Mark::Code]),
        ]),
        DocumentNode::OrderedList {
            start: 3,
            content: vec![DocumentNode::list_item(vec![
                DocumentNode::paragraph(vec![DocumentNode::text("third")]),
                DocumentNode::bullet_list(vec![DocumentNode::list_item(vec![
                    DocumentNode::paragraph(vec![DocumentNode::text("nested")]),
                ])]),
            ])],
        },
        DocumentNode::blockquote(vec![DocumentNode::paragraph(vec![DocumentNode::text("Quote")])]),
        DocumentNode::code_block(Some("rust"), "fn main() {\n    println!(\"hi\");\n}"),
        DocumentNode::code_block(None, "plain"),
        DocumentNode::Image {
            src: "/images/diagram.png".into(),
            alt: Some("Diagram".into()),
            title: Some("Architecture".into()),
        },
        DocumentNode::paragraph(Vec::new()),
    ])
}

#[test]
fn test_round_trip_through_json_text() {
    let doc = rich_post();
    for format in [JsonFormat::Pretty, JsonFormat::Compact] {
        let text = to_json(&serialize(&doc), format).unwrap();
        let decoded = deserialize(&from_json(&text).unwrap()).unwrap();
        assert_eq!(decoded, doc);
    }
}

#[test]
fn test_serialization_is_deterministic() {
    let first = to_json(&serialize(&rich_post()), JsonFormat::Compact).unwrap();
    let second = to_json(&serialize(&rich_post()), JsonFormat::Compact).unwrap();
    assert_eq!(first, second);

    let text = DocumentNode::doc(vec![DocumentNode::paragraph(vec![DocumentNode::marked(
        "x",
        [Mark::Bold],
    )])]);
    assert_eq!(
        to_json(&serialize(&text), JsonFormat::Compact).unwrap(),
        r#"{"content":[{"content":[{"marks":[{"type":"bold"}],"text":"x","type":"text"}],"type":"paragraph"}],"type":"doc"}"#
    );
}

#[test]
fn test_editor_output_with_nulls_decodes() {
    let stored = StoredDocument::from_value(json!({
        "type": "doc",
        "content": [
            {"type": "heading", "attrs": {"level": 2}, "content": [{"type": "text", "text": "Hi"}]},
            {"type": "codeBlock", "attrs": {"language": null}, "content": [{"type": "text", "text": "x"}]},
            {"type": "image", "attrs": {"src": "/a.png", "alt": null, "title": null}},
            {"type": "paragraph", "content": []}
        ]
    }));

    let doc = deserialize(&stored).unwrap();
    assert_eq!(doc.content()[1], DocumentNode::code_block(None, "x"));
    assert_eq!(doc.content()[2], DocumentNode::image("/a.png", None));
    assert_eq!(doc.content()[3], DocumentNode::paragraph(Vec::new()));

    // Re-encoding drops the nulls and empty arrays.
    let value = serialize(&doc).into_value();
    assert!(value["content"][1].get("attrs").is_none());
    assert!(value["content"][3].get("content").is_none());
}

#[test]
fn test_malformed_errors_name_the_node() {
    let stored = StoredDocument::from_value(json!({
        "type": "doc",
        "content": [
            {"type": "paragraph"},
            {"type": "bulletList", "content": [
                {"type": "listItem", "content": [{"type": "mystery"}]}
            ]}
        ]
    }));

    match deserialize(&stored) {
        Err(Error::MalformedDocument { path, .. }) => {
            assert_eq!(path, "$.content[1].content[0].content[0]");
        }
        other => panic!("expected malformed document, got {:?}", other),
    }
}

#[test]
fn test_schema_violations_are_malformed() {
    let cases = [
        // Text directly under the root
        json!({"type": "doc", "content": [{"type": "text", "text": "loose"}]}),
        // Paragraph inside a paragraph
        json!({"type": "doc", "content": [{"type": "paragraph", "content": [{"type": "paragraph"}]}]}),
        // Root of the wrong kind
        json!({"type": "paragraph"}),
        // Empty text node
        json!({"type": "doc", "content": [{"type": "paragraph", "content": [{"type": "text", "text": ""}]}]}),
    ];
    for value in cases {
        let err = deserialize(&StoredDocument::from_value(value)).unwrap_err();
        assert!(err.is_malformed(), "unexpected error: {}", err);
    }
}

#[test]
fn test_placeholder_for_corrupt_content() {
    let doc = deserialize_or_placeholder(&StoredDocument::from_value(json!([1, 2, 3])));
    assert_eq!(doc.text_content(), folio::codec::PLACEHOLDER_TEXT);
    assert_eq!(deserialize_or_placeholder(&serialize(&rich_post())), rich_post());
}

#[test]
fn test_invalid_json_text() {
    assert!(matches!(from_json("{\"type\": "), Err(Error::Json(_))));
}

/// Every subset of the formatting marks, with and without each kind of link.
fn mark_combinations() -> Vec<Vec<Mark>> {
    let formatting = [Mark::Bold, Mark::Italic, Mark::Code];
    let links = [
        None,
        Some(Mark::link("https://x.test/a?b=1&c=\"2\"")),
        Some(Mark::Link {
            href: "/relative".into(),
            target: Some("_blank".into()),
        }),
        // Unsafe schemes are neutralized at render time, not in storage.
        Some(Mark::link("javascript:alert(1)")),
    ];

    let mut combos = Vec::new();
    for bits in 0..(1u8 << formatting.len()) {
        for link in &links {
            let mut marks: Vec<Mark> = formatting
                .iter()
                .enumerate()
                .filter(|(i, _)| bits & (1 << i) != 0)
                .map(|(_, m)| m.clone())
                .collect();
            if let Some(link) = link {
                // Vary where the link sits in insertion order.
                marks.insert(usize::from(bits) % (marks.len() + 1), link.clone());
            }
            combos.push(marks);
        }
    }
    combos
}

fn wrap(block: DocumentNode) -> DocumentNode {
    DocumentNode::doc(vec![block])
}

#[test]
fn test_round_trip_table() {
    let mut cases = Vec::new();

    for marks in mark_combinations() {
        cases.push(wrap(DocumentNode::paragraph(vec![
            DocumentNode::text("before "),
            DocumentNode::marked("styled", marks),
        ])));
    }
    for (alt, title) in [
        (None, None),
        (Some("Alt"), None),
        (None, Some("Title")),
        (Some(""), Some("Both <b>")),
    ] {
        cases.push(wrap(DocumentNode::Image {
            src: "https://cdn.test/a b.png".into(),
            alt: alt.map(String::from),
            title: title.map(String::from),
        }));
    }
    for language in [None, Some("rust"), Some("c++")] {
        cases.push(wrap(DocumentNode::code_block(language, "let x = 1;\n\tindent")));
    }
    for start in [1, 7, u32::MAX] {
        cases.push(wrap(DocumentNode::OrderedList {
            start,
            content: vec![DocumentNode::list_item(vec![DocumentNode::paragraph(vec![
                DocumentNode::text("item"),
            ])])],
        }));
    }
    for level in 1..=3 {
        let level = HeadingLevel::new(level).unwrap();
        cases.push(wrap(DocumentNode::heading(
            level,
            vec![DocumentNode::text("Title "), DocumentNode::HardBreak, DocumentNode::text("two")],
        )));
    }

    for doc in cases {
        assert!(schema::validate(&doc).is_ok(), "invalid case: {:?}", doc);
        let text = to_json(&serialize(&doc), JsonFormat::Compact).unwrap();
        let decoded = deserialize(&from_json(&text).unwrap());
        assert_eq!(decoded.as_ref().ok(), Some(&doc), "round trip failed for {}", text);
    }
}

#[test]
fn test_validation_and_decoding_agree() {
    let paragraph = |marks: Vec<Mark>| wrap(DocumentNode::paragraph(vec![DocumentNode::marked("x", marks)]));
    let cases = vec![
        paragraph(vec![Mark::link("")]),
        paragraph(vec![Mark::Bold, Mark::link(" \t")]),
        paragraph(vec![Mark::link("#top")]),
        wrap(DocumentNode::image("  ", Some("blank"))),
        wrap(DocumentNode::image("/ok.png", Some("ok"))),
        wrap(DocumentNode::OrderedList {
            start: 0,
            content: vec![DocumentNode::list_item(vec![DocumentNode::paragraph(Vec::new())])],
        }),
        wrap(DocumentNode::paragraph(vec![DocumentNode::text("   ")])),
    ];

    for doc in cases {
        let valid = schema::validate(&doc).is_ok();
        match deserialize(&serialize(&doc)) {
            Ok(decoded) => {
                assert!(valid, "decoded a tree that fails validation: {:?}", doc);
                assert_eq!(decoded, doc);
            }
            Err(err) => {
                assert!(!valid, "valid tree rejected by the codec: {}", err);
                assert!(err.is_malformed());
            }
        }
    }
}
