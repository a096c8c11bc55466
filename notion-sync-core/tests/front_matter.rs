use notion_sync_core::config::SyncSettings;
use notion_sync_core::contract::RemotePageDescriptor;
use notion_sync_core::document::{reassemble, Document};
use notion_sync_core::rewrite::{public_link, rewrite};

fn descriptor(id: &str) -> RemotePageDescriptor {
    RemotePageDescriptor {
        id: id.to_string(),
        url: format!("https://www.notion.so/Note-{id}"),
        created_time: String::new(),
        last_edited_time: String::new(),
    }
}

#[test]
fn test_parse_splits_front_matter_and_body() {
    let doc = Document::parse("---\ntitle: Hello\ntags: [a, b]\n---\n# Body\n\ntext\n").unwrap();

    assert_eq!(doc.body, "# Body\n\ntext\n");
    let keys: Vec<&str> = doc.front_matter.keys().collect();
    assert_eq!(keys, vec!["title", "tags"]);
}

#[test]
fn test_parse_without_front_matter() {
    let doc = Document::parse("just text\n---\nnot a header\n").unwrap();
    assert!(doc.front_matter.is_empty());
    assert_eq!(doc.body, "just text\n---\nnot a header\n");

    // Unterminated blocks are body text too.
    let open = Document::parse("---\ntitle: x\nno closing line").unwrap();
    assert!(open.front_matter.is_empty());
}

#[test]
fn test_parse_empty_block_and_crlf() {
    let empty = Document::parse("---\n---\nbody").unwrap();
    assert!(empty.front_matter.is_empty());
    assert_eq!(empty.body, "body");

    let crlf = Document::parse("---\r\ntitle: x\r\n---\r\nbody\r\n").unwrap();
    assert_eq!(crlf.front_matter.keys().collect::<Vec<_>>(), vec!["title"]);
    assert_eq!(crlf.body, "body\r\n");
}

#[test]
fn test_parse_rejects_non_mapping_front_matter() {
    let err = Document::parse("---\n- just\n- a list\n---\nbody").unwrap_err();
    assert!(err.contains("mapping"), "got: {err}");

    let err = Document::parse("---\ntitle: [unclosed\n---\nbody").unwrap_err();
    assert!(err.contains("YAML"), "got: {err}");
}

#[test]
fn test_reassemble_trims_exactly_one_header_newline() {
    assert_eq!(reassemble("a: 1\n", "body"), "---\na: 1\n---\nbody");
    assert_eq!(reassemble("a: 1\n\n", "body"), "---\na: 1\n\n---\nbody");
    assert_eq!(reassemble("a: 1", "\nbody"), "---\na: 1\n---\n\nbody");
}

#[test]
fn test_rewrite_round_trip_preserves_body_and_order() {
    let originals = [
        "---\ntitle: Hello\n---\nBody\n",
        "---\ntitle: Hello\n---\n\n\nTwo blank lines above\n",
        "---\nz: last\na: first\n---\n",
        "No front-matter at all\n",
        "\nLeading newline without front-matter\n",
        "",
    ];

    for original in originals {
        let doc = Document::parse(original).unwrap();
        let rewritten = rewrite(&doc, &descriptor("p1"), &SyncSettings::default());
        let text = rewritten.render().unwrap();

        let header = rewritten.front_matter.to_yaml().unwrap();
        let header = header.strip_suffix('\n').unwrap();
        assert_eq!(text, format!("---\n{header}\n---\n{}", doc.body));

        let reparsed = Document::parse(&text).unwrap();
        assert_eq!(reparsed.body, doc.body, "body drifted for {original:?}");
        assert_eq!(reparsed.front_matter, rewritten.front_matter);

        let original_keys: Vec<&str> = doc.front_matter.keys().collect();
        let new_keys: Vec<&str> = reparsed.front_matter.keys().collect();
        assert_eq!(&new_keys[..original_keys.len()], &original_keys[..]);
    }
}

#[test]
fn test_rewrite_is_stable_across_repeated_syncs() {
    let first = Document::parse("---\ntitle: Hello\n---\n\nBody\n").unwrap();
    let once = rewrite(&first, &descriptor("p1"), &SyncSettings::default())
        .render()
        .unwrap();
    let second = Document::parse(&once).unwrap();
    let twice = rewrite(&second, &descriptor("p2"), &SyncSettings::default())
        .render()
        .unwrap();

    assert_eq!(once.lines().count(), twice.lines().count());
    assert!(twice.ends_with("---\n\nBody\n"));
    let last = Document::parse(&twice).unwrap();
    assert_eq!(last.front_matter.remote_page_id().as_deref(), Some("p2"));
    assert_eq!(last.front_matter.keys().collect::<Vec<_>>(), vec!["title", "link", "remotePageId"]);
}

#[test]
fn test_public_link_substitutes_only_the_host() {
    let url = "https://www.notion.so/Note-www.notion.so-abc?pvs=4";
    assert_eq!(public_link(url, None), url);
    assert_eq!(
        public_link(url, Some("acme")),
        "https://acme.notion.site/Note-www.notion.so-abc?pvs=4"
    );
}

#[test]
fn test_blank_alias_is_ignored() {
    let settings = SyncSettings {
        workspace_alias: Some("   ".to_string()),
        ..SyncSettings::default()
    };
    let doc = Document::parse("body").unwrap();
    let rewritten = rewrite(&doc, &descriptor("p9"), &settings);
    assert_eq!(
        rewritten.front_matter.link().as_deref(),
        Some("https://www.notion.so/Note-p9")
    );
}

#[test]
fn test_reserved_key_accessors() {
    let doc = Document::parse(
        "---\nremotePageId: \"  \"\nremoteDatabaseId: 1234\nremoteDatabaseUrl: https://www.notion.so/x\n---\n",
    )
    .unwrap();
    let fm = &doc.front_matter;

    assert_eq!(fm.remote_page_id(), None, "blank ids count as absent");
    assert_eq!(fm.remote_database_id().as_deref(), Some("1234"));
    assert_eq!(fm.remote_database_url().as_deref(), Some("https://www.notion.so/x"));
    assert!(!fm.without("remoteDatabaseId").contains_key("remoteDatabaseId"));
    assert_eq!(fm.len(), 3);
}
