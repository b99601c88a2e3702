//! End-to-end checks through the public library API.

use downedit::export::{layout_docx, render_docx, DocxBlock, DocxOptions, ExportFormat};
use downedit::markdown::{
    beautify, classify, generate_table_markdown, parse_inline, Alignment, BeautifyOptions,
    FenceState, InlineRun, TableSpec,
};
use downedit::storage::MemoryKvStore;
use downedit::{export_document, import_word, DocumentStore, ImportOptions, Settings};

const HOUR: i64 = 60 * 60 * 1000;

fn wrapping(width: usize) -> BeautifyOptions {
    BeautifyOptions {
        wrap_lines: true,
        wrap_width: width,
        ..BeautifyOptions::default()
    }
}

#[test]
fn classify_is_pure_in_line_and_fence_state() {
    let lines = [
        "# Head",
        "- item",
        "```rust",
        "plain",
        "---",
        "| a | b |",
        "  1. x",
    ];
    let states = [FenceState::default(), FenceState::open("rust")];
    for state in &states {
        for line in lines {
            assert_eq!(
                classify(line, state),
                classify(line, state),
                "line: {line:?}"
            );
        }
    }
}

#[test]
fn inline_runs_reconstruct_the_line() {
    let lines = [
        "plain text only",
        "**a** *b* `c` [d](e)",
        "mixed **bold** and *it* with `code` then [link](http://x.y) end",
        "unclosed **bold and *star",
        "",
    ];
    for line in lines {
        let rebuilt: String = parse_inline(line)
            .iter()
            .map(InlineRun::to_markdown)
            .collect();
        assert_eq!(rebuilt, line);
    }
}

#[test]
fn bold_takes_precedence_over_italic() {
    assert_eq!(
        parse_inline("**a** *b*"),
        vec![
            InlineRun::Bold("a".to_string()),
            InlineRun::PlainText(" ".to_string()),
            InlineRun::Italic("b".to_string()),
        ]
    );
}

#[test]
fn beautify_is_idempotent() {
    let input =
        "Title\n===\n\n\n\nSome    text   \n* one\n   * two\nSub\n---\n```\n\n\nkeep   \n```\n";
    for options in [BeautifyOptions::default(), wrapping(30)] {
        let once = beautify(input, &options);
        assert_eq!(beautify(&once, &options), once);
    }
}

#[test]
fn setext_heading_becomes_atx() {
    let out = beautify("Title\n===\n", &BeautifyOptions::default());
    assert!(out.starts_with("# Title"));
    assert!(!out
        .lines()
        .any(|l| !l.is_empty() && l.chars().all(|c| c == '=')));
}

#[test]
fn history_keeps_newest_twenty() {
    let mut store = DocumentStore::new();
    let id = store.create_document(0);
    for i in 0..25 {
        store.record_edit(&id, format!("version {i}"), i).unwrap();
        assert!(store.snapshot_history(&id, i).unwrap());
    }

    let history = store.history(&id);
    assert_eq!(history.len(), 20);
    assert_eq!(history[0].content, "version 24");
    assert_eq!(history[19].content, "version 5");
    assert!(!history.iter().any(|e| e.content == "version 4"));
}

#[test]
fn snapshot_staleness_window() {
    let now = 1_000 * HOUR;
    for (age, expected) in [(25 * HOUR, 0), (HOUR, 2)] {
        let mut kv = MemoryKvStore::new();
        let mut saved = DocumentStore::new();
        let a = saved.create_document(now - age);
        saved.record_edit(&a, "alpha", now - age).unwrap();
        saved.create_document(now - age);
        saved.persist_snapshot(&mut kv, now - age).unwrap();

        let mut restored = DocumentStore::new();
        assert_eq!(restored.restore_snapshot(&kv, now, 24), expected);
        assert_eq!(restored.len(), expected);
    }
}

#[test]
fn table_generation_three_by_two() {
    let cells = vec![
        vec!["H1".to_string(), "H2".to_string()],
        vec!["a".to_string(), "b".to_string()],
        vec!["c".to_string(), "d".to_string()],
    ];
    let spec = TableSpec::from_cells(cells, vec![Alignment::Left, Alignment::Center]);
    let md = generate_table_markdown(&spec);
    let lines: Vec<&str> = md.lines().collect();

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], "| --- | :---: |");
    for line in [lines[0], lines[2], lines[3]] {
        assert_eq!(line.matches('|').count(), 3);
    }
}

#[test]
fn docx_keeps_unterminated_fence() {
    let blocks = layout_docx("Intro\n```\nfirst\nsecond");
    assert_eq!(
        blocks.last(),
        Some(&DocxBlock::Code("first\nsecond".to_string()))
    );

    let bytes = render_docx("```\nfirst\nsecond", "Code", &DocxOptions::default()).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn beautify_leaves_fence_content_alone() {
    let long = "word ".repeat(40);
    let input = format!("Text\n\n```\n{}\n\n\n\n\nend\n```\n", long.trim_end());
    let out = beautify(&input, &wrapping(20));
    let fence_body = |s: &str| {
        let start = s.find("```\n").unwrap();
        let end = s.rfind("```").unwrap();
        s[start..end].to_string()
    };
    assert_eq!(fence_body(&out), fence_body(&input));
}

#[test]
fn docx_export_imports_back() {
    let source = "# Plan\n\n## Steps\n\n- first\n- second **bold**\n\n```\nlet x = 1;\n```\n";
    let artifact =
        export_document(source, "plan.md", ExportFormat::Docx, &Settings::default()).unwrap();
    assert_eq!(artifact.file_name, "plan.docx");

    let imported = import_word(&artifact.bytes, &ImportOptions::default()).unwrap();
    let md = imported.markdown;
    assert!(md.starts_with("# Plan\n"));
    assert!(md.contains("## Steps"));
    assert!(md.contains("- first"));
    assert!(md.contains("**bold**"));
    assert!(md.contains("let x = 1;"));
    assert!(md.ends_with('\n'));
}
