//! Word document → HTML
//!
//! Reads the WordprocessingML parts of a `.docx` package and produces a
//! semantic HTML fragment: headings from the paragraph style map, nested
//! lists from the numbering definitions, tables, inline emphasis, links and
//! (optionally) images embedded as base64 data URIs.
//!
//! Problems that leave the output usable (unknown styles, missing images) are
//! collected as warnings instead of failing the conversion.

use super::ImportOptions;
use crate::error::{Error, Result};
use base64::Engine;
use log::debug;
use roxmltree::Node;
use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Compound document header used by legacy binary `.doc` files.
const OLE_MAGIC: [u8; 4] = [0xD0, 0xCF, 0x11, 0xE0];

const MONOSPACE_FONTS: &[&str] = &["consolas", "courier new", "courier", "menlo", "monaco"];

/// Paragraph styles that map to plain paragraphs without a warning.
const PLAIN_STYLES: &[&str] = &[
    "normal",
    "list paragraph",
    "body text",
    "no spacing",
    "default paragraph font",
];

// ─────────────────────────────────────────────────────────────────────────────
// Package Access
// ─────────────────────────────────────────────────────────────────────────────

struct Package {
    archive: zip::ZipArchive<Cursor<Vec<u8>>>,
}

impl Package {
    fn open(bytes: &[u8]) -> Result<Self> {
        if bytes.starts_with(&OLE_MAGIC) {
            return Err(Error::import(
                "legacy binary .doc files are not supported; save the document as .docx",
            ));
        }
        let archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec()))
            .map_err(|e| Error::import(format!("not a Word document: {}", e)))?;
        Ok(Self { archive })
    }

    fn read_bytes(&mut self, name: &str) -> Option<Vec<u8>> {
        let mut file = self.archive.by_name(name).ok()?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).ok()?;
        Some(buf)
    }

    fn read_string(&mut self, name: &str) -> Option<String> {
        self.read_bytes(name)
            .and_then(|bytes| String::from_utf8(bytes).ok())
    }
}

fn w_attr<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute((W_NS, name))
}

fn w_child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
}

/// A `w:b`-style toggle: present and not explicitly switched off.
fn toggle_on(props: Node<'_, '_>, name: &str) -> bool {
    w_child(props, name).is_some_and(|n| !matches!(w_attr(n, "val"), Some("0" | "false" | "none")))
}

// ─────────────────────────────────────────────────────────────────────────────
// Auxiliary Parts
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Relationship {
    target: String,
    external: bool,
}

fn parse_relationships(xml: &str) -> HashMap<String, Relationship> {
    let Ok(doc) = roxmltree::Document::parse(xml) else {
        return HashMap::new();
    };
    doc.descendants()
        .filter(|n| n.tag_name().name() == "Relationship")
        .filter_map(|n| {
            Some((
                n.attribute("Id")?.to_string(),
                Relationship {
                    target: n.attribute("Target")?.to_string(),
                    external: n.attribute("TargetMode") == Some("External"),
                },
            ))
        })
        .collect()
}

/// Style id → lowercase style name.
fn parse_style_names(xml: &str) -> HashMap<String, String> {
    let Ok(doc) = roxmltree::Document::parse(xml) else {
        return HashMap::new();
    };
    doc.descendants()
        .filter(|n| n.tag_name().name() == "style")
        .filter_map(|n| {
            let id = w_attr(n, "styleId")?;
            let name = w_child(n, "name").and_then(|c| w_attr(c, "val"))?;
            Some((id.to_string(), name.to_lowercase()))
        })
        .collect()
}

/// (numId, level) → ordered list.
#[derive(Debug, Default)]
struct Numbering {
    ordered: HashMap<(String, u8), bool>,
}

impl Numbering {
    fn parse(xml: &str) -> Self {
        let Ok(doc) = roxmltree::Document::parse(xml) else {
            return Self::default();
        };

        let mut abstract_formats: HashMap<String, HashMap<u8, bool>> = HashMap::new();
        for abs in doc
            .descendants()
            .filter(|n| n.tag_name().name() == "abstractNum")
        {
            let Some(id) = w_attr(abs, "abstractNumId") else {
                continue;
            };
            let levels = abs
                .children()
                .filter(|n| n.tag_name().name() == "lvl")
                .filter_map(|lvl| {
                    let level = w_attr(lvl, "ilvl")?.parse::<u8>().ok()?;
                    let format = w_child(lvl, "numFmt").and_then(|f| w_attr(f, "val"));
                    Some((level, !matches!(format, Some("bullet") | None)))
                })
                .collect();
            abstract_formats.insert(id.to_string(), levels);
        }

        let mut ordered = HashMap::new();
        for num in doc.descendants().filter(|n| n.tag_name().name() == "num") {
            let (Some(num_id), Some(abs_id)) = (
                w_attr(num, "numId"),
                w_child(num, "abstractNumId").and_then(|a| w_attr(a, "val")),
            ) else {
                continue;
            };
            if let Some(levels) = abstract_formats.get(abs_id) {
                for (level, is_ordered) in levels {
                    ordered.insert((num_id.to_string(), *level), *is_ordered);
                }
            }
        }
        Self { ordered }
    }

    fn is_ordered(&self, num_id: &str, level: u8) -> bool {
        self.ordered
            .get(&(num_id.to_string(), level))
            .copied()
            .unwrap_or(false)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Paragraph Content
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct RunStyle {
    bold: bool,
    italic: bool,
    strike: bool,
    code: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Text(RunStyle, String),
    Break,
    /// Pre-rendered `<img>` or `<a>` markup
    Html(String),
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn mime_for(path: &str) -> Option<&'static str> {
    let ext = path.rsplit('.').next()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "svg" => Some("image/svg+xml"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Resolve a relationship target relative to the `word/` directory.
fn part_path(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("word/{}", target.trim_start_matches("./")),
    }
}

struct Converter<'p> {
    package: &'p mut Package,
    options: &'p ImportOptions,
    rels: HashMap<String, Relationship>,
    styles: HashMap<String, String>,
    numbering: Numbering,
    warnings: Vec<String>,
    warned_styles: HashSet<String>,
    html: String,
    /// Open lists, innermost last; `true` for ordered
    lists: Vec<bool>,
    code_lines: Option<Vec<String>>,
}

impl<'p> Converter<'p> {
    fn warn(&mut self, message: String) {
        debug!("Word import warning: {}", message);
        self.warnings.push(message);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Runs
    // ─────────────────────────────────────────────────────────────────────────

    fn run_style(run: Node<'_, '_>) -> RunStyle {
        let Some(props) = w_child(run, "rPr") else {
            return RunStyle::default();
        };
        let font = w_child(props, "rFonts")
            .and_then(|f| w_attr(f, "ascii").or_else(|| w_attr(f, "hAnsi")))
            .map(str::to_lowercase);
        RunStyle {
            bold: toggle_on(props, "b"),
            italic: toggle_on(props, "i"),
            strike: toggle_on(props, "strike") || toggle_on(props, "dstrike"),
            code: font.is_some_and(|f| MONOSPACE_FONTS.contains(&f.as_str())),
        }
    }

    fn image(&mut self, drawing: Node<'_, '_>) -> Option<Segment> {
        if !self.options.preserve_images {
            return None;
        }
        let alt = drawing
            .descendants()
            .find(|n| n.tag_name().name() == "docPr")
            .and_then(|n| n.attribute("descr"))
            .unwrap_or("")
            .to_string();
        let rel_id = drawing
            .descendants()
            .find_map(|n| match n.tag_name().name() {
                "blip" => n.attribute((R_NS, "embed")),
                "imagedata" => n.attribute((R_NS, "id")),
                _ => None,
            })?;

        let Some(rel) = self.rels.get(rel_id).cloned() else {
            self.warn(format!("Image relationship '{}' is missing", rel_id));
            return None;
        };
        if rel.external {
            return Some(Segment::Html(format!(
                r#"<img src="{}" alt="{}">"#,
                escape(&rel.target),
                escape(&alt)
            )));
        }

        let path = part_path(&rel.target);
        let Some(mime) = mime_for(&path) else {
            self.warn(format!("Image '{}' has an unsupported type", path));
            return None;
        };
        let Some(bytes) = self.package.read_bytes(&path) else {
            self.warn(format!("Image '{}' could not be read", path));
            return None;
        };
        let data = base64::engine::general_purpose::STANDARD.encode(bytes);
        Some(Segment::Html(format!(
            r#"<img src="data:{};base64,{}" alt="{}">"#,
            mime,
            data,
            escape(&alt)
        )))
    }

    fn collect_run(&mut self, run: Node<'_, '_>, out: &mut Vec<Segment>) {
        let style = Self::run_style(run);
        for child in run.children().filter(|c| c.is_element()) {
            match child.tag_name().name() {
                "t" => out.push(Segment::Text(style, child.text().unwrap_or("").to_string())),
                "tab" => out.push(Segment::Text(style, "\t".to_string())),
                "noBreakHyphen" => out.push(Segment::Text(style, "-".to_string())),
                "br" | "cr" => {
                    if w_attr(child, "type") != Some("page") {
                        out.push(Segment::Break);
                    }
                }
                "drawing" | "pict" => {
                    if let Some(image) = self.image(child) {
                        out.push(image);
                    }
                }
                _ => {}
            }
        }
    }

    fn collect_segments(&mut self, parent: Node<'_, '_>, out: &mut Vec<Segment>) {
        for child in parent.children().filter(|c| c.is_element()) {
            match child.tag_name().name() {
                "r" => self.collect_run(child, out),
                "hyperlink" => {
                    let href = child
                        .attribute((R_NS, "id"))
                        .and_then(|id| self.rels.get(id))
                        .map(|rel| rel.target.clone())
                        .or_else(|| w_attr(child, "anchor").map(|a| format!("#{}", a)));
                    let mut inner = Vec::new();
                    self.collect_segments(child, &mut inner);
                    match href {
                        Some(href) => out.push(Segment::Html(format!(
                            r#"<a href="{}">{}</a>"#,
                            escape(&href),
                            segments_to_html(&inner)
                        ))),
                        None => out.extend(inner),
                    }
                }
                "ins" | "smartTag" | "fldSimple" | "customXml" => self.collect_segments(child, out),
                "sdt" => {
                    if let Some(content) = w_child(child, "sdtContent") {
                        self.collect_segments(content, out);
                    }
                }
                _ => {}
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Blocks
    // ─────────────────────────────────────────────────────────────────────────

    fn heading_level(&mut self, style_id: &str) -> Option<u8> {
        let name = self
            .styles
            .get(style_id)
            .cloned()
            .unwrap_or_else(|| style_id.to_lowercase());
        let compact = name.replace(' ', "");
        if compact == "title" {
            return Some(1);
        }
        if let Some(level) = compact
            .strip_prefix("heading")
            .and_then(|n| n.parse::<u8>().ok())
            .filter(|n| (1..=6).contains(n))
        {
            return Some(level);
        }
        if !PLAIN_STYLES.contains(&name.as_str()) && self.warned_styles.insert(style_id.to_string())
        {
            self.warn(format!(
                "Unrecognised paragraph style: '{}' (Style ID: {})",
                name, style_id
            ));
        }
        None
    }

    fn close_lists(&mut self) {
        while let Some(ordered) = self.lists.pop() {
            self.html
                .push_str(if ordered { "</li></ol>" } else { "</li></ul>" });
        }
    }

    fn flush_code(&mut self) {
        if let Some(lines) = self.code_lines.take() {
            self.html.push_str("<pre><code>");
            self.html.push_str(&escape(&lines.join("\n")));
            self.html.push_str("</code></pre>");
        }
    }

    fn list_item(&mut self, level: u8, ordered: bool, content: &str) {
        let depth = usize::from(level) + 1;
        while self.lists.len() > depth {
            let closing = self.lists.pop();
            self.html.push_str(if closing == Some(true) {
                "</li></ol>"
            } else {
                "</li></ul>"
            });
        }
        if self.lists.len() == depth {
            if self.lists.last() == Some(&ordered) {
                self.html.push_str("</li>");
            } else {
                let closing = self.lists.pop();
                self.html.push_str(if closing == Some(true) {
                    "</li></ol>"
                } else {
                    "</li></ul>"
                });
            }
        }
        while self.lists.len() < depth {
            let is_target = self.lists.len() + 1 == depth;
            let kind = if is_target { ordered } else { false };
            self.html.push_str(if kind { "<ol>" } else { "<ul>" });
            self.lists.push(kind);
            if !is_target {
                self.html.push_str("<li>");
            }
        }
        self.html.push_str("<li>");
        self.html.push_str(content);
    }

    fn paragraph(&mut self, p: Node<'_, '_>) {
        let props = w_child(p, "pPr");
        let style_id = props
            .and_then(|pp| w_child(pp, "pStyle"))
            .and_then(|s| w_attr(s, "val"))
            .map(str::to_string);
        let numbering = props.and_then(|pp| w_child(pp, "numPr")).map(|num| {
            let level = w_child(num, "ilvl")
                .and_then(|l| w_attr(l, "val"))
                .and_then(|v| v.parse::<u8>().ok())
                .unwrap_or(0);
            let num_id = w_child(num, "numId")
                .and_then(|n| w_attr(n, "val"))
                .unwrap_or("0")
                .to_string();
            (num_id, level)
        });

        let mut segments = Vec::new();
        self.collect_segments(p, &mut segments);

        let is_code = !segments.is_empty()
            && segments.iter().all(|s| match s {
                Segment::Text(style, text) => style.code || text.trim().is_empty(),
                Segment::Break => true,
                Segment::Html(_) => false,
            })
            && segments
                .iter()
                .any(|s| matches!(s, Segment::Text(style, _) if style.code));

        if is_code && numbering.is_none() {
            self.close_lists();
            let text = segments_to_text(&segments);
            self.code_lines
                .get_or_insert_with(Vec::new)
                .extend(text.split('\n').map(str::to_string));
            return;
        }
        self.flush_code();

        let content = segments_to_html(&segments);

        if let Some((num_id, level)) = numbering.filter(|(id, _)| id != "0") {
            let ordered = self.numbering.is_ordered(&num_id, level);
            let content = task_checkbox(&content);
            self.list_item(level, ordered, &content);
            return;
        }
        self.close_lists();

        let heading = style_id.as_deref().and_then(|id| self.heading_level(id));
        match heading {
            Some(level) => self
                .html
                .push_str(&format!("<h{0}>{1}</h{0}>", level, content)),
            None if content.trim().is_empty() => {}
            None => self.html.push_str(&format!("<p>{}</p>", content)),
        }
    }

    fn table(&mut self, tbl: Node<'_, '_>) {
        self.flush_code();
        self.close_lists();
        self.html.push_str("<table>");
        for row in tbl.children().filter(|n| n.tag_name().name() == "tr") {
            self.html.push_str("<tr>");
            for cell in row.children().filter(|n| n.tag_name().name() == "tc") {
                let paragraphs: Vec<String> = cell
                    .children()
                    .filter(|n| n.tag_name().name() == "p")
                    .map(|p| {
                        let mut segments = Vec::new();
                        self.collect_segments(p, &mut segments);
                        segments_to_html(&segments)
                    })
                    .filter(|html| !html.trim().is_empty())
                    .collect();
                self.html
                    .push_str(&format!("<td>{}</td>", paragraphs.join("<br>")));
            }
            self.html.push_str("</tr>");
        }
        self.html.push_str("</table>");
    }

    fn body(&mut self, body: Node<'_, '_>) {
        for child in body.children().filter(|c| c.is_element()) {
            match child.tag_name().name() {
                "p" => self.paragraph(child),
                "tbl" => self.table(child),
                "sdt" => {
                    if let Some(content) = w_child(child, "sdtContent") {
                        self.body(content);
                    }
                }
                _ => {}
            }
        }
    }
}

fn wrap_style(style: RunStyle, text: &str) -> String {
    let mut html = escape(text);
    if style.code {
        html = format!("<code>{}</code>", html);
    }
    if style.strike {
        html = format!("<s>{}</s>", html);
    }
    if style.italic {
        html = format!("<em>{}</em>", html);
    }
    if style.bold {
        html = format!("<strong>{}</strong>", html);
    }
    html
}

/// Inline HTML for a paragraph, merging adjacent runs that share a style.
fn segments_to_html(segments: &[Segment]) -> String {
    let mut html = String::new();
    let mut pending: Option<(RunStyle, String)> = None;

    for segment in segments {
        match segment {
            Segment::Text(style, text) => match pending.as_mut() {
                Some((current, buf)) if current == style => buf.push_str(text),
                _ => {
                    if let Some((style, buf)) = pending.take() {
                        html.push_str(&wrap_style(style, &buf));
                    }
                    pending = Some((*style, text.clone()));
                }
            },
            Segment::Break | Segment::Html(_) => {
                if let Some((style, buf)) = pending.take() {
                    html.push_str(&wrap_style(style, &buf));
                }
                match segment {
                    Segment::Html(markup) => html.push_str(markup),
                    _ => html.push_str("<br>"),
                }
            }
        }
    }
    if let Some((style, buf)) = pending {
        html.push_str(&wrap_style(style, &buf));
    }
    html
}

fn segments_to_text(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| match s {
            Segment::Text(_, text) => text.as_str(),
            Segment::Break => "\n",
            Segment::Html(_) => "",
        })
        .collect()
}

/// Ballot-box glyphs at the start of a list item become checkbox inputs.
fn task_checkbox(content: &str) -> String {
    for (glyph, checked) in [('\u{2610}', false), ('\u{2612}', true), ('\u{2611}', true)] {
        if let Some(rest) = content.strip_prefix(glyph) {
            let input = if checked {
                r#"<input type="checkbox" checked>"#
            } else {
                r#"<input type="checkbox">"#
            };
            return format!("{}{}", input, rest.trim_start());
        }
    }
    content.to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Entry Point
// ─────────────────────────────────────────────────────────────────────────────

/// Convert `.docx` bytes to an HTML fragment plus conversion warnings.
pub fn docx_to_html(bytes: &[u8], options: &ImportOptions) -> Result<(String, Vec<String>)> {
    let mut package = Package::open(bytes)?;
    let document_xml = package
        .read_string("word/document.xml")
        .ok_or_else(|| Error::import("word/document.xml is missing from the package"))?;
    let rels = package
        .read_string("word/_rels/document.xml.rels")
        .map(|xml| parse_relationships(&xml))
        .unwrap_or_default();
    let styles = package
        .read_string("word/styles.xml")
        .map(|xml| parse_style_names(&xml))
        .unwrap_or_default();
    let numbering = package
        .read_string("word/numbering.xml")
        .map(|xml| Numbering::parse(&xml))
        .unwrap_or_default();

    let doc = roxmltree::Document::parse(&document_xml)
        .map_err(|e| Error::import(format!("word/document.xml is not valid XML: {}", e)))?;
    let body =
        w_child(doc.root_element(), "body").ok_or_else(|| Error::import("document has no body"))?;

    let mut converter = Converter {
        package: &mut package,
        options,
        rels,
        styles,
        numbering,
        warnings: Vec::new(),
        warned_styles: HashSet::new(),
        html: String::new(),
        lists: Vec::new(),
        code_lines: None,
    };
    converter.body(body);
    converter.flush_code();
    converter.close_lists();

    debug!(
        "Word document converted to {} bytes of HTML ({} warning(s))",
        converter.html.len(),
        converter.warnings.len()
    );
    Ok((converter.html, converter.warnings))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
