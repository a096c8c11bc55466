//! Markdown → Notion blocks, built on pulldown-cmark events.
//!
//! Supported: headings (4–6 fold into heading 3), paragraphs, bulleted and
//! numbered list items, task items, quotes, code blocks, rules and images.
//! Nested lists are flattened. Inline bold, italic, strikethrough, code and
//! links become rich-text annotations.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};
use serde_json::{json, Map, Value};

use notion_sync_core::contract::{Block, BlockConverter};

/// Notion's limit on the length of one rich-text run.
const MAX_RUN_CHARS: usize = 2000;

const CODE_LANGUAGES: &[&str] = &[
    "bash", "c", "c++", "c#", "css", "docker", "go", "graphql", "html", "java",
    "javascript", "json", "kotlin", "makefile", "markdown", "php", "python", "ruby",
    "rust", "scala", "shell", "sql", "swift", "toml", "typescript", "xml", "yaml",
];

/// [`BlockConverter`] for CommonMark bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownBlockConverter;

impl BlockConverter for MarkdownBlockConverter {
    fn to_blocks(&self, markdown: &str) -> Vec<Block> {
        markdown_to_blocks(markdown)
    }
}

pub fn markdown_to_blocks(markdown: &str) -> Vec<Block> {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut builder = Builder::default();
    for event in Parser::new_ext(markdown, options) {
        builder.handle(event);
    }
    builder.blocks
}

enum Frame {
    Paragraph,
    Heading(usize),
    List { ordered: bool },
    Item,
    Quote,
    Code { language: String },
    Strong,
    Emphasis,
    Strikethrough,
    Link(String),
    Image(String),
    Other,
}

#[derive(Default)]
struct Run {
    text: String,
    bold: bool,
    italic: bool,
    strikethrough: bool,
    code: bool,
    link: Option<String>,
}

#[derive(Default)]
struct Builder {
    blocks: Vec<Block>,
    stack: Vec<Frame>,
    runs: Vec<Run>,
    checked: Option<bool>,
}

impl Builder {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            // Every End closes the most recent Start.
            Event::End(_) => self.end(),
            Event::Text(text) | Event::Html(text) | Event::InlineHtml(text) => {
                self.push_text(&text, false)
            }
            Event::Code(text) => self.push_text(&text, true),
            Event::SoftBreak => self.push_text(" ", false),
            Event::HardBreak => self.push_text("\n", false),
            Event::Rule => self.emit("divider", Map::new()),
            Event::TaskListMarker(done) => self.checked = Some(done),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let frame = match tag {
            Tag::Paragraph => {
                if self.in_container() && !self.runs.is_empty() {
                    self.push_text("\n", false);
                }
                Frame::Paragraph
            }
            Tag::Heading { level, .. } => Frame::Heading(level as usize),
            Tag::BlockQuote(_) => Frame::Quote,
            Tag::CodeBlock(kind) => {
                self.flush_pending();
                Frame::Code {
                    language: match kind {
                        CodeBlockKind::Fenced(info) => {
                            info.split_whitespace().next().unwrap_or("").to_string()
                        }
                        CodeBlockKind::Indented => String::new(),
                    },
                }
            }
            Tag::List(start) => {
                // A nested list ends the text of the item that contains it.
                if matches!(self.stack.last(), Some(Frame::Item)) {
                    self.emit_item();
                }
                Frame::List {
                    ordered: start.is_some(),
                }
            }
            Tag::Item => Frame::Item,
            Tag::Emphasis => Frame::Emphasis,
            Tag::Strong => Frame::Strong,
            Tag::Strikethrough => Frame::Strikethrough,
            Tag::Link { dest_url, .. } => Frame::Link(dest_url.to_string()),
            Tag::Image { dest_url, .. } => {
                self.flush_pending();
                Frame::Image(dest_url.to_string())
            }
            _ => Frame::Other,
        };
        self.stack.push(frame);
    }

    fn end(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        match frame {
            Frame::Paragraph if !self.in_container() => self.emit_text_block("paragraph"),
            Frame::Heading(level) => {
                let kind = format!("heading_{}", level.clamp(1, 3));
                self.emit_text_block(&kind);
            }
            Frame::Item => self.emit_item(),
            Frame::Quote if !self.in_container() => self.emit_text_block("quote"),
            Frame::Code { language } => {
                let mut text: String = self.runs.drain(..).map(|run| run.text).collect();
                if text.ends_with('\n') {
                    text.pop();
                }
                let mut body = Map::new();
                body.insert("rich_text".into(), rich_text(vec![Run { text, ..Run::default() }]));
                body.insert("language".into(), Value::String(notion_language(&language)));
                self.emit("code", body);
            }
            Frame::Image(url) => {
                let mut body = Map::new();
                body.insert("type".into(), json!("external"));
                body.insert("external".into(), json!({ "url": url }));
                self.emit("image", body);
            }
            // Top-level html blocks and the like.
            Frame::Other if self.stack.is_empty() => self.emit_text_block("paragraph"),
            _ => {}
        }
    }

    fn in_container(&self) -> bool {
        self.stack
            .iter()
            .any(|frame| matches!(frame, Frame::Item | Frame::Quote))
    }

    /// Emit text collected so far as the block that encloses it, so a code
    /// block or image that follows lands after it.
    fn flush_pending(&mut self) {
        if self.runs.is_empty() {
            return;
        }
        let enclosing = self
            .stack
            .iter()
            .rev()
            .find(|frame| matches!(frame, Frame::Item | Frame::Quote | Frame::Heading(_)));
        let kind = match enclosing {
            Some(Frame::Item) => None,
            Some(Frame::Quote) => Some("quote".to_string()),
            Some(Frame::Heading(level)) => Some(format!("heading_{}", (*level).clamp(1, 3))),
            _ => Some("paragraph".to_string()),
        };
        match kind {
            Some(kind) => self.emit_text_block(&kind),
            None => self.emit_item(),
        }
    }

    fn push_text(&mut self, text: &str, code: bool) {
        let mut run = Run {
            text: text.to_string(),
            code,
            ..Run::default()
        };
        for frame in &self.stack {
            match frame {
                // Alt text is not rendered.
                Frame::Image(_) => return,
                Frame::Code { .. } => {
                    run.code = false;
                    break;
                }
                Frame::Strong => run.bold = true,
                Frame::Emphasis => run.italic = true,
                Frame::Strikethrough => run.strikethrough = true,
                Frame::Link(url) => run.link = Some(url.clone()),
                _ => {}
            }
        }
        self.runs.push(run);
    }

    fn emit_item(&mut self) {
        if self.runs.is_empty() {
            self.checked = None;
            return;
        }
        let ordered = self.stack.iter().rev().find_map(|frame| match frame {
            Frame::List { ordered } => Some(*ordered),
            _ => None,
        });
        let runs = std::mem::take(&mut self.runs);
        let mut body = Map::new();
        body.insert("rich_text".into(), rich_text(runs));
        let kind = match (self.checked.take(), ordered) {
            (Some(done), _) => {
                body.insert("checked".into(), Value::Bool(done));
                "to_do"
            }
            (None, Some(true)) => "numbered_list_item",
            (None, _) => "bulleted_list_item",
        };
        self.emit(kind, body);
    }

    fn emit_text_block(&mut self, kind: &str) {
        if self.runs.is_empty() {
            return;
        }
        let runs = std::mem::take(&mut self.runs);
        let mut body = Map::new();
        body.insert("rich_text".into(), rich_text(runs));
        self.emit(kind, body);
    }

    fn emit(&mut self, kind: &str, body: Map<String, Value>) {
        let mut block = Map::new();
        block.insert("object".into(), json!("block"));
        block.insert("type".into(), json!(kind));
        block.insert(kind.to_string(), Value::Object(body));
        self.blocks.push(Block(Value::Object(block)));
    }
}

fn rich_text(runs: Vec<Run>) -> Value {
    let mut items = Vec::new();
    for run in runs {
        let chars: Vec<char> = run.text.chars().collect();
        for chunk in chars.chunks(MAX_RUN_CHARS) {
            let content: String = chunk.iter().collect();
            let link = run.link.as_ref().map(|url| json!({ "url": url }));
            items.push(json!({
                "type": "text",
                "text": { "content": content, "link": link },
                "annotations": {
                    "bold": run.bold,
                    "italic": run.italic,
                    "strikethrough": run.strikethrough,
                    "code": run.code,
                },
            }));
        }
    }
    Value::Array(items)
}

/// Map a fence info string onto a language Notion accepts.
fn notion_language(info: &str) -> String {
    let lower = info.to_ascii_lowercase();
    let name = match lower.as_str() {
        "rs" => "rust",
        "js" | "jsx" => "javascript",
        "ts" | "tsx" => "typescript",
        "py" => "python",
        "sh" | "zsh" => "shell",
        "yml" => "yaml",
        "cpp" => "c++",
        "csharp" | "cs" => "c#",
        "dockerfile" => "docker",
        other => other,
    };
    if CODE_LANGUAGES.contains(&name) {
        name.to_string()
    } else {
        "plain text".to_string()
    }
}
