//! Front-matter codec.
//!
//! A synced document is a `---` delimited YAML mapping followed by a markdown
//! body. [`Document::parse`] splits the two and [`Document::render`] puts them
//! back together as `"---\n" + header + "\n---\n" + body`, where `header` is
//! the serialised mapping minus its final newline.
//!
//! The body is everything after the closing delimiter line. For a document
//! with no front-matter block it is the whole text minus one leading newline,
//! which is what the rewritten file will carry after its new closing line.
//! Rendering a parsed document therefore never adds or drops blank lines.

use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::sync::OnceLock;

/// Id of the remote page this document was last synced to.
pub const PAGE_ID_KEY: &str = "remotePageId";
/// Explicit target database id.
pub const DATABASE_ID_KEY: &str = "remoteDatabaseId";
/// Target database url; its last path segment is the database id.
pub const DATABASE_URL_KEY: &str = "remoteDatabaseUrl";
/// Shareable link of the remote page, written after each sync.
pub const LINK_KEY: &str = "link";
pub const TAGS_KEY: &str = "tags";

fn front_matter_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\A---[ \t]*\r?\n(?:(?s:(.*?))\r?\n)?---[ \t]*(?:\r?\n|\z)")
            .expect("front-matter pattern is valid")
    })
}

/// The ordered front-matter mapping, with named accessors for the reserved keys.
///
/// User keys keep their original position; reserved keys that are set for the
/// first time are appended at the end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter(Mapping);

impl FrontMatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(Value::String(key.to_string()), value.into());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keys in document order. Non-string keys are skipped.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().filter_map(Value::as_str)
    }

    /// A copy with `key` removed and every other entry in its original order.
    pub fn without(&self, key: &str) -> FrontMatter {
        FrontMatter(
            self.0
                .iter()
                .filter(|(k, _)| k.as_str() != Some(key))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    pub fn remote_page_id(&self) -> Option<String> {
        self.scalar(PAGE_ID_KEY)
    }

    pub fn set_remote_page_id(&mut self, id: &str) {
        self.insert(PAGE_ID_KEY, id);
    }

    pub fn remote_database_id(&self) -> Option<String> {
        self.scalar(DATABASE_ID_KEY)
    }

    pub fn remote_database_url(&self) -> Option<String> {
        self.scalar(DATABASE_URL_KEY)
    }

    pub fn link(&self) -> Option<String> {
        self.scalar(LINK_KEY)
    }

    pub fn set_link(&mut self, link: &str) {
        self.insert(LINK_KEY, link);
    }

    /// Serialise to YAML, as produced by `serde_yaml` (with its trailing newline).
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.0)
    }

    /// Non-empty string or number under `key`.
    fn scalar(&self, key: &str) -> Option<String> {
        let text = match self.0.get(key)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    }
}

impl From<Mapping> for FrontMatter {
    fn from(mapping: Mapping) -> Self {
        FrontMatter(mapping)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub front_matter: FrontMatter,
    pub body: String,
}

impl Document {
    /// Split raw text into front-matter and body.
    ///
    /// Text without a leading `---` block has an empty front-matter. A block
    /// that is empty or holds only comments is an empty mapping; any other
    /// non-mapping YAML is rejected.
    pub fn parse(text: &str) -> Result<Document, String> {
        let Some(captures) = front_matter_block().captures(text) else {
            return Ok(Document {
                front_matter: FrontMatter::new(),
                body: strip_leading_newline(text).to_string(),
            });
        };
        let whole = captures.get(0).map_or(0, |m| m.end());
        let yaml = captures.get(1).map_or("", |m| m.as_str());

        let front_matter = match serde_yaml::from_str::<Value>(yaml)
            .map_err(|e| format!("front-matter is not valid YAML: {e}"))?
        {
            Value::Null => FrontMatter::new(),
            Value::Mapping(mapping) => FrontMatter(mapping),
            other => {
                return Err(format!(
                    "front-matter must be a mapping, found {}",
                    kind_of(&other)
                ))
            }
        };

        Ok(Document {
            front_matter,
            body: text[whole..].to_string(),
        })
    }

    /// Reassemble the document text.
    pub fn render(&self) -> Result<String, serde_yaml::Error> {
        let header = self.front_matter.to_yaml()?;
        Ok(reassemble(&header, &self.body))
    }
}

/// `"---\n" + header + "\n---\n" + body`, with at most one trailing newline
/// removed from `header`.
pub fn reassemble(header: &str, body: &str) -> String {
    let header = header.strip_suffix('\n').unwrap_or(header);
    format!("---\n{header}\n---\n{body}")
}

fn strip_leading_newline(text: &str) -> &str {
    text.strip_prefix('\n').unwrap_or(text)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
