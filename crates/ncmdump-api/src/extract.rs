// Config body retrieval
//
// The console serves a stored config through two HTML pages: the export
// handler and the edit form. Both embed the text in a `<textarea ...>`
// element. The text is returned exactly as delivered, without entity
// decoding or trimming.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::ConsoleSession;
use crate::error::Error;

const EXPORT_PATH: &str = "/Orion/NCM/Resources/NCMConfigDetails/ConfigExporter.ashx";
const EDIT_PATH: &str = "/Orion/NCM/Resources/Configs/EditConfig.aspx";

/// Start of markup that changes how the text after it is read: a comment
/// or a raw-text element. Quoted attribute values may contain `>`.
static MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<!--|<(?P<name>textarea|script|style)(?P<attrs>(?:"[^"]*"|'[^']*'|[^'">])*)>"#,
    )
    .unwrap_or_else(|e| panic!("markup pattern: {e}"))
});

static TEXTAREA_CLOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</textarea\s*>").unwrap_or_else(|e| panic!("textarea pattern: {e}"))
});

static SCRIPT_CLOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</script\s*>").unwrap_or_else(|e| panic!("script pattern: {e}"))
});

static STYLE_CLOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</style\s*>").unwrap_or_else(|e| panic!("style pattern: {e}"))
});

const COMMENT_CLOSE: &str = "-->";

/// Which console page a config body is read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// `EditConfig.aspx?ConfigID=<id>`
    #[default]
    Edit,
    /// `ConfigExporter.ashx?configID={<id>}`
    Export,
}

impl ExtractionMode {
    /// Path and query pair for `file_id` in this mode.
    fn endpoint(self, file_id: &str) -> (&'static str, &'static str, String) {
        match self {
            Self::Edit => (EDIT_PATH, "ConfigID", file_id.to_owned()),
            Self::Export => (EXPORT_PATH, "configID", format!("{{{file_id}}}")),
        }
    }
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Edit => "edit",
            Self::Export => "export",
        })
    }
}

/// Raw content of the last `<textarea>` that carries attributes.
///
/// Content runs from the end of the start tag to the matching
/// `</textarea>` (or the end of the document if it is never closed).
/// Bare `<textarea>` tags are ignored. Comments and `<script>` / `<style>`
/// bodies are skipped, so tags inside them never count. Returns an empty
/// string when no qualifying element exists.
pub fn extract_textarea(html: &str) -> String {
    let mut found = None;
    let mut cursor = 0;

    while let Some(caps) = MARKUP.captures_at(html, cursor) {
        let Some(tag) = caps.get(0) else { break };

        let Some(name) = caps.name("name") else {
            cursor = html[tag.end()..]
                .find(COMMENT_CLOSE)
                .map_or(html.len(), |i| tag.end() + i + COMMENT_CLOSE.len());
            continue;
        };

        // `<textareax>` and friends are other elements.
        let attrs = caps.name("attrs").map_or("", |m| m.as_str());
        if !attrs.is_empty() && !attrs.starts_with(|c: char| c.is_whitespace() || c == '/') {
            cursor = tag.start() + 1;
            continue;
        }

        let is_textarea = name.as_str().eq_ignore_ascii_case("textarea");
        let close: &Regex = if is_textarea {
            &TEXTAREA_CLOSE
        } else if name.as_str().eq_ignore_ascii_case("style") {
            &STYLE_CLOSE
        } else {
            &SCRIPT_CLOSE
        };
        let (end, next) = close
            .find_at(html, tag.end())
            .map_or((html.len(), html.len()), |m| (m.start(), m.end()));

        if is_textarea && has_attributes(attrs) {
            found = Some(&html[tag.end()..end]);
        }
        cursor = next;
    }

    found.map(str::to_owned).unwrap_or_default()
}

/// At least one attribute after the tag name (`<textarea />` has none).
fn has_attributes(attrs: &str) -> bool {
    attrs.starts_with(char::is_whitespace)
        && attrs.trim_start().chars().next().is_some_and(|c| c != '/')
}

impl ConsoleSession {
    /// Download the config body for `file_id` through the page `mode`
    /// selects and pull out the embedded text.
    pub async fn config_body(&self, file_id: &str, mode: ExtractionMode) -> Result<String, Error> {
        let (path, key, value) = mode.endpoint(file_id);
        let url = self.url(path, &[(key, value.as_str())])?;

        let html = self.get_text(url).await?;
        let text = extract_textarea(&html);

        debug!(file_id, %mode, bytes = text.len(), "extracted config body");
        Ok(text)
    }
}
