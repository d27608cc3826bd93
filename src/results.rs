use serde::{Deserialize, Serialize};

/// Inline style of a single word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordStyle {
    General,
    Bold,
    Italic,
}

/// A text token together with its inline style
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStyledWord")]
pub struct StyledWord {
    text: String,
    style: WordStyle,
}

#[derive(Deserialize)]
struct RawStyledWord {
    text: String,
    style: WordStyle,
}

impl TryFrom<RawStyledWord> for StyledWord {
    type Error = String;

    fn try_from(raw: RawStyledWord) -> Result<Self, Self::Error> {
        StyledWord::new(raw.text, raw.style).ok_or_else(|| "styled word text is empty".to_string())
    }
}

impl StyledWord {
    /// Create a styled word. Empty tokens are rejected.
    pub fn new(text: impl Into<String>, style: WordStyle) -> Option<Self> {
        let text = text.into();
        if text.is_empty() {
            None
        } else {
            Some(Self { text, style })
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> WordStyle {
        self.style
    }

    /// Whether the token is nothing but whitespace
    pub fn is_whitespace(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }
}

/// One paragraph-level unit of rendered output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "lowercase",
    try_from = "RawContentBlock"
)]
pub enum ContentBlock {
    /// A run of styled words, never empty
    Text(Vec<StyledWord>),
    /// Absolute URL of an image
    Image(String),
}

#[derive(Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
enum RawContentBlock {
    Text(Vec<StyledWord>),
    Image(String),
}

impl TryFrom<RawContentBlock> for ContentBlock {
    type Error = String;

    fn try_from(raw: RawContentBlock) -> Result<Self, Self::Error> {
        match raw {
            RawContentBlock::Text(words) => {
                ContentBlock::text(words).ok_or_else(|| "text block has no words".to_string())
            }
            RawContentBlock::Image(url) => Ok(ContentBlock::Image(url)),
        }
    }
}

impl ContentBlock {
    /// Build a text block, or `None` when there are no words
    pub fn text(words: Vec<StyledWord>) -> Option<Self> {
        if words.is_empty() {
            None
        } else {
            Some(ContentBlock::Text(words))
        }
    }

    pub fn image(url: impl Into<String>) -> Self {
        ContentBlock::Image(url.into())
    }

    /// The words of a text block; `None` for an image block
    pub fn as_words(&self) -> Option<&[StyledWord]> {
        match self {
            ContentBlock::Text(words) => Some(words),
            ContentBlock::Image(_) => None,
        }
    }

    /// The URL of an image block; `None` for a text block
    pub fn as_image_url(&self) -> Option<&str> {
        match self {
            ContentBlock::Image(url) => Some(url),
            ContentBlock::Text(_) => None,
        }
    }

    /// Plain text of the block, with images shown as `[Image: <url>]`
    pub fn plain_text(&self) -> String {
        match self {
            ContentBlock::Text(words) => words.iter().map(StyledWord::text).collect(),
            ContentBlock::Image(url) => format!("[Image: {}]", url),
        }
    }
}

/// A rendered content unit: its title plus the ordered content blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedPage {
    title: String,
    blocks: Vec<ContentBlock>,
}

impl RenderedPage {
    pub fn new(title: String, blocks: Vec<ContentBlock>) -> Self {
        Self { title, blocks }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    /// Full text of the page, blocks separated by a blank line
    pub fn full_text(&self) -> String {
        self.blocks
            .iter()
            .map(ContentBlock::plain_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
