use crate::parsers;
use crate::results::{ContentBlock, RenderedPage};
use serde::{Deserialize, Serialize};
use url::Url;

/// A single story part whose text can be fetched and rendered.
///
/// Deserializes from the platform's part JSON, where the text location is
/// nested as `"text_url": { "text": "..." }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentUnit {
    #[serde(default)]
    pub id: Option<u64>,

    pub title: String,

    #[serde(default, with = "text_url")]
    pub text_url: Option<String>,
}

impl ContentUnit {
    pub fn new(title: impl Into<String>, text_url: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            text_url: Some(text_url.into()),
        }
    }
}

mod text_url {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct TextUrl {
        #[serde(default)]
        text: Option<String>,
    }

    pub fn serialize<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        value
            .as_ref()
            .map(|text| TextUrl {
                text: Some(text.clone()),
            })
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let nested = Option::<TextUrl>::deserialize(deserializer)?;
        Ok(nested.and_then(|t| t.text))
    }
}

/// Build the page from the title and the walker's blocks, unchanged
pub fn assemble(title: &str, blocks: Vec<ContentBlock>) -> RenderedPage {
    RenderedPage::new(title.to_string(), blocks)
}

/// Walk `html` and assemble the result under `title`.
/// `base` is the location the HTML was fetched from.
pub fn render_document(title: &str, html: &str, base: &Url) -> RenderedPage {
    let blocks = parsers::walk_document(html, base);
    ::log::info!("Rendered '{}' into {} blocks", title, blocks.len());
    assemble(title, blocks)
}
