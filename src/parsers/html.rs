use crate::parsers::text;
use crate::results::{ContentBlock, StyledWord, WordStyle};
use crate::utils::resolve_url;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;
use url::Url;

/// Story-text paragraphs carry a `data-p-id`; everything else is page chrome
static PARAGRAPH: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p[data-p-id]").expect("paragraph selector is valid"));

static IMAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img[src]").expect("image selector is valid"));

/// Style an element imposes on the text it directly owns
pub fn style_for_tag(tag: &str) -> WordStyle {
    match tag.to_ascii_lowercase().as_str() {
        "b" | "strong" => WordStyle::Bold,
        "i" | "em" => WordStyle::Italic,
        _ => WordStyle::General,
    }
}

/// Walks an HTML document and returns its content blocks in paragraph order.
///
/// For each paragraph the image blocks come first, then at most one text
/// block. Image sources are resolved against `base`.
pub fn walk_document(html: &str, base: &Url) -> Vec<ContentBlock> {
    let doc = Html::parse_document(html);
    let mut blocks = Vec::new();

    let mut paragraphs = 0;
    for paragraph in doc.select(&PARAGRAPH) {
        paragraphs += 1;
        walk_paragraph(paragraph, base, &mut blocks);
    }

    ::log::debug!(
        "Markup walker produced {} blocks from {} paragraphs",
        blocks.len(),
        paragraphs
    );
    blocks
}

/// Appends the blocks of a single paragraph to `blocks`
pub fn walk_paragraph(paragraph: ElementRef<'_>, base: &Url, blocks: &mut Vec<ContentBlock>) {
    let images = image_urls(paragraph, base);
    let had_images = !images.is_empty();
    blocks.extend(images.into_iter().map(ContentBlock::image));

    if had_images && paragraph.text().collect::<String>().trim().is_empty() {
        return;
    }

    let words = paragraph_words(paragraph);
    if words.iter().all(StyledWord::is_whitespace) {
        return;
    }
    if let Some(block) = ContentBlock::text(words) {
        blocks.push(block);
    }
}

/// Absolute URLs of every resolvable image inside `paragraph`, in document order
pub fn image_urls(paragraph: ElementRef<'_>, base: &Url) -> Vec<String> {
    paragraph
        .select(&IMAGE)
        .filter_map(|img| {
            let src = img.value().attr("src")?;
            let resolved = resolve_url(base, src);
            if resolved.is_none() {
                ::log::debug!("Skipping image with unresolvable src: {:?}", src);
            }
            resolved
        })
        .map(String::from)
        .collect()
}

/// Styled words of a paragraph's text, in document order
pub fn paragraph_words(paragraph: ElementRef<'_>) -> Vec<StyledWord> {
    let mut words = Vec::new();
    walk(paragraph, WordStyle::General, &mut words);
    words
}

/// Text directly owned by `element` takes `style`; child elements re-resolve
/// their own style from their tag, so the innermost styling element wins.
fn walk(element: ElementRef<'_>, style: WordStyle, out: &mut Vec<StyledWord>) {
    for child in element.children() {
        match child.value() {
            Node::Text(t) => text::push_words(t, style, out),
            Node::Element(_) => {
                if let Some(inner) = ElementRef::wrap(child) {
                    walk(inner, style_for_tag(inner.value().name()), out);
                }
            }
            _ => {}
        }
    }
}
