//! Lightweight HTML text extraction.
//!
//! Storefront pages are only mined for text, anchors and headings. Tags are
//! tokenized with regular expressions; FAQ extraction tracks element nesting
//! on top of that token stream. Markup that defeats it simply yields less
//! data.

use std::sync::LazyLock;

use regex::Regex;

static SCRIPT_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style|noscript)\b[^>]*>.*?</(script|style|noscript)\s*>")
        .expect("Invalid regex")
});

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("Invalid regex"));

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("Invalid regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex"));

static ANCHOR_HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
        .expect("Invalid regex")
});

/// Opening or closing tag; group 1 is `/` for a closing tag, group 2 the name.
static TAG_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<(/?)([A-Za-z][A-Za-z0-9]*)\b[^>]*>").expect("Invalid regex")
});

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z]{2,8});").expect("Invalid regex")
});

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").expect("Invalid regex"));

static META_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("Invalid regex"));

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z:_-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("Invalid regex")
});

/// Strip tags and collapse whitespace. No script removal.
#[must_use]
pub fn strip_tags(html: &str) -> String {
    let text = TAG_RE.replace_all(html, " ");
    collapse_whitespace(&decode_entities(&text))
}

/// Visible text of a page: scripts, styles and comments removed, tags
/// stripped, common entities decoded, whitespace collapsed.
#[must_use]
pub fn visible_text(html: &str) -> String {
    let without_scripts = SCRIPT_STYLE_RE.replace_all(html, " ");
    let without_comments = COMMENT_RE.replace_all(&without_scripts, " ");
    strip_tags(&without_comments)
}

/// Every non-empty `href` of an `<a>` element, in document order.
#[must_use]
pub fn anchor_hrefs(html: &str) -> Vec<String> {
    ANCHOR_HREF_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| decode_entities(m.as_str().trim()))
        .filter(|href| !href.is_empty())
        .collect()
}

/// Pair every `h2`/`h3`/`strong` heading with the next paragraph after it.
///
/// "Next" is document order by opening tag, so a `<strong>` wrapped in a
/// `<p>` is answered by the following paragraph. Headings without a
/// following paragraph are dropped. A paragraph may be the answer to more
/// than one heading when headings are adjacent.
#[must_use]
pub fn heading_paragraphs(html: &str) -> Vec<(String, String)> {
    let html = SCRIPT_STYLE_RE.replace_all(html, " ");
    let blocks: Vec<(BlockKind, String)> = faq_blocks(&html)
        .into_iter()
        .map(|block| {
            let inner = html.get(block.start..block.end).unwrap_or_default();
            (block.kind, strip_tags(inner))
        })
        .collect();

    blocks
        .iter()
        .enumerate()
        .filter(|(_, (kind, _))| *kind == BlockKind::Heading)
        .filter_map(|(i, (_, question))| {
            blocks
                .iter()
                .skip(i + 1)
                .find(|(kind, _)| *kind == BlockKind::Paragraph)
                .map(|(_, answer)| (question.clone(), answer.clone()))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Heading,
    Paragraph,
}

/// Byte range of an element's inner HTML.
#[derive(Debug)]
struct Block {
    kind: BlockKind,
    start: usize,
    end: usize,
}

/// Headings and paragraphs in order of their opening tags.
///
/// Each closing tag closes the innermost open element of the same name.
/// A `<p>` opened while another is open closes it, and elements that are
/// never closed run to the end of the input.
fn faq_blocks(html: &str) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();
    // (tag name, index into `blocks`)
    let mut open: Vec<(String, usize)> = Vec::new();

    for caps in TAG_TOKEN_RE.captures_iter(html) {
        let (Some(tag), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        let name = name.as_str().to_ascii_lowercase();
        let kind = match name.as_str() {
            "h2" | "h3" | "strong" => BlockKind::Heading,
            "p" => BlockKind::Paragraph,
            _ => continue,
        };

        if caps.get(1).is_some_and(|m| !m.as_str().is_empty()) {
            close(&mut open, &mut blocks, &name, tag.start());
            continue;
        }

        if kind == BlockKind::Paragraph {
            close(&mut open, &mut blocks, "p", tag.start());
        }
        open.push((name, blocks.len()));
        blocks.push(Block {
            kind,
            start: tag.end(),
            end: html.len(),
        });
    }

    blocks
}

fn close(open: &mut Vec<(String, usize)>, blocks: &mut [Block], name: &str, at: usize) {
    if let Some(pos) = open.iter().rposition(|(n, _)| n == name) {
        let (_, idx) = open.remove(pos);
        if let Some(block) = blocks.get_mut(idx) {
            block.end = at;
        }
    }
}

/// Site name from `og:site_name`, falling back to the `<title>` element.
#[must_use]
pub fn page_title(html: &str) -> Option<String> {
    let site_name = META_TAG_RE.find_iter(html).find_map(|tag| {
        let mut property = None;
        let mut content = None;
        for caps in ATTR_RE.captures_iter(tag.as_str()) {
            let value = caps.get(2).or_else(|| caps.get(3)).map(|m| m.as_str());
            match caps.get(1).map(|m| m.as_str().to_ascii_lowercase()).as_deref() {
                Some("property" | "name") => property = value,
                Some("content") => content = value,
                _ => {}
            }
        }
        property
            .filter(|p| p.eq_ignore_ascii_case("og:site_name"))
            .and(content)
            .map(|c| collapse_whitespace(&decode_entities(c)))
    });

    site_name
        .or_else(|| {
            TITLE_RE
                .captures(html)
                .and_then(|caps| caps.get(1))
                .map(|m| strip_tags(m.as_str()))
        })
        .filter(|title| !title.is_empty())
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Decode numeric character references and common named entities in one
/// pass. Unknown entities are left as written.
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    ENTITY_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            let body = caps.get(1).map_or("", |m| m.as_str());
            decode_entity(body).map_or_else(|| whole.to_string(), String::from)
        })
        .into_owned()
}

fn decode_entity(body: &str) -> Option<char> {
    if let Some(number) = body.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => number.parse::<u32>().ok()?,
        };
        return char::from_u32(code).map(|c| if c == '\u{a0}' { ' ' } else { c });
    }
    let c = match body {
        "nbsp" => ' ',
        "amp" => '&',
        "quot" => '"',
        "apos" | "rsquo" | "lsquo" => '\'',
        "lt" => '<',
        "gt" => '>',
        "ndash" | "mdash" => '-',
        "ldquo" | "rdquo" => '"',
        "hellip" => '…',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_text_drops_scripts_and_tags() {
        let html = r#"<html><head><style>p { color: red }</style>
            <script>var x = "<p>hidden</p>";</script></head>
            <body><!-- note --><h1>Refund&nbsp;Policy</h1>
            <p>Returns within <b>30</b> days &amp; free.</p></body></html>"#;
        assert_eq!(visible_text(html), "Refund Policy Returns within 30 days & free.");
    }

    #[test]
    fn test_anchor_hrefs_quote_styles() {
        let html = r#"<a href="/products/tee">Tee</a>
            <a class="x" href='https://instagram.com/acme'>IG</a>
            <a href=/pages/faq>FAQ</a>
            <a name="top">no href</a>
            <a href="">empty</a>
            <a href="/search?q=a&amp;b">Search</a>"#;
        assert_eq!(
            anchor_hrefs(html),
            vec![
                "/products/tee",
                "https://instagram.com/acme",
                "/pages/faq",
                "/search?q=a&b"
            ]
        );
    }

    #[test]
    fn test_heading_paragraphs() {
        let html = "<h2>Do you ship abroad?</h2><div><p>Yes, worldwide.</p></div>
            <h3>Orphan heading</h3><strong>Returns?</strong><p>Within 30 days.</p>";
        assert_eq!(
            heading_paragraphs(html),
            vec![
                ("Do you ship abroad?".to_string(), "Yes, worldwide.".to_string()),
                ("Orphan heading".to_string(), "Within 30 days.".to_string()),
                ("Returns?".to_string(), "Within 30 days.".to_string()),
            ]
        );
    }

    #[test]
    fn test_inline_strong_inside_answer_keeps_full_answer() {
        let html = "<h3>Do you ship?</h3><p>Yes, we ship <strong>worldwide</strong> within 5 days.</p>";
        assert_eq!(
            heading_paragraphs(html),
            vec![(
                "Do you ship?".to_string(),
                "Yes, we ship worldwide within 5 days.".to_string()
            )]
        );
    }

    #[test]
    fn test_strong_question_wrapped_in_paragraph() {
        let html = "<p><strong>Do you ship?</strong></p><p>Yes, worldwide.</p>";
        assert_eq!(
            heading_paragraphs(html),
            vec![("Do you ship?".to_string(), "Yes, worldwide.".to_string())]
        );
    }

    #[test]
    fn test_unclosed_paragraphs_end_at_next_paragraph() {
        let html = "<h2>Sizes?</h2><p>S to XL<p>Other text";
        assert_eq!(
            heading_paragraphs(html),
            vec![("Sizes?".to_string(), "S to XL".to_string())]
        );
    }

    #[test]
    fn test_heading_without_paragraph_is_dropped() {
        assert!(heading_paragraphs("<h2>Question only</h2>").is_empty());
    }

    #[test]
    fn test_page_title_prefers_site_name() {
        let html = r#"<head><title>Home | Acme</title>
            <meta property="og:site_name" content="Acme &amp; Co"></head>"#;
        assert_eq!(page_title(html).as_deref(), Some("Acme & Co"));
    }

    #[test]
    fn test_page_title_falls_back_to_title() {
        let html = "<head><title>\n  Acme Store\n</title></head>";
        assert_eq!(page_title(html).as_deref(), Some("Acme Store"));
        assert_eq!(page_title("<title> </title>"), None);
    }

    #[test]
    fn test_numeric_entities_are_decoded() {
        assert_eq!(
            strip_tags("We&#8217;re happy &#x2019;n&#X2019; open &#169; 2025"),
            "We\u{2019}re happy \u{2019}n\u{2019} open \u{a9} 2025"
        );
        assert_eq!(strip_tags("a&amp;lt;b &bogus; &#xZZ;"), "a&lt;b &bogus; &#xZZ;");
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<p>Soft <em>cotton</em></p>\n<ul><li>S</li></ul>"), "Soft cotton S");
    }
}
