use scraper::{Html, Selector};

/// Elements whose text never reaches the line scanner.
const SKIPPED_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Heading selectors in priority order.
const HEADING_SELECTORS: [&str; 2] = ["h2", "h1"];

/// Cover image selectors in priority order, with the attribute holding the reference.
const COVER_SELECTORS: [(&str, &str); 3] = [
    ("div.release_img img", "src"),
    ("meta[property='og:image']", "content"),
    ("meta[name='twitter:image']", "content"),
];

/// Page content reduced to what the field extractor reads.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageText {
    /// Text of the page's primary heading, whitespace-normalized.
    pub heading: Option<String>,
    /// Non-empty trimmed text lines in document order.
    pub lines: Vec<String>,
    /// Raw cover reference (possibly relative).
    pub cover_src: Option<String>,
}

impl PageText {
    /// Read a fetched HTML document.
    pub fn from_html(markup: &str) -> Self {
        let doc = Html::parse_document(markup);

        let heading = HEADING_SELECTORS.iter().find_map(|css| {
            let sel = Selector::parse(css).ok()?;
            doc.select(&sel)
                .map(|el| {
                    el.text()
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .find(|t| !t.is_empty())
        });

        let cover_src = COVER_SELECTORS.iter().find_map(|(css, attr)| {
            let sel = Selector::parse(css).ok()?;
            doc.select(&sel)
                .filter_map(|el| el.value().attr(attr))
                .map(str::trim)
                .find(|v| !v.is_empty())
                .map(str::to_string)
        });

        let mut text = String::new();
        for node in doc.root_element().descendants() {
            let Some(fragment) = node.value().as_text() else {
                continue;
            };
            let skipped = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| SKIPPED_ELEMENTS.contains(&e.name()))
            });
            if skipped {
                continue;
            }
            text.push_str(fragment);
            text.push('\n');
        }

        Self {
            heading,
            lines: split_lines(&text),
            cover_src,
        }
    }

    /// Read plain text (one field per line). There is no heading or cover reference.
    pub fn from_plain(text: &str) -> Self {
        Self {
            heading: None,
            lines: split_lines(text),
            cover_src: None,
        }
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/extract/page.rs"]
mod tests;
