use crate::core::{Commentary, PageParser, VerseRecord};
use crate::utils::error::{BotError, Result};
use scraper::{ElementRef, Html, Selector};

pub const ARABIC_SELECTOR: &str = "div.ayat-text.arabic";
pub const TRANSLATION_SELECTOR: &str = "div.translation";
pub const COMMENTARY_SELECTOR: &str = "div.tafsir";
pub const AUTHOR_SELECTOR: &str = "strong";

/// Extracts verse content from quran-online.ru style pages.
///
/// Each fragment is best-effort: a missing node (or one with no text) falls back to the
/// placeholders applied by [`VerseRecord::new`].
#[derive(Debug, Clone)]
pub struct HtmlPageParser {
    arabic: Selector,
    translation: Selector,
    commentary: Selector,
    author: Selector,
}

impl HtmlPageParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            arabic: selector(ARABIC_SELECTOR)?,
            translation: selector(TRANSLATION_SELECTOR)?,
            commentary: selector(COMMENTARY_SELECTOR)?,
            author: selector(AUTHOR_SELECTOR)?,
        })
    }

    fn first_text(&self, document: &Html, selector: &Selector) -> Option<String> {
        document.select(selector).next().map(element_text)
    }

    fn commentary(&self, position: usize, entry: ElementRef<'_>) -> Commentary {
        let raw: String = entry.text().collect();
        let label = entry
            .select(&self.author)
            .next()
            .map(element_text)
            .filter(|author| !author.is_empty())
            .unwrap_or_else(|| format!("Commentator {}", position));

        let body = raw.replacen(&label, "", 1).trim().to_string();
        Commentary::new(label, body)
    }
}

impl PageParser for HtmlPageParser {
    fn parse(&self, html: &str) -> VerseRecord {
        let document = Html::parse_document(html);

        let arabic = self.first_text(&document, &self.arabic);
        let translation = self.first_text(&document, &self.translation);
        let commentaries: Vec<Commentary> = document
            .select(&self.commentary)
            .enumerate()
            .map(|(index, entry)| self.commentary(index + 1, entry))
            .collect();

        tracing::debug!(
            arabic_found = arabic.is_some(),
            translation_found = translation.is_some(),
            commentaries = commentaries.len(),
            "Parsed verse page"
        );

        VerseRecord::new(arabic, translation, commentaries)
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| BotError::SelectorError {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ARABIC_PLACEHOLDER, TRANSLATION_PLACEHOLDER};

    fn parse(html: &str) -> VerseRecord {
        HtmlPageParser::new().unwrap().parse(html)
    }

    #[test]
    fn test_parse_full_page() {
        let html = r#"
<html><body>
  <div class="ayat-text arabic">  وَإِذْ قَالَ مُوسَىٰ  </div>
  <div class="translation">
    Вот Муса (Моисей) сказал своему народу...
  </div>
  <div class="tafsir"><strong> Ибн Касир </strong> Первое толкование. </div>
  <div class="tafsir">Второе толкование без автора.</div>
</body></html>"#;

        let record = parse(html);

        assert_eq!(record.arabic_text, "وَإِذْ قَالَ مُوسَىٰ");
        assert_eq!(record.translation_text, "Вот Муса (Моисей) сказал своему народу...");
        assert_eq!(
            record.commentaries,
            vec![
                Commentary::new("Ибн Касир", "Первое толкование."),
                Commentary::new("Commentator 2", "Второе толкование без автора."),
            ]
        );
    }

    #[test]
    fn test_nested_markup_is_flattened() {
        let html = r#"<div class="translation">Say: <em>He is</em> Allah, <b>One</b></div>"#;
        assert_eq!(parse(html).translation_text, "Say: He is Allah, One");
    }

    #[test]
    fn test_author_is_stripped_only_once() {
        let html = r#"<div class="tafsir"><strong>As-Saadi</strong> As-Saadi said this.</div>"#;
        let record = parse(html);
        assert_eq!(record.commentaries[0].author, "As-Saadi");
        assert_eq!(record.commentaries[0].text, "As-Saadi said this.");
    }

    #[test]
    fn test_empty_author_node_gets_synthesized_label() {
        let html = r#"<div class="tafsir"><strong>  </strong>Body</div>"#;
        let record = parse(html);
        assert_eq!(record.commentaries[0], Commentary::new("Commentator 1", "Body"));
    }

    #[test]
    fn test_malformed_page_uses_placeholders() {
        let record = parse("<html><div class=\"ayat-text\">only half a class</div><p>unclosed");

        assert_eq!(record.arabic_text, ARABIC_PLACEHOLDER);
        assert_eq!(record.translation_text, TRANSLATION_PLACEHOLDER);
        assert_eq!(
            record.commentaries,
            vec![Commentary::new("no data", "commentary unavailable")]
        );
    }

    #[test]
    fn test_empty_document() {
        let record = parse("");
        assert_eq!(record.arabic_text, ARABIC_PLACEHOLDER);
        assert_eq!(record.commentaries.len(), 1);
    }
}
