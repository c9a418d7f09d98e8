//! Markdown rendering with syntax highlighting

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::HighlightConfig;

/// Marker separating a post's excerpt from the rest of its body
pub const MORE_MARKER: &str = "<!-- more -->";

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    highlight: bool,
    line_numbers: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options(&HighlightConfig::default())
    }

    /// Create with custom settings
    pub fn with_options(config: &HighlightConfig) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: config.theme.clone(),
            highlight: config.enable,
            line_numbers: config.line_number,
        }
    }

    fn options() -> Options {
        // YAML metadata blocks are handled separately in FrontMatter::parse()
        Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, Self::options());

        let mut events: Vec<Event> = Vec::new();
        let mut in_code_block = false;
        let mut code_block_lang: Option<String> = None;
        let mut code_block_content = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) if self.highlight => {
                    in_code_block = true;
                    code_block_lang = match kind {
                        CodeBlockKind::Fenced(lang) => {
                            // Info strings may carry attributes after the language
                            let lang = lang.split_whitespace().next().unwrap_or("").to_string();
                            if lang.is_empty() {
                                None
                            } else {
                                Some(lang)
                            }
                        }
                        CodeBlockKind::Indented => None,
                    };
                    code_block_content.clear();
                }
                Event::End(TagEnd::CodeBlock) if in_code_block => {
                    let highlighted =
                        self.highlight_code(&code_block_content, code_block_lang.as_deref());
                    events.push(Event::Html(CowStr::from(highlighted)));
                    in_code_block = false;
                }
                Event::Text(text) if in_code_block => {
                    code_block_content.push_str(&text);
                }
                Event::Html(ref html) | Event::InlineHtml(ref html)
                    if html.trim() == MORE_MARKER => {}
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        html_output
    }

    fn theme(&self) -> Option<&Theme> {
        self.theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next())
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");
        let class = html_escape(lang);

        // Try to find syntax for the language
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let highlighted = self.theme().and_then(|theme| {
            highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
        });

        match highlighted {
            Some(highlighted) if self.line_numbers => self.add_line_numbers(&highlighted, &class),
            Some(highlighted) => format!(
                r#"<figure class="highlight {}">{}</figure>"#,
                class, highlighted
            ),
            None => {
                tracing::debug!("Falling back to plain code block for {}", lang);
                format!(
                    r#"<pre><code class="language-{}">{}</code></pre>"#,
                    class,
                    html_escape(code)
                )
            }
        }
    }

    /// Add line numbers to highlighted code
    fn add_line_numbers(&self, code: &str, class: &str) -> String {
        let lines: Vec<&str> = code.lines().collect();

        let gutter = (1..=lines.len())
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
            class,
            gutter,
            lines.join("\n")
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Count words in markdown prose (CJK characters count as one word each)
pub fn count_words(markdown: &str) -> usize {
    // Smart punctuation would split contractions into separate text events
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let mut count = 0;
    let mut in_word = false;

    for event in Parser::new_ext(markdown, options) {
        let text = match event {
            Event::Text(text) | Event::Code(text) => text,
            _ => {
                in_word = false;
                continue;
            }
        };

        for c in text.chars() {
            if ('\u{4E00}'..='\u{9FFF}').contains(&c) {
                count += 1;
                in_word = false;
            } else if c.is_alphanumeric() {
                if !in_word {
                    in_word = true;
                    count += 1;
                }
            } else if c != '\'' && c != '-' {
                in_word = false;
            }
        }
    }

    count
}

/// Estimated reading time in whole minutes, never less than one
pub fn estimate_reading_time(markdown: &str, words_per_minute: usize) -> u32 {
    let words = count_words(markdown);
    let wpm = words_per_minute.max(1);
    let minutes = words.div_ceil(wpm).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a test.");
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```");
        assert!(html.contains("highlight rust"));
        assert!(html.contains("line-number"));
        assert!(!html.contains("```"));
    }

    #[test]
    fn test_render_code_block_without_highlighting() {
        let renderer = MarkdownRenderer::with_options(&HighlightConfig {
            enable: false,
            ..Default::default()
        });
        let html = renderer.render("```rust\nlet x = 1 < 2;\n```");
        assert!(html.contains("<pre><code class=\"language-rust\">"));
        assert!(html.contains("1 &lt; 2"));
    }

    #[test]
    fn test_unknown_language_falls_back_to_plain_text() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```nosuchlang\nsome <code>\n```");
        assert!(html.contains("highlight nosuchlang"));
        assert!(!html.contains("<code>"));
    }

    #[test]
    fn test_more_marker_removed() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("Intro.\n\n<!-- more -->\n\nRest.");
        assert!(!html.contains("more"));
        assert!(html.contains("<p>Intro.</p>"));
        assert!(html.contains("<p>Rest.</p>"));

        let inline = renderer.render("Intro <!-- more --> rest.");
        assert!(!inline.contains("more"));
    }

    #[test]
    fn test_more_marker_kept_inside_code() {
        let renderer = MarkdownRenderer::with_options(&HighlightConfig {
            enable: false,
            ..Default::default()
        });
        let html = renderer.render("Use `<!-- more -->` to split.\n\n```html\n<!-- more -->\n```\n");
        assert_eq!(html.matches("&lt;!-- more --&gt;").count(), 2);
    }

    #[test]
    fn test_code_block_language_is_escaped() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```x\"><script>\nplain\n```");
        assert!(!html.contains("<script>"));
        assert!(html.contains("highlight x&quot;&gt;&lt;script&gt;"));
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words("# Title\n\nHello, world! It's `code`."), 5);
        assert_eq!(count_words("第一条内容"), 5);
        assert_eq!(count_words(""), 0);
    }

    #[test]
    fn test_estimate_reading_time() {
        assert_eq!(estimate_reading_time("", 200), 1);
        let text = "word ".repeat(450);
        assert_eq!(estimate_reading_time(&text, 200), 3);
        assert_eq!(estimate_reading_time(&text, 0), 450);
    }
}
