//! 卡片构建模块
//!
//! 把模板分段归类为标题、分割线、按钮和文本块，生成结构化卡片。
//! [`CardBuilder::build_template`] 先归类原始模板分段，再替换文本、按钮文字和url
//! 中的占位符，事件中的值只会作为内容出现。
//!
//! 分段语法（每段先去除首尾空白）：
//!
//! ```text
//! segment := divider | button | text | empty
//! divider := "<hr>"
//! button  := "<btn:" opening ">" url
//!            label 取 "<btn:" opening 中最后一个 ":" 之后的文本
//!            url   取第一个 ">" 之后的文本，不能为空
//! text    := 其他非空文本
//! ```
//!
//! 第一段总是作为卡片标题。构建过程不会失败：格式不完整的按钮退化为文本块，
//! 空段直接跳过。

use crate::event::EventContext;
use crate::notification::template::{render_text, TemplateRenderer};
use tracing::debug;

/// 分段分隔符
pub const SEGMENT_SEPARATOR: &str = "<br>";
/// 分割线标记
pub const DIVIDER_TOKEN: &str = "<hr>";
/// 按钮起始标记
pub const BUTTON_OPEN: &str = "<btn:";
/// 按钮结束标记
pub const BUTTON_CLOSE: &str = ">";
/// 按钮文字分隔符
pub const LABEL_DELIMITER: &str = ":";

/// 卡片标记语法
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSyntax {
    pub separator: String,
    pub divider: String,
    pub button_open: String,
    pub button_close: String,
    pub label_delimiter: String,
}

impl Default for CardSyntax {
    fn default() -> Self {
        Self {
            separator: SEGMENT_SEPARATOR.to_string(),
            divider: DIVIDER_TOKEN.to_string(),
            button_open: BUTTON_OPEN.to_string(),
            button_close: BUTTON_CLOSE.to_string(),
            label_delimiter: LABEL_DELIMITER.to_string(),
        }
    }
}

/// 卡片元素
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardElement {
    /// 分割线
    Divider,
    /// 跳转按钮
    Button { label: String, url: String },
    /// 富文本块（lark_md）
    TextBlock { content: String },
}

/// 结构化卡片
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardDocument {
    /// 卡片标题（纯文本，可能为空）
    pub header: String,
    /// 按分段顺序排列的元素
    pub elements: Vec<CardElement>,
}

/// 单个分段的归类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// 空段，不产生元素
    Empty,
    Divider,
    Button { label: String, url: String },
    Text(String),
}

impl Segment {
    /// 转换为卡片元素，空段返回 `None`
    pub fn into_element(self) -> Option<CardElement> {
        match self {
            Segment::Empty => None,
            Segment::Divider => Some(CardElement::Divider),
            Segment::Button { label, url } => Some(CardElement::Button { label, url }),
            Segment::Text(content) => Some(CardElement::TextBlock { content }),
        }
    }
}

/// 卡片构建器
#[derive(Debug, Clone, Default)]
pub struct CardBuilder {
    syntax: CardSyntax,
}

impl CardBuilder {
    /// 使用指定语法创建构建器
    pub fn new(syntax: CardSyntax) -> Self {
        Self { syntax }
    }

    /// 当前使用的标记语法
    pub fn syntax(&self) -> &CardSyntax {
        &self.syntax
    }

    /// 按分隔符切分渲染后的文本并构建卡片
    pub fn build(&self, rendered: &str) -> CardDocument {
        if self.syntax.separator.is_empty() {
            return self.build_segments([rendered]);
        }
        self.build_segments(rendered.split(self.syntax.separator.as_str()))
    }

    /// 由已切分的分段构建卡片
    ///
    /// 第一段作为标题，其余分段依次归类。
    pub fn build_segments<I, S>(&self, segments: I) -> CardDocument
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut segments = segments.into_iter();
        let header = segments
            .next()
            .map(|s| s.as_ref().trim().to_string())
            .unwrap_or_default();

        let elements = segments
            .filter_map(|s| self.classify(s.as_ref()).into_element())
            .collect();

        CardDocument { header, elements }
    }

    /// 由模板和事件构建卡片
    ///
    /// 分段类型由原始模板决定，占位符只在分段内容中替换。
    pub fn build_template(
        &self,
        renderer: &TemplateRenderer,
        context: &EventContext,
    ) -> CardDocument {
        let mut segments = renderer.raw_segments().iter();
        let header = segments
            .next()
            .map(|s| render_text(s, context).trim().to_string())
            .unwrap_or_default();

        let elements = segments
            .filter_map(|raw| match self.classify(raw) {
                Segment::Empty => None,
                Segment::Divider => Some(CardElement::Divider),
                Segment::Button { label, url } => {
                    let url = render_text(&url, context).trim().to_string();
                    let label = render_text(&label, context).trim().to_string();
                    let label = if label.is_empty() { url.clone() } else { label };
                    Some(CardElement::Button { label, url })
                }
                Segment::Text(content) => {
                    let content = render_text(&content, context).trim().to_string();
                    (!content.is_empty()).then_some(CardElement::TextBlock { content })
                }
            })
            .collect();

        CardDocument { header, elements }
    }

    /// 归类单个分段
    pub fn classify(&self, segment: &str) -> Segment {
        let segment = segment.trim();

        if segment.is_empty() {
            return Segment::Empty;
        }
        if segment == self.syntax.divider {
            return Segment::Divider;
        }
        if segment.starts_with(self.syntax.button_open.as_str()) {
            return match self.parse_button(segment) {
                Some((label, url)) => Segment::Button { label, url },
                None => {
                    debug!("按钮格式不完整，按文本处理: {}", segment);
                    Segment::Text(segment.to_string())
                }
            };
        }

        Segment::Text(segment.to_string())
    }

    /// 解析 `<btn:label>url`，格式不完整时返回 `None`
    fn parse_button(&self, segment: &str) -> Option<(String, String)> {
        let (opening, url) = segment.split_once(self.syntax.button_close.as_str())?;
        let url = url.trim();
        if url.is_empty() {
            return None;
        }

        let label = opening
            .rsplit(self.syntax.label_delimiter.as_str())
            .next()
            .unwrap_or_default()
            .trim();
        let label = if label.is_empty() { url } else { label };

        Some((label.to_string(), url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_markers() {
        let builder = CardBuilder::default();
        assert_eq!(builder.classify("  "), Segment::Empty);
        assert_eq!(builder.classify(" <hr> "), Segment::Divider);
        assert_eq!(
            builder.classify("<btn:View>http://example.com/event/1"),
            Segment::Button {
                label: "View".to_string(),
                url: "http://example.com/event/1".to_string(),
            }
        );
        assert_eq!(
            builder.classify("**Msg**: boom"),
            Segment::Text("**Msg**: boom".to_string())
        );
    }

    #[test]
    fn test_divider_must_match_exactly() {
        let builder = CardBuilder::default();
        assert_eq!(
            builder.classify("<hr> after"),
            Segment::Text("<hr> after".to_string())
        );
    }

    #[test]
    fn test_button_label_after_last_delimiter() {
        let builder = CardBuilder::default();
        assert_eq!(
            builder.classify("<btn:see:details>https://sentry.io/x"),
            Segment::Button {
                label: "details".to_string(),
                url: "https://sentry.io/x".to_string(),
            }
        );
    }

    #[test]
    fn test_button_url_keeps_later_close_tokens() {
        let builder = CardBuilder::default();
        assert_eq!(
            builder.classify("<btn:go>http://x/?q=a>b"),
            Segment::Button {
                label: "go".to_string(),
                url: "http://x/?q=a>b".to_string(),
            }
        );
    }

    #[test]
    fn test_malformed_buttons_fall_back() {
        let builder = CardBuilder::default();
        assert_eq!(
            builder.classify("<btn:View http://example.com"),
            Segment::Text("<btn:View http://example.com".to_string())
        );
        assert_eq!(
            builder.classify("<btn:View>   "),
            Segment::Text("<btn:View>".to_string())
        );
        assert_eq!(
            builder.classify("<btn:>http://example.com"),
            Segment::Button {
                label: "http://example.com".to_string(),
                url: "http://example.com".to_string(),
            }
        );
    }

    #[test]
    fn test_build_header_only() {
        let card = CardBuilder::default().build("Hello Disk Full");
        assert_eq!(card.header, "Hello Disk Full");
        assert!(card.elements.is_empty());
    }

    #[test]
    fn test_build_skips_empty_segments() {
        let card = CardBuilder::default().build("title<br><br>  <br>body<br>");
        assert_eq!(card.header, "title");
        assert_eq!(
            card.elements,
            vec![CardElement::TextBlock {
                content: "body".to_string()
            }]
        );
    }

    #[test]
    fn test_build_empty_input() {
        let card = CardBuilder::default().build("");
        assert_eq!(card, CardDocument::default());

        let card = CardBuilder::default().build_segments(Vec::<String>::new());
        assert_eq!(card.header, "");
        assert!(card.elements.is_empty());
    }

    #[test]
    fn test_build_template_classifies_before_substitution() {
        let renderer = TemplateRenderer::new("{header}<br>{message}<br><hr><br><btn:{user}>{url}");
        let event = EventContext::new()
            .with_header("Boom")
            .with_message("<btn:Reset>https://evil.example/phish")
            .with_user("alice")
            .with_url("https://sentry.io/e/1");

        let card = CardBuilder::default().build_template(&renderer, &event);
        assert_eq!(card.header, "Boom");
        assert_eq!(
            card.elements,
            vec![
                CardElement::TextBlock {
                    content: "<btn:Reset>https://evil.example/phish".to_string()
                },
                CardElement::Divider,
                CardElement::Button {
                    label: "alice".to_string(),
                    url: "https://sentry.io/e/1".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_custom_syntax() {
        let builder = CardBuilder::new(CardSyntax {
            separator: "\n".to_string(),
            divider: "---".to_string(),
            ..CardSyntax::default()
        });
        let card = builder.build("title\nfirst\n---\n<btn:open>http://x");
        assert_eq!(
            card.elements,
            vec![
                CardElement::TextBlock {
                    content: "first".to_string()
                },
                CardElement::Divider,
                CardElement::Button {
                    label: "open".to_string(),
                    url: "http://x".to_string()
                },
            ]
        );
    }
}
