//! 消息模板模块
//!
//! 将用户编写的模板与事件上下文结合，替换其中的占位符。
//!
//! 占位符语法是 Python `str.format` 的一个子集：
//!
//! ```text
//! {name}                       固定字段或同名标签
//! {tag[key]} {tag['key']}      标签查找（也接受 {tag["key"]}、{tag.key}、{tags[key]}）
//! {{  }}                       字面量大括号
//! ```
//!
//! 渲染永远不会失败：缺失或无法识别的占位符一律替换为 [`NOT_SET`]，
//! 未闭合的 `{` 与多余的 `}` 按原样输出。

use crate::event::{EventContext, NOT_SET};
use crate::notification::card::SEGMENT_SEPARATOR;
use std::fmt;

/// 模板支持的固定字段名
pub const FIXED_FIELDS: [&str; 7] = [
    "header",
    "project_name",
    "user",
    "environment",
    "release",
    "message",
    "url",
];

/// 模板中的一个占位符
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    /// 按名称查找的字段（固定字段或回退到同名标签）
    Field(String),
    /// 显式的标签查找
    Tag(String),
}

impl Placeholder {
    /// 从大括号内的文本解析占位符
    fn parse(body: &str) -> Self {
        let body = body.trim();
        let rest = body
            .strip_prefix("tags")
            .or_else(|| body.strip_prefix("tag"));

        match rest {
            Some(rest) if rest.starts_with('[') && rest.ends_with(']') && rest.len() >= 2 => {
                Placeholder::Tag(strip_quotes(rest[1..rest.len() - 1].trim()).to_string())
            }
            Some(rest) if rest.starts_with('.') => Placeholder::Tag(rest[1..].trim().to_string()),
            _ => Placeholder::Field(body.to_string()),
        }
    }

    /// 在事件上下文中解析占位符的值
    pub fn resolve<'a>(&self, context: &'a EventContext) -> Option<&'a str> {
        match self {
            Placeholder::Field(name) => context.lookup(name),
            Placeholder::Tag(key) => context.tag_value(key),
        }
    }

    /// 是否为固定字段或标签查找
    ///
    /// 其他名称只有在事件恰好带有同名标签时才有值。
    pub fn is_known(&self) -> bool {
        match self {
            Placeholder::Field(name) => FIXED_FIELDS.contains(&name.as_str()),
            Placeholder::Tag(_) => true,
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placeholder::Field(name) => write!(f, "{{{name}}}"),
            Placeholder::Tag(key) => write!(f, "{{tag[{key}]}}"),
        }
    }
}

fn strip_quotes(key: &str) -> &str {
    for quote in ['\'', '"'] {
        if key.len() >= 2 && key.starts_with(quote) && key.ends_with(quote) {
            return &key[1..key.len() - 1];
        }
    }
    key
}

fn is_brace(c: char) -> bool {
    c == '{' || c == '}'
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Placeholder(Placeholder),
}

/// 将一段模板文本切分为字面量和占位符
fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut rest = text;

    while let Some(pos) = rest.find(is_brace) {
        literal.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            literal.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('}') {
            literal.push('}');
            rest = &tail[1..];
            continue;
        }

        let body_and_rest = &tail[1..];
        match body_and_rest.find(is_brace) {
            Some(end) if body_and_rest[end..].starts_with('}') => {
                if !literal.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                }
                tokens.push(Token::Placeholder(Placeholder::parse(&body_and_rest[..end])));
                rest = &body_and_rest[end + 1..];
            }
            Some(_) => {
                // 嵌套的 `{`，外层按字面量处理
                literal.push('{');
                rest = body_and_rest;
            }
            None => {
                literal.push_str(tail);
                rest = "";
            }
        }
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    tokens
}

/// 替换一段模板文本中的占位符
pub fn render_text(text: &str, context: &EventContext) -> String {
    render_tokens(&tokenize(text), context)
}

/// 模板渲染器
///
/// 模板在创建时按分段分隔符切分并解析，之后只读。
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    /// 原始模板
    template: String,
    /// 分段分隔符
    separator: String,
    /// 切分后未替换的原始分段
    raw_segments: Vec<String>,
    /// 每个分段解析后的记号
    segments: Vec<Vec<Token>>,
}

impl TemplateRenderer {
    /// 使用默认分隔符 `<br>` 创建渲染器
    pub fn new(template: impl Into<String>) -> Self {
        Self::with_separator(template, SEGMENT_SEPARATOR)
    }

    /// 使用自定义分隔符创建渲染器
    pub fn with_separator(template: impl Into<String>, separator: &str) -> Self {
        let template = template.into();
        let raw_segments: Vec<String> = if separator.is_empty() {
            vec![template.clone()]
        } else {
            template.split(separator).map(str::to_string).collect()
        };
        let segments = raw_segments.iter().map(|s| tokenize(s)).collect();

        Self {
            template,
            separator: separator.to_string(),
            raw_segments,
            segments,
        }
    }

    /// 原始模板
    pub fn template(&self) -> &str {
        &self.template
    }

    /// 未替换占位符的原始分段
    pub fn raw_segments(&self) -> &[String] {
        &self.raw_segments
    }

    /// 渲染整个模板
    pub fn render(&self, context: &EventContext) -> String {
        self.render_segments(context).join(&self.separator)
    }

    /// 先按分隔符切分模板，再逐段渲染
    ///
    /// 事件中的值因此无法注入分隔符。结构标记的识别见 [`CardBuilder::build_template`]。
    ///
    /// [`CardBuilder::build_template`]: crate::notification::card::CardBuilder::build_template
    pub fn render_segments(&self, context: &EventContext) -> Vec<String> {
        self.segments
            .iter()
            .map(|tokens| render_tokens(tokens, context))
            .collect()
    }

    /// 模板中出现的所有占位符（按出现顺序，可能重复）
    pub fn placeholders(&self) -> Vec<Placeholder> {
        self.segments
            .iter()
            .flatten()
            .filter_map(|token| match token {
                Token::Placeholder(p) => Some(p.clone()),
                Token::Literal(_) => None,
            })
            .collect()
    }
}

fn render_tokens(tokens: &[Token], context: &EventContext) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            Token::Literal(text) => out.push_str(text),
            Token::Placeholder(p) => out.push_str(p.resolve(context).unwrap_or(NOT_SET)),
        }
    }
    out
}
