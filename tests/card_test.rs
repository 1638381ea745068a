//! 模板渲染与卡片构建测试
//!
//! 覆盖从模板到飞书消息体的完整渲染流程

use lark_sentry::config::types::{DEFAULT_TEMPLATE_EN, DEFAULT_TEMPLATE_ZH};
use lark_sentry::notification::payload::LarkPayload;
use lark_sentry::{CardBuilder, CardElement, EventContext, TemplateRenderer, NOT_SET};
use serde_json::json;

fn render_card(template: &str, event: &EventContext) -> lark_sentry::CardDocument {
    CardBuilder::default().build_template(&TemplateRenderer::new(template), event)
}

fn sentry_event() -> EventContext {
    EventContext::new()
        .with_header("ZeroDivisionError: division by zero")
        .with_message("division by zero")
        .with_project_name("backend")
        .with_url("https://sentry.example.com/issues/4521/")
        .with_tag("environment", "production")
        .with_tag("sentry:release", "backend@2.14.0")
        .with_tag("sentry:user", "id:1042")
}

#[test]
fn test_header_only_template() {
    let event = EventContext::new().with_header("Disk Full");
    let rendered = TemplateRenderer::new("Hello {header}").render(&event);
    assert_eq!(rendered, "Hello Disk Full");

    let card = CardBuilder::default().build(&rendered);
    assert_eq!(card.header, "Hello Disk Full");
    assert!(card.elements.is_empty());
}

#[test]
fn test_divider_between_text_segments() {
    let card = render_card("{header}<br>first<br><hr><br>second", &sentry_event());
    assert_eq!(
        card.elements,
        vec![
            CardElement::TextBlock {
                content: "first".to_string()
            },
            CardElement::Divider,
            CardElement::TextBlock {
                content: "second".to_string()
            },
        ]
    );
}

#[test]
fn test_button_segment() {
    let event = EventContext::new().with_url("http://example.com/event/1");
    let card = render_card("title<br><btn:View>{url}", &event);
    assert_eq!(
        card.elements,
        vec![CardElement::Button {
            label: "View".to_string(),
            url: "http://example.com/event/1".to_string(),
        }]
    );
}

#[test]
fn test_absent_tag_renders_not_set() {
    let card = render_card("{tag[unset_key]}<br>{tag[unset_key]}", &EventContext::new());
    assert_eq!(card.header, NOT_SET);
    assert_eq!(
        card.elements,
        vec![CardElement::TextBlock {
            content: NOT_SET.to_string()
        }]
    );
}

#[test]
fn test_button_without_url_becomes_text() {
    let card = render_card("title<br><btn:View http://example.com", &EventContext::new());
    assert_eq!(
        card.elements,
        vec![CardElement::TextBlock {
            content: "<btn:View http://example.com".to_string()
        }]
    );

    // 缺失的链接渲染为 [not set]，按钮结构不变
    let card = render_card("title<br><btn:View>{url}", &EventContext::new());
    assert_eq!(
        card.elements,
        vec![CardElement::Button {
            label: "View".to_string(),
            url: NOT_SET.to_string(),
        }]
    );
}

#[test]
fn test_element_count_never_exceeds_segments() {
    let templates = [
        "",
        "<br><br><br>",
        "a<br>b<br><hr><br><hr><br>   <br><btn:x>y",
        "{header}{message}<br>{{}}<br>{",
        "<btn:<br>>><br>}}{",
    ];
    for template in templates {
        let segments = TemplateRenderer::new(template).render_segments(&sentry_event());
        let count = segments.len();
        let card = CardBuilder::default().build_segments(segments);
        assert!(card.elements.len() < count.max(1), "{template}");
    }
}

#[test]
fn test_default_english_template() {
    let card = render_card(DEFAULT_TEMPLATE_EN, &sentry_event());

    assert_eq!(card.header, "ZeroDivisionError: division by zero");
    assert_eq!(
        card.elements,
        vec![
            CardElement::TextBlock {
                content: "**Project**:  backend".to_string()
            },
            CardElement::TextBlock {
                content: "**User**:  id:1042".to_string()
            },
            CardElement::TextBlock {
                content: "**Env**:  production".to_string()
            },
            CardElement::TextBlock {
                content: "**Ver**:  backend@2.14.0".to_string()
            },
            CardElement::TextBlock {
                content: "**Msg**:  division by zero".to_string()
            },
            CardElement::Button {
                label: "View details".to_string(),
                url: "https://sentry.example.com/issues/4521/".to_string(),
            },
        ]
    );
}

#[test]
fn test_default_chinese_template_payload() {
    let card = render_card(DEFAULT_TEMPLATE_ZH, &sentry_event());
    let payload = LarkPayload::from_card(&card).to_json();

    assert_eq!(payload["msg_type"], "interactive");
    assert_eq!(payload["card"]["config"], json!({ "wide_screen_mode": true }));
    assert_eq!(
        payload["card"]["header"]["title"],
        json!({ "tag": "plain_text", "content": "ZeroDivisionError: division by zero" })
    );

    let elements = payload["card"]["elements"].as_array().unwrap();
    assert_eq!(elements.len(), 7);
    assert_eq!(elements[0]["text"]["content"], "【项目】backend");
    assert_eq!(elements[2]["text"]["content"], "【环境】production");
    assert_eq!(elements[3]["text"]["content"], "【版本】backend@2.14.0");
    assert_eq!(elements[4], json!({ "tag": "hr" }));
    assert_eq!(elements[6]["actions"][0]["text"]["content"], "点击查看详情");
    assert_eq!(elements[6]["actions"][0]["type"], "primary");
}

#[test]
fn test_missing_event_fields_do_not_break_rendering() {
    let card = render_card(DEFAULT_TEMPLATE_EN, &EventContext::new());
    assert_eq!(card.header, NOT_SET);
    assert_eq!(card.elements.len(), 6);
    assert_eq!(
        card.elements[0],
        CardElement::TextBlock {
            content: format!("**Project**:  {NOT_SET}")
        }
    );
}
