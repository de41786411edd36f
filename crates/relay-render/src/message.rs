//! Typed wire shapes for the per-platform robot messages.

use relay_model::Platform;
use serde::Serialize;

use crate::error::Result;

/// Enterprise WeChat group-robot markdown message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QyWechatMessage {
    /// Always `"markdown"`.
    pub msgtype: &'static str,
    /// The markdown payload.
    pub markdown: MarkdownContent,
}

impl QyWechatMessage {
    /// Wraps markdown content in the qywechat message shape.
    #[must_use]
    pub fn new(content: String) -> Self {
        Self {
            msgtype: "markdown",
            markdown: MarkdownContent { content },
        }
    }
}

/// Markdown body shared by the qywechat message shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkdownContent {
    /// The markdown text.
    pub content: String,
}

/// Feishu custom-bot interactive card message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeishuMessage {
    /// Always `"interactive"`.
    pub msg_type: &'static str,
    /// The card payload.
    pub card: FeishuCard,
}

impl FeishuMessage {
    /// Wraps markdown content in a single-element wide card.
    #[must_use]
    pub fn new(content: String) -> Self {
        Self {
            msg_type: "interactive",
            card: FeishuCard {
                config: FeishuCardConfig {
                    wide_screen_mode: true,
                },
                elements: vec![FeishuElement {
                    tag: "div",
                    text: FeishuText {
                        tag: "lark_md",
                        content,
                    },
                }],
            },
        }
    }
}

/// A Feishu interactive card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeishuCard {
    /// Card display options.
    pub config: FeishuCardConfig,
    /// Card body elements.
    pub elements: Vec<FeishuElement>,
}

/// Feishu card display options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeishuCardConfig {
    /// Render the card at full width.
    pub wide_screen_mode: bool,
}

/// One element of a Feishu card body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeishuElement {
    /// Element kind, `"div"` for plain text blocks.
    pub tag: &'static str,
    /// The element's text content.
    pub text: FeishuText,
}

/// Text content of a Feishu card element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeishuText {
    /// Text markup kind, `"lark_md"` for Feishu-flavoured markdown.
    pub tag: &'static str,
    /// The markdown text.
    pub content: String,
}

/// DingTalk custom-robot markdown message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DingtalkMessage {
    /// Always `"markdown"`.
    pub msgtype: &'static str,
    /// The markdown payload.
    pub markdown: DingtalkMarkdown,
}

impl DingtalkMessage {
    /// Wraps title and markdown text in the dingtalk message shape.
    #[must_use]
    pub fn new(title: String, text: String) -> Self {
        Self {
            msgtype: "markdown",
            markdown: DingtalkMarkdown { title, text },
        }
    }
}

/// DingTalk markdown body. The title shows in the conversation list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DingtalkMarkdown {
    /// Conversation-list title.
    pub title: String,
    /// The markdown text.
    pub text: String,
}

/// A rendered message, ready to be posted to its platform.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedMessage {
    /// Enterprise WeChat message.
    QyWechat(QyWechatMessage),
    /// Feishu message.
    Feishu(FeishuMessage),
    /// DingTalk message.
    Dingtalk(DingtalkMessage),
}

impl RenderedMessage {
    /// The platform this message targets.
    #[must_use]
    pub const fn platform(&self) -> Platform {
        match self {
            Self::QyWechat(_) => Platform::QyWechat,
            Self::Feishu(_) => Platform::Feishu,
            Self::Dingtalk(_) => Platform::Dingtalk,
        }
    }

    /// Serializes the message into the JSON body for the HTTP POST.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let value = match self {
            Self::QyWechat(msg) => serde_json::to_value(msg)?,
            Self::Feishu(msg) => serde_json::to_value(msg)?,
            Self::Dingtalk(msg) => serde_json::to_value(msg)?,
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qywechat_wire_shape() {
        let msg = QyWechatMessage::new("**hello**".to_string());
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["msgtype"], "markdown");
        assert_eq!(json["markdown"]["content"], "**hello**");
    }

    #[test]
    fn feishu_wire_shape() {
        let msg = FeishuMessage::new("**hello**".to_string());
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["msg_type"], "interactive");
        assert_eq!(json["card"]["config"]["wide_screen_mode"], true);
        assert_eq!(json["card"]["elements"][0]["tag"], "div");
        assert_eq!(json["card"]["elements"][0]["text"]["tag"], "lark_md");
        assert_eq!(json["card"]["elements"][0]["text"]["content"], "**hello**");
    }

    #[test]
    fn dingtalk_wire_shape() {
        let msg = DingtalkMessage::new("title".to_string(), "**hello**".to_string());
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["msgtype"], "markdown");
        assert_eq!(json["markdown"]["title"], "title");
        assert_eq!(json["markdown"]["text"], "**hello**");
    }

    #[test]
    fn rendered_message_platform() {
        assert_eq!(
            RenderedMessage::QyWechat(QyWechatMessage::new(String::new())).platform(),
            Platform::QyWechat
        );
        assert_eq!(
            RenderedMessage::Feishu(FeishuMessage::new(String::new())).platform(),
            Platform::Feishu
        );
        assert_eq!(
            RenderedMessage::Dingtalk(DingtalkMessage::new(String::new(), String::new()))
                .platform(),
            Platform::Dingtalk
        );
    }
}
