//! Message rendering for the alert relay.
//!
//! [`Transformer`] turns one alert plus its stored state record into the
//! JSON body a chat-robot platform expects: a Handlebars template produces
//! the markdown, and a per-platform adaptation step handles the formatting
//! quirks (DingTalk does not render HTML font tags, Feishu wants an
//! interactive card, ...).

#![forbid(unsafe_code)]

mod error;
mod message;
mod transformer;

pub use error::{RenderError, Result};
pub use message::{
    DingtalkMarkdown, DingtalkMessage, FeishuCard, FeishuCardConfig, FeishuElement, FeishuMessage,
    FeishuText, MarkdownContent, QyWechatMessage, RenderedMessage,
};
pub use transformer::{DEFAULT_TEMPLATE, Transformer};
