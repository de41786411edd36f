//! Alert-to-markdown rendering.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use handlebars::Handlebars;
use once_cell::sync::Lazy;
use regex::Regex;
use relay_model::{Alert, AlertRecord, AlertStatus, Platform};
use serde::Serialize;

use crate::error::Result;
use crate::message::{DingtalkMessage, FeishuMessage, QyWechatMessage, RenderedMessage};

/// The built-in message template, used when no template file is configured.
///
/// Available variables: `status`, `labels.*`, `annotations.*`, `count`,
/// `start_time`, `end_time` (resolved alerts only).
pub const DEFAULT_TEMPLATE: &str = "\
**告警名称**: {{labels.alertname}}
**告警级别**: {{labels.severity}}
**告警实例**: {{labels.instance}}
**触发次数**: {{count}}
**开始时间**: {{start_time}}
{{#if end_time}}**恢复时间**: {{end_time}}
{{/if}}**告警详情**: {{annotations.summary}}";

const TEMPLATE_NAME: &str = "alert";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const FIRING_HEADING: &str = "# <font color=\"red\">触发告警</font>";
const RESOLVED_HEADING: &str = "# <font color=\"green\">告警恢复</font>";
const FIRING_TITLE: &str = "触发告警";
const RESOLVED_TITLE: &str = "告警恢复";

static FONT_SPAN: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"<font[^>]*>(.*?)</font>").expect("font span regex")
});
static HTML_TAG: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"</?[a-zA-Z][^>]*>").expect("html tag regex")
});

#[derive(Serialize)]
struct TemplateContext<'a> {
    status: &'a str,
    labels: &'a HashMap<String, String>,
    annotations: &'a HashMap<String, String>,
    count: i64,
    start_time: String,
    end_time: Option<String>,
}

/// Renders alerts into per-platform robot messages.
///
/// Rendering is pure: the same alert, record, and platform always produce
/// the same message.
pub struct Transformer {
    registry: Handlebars<'static>,
    timezone: Tz,
}

impl Transformer {
    /// Creates a transformer with the given template source (or the built-in
    /// default) and the timezone used to format timestamps.
    pub fn new(template: Option<&str>, timezone: Tz) -> Result<Self> {
        let mut registry = Handlebars::new();
        // Output is chat markdown, not HTML.
        registry.register_escape_fn(handlebars::no_escape);
        registry.register_template_string(TEMPLATE_NAME, template.unwrap_or(DEFAULT_TEMPLATE))?;
        Ok(Self { registry, timezone })
    }

    /// Renders one alert and its state record for `platform`.
    pub fn render(
        &self,
        alert: &Alert,
        record: &AlertRecord,
        platform: Platform,
    ) -> Result<RenderedMessage> {
        let ctx = TemplateContext {
            status: alert.status.as_str(),
            labels: &alert.labels,
            annotations: &alert.annotations,
            count: record.count,
            start_time: self.format_ts(record.first_seen),
            end_time: record.resolved_at.map(|ts| self.format_ts(ts)),
        };
        let body = self.registry.render(TEMPLATE_NAME, &ctx)?;

        let heading = match alert.status {
            AlertStatus::Firing => FIRING_HEADING,
            AlertStatus::Resolved => RESOLVED_HEADING,
        };
        let content = format!("{heading}\n{body}");

        let message = match platform {
            Platform::QyWechat => RenderedMessage::QyWechat(QyWechatMessage::new(content)),
            Platform::Feishu => RenderedMessage::Feishu(FeishuMessage::new(content)),
            Platform::Dingtalk => {
                let title = match alert.status {
                    AlertStatus::Firing => FIRING_TITLE,
                    AlertStatus::Resolved => RESOLVED_TITLE,
                };
                RenderedMessage::Dingtalk(DingtalkMessage::new(
                    title.to_string(),
                    adapt_dingtalk_markdown(&content),
                ))
            }
        };
        Ok(message)
    }

    fn format_ts(&self, ts: DateTime<Utc>) -> String {
        ts.with_timezone(&self.timezone)
            .format(TIME_FORMAT)
            .to_string()
    }
}

/// Rewrites markdown for DingTalk, which renders HTML tags literally:
/// `<font>` spans become bold, any other tags are stripped.
#[must_use]
pub fn adapt_dingtalk_markdown(content: &str) -> String {
    let bolded = FONT_SPAN.replace_all(content, "**$1**");
    HTML_TAG.replace_all(&bolded, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    fn tz() -> Tz {
        "Asia/Shanghai".parse().unwrap()
    }

    fn firing_alert() -> Alert {
        let mut labels = HashMap::new();
        labels.insert("alertname".to_string(), "HighCpu".to_string());
        labels.insert("severity".to_string(), "critical".to_string());
        labels.insert("instance".to_string(), "node-1:9100".to_string());
        let mut annotations = HashMap::new();
        annotations.insert("summary".to_string(), "CPU above 90%".to_string());

        Alert {
            fingerprint: "02f13394997e5211".to_string(),
            status: AlertStatus::Firing,
            labels,
            annotations,
            starts_at: Utc.with_ymd_and_hms(2024, 5, 1, 1, 30, 0).unwrap(),
            ends_at: None,
            generator_url: None,
        }
    }

    fn firing_record(count: i64) -> AlertRecord {
        AlertRecord {
            fingerprint: "02f13394997e5211".to_string(),
            count,
            first_seen: Utc.with_ymd_and_hms(2024, 5, 1, 1, 30, 0).unwrap(),
            last_status: AlertStatus::Firing,
            resolved_at: None,
        }
    }

    fn resolved_record() -> AlertRecord {
        AlertRecord {
            fingerprint: "02f13394997e5211".to_string(),
            count: 3,
            first_seen: Utc.with_ymd_and_hms(2024, 5, 1, 1, 30, 0).unwrap(),
            last_status: AlertStatus::Resolved,
            resolved_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 2, 0, 0).unwrap()),
        }
    }

    #[test]
    fn firing_message_includes_count_and_local_time() {
        let transformer = Transformer::new(None, tz()).unwrap();
        let msg = transformer
            .render(&firing_alert(), &firing_record(5), Platform::QyWechat)
            .unwrap();

        let RenderedMessage::QyWechat(msg) = msg else {
            panic!("expected qywechat message");
        };
        let content = &msg.markdown.content;
        assert!(content.starts_with("# <font color=\"red\">触发告警</font>"));
        assert!(content.contains("**告警名称**: HighCpu"));
        assert!(content.contains("**触发次数**: 5"));
        // 01:30 UTC is 09:30 in Asia/Shanghai
        assert!(content.contains("2024-05-01 09:30:00"));
        assert!(!content.contains("恢复时间"));
    }

    #[test]
    fn resolved_message_includes_end_time() {
        let mut alert = firing_alert();
        alert.status = AlertStatus::Resolved;

        let transformer = Transformer::new(None, tz()).unwrap();
        let msg = transformer
            .render(&alert, &resolved_record(), Platform::QyWechat)
            .unwrap();

        let RenderedMessage::QyWechat(msg) = msg else {
            panic!("expected qywechat message");
        };
        let content = &msg.markdown.content;
        assert!(content.starts_with("# <font color=\"green\">告警恢复</font>"));
        assert!(content.contains("**恢复时间**: 2024-05-01 10:00:00"));
    }

    #[test]
    fn feishu_message_is_interactive_card() {
        let transformer = Transformer::new(None, tz()).unwrap();
        let msg = transformer
            .render(&firing_alert(), &firing_record(1), Platform::Feishu)
            .unwrap();

        let RenderedMessage::Feishu(msg) = msg else {
            panic!("expected feishu message");
        };
        assert!(msg.card.elements[0].text.content.contains("触发告警"));
    }

    #[test]
    fn dingtalk_message_has_no_html() {
        let transformer = Transformer::new(None, tz()).unwrap();
        let msg = transformer
            .render(&firing_alert(), &firing_record(1), Platform::Dingtalk)
            .unwrap();

        let RenderedMessage::Dingtalk(msg) = msg else {
            panic!("expected dingtalk message");
        };
        assert_eq!(msg.markdown.title, "触发告警");
        assert!(!msg.markdown.text.contains('<'));
        assert!(msg.markdown.text.starts_with("# **触发告警**"));
    }

    #[test]
    fn custom_template_overrides_default() {
        let transformer =
            Transformer::new(Some("alert {{labels.alertname}} x{{count}}"), tz()).unwrap();
        let msg = transformer
            .render(&firing_alert(), &firing_record(2), Platform::QyWechat)
            .unwrap();

        let RenderedMessage::QyWechat(msg) = msg else {
            panic!("expected qywechat message");
        };
        assert!(msg.markdown.content.ends_with("alert HighCpu x2"));
    }

    #[test]
    fn invalid_template_is_rejected() {
        let result = Transformer::new(Some("{{#if}}"), tz());
        assert!(result.is_err());
    }

    #[test]
    fn rendering_is_deterministic() {
        let transformer = Transformer::new(None, tz()).unwrap();
        let first = transformer
            .render(&firing_alert(), &firing_record(2), Platform::QyWechat)
            .unwrap();
        let second = transformer
            .render(&firing_alert(), &firing_record(2), Platform::QyWechat)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test_case("<font color=\"red\">hot</font>", "**hot**"; "font span becomes bold")]
    #[test_case("a <b>c</b> d", "a c d"; "other tags stripped")]
    #[test_case("plain **markdown**", "plain **markdown**"; "markdown untouched")]
    #[test_case("x < y and y > z", "x < y and y > z"; "comparison signs untouched")]
    fn dingtalk_adaptation(input: &str, expected: &str) {
        assert_eq!(adapt_dingtalk_markdown(input), expected);
    }

    mod render_props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn arbitrary_annotations_render_deterministically(summary in ".{0,64}") {
                let transformer = Transformer::new(None, tz()).unwrap();
                let mut alert = firing_alert();
                alert
                    .annotations
                    .insert("summary".to_string(), summary);

                let first = transformer
                    .render(&alert, &firing_record(1), Platform::Dingtalk)
                    .unwrap();
                let second = transformer
                    .render(&alert, &firing_record(1), Platform::Dingtalk)
                    .unwrap();
                prop_assert_eq!(first, second);
            }
        }
    }
}
