//! Supported chat-robot platforms and their webhook URL conventions.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// A chat-robot platform the relay can deliver to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Enterprise WeChat group robot.
    QyWechat,
    /// Feishu (Lark) custom bot.
    Feishu,
    /// DingTalk custom robot.
    Dingtalk,
}

impl Platform {
    /// All supported platforms.
    pub const ALL: [Self; 3] = [Self::QyWechat, Self::Feishu, Self::Dingtalk];

    /// Parses the platform from its webhook path segment.
    pub fn from_path_segment(segment: &str) -> Result<Self> {
        match segment {
            "qywechat" => Ok(Self::QyWechat),
            "feishu" => Ok(Self::Feishu),
            "dingtalk" => Ok(Self::Dingtalk),
            other => Err(ModelError::UnknownPlatform {
                name: other.to_string(),
            }),
        }
    }

    /// Returns the platform name as used in paths and configuration.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::QyWechat => "qywechat",
            Self::Feishu => "feishu",
            Self::Dingtalk => "dingtalk",
        }
    }

    /// The platform's public robot-webhook origin, used when no base URL is
    /// configured.
    #[must_use]
    pub const fn default_origin(&self) -> &'static str {
        match self {
            Self::QyWechat => "https://qyapi.weixin.qq.com/cgi-bin/webhook/send",
            Self::Feishu => "https://open.feishu.cn/open-apis/bot/v2/hook",
            Self::Dingtalk => "https://oapi.dingtalk.com/robot/send",
        }
    }

    /// Combines a base URL and a robot credential into a full send URL, per
    /// each platform's convention: qywechat and dingtalk take the key as a
    /// query parameter, feishu appends it as a path segment.
    #[must_use]
    pub fn join_key(&self, base_url: &str, key: &str) -> String {
        let base = base_url.trim_end_matches('/');
        match self {
            Self::QyWechat => format!("{base}?key={key}"),
            Self::Feishu => format!("{base}/{key}"),
            Self::Dingtalk => format!("{base}?access_token={key}"),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("qywechat", Platform::QyWechat)]
    #[test_case("feishu", Platform::Feishu)]
    #[test_case("dingtalk", Platform::Dingtalk)]
    fn parse_path_segment(segment: &str, expected: Platform) {
        assert_eq!(Platform::from_path_segment(segment).unwrap(), expected);
        assert_eq!(expected.as_str(), segment);
    }

    #[test]
    fn parse_unknown_segment_fails() {
        let err = Platform::from_path_segment("slack").unwrap_err();
        assert!(matches!(err, ModelError::UnknownPlatform { name } if name == "slack"));
    }

    #[test]
    fn join_key_qywechat_uses_query_param() {
        let url = Platform::QyWechat.join_key(Platform::QyWechat.default_origin(), "abc-123");
        assert_eq!(
            url,
            "https://qyapi.weixin.qq.com/cgi-bin/webhook/send?key=abc-123"
        );
    }

    #[test]
    fn join_key_feishu_uses_path_segment() {
        let url = Platform::Feishu.join_key("https://open.feishu.cn/open-apis/bot/v2/hook/", "tok");
        assert_eq!(url, "https://open.feishu.cn/open-apis/bot/v2/hook/tok");
    }

    #[test]
    fn join_key_dingtalk_uses_access_token() {
        let url = Platform::Dingtalk.join_key(Platform::Dingtalk.default_origin(), "tok");
        assert_eq!(url, "https://oapi.dingtalk.com/robot/send?access_token=tok");
    }
}
