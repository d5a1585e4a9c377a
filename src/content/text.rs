//! 文章正文的派生计算：slug、阅读时长、摘要与首图。
//!
//! 这里的函数都是纯函数，不做唯一性检查，唯一性由存储层在插入时保证。

use std::{borrow::Cow, sync::LazyLock};

use regex::Regex;

/// 每分钟阅读的单词数
const WORDS_PER_MINUTE: f64 = 225.0;

/// 默认摘要长度（字符数）
pub const SUMMARY_LENGTH: usize = 160;

/// 截断摘要时追加的省略标记，只占一个字符
pub const ELLIPSIS: char = '…';

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("invalid html tag pattern"));

static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img[^>]+src=["']([^"']+)["'][^>]*>"#).expect("invalid img pattern")
});

static URL_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*:").expect("invalid url scheme pattern")
});

/// 根据标题生成 slug。
///
/// 小写、去除首尾空白，丢弃单词字符、空白和 `-` 以外的所有字符，
/// 连续的空白或下划线折叠为一个 `-`，最后去掉首尾的 `-`。
///
/// ```
/// assert_eq!(qblog::content::derive_slug("  Hello, World_Again! "), "hello-world-again");
/// ```
pub fn derive_slug(title: &str) -> String {
    let lowered = title.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut gap = false;

    for c in lowered.trim().chars() {
        if c.is_whitespace() || c == '_' {
            gap = true;
        } else if c.is_ascii_alphanumeric() || c == '-' {
            if gap {
                slug.push('-');
                gap = false;
            }
            slug.push(c);
        }
    }

    slug.trim_matches('-').to_string()
}

/// 去掉所有 HTML 标签
pub fn strip_tags(content: &str) -> Cow<'_, str> {
    HTML_TAG.replace_all(content, "")
}

/// 去掉标签后按空白切分的词数
pub fn word_count(content: &str) -> usize {
    strip_tags(content).split_whitespace().count()
}

/// 估算阅读时长（分钟），最少 1 分钟
pub fn reading_time(content: &str) -> u32 {
    let minutes = (word_count(content) as f64 / WORDS_PER_MINUTE).round() as u32;
    minutes.max(1)
}

/// 生成纯文本摘要。
///
/// 去掉标签后不超过 `max_len` 个字符时原样返回；否则截取前 `max_len` 个字符，
/// 丢弃最后一个（可能被截断的）单词，再追加 [`ELLIPSIS`]。
pub fn summarize(content: &str, max_len: usize) -> String {
    let text = strip_tags(content);
    if text.chars().count() <= max_len {
        return text.into_owned();
    }

    let head: String = text.chars().take(max_len).collect();
    let kept = head.rfind(' ').map(|i| &head[..i]).unwrap_or_default();

    format!("{kept}{ELLIPSIS}")
}

/// 提取正文中第一张图片的地址。
///
/// - 带协议的绝对地址原样返回
/// - 以 `/` 开头的直接拼接在 `base_url` 后
/// - 其余相对地址以 `/` 连接
pub fn first_image(content: &str, base_url: &str) -> Option<String> {
    let src = IMG_SRC.captures(content)?.get(1)?.as_str();

    let url = if URL_SCHEME.is_match(src) {
        src.to_string()
    } else if src.starts_with('/') {
        format!("{base_url}{src}")
    } else {
        format!("{base_url}/{src}")
    };

    Some(url)
}
