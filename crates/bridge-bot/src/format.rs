//! Formatting of forum API payloads into chat replies.
//!
//! Everything here is a pure function over `serde_json::Value`. The forum
//! payloads are never deserialized into local structs; display fields are
//! read through the accessors below so the fallback policy lives in one
//! place.

use chrono::{Local, TimeZone};
use serde_json::Value;
use xenforo_client::{SearchStep, XfError};

/// String field with a named fallback.
pub fn str_field<'a>(v: &'a Value, key: &str, default: &'a str) -> &'a str {
    v.get(key).and_then(Value::as_str).unwrap_or(default)
}

/// Numeric field, absent or non-numeric counts as 0.
pub fn u64_field(v: &Value, key: &str) -> u64 {
    v.get(key).and_then(Value::as_u64).unwrap_or(0)
}

/// Unix-epoch field rendered as a local date-time.
///
/// Absent fields render as 未知; unparseable values fall back to their raw
/// representation.
pub fn timestamp_field(v: &Value, key: &str) -> String {
    match v.get(key) {
        None | Some(Value::Null) => "未知".into(),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|secs| Local.timestamp_opt(secs, 0).single())
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| n.to_string()),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Join a relative URL onto the base; absolute URLs pass through unchanged.
pub fn absolute_url(base: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("{}/{}", base, url.trim_start_matches('/'))
    }
}

/// Canonical link for a thread entry: the API's own URL when present,
/// otherwise built from the thread id.
fn thread_link(base: &str, t: &Value) -> String {
    if let Some(url) = t.get("view_url").and_then(Value::as_str) {
        absolute_url(base, url)
    } else {
        format!("{}/threads/{}/", base, u64_field(t, "thread_id"))
    }
}

fn entries<'a>(payload: &'a Value, key: &str) -> &'a [Value] {
    payload
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// 📌 Latest threads, in the order the API returned them.
pub fn format_threads(base: &str, payload: &Value, limit: u32) -> String {
    let threads = entries(payload, "threads");
    if threads.is_empty() {
        return "暂无主题".into();
    }

    let mut msg = String::from("📌 最新主题：\n\n");
    for t in threads.iter().take(limit as usize) {
        msg.push_str(&format!("• {}\n", str_field(t, "title", "无标题")));
        msg.push_str(&format!("  作者: {}\n", str_field(t, "username", "未知")));
        msg.push_str(&format!("  链接: {}\n\n", thread_link(base, t)));
    }
    msg
}

/// 🔥 Hot threads.
///
/// The API's reply-count ordering is unreliable, so the fetched batch is
/// re-sorted by descending reply count here before truncation.
pub fn format_hot_threads(base: &str, payload: &Value, limit: u32) -> String {
    let mut threads: Vec<&Value> = entries(payload, "threads").iter().collect();
    if threads.is_empty() {
        return "暂无主题".into();
    }
    threads.sort_by(|a, b| u64_field(b, "reply_count").cmp(&u64_field(a, "reply_count")));

    let mut msg = String::from("🔥 热门主题：\n\n");
    for t in threads.iter().take(limit as usize) {
        msg.push_str(&format!("• {}\n", str_field(t, "title", "无标题")));
        msg.push_str(&format!("  回复: {}\n", u64_field(t, "reply_count")));
        msg.push_str(&format!("  链接: {}\n\n", thread_link(base, t)));
    }
    msg
}

/// 🔍 Search results (page 1 of the two-step search).
pub fn format_search_results(base: &str, keyword: &str, payload: &Value, limit: u32) -> String {
    let results = entries(payload, "results");
    if results.is_empty() {
        return format!("未找到包含 '{}' 的主题", keyword);
    }

    let mut msg = format!("🔍 搜索结果：{}\n\n", keyword);
    for r in results.iter().take(limit as usize) {
        msg.push_str(&format!("• {}\n", str_field(r, "title", "无标题")));
        msg.push_str(&format!("  链接: {}\n\n", thread_link(base, r)));
    }
    msg
}

/// 👤 User card. `username` is the name that was searched for, used in the
/// not-found reply.
pub fn format_user(payload: &Value, username: &str) -> String {
    // find-name returns {"exact": user|null, "similar": [...]}; the older
    // endpoint shape was {"user": ...}.
    let user = payload
        .get("exact")
        .filter(|u| u.is_object())
        .or_else(|| payload.get("user").filter(|u| u.is_object()));

    let Some(user) = user else {
        return format!("未找到用户: {}", username);
    };

    let mut msg = String::from("👤 用户信息：\n");
    msg.push_str(&format!("用户名: {}\n", str_field(user, "username", "未知")));
    msg.push_str(&format!("注册时间: {}\n", timestamp_field(user, "register_date")));
    msg.push_str(&format!("帖子数: {}\n", u64_field(user, "message_count")));
    msg.push_str(&format!("反应分: {}\n", u64_field(user, "reaction_score")));
    msg
}

/// Thread detail card.
pub fn format_thread_detail(base: &str, payload: &Value) -> String {
    let thread = payload.get("thread").unwrap_or(payload);

    let mut msg = String::from("📄 主题详情：\n");
    msg.push_str(&format!("标题: {}\n", str_field(thread, "title", "无标题")));
    msg.push_str(&format!("作者: {}\n", str_field(thread, "username", "未知")));
    msg.push_str(&format!("回复: {}\n", u64_field(thread, "reply_count")));
    msg.push_str(&format!("浏览: {}\n", u64_field(thread, "view_count")));
    msg.push_str(&format!("发布时间: {}\n", timestamp_field(thread, "post_date")));
    msg.push_str(&format!("链接: {}\n", thread_link(base, thread)));
    msg
}

/// 💬 Latest posts with a short body snippet.
pub fn format_posts(base: &str, payload: &Value, limit: u32) -> String {
    let posts = entries(payload, "posts");
    if posts.is_empty() {
        return "暂无回复".into();
    }

    let mut msg = String::from("💬 最新回复：\n\n");
    for p in posts.iter().take(limit as usize) {
        let body = str_field(p, "message", "").replace('\n', " ");
        let snippet: String = body.chars().take(60).collect();
        msg.push_str(&format!("• {}: {}\n", str_field(p, "username", "未知"), snippet));
        msg.push_str(&format!(
            "  链接: {}/threads/{}/\n\n",
            base,
            u64_field(p, "thread_id")
        ));
    }
    msg
}

/// 📂 Forum (board) listing.
pub fn format_forums(payload: &Value) -> String {
    let forums = entries(payload, "forums");
    if forums.is_empty() {
        return "暂无板块".into();
    }

    let mut msg = String::from("📂 板块列表：\n\n");
    for f in forums {
        msg.push_str(&format!("• {}\n", str_field(f, "title", "未命名")));
        msg.push_str(&format!(
            "  主题: {} / 消息: {}\n\n",
            u64_field(f, "discussion_count"),
            u64_field(f, "message_count")
        ));
    }
    msg
}

/// 📊 Board statistics from the index endpoint.
pub fn format_stats(payload: &Value) -> String {
    let totals = payload.get("totals").unwrap_or(payload);

    let mut msg = String::from("📊 论坛统计：\n");
    msg.push_str(&format!("主题数: {}\n", u64_field(totals, "threads")));
    msg.push_str(&format!("消息数: {}\n", u64_field(totals, "messages")));
    msg.push_str(&format!("用户数: {}\n", u64_field(totals, "users")));
    msg.push_str(&format!(
        "最新用户: {}\n",
        str_field(totals, "latest_user", "未知")
    ));
    msg
}

/// Fixed status→message table for forum API failures.
pub fn describe_error(e: &XfError) -> String {
    match e {
        XfError::Unauthorized => "API 认证失败，请检查 API Key".into(),
        XfError::NotFound => "接口不存在".into(),
        XfError::RateLimit => "请求过于频繁，请稍后再试".into(),
        XfError::Api { status, .. } => format!("API 错误: {}", status),
        XfError::Search { step, source } => {
            let step = match step {
                SearchStep::Create => "创建搜索",
                SearchStep::Fetch => "获取结果",
            };
            format!("搜索失败（{}）：{}", step, describe_error(source))
        }
        other => format!("错误: {}", other),
    }
}
