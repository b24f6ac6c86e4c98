//! Chat command handlers and dispatch.

mod forums;
mod help;
mod hot;
mod posts;
mod search;
mod stats;
mod thread;
mod threads;
mod user;

pub use forums::ForumsHandler;
pub use help::HelpHandler;
pub use hot::HotThreadsHandler;
pub use posts::PostsHandler;
pub use search::SearchHandler;
pub use stats::StatsHandler;
pub use thread::ThreadDetailHandler;
pub use threads::ThreadsHandler;
pub use user::UserHandler;

use crate::config::{readiness_error, BridgeConfig, ConfigHandle};
use crate::error::{AppError, AppResult};
use crate::format;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};
use xenforo_client::XenForoClient;

/// Everything a handler needs for one invocation: the configuration
/// snapshot taken at dispatch time and a forum client built from it.
pub struct CommandContext {
    pub config: BridgeConfig,
    pub forum: XenForoClient,
}

/// Command handler trait.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Command keyword (e.g. "论坛").
    fn keyword(&self) -> &'static str;

    /// Alternative keywords resolving to the same handler.
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// Whether the command needs trailing argument text.
    fn requires_argument(&self) -> bool {
        false
    }

    /// Usage hint shown when a required argument is missing.
    fn usage(&self) -> &'static str {
        ""
    }

    /// Execute the command.
    async fn execute(&self, ctx: &CommandContext, arg: &str) -> AppResult<String>;
}

/// Maps incoming group messages to command handlers.
///
/// Effectively stateless per invocation: each dispatch reloads the config
/// snapshot, resolves the command, and runs it to a plain-text reply.
/// No failure propagates past this boundary.
pub struct Dispatcher {
    config: Arc<ConfigHandle>,
    handlers: Vec<Box<dyn CommandHandler>>,
}

impl Dispatcher {
    /// Dispatcher with the full command set.
    pub fn new(config: Arc<ConfigHandle>) -> Self {
        Self::with_handlers(
            config,
            vec![
                Box::new(ThreadsHandler),
                Box::new(SearchHandler),
                Box::new(UserHandler),
                Box::new(ThreadDetailHandler),
                Box::new(PostsHandler),
                Box::new(HotThreadsHandler),
                Box::new(ForumsHandler),
                Box::new(StatsHandler),
                Box::new(HelpHandler),
            ],
        )
    }

    pub fn with_handlers(config: Arc<ConfigHandle>, handlers: Vec<Box<dyn CommandHandler>>) -> Self {
        Self { config, handlers }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Resolve a raw message to a handler and its argument text.
    ///
    /// Recognized forms: `<keyword> [arg]` and the namespaced `xf <keyword>
    /// [arg]`, each with a leading `/` (mandatory when `require_slash`).
    /// The argument is whatever remains after the keyword, trimmed; no
    /// separating space is required after a CJK keyword.
    fn match_command<'a>(
        &'a self,
        text: &str,
        require_slash: bool,
    ) -> Option<(&'a dyn CommandHandler, String)> {
        let mut text = text.trim();

        if let Some(rest) = text.strip_prefix('/') {
            text = rest.trim_start();
        } else if require_slash {
            return None;
        }

        // Namespaced group form: "xf 论坛" ≡ "论坛".
        if let Some(rest) = text.strip_prefix("xf") {
            if rest.starts_with(char::is_whitespace) {
                text = rest.trim_start();
            }
        }

        for handler in &self.handlers {
            let keywords = std::iter::once(handler.keyword()).chain(handler.aliases().iter().copied());
            for keyword in keywords {
                if let Some(rest) = text.strip_prefix(keyword) {
                    return Some((handler.as_ref(), rest.trim().to_string()));
                }
            }
        }

        None
    }

    /// Handle one group message. `None` means the message is not a command
    /// and no reply should be sent.
    pub async fn dispatch(&self, text: &str) -> Option<String> {
        let cfg = self.config.reload().await;

        let (handler, arg) = self.match_command(text, cfg.require_slash)?;
        debug!(command = handler.keyword(), arg = %arg, "Dispatching command");

        // Config gate before any network call.
        if let Some(msg) = readiness_error(&cfg, self.config.path()) {
            return Some(msg);
        }

        // Usage hint instead of an API call when the argument is missing.
        if handler.requires_argument() && arg.is_empty() {
            return Some(handler.usage().to_string());
        }

        let forum = match XenForoClient::new(
            &cfg.xf_url,
            &cfg.xf_api_key,
            Duration::from_secs(cfg.request_timeout),
        ) {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to build forum client: {}", e);
                return Some(format!("错误: {}", e));
            }
        };

        let ctx = CommandContext { config: cfg, forum };
        match handler.execute(&ctx, &arg).await {
            Ok(reply) => Some(reply),
            Err(AppError::Forum(e)) => {
                error!(command = handler.keyword(), "Forum API call failed: {}", e);
                Some(format::describe_error(&e))
            }
            Err(e) => {
                error!(command = handler.keyword(), "Command failed: {}", e);
                Some(format!("错误: {}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_handle(dir: &tempfile::TempDir, body: &str) -> Arc<ConfigHandle> {
        let path: PathBuf = dir.path().join("config.json");
        std::fs::write(&path, body).unwrap();
        Arc::new(ConfigHandle::load_or_create(&path).unwrap())
    }

    fn dispatcher_with(dir: &tempfile::TempDir, body: &str) -> Dispatcher {
        Dispatcher::new(test_handle(dir, body))
    }

    #[tokio::test]
    async fn test_match_slash_and_namespaced_forms() {
        let dir = tempfile::tempdir().unwrap();
        let d = dispatcher_with(&dir, "{}");

        let (h, arg) = d.match_command("/论坛", true).unwrap();
        assert_eq!(h.keyword(), "论坛");
        assert!(arg.is_empty());

        let (h, arg) = d.match_command("/xf 搜索 Python", true).unwrap();
        assert_eq!(h.keyword(), "搜索");
        assert_eq!(arg, "Python");

        // no separating space after a CJK keyword
        let (_, arg) = d.match_command("/搜索Python", true).unwrap();
        assert_eq!(arg, "Python");

        // slash required by default
        assert!(d.match_command("论坛", true).is_none());
        assert!(d.match_command("/随便聊聊", true).is_none());
    }

    #[tokio::test]
    async fn test_match_without_slash_when_not_required() {
        let dir = tempfile::tempdir().unwrap();
        let d = dispatcher_with(&dir, "{}");

        let (h, arg) = d.match_command("用户 张三", false).unwrap();
        assert_eq!(h.keyword(), "用户");
        assert_eq!(arg, "张三");

        let (h, _) = d.match_command("xf 统计", false).unwrap();
        assert_eq!(h.keyword(), "统计");
    }

    #[tokio::test]
    async fn test_non_command_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let d = dispatcher_with(&dir, "{}");
        assert!(d.dispatch("大家好").await.is_none());
        assert!(d.dispatch("/不是命令").await.is_none());
    }

    #[tokio::test]
    async fn test_config_gate_before_any_call() {
        let dir = tempfile::tempdir().unwrap();
        // xf_url set, xf_api_key missing
        let d = dispatcher_with(&dir, r#"{ "xf_url": "https://forum.example.com" }"#);

        let reply = d.dispatch("/论坛").await.unwrap();
        assert!(reply.contains("xf_api_key"));
        assert!(reply.contains("config.json"));
    }

    #[tokio::test]
    async fn test_usage_hint_without_http_call() {
        let mock_server = MockServer::start().await;

        let dir = tempfile::tempdir().unwrap();
        let d = dispatcher_with(
            &dir,
            &format!(
                r#"{{ "xf_url": "{}", "xf_api_key": "k" }}"#,
                mock_server.uri()
            ),
        );

        let reply = d.dispatch("/搜索").await.unwrap();
        assert!(reply.contains("搜索"));
        assert!(reply.contains("请输入"));

        let reply = d.dispatch("/用户").await.unwrap();
        assert!(reply.contains("用户名"));

        let reply = d.dispatch("/主题").await.unwrap();
        assert!(reply.contains("主题"));

        // none of the above reached the forum
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_threads_command_end_to_end() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/threads"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "threads": [ { "thread_id": 1, "title": "A", "username": "bob" } ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let d = dispatcher_with(
            &dir,
            &format!(
                r#"{{ "xf_url": "{}", "xf_api_key": "k" }}"#,
                mock_server.uri()
            ),
        );

        let reply = d.dispatch("/论坛").await.unwrap();
        assert!(reply.contains("• A"));
        assert!(reply.contains("作者: bob"));
        assert!(reply.contains("/threads/1/"));
    }

    #[tokio::test]
    async fn test_api_failure_renders_status_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/threads"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let d = dispatcher_with(
            &dir,
            &format!(
                r#"{{ "xf_url": "{}", "xf_api_key": "bad" }}"#,
                mock_server.uri()
            ),
        );

        let reply = d.dispatch("/论坛").await.unwrap();
        assert_eq!(reply, "API 认证失败，请检查 API Key");
    }

    #[tokio::test]
    async fn test_thread_detail_rejects_non_numeric_id() {
        let mock_server = MockServer::start().await;

        let dir = tempfile::tempdir().unwrap();
        let d = dispatcher_with(
            &dir,
            &format!(
                r#"{{ "xf_url": "{}", "xf_api_key": "k" }}"#,
                mock_server.uri()
            ),
        );

        let reply = d.dispatch("/主题 abc").await.unwrap();
        assert!(reply.contains("数字"));
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_hot_threads_fetches_double_and_sorts() {
        let mock_server = MockServer::start().await;

        let threads: Vec<_> = (1..=10)
            .map(|i| {
                serde_json::json!({
                    "thread_id": i,
                    "title": format!("T{}", i),
                    "reply_count": i
                })
            })
            .collect();

        Mock::given(method("GET"))
            .and(path("/api/threads"))
            .and(wiremock::matchers::query_param("order", "reply_count"))
            .and(wiremock::matchers::query_param("limit", "6"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "threads": threads })),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let d = dispatcher_with(
            &dir,
            &format!(
                r#"{{ "xf_url": "{}", "xf_api_key": "k", "threads_limit": 3 }}"#,
                mock_server.uri()
            ),
        );

        let reply = d.dispatch("/热门").await.unwrap();
        // top three by reply count, descending
        assert!(reply.contains("• T10"));
        assert!(reply.contains("• T9"));
        assert!(reply.contains("• T8"));
        assert!(!reply.contains("• T7"));
    }

    #[tokio::test]
    async fn test_readiness_gate_applies_to_every_command() {
        let dir = tempfile::tempdir().unwrap();
        let d = dispatcher_with(&dir, "{}");

        let reply = d.dispatch("/帮助").await.unwrap();
        assert!(reply.contains("xf_url"));
    }
}
