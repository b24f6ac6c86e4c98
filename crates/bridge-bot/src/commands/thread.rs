//! 主题 - thread detail by ID.

use crate::commands::{CommandContext, CommandHandler};
use crate::error::AppResult;
use crate::format;
use async_trait::async_trait;

pub struct ThreadDetailHandler;

#[async_trait]
impl CommandHandler for ThreadDetailHandler {
    fn keyword(&self) -> &'static str {
        "主题"
    }

    fn requires_argument(&self) -> bool {
        true
    }

    fn usage(&self) -> &'static str {
        "请输入主题 ID，例如：主题 42"
    }

    async fn execute(&self, ctx: &CommandContext, arg: &str) -> AppResult<String> {
        let Ok(id) = arg.parse::<u64>() else {
            return Ok("主题 ID 必须是数字，例如：主题 42".into());
        };

        let payload = ctx.forum.thread(id).await?;
        Ok(format::format_thread_detail(ctx.forum.base_url(), &payload))
    }
}
