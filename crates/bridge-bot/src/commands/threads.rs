//! 论坛 - latest threads.

use crate::commands::{CommandContext, CommandHandler};
use crate::error::AppResult;
use crate::format;
use async_trait::async_trait;

pub struct ThreadsHandler;

#[async_trait]
impl CommandHandler for ThreadsHandler {
    fn keyword(&self) -> &'static str {
        "论坛"
    }

    async fn execute(&self, ctx: &CommandContext, _arg: &str) -> AppResult<String> {
        let payload = ctx.forum.latest_threads(ctx.config.threads_limit).await?;
        Ok(format::format_threads(
            ctx.forum.base_url(),
            &payload,
            ctx.config.threads_limit,
        ))
    }
}
