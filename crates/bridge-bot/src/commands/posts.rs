//! 回复 - latest posts across the board.

use crate::commands::{CommandContext, CommandHandler};
use crate::error::AppResult;
use crate::format;
use async_trait::async_trait;

pub struct PostsHandler;

#[async_trait]
impl CommandHandler for PostsHandler {
    fn keyword(&self) -> &'static str {
        "回复"
    }

    async fn execute(&self, ctx: &CommandContext, _arg: &str) -> AppResult<String> {
        let payload = ctx.forum.latest_posts(ctx.config.threads_limit).await?;
        Ok(format::format_posts(
            ctx.forum.base_url(),
            &payload,
            ctx.config.threads_limit,
        ))
    }
}
