//! 热门 - hot threads ordered by reply count.

use crate::commands::{CommandContext, CommandHandler};
use crate::error::AppResult;
use crate::format;
use async_trait::async_trait;

pub struct HotThreadsHandler;

#[async_trait]
impl CommandHandler for HotThreadsHandler {
    fn keyword(&self) -> &'static str {
        "热门"
    }

    async fn execute(&self, ctx: &CommandContext, _arg: &str) -> AppResult<String> {
        // Over-fetch: the API's own ordering is unreliable, the formatter
        // re-sorts the batch and keeps the top N.
        let payload = ctx.forum.hot_threads(ctx.config.threads_limit * 2).await?;
        Ok(format::format_hot_threads(
            ctx.forum.base_url(),
            &payload,
            ctx.config.threads_limit,
        ))
    }
}
