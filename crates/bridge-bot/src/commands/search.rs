//! 搜索 - full-text search via the two-step search protocol.

use crate::commands::{CommandContext, CommandHandler};
use crate::error::AppResult;
use crate::format;
use async_trait::async_trait;

pub struct SearchHandler;

#[async_trait]
impl CommandHandler for SearchHandler {
    fn keyword(&self) -> &'static str {
        "搜索"
    }

    fn requires_argument(&self) -> bool {
        true
    }

    fn usage(&self) -> &'static str {
        "请输入搜索关键词，例如：搜索 Python"
    }

    async fn execute(&self, ctx: &CommandContext, arg: &str) -> AppResult<String> {
        let payload = ctx.forum.search(arg).await?;
        Ok(format::format_search_results(
            ctx.forum.base_url(),
            arg,
            &payload,
            ctx.config.search_limit,
        ))
    }
}
