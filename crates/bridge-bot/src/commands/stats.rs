//! 统计 - board statistics.

use crate::commands::{CommandContext, CommandHandler};
use crate::error::AppResult;
use crate::format;
use async_trait::async_trait;

pub struct StatsHandler;

#[async_trait]
impl CommandHandler for StatsHandler {
    fn keyword(&self) -> &'static str {
        "统计"
    }

    async fn execute(&self, ctx: &CommandContext, _arg: &str) -> AppResult<String> {
        let payload = ctx.forum.index().await?;
        Ok(format::format_stats(&payload))
    }
}
