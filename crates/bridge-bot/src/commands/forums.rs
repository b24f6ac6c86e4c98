//! 板块 - forum (board) listing.

use crate::commands::{CommandContext, CommandHandler};
use crate::error::AppResult;
use crate::format;
use async_trait::async_trait;

pub struct ForumsHandler;

#[async_trait]
impl CommandHandler for ForumsHandler {
    fn keyword(&self) -> &'static str {
        "板块"
    }

    async fn execute(&self, ctx: &CommandContext, _arg: &str) -> AppResult<String> {
        let payload = ctx.forum.forums().await?;
        Ok(format::format_forums(&payload))
    }
}
