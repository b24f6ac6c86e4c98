//! 用户 - user lookup by name.

use crate::commands::{CommandContext, CommandHandler};
use crate::error::AppResult;
use crate::format;
use async_trait::async_trait;

pub struct UserHandler;

#[async_trait]
impl CommandHandler for UserHandler {
    fn keyword(&self) -> &'static str {
        "用户"
    }

    fn requires_argument(&self) -> bool {
        true
    }

    fn usage(&self) -> &'static str {
        "请输入用户名，例如：用户 张三"
    }

    async fn execute(&self, ctx: &CommandContext, arg: &str) -> AppResult<String> {
        let payload = ctx.forum.find_user(arg).await?;
        Ok(format::format_user(&payload, arg))
    }
}
