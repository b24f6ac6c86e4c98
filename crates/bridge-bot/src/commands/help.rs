//! 帮助 - command overview.

use crate::commands::{CommandContext, CommandHandler};
use crate::error::AppResult;
use async_trait::async_trait;

pub struct HelpHandler;

#[async_trait]
impl CommandHandler for HelpHandler {
    fn keyword(&self) -> &'static str {
        "帮助"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["help"]
    }

    async fn execute(&self, _ctx: &CommandContext, _arg: &str) -> AppResult<String> {
        Ok(r#"📖 论坛机器人命令：

/论坛 - 查看最新主题
/搜索 <关键词> - 搜索主题
/用户 <用户名> - 查看用户信息
/主题 <ID> - 查看主题详情
/回复 - 查看最新回复
/热门 - 查看热门主题
/板块 - 查看板块列表
/统计 - 查看论坛统计
/帮助 - 显示本信息

每个命令也可以使用 /xf 前缀，例如：/xf 论坛"#
            .into())
    }
}
