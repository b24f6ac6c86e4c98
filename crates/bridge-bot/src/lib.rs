//! XenForo ⇄ QQ group bridge bot.
//!
//! Chinese chat commands are translated into XenForo REST calls and the
//! responses rendered as text; forum notifications arrive over a
//! shared-secret webhook and are relayed into the group.

pub mod commands;
pub mod config;
pub mod error;
pub mod format;
pub mod server;
