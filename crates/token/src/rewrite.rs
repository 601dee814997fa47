//! URL 重写协作接口

use crate::session::Session;

/// 在不支持 Cookie 的场景下将会话 ID 写入 URL
pub trait UrlRewriter: Send + Sync {
    fn encode(&self, url: &str, session: &dyn Session) -> String;
}
