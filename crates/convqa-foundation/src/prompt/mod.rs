//! Prompt 管理模块
//! Prompt module
//!
//! - **模板定义**: 支持命名占位符的 Prompt 模板
//! - **预置模板**: 独立问题改写与三种文档合并策略的 Prompt

mod presets;
mod template;

pub use presets::*;
pub use template::*;
