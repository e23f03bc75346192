//! Prompt 模板引擎
//! Prompt template engine
//!
//! 命名占位符 `{name}` 的单遍替换；`{{` 与 `}}` 输出字面量花括号
//! Single-pass substitution of named `{name}` placeholders; `{{` and `}}`
//! produce literal braces

use convqa_kernel::ChainError;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;
use thiserror::Error;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{|\}\}|\{(\w+)\}").expect("placeholder pattern is valid")
});

/// Prompt 模板错误
/// Prompt template errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromptError {
    /// 变量未提供
    /// Variable not provided
    #[error("Required variable not provided: {0}")]
    MissingVariable(String),
}

/// Prompt 结果类型
/// Prompt result type
pub type PromptResult<T> = Result<T, PromptError>;

impl From<PromptError> for ChainError {
    fn from(err: PromptError) -> Self {
        ChainError::Prompt(err.to_string())
    }
}

/// 转义字面量文本中的花括号，使其可以安全地拼接进模板
/// Escape braces in literal text so it can be spliced into a template
pub fn escape_braces(text: &str) -> String {
    text.replace('{', "{{").replace('}', "}}")
}

/// Prompt 模板
/// Prompt template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    /// 模板 ID
    /// Template ID
    pub id: String,
    /// 模板内容
    /// Template content
    pub content: String,
}

impl PromptTemplate {
    /// 创建新模板
    /// Create new template
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }

    /// 获取模板中所有变量名（排序去重）
    /// Get all variable names in the template (sorted, deduplicated)
    pub fn input_variables(&self) -> Vec<String> {
        PLACEHOLDER
            .captures_iter(&self.content)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// 渲染模板
    /// Render template
    ///
    /// 变量值按原样插入，不会被再次解析，因此检索到的文档中出现的 `{...}`
    /// 不会被当作占位符。
    /// Values are inserted verbatim and never rescanned, so `{...}` inside a
    /// retrieved document is not mistaken for a placeholder.
    ///
    /// ```rust,ignore
    /// let template = PromptTemplate::new("greeting", "Hello, {name}!");
    /// assert_eq!(template.render(&[("name", "Alice")])?, "Hello, Alice!");
    /// ```
    pub fn render(&self, vars: &[(&str, &str)]) -> PromptResult<String> {
        let var_map: HashMap<&str, &str> = vars.iter().copied().collect();
        let mut missing = BTreeSet::new();

        let rendered = PLACEHOLDER.replace_all(&self.content, |cap: &regex::Captures| {
            match cap.get(1) {
                Some(name) => match var_map.get(name.as_str()) {
                    Some(value) => (*value).to_string(),
                    None => {
                        missing.insert(name.as_str().to_string());
                        cap[0].to_string()
                    }
                },
                None if &cap[0] == "{{" => "{".to_string(),
                None => "}".to_string(),
            }
        });

        if !missing.is_empty() {
            return Err(PromptError::MissingVariable(
                missing.into_iter().collect::<Vec<_>>().join(", "),
            ));
        }

        Ok(rendered.into_owned())
    }
}
