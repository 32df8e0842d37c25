//! Compiled classification rules.
//!
//! [`Rules::compile`] validates a [`ResolvedConfig`] and compiles every template
//! once. The result is immutable and shared with the ingestion thread.

use super::loader::{ConfigError, GroupSection, ResolvedConfig, TagSection};
use crate::template::Template;

/// A tag rule: key template plus optional value template.
#[derive(Debug, Clone)]
pub struct TagRule {
    /// Renders the tag name.
    pub key: Template,
    /// Renders the tag value; `None` for name-only tags.
    pub value: Option<Template>,
}

/// A group rule: the first one whose value and title both render non-empty wins.
#[derive(Debug, Clone)]
pub struct GroupRule {
    /// Description shown for groups created by this rule.
    pub name: String,
    /// Group key rule.
    pub value: Template,
    /// Group title rule.
    pub title: Template,
    /// Tags added after the global ones.
    pub tags: Vec<TagRule>,
}

/// A status rule.
#[derive(Debug, Clone)]
pub struct StatusRule {
    /// Status text rule.
    pub display: Template,
}

/// Everything the classifier needs, compiled.
#[derive(Debug, Clone)]
pub struct Rules {
    /// Level rule.
    pub level: Template,
    /// Timestamp rule.
    pub timestamp: Template,
    /// Message rule.
    pub message: Template,
    /// Group rules in declaration order.
    pub groups: Vec<GroupRule>,
    /// Status rules in declaration order.
    pub statuses: Vec<StatusRule>,
    /// Global tag rules.
    pub tags: Vec<TagRule>,
}

impl Rules {
    /// Validate and compile.
    ///
    /// # Errors
    ///
    /// Fails on the first blank required field or invalid template, naming
    /// the offending entry.
    pub fn compile(config: &ResolvedConfig) -> Result<Self, ConfigError> {
        let level = required("level_field", &config.level_field)?;
        let message = required("message_field", &config.message_field)?;
        let timestamp = required("timestamp_field", &config.timestamp_field)?;

        let groups = config
            .groups
            .iter()
            .enumerate()
            .map(|(i, group)| compile_group(group).map_err(|e| e.in_entry("groups", i)))
            .collect::<Result<Vec<_>, _>>()?;

        let statuses = config
            .statuses
            .iter()
            .enumerate()
            .map(|(i, status)| {
                required("display", &status.display)
                    .map(|display| StatusRule { display })
                    .map_err(|e| e.in_entry("statuses", i))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let tags = compile_tags(&config.tags, "tags")?;

        Ok(Self {
            level,
            timestamp,
            message,
            groups,
            statuses,
            tags,
        })
    }
}

fn compile_group(group: &GroupSection) -> Result<GroupRule, ConfigError> {
    if group.name.trim().is_empty() {
        return Err(ConfigError::Blank { field: "name" });
    }

    Ok(GroupRule {
        name: group.name.clone(),
        value: required("value_field", &group.value_field)?,
        title: required("title_field", &group.title_field)?,
        tags: compile_tags(&group.tags, "tags")?,
    })
}

fn compile_tags(tags: &[TagSection], section: &'static str) -> Result<Vec<TagRule>, ConfigError> {
    tags.iter()
        .enumerate()
        .map(|(i, tag)| compile_tag(tag).map_err(|e| e.in_entry(section, i)))
        .collect()
}

fn compile_tag(tag: &TagSection) -> Result<TagRule, ConfigError> {
    let key = required("name", &tag.name)?;
    let value = match tag.source.as_deref() {
        Some(source) if !source.trim().is_empty() => Some(compile("source", source)?),
        _ => None,
    };
    Ok(TagRule { key, value })
}

fn required(field: &'static str, source: &str) -> Result<Template, ConfigError> {
    if source.trim().is_empty() {
        return Err(ConfigError::Blank { field });
    }
    compile(field, source)
}

fn compile(field: &'static str, source: &str) -> Result<Template, ConfigError> {
    Template::compile(source).map_err(|source| ConfigError::Template { field, source })
}
