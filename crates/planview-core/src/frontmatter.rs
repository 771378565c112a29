use crate::error::Result;
use serde::Serialize;
use serde_yaml::Mapping;

/// Split a markdown document into its YAML frontmatter and the body after
/// the closing fence.
///
/// Returns `None` when the document does not open with a `---` line or the
/// closing fence is missing. The returned header excludes both fence lines;
/// the body starts on the line after the closing fence and is untouched.
pub fn split(content: &str) -> Option<(&str, &str)> {
    let rest = content.strip_prefix("---")?;
    let rest = rest
        .strip_prefix('\n')
        .or_else(|| rest.strip_prefix("\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let header = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((header, body));
        }
        offset += line.len();
    }
    None
}

/// Best-effort variant of [`split`]: a missing fence yields an empty mapping
/// with the whole document as body, and malformed YAML degrades to an empty
/// mapping rather than an error.
pub fn mapping(content: &str) -> (Mapping, &str) {
    match split(content) {
        Some((header, body)) => (serde_yaml::from_str(header).unwrap_or_default(), body),
        None => (Mapping::new(), content),
    }
}

/// Render a document as a `---`-fenced YAML header followed by `body`
/// verbatim.
pub fn render<T: Serialize>(fields: &T, body: &str) -> Result<String> {
    let yaml = serde_yaml::to_string(fields)?;
    Ok(format!("---\n{yaml}---\n{body}"))
}
