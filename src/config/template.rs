//! Named-placeholder substitution for template values stored in the config.
//!
//! Templates use `{name}` placeholders; `{{` and `}}` produce literal braces.
//! Keys in the data mapping that the template never references are ignored.

use std::collections::HashMap;

use super::error::TemplateError;

pub fn render(template: &str, data: &HashMap<&str, String>) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                out.push('{');
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(TemplateError::UnmatchedBrace { position: pos }),
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for (_, next) in chars.by_ref() {
                    if next == '}' {
                        closed = true;
                        break;
                    }
                    if next == '{' {
                        break;
                    }
                    name.push(next);
                }
                if !closed {
                    return Err(TemplateError::UnmatchedBrace { position: pos });
                }
                out.push_str(lookup(&name, data)?);
            }
            other => out.push(other),
        }
    }

    Ok(out)
}

fn lookup<'a>(name: &str, data: &'a HashMap<&str, String>) -> Result<&'a str, TemplateError> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed.chars().all(|c| c.is_ascii_digit())
        || trimmed.contains([':', '!', '.', '['])
    {
        return Err(TemplateError::Unsupported(format!("{{{name}}}")));
    }

    data.get(trimmed)
        .map(String::as_str)
        .ok_or_else(|| TemplateError::MissingKey(trimmed.to_string()))
}
