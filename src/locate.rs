//! Finding the scene record in a line-delimited JSON container.

use serde_json::{Map, Value};

use crate::config::ScenePredicate;
use crate::errors::ConvertError;
use crate::scene::Scene;

/// A scene record found by [`locate`]
#[derive(Debug, Clone, PartialEq)]
pub struct Located {
    /// 1-based line number in the container
    pub line: usize,
    pub record: Map<String, Value>,
}

impl ScenePredicate {
    /// Whether a decoded record qualifies as a scene.
    pub fn accepts(self, record: &Map<String, Value>) -> bool {
        if !record.contains_key("walls") {
            return false;
        }
        match self {
            ScenePredicate::HasWalls => true,
            ScenePredicate::Strict => {
                record.contains_key("width")
                    && record.contains_key("height")
                    && has_nested_key(record, "grid", "size")
                    && has_nested_key(record, "background", "src")
            }
        }
    }
}

fn has_nested_key(record: &Map<String, Value>, outer: &str, inner: &str) -> bool {
    record
        .get(outer)
        .and_then(Value::as_object)
        .is_some_and(|o| o.contains_key(inner))
}

/// Return the first line that decodes to a JSON object accepted by
/// `predicate`. Blank lines and lines that are not valid JSON are skipped.
pub fn locate<'a, I>(lines: I, predicate: ScenePredicate) -> Option<Located>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .find_map(|(i, line)| match serde_json::from_str::<Value>(line.trim()) {
            Ok(Value::Object(record)) if predicate.accepts(&record) => Some(Located {
                line: i + 1,
                record,
            }),
            _ => None,
        })
}

/// Locate and decode the scene in a whole container.
pub fn find_scene(text: &str, predicate: ScenePredicate) -> Result<(usize, Scene), ConvertError> {
    let located = locate(text.lines(), predicate).ok_or_else(|| ConvertError::NoSceneFound {
        hint: format!("expected at least one line holding {predicate}"),
    })?;
    crate::log::info!(line = located.line, "found scene record");
    let scene = Scene::from_value(Value::Object(located.record))?;
    Ok((located.line, scene))
}
