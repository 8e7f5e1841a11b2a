//! Text and JSON rendering of command results

use serde::Serialize;
use serde_json::Value;

use crate::services::ActionResult;

/// Result of a command, renderable as text or JSON
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    value: Value,
    text: String,
}

impl Report {
    /// Report for any serializable payload
    pub fn data<T: Serialize>(data: &T) -> Result<Self, serde_json::Error> {
        let value = serde_json::to_value(data)?;
        let text = render_value(&value, 0);
        Ok(Self { value, text })
    }

    /// Report carrying a single message
    pub fn message(message: impl Into<String>) -> Self {
        let text = message.into();
        Self {
            value: serde_json::json!({ "message": text }),
            text,
        }
    }

    /// Report for a state change, summarized on one line
    pub fn action(result: &ActionResult) -> Result<Self, serde_json::Error> {
        let mut text = format!(
            "{}: {} {} -> {}",
            result.message, result.numero_serie, result.ancien_etat, result.nouvel_etat
        );
        if let Some(affectation) = &result.nouvelle_affectation {
            text.push_str(&format!(" ({})", affectation));
        }
        Ok(Self {
            value: serde_json::to_value(result)?,
            text,
        })
    }

    /// The JSON payload
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Renders the report for the terminal
    pub fn render(&self, json: bool) -> String {
        if json {
            serde_json::to_string_pretty(&self.value).unwrap_or_else(|_| self.value.to_string())
        } else {
            self.text.clone()
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("yes".to_string()),
        Value::Bool(false) => Some("no".to_string()),
        _ => None,
    }
}

/// Renders a JSON value as indented `key: value` lines; nulls are skipped
fn render_value(value: &Value, depth: usize) -> String {
    let indent = "  ".repeat(depth);
    let mut lines = Vec::new();

    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, field) in map {
                match field {
                    Value::Null => {}
                    Value::Object(_) | Value::Array(_) => {
                        lines.push(format!("{}{}:", indent, key));
                        lines.push(render_value(field, depth + 1));
                    }
                    scalar => {
                        if let Some(text) = scalar_text(scalar) {
                            lines.push(format!("{}{}: {}", indent, key, text));
                        }
                    }
                }
            }
        }
        Value::Array(items) if items.is_empty() => lines.push(format!("{}(none)", indent)),
        Value::Array(items) => {
            for item in items {
                match scalar_text(item) {
                    Some(text) => lines.push(format!("{}- {}", indent, text)),
                    None => {
                        let nested = render_value(item, depth + 1);
                        let inner = format!("{}  ", indent);
                        let bullet = format!("{}- ", indent);
                        lines.push(nested.replacen(&inner, &bullet, 1));
                    }
                }
            }
        }
        scalar => {
            if let Some(text) = scalar_text(scalar) {
                lines.push(format!("{}{}", indent, text));
            }
        }
    }

    lines.retain(|line| !line.is_empty());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_object_skips_nulls() {
        let text = render_value(&json!({"etat": "pose", "modele": null, "total": 3}), 0);
        assert_eq!(text, "etat: pose\ntotal: 3");
    }

    #[test]
    fn test_render_list_of_objects_uses_bullets() {
        let text = render_value(
            &json!([{"code_poste": "P-01", "nb": 2}, {"code_poste": "P-02", "nb": 0}]),
            0,
        );
        assert_eq!(text, "- code_poste: P-01\n  nb: 2\n- code_poste: P-02\n  nb: 0");
    }

    #[test]
    fn test_render_empty_list() {
        assert_eq!(render_value(&json!([]), 0), "(none)");
    }

    #[test]
    fn test_render_nested_object() {
        let text = render_value(&json!({"nom_bo": "Nord", "stats": {"poses": 5}}), 0);
        assert_eq!(text, "nom_bo: Nord\nstats:\n  poses: 5");
    }

    #[test]
    fn test_action_report_is_one_line() {
        let result = ActionResult {
            message: "Concentrateur posé".to_string(),
            numero_serie: "C-001".to_string(),
            ancien_etat: "en_stock".to_string(),
            nouvel_etat: "pose".to_string(),
            date_pose: None,
            ancienne_affectation: None,
            nouvelle_affectation: None,
        };
        let report = Report::action(&result).unwrap();

        assert_eq!(report.render(false), "Concentrateur posé: C-001 en_stock -> pose");
        assert!(report.render(true).contains("\"numero_serie\": \"C-001\""));
    }

    #[test]
    fn test_message_report_json() {
        let report = Report::message("Logged out");
        assert_eq!(report.value()["message"], "Logged out");
    }
}
