//! # EstablishConnection Response
//!
//! CampMinder answers with a small XML document:
//!
//! ```text
//! <responseObject version="1">
//!   <status>False</status>
//!   <details>Unknown</details>
//! </responseObject>
//! ```
//!
//! Some partner environments use `Success` / `Reason` for the same two
//! elements; both spellings are accepted. The first occurrence of each
//! element wins.

use quick_xml::events::Event;
use quick_xml::Reader;

/// Outcome of one EstablishConnection round trip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionResult {
    /// `status` was `True`
    Success,
    /// `status` was `False`; `reason` is the `details` text (may be empty)
    Failure { reason: String },
    /// The body was not a recognizable reply
    Malformed { detail: String },
}

impl ConnectionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Remote failure reason, if the partner reported one.
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Failure { reason } => Some(reason),
            _ => None,
        }
    }

    /// Short label for logs and metric labels.
    pub fn outcome_label(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure { .. } => "failure",
            Self::Malformed { .. } => "malformed",
        }
    }
}

const STATUS_TRUE: &str = "True";
const STATUS_FALSE: &str = "False";

#[derive(Clone, Copy)]
enum Field {
    Status,
    Details,
}

#[derive(Default)]
struct ResponseFields {
    status: Option<String>,
    details: Option<String>,
}

impl ResponseFields {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Status => &mut self.status,
            Field::Details => &mut self.details,
        }
    }
}

fn field_for(local_name: &[u8]) -> Option<Field> {
    match local_name {
        b"status" | b"Success" => Some(Field::Status),
        b"details" | b"Reason" => Some(Field::Details),
        _ => None,
    }
}

/// Interpret a response body. Never fails; unrecognizable input is `Malformed`.
pub fn parse_response(body: &str) -> ConnectionResult {
    let fields = match extract_fields(body) {
        Ok(fields) => fields,
        Err(detail) => return ConnectionResult::Malformed { detail },
    };

    match fields.status.as_deref().map(str::trim) {
        Some(STATUS_TRUE) => ConnectionResult::Success,
        Some(STATUS_FALSE) => ConnectionResult::Failure {
            reason: fields
                .details
                .map(|d| d.trim().to_string())
                .unwrap_or_default(),
        },
        Some(other) => ConnectionResult::Malformed {
            detail: format!("unexpected status value {:?}", other),
        },
        None => ConnectionResult::Malformed {
            detail: "response has no status element".to_string(),
        },
    }
}

/// Count a top-level element; a document has exactly one.
fn open_root(root_seen: &mut bool) -> Result<(), String> {
    if *root_seen {
        return Err("response has more than one root element".to_string());
    }
    *root_seen = true;
    Ok(())
}

fn extract_fields(body: &str) -> Result<ResponseFields, String> {
    let mut reader = Reader::from_str(body);
    reader.trim_text(true);

    let mut fields = ResponseFields::default();
    let mut capturing: Option<Field> = None;
    let mut root_seen = false;
    let mut depth: usize = 0;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if depth == 0 {
                    open_root(&mut root_seen)?;
                }
                depth += 1;
                capturing = field_for(e.local_name().as_ref()).filter(|&field| {
                    let slot = fields.slot(field);
                    if slot.is_some() {
                        return false;
                    }
                    *slot = Some(String::new());
                    true
                });
            }
            Ok(Event::Empty(e)) => {
                if depth == 0 {
                    open_root(&mut root_seen)?;
                }
                if let Some(field) = field_for(e.local_name().as_ref()) {
                    fields.slot(field).get_or_insert_with(String::new);
                }
            }
            Ok(Event::Text(text)) => {
                if depth == 0 {
                    if text.iter().all(u8::is_ascii_whitespace) {
                        continue;
                    }
                    return Err("text outside the root element".to_string());
                }
                if let Some(field) = capturing {
                    let text = text.unescape().map_err(|e| e.to_string())?;
                    if let Some(slot) = fields.slot(field) {
                        slot.push_str(&text);
                    }
                }
            }
            Ok(Event::CData(data)) => {
                if depth == 0 {
                    return Err("CDATA outside the root element".to_string());
                }
                if let Some(field) = capturing {
                    if let Some(slot) = fields.slot(field) {
                        slot.push_str(&String::from_utf8_lossy(&data));
                    }
                }
            }
            Ok(Event::End(_)) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| "closing tag without an open element".to_string())?;
                capturing = None;
            }
            Ok(Event::Eof) => {
                if depth > 0 {
                    return Err(format!("document ends with {} unclosed element(s)", depth));
                }
                break;
            }
            Ok(_) => {}
            Err(e) => {
                return Err(format!(
                    "invalid XML at byte {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
        }
    }

    if !root_seen {
        return Err("response body contains no XML elements".to_string());
    }

    Ok(fields)
}
