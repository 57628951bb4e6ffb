//! Unwrapping of platform responses: created ids, uploaded images and the
//! structured error envelope.

use campaign_core::{CampaignError, CampaignResult, Credential, PlatformErrorBody};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Longest raw body kept when the platform returns something unstructured.
const MAX_UNSTRUCTURED_BODY: usize = 512;

/// A resource the platform created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedResource {
    pub id: String,
    /// The full response body.
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadedImage {
    pub hash: String,
    pub url: Option<String>,
    pub raw: Value,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: PlatformErrorBody,
}

fn id_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn parse_created(raw: Value) -> CampaignResult<CreatedResource> {
    let id = raw
        .get("id")
        .and_then(id_of)
        .ok_or_else(|| CampaignError::Transport(format!("Platform response has no id: {raw}")))?;
    Ok(CreatedResource { id, raw })
}

/// The platform keys uploaded images by file name; the single upload is the
/// first entry.
pub fn parse_uploaded_image(raw: Value) -> CampaignResult<UploadedImage> {
    let entry = raw
        .get("images")
        .and_then(Value::as_object)
        .and_then(|images| images.values().next())
        .ok_or_else(|| {
            CampaignError::Transport(format!("Image upload response has no images: {raw}"))
        })?;

    let hash = entry
        .get("hash")
        .and_then(Value::as_str)
        .filter(|h| !h.is_empty())
        .ok_or_else(|| CampaignError::Transport("Image upload response has no hash".to_string()))?
        .to_string();
    let url = entry.get("url").and_then(Value::as_str).map(str::to_string);

    Ok(UploadedImage { hash, url, raw })
}

/// Build the error for a non-2xx response, keeping the platform's
/// structured body when there is one. The credential is scrubbed from any
/// raw text that ends up in the error.
pub fn platform_error(status: u16, text: &str, credential: &Credential) -> CampaignError {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(text) {
        let mut body = envelope.error;
        body.message = credential.redact(&body.message);
        for text in [&mut body.error_user_title, &mut body.error_user_msg]
            .into_iter()
            .flatten()
        {
            *text = credential.redact(text);
        }
        return CampaignError::Platform { status, body };
    }

    let mut message = credential.redact(text.trim());
    if message.is_empty() {
        message = format!("HTTP {status} with empty body");
    } else if message.len() > MAX_UNSTRUCTURED_BODY {
        let mut cut = MAX_UNSTRUCTURED_BODY;
        while !message.is_char_boundary(cut) {
            cut -= 1;
        }
        message.truncate(cut);
    }
    CampaignError::Platform {
        status,
        body: PlatformErrorBody {
            message,
            ..Default::default()
        },
    }
}
