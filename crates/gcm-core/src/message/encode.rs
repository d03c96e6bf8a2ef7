//! Wire encodings: JSON (multicast) and URL-encoded plain text (unicast).

use serde_json::{Map, Value};
use url::form_urlencoded;

use super::{Message, MessageKind};

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded;charset=UTF-8";

/// Request body ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireBody {
    pub content_type: &'static str,
    pub body: String,
}

impl Message {
    /// Encode the message in its wire form.
    pub fn serialize(&self) -> WireBody {
        match self.kind {
            MessageKind::Multicast => WireBody {
                content_type: CONTENT_TYPE_JSON,
                body: Value::Object(self.json_payload()).to_string(),
            },
            MessageKind::Unicast => WireBody {
                content_type: CONTENT_TYPE_FORM,
                body: self.form_payload(),
            },
        }
    }

    /// JSON body as a map: options at the top level, payload under `data`.
    pub fn json_payload(&self) -> Map<String, Value> {
        let mut payload = self.options.to_json_fields(true);
        if let Some(data) = &self.data {
            payload.insert("data".into(), Value::Object(data.clone()));
        }
        if let Some(n) = &self.notification {
            let mut block = Map::new();
            if let Some(title) = &n.title {
                block.insert("title".into(), Value::from(title.as_str()));
            }
            if let Some(body) = &n.body {
                block.insert("text".into(), Value::from(body.as_str()));
            }
            payload.insert("notification".into(), Value::Object(block));
        }
        payload.insert(
            "registration_ids".into(),
            Value::from(self.recipients.clone()),
        );
        payload
    }

    /// Flat key/value pairs of the plain-text body, before URL encoding.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields: Vec<(String, String)> = self
            .options
            .to_form_fields()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        if let Some(data) = &self.data {
            for (key, value) in data {
                if let Some(v) = scalar_text(value) {
                    fields.push((format!("data.{key}"), v));
                }
            }
        }
        fields.push(("registration_id".into(), self.recipients[0].clone()));
        fields
    }

    fn form_payload(&self) -> String {
        let mut ser = form_urlencoded::Serializer::new(String::new());
        for (k, v) in self.form_fields() {
            ser.append_pair(&k, &v);
        }
        ser.finish()
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
