//! Save/restore a message as a flat map of its constructor arguments.

use serde_json::{Map, Value};

use super::options::{self, Options};
use super::{Message, MessageKind, Notification};
use crate::error::GcmError;

const REGISTRATION_IDS: &str = "registration_ids";
const REGISTRATION_ID: &str = "registration_id";
const DATA: &str = "data";
const MESSAGE_TITLE: &str = "message_title";
const MESSAGE_BODY: &str = "message_body";

impl Message {
    /// Flat mapping of constructor arguments: recipients, `data`,
    /// notification fields and each set option key.
    pub fn to_state(&self) -> Map<String, Value> {
        let mut state = self.options.to_json_fields(true);
        match self.kind {
            MessageKind::Multicast => {
                state.insert(REGISTRATION_IDS.into(), Value::from(self.recipients.clone()));
            }
            MessageKind::Unicast => {
                state.insert(REGISTRATION_ID.into(), Value::from(self.recipients[0].as_str()));
            }
        }
        if let Some(data) = &self.data {
            state.insert(DATA.into(), Value::Object(data.clone()));
        }
        if let Some(n) = &self.notification {
            if let Some(t) = &n.title {
                state.insert(MESSAGE_TITLE.into(), Value::from(t.as_str()));
            }
            if let Some(b) = &n.body {
                state.insert(MESSAGE_BODY.into(), Value::from(b.as_str()));
            }
        }
        state
    }

    /// Rebuild a message from [`Message::to_state`] output. Keys that are
    /// neither constructor arguments nor recognized options are ignored.
    pub fn from_state(kind: MessageKind, state: &Map<String, Value>) -> Result<Self, GcmError> {
        let recipients = match kind {
            MessageKind::Multicast => match state.get(REGISTRATION_IDS) {
                Some(Value::Array(ids)) => ids
                    .iter()
                    .map(|v| {
                        v.as_str().map(str::to_string).ok_or_else(|| {
                            GcmError::validation("registration_ids must hold strings")
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                _ => return Err(GcmError::validation("missing registration_ids")),
            },
            MessageKind::Unicast => match state.get(REGISTRATION_ID) {
                Some(Value::String(id)) => vec![id.clone()],
                _ => return Err(GcmError::validation("missing registration_id")),
            },
        };

        let data = match state.get(DATA) {
            None | Some(Value::Null) => None,
            Some(Value::Object(d)) => Some(d.clone()),
            Some(_) => return Err(GcmError::validation("data must be an object")),
        };

        let option_map: Map<String, Value> = state
            .iter()
            .filter(|(k, _)| options::OPTION_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let opts = Options::from_map(&option_map)?;

        let msg = Message::new(kind, recipients, data, opts)?;
        let notification = Notification {
            title: state.get(MESSAGE_TITLE).and_then(Value::as_str).map(str::to_string),
            body: state.get(MESSAGE_BODY).and_then(Value::as_str).map(str::to_string),
        };
        if notification.is_empty() {
            Ok(msg)
        } else {
            msg.with_notification(notification)
        }
    }
}
