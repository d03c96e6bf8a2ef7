//! `gcm send` – build one message, send it once, print the outcome.

use anyhow::{Context, Result};
use gcm_core::config::GcmConfig;
use gcm_core::{GcmClient, Message, Notification, Options, RetryPlan, SendResult};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Default)]
pub struct SendArgs {
    pub api_key: Option<String>,
    pub registration_ids: Vec<String>,
    pub data: Option<Map<String, Value>>,
    pub message_title: Option<String>,
    pub message_body: Option<String>,
    pub url: Option<String>,
    pub plain_text: bool,
    pub dry_run: bool,
}

pub async fn run_send(cfg: &GcmConfig, args: SendArgs) -> Result<()> {
    let message = build_message(&args)?;

    let mut cfg = cfg.clone();
    if let Some(url) = &args.url {
        cfg.url = url.clone();
    }
    let api_key = resolve_api_key(args.api_key.as_deref(), &cfg)?;
    let mut client =
        GcmClient::from_config(&cfg, Some(api_key)).context("building client from config")?;

    // curl is blocking.
    let (result, plan) = tokio::task::spawn_blocking(move || -> Result<(SendResult, RetryPlan)> {
        let result = client.send(&message)?;
        let plan = client.plan_retry(&result, 0)?;
        Ok((result, plan))
    })
    .await??;

    println!("{}", serde_json::to_string_pretty(&render(&result, &plan))?);
    Ok(())
}

/// `--api-key` wins over the configured key; an empty key counts as missing.
pub(crate) fn resolve_api_key<'a>(flag: Option<&'a str>, cfg: &'a GcmConfig) -> Result<&'a str> {
    flag.or(cfg.api_key.as_deref())
        .filter(|k| !k.is_empty())
        .ok_or_else(|| anyhow::anyhow!("API key is required: pass --api-key or set api_key in config.toml"))
}

pub(crate) fn build_message(args: &SendArgs) -> Result<Message> {
    let options = Options {
        dry_run: Some(args.dry_run),
        ..Options::default()
    };
    let message = if args.plain_text {
        match args.registration_ids.as_slice() {
            [one] => Message::unicast(one.clone(), args.data.clone(), options)?,
            ids => anyhow::bail!("--plain-text takes exactly one --registration-id, got {}", ids.len()),
        }
    } else {
        Message::multicast(args.registration_ids.clone(), args.data.clone(), options)?
    };

    if args.message_title.is_some() || args.message_body.is_some() {
        let notification = Notification {
            title: args.message_title.clone(),
            body: args.message_body.clone(),
        };
        return Ok(message.with_notification(notification)?);
    }
    Ok(message)
}

pub(crate) fn render(result: &SendResult, plan: &RetryPlan) -> Value {
    let mut out = json!({
        "recipients": result.message().recipients(),
        "result": result.partition(),
        "needs_retry": result.needs_retry(),
    });
    if let Some(retry) = &plan.message {
        out["retry"] = json!({
            "recipients": retry.recipients(),
            "delay_secs": plan.delay_secs,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcm_core::{MessageKind, Partition};

    fn args(ids: &[&str]) -> SendArgs {
        SendArgs {
            registration_ids: ids.iter().map(|s| s.to_string()).collect(),
            ..SendArgs::default()
        }
    }

    #[test]
    fn builds_multicast_with_notification() {
        let mut a = args(&["A", "B"]);
        a.message_title = Some("Hello".into());
        a.data = json!({ "k": "v" }).as_object().cloned();
        let msg = build_message(&a).unwrap();
        assert_eq!(msg.kind(), MessageKind::Multicast);
        assert_eq!(msg.recipients().len(), 2);
        assert_eq!(msg.notification().unwrap().title.as_deref(), Some("Hello"));
        assert!(msg.options().dry_run.is_none());
    }

    #[test]
    fn plain_text_needs_single_recipient_and_no_notification() {
        let mut a = args(&["A", "B"]);
        a.plain_text = true;
        assert!(build_message(&a).is_err());

        let mut a = args(&["A"]);
        a.plain_text = true;
        a.dry_run = true;
        let msg = build_message(&a).unwrap();
        assert_eq!(msg.kind(), MessageKind::Unicast);
        assert_eq!(msg.options().dry_run, Some(true));

        a.message_body = Some("body".into());
        assert!(build_message(&a).is_err());
    }

    #[test]
    fn api_key_flag_overrides_config() {
        let cfg = GcmConfig {
            api_key: Some("from-config".into()),
            ..GcmConfig::default()
        };
        assert_eq!(resolve_api_key(Some("from-flag"), &cfg).unwrap(), "from-flag");
        assert_eq!(resolve_api_key(None, &cfg).unwrap(), "from-config");
    }

    #[test]
    fn missing_api_key_reported_alone() {
        let err = resolve_api_key(None, &GcmConfig::default()).unwrap_err();
        assert!(err.to_string().starts_with("API key is required"));
        assert!(resolve_api_key(Some(""), &GcmConfig::default()).is_err());
    }

    #[test]
    fn bad_backoff_not_blamed_on_api_key() {
        let cfg = GcmConfig {
            initial_backoff_ms: 0,
            ..GcmConfig::default()
        };
        let key = resolve_api_key(Some("k"), &cfg).unwrap();
        let err = GcmClient::from_config(&cfg, Some(key))
            .context("building client from config")
            .unwrap_err();
        let text = format!("{err:#}");
        assert!(!text.contains("API key"), "{text}");
        assert!(text.contains("initial backoff must be at least 1 ms"), "{text}");
    }

    #[test]
    fn render_includes_retry_section() {
        let msg = build_message(&args(&["A", "B"])).unwrap();
        let partition = Partition {
            unavailable: vec!["B".into()],
            success: [("A".to_string(), "1:1".to_string())].into_iter().collect(),
            ..Partition::default()
        };
        let result = SendResult::new(msg.clone(), partition, None);
        let plan = RetryPlan {
            message: Some(msg.narrow(vec!["B".into()]).unwrap()),
            delay_secs: 1.25,
        };
        let out = render(&result, &plan);
        assert_eq!(out["needs_retry"], json!(true));
        assert_eq!(out["result"]["success"], json!({ "A": "1:1" }));
        assert_eq!(out["retry"]["recipients"], json!(["B"]));
        assert_eq!(out["retry"]["delay_secs"], json!(1.25));
    }
}
