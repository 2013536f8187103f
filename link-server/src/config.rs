use std::env;

use anyhow::Result;
use link_core::LinkApp;

/// Environment variable → config key, with an optional default.
const SETTINGS: &[(&str, &str, Option<&str>)] = &[
    ("HTTP_HOST", "http.host", Some("127.0.0.1")),
    ("HTTP_PORT", "http.port", Some("3000")),
    ("REDIRECT_URL", "redirect.url", None),
    ("ADMIN_USERNAME", "auth.username", None),
    ("ADMIN_PASSWORD", "auth.password", None),
    ("UPLOAD_USER_AGENT", "upload.user_agent", None),
    ("UPLOAD_CHANNEL_CAPACITY", "upload.channel_capacity", None),
    ("UPLOAD_INLINE_MAX_BYTES", "upload.inline_max_bytes", None),
    ("LITTERBOX_TTL", "upload.litterbox_ttl", None),
    ("HC_CDN_TOKEN", "upload.hc_cdn_token", None),
];

/// Configure all application settings from the process environment.
pub fn config(app: &LinkApp) -> Result<()> {
    config_from(app, |name| env::var(name).ok())?;

    // `LINKS__SECTION__KEY` overrides anything above
    app.load_env("LINKS__");
    Ok(())
}

/// Same as [`config`] over any variable lookup.
pub fn config_from<F>(app: &LinkApp, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    for (var, key, default) in SETTINGS {
        let value = lookup(*var)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .or_else(|| default.map(str::to_string));
        if let Some(value) = value {
            app.set(*key, value);
        }
    }

    validate(app)
}

fn validate(app: &LinkApp) -> Result<()> {
    let config = app.config_snapshot();
    for key in ["http.port", "upload.channel_capacity", "upload.inline_max_bytes"] {
        if let Some(raw) = config.get(key) {
            if raw.parse::<u64>().is_err() {
                anyhow::bail!("{key} must be a number, got {raw:?}");
            }
        }
    }
    Ok(())
}
