//! User-facing text lookup with an `en` fallback.

use std::collections::HashMap;

use crate::transport::{Request, Transport};

/// The key whose absence marks a dictionary as unusable.
const TITLE_KEY: &str = "title";

/// Flat string map fetched from the project's `_locales` tree.
pub struct Dictionary {
    lang: String,
    entries: HashMap<String, String>,
}

impl Dictionary {
    /// Fetch the dictionary for `lang`, falling back to `en` when the
    /// requested language yields an empty or missing title key.
    pub async fn fetch(transport: &dyn Transport, script_root: &str, lang: &str) -> Dictionary {
        let entries = fetch_lang(transport, script_root, lang).await;
        let usable = entries
            .get(TITLE_KEY)
            .is_some_and(|title| !title.is_empty());
        if usable || lang == "en" {
            return Dictionary {
                lang: lang.to_string(),
                entries,
            };
        }

        tracing::debug!(lang, "dictionary unusable, falling back to en");
        Dictionary {
            lang: "en".to_string(),
            entries: fetch_lang(transport, script_root, "en").await,
        }
    }

    /// Empty dictionary; `get` degrades to echoing keys.
    pub fn empty() -> Dictionary {
        Dictionary {
            lang: "en".to_string(),
            entries: HashMap::new(),
        }
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// Resolve a message key; unknown keys echo back so a missing entry is
    /// visible instead of blank.
    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        self.entries.get(key).map(String::as_str).unwrap_or(key)
    }
}

async fn fetch_lang(
    transport: &dyn Transport,
    script_root: &str,
    lang: &str,
) -> HashMap<String, String> {
    let url = format!("{}/_locales/{}/messages.json", script_root, lang);
    match transport.execute(Request::get(url)).await {
        Ok(response) if response.status == 200 => {
            match serde_json::from_str::<HashMap<String, String>>(&response.body) {
                Ok(entries) => entries,
                Err(err) => {
                    tracing::warn!(lang, %err, "dictionary is not a flat string map");
                    HashMap::new()
                }
            }
        }
        Ok(response) => {
            tracing::debug!(lang, status = response.status, "dictionary not available");
            HashMap::new()
        }
        Err(err) => {
            tracing::debug!(lang, %err, "dictionary fetch failed");
            HashMap::new()
        }
    }
}
