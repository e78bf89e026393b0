use std::fmt;

/// Well-known event names fired by the panel.
///
/// The set is closed apart from `Custom`, which carries a project-supplied
/// name and is always stored (and matched) with its `custom:` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventName {
    Shown,
    Hidden,
    StatusFetched,
    EnvSwitched,
    Updated,
    Published,
    Unpublished,
    Deleted,
    PluginUsed,
    LoggedIn,
    LoggedOut,
    /// Project-supplied event; the prefix marks it as such.
    Custom(String),
}

impl EventName {
    /// Wrap a project-supplied name, prefixing it if the caller didn't.
    pub fn custom(name: &str) -> Self {
        match name.strip_prefix("custom:") {
            Some(rest) => EventName::Custom(format!("custom:{}", rest)),
            None => EventName::Custom(format!("custom:{}", name)),
        }
    }

    /// Whether the event is mirrored to the telemetry sampler.
    ///
    /// All well-known names are; project events are, by virtue of their
    /// prefix. Nothing else ever reaches the sampler.
    pub fn is_sampled(&self) -> bool {
        match self {
            EventName::Custom(name) => name.starts_with("custom:"),
            _ => true,
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventName::Shown => "shown",
            EventName::Hidden => "hidden",
            EventName::StatusFetched => "statusfetched",
            EventName::EnvSwitched => "envswitched",
            EventName::Updated => "updated",
            EventName::Published => "published",
            EventName::Unpublished => "unpublished",
            EventName::Deleted => "deleted",
            EventName::PluginUsed => "pluginused",
            EventName::LoggedIn => "loggedin",
            EventName::LoggedOut => "loggedout",
            EventName::Custom(name) => name,
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_names_are_prefixed_once() {
        assert_eq!(
            EventName::custom("audit"),
            EventName::Custom("custom:audit".to_string())
        );
        assert_eq!(
            EventName::custom("custom:audit"),
            EventName::Custom("custom:audit".to_string())
        );
    }

    #[test]
    fn all_fixed_names_are_sampled() {
        assert!(EventName::StatusFetched.is_sampled());
        assert!(EventName::PluginUsed.is_sampled());
        assert!(EventName::custom("audit").is_sampled());
    }
}
