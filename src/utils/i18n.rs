// Bundled Fluent resources (locales/<lang>/welcome.ftl)

use std::fmt;

use fluent::{FluentArgs, FluentResource};
use fluent_bundle::bundle::FluentBundle;
use tracing::warn;
use unic_langid::LanguageIdentifier;

use crate::utils::config::ConfigError;

// Concurrent memoizer so the bundle is Send + Sync
type ConcurrentBundle = FluentBundle<FluentResource, intl_memoizer::concurrent::IntlLangMemoizer>;

const FALLBACK_LOCALE: &str = "en-US";

const RESOURCES: &[(&str, &str)] = &[
    (
        "en-US",
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/locales/en-US/welcome.ftl")),
    ),
    (
        "fr",
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/locales/fr/welcome.ftl")),
    ),
];

fn build_bundle(locale: &str, source: &str) -> Result<ConcurrentBundle, ConfigError> {
    let lang_id: LanguageIdentifier = locale
        .parse()
        .map_err(|e| ConfigError::Locales(format!("{}: {:?}", locale, e)))?;

    let resource = FluentResource::try_new(source.to_string())
        .map_err(|(_, errors)| ConfigError::Locales(format!("{}: {:?}", locale, errors)))?;

    let mut bundle = ConcurrentBundle::new_concurrent(vec![lang_id]);
    // Plain text output, messages end up in embeds and logs
    bundle.set_use_isolating(false);
    bundle
        .add_resource(resource)
        .map_err(|errors| ConfigError::Locales(format!("{}: {:?}", locale, errors)))?;

    Ok(bundle)
}

/// Resource whose language subtag matches the requested one
fn find_resource(lang: &str) -> Option<(&'static str, &'static str)> {
    let requested: LanguageIdentifier = lang.parse().ok()?;
    RESOURCES.iter().copied().find(|(locale, _)| {
        locale
            .parse::<LanguageIdentifier>()
            .map_or(false, |id| id.language == requested.language)
    })
}

/// Translates keys for one language, falling back to en-US
pub struct Localizer {
    lang: &'static str,
    // Preferred bundle first, then the fallback
    bundles: Vec<ConcurrentBundle>,
}

impl fmt::Debug for Localizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Localizer")
            .field("lang", &self.lang)
            .field("bundles", &self.bundles.len())
            .finish()
    }
}

impl Localizer {
    pub fn new(lang: &str) -> Result<Self, ConfigError> {
        let (locale, source) = match find_resource(lang) {
            Some(found) => found,
            None => {
                warn!("Unknown language `{}`, falling back to `{}`", lang, FALLBACK_LOCALE);
                RESOURCES[0]
            }
        };

        let mut bundles = vec![build_bundle(locale, source)?];
        if locale != FALLBACK_LOCALE {
            bundles.push(build_bundle(FALLBACK_LOCALE, RESOURCES[0].1)?);
        }

        Ok(Self {
            lang: locale,
            bundles,
        })
    }

    pub fn lang(&self) -> &str {
        self.lang
    }

    pub fn translate(&self, key: &str, args: Option<&FluentArgs>) -> String {
        for bundle in &self.bundles {
            if let Some(pattern) = bundle.get_message(key).and_then(|msg| msg.value()) {
                let mut errors = vec![];
                return bundle.format_pattern(pattern, args, &mut errors).into_owned();
            }
        }

        key.to_string()
    }

    /// Look up a key without variables. Unknown keys are returned as-is.
    pub fn t(&self, key: &str) -> String {
        self.translate(key, None)
    }

    /// Look up a key with `$name` variables
    pub fn tr(&self, key: &str, args: &[(&str, &str)]) -> String {
        let mut fluent_args = FluentArgs::new();
        for (name, value) in args {
            fluent_args.set(*name, *value);
        }
        self.translate(key, Some(&fluent_args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english() {
        let l10n = Localizer::new("en").unwrap();
        assert_eq!(l10n.lang(), "en-US");
        assert_eq!(l10n.tr("welcome-title", &[("user", "Alice")]), "Alice joined the server!");
        assert_eq!(
            l10n.tr("member-joined", &[("user", "Alice"), ("guild", "Wonderland")]),
            "Alice joined Wonderland"
        );
        assert_eq!(l10n.tr("member-count", &[("count", "42")]), "We are now **42** members.");
    }

    #[test]
    fn test_french() {
        let l10n = Localizer::new("fr").unwrap();
        assert_eq!(l10n.lang(), "fr");
        assert_eq!(l10n.tr("farewell-title", &[("user", "Bob")]), "Bob a quitté le serveur.");
    }

    #[test]
    fn test_region_matches_language() {
        assert_eq!(Localizer::new("fr-CA").unwrap().lang(), "fr");
        assert_eq!(Localizer::new("en-GB").unwrap().lang(), "en-US");
    }

    #[test]
    fn test_unknown_language_falls_back_to_english() {
        let l10n = Localizer::new("tlh").unwrap();
        assert_eq!(l10n.lang(), "en-US");
        assert_eq!(l10n.t("farewell-description"), "We hope to see you back soon!");

        let l10n = Localizer::new("not a language").unwrap();
        assert_eq!(l10n.lang(), "en-US");
    }

    #[test]
    fn test_unknown_key_is_returned() {
        let l10n = Localizer::new("fr").unwrap();
        assert_eq!(l10n.t("no-such-key"), "no-such-key");
    }

    #[test]
    fn test_every_key_is_translated() {
        let keys = [
            "ready",
            "member-joined",
            "member-left",
            "guild-not-configured",
            "welcome-no-channel",
            "welcome-channel-not-found",
            "welcome-channel-not-text",
            "farewell-no-channel",
            "farewell-channel-not-found",
            "farewell-channel-not-text",
            "welcome-title",
            "welcome-description",
            "farewell-title",
            "farewell-description",
            "member-count",
            "infos",
            "config-title",
            "config-not-configured",
            "config-welcome",
            "config-farewell",
            "config-active",
            "config-channel",
            "config-member-count",
            "config-profile-picture",
            "config-yes",
            "config-no",
            "config-not-set",
        ];

        for (locale, source) in RESOURCES {
            let bundle = build_bundle(locale, source).unwrap();
            for key in keys {
                assert!(bundle.has_message(key), "{} is missing {}", locale, key);
            }
        }
    }
}
