//! Styles: media queries and extra tag attributes.

use regex::{Captures, Regex};

use crate::asset::{Asset, Enqueueable};
use crate::config::{AssetConfig, Attributes, Configurable, Deferred};
use crate::handle::AssetRef;
use crate::host::{AssetType, Host, HostResult, Placement, Tag};
use crate::server::AssetServer;
use crate::settings::Settings;
use crate::storage::Assets;

/// A named stylesheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    asset: Asset,
    media: String,
    attribute: Attributes,
}

impl Style {
    pub fn new(name: impl Into<String>, settings: &Settings) -> Self {
        Self {
            asset: Asset::new(name, settings),
            media: settings.default_media.clone(),
            attribute: Attributes::default(),
        }
    }

    pub fn media(&self) -> &str {
        &self.media
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attribute
    }

    pub fn set_media(&mut self, media: impl Into<String>) {
        self.media = media.into();
    }

    /// Replace the extra attributes.
    pub fn set_attribute(&mut self, attribute: Deferred<Attributes>) {
        self.attribute = attribute.resolve();
    }
}

impl Configurable for Style {
    fn configure(&mut self, config: &AssetConfig) {
        self.asset.configure(config);
        if let Some(media) = &config.media {
            self.media = media.clone();
        }
        if let Some(attribute) = &config.attribute {
            self.attribute = attribute.resolve();
        }
    }
}

impl Enqueueable for Style {
    const TYPE: AssetType = AssetType::Style;

    fn create(name: String, settings: &Settings) -> Self {
        Self::new(name, settings)
    }

    fn asset(&self) -> &Asset {
        &self.asset
    }

    fn asset_mut(&mut self) -> &mut Asset {
        &mut self.asset
    }

    fn storage(server: &AssetServer) -> &Assets<Self> {
        server.style_storage()
    }

    fn placement(&self) -> Placement {
        Placement::Media(self.media.clone())
    }

    fn attach_payloads(&self, host: &dyn Host) -> HostResult<()> {
        if let Some(inline) = self.asset.inline().filter(|code| !code.is_empty()) {
            host.add_inline(Self::TYPE, &self.asset.name, inline, self.asset.position)?;
        }
        Ok(())
    }

    /// Apply the extra attributes in insertion order. An attribute already on the
    /// tag gets its quoted value replaced; any other is added before `/>`.
    fn rewrite_tag(&self, tag: &Tag<'_>) -> String {
        let mut html = tag.html.to_string();
        for (key, value) in &self.attribute {
            let pattern = format!(r#"(?i)(\b{}=['"])[^'"]*(['"])"#, regex::escape(key));
            let re = match Regex::new(&pattern) {
                Ok(re) => re,
                Err(err) => {
                    tracing::warn!("Skipping attribute '{}' of style '{}': {}", key, self.asset.name, err);
                    continue;
                }
            };

            if re.is_match(&html) {
                html = re
                    .replace_all(&html, |caps: &Captures<'_>| format!("{}{}{}", &caps[1], value, &caps[2]))
                    .into_owned();
            } else {
                html = html.replace("/>", &format!("{}={} />", key, value));
            }
        }
        html
    }
}

impl AssetRef<'_, Style> {
    pub fn media(&self, media: impl Into<String>) -> &Self {
        let media = media.into();
        self.update(|style| style.set_media(media))
    }

    /// Replace the extra tag attributes.
    pub fn attribute(&self, attribute: impl Into<Deferred<Attributes>>) -> &Self {
        let attribute = attribute.into();
        self.update(|style| style.set_attribute(attribute))
    }
}
