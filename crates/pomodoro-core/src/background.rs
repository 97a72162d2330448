//! Background preference for views.
//!
//! Purely presentational: nothing here feeds back into the timer.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Gradient presets, as Tailwind class tokens.
pub const GRADIENT_PRESETS: &[&str] = &[
    "bg-gradient-to-br from-rose-500 to-indigo-700",
    "bg-gradient-to-br from-blue-500 to-purple-700",
    "bg-gradient-to-br from-green-400 to-blue-600",
    "bg-gradient-to-br from-yellow-400 to-orange-600",
    "bg-gradient-to-br from-pink-500 to-purple-900",
    "bg-gradient-to-br from-indigo-500 to-cyan-400",
    "bg-gradient-to-br from-slate-900 to-slate-700",
    "bg-gradient-to-br from-emerald-500 to-teal-900",
];

/// Bundled ambient videos.
pub const VIDEO_PRESETS: &[&str] = &[
    "/videos/forest.mp4",
    "/videos/ocean.mp4",
    "/videos/rain.mp4",
    "/videos/fireplace.mp4",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    #[default]
    Gradient,
    Image,
    Video,
}

/// The active background plus the last value chosen for each kind, so
/// switching kinds does not lose the other selections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Background {
    #[serde(default)]
    pub kind: BackgroundKind,
    #[serde(default = "default_gradient")]
    pub gradient: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub video: String,
}

fn default_gradient() -> String {
    GRADIENT_PRESETS[0].to_string()
}

impl Default for Background {
    fn default() -> Self {
        Self {
            kind: BackgroundKind::Gradient,
            gradient: default_gradient(),
            image: String::new(),
            video: String::new(),
        }
    }
}

impl Background {
    /// The value in effect for the active kind.
    pub fn active_source(&self) -> &str {
        match self.kind {
            BackgroundKind::Gradient => &self.gradient,
            BackgroundKind::Image => &self.image,
            BackgroundKind::Video => &self.video,
        }
    }

    /// Select a gradient; only preset tokens are accepted.
    pub fn set_gradient(&mut self, token: &str) -> Result<(), ValidationError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ValidationError::EmptyName { field: "gradient" });
        }
        check_gradient(token)?;
        self.gradient = token.to_string();
        self.kind = BackgroundKind::Gradient;
        Ok(())
    }

    pub fn set_image(&mut self, location: &str) -> Result<(), ValidationError> {
        self.image = check_location(location, "image")?;
        self.kind = BackgroundKind::Image;
        Ok(())
    }

    pub fn set_video(&mut self, location: &str) -> Result<(), ValidationError> {
        self.video = check_location(location, "video")?;
        self.kind = BackgroundKind::Video;
        Ok(())
    }

    /// The active kind must have a value, and stored locations must be well formed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.active_source().trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "background".into(),
                message: format!("no {:?} source selected", self.kind).to_lowercase(),
            });
        }
        if !self.gradient.is_empty() {
            check_gradient(&self.gradient)?;
        }
        for (field, location) in [("image", &self.image), ("video", &self.video)] {
            if !location.is_empty() {
                check_location(location, field)?;
            }
        }
        Ok(())
    }
}

fn check_gradient(token: &str) -> Result<(), ValidationError> {
    if GRADIENT_PRESETS.contains(&token) {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: "gradient".into(),
            message: format!("'{token}' is not a gradient preset"),
        })
    }
}

/// Accept a path or a URL; anything with a scheme must parse as a URL.
fn check_location(location: &str, field: &'static str) -> Result<String, ValidationError> {
    let location = location.trim();
    if location.is_empty() {
        return Err(ValidationError::EmptyName { field });
    }
    if location.contains("://") {
        url::Url::parse(location).map_err(|e| ValidationError::InvalidValue {
            field: field.into(),
            message: format!("'{location}' is not a valid URL: {e}"),
        })?;
    }
    Ok(location.to_string())
}
