//! Background preference commands for CLI.

use clap::Subcommand;
use pomodoro_core::background::{GRADIENT_PRESETS, VIDEO_PRESETS};
use pomodoro_core::Config;

use super::CmdResult;

#[derive(Subcommand)]
pub enum BackgroundAction {
    /// Show the active background
    Show,
    /// Use a gradient preset
    Gradient {
        /// Preset token, or its 1-based number in `background presets`
        token: String,
    },
    /// Use an image from a URL or path
    Image {
        location: String,
    },
    /// Use a video from a URL or path, or a preset number
    Video {
        location: String,
    },
    /// List gradient and video presets
    Presets,
}

pub fn run(action: BackgroundAction) -> CmdResult {
    let mut config = Config::load();

    match action {
        BackgroundAction::Show => {
            println!("{}", serde_json::to_string_pretty(&config.background)?);
        }
        BackgroundAction::Gradient { token } => {
            let token = match token.trim().parse::<usize>() {
                Ok(n) if (1..=GRADIENT_PRESETS.len()).contains(&n) => GRADIENT_PRESETS[n - 1],
                _ => token.as_str(),
            };
            config.background.set_gradient(token)?;
            config.save()?;
            println!("background: {}", config.background.active_source());
        }
        BackgroundAction::Image { location } => {
            config.background.set_image(&location)?;
            config.save()?;
            println!("background: {}", config.background.active_source());
        }
        BackgroundAction::Video { location } => {
            let location = match location.trim().parse::<usize>() {
                Ok(n) if (1..=VIDEO_PRESETS.len()).contains(&n) => VIDEO_PRESETS[n - 1],
                _ => location.as_str(),
            };
            config.background.set_video(location)?;
            config.save()?;
            println!("background: {}", config.background.active_source());
        }
        BackgroundAction::Presets => {
            let presets = serde_json::json!({
                "gradients": GRADIENT_PRESETS,
                "videos": VIDEO_PRESETS,
            });
            println!("{}", serde_json::to_string_pretty(&presets)?);
        }
    }
    Ok(())
}
