use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name of the archive directory created next to the input folder
    pub output_dir_name: String,
    /// Title shown in the archive title bar
    pub title: String,
    pub theme: ThemeConfig,
}

/// Colors for the generated archive shell
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub bg: String,
    pub fg: String,
    pub pane_bg: String,
    pub border: String,
    pub highlight_bg: String,
    pub highlight_fg: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir_name: "Mail_Archive_Threaded".to_string(),
            title: "Mail Archive".to_string(),
            theme: ThemeConfig::default(),
        }
    }
}

/// Classic monochrome desktop look
impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            bg: "#ffffff".to_string(),
            fg: "#000000".to_string(),
            pane_bg: "#eeeeee".to_string(),
            border: "#000000".to_string(),
            highlight_bg: "#000000".to_string(),
            highlight_fg: "#ffffff".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let config_path = dirs::config_dir()
            .map(|p| p.join("mailweave/config.toml"))
            .unwrap_or_else(|| PathBuf::from("~/.config/mailweave/config.toml"));

        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => eprintln!("Config parse error: {}", e),
                },
                Err(e) => eprintln!("Config read error: {}", e),
            }
        }

        Self::default()
    }
}
