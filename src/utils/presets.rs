use std::str::FromStr;

/// Gene regions with a built-in site layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Preset {
    Gba,
}

impl FromStr for Preset {
    type Err = &'static str;
    fn from_str(preset: &str) -> Result<Self, Self::Err> {
        match preset.to_lowercase().as_str() {
            "gba" => Ok(Preset::Gba),
            _ => Err("Invalid preset. Options are: gba"),
        }
    }
}
