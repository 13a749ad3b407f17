//! Cover style and network branding definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when parsing an unknown style or network name.
#[derive(Debug, Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseStyleError {
    kind: &'static str,
    value: String,
}

/// Visual style for a generated cover background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CoverStyle {
    /// Glowing energy fields with particle effects
    EnergyFields,
    /// Professional dark theme with geometric patterns
    #[default]
    DarkTheme,
    /// Connected network nodes, tech visualization
    NetworkNodes,
    /// Flowing particle waves, dynamic motion
    ParticleWaves,
    /// Clean corporate design with gradients
    CorporateStyle,
    /// High contrast, bright elements
    UltraVisible,
}

impl CoverStyle {
    /// All available styles.
    pub const ALL: &'static [CoverStyle] = &[
        CoverStyle::EnergyFields,
        CoverStyle::DarkTheme,
        CoverStyle::NetworkNodes,
        CoverStyle::ParticleWaves,
        CoverStyle::CorporateStyle,
        CoverStyle::UltraVisible,
    ];

    /// Get string representation of the style.
    pub fn as_str(&self) -> &'static str {
        match self {
            CoverStyle::EnergyFields => "energy_fields",
            CoverStyle::DarkTheme => "dark_theme",
            CoverStyle::NetworkNodes => "network_nodes",
            CoverStyle::ParticleWaves => "particle_waves",
            CoverStyle::CorporateStyle => "corporate_style",
            CoverStyle::UltraVisible => "ultra_visible",
        }
    }

    /// Scene description used when assembling generation prompts.
    pub fn scene_phrase(&self) -> &'static str {
        match self {
            CoverStyle::EnergyFields => "glowing energy fields, particle effects",
            CoverStyle::DarkTheme => "dark professional theme, geometric patterns",
            CoverStyle::NetworkNodes => "connected network nodes, tech visualization",
            CoverStyle::ParticleWaves => "flowing particle waves, dynamic motion",
            CoverStyle::CorporateStyle => "clean corporate design, professional gradients",
            CoverStyle::UltraVisible => "high contrast design, bright elements",
        }
    }
}

impl fmt::Display for CoverStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CoverStyle {
    type Err = ParseStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "energy_fields" => Ok(CoverStyle::EnergyFields),
            "dark_theme" => Ok(CoverStyle::DarkTheme),
            "network_nodes" => Ok(CoverStyle::NetworkNodes),
            "particle_waves" => Ok(CoverStyle::ParticleWaves),
            "corporate_style" => Ok(CoverStyle::CorporateStyle),
            "ultra_visible" => Ok(CoverStyle::UltraVisible),
            _ => Err(ParseStyleError {
                kind: "style",
                value: s.to_string(),
            }),
        }
    }
}

/// Crypto network whose branding a cover carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    Bitcoin,
    Ethereum,
    Hedera,
    Algorand,
    Constellation,
    /// No specific network branding
    #[default]
    Generic,
}

/// Brand color palette for a network, used by the placeholder renderer.
#[derive(Debug, Clone, Copy)]
pub struct BrandPalette {
    pub primary: [u8; 3],
    pub secondary: [u8; 3],
    pub accent: [u8; 3],
    pub energy: [u8; 3],
}

impl Network {
    /// All known networks.
    pub const ALL: &'static [Network] = &[
        Network::Bitcoin,
        Network::Ethereum,
        Network::Hedera,
        Network::Algorand,
        Network::Constellation,
        Network::Generic,
    ];

    /// Get string representation of the network.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Bitcoin => "bitcoin",
            Network::Ethereum => "ethereum",
            Network::Hedera => "hedera",
            Network::Algorand => "algorand",
            Network::Constellation => "constellation",
            Network::Generic => "generic",
        }
    }

    /// Brand palette for placeholder backgrounds.
    pub fn palette(&self) -> BrandPalette {
        match self {
            Network::Hedera => BrandPalette {
                primary: [138, 43, 226],
                secondary: [75, 0, 130],
                accent: [186, 85, 211],
                energy: [255, 100, 255],
            },
            Network::Algorand => BrandPalette {
                primary: [0, 120, 140],
                secondary: [0, 85, 100],
                accent: [75, 163, 224],
                energy: [0, 255, 255],
            },
            Network::Constellation => BrandPalette {
                primary: [72, 61, 139],
                secondary: [25, 25, 112],
                accent: [106, 90, 205],
                energy: [255, 255, 255],
            },
            Network::Bitcoin => BrandPalette {
                primary: [255, 165, 0],
                secondary: [184, 115, 51],
                accent: [255, 215, 0],
                energy: [255, 255, 0],
            },
            Network::Ethereum => BrandPalette {
                primary: [98, 126, 234],
                secondary: [52, 73, 154],
                accent: [162, 177, 255],
                energy: [255, 255, 255],
            },
            // Neutral slate palette for unbranded covers
            Network::Generic => BrandPalette {
                primary: [70, 80, 120],
                secondary: [30, 35, 55],
                accent: [120, 135, 180],
                energy: [220, 230, 255],
            },
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Network {
    type Err = ParseStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bitcoin" => Ok(Network::Bitcoin),
            "ethereum" => Ok(Network::Ethereum),
            "hedera" => Ok(Network::Hedera),
            "algorand" => Ok(Network::Algorand),
            "constellation" => Ok(Network::Constellation),
            "generic" => Ok(Network::Generic),
            _ => Err(ParseStyleError {
                kind: "network",
                value: s.to_string(),
            }),
        }
    }
}
