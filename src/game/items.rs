//! AP recovery items

use std::fmt;

use serde::{Deserialize, Serialize};

/// An item that restores AP.
///
/// Each item is recognized on the recovery dialog by the template of the
/// same (snake_case) name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApItem {
    /// Saint quartz
    #[serde(alias = "quartz")]
    RainbowApple,
    GoldApple,
    SilverApple,
    BronzeApple,
    #[serde(rename = "red_copper_apple", alias = "copper_apple")]
    CopperApple,
}

impl ApItem {
    pub fn template_name(&self) -> &'static str {
        match self {
            ApItem::RainbowApple => "rainbow_apple",
            ApItem::GoldApple => "gold_apple",
            ApItem::SilverApple => "silver_apple",
            ApItem::BronzeApple => "bronze_apple",
            ApItem::CopperApple => "red_copper_apple",
        }
    }
}

impl fmt::Display for ApItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.template_name())
    }
}
