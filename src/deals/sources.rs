//! Deal sources: Daraz regional storefronts, Chaldal and Shwapno.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Daraz regional storefronts with their domains and currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DarazRegion {
    #[default]
    Bd,
    Pk,
    Lk,
    Mm,
    Np,
}

impl DarazRegion {
    /// Returns the storefront domain for this region.
    pub fn domain(&self) -> &'static str {
        match self {
            DarazRegion::Bd => "daraz.com.bd",
            DarazRegion::Pk => "daraz.pk",
            DarazRegion::Lk => "daraz.lk",
            DarazRegion::Mm => "daraz.com.mm",
            DarazRegion::Np => "daraz.com.np",
        }
    }

    /// Returns the base URL for this region.
    pub fn base_url(&self) -> String {
        format!("https://{}", self.domain())
    }

    /// Returns the currency code prices are displayed in.
    pub fn currency(&self) -> &'static str {
        match self {
            DarazRegion::Bd => "BDT",
            DarazRegion::Pk => "PKR",
            DarazRegion::Lk => "LKR",
            DarazRegion::Mm => "MMK",
            DarazRegion::Np => "NPR",
        }
    }

    /// Returns the region code (`bd`, `pk`, ...).
    pub fn code(&self) -> &'static str {
        match self {
            DarazRegion::Bd => "bd",
            DarazRegion::Pk => "pk",
            DarazRegion::Lk => "lk",
            DarazRegion::Mm => "mm",
            DarazRegion::Np => "np",
        }
    }

    /// Returns all supported regions.
    pub fn all() -> &'static [DarazRegion] {
        &[DarazRegion::Bd, DarazRegion::Pk, DarazRegion::Lk, DarazRegion::Mm, DarazRegion::Np]
    }
}

/// A selectable deal source. Each variant is served by exactly one adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Daraz(DarazRegion),
    Chaldal,
    /// Shwapno search + product detail JSON endpoints.
    ShwapnoApi,
    /// Shwapno single product page rendered in a browser.
    ShwapnoPage,
}

impl Default for Source {
    fn default() -> Self {
        Source::Daraz(DarazRegion::default())
    }
}

impl Source {
    /// Returns a human readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Source::Daraz(DarazRegion::Bd) => "Daraz Bangladesh",
            Source::Daraz(DarazRegion::Pk) => "Daraz Pakistan",
            Source::Daraz(DarazRegion::Lk) => "Daraz Sri Lanka",
            Source::Daraz(DarazRegion::Mm) => "Daraz Myanmar",
            Source::Daraz(DarazRegion::Np) => "Daraz Nepal",
            Source::Chaldal => "Chaldal",
            Source::ShwapnoApi => "Shwapno (API)",
            Source::ShwapnoPage => "Shwapno (product page)",
        }
    }

    /// Returns the storefront host this source talks to.
    pub fn host(&self) -> &'static str {
        match self {
            Source::Daraz(region) => region.domain(),
            Source::Chaldal => "chaldal.com",
            Source::ShwapnoApi | Source::ShwapnoPage => "www.shwapno.com",
        }
    }

    /// Returns whether this source needs a rendering browser.
    pub fn requires_browser(&self) -> bool {
        matches!(self, Source::Daraz(_) | Source::ShwapnoPage)
    }

    /// Returns all supported sources.
    pub fn all() -> &'static [Source] {
        &[
            Source::Daraz(DarazRegion::Bd),
            Source::Daraz(DarazRegion::Pk),
            Source::Daraz(DarazRegion::Lk),
            Source::Daraz(DarazRegion::Mm),
            Source::Daraz(DarazRegion::Np),
            Source::Chaldal,
            Source::ShwapnoApi,
            Source::ShwapnoPage,
        ]
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Source::Daraz(region) => region.code(),
            Source::Chaldal => "chaldal",
            Source::ShwapnoApi => "shwapno",
            Source::ShwapnoPage => "shwapno-page",
        };
        write!(f, "{}", code)
    }
}

/// Parses a source code, ignoring case and surrounding whitespace.
/// Country names (`pakistan`, `sri lanka`) and site aliases (`daraz`,
/// `shwapno-api`, `shwapno-dom`) are accepted too.
impl FromStr for Source {
    type Err = SourceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bd" | "bangladesh" | "daraz" => Ok(Source::Daraz(DarazRegion::Bd)),
            "pk" | "pakistan" => Ok(Source::Daraz(DarazRegion::Pk)),
            "lk" | "sri lanka" => Ok(Source::Daraz(DarazRegion::Lk)),
            "mm" | "myanmar" => Ok(Source::Daraz(DarazRegion::Mm)),
            "np" | "nepal" => Ok(Source::Daraz(DarazRegion::Np)),
            "chaldal" => Ok(Source::Chaldal),
            "shwapno" | "shwapno-api" => Ok(Source::ShwapnoApi),
            "shwapno-page" | "shwapno-dom" => Ok(Source::ShwapnoPage),
            _ => Err(SourceParseError(s.to_string())),
        }
    }
}

impl Serialize for Source {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Source {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone)]
pub struct SourceParseError(String);

impl fmt::Display for SourceParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown source '{}'. Valid sources: bd, pk, lk, mm, np, chaldal, shwapno, shwapno-page",
            self.0
        )
    }
}

impl std::error::Error for SourceParseError {}
