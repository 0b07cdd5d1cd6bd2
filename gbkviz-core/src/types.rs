use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GbkvizError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub fn flipped(self) -> Self {
        match self {
            Strand::Forward => Strand::Reverse,
            Strand::Reverse => Strand::Forward,
        }
    }

    /// GenBank-style strand sign (+1 / -1)
    pub fn sign(self) -> i8 {
        match self {
            Strand::Forward => 1,
            Strand::Reverse => -1,
        }
    }
}

impl From<bool> for Strand {
    fn from(forward: bool) -> Self {
        if forward {
            Strand::Forward
        } else {
            Strand::Reverse
        }
    }
}

impl From<Strand> for char {
    fn from(strand: Strand) -> Self {
        match strand {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

/// Sequence type of the genome comparison; selects nucmer or promer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeqType {
    Nucleotide,
    Protein,
}

impl SeqType {
    pub fn as_str(self) -> &'static str {
        match self {
            SeqType::Nucleotide => "nucleotide",
            SeqType::Protein => "protein",
        }
    }

    /// Number of columns show-coords emits per row in this mode
    pub fn coords_columns(self) -> usize {
        match self {
            SeqType::Nucleotide => 9,
            SeqType::Protein => 13,
        }
    }
}

impl FromStr for SeqType {
    type Err = GbkvizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nucleotide" => Ok(SeqType::Nucleotide),
            "protein" => Ok(SeqType::Protein),
            _ => Err(GbkvizError::InvalidSeqType(s.to_string())),
        }
    }
}

impl fmt::Display for SeqType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// delta-filter mapping mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapType {
    #[serde(rename = "one-to-one")]
    OneToOne,
    #[serde(rename = "many-to-many")]
    ManyToMany,
}

impl MapType {
    pub fn as_str(self) -> &'static str {
        match self {
            MapType::OneToOne => "one-to-one",
            MapType::ManyToMany => "many-to-many",
        }
    }

    pub fn filter_flag(self) -> &'static str {
        match self {
            MapType::OneToOne => "-1",
            MapType::ManyToMany => "-m",
        }
    }
}

impl FromStr for MapType {
    type Err = GbkvizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "one-to-one" => Ok(MapType::OneToOne),
            "many-to-many" => Ok(MapType::ManyToMany),
            _ => Err(GbkvizError::InvalidMapType(s.to_string())),
        }
    }
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 8-bit RGB color, written and parsed as `#RRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);
    pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);
    pub const BLUE: Rgb = Rgb::new(0x00, 0x00, 0xFF);
    pub const RED: Rgb = Rgb::new(0xFF, 0x00, 0x00);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear blend: `t = 0.0` gives `self`, `t = 1.0` gives `other`
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl FromStr for Rgb {
    type Err = GbkvizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(GbkvizError::InvalidColor(s.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| GbkvizError::InvalidColor(s.to_string()))
        };
        Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = GbkvizError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}
