//! Closed enumerations describing a projection request.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Cortical hemisphere of the target surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Hemisphere {
    #[serde(rename = "lh")]
    Left,
    #[serde(rename = "rh")]
    Right,
}

impl Hemisphere {
    /// Both hemispheres, left first.
    pub const ALL: [Hemisphere; 2] = [Hemisphere::Left, Hemisphere::Right];

    /// FreeSurfer-style hemisphere tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Hemisphere::Left => "lh",
            Hemisphere::Right => "rh",
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Registration-fusion family used to build the mapping tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RfType {
    /// Registrations carried out with ANTs.
    #[serde(rename = "RF_ANTs")]
    Ants,
    /// Registrations carried out with FreeSurfer (m3z warps).
    #[serde(rename = "RF_M3Z")]
    M3z,
}

impl RfType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RfType::Ants => "RF_ANTs",
            RfType::M3z => "RF_M3Z",
        }
    }

    /// Templates for which mapping tables exist under this family.
    pub fn allowed_templates(&self) -> &'static [TemplateType] {
        match self {
            RfType::Ants => &[TemplateType::Mni152Orig, TemplateType::Colin27Orig],
            RfType::M3z => &[TemplateType::Mni152Norm, TemplateType::Colin27Norm],
        }
    }
}

impl Default for RfType {
    fn default() -> Self {
        Self::Ants
    }
}

impl FromStr for RfType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RF_ANTs" => Ok(RfType::Ants),
            "RF_M3Z" => Ok(RfType::M3z),
            _ => Err(ConfigError::InvalidRfType(s.to_string())),
        }
    }
}

impl fmt::Display for RfType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Volumetric template the mapping tables were generated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TemplateType {
    #[serde(rename = "MNI152_orig")]
    Mni152Orig,
    #[serde(rename = "Colin27_orig")]
    Colin27Orig,
    #[serde(rename = "MNI152_norm")]
    Mni152Norm,
    #[serde(rename = "Colin27_norm")]
    Colin27Norm,
}

impl TemplateType {
    pub const ALL: [TemplateType; 4] = [
        TemplateType::Mni152Orig,
        TemplateType::Colin27Orig,
        TemplateType::Mni152Norm,
        TemplateType::Colin27Norm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateType::Mni152Orig => "MNI152_orig",
            TemplateType::Colin27Orig => "Colin27_orig",
            TemplateType::Mni152Norm => "MNI152_norm",
            TemplateType::Colin27Norm => "Colin27_norm",
        }
    }

    /// Parse an exact template name. Returns `None` for unknown names so the
    /// caller can report the legal set of the chosen rf_type.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl Default for TemplateType {
    fn default() -> Self {
        Self::Mni152Orig
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interpolation used when sampling the volume at vertex positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Trilinear blend of the 8 surrounding voxels.
    #[default]
    Linear,
    /// Value of the closest voxel (preserves exact values).
    Nearest,
}

impl Interpolation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interpolation::Linear => "linear",
            Interpolation::Nearest => "nearest",
        }
    }
}

impl FromStr for Interpolation {
    type Err = ConfigError;

    /// Parse from string (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(Interpolation::Linear),
            "nearest" => Ok(Interpolation::Nearest),
            _ => Err(ConfigError::InvalidInterpolation(s.to_string())),
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Container written for each hemisphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OutputType {
    /// NIfTI-1 volume, gzip compressed.
    #[default]
    #[serde(rename = "nii.gz")]
    Volumetric,
    /// GIFTI with floating-point per-vertex values.
    #[serde(rename = "func.gii")]
    FuncSurface,
    /// GIFTI with integer per-vertex labels.
    #[serde(rename = "label.gii")]
    LabelSurface,
}

impl OutputType {
    /// File extension (without leading dot) of the written container.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputType::Volumetric => "nii.gz",
            OutputType::FuncSurface => "func.gii",
            OutputType::LabelSurface => "label.gii",
        }
    }

    pub fn is_surface(&self) -> bool {
        matches!(self, OutputType::FuncSurface | OutputType::LabelSurface)
    }
}

impl FromStr for OutputType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nii.gz" | "nifti" | "volumetric" => Ok(OutputType::Volumetric),
            "func.gii" | "func" => Ok(OutputType::FuncSurface),
            "label.gii" | "label" => Ok(OutputType::LabelSurface),
            _ => Err(ConfigError::InvalidOutputType(s.to_string())),
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rf_type_from_str() {
        assert_eq!("RF_ANTs".parse::<RfType>().unwrap(), RfType::Ants);
        assert_eq!("RF_M3Z".parse::<RfType>().unwrap(), RfType::M3z);
        assert_eq!(
            "rf_ants".parse::<RfType>(),
            Err(ConfigError::InvalidRfType("rf_ants".to_string()))
        );
    }

    #[test]
    fn test_template_parse_is_exact() {
        assert_eq!(TemplateType::parse("MNI152_orig"), Some(TemplateType::Mni152Orig));
        assert_eq!(TemplateType::parse("Colin27_norm"), Some(TemplateType::Colin27Norm));
        assert_eq!(TemplateType::parse("mni152_orig"), None);
        assert_eq!(TemplateType::parse(""), None);
    }

    #[test]
    fn test_interpolation_from_str() {
        assert_eq!("linear".parse::<Interpolation>().unwrap(), Interpolation::Linear);
        assert_eq!("NEAREST".parse::<Interpolation>().unwrap(), Interpolation::Nearest);
        assert!("cubic".parse::<Interpolation>().is_err());
    }

    #[test]
    fn test_output_type_aliases() {
        assert_eq!("nii.gz".parse::<OutputType>().unwrap(), OutputType::Volumetric);
        assert_eq!("nifti".parse::<OutputType>().unwrap(), OutputType::Volumetric);
        assert_eq!("func.gii".parse::<OutputType>().unwrap(), OutputType::FuncSurface);
        assert_eq!("label".parse::<OutputType>().unwrap(), OutputType::LabelSurface);
        assert!("mgz".parse::<OutputType>().is_err());
    }

    #[test]
    fn test_output_type_extension() {
        assert_eq!(OutputType::Volumetric.extension(), "nii.gz");
        assert_eq!(OutputType::FuncSurface.extension(), "func.gii");
        assert_eq!(OutputType::LabelSurface.extension(), "label.gii");
        assert!(!OutputType::Volumetric.is_surface());
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&RfType::M3z).unwrap();
        assert_eq!(json, "\"RF_M3Z\"");
        let tpl: TemplateType = serde_json::from_str("\"Colin27_orig\"").unwrap();
        assert_eq!(tpl, TemplateType::Colin27Orig);
        let out: OutputType = serde_json::from_str("\"label.gii\"").unwrap();
        assert_eq!(out, OutputType::LabelSurface);
    }
}
