//! Legal (rf_type, template_type) combinations and mapping table keys.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ConfigError, ConfigResult};
use crate::types::{Hemisphere, RfType, TemplateType};

/// A validated pairing of registration-fusion family and template.
///
/// Only the four combinations with published mapping tables can be
/// constructed, so holding a `MappingFamily` is proof the pair is legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MappingFamily {
    AntsMni152,
    AntsColin27,
    M3zMni152,
    M3zColin27,
}

impl MappingFamily {
    pub const ALL: [MappingFamily; 4] = [
        MappingFamily::AntsMni152,
        MappingFamily::AntsColin27,
        MappingFamily::M3zMni152,
        MappingFamily::M3zColin27,
    ];

    /// Pair an rf_type with a template, rejecting combinations that have no
    /// mapping tables.
    pub fn new(rf_type: RfType, template: TemplateType) -> ConfigResult<Self> {
        match (rf_type, template) {
            (RfType::Ants, TemplateType::Mni152Orig) => Ok(Self::AntsMni152),
            (RfType::Ants, TemplateType::Colin27Orig) => Ok(Self::AntsColin27),
            (RfType::M3z, TemplateType::Mni152Norm) => Ok(Self::M3zMni152),
            (RfType::M3z, TemplateType::Colin27Norm) => Ok(Self::M3zColin27),
            _ => Err(ConfigError::TemplateMismatch {
                rf_type,
                template: template.to_string(),
                allowed: rf_type.allowed_templates(),
            }),
        }
    }

    /// Parse both names in the order the checks are reported: rf_type first,
    /// then the template against the legal set of that rf_type.
    pub fn parse(rf_type: &str, template: &str) -> ConfigResult<Self> {
        let rf_type: RfType = rf_type.parse()?;
        match TemplateType::parse(template) {
            Some(t) => Self::new(rf_type, t),
            None => Err(ConfigError::TemplateMismatch {
                rf_type,
                template: template.to_string(),
                allowed: rf_type.allowed_templates(),
            }),
        }
    }

    pub fn rf_type(&self) -> RfType {
        match self {
            Self::AntsMni152 | Self::AntsColin27 => RfType::Ants,
            Self::M3zMni152 | Self::M3zColin27 => RfType::M3z,
        }
    }

    pub fn template(&self) -> TemplateType {
        match self {
            Self::AntsMni152 => TemplateType::Mni152Orig,
            Self::AntsColin27 => TemplateType::Colin27Orig,
            Self::M3zMni152 => TemplateType::Mni152Norm,
            Self::M3zColin27 => TemplateType::Colin27Norm,
        }
    }

    /// `{rf_type}_{template}_to_fsaverage`, shared by mapping and output names.
    pub fn stem(&self) -> String {
        format!("{}_{}_to_fsaverage", self.rf_type(), self.template())
    }
}

impl Default for MappingFamily {
    fn default() -> Self {
        Self::AntsMni152
    }
}

impl fmt::Display for MappingFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.rf_type(), self.template())
    }
}

/// Identifies one mapping table: hemisphere × family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MappingKey {
    pub hemisphere: Hemisphere,
    pub family: MappingFamily,
}

impl MappingKey {
    pub fn new(hemisphere: Hemisphere, family: MappingFamily) -> Self {
        Self { hemisphere, family }
    }

    /// Both hemisphere keys for a family, left first.
    pub fn pair(family: MappingFamily) -> [MappingKey; 2] {
        Hemisphere::ALL.map(|h| MappingKey::new(h, family))
    }

    /// Name of the table file inside a mapping directory.
    pub fn file_name(&self) -> String {
        format!("{}.avgMapping_allSub_{}.txt", self.hemisphere, self.family.stem())
    }
}

impl fmt::Display for MappingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hemisphere, self.family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_legal_pairs_accepted() {
        for rf in [RfType::Ants, RfType::M3z] {
            for &template in rf.allowed_templates() {
                let family = MappingFamily::new(rf, template).unwrap();
                assert_eq!(family.rf_type(), rf);
                assert_eq!(family.template(), template);
            }
        }
    }

    #[test]
    fn test_all_illegal_pairs_rejected_with_legal_set() {
        for rf in [RfType::Ants, RfType::M3z] {
            for template in TemplateType::ALL {
                if rf.allowed_templates().contains(&template) {
                    continue;
                }
                let err = MappingFamily::new(rf, template).unwrap_err();
                assert_eq!(err.allowed_templates(), Some(rf.allowed_templates()));
            }
        }
    }

    #[test]
    fn test_ants_with_norm_template_lists_orig_templates() {
        let err = MappingFamily::parse("RF_ANTs", "Colin27_norm").unwrap_err();
        assert_eq!(
            err.allowed_templates(),
            Some(&[TemplateType::Mni152Orig, TemplateType::Colin27Orig][..])
        );
        assert!(err.to_string().contains("['MNI152_orig', 'Colin27_orig']"));
    }

    #[test]
    fn test_parse_checks_rf_type_first() {
        let err = MappingFamily::parse("RF_FOO", "not_a_template").unwrap_err();
        assert_eq!(err, ConfigError::InvalidRfType("RF_FOO".to_string()));
    }

    #[test]
    fn test_parse_unknown_template_reports_legal_set() {
        let err = MappingFamily::parse("RF_M3Z", "fsaverage").unwrap_err();
        assert_eq!(
            err.allowed_templates(),
            Some(&[TemplateType::Mni152Norm, TemplateType::Colin27Norm][..])
        );
    }

    #[test]
    fn test_mapping_file_name() {
        let key = MappingKey::new(Hemisphere::Left, MappingFamily::AntsMni152);
        assert_eq!(
            key.file_name(),
            "lh.avgMapping_allSub_RF_ANTs_MNI152_orig_to_fsaverage.txt"
        );
        let key = MappingKey::new(Hemisphere::Right, MappingFamily::M3zColin27);
        assert_eq!(
            key.file_name(),
            "rh.avgMapping_allSub_RF_M3Z_Colin27_norm_to_fsaverage.txt"
        );
    }

    #[test]
    fn test_pair_is_left_then_right() {
        let [lh, rh] = MappingKey::pair(MappingFamily::M3zMni152);
        assert_eq!(lh.hemisphere, Hemisphere::Left);
        assert_eq!(rh.hemisphere, Hemisphere::Right);
        assert_eq!(lh.family, rh.family);
    }
}
