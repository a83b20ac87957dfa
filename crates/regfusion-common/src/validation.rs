//! Request validation and the label-output interpolation rule.
//!
//! Validation is a pure function of the request. The one place where a
//! setting is overridden instead of rejected (label output forces nearest
//! interpolation) is expressed by [`resolve_interp`], which hands back the
//! effective mode together with a [`Diagnostic`] for the caller to emit.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigResult;
use crate::family::MappingFamily;
use crate::types::{Interpolation, OutputType, RfType, TemplateType};

/// Non-fatal notice produced while preparing a projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The requested interpolation was replaced for label output.
    InterpolationCoerced {
        requested: Interpolation,
        effective: Interpolation,
    },
    /// An in-memory image carried no file name to derive a prefix from.
    MissingFilename,
    /// The output names will not carry an input-derived prefix.
    EmptyPrefix,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::InterpolationCoerced { effective, .. } => {
                write!(f, "interp set to '{}' with out_type 'label.gii'", effective)
            }
            Diagnostic::MissingFilename => f.write_str("input image has no associated filename"),
            Diagnostic::EmptyPrefix => {
                f.write_str("prefix is empty and will not be included in output files")
            }
        }
    }
}

/// Decide the interpolation actually used for an output type.
///
/// Label surfaces must carry values that exist in the input, so any
/// blending mode is replaced by nearest-neighbour and a diagnostic is
/// returned.
pub fn resolve_interp(
    requested: Interpolation,
    out_type: OutputType,
) -> (Interpolation, Option<Diagnostic>) {
    if out_type == OutputType::LabelSurface && requested != Interpolation::Nearest {
        let effective = Interpolation::Nearest;
        (
            effective,
            Some(Diagnostic::InterpolationCoerced {
                requested,
                effective,
            }),
        )
    } else {
        (requested, None)
    }
}

/// What the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionRequest {
    pub template_type: TemplateType,
    pub rf_type: RfType,
    pub interp: Interpolation,
    pub out_type: OutputType,
}

impl Default for ProjectionRequest {
    fn default() -> Self {
        Self {
            template_type: TemplateType::Mni152Orig,
            rf_type: RfType::Ants,
            interp: Interpolation::Linear,
            out_type: OutputType::Volumetric,
        }
    }
}

impl ProjectionRequest {
    /// Build a request from user-facing names. Checks run in a fixed order:
    /// rf_type, template_type, out_type, interpolation.
    pub fn parse(
        template_type: &str,
        rf_type: &str,
        interp: &str,
        out_type: &str,
    ) -> ConfigResult<Self> {
        let family = MappingFamily::parse(rf_type, template_type)?;
        let out_type = out_type.parse()?;
        let interp = interp.parse()?;
        Ok(Self {
            template_type: family.template(),
            rf_type: family.rf_type(),
            interp,
            out_type,
        })
    }

    /// Validate the request and resolve the effective interpolation.
    pub fn validate(&self) -> ConfigResult<ValidatedRequest> {
        let family = MappingFamily::new(self.rf_type, self.template_type)?;
        let (interp, diagnostic) = resolve_interp(self.interp, self.out_type);
        Ok(ValidatedRequest {
            family,
            interp,
            out_type: self.out_type,
            diagnostics: diagnostic.into_iter().collect(),
        })
    }
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub family: MappingFamily,
    /// Interpolation after the label-output rule was applied.
    pub interp: Interpolation,
    pub out_type: OutputType,
    pub diagnostics: Vec<Diagnostic>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn test_label_forces_nearest_with_warning() {
        let (interp, diag) = resolve_interp(Interpolation::Linear, OutputType::LabelSurface);
        assert_eq!(interp, Interpolation::Nearest);
        assert_eq!(
            diag,
            Some(Diagnostic::InterpolationCoerced {
                requested: Interpolation::Linear,
                effective: Interpolation::Nearest,
            })
        );
    }

    #[test]
    fn test_label_with_nearest_is_silent() {
        let (interp, diag) = resolve_interp(Interpolation::Nearest, OutputType::LabelSurface);
        assert_eq!(interp, Interpolation::Nearest);
        assert!(diag.is_none());
    }

    #[test]
    fn test_other_outputs_keep_requested_interp() {
        for out in [OutputType::Volumetric, OutputType::FuncSurface] {
            for interp in [Interpolation::Linear, Interpolation::Nearest] {
                assert_eq!(resolve_interp(interp, out), (interp, None));
            }
        }
    }

    #[test]
    fn test_default_request_is_valid() {
        let validated = ProjectionRequest::default().validate().unwrap();
        assert_eq!(validated.family, MappingFamily::AntsMni152);
        assert_eq!(validated.interp, Interpolation::Linear);
        assert!(validated.diagnostics.is_empty());
    }

    #[test]
    fn test_validate_label_request_reports_coercion() {
        let request = ProjectionRequest {
            out_type: OutputType::LabelSurface,
            ..Default::default()
        };
        let validated = request.validate().unwrap();
        assert_eq!(validated.interp, Interpolation::Nearest);
        assert_eq!(validated.diagnostics.len(), 1);
        assert!(validated.diagnostics[0].to_string().contains("nearest"));
    }

    #[test]
    fn test_validate_rejects_mismatched_template() {
        let request = ProjectionRequest {
            rf_type: RfType::M3z,
            template_type: TemplateType::Mni152Orig,
            ..Default::default()
        };
        assert!(matches!(
            request.validate(),
            Err(ConfigError::TemplateMismatch { .. })
        ));
    }

    #[test]
    fn test_parse_reports_errors_in_order() {
        assert!(matches!(
            ProjectionRequest::parse("MNI152_orig", "RF_X", "cubic", "mgz"),
            Err(ConfigError::InvalidRfType(_))
        ));
        assert!(matches!(
            ProjectionRequest::parse("MNI152_orig", "RF_ANTs", "cubic", "mgz"),
            Err(ConfigError::InvalidOutputType(_))
        ));
        assert!(matches!(
            ProjectionRequest::parse("MNI152_orig", "RF_ANTs", "cubic", "func.gii"),
            Err(ConfigError::InvalidInterpolation(_))
        ));
        let ok = ProjectionRequest::parse("Colin27_norm", "RF_M3Z", "nearest", "func.gii").unwrap();
        assert_eq!(ok.template_type, TemplateType::Colin27Norm);
        assert_eq!(ok.out_type, OutputType::FuncSurface);
    }
}
