//! Error types for request validation.

use thiserror::Error;

use crate::types::{RfType, TemplateType};

/// Result type alias using ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Caller mistakes detected before any projection work begins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("rf_type must be 'RF_ANTs' or 'RF_M3Z', got '{0}'")]
    InvalidRfType(String),

    #[error(
        "template_type must be one of {} when using rf_type={rf_type}, got '{template}'",
        format_template_list(.allowed)
    )]
    TemplateMismatch {
        rf_type: RfType,
        template: String,
        allowed: &'static [TemplateType],
    },

    #[error("out_type must be one of 'nii.gz', 'func.gii' or 'label.gii', got '{0}'")]
    InvalidOutputType(String),

    #[error("interp must be 'linear' or 'nearest', got '{0}'")]
    InvalidInterpolation(String),

    #[error("img must be a NIfTI image ending in either .nii.gz or .nii: {0}")]
    InvalidInputExtension(String),
}

impl ConfigError {
    /// The legal template set attached to a template mismatch, if any.
    pub fn allowed_templates(&self) -> Option<&'static [TemplateType]> {
        match self {
            ConfigError::TemplateMismatch { allowed, .. } => Some(allowed),
            _ => None,
        }
    }
}

/// Render a template list the way users see it on the command line,
/// e.g. `['MNI152_orig', 'Colin27_orig']`.
pub fn format_template_list(templates: &[TemplateType]) -> String {
    let quoted: Vec<String> = templates.iter().map(|t| format!("'{}'", t)).collect();
    format!("[{}]", quoted.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_message_lists_allowed_set() {
        let err = ConfigError::TemplateMismatch {
            rf_type: RfType::Ants,
            template: "Colin27_norm".to_string(),
            allowed: RfType::Ants.allowed_templates(),
        };
        let msg = err.to_string();
        assert!(msg.contains("['MNI152_orig', 'Colin27_orig']"), "{}", msg);
        assert!(msg.contains("rf_type=RF_ANTs"));
    }

    #[test]
    fn test_format_template_list_empty() {
        assert_eq!(format_template_list(&[]), "[]");
    }
}
