use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::color::Color;
use crate::error::{RichTextError, RichTextResult};
use crate::linkify::LinkDetection;
use crate::overrides::TagStyles;
use crate::style::{FontStyle, FontWeight, StyleRecord, TextAlign};

/// Host-supplied rendering configuration.
///
/// Field names follow the host component props (camelCase). Every field has
/// a default, so partial documents are valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    pub font_size: f32,
    pub line_height: Option<f32>,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub font_family: Option<String>,
    pub letter_spacing: Option<f32>,
    pub text_align: TextAlign,
    pub color: Option<Color>,
    /// Explicit RTL flag from the host. When set it overrides `dir`
    /// attributes and detection.
    pub rtl: Option<bool>,
    /// System font scale (accessibility text size).
    pub font_scale: f32,
    /// Upper bound on `font_scale`. Values below 1 disable the cap.
    pub max_font_size_multiplier: Option<f32>,
    pub tag_styles: TagStyles,
    pub detect_links: LinkDetection,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            line_height: None,
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            font_family: None,
            letter_spacing: None,
            text_align: TextAlign::Auto,
            color: None,
            rtl: None,
            font_scale: 1.0,
            max_font_size_multiplier: None,
            tag_styles: TagStyles::default(),
            detect_links: LinkDetection::default(),
        }
    }
}

impl RenderConfig {
    pub fn from_yaml_str(yaml: &str) -> RichTextResult<Self> {
        let config: RenderConfig = serde_yaml::from_str(yaml)?;
        config.validated()
    }

    pub fn from_json_str(json: &str) -> RichTextResult<Self> {
        let config: RenderConfig = serde_json::from_str(json)?;
        config.validated()
    }

    /// Load from a `.json` file or, for any other extension, YAML.
    pub fn from_file(path: impl AsRef<Path>) -> RichTextResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| RichTextError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }

    fn validated(self) -> RichTextResult<Self> {
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(RichTextError::InvalidConfig {
                property: "fontSize".to_string(),
                reason: format!("must be a positive number, got {}", self.font_size),
            });
        }
        if !(self.font_scale.is_finite() && self.font_scale > 0.0) {
            return Err(RichTextError::InvalidConfig {
                property: "fontScale".to_string(),
                reason: format!("must be a positive number, got {}", self.font_scale),
            });
        }
        Ok(self)
    }

    /// Factor applied to every resolved font size.
    pub fn font_multiplier(&self) -> f32 {
        match self.max_font_size_multiplier {
            Some(max) if max >= 1.0 => self.font_scale.min(max),
            _ => self.font_scale,
        }
    }

    /// Style of text outside any element, before font scaling.
    pub fn base_style(&self) -> StyleRecord {
        StyleRecord {
            font_weight: self.font_weight,
            font_style: self.font_style,
            font_size: self.font_size,
            color: self.color,
            font_family: self.font_family.clone(),
            letter_spacing: self.letter_spacing,
            line_height: self.line_height,
            ..StyleRecord::default()
        }
    }
}
