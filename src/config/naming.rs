use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Rendering of the default qualified name of an observable type.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum NameStyle {
    /// `my_crate::shapes::Cheese`
    #[default]
    RustPath,
    /// `my_crate.shapes.Cheese`
    Dotted,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct NamingConfig {
    #[serde(default)]
    pub style: NameStyle,
}

impl NamingConfig {
    pub fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Qualified name for `type_name`, as reported by `std::any::type_name`.
    pub fn qualify(
        &self,
        type_name: &str,
    ) -> String {
        match self.style {
            NameStyle::RustPath => type_name.to_string(),
            NameStyle::Dotted => type_name.replace("::", "."),
        }
    }
}
