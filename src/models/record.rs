//! Task records: the stored outcome of one sub-task, completed or skipped.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Kind of inconsistency, from a fixed label set
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    FigureText,
    FigureFigure,
    FigureTable,
    TableText,
    TableTable,
    EquationText,
    /// Caption disagrees with the element it describes
    Caption,
    /// Inconsistency inside a single element
    Only,
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::FigureText,
        Category::FigureFigure,
        Category::FigureTable,
        Category::TableText,
        Category::TableTable,
        Category::EquationText,
        Category::Caption,
        Category::Only,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::FigureText => "figure_text",
            Category::FigureFigure => "figure_figure",
            Category::FigureTable => "figure_table",
            Category::TableText => "table_text",
            Category::TableTable => "table_table",
            Category::EquationText => "equation_text",
            Category::Caption => "caption",
            Category::Only => "only",
            Category::Other => "other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| {
                let valid: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
                anyhow::anyhow!("Invalid category: {s}. Valid values: {}", valid.join(", "))
            })
    }
}

/// Region of a page image, in page pixel coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImagePart {
    pub page: u32,
    /// Opaque reference returned by the image store.
    pub image_id: String,
    pub bbox: BoundingBox,
    /// Transient inline payload from the editor. Never checkpointed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextPart {
    pub page: u32,
    pub content: String,
    pub line: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InconsistencyPart {
    Image(ImagePart),
    Text(TextPart),
}

impl InconsistencyPart {
    pub fn page(&self) -> u32 {
        match self {
            InconsistencyPart::Image(part) => part.page,
            InconsistencyPart::Text(part) => part.page,
        }
    }

    pub fn image_id(&self) -> Option<&str> {
        match self {
            InconsistencyPart::Image(part) => Some(part.image_id.as_str()),
            InconsistencyPart::Text(_) => None,
        }
    }

    /// Copy of this part with any inline image payload removed.
    pub fn stripped(&self) -> Self {
        match self {
            InconsistencyPart::Image(part) => InconsistencyPart::Image(ImagePart {
                image_data: None,
                ..part.clone()
            }),
            InconsistencyPart::Text(part) => InconsistencyPart::Text(part.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TaskRecord {
    #[serde(default)]
    pub inconsistency_parts: Vec<InconsistencyPart>,
    #[serde(default)]
    pub review_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skipped: bool,
}

impl TaskRecord {
    pub fn new(
        parts: Vec<InconsistencyPart>,
        review_text: impl Into<String>,
        category: Category,
        description: impl Into<String>,
    ) -> Self {
        Self {
            inconsistency_parts: parts,
            review_text: review_text.into(),
            category: Some(category),
            description: description.into(),
            skipped: false,
        }
    }

    /// A skipped record: no content, but it still occupies its position.
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    pub fn stripped(&self) -> Self {
        Self {
            inconsistency_parts: self
                .inconsistency_parts
                .iter()
                .map(InconsistencyPart::stripped)
                .collect(),
            ..self.clone()
        }
    }

    pub fn image_ids(&self) -> impl Iterator<Item = &str> {
        self.inconsistency_parts
            .iter()
            .filter_map(InconsistencyPart::image_id)
    }

    /// Check structural completeness. Content itself is not judged.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.skipped {
            let has_content = !self.inconsistency_parts.is_empty()
                || !self.review_text.is_empty()
                || !self.description.is_empty()
                || self.category.is_some();
            if has_content {
                return Err(EngineError::InvalidRecord(
                    "a skipped record must not carry annotation content".to_string(),
                ));
            }
            return Ok(());
        }

        if self.inconsistency_parts.is_empty() {
            return Err(EngineError::InvalidRecord(
                "at least one inconsistency part is required".to_string(),
            ));
        }
        if self.category.is_none() {
            return Err(EngineError::InvalidRecord("category is required".to_string()));
        }
        if self.description.trim().is_empty() {
            return Err(EngineError::InvalidRecord(
                "description is required".to_string(),
            ));
        }

        for (i, part) in self.inconsistency_parts.iter().enumerate() {
            if part.page() == 0 {
                return Err(EngineError::InvalidRecord(format!(
                    "part {i}: page numbers start at 1"
                )));
            }
            match part {
                InconsistencyPart::Image(image) if image.image_id.trim().is_empty() => {
                    return Err(EngineError::InvalidRecord(format!(
                        "part {i}: image part has no image_id"
                    )));
                }
                InconsistencyPart::Text(text) if text.content.trim().is_empty() => {
                    return Err(EngineError::InvalidRecord(format!(
                        "part {i}: text part has no content"
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }
}
