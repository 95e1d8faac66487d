//! Validation of operator-supplied values.
//!
//! Document and image ids end up in file names under `.annotrack/images/`,
//! so they are restricted to a path-safe alphabet before any path is built.

use anyhow::{bail, Context, Result};

use crate::models::BoundingBox;

/// Maximum allowed length for document and image ids.
pub const MAX_ID_LENGTH: usize = 128;

/// Reserved names that cannot be used as IDs (case-insensitive).
const RESERVED_NAMES: &[&str] = &[
    ".", "..", "con", "prn", "aux", "nul", "com1", "com2", "com3", "com4", "com5", "com6", "com7",
    "com8", "com9", "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
];

/// Validates that an ID is safe for use in file paths.
///
/// An ID is valid if it is non-empty, at most [`MAX_ID_LENGTH`] characters,
/// made only of ASCII alphanumerics, dashes, underscores and dots, does not
/// start with a dot, and is not a reserved system name.
///
/// ```
/// use annotrack::validation::validate_id;
///
/// assert!(validate_id("H1xQ2Zk9pX").is_ok());
/// assert!(validate_id("forum_2024-3").is_ok());
/// assert!(validate_id("2301.00001v2").is_ok());
/// assert!(validate_id("").is_err());
/// assert!(validate_id("../etc/passwd").is_err());
/// ```
pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        bail!("ID cannot be empty");
    }

    if id.len() > MAX_ID_LENGTH {
        bail!(
            "ID too long: {} characters (max {})",
            id.len(),
            MAX_ID_LENGTH
        );
    }

    let valid_chars = id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !valid_chars {
        bail!("ID '{id}' contains invalid characters. Use only alphanumeric characters, dashes (-), underscores (_), and dots (.)");
    }

    if id.starts_with('.') {
        bail!("ID '{id}' cannot start with a dot");
    }

    let id_lower = id.to_lowercase();
    if RESERVED_NAMES.contains(&id_lower.as_str()) {
        bail!("ID '{id}' uses a reserved name");
    }

    Ok(())
}

/// Parse `x,y,width,height` into a bounding box with positive extent.
pub fn parse_bbox(s: &str) -> Result<BoundingBox> {
    let values = s
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .with_context(|| format!("Invalid bounding box value '{}'", part.trim()))
        })
        .collect::<Result<Vec<f64>>>()?;

    let &[x, y, width, height] = values.as_slice() else {
        bail!(
            "Invalid bounding box: {s}. Expected four comma-separated numbers: x,y,width,height"
        );
    };

    if values.iter().any(|v| !v.is_finite()) {
        bail!("Invalid bounding box: {s}. Values must be finite");
    }
    if width <= 0.0 || height <= 0.0 {
        bail!("Invalid bounding box: {s}. Width and height must be positive");
    }

    Ok(BoundingBox {
        x,
        y,
        width,
        height,
    })
}

/// Clap value parser for validating ID arguments.
///
/// ```ignore
/// #[arg(long, value_parser = clap_id_validator)]
/// document: String,
/// ```
pub fn clap_id_validator(s: &str) -> Result<String, String> {
    validate_id(s).map_err(|e| e.to_string())?;
    Ok(s.to_string())
}

/// Clap value parser for `--bbox x,y,width,height`.
pub fn clap_bbox_parser(s: &str) -> Result<BoundingBox, String> {
    parse_bbox(s).map_err(|e| format!("{e:#}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id_valid() {
        assert!(validate_id("paper-001").is_ok());
        assert!(validate_id("forum_2024").is_ok());
        assert!(validate_id("H1xQ2Zk9pX_3_ab12cd34").is_ok());
        assert!(validate_id("a").is_ok());
        assert!(validate_id("2301.00001v2").is_ok());
    }

    #[test]
    fn test_validate_id_empty() {
        let result = validate_id("");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_validate_id_too_long() {
        let long_id = "a".repeat(MAX_ID_LENGTH + 1);
        let result = validate_id(&long_id);
        assert!(result.unwrap_err().to_string().contains("too long"));
    }

    #[test]
    fn test_validate_id_invalid_chars() {
        assert!(validate_id("paper/001").is_err());
        assert!(validate_id("../passwd").is_err());
        assert!(validate_id("paper 001").is_err());
        assert!(validate_id(".hidden").is_err());
    }

    #[test]
    fn test_validate_id_reserved_names() {
        assert!(validate_id("..").is_err());
        assert!(validate_id("CON").is_err());
        assert!(validate_id("nul").is_err());
    }

    #[test]
    fn test_parse_bbox() {
        let bbox = parse_bbox("10, 20.5,100,50").unwrap();
        assert_eq!(bbox.x, 10.0);
        assert_eq!(bbox.y, 20.5);
        assert_eq!(bbox.width, 100.0);
        assert_eq!(bbox.height, 50.0);
    }

    #[test]
    fn test_parse_bbox_rejects_bad_input() {
        assert!(parse_bbox("1,2,3").is_err());
        assert!(parse_bbox("1,2,3,4,5").is_err());
        assert!(parse_bbox("a,2,3,4").is_err());
        assert!(parse_bbox("1,2,0,4").is_err());
        assert!(parse_bbox("1,2,-3,4").is_err());
        assert!(parse_bbox("NaN,2,3,4").is_err());
    }

    #[test]
    fn test_clap_validators() {
        assert!(clap_id_validator("valid-id").is_ok());
        assert!(clap_id_validator("2301.00001v2").is_ok());
        assert!(clap_id_validator("../invalid").is_err());
        assert!(clap_bbox_parser("0,0,1,1").is_ok());
        assert!(clap_bbox_parser("0,0").is_err());
    }
}
