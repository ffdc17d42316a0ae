//! Description normalization.

/// Canonicalize a raw transaction description.
///
/// Lower-cases the text and strips leading and trailing whitespace. Nothing
/// else is touched: punctuation, inner whitespace and digits are kept as-is.
///
/// ```
/// use loan_angel::analysis::normalize;
///
/// assert_eq!(normalize("  SALARY CREDIT - TCS \n"), "salary credit - tcs");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
