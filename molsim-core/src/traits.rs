//! Small capability traits implemented across the molsim crates.

/// Identity derived from content. Equal content, equal hash.
pub trait ContentAddressable {
    /// Lowercase hex SHA-256 of the value's canonical bytes.
    fn content_hash(&self) -> String;
}

/// Anything ranked by a similarity score in `[0, 1]`.
pub trait Scored {
    fn score(&self) -> f64;
}

/// Anything with a display identifier (compound id, molecule title).
pub trait Annotated {
    fn name(&self) -> &str;
}

/// One-line, human-readable description.
pub trait Summarizable {
    fn summary(&self) -> String;
}
