/// Domain errors raised outside the validator layer.
///
/// Validator findings are never errors; they travel as data inside a
/// [`ValidationOutcome`](crate::validation::ValidationOutcome).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),
}
