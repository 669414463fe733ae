pub mod model;
pub mod status;

/// Not part of the schema.
pub struct Settings {
    pub endpoint: String,
}
