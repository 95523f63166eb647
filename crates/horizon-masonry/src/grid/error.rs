//! Error types for the grid.

use thiserror::Error;

/// Errors raised while configuring a grid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The builder was not given a collection.
    #[error("a masonry grid requires a collection")]
    MissingCollection,

    /// The builder was not given a container.
    #[error("a masonry grid requires a container")]
    MissingContainer,

    /// The builder was not given a view factory.
    #[error("a masonry grid requires a view factory")]
    MissingViewFactory,

    /// The column count was zero.
    #[error("invalid column count: {0} (must be at least 1)")]
    InvalidColumnCount(usize),

    /// The gutter was negative or not finite.
    #[error("invalid gutter: {0} (must be finite and non-negative)")]
    InvalidGutter(f32),

    /// Settings text could not be parsed.
    #[error("failed to parse grid configuration: {0}")]
    Parse(String),
}

/// Errors that can occur while driving a masonry grid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// The grid's configuration is incomplete or invalid.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// No view constructor is registered for an item's type tag.
    #[error("no view constructor registered for type tag `{type_tag}`")]
    MissingViewConstructor { type_tag: String },

    /// The grid has been torn down with `remove()`.
    #[error("the grid has been removed")]
    Removed,
}

/// Result type for grid operations.
pub type GridResult<T> = Result<T, GridError>;
