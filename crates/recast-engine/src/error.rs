use recast_core::error::Error;

/// Create a per-unit recipe execution error.
pub fn recipe_error(recipe: impl Into<String>, message: impl Into<String>) -> Error {
    Error::RecipeExecution {
        recipe: recipe.into(),
        message: message.into(),
    }
}

/// Create a malformed-tree error, fatal for the unit being visited.
pub fn malformed_tree(message: impl Into<String>) -> Error {
    Error::MalformedTree {
        message: message.into(),
    }
}

/// Create a configuration error, fatal for the whole run.
pub fn config_error(message: impl Into<String>) -> Error {
    Error::Config(message.into())
}
