use crate::js::ParseError;
use thiserror::Error;

/// Errors raised while compiling a card template
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    #[error(transparent)]
    Syntax(#[from] ParseError),

    #[error("precompileTemplate needs two arguments")]
    MissingArguments,

    #[error("must be a string literal or template literal")]
    TemplateNotString,

    #[error("must not contain expressions")]
    TemplateHasExpressions,

    #[error("must be an object expression")]
    OptionsNotObject,

    #[error("Card Template precompileOptions requires strictMode to be true")]
    StrictModeRequired,

    #[error("BUG: component scope is not a function and it should be")]
    InvalidScope,

    #[error("{module} does not call precompileTemplate in its default export")]
    MissingTemplate { module: String },

    #[error("unknown field {path} in {module}")]
    UnknownField { path: String, module: String },

    #[error("invalid @format \"{value}\" on {path} in {module}")]
    InvalidFormat {
        value: String,
        path: String,
        module: String,
    },

    #[error("{path} in {module} needs an explicit @format; edit templates have no default nested format")]
    MissingNestedFormat { path: String, module: String },

    #[error("<@fields.{path}> in {module} must be self-closing")]
    NotSelfClosing { path: String, module: String },

    #[error("@fields can only be invoked as a component or iterated with #each in {module}")]
    UnsupportedFieldsUsage { module: String },
}
