use crate::js::ParseError;
use thiserror::Error;

/// Errors raised while extracting a schema
///
/// `kind` is the annotation's name as exported by the types module
/// (`adopts`, `contains`, ...), regardless of the local import alias.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error(transparent)]
    Syntax(#[from] ParseError),

    #[error("schema must have a default-exported class")]
    MissingDefaultClass,

    #[error("@adopts decorator can only be used on a class")]
    AdoptsOnProperty,

    #[error("@{kind} decorator can only be used on a class property")]
    FieldNotOnProperty { kind: String },

    #[error("@{kind} decorator cannot be used on a private field")]
    PrivateField { kind: String },

    #[error("@{kind} decorator can only be used in the default-exported class")]
    OutsideDefaultClass { kind: String },

    #[error("@{kind} decorator accepts exactly one argument")]
    ArgumentCount { kind: String },

    #[error("@{kind} argument must be an identifier")]
    ArgumentNotIdentifier { kind: String },

    #[error("@{kind} argument is not defined")]
    ArgumentUndefined { kind: String },

    #[error("@{kind} argument must come from a module default export")]
    ArgumentNotDefaultImport { kind: String },

    #[error("@adopts decorator can only be used once per class")]
    DuplicateAdopts,

    #[error("duplicate field {name}")]
    DuplicateField { name: String },

    #[error("cannot resolve card URL {specifier}: {message}")]
    InvalidCardUrl { specifier: String, message: String },
}
