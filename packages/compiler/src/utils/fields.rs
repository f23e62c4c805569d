//! Field path lookup and field-set hashing

use crate::models::{Field, Fields};
use crate::utils::basename_and_extension;
use sha2::{Digest, Sha256};

/// Walk a dotted field path (`"author.bestFriend.species"`) through nested field cards
pub fn field_for_path<'a>(fields: &'a Fields, path: &str) -> Option<&'a Field> {
    let mut segments = path.split('.');
    let mut field = fields.get(segments.next()?)?;
    for segment in segments {
        field = field.card.fields.get(segment)?;
    }
    Some(field)
}

/// Module path for a component compiled against a specific field set
///
/// The name embeds a digest of every field name and field card URL, so the same
/// template compiled against the same fields always lands on the same module.
pub fn hashed_module_path(local_file: &str, fields: &Fields) -> String {
    let mut hasher = Sha256::new();
    for (name, field) in fields {
        hasher.update(name.as_bytes());
        hasher.update(field.card.url.as_bytes());
    }
    let digest = hasher.finalize();

    let hash: String = digest[..16].iter().map(|byte| format!("{:02x}", byte)).collect();

    let (basename, extension) = basename_and_extension(local_file);
    format!("{}-{}{}", basename, hash, extension)
}
