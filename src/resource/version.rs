//! Version identifiers for stored resources.
//!
//! Fresh versions are computed deterministically from resource content using
//! SHA-256, so two identical writes produce the same version. PATCH derives
//! the next version from the prior one by bumping a revision suffix, which
//! keeps the lineage visible in `meta.version`.
//!
//! ```rust
//! use scim_suite::resource::Version;
//!
//! let version = Version::from_content(br#"{"userName":"bjensen"}"#);
//! let patched = version.revised();
//! assert_eq!(patched.as_str(), format!("{}.1", version));
//! assert_eq!(patched.revised().as_str(), format!("{}.2", version));
//! ```

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD as BASE64};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Opaque version identifier carried in `meta.version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    /// Create a version from a content hash.
    pub fn from_content(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);
        let hash = hasher.finalize();
        // First 8 bytes keep the identifier short
        Self(format!("v{}", BASE64.encode(&hash[..8])))
    }

    /// Wrap a provider-supplied identifier verbatim.
    pub fn from_hash(hash_string: impl AsRef<str>) -> Self {
        Self(hash_string.as_ref().to_string())
    }

    /// The version that follows this one after a PATCH.
    ///
    /// `vX` becomes `vX.1`, `vX.1` becomes `vX.2`, and so on.
    pub fn revised(&self) -> Self {
        if let Some((base, revision)) = self.0.rsplit_once('.') {
            if let Ok(revision) = revision.parse::<u64>() {
                return Self(format!("{}.{}", base, revision + 1));
            }
        }
        Self(format!("{}.1", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
