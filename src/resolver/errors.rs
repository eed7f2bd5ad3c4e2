//! Resolution error types.

use thiserror::Error;

use crate::builder::BuildError;

/// Error during dependency resolution. Every variant is fatal to the
/// resolution of the current top-level package; partial dependency trees
/// are never returned.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no source provides `{package}`")]
    Unresolved { package: String },

    #[error(
        "`{package}` exists only in the custom repository, which cannot be installed from yet"
    )]
    UnsupportedSource { package: String },

    #[error("dependency cycle detected: {}", chain.join(" -> "))]
    Cycle { chain: Vec<String> },

    #[error("failed to build dependency `{package}`")]
    Build {
        package: String,
        #[source]
        source: BuildError,
    },

    #[error(transparent)]
    Source(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_names_the_chain() {
        let err = ResolveError::Cycle {
            chain: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert_eq!(err.to_string(), "dependency cycle detected: a -> b -> a");
    }

    #[test]
    fn test_build_error_is_in_the_source_chain() {
        let err = ResolveError::Build {
            package: "foo".to_string(),
            source: BuildError::Failed {
                program: "makepkg".to_string(),
                code: 2,
            },
        };

        let wrapped = anyhow::Error::from(err);
        assert!(wrapped
            .chain()
            .any(|cause| cause.downcast_ref::<BuildError>().is_some()));
    }
}
