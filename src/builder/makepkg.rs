//! makepkg invocation.

use std::path::{Path, PathBuf};

use crate::builder::{BuildError, BuildRunner};
use crate::util::process::{find_executable, ProcessBuilder};

/// Runs `makepkg` against a recipe checkout.
///
/// Finished artifacts land in the configured artifacts directory via
/// `PKGDEST`; `PATH` is pinned to the system directories so the build does
/// not pick up tools from the invoking user's environment.
pub struct MakepkgRunner {
    program: PathBuf,
    artifacts_dir: PathBuf,
}

impl MakepkgRunner {
    pub fn new(artifacts_dir: impl Into<PathBuf>) -> Self {
        let program = find_executable("makepkg").unwrap_or_else(|| PathBuf::from("makepkg"));
        MakepkgRunner {
            program,
            artifacts_dir: artifacts_dir.into(),
        }
    }

    /// Override the makepkg program.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }
}

impl BuildRunner for MakepkgRunner {
    fn build(&self, recipe_dir: &Path, install: bool) -> Result<(), BuildError> {
        let mut builder = ProcessBuilder::new(&self.program)
            .args(["-s", "-C", "--noconfirm"])
            .env("PKGDEST", self.artifacts_dir.to_string_lossy())
            .env("PATH", "/usr/local/bin:/usr/local/sbin:/usr/bin")
            .cwd(recipe_dir);
        if install {
            builder = builder.arg("-i");
        }

        let program = self.program.display().to_string();
        let output = builder.stream().map_err(|source| BuildError::Spawn {
            program: program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(BuildError::Failed {
                program,
                code: output.status.code().unwrap_or(-1),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_nonzero_exit_is_a_build_failure() {
        let tmp = TempDir::new().unwrap();
        // Stand in for makepkg with a tool that always fails
        let runner = MakepkgRunner::new(tmp.path()).with_program("false");

        let err = runner.build(tmp.path(), false).unwrap_err();
        match err {
            BuildError::Failed { code, .. } => assert_ne!(code, 0),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_program_is_a_spawn_failure() {
        let tmp = TempDir::new().unwrap();
        let runner =
            MakepkgRunner::new(tmp.path()).with_program("/nonexistent/slipway-test-makepkg");

        let err = runner.build(tmp.path(), false).unwrap_err();
        assert!(matches!(err, BuildError::Spawn { .. }));
    }

    #[test]
    fn test_successful_build() {
        let tmp = TempDir::new().unwrap();
        let runner = MakepkgRunner::new(tmp.path()).with_program("true");

        runner.build(tmp.path(), true).unwrap();
    }
}
