//! Multi-source dependency resolution.
//!
//! For every dependency of a target package the registry is queried in its
//! fixed precedence order. Environment and local matches are already
//! available; a remote match has no prebuilt binary and is materialized:
//! its recipe is cloned into a fresh workspace directory, its own
//! dependencies are resolved recursively, and the build runner produces
//! and installs the artifact before resolution continues.
//!
//! Version constraints are parsed and carried on the records but never
//! used to reject a candidate; compatibility is assumed.

pub mod errors;

pub use errors::ResolveError;

use crate::builder::{BuildRunner, RecipeSource};
use crate::core::{PackageRecord, Workspace};
use crate::sources::{Resolution, SourceRegistry};

/// Resolves the dependency list of one target package, materializing
/// remote dependencies as it goes.
pub struct Resolver<'a> {
    registry: &'a mut SourceRegistry,
    recipes: &'a dyn RecipeSource,
    runner: &'a dyn BuildRunner,
    workspace: &'a Workspace,

    /// Names currently being resolved, outermost first. A revisit means
    /// the dependency graph has a cycle and resolution fails fast.
    in_flight: Vec<String>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        registry: &'a mut SourceRegistry,
        recipes: &'a dyn RecipeSource,
        runner: &'a dyn BuildRunner,
        workspace: &'a Workspace,
    ) -> Self {
        Resolver {
            registry,
            recipes,
            runner,
            workspace,
            in_flight: Vec::new(),
        }
    }

    /// Resolve every dependency of `target`.
    ///
    /// `siblings` is the set of packages declared by the same build unit
    /// as `target`; dependencies among siblings resolve without any I/O.
    /// Any dependency no source can satisfy fails the whole resolution.
    pub fn resolve(
        &mut self,
        target: &PackageRecord,
        siblings: &[PackageRecord],
    ) -> Result<Vec<Resolution>, ResolveError> {
        if self.is_in_flight(&target.name) {
            return Err(self.cycle(&target.name));
        }

        self.in_flight.push(target.name.clone());
        let result = self.resolve_depends(target, siblings);
        self.in_flight.pop();
        result
    }

    fn resolve_depends(
        &mut self,
        target: &PackageRecord,
        siblings: &[PackageRecord],
    ) -> Result<Vec<Resolution>, ResolveError> {
        let mut resolutions = Vec::new();

        for dep in &target.depends {
            tracing::info!("looking for dependency: {}", dep.name);

            match self.registry.lookup(&dep.name, siblings)? {
                Some(Resolution::Remote(package)) => {
                    tracing::info!("found {} on the remote index", dep.name);
                    self.materialize(&package)?;
                    resolutions.push(Resolution::Remote(package));
                }
                Some(Resolution::Repository(package)) => {
                    return Err(ResolveError::UnsupportedSource {
                        package: package.name,
                    });
                }
                // Environment and local matches are already available
                Some(resolution) => {
                    tracing::info!(
                        "dependency {} available from {} source",
                        dep.name,
                        resolution.source_name()
                    );
                    resolutions.push(resolution);
                }
                None => {
                    return Err(ResolveError::Unresolved {
                        package: dep.name.clone(),
                    });
                }
            }
        }

        Ok(resolutions)
    }

    /// Clone, recursively resolve, then build and install a remote
    /// dependency.
    fn materialize(&mut self, package: &PackageRecord) -> Result<(), ResolveError> {
        if self.is_in_flight(&package.name) {
            return Err(self.cycle(&package.name));
        }

        tracing::info!(
            "materializing {} (from base {})",
            package.name,
            package.base
        );

        self.in_flight.push(package.name.clone());
        let result = self.materialize_inner(package);
        self.in_flight.pop();
        result
    }

    fn materialize_inner(&mut self, package: &PackageRecord) -> Result<(), ResolveError> {
        let dest = self.workspace.prepare(&package.name)?;
        self.recipes.clone_recipe(&package.base, &dest)?;

        let members = self.recipes.load_recipe(&dest)?;
        for member in &members {
            // Self-reference guard: the package being materialized must
            // not re-enter its own resolution.
            if member.name == package.name || member.name == package.base {
                continue;
            }
            self.resolve(member, &members)?;
        }

        self.runner
            .build(&dest, true)
            .map_err(|source| ResolveError::Build {
                package: package.name.clone(),
                source,
            })
    }

    fn is_in_flight(&self, name: &str) -> bool {
        self.in_flight.iter().any(|n| n == name)
    }

    fn cycle(&self, name: &str) -> ResolveError {
        let mut chain = self.in_flight.clone();
        chain.push(name.to_string());
        ResolveError::Cycle { chain }
    }
}
