//! Bump command implementation.
use crate::{
    Result,
    bumper::{BumpKind, bump_versions},
    cli::Args,
    config::Config,
    workspace::Workspace,
};

/// Bump `packages` and print each new version.
pub fn execute(args: &Args, kind: BumpKind, packages: &[String]) -> Result<()> {
    let config = Config::load(&args.repo_path, args.config.as_deref())?;
    let workspace = Workspace::new(&args.repo_path, &config);

    for (name, version) in bump_versions(&workspace, packages, kind)? {
        println!("{name} {version}");
    }

    Ok(())
}
