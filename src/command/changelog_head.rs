//! Changelog head command implementation.
use crate::{
    Result, changelog, cli::Args, config::Config,
    descriptor::PublishedPackage, workspace::Workspace,
};

/// Print the changelog head of the package named by `descriptor`.
pub fn execute(args: &Args, descriptor: &str) -> Result<()> {
    let config = Config::load(&args.repo_path, args.config.as_deref())?;
    let workspace = Workspace::new(&args.repo_path, &config);
    println!("{}", head_for(&workspace, descriptor)?);
    Ok(())
}

fn head_for(workspace: &Workspace, descriptor: &str) -> Result<String> {
    let package = PublishedPackage::parse(descriptor)?;
    changelog::published_head(workspace, &package)
}
