//! Version bumps for named packages.
use clap::ValueEnum;
use indexmap::IndexMap;
use log::*;
use semver::{BuildMetadata, Prerelease, Version};
use serde::Deserialize;
use std::{fmt, path::PathBuf};

use crate::{Result, TalosError, workspace::Workspace};

/// Which version component to increment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpKind {
    #[default]
    Patch,
    Minor,
    Major,
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            BumpKind::Patch => "patch",
            BumpKind::Minor => "minor",
            BumpKind::Major => "major",
        };
        write!(f, "{kind}")
    }
}

/// Next version for `kind`. Lower components reset to zero and prerelease or
/// build metadata is dropped.
pub fn next_version(current: &Version, kind: BumpKind) -> Version {
    let mut next = match kind {
        BumpKind::Patch => {
            Version::new(current.major, current.minor, current.patch + 1)
        }
        BumpKind::Minor => Version::new(current.major, current.minor + 1, 0),
        BumpKind::Major => Version::new(current.major + 1, 0, 0),
    };
    next.pre = Prerelease::EMPTY;
    next.build = BuildMetadata::EMPTY;
    next
}

/// Bump every named package and write the new versions into their manifests.
///
/// All packages are resolved and validated before any manifest is written,
/// so an unknown package or unparseable version leaves the tree untouched.
pub fn bump_versions<S: AsRef<str>>(
    workspace: &Workspace,
    names: &[S],
    kind: BumpKind,
) -> Result<IndexMap<String, Version>> {
    let targets = names
        .iter()
        .map(AsRef::as_ref)
        .map(|name| {
            workspace
                .package_dir(name)
                .map(|dir| (name.to_string(), dir))
                .ok_or_else(|| TalosError::UnknownPackage(name.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    bump_packages(workspace, &targets, kind)
}

/// Bump packages already located on disk, given as (name, package dir).
/// Same validate-then-write behaviour as [`bump_versions`].
pub fn bump_packages(
    workspace: &Workspace,
    targets: &[(String, PathBuf)],
    kind: BumpKind,
) -> Result<IndexMap<String, Version>> {
    let mut pending = vec![];

    for (name, dir) in targets.iter() {
        let manifest = workspace.read_manifest(&workspace.manifest_path(dir))?;

        let current = manifest.version().unwrap_or_default().to_string();
        let parsed = parse_release_version(&current).ok_or_else(|| {
            TalosError::InvalidVersion {
                package: name.to_string(),
                version: current.clone(),
            }
        })?;

        pending.push((name.to_string(), manifest, next_version(&parsed, kind)));
    }

    let mut bumped = IndexMap::new();

    for (name, mut manifest, next) in pending {
        info!(
            "bumping {name}: {} -> {next}",
            manifest.version().unwrap_or_default()
        );
        manifest.set_version(&next.to_string());
        workspace.write_manifest(&manifest)?;
        bumped.insert(name, next);
    }

    Ok(bumped)
}

/// Three numeric components, optionally followed by prerelease/build
/// metadata. Range modifiers are not accepted here.
fn parse_release_version(version: &str) -> Option<Version> {
    Version::parse(version.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{TestRepo, manifest_json};
    use proptest::prelude::*;

    #[test]
    fn bumps_and_writes_each_package() {
        let repo = TestRepo::new();
        repo.add_package("@bbc/b", "1.0.0", &[]);
        repo.add_package("@bbc/c", "3.4.9", &[]);

        let bumped =
            bump_versions(&repo.workspace(), &["@bbc/b", "c"], BumpKind::Patch)
                .unwrap();

        assert_eq!(bumped["@bbc/b"], Version::new(1, 0, 1));
        assert_eq!(bumped["c"], Version::new(3, 4, 10));
        assert_eq!(repo.manifest("@bbc/b").version(), Some("1.0.1"));
        assert_eq!(repo.manifest("@bbc/c").version(), Some("3.4.10"));
    }

    #[test]
    fn bumps_packages_by_directory() {
        let repo = TestRepo::new();
        let dir = repo.path().join("packages").join("b-dir");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("package.json"),
            manifest_json("@bbc/psammead-b", "2.3.4", &[]),
        )
        .unwrap();

        let bumped = bump_packages(
            &repo.workspace(),
            &[("@bbc/psammead-b".to_string(), dir.clone())],
            BumpKind::Patch,
        )
        .unwrap();

        assert_eq!(bumped["@bbc/psammead-b"], Version::new(2, 3, 5));
        assert_eq!(
            std::fs::read_to_string(dir.join("package.json")).unwrap(),
            manifest_json("@bbc/psammead-b", "2.3.5", &[])
        );
    }

    #[test]
    fn minor_and_major_reset_lower_components() {
        let current = Version::new(1, 2, 3);
        assert_eq!(next_version(&current, BumpKind::Minor), Version::new(1, 3, 0));
        assert_eq!(next_version(&current, BumpKind::Major), Version::new(2, 0, 0));
    }

    #[test]
    fn prerelease_is_dropped() {
        let current = Version::parse("1.2.3-beta.1").unwrap();
        assert_eq!(next_version(&current, BumpKind::Patch), Version::new(1, 2, 4));
    }

    #[test]
    fn unknown_package_writes_nothing() {
        let repo = TestRepo::new();
        repo.add_package("@bbc/b", "1.0.0", &[]);
        let before = repo.raw_manifest("@bbc/b");

        let result = bump_versions(
            &repo.workspace(),
            &["@bbc/b", "@bbc/missing"],
            BumpKind::Patch,
        );

        assert!(matches!(result, Err(TalosError::UnknownPackage(n)) if n == "@bbc/missing"));
        assert_eq!(repo.raw_manifest("@bbc/b"), before);
    }

    #[test]
    fn invalid_version_is_rejected() {
        let repo = TestRepo::new();
        repo.add_package("@bbc/b", "1.0", &[]);

        let result =
            bump_versions(&repo.workspace(), &["@bbc/b"], BumpKind::Minor);
        assert!(matches!(
            result,
            Err(TalosError::InvalidVersion { version, .. }) if version == "1.0"
        ));
    }

    #[test]
    fn missing_version_is_rejected() {
        let repo = TestRepo::new();
        let dir = repo.add_package("@bbc/b", "1.0.0", &[]);
        std::fs::write(dir.join("package.json"), r#"{ "name": "@bbc/b" }"#)
            .unwrap();

        let result =
            bump_versions(&repo.workspace(), &["@bbc/b"], BumpKind::Patch);
        assert!(matches!(result, Err(TalosError::InvalidVersion { .. })));
    }

    fn kind() -> impl Strategy<Value = BumpKind> {
        prop_oneof![
            Just(BumpKind::Patch),
            Just(BumpKind::Minor),
            Just(BumpKind::Major)
        ]
    }

    proptest! {
        #[test]
        fn bump_is_strictly_greater(
            major in 0u64..1000,
            minor in 0u64..1000,
            patch in 0u64..1000,
            kind in kind(),
        ) {
            let current = Version::new(major, minor, patch);
            let next = next_version(&current, kind);
            prop_assert!(next > current);

            match kind {
                BumpKind::Patch => {
                    prop_assert_eq!((next.major, next.minor), (major, minor));
                }
                BumpKind::Minor => {
                    prop_assert_eq!(next.major, major);
                    prop_assert_eq!(next.patch, 0);
                }
                BumpKind::Major => {
                    prop_assert_eq!((next.minor, next.patch), (0, 0));
                }
            }
        }
    }
}
