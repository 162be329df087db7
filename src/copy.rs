//! Copying referenced assemblies next to the build output.

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::descriptor::{ProjectDescriptor, Reference};
use crate::error::{Error, Result};

/// Companion files copied alongside each assembly when they exist.
const COMPANION_EXTENSIONS: [&str; 2] = ["pdb", "xml"];

/// References that should be copied: those with a hint path, and when
/// `copy_all` is false only the private ones.
pub fn selected_references(d: &ProjectDescriptor, copy_all: bool) -> impl Iterator<Item = (&Reference, &Path)> {
    d.references
        .iter()
        .filter(move |r| copy_all || r.private)
        .filter_map(|r| r.hint_path.as_deref().map(|p| (r, p)))
}

/// Copy the selected reference assemblies, with their `.pdb` and `.xml`
/// companions, into `output_dir`.
///
/// Files that do not exist are skipped. Returns the destination of every
/// file actually copied, in order.
pub fn copy_references(d: &ProjectDescriptor, copy_all: bool) -> Result<Vec<PathBuf>> {
    let mut copied = Vec::new();
    let mut selected = selected_references(d, copy_all).peekable();
    if selected.peek().is_none() {
        return Ok(copied);
    }

    std::fs::create_dir_all(&d.output_dir)
        .map_err(|e| Error::io("cannot create output directory", &d.output_dir, e))?;

    for (reference, assembly) in selected {
        debug!("copying reference '{}'", reference.name);
        let companions = COMPANION_EXTENSIONS.iter().map(|ext| assembly.with_extension(ext));
        for source in std::iter::once(assembly.to_path_buf()).chain(companions) {
            if let Some(dest) = copy_file(&source, &d.output_dir)? {
                copied.push(dest);
            }
        }
    }

    Ok(copied)
}

/// Copy `source` into `dir`, keeping its file name. Returns `None` when
/// `source` is not a file.
fn copy_file(source: &Path, dir: &Path) -> Result<Option<PathBuf>> {
    let Some(name) = source.file_name() else {
        return Ok(None);
    };
    if !source.is_file() {
        debug!("skipping missing '{}'", source.display());
        return Ok(None);
    }

    let dest = dir.join(name);
    if is_same_file(source, &dest) {
        debug!("'{}' is already in '{}'", source.display(), dir.display());
        return Ok(None);
    }

    info!("copying '{}' to '{}'...", source.display(), dir.display());
    std::fs::copy(source, &dest).map_err(|e| Error::io("cannot copy", source, e))?;
    Ok(Some(dest))
}

/// `std::fs::copy` truncates the destination before reading the source,
/// so copying a file onto itself would empty it.
fn is_same_file(source: &Path, dest: &Path) -> bool {
    match (source.canonicalize(), dest.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        dir: tempfile::TempDir,
        descriptor: ProjectDescriptor,
    }

    /// Project with a private reference `A` (dll + pdb + xml), a non-private
    /// reference `B` (dll only), a reference without a hint path, and a
    /// private reference whose file does not exist.
    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let lib = dir.path().join("lib");
        std::fs::create_dir(&lib).unwrap();
        for file in ["A.dll", "A.pdb", "A.xml", "B.dll"] {
            std::fs::write(lib.join(file), file).unwrap();
        }

        let source = r#"<Project>
  <PropertyGroup><OutputType>Exe</OutputType><AssemblyName>App</AssemblyName></PropertyGroup>
  <PropertyGroup Condition="'$(Configuration)'=='Debug'"><OutputPath>bin\$(Configuration)</OutputPath></PropertyGroup>
  <ItemGroup>
    <Reference Include="A"><HintPath>lib\A.dll</HintPath><Private>True</Private></Reference>
    <Reference Include="B"><HintPath>lib\B.dll</HintPath></Reference>
    <Reference Include="System" />
    <Reference Include="Gone"><HintPath>lib\Gone.dll</HintPath><Private>True</Private></Reference>
  </ItemGroup>
</Project>"#;
        let descriptor = ProjectDescriptor::parse(source, dir.path().join("App.fsproj"), "Debug").unwrap();
        Fixture { dir, descriptor }
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn private_only_by_default() {
        let f = fixture();
        let copied = copy_references(&f.descriptor, false).unwrap();
        assert_eq!(names(&copied), vec!["A.dll", "A.pdb", "A.xml"]);

        let out = f.dir.path().join("bin/Debug");
        assert_eq!(std::fs::read_to_string(out.join("A.pdb")).unwrap(), "A.pdb");
        assert!(!out.join("B.dll").exists());
    }

    #[test]
    fn copy_all_includes_non_private() {
        let f = fixture();
        let copied = copy_references(&f.descriptor, true).unwrap();
        assert_eq!(names(&copied), vec!["A.dll", "A.pdb", "A.xml", "B.dll"]);
        assert!(f.dir.path().join("bin/Debug/B.dll").is_file());
    }

    #[test]
    fn missing_companions_and_assemblies_are_skipped() {
        let f = fixture();
        std::fs::remove_file(f.dir.path().join("lib/A.xml")).unwrap();
        let copied = copy_references(&f.descriptor, true).unwrap();
        assert_eq!(names(&copied), vec!["A.dll", "A.pdb", "B.dll"]);
    }

    #[test]
    fn selection_ignores_references_without_hint_path() {
        let f = fixture();
        let all: Vec<&str> = selected_references(&f.descriptor, true).map(|(r, _)| r.name.as_str()).collect();
        assert_eq!(all, vec!["A", "B", "Gone"]);
        let private: Vec<&str> = selected_references(&f.descriptor, false).map(|(r, _)| r.name.as_str()).collect();
        assert_eq!(private, vec!["A", "Gone"]);
    }

    #[test]
    fn nothing_selected_creates_nothing() {
        let f = fixture();
        let mut d = f.descriptor.clone();
        d.references.clear();
        assert!(copy_references(&d, true).unwrap().is_empty());
        assert!(!f.dir.path().join("bin").exists());
    }

    #[test]
    fn reference_already_in_output_dir_is_left_intact() {
        let f = fixture();
        let out = f.dir.path().join("bin/Debug");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("Lib.dll"), "PAYLOAD").unwrap();

        let mut d = f.descriptor.clone();
        d.references = vec![Reference {
            name: "Lib".into(),
            hint_path: Some(out.join("Lib.dll")),
            private: true,
        }];

        let copied = copy_references(&d, false).unwrap();
        assert!(copied.is_empty());
        assert_eq!(std::fs::read_to_string(out.join("Lib.dll")).unwrap(), "PAYLOAD");
    }
}
