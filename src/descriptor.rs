use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use crate::host::Host;
use crate::path::{normalize, normalize_path};
use crate::template;

/// Reference names that are implicit framework references and never passed
/// to the compiler explicitly.
pub const IMPLICIT_REFERENCES: [&str; 2] = ["mscorlib", "FSharp.Core"];

// ═══════════════════════════════════════════════════════════════════════════════
//  Error
// ═══════════════════════════════════════════════════════════════════════════════

/// A project file that cannot be turned into a [`ProjectDescriptor`].
#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("cannot read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("XML Error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("expected a <Project> root element, found <{0}>")]
    UnexpectedRoot(String),

    #[error("missing required element <{0}>")]
    Missing(&'static str),

    #[error("no <PropertyGroup> with a Condition mentioning '{0}'")]
    NoMatchingGroup(String),
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Types
// ═══════════════════════════════════════════════════════════════════════════════

/// What the compiler produces, from `<OutputType>` (lower-cased).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputKind {
    Library,
    Exe,
    /// Any other target the compiler accepts (e.g. `winexe`, `module`).
    Other(String),
}

impl OutputKind {
    fn parse(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "library" => Self::Library,
            "exe" => Self::Exe,
            other => Self::Other(other.to_string()),
        }
    }

    /// Value passed to `--target:`.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Library => "library",
            Self::Exe => "exe",
            Self::Other(s) => s,
        }
    }

    /// File extension of the produced assembly.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Library => "dll",
            _ => "exe",
        }
    }
}

/// An `<ItemGroup><Reference>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// The `Include` attribute, verbatim.
    pub name: String,
    /// `<HintPath>`, substituted and made absolute.
    pub hint_path: Option<PathBuf>,
    /// `<Private>True</Private>`: copy the assembly next to the output.
    pub private: bool,
}

/// The resolved, configuration-specific view of a project file.
///
/// Constructed once by [`ProjectDescriptor::read`] and only read
/// afterwards; every field is public for inspection but nothing in the
/// crate takes it by `&mut`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDescriptor {
    pub project_file_path: PathBuf,
    pub project_dir: PathBuf,
    pub configuration: String,
    pub output_kind: OutputKind,
    pub assembly_name: String,
    pub debug_symbols: bool,
    pub debug_type: String,
    pub optimize: bool,
    pub tailcalls: bool,
    pub output_dir: PathBuf,
    pub output_path: PathBuf,
    pub define_constants: Vec<String>,
    pub warning_level: i32,
    pub doc_file: Option<PathBuf>,
    pub references: Vec<Reference>,
    /// `<Compile Include>` entries exactly as written in the project.
    pub sources: Vec<String>,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Reading
// ═══════════════════════════════════════════════════════════════════════════════

impl ProjectDescriptor {
    /// Load a project file from disk and resolve it for `configuration`.
    ///
    /// A relative `path` is resolved against the host working directory.
    pub fn read(
        path: impl AsRef<Path>,
        configuration: &str,
        host: &Host,
    ) -> Result<Self, DescriptorError> {
        let project_file = normalize_path(path.as_ref(), host.working_dir());
        let source = std::fs::read_to_string(&project_file).map_err(|source| {
            DescriptorError::Read { path: project_file.clone(), source }
        })?;
        Self::parse(&source, project_file, configuration)
    }

    /// Resolve an in-memory project file whose absolute location is
    /// `project_file`. Paths inside the project resolve against its parent
    /// directory.
    pub fn parse(
        source: &str,
        project_file: impl Into<PathBuf>,
        configuration: &str,
    ) -> Result<Self, DescriptorError> {
        let project_file_path = project_file.into();
        let project_dir = project_file_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let doc = roxmltree::Document::parse(source)?;
        let root = doc.root_element();
        if root.tag_name().name() != "Project" {
            return Err(DescriptorError::UnexpectedRoot(root.tag_name().name().to_string()));
        }

        let property_groups: Vec<roxmltree::Node> = element_children(root, "PropertyGroup").collect();
        let vars = template::configuration_vars(configuration);
        let resolve = |raw: &str| normalize(&template::substitute(raw, &vars), &project_dir);

        // ── Configuration-independent fields ─────────────────────────────
        let output_kind = property_groups
            .iter()
            .find_map(|pg| find_child_text(pg, "OutputType"))
            .map(|s| OutputKind::parse(&s))
            .ok_or(DescriptorError::Missing("OutputType"))?;
        let assembly_name = property_groups
            .iter()
            .find_map(|pg| find_child_text(pg, "AssemblyName"))
            .ok_or(DescriptorError::Missing("AssemblyName"))?;

        // ── Configuration group ──────────────────────────────────────────
        // Substring match on the Condition text, so "Debug" also selects a
        // group conditioned on "DebugFast" if that one comes first.
        let (index, group) = property_groups
            .iter()
            .enumerate()
            .find(|(_, pg)| {
                pg.attribute("Condition")
                    .is_some_and(|cond| cond.contains(configuration))
            })
            .ok_or_else(|| DescriptorError::NoMatchingGroup(configuration.to_string()))?;
        debug!(
            "{}: using PropertyGroup[{index}] ({:?}) for '{configuration}'",
            project_file_path.display(),
            group.attribute("Condition").unwrap_or_default()
        );

        let flag = |tag: &str| find_child_text(group, tag).is_some_and(|s| s == "true");

        let debug_symbols = flag("DebugSymbols");
        let debug_type = find_child_text(group, "DebugType").unwrap_or_else(|| "full".to_string());
        let optimize = flag("Optimize");
        let tailcalls = flag("Tailcalls");

        let output_dir = find_child_text(group, "OutputPath")
            .map(|s| resolve(&s))
            .ok_or(DescriptorError::Missing("OutputPath"))?;
        let output_path =
            output_dir.join(format!("{assembly_name}.{}", output_kind.extension()));

        let define_constants = find_child_text(group, "DefineConstants")
            .map(|s| split_constants(&s))
            .unwrap_or_default();
        let warning_level = find_child_text(group, "WarningLevel")
            .map(|s| leading_integer(&s))
            .unwrap_or(3);
        let doc_file = find_child_text(group, "DocumentationFile").map(|s| resolve(&s));

        // ── Items ────────────────────────────────────────────────────────
        let mut references = Vec::new();
        let mut sources = Vec::new();
        for ig in element_children(root, "ItemGroup") {
            for item in ig.children().filter(|n| n.is_element()) {
                match item.tag_name().name() {
                    "Reference" => references.push(Reference {
                        name: item.attribute("Include").unwrap_or("").to_string(),
                        hint_path: find_child_text(&item, "HintPath").map(|s| resolve(&s)),
                        private: find_child_text(&item, "Private").is_some_and(|s| s == "True"),
                    }),
                    "Compile" => {
                        sources.push(item.attribute("Include").unwrap_or("").to_string());
                    }
                    _ => {}
                }
            }
        }
        references.retain(|r| !IMPLICIT_REFERENCES.contains(&r.name.as_str()));

        Ok(Self {
            project_file_path,
            project_dir,
            configuration: configuration.to_string(),
            output_kind,
            assembly_name,
            debug_symbols,
            debug_type,
            optimize,
            tailcalls,
            output_dir,
            output_path,
            define_constants,
            warning_level,
            doc_file,
            references,
            sources,
        })
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn element_children<'a, 'input: 'a>(
    parent: roxmltree::Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = roxmltree::Node<'a, 'input>> {
    parent
        .children()
        .filter(move |n| n.is_element() && n.tag_name().name() == tag)
}

/// Return the text content of the first child element with the given tag
/// name. An element without text counts as absent.
fn find_child_text(parent: &roxmltree::Node, tag: &str) -> Option<String> {
    parent
        .children()
        .find(|c| c.is_element() && c.tag_name().name() == tag)
        .and_then(|c| c.text())
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Split `DefineConstants` on `;`, keeping interior empty entries but not
/// trailing ones.
fn split_constants(raw: &str) -> Vec<String> {
    let mut constants: Vec<String> = raw.split(';').map(String::from).collect();
    while constants.last().is_some_and(|c| c.is_empty()) {
        constants.pop();
    }
    constants
}

/// Integer prefix of `raw` after leading whitespace; `0` when there is
/// none. Values outside `i32` saturate.
fn leading_integer(raw: &str) -> i32 {
    let s = raw.trim_start();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i32, |acc, b| {
            let digit = i32::from(b - b'0');
            let shifted = acc.saturating_mul(10);
            if negative { shifted.saturating_sub(digit) } else { shifted.saturating_add(digit) }
        })
}

impl ProjectDescriptor {
    /// `(label, value)` rows describing the resolved settings, for `--info`.
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        let yes_no = |b: bool| (if b { "yes" } else { "no" }).to_string();
        let mut rows = vec![
            ("project", self.project_file_path.display().to_string()),
            ("configuration", self.configuration.clone()),
            ("output type", self.output_kind.as_str().to_string()),
            ("assembly", self.assembly_name.clone()),
            ("output", self.output_path.display().to_string()),
            ("debug symbols", yes_no(self.debug_symbols)),
            ("debug type", self.debug_type.clone()),
            ("optimize", yes_no(self.optimize)),
            ("tailcalls", yes_no(self.tailcalls)),
            ("defines", self.define_constants.join(";")),
            ("warning level", self.warning_level.to_string()),
        ];
        if let Some(doc) = &self.doc_file {
            rows.push(("documentation", doc.display().to_string()));
        }
        for r in &self.references {
            let location = match &r.hint_path {
                Some(p) => p.display().to_string(),
                None => format!("{}.dll", r.name),
            };
            let private = if r.private { " (private)" } else { "" };
            rows.push(("reference", format!("{location}{private}")));
        }
        for s in &self.sources {
            rows.push(("source", s.clone()));
        }
        rows
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════
