use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{BuildOptions, DEFAULT_README};
use crate::error::{DocError, ErrorKind, Result};
use crate::metadata::{Descriptor, Metadata};
use crate::model::{Document, Module, Project};
use crate::parser::extractor::qualify;
use crate::parser::{ModelExtractor, SourceParser};
use crate::walker::{ExcludeFilter, PathWalker, SourceDir, SourceNode};

/// Builds a [`Project`] from a directory of Python sources.
///
/// Configuration is fully validated before any source file is parsed.
/// Syntax errors in package members abort the build; entry scripts that
/// fail to parse are logged and skipped.
pub struct ProjectBuilder {
    options: BuildOptions,
    parser: SourceParser,
}

impl ProjectBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            parser: SourceParser::new(),
        }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub fn build(&self) -> Result<Project> {
        let root = &self.options.root;

        self.options.validate()?;
        let filter = self.options.exclude_filter()?;

        let descriptor = if self.options.use_descriptor {
            Descriptor::read(root)?
        } else {
            None
        };
        let metadata = Metadata::resolve(descriptor, &self.options.overrides);
        metadata.validate()?;

        let name = match &metadata.name {
            Some(name) => name.clone(),
            None => project_name(root)?,
        };
        info!("Building project {} from {}", name, root.display());

        let mut project = Project::new(name, self.read_readme()?);
        project.set_metadata(metadata.to_map());

        for path in &self.options.documents {
            project.add_document(self.read_document(path)?);
        }

        let package_root = match &metadata.package_dir {
            Some(dir) => root.join(dir),
            None => root.clone(),
        };
        let packages = self.collect_packages(&package_root, &metadata, &filter)?;

        let mut files = 0;
        for package in &packages {
            files += package.file_count();
            let module = self.build_package(package, None)?;
            if !project.add_module(module) {
                debug!("Skipping empty package {}", package.name);
            }
        }

        for script in &metadata.scripts {
            if let Some(module) = self.build_script(&root.join(script))? {
                files += 1;
                project.add_module(module);
            }
        }

        info!(
            "Built {} top-level modules from {} source files",
            project.top_level_modules().len(),
            files
        );
        Ok(project)
    }

    fn read_readme(&self) -> Result<Option<String>> {
        let (path, explicit) = match &self.options.readme {
            Some(path) => (self.options.resolve(path), true),
            None => (self.options.root.join(DEFAULT_README), false),
        };

        if !explicit && !path.is_file() {
            warn!("No {} found in {}", DEFAULT_README, self.options.root.display());
            return Ok(None);
        }

        std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| DocError::io(&path, e))
    }

    fn read_document(&self, path: &Path) -> Result<Document> {
        let path = self.options.resolve(path);
        let contents = std::fs::read_to_string(&path).map_err(|e| DocError::io(&path, e))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Document::new(name, path, contents))
    }

    /// Walks the package root and keeps the selected top-level packages,
    /// or every directory when no selection is given.
    fn collect_packages(
        &self,
        package_root: &Path,
        metadata: &Metadata,
        filter: &ExcludeFilter,
    ) -> Result<Vec<SourceDir>> {
        let walker = PathWalker::new(&self.options.root, filter);
        let tree = walker.walk(package_root)?;
        let dirs: Vec<SourceDir> = tree
            .children
            .into_iter()
            .filter_map(|child| match child {
                SourceNode::Dir(dir) => Some(dir),
                SourceNode::File(path) => {
                    debug!("Skipping root-level file {}", path.display());
                    None
                }
            })
            .collect();

        let Some(selected) = metadata.top_level_packages() else {
            return Ok(dirs);
        };

        let mut packages = Vec::with_capacity(selected.len());
        for name in selected {
            match dirs.iter().find(|dir| dir.name == name) {
                Some(dir) => packages.push(dir.clone()),
                None => {
                    let path = package_root.join(&name);
                    let reason = if path.is_dir() {
                        "package directory is excluded"
                    } else {
                        "package directory not found"
                    };
                    return Err(DocError::io(
                        path,
                        std::io::Error::new(std::io::ErrorKind::NotFound, reason),
                    ));
                }
            }
        }
        Ok(packages)
    }

    fn build_package(&self, dir: &SourceDir, owner: Option<&str>) -> Result<Module> {
        let qualified = qualify(owner, &dir.name);
        let mut module = Module::new(dir.name.as_str(), dir.path.as_path(), owner);

        if let Some(init) = &dir.init {
            debug!("Parsing {}", init.display());
            let parsed = self.parser.parse_file(init)?;
            module.merge(ModelExtractor::new(&parsed).extract_module(&dir.name, owner)?);
        }

        for child in &dir.children {
            let child = match child {
                SourceNode::Dir(sub) => self.build_package(sub, Some(&qualified))?,
                SourceNode::File(path) => self.build_file(path, Some(&qualified))?,
            };
            if !module.add_module(child) {
                debug!("Skipping empty module in {}", qualified);
            }
        }

        Ok(module)
    }

    fn build_file(&self, path: &Path, owner: Option<&str>) -> Result<Module> {
        debug!("Parsing {}", path.display());
        let parsed = self.parser.parse_file(path)?;
        ModelExtractor::new(&parsed).extract_module(&module_name(path), owner)
    }

    /// Builds an entry script as a top-level module; a script that fails to
    /// parse is skipped.
    fn build_script(&self, path: &Path) -> Result<Option<Module>> {
        match self.build_file(path, None) {
            Ok(module) => Ok(Some(module)),
            Err(err) if err.kind() == ErrorKind::Syntax => {
                warn!("Skipping entry script {}: {}", path.display(), err);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

/// Convenience wrapper around [`ProjectBuilder`].
pub fn build_project(options: BuildOptions) -> Result<Project> {
    ProjectBuilder::new(options).build()
}

fn module_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn project_name(root: &Path) -> Result<String> {
    let canonical: PathBuf = root.canonicalize().map_err(|e| DocError::io(root, e))?;
    Ok(canonical
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| canonical.display().to_string()))
}
