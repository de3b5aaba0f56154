use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use pydoctree::model::{Atom, Project};
use pydoctree::{BuildOptions, MetadataOverrides, ProjectBuilder};

#[derive(Parser)]
#[command(name = "pydoctree")]
#[command(about = "Build a documentation model of a Python project")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Summarize the project in the current directory
    pydoctree summary

    # List modules two levels deep
    pydoctree modules ./myproject --depth 2

    # Document selected packages from a src/ layout
    pydoctree classes . --package-dir src -p shop,billing

    # Dump the whole model as JSON
    pydoctree json . --pretty
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print project metadata and entity counts
    Summary {
        #[command(flatten)]
        build: BuildArgs,
    },

    /// List modules by qualified name
    Modules {
        #[command(flatten)]
        build: BuildArgs,

        /// Maximum module depth (0 lists top-level modules only)
        #[arg(long)]
        depth: Option<usize>,
    },

    /// List module-level classes
    Classes {
        #[command(flatten)]
        build: BuildArgs,

        /// Maximum module depth to search
        #[arg(long)]
        depth: Option<usize>,
    },

    /// List module-level functions with their signatures
    Functions {
        #[command(flatten)]
        build: BuildArgs,

        /// Maximum module depth to search
        #[arg(long)]
        depth: Option<usize>,
    },

    /// Dump the documentation model as JSON
    Json {
        #[command(flatten)]
        build: BuildArgs,

        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Args)]
pub struct BuildArgs {
    /// Project root directory
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Project name (overrides pyproject.toml)
    #[arg(long = "project-name")]
    pub name: Option<String>,

    /// Project version (overrides pyproject.toml)
    #[arg(long = "project-version")]
    pub version: Option<String>,

    /// Entry scripts, relative to the project root
    #[arg(short, long, value_delimiter = ',')]
    pub scripts: Vec<String>,

    /// Directory holding the packages, relative to the project root
    #[arg(long)]
    pub package_dir: Option<String>,

    /// Packages to document (dotted names)
    #[arg(short, long, value_delimiter = ',')]
    pub packages: Vec<String>,

    /// Exclusion patterns (replace the defaults)
    #[arg(short = 'x', long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Also exclude the patterns of .gitignore (or similar) in the root
    #[arg(long)]
    pub ignore_file: bool,

    /// Extra documents to attach
    #[arg(short, long)]
    pub documents: Vec<PathBuf>,

    /// README used as the project docstring
    #[arg(long)]
    pub readme: Option<PathBuf>,

    /// Do not read pyproject.toml
    #[arg(long)]
    pub no_descriptor: bool,
}

impl BuildArgs {
    fn into_options(self) -> BuildOptions {
        let overrides = MetadataOverrides {
            name: self.name,
            version: self.version,
            scripts: non_empty(self.scripts),
            package_dir: self.package_dir,
            packages: non_empty(self.packages),
        };

        let mut options = BuildOptions::new(self.path)
            .with_overrides(overrides)
            .with_ignore_file(self.ignore_file)
            .with_descriptor(!self.no_descriptor);
        if !self.exclude.is_empty() {
            options = options.with_exclude(self.exclude);
        }
        if let Some(readme) = self.readme {
            options = options.with_readme(readme);
        }
        for document in self.documents {
            options = options.with_document(document);
        }
        options
    }

    fn build(self) -> pydoctree::Result<Project> {
        ProjectBuilder::new(self.into_options()).build()
    }
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    (!values.is_empty()).then_some(values)
}

fn first_line(doc: Option<&str>) -> &str {
    doc.and_then(|d| d.lines().next()).unwrap_or("")
}

pub fn summary(build: BuildArgs) -> anyhow::Result<()> {
    let project = build.build()?;

    match project.metadata_str("version") {
        Some(version) => println!("{} {}", project.name(), version),
        None => println!("{}", project.name()),
    }
    if let Some(description) = project.metadata_str("description") {
        println!("{}", description);
    }

    println!();
    println!("Modules:   {}", project.modules(None).len());
    println!("Classes:   {}", project.classes(None).len());
    println!("Functions: {}", project.functions(None).len());
    if !project.documents().is_empty() {
        println!("Documents: {}", project.documents().len());
    }

    Ok(())
}

pub fn list_modules(build: BuildArgs, depth: Option<usize>) -> anyhow::Result<()> {
    let project = build.build()?;

    for module in project.modules(depth) {
        let doc = first_line(module.doc());
        if doc.is_empty() {
            println!("{}", module.qualified_name());
        } else {
            println!("{:<40} {}", module.qualified_name(), doc);
        }
    }

    Ok(())
}

pub fn list_classes(build: BuildArgs, depth: Option<usize>) -> anyhow::Result<()> {
    let project = build.build()?;

    for class in project.classes(depth) {
        if class.bases().is_empty() {
            println!("{}", class.qualified_name());
        } else {
            println!("{}({})", class.qualified_name(), class.bases().join(", "));
        }
        for method in class.functions() {
            println!("    {}({})", method.name(), method.signature());
        }
    }

    Ok(())
}

pub fn list_functions(build: BuildArgs, depth: Option<usize>) -> anyhow::Result<()> {
    let project = build.build()?;

    for function in project.functions(depth) {
        for decorator in function.decorators() {
            println!("@{}", decorator.text());
        }
        let prefix = if function.is_async() { "async " } else { "" };
        println!(
            "{}{}({})",
            prefix,
            function.qualified_name(),
            function.signature()
        );
    }

    Ok(())
}

pub fn dump_json(build: BuildArgs, pretty: bool) -> anyhow::Result<()> {
    let project = build.build()?;

    let json = if pretty {
        serde_json::to_string_pretty(&project)?
    } else {
        serde_json::to_string(&project)?
    };
    println!("{}", json);

    Ok(())
}
