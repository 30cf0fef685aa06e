//! Template command - validate, show and create templates.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;

use templex_core::TemplateFile;

use super::print_success;

/// Croatian identity card back side, classified by the MRZ opt1 field.
const CROATIAN_ID_BACK: &str = include_str!("../../templates/croatian_id_back.json");

/// Arguments for the template command.
#[derive(Args)]
pub struct TemplateArgs {
    #[command(subcommand)]
    command: TemplateCommand,
}

#[derive(Subcommand)]
enum TemplateCommand {
    /// Validate a template and print configuration warnings
    Check {
        /// Template file
        path: PathBuf,

        /// Fail when there are warnings
        #[arg(long)]
        strict: bool,
    },

    /// Print a template in normalized form
    Show {
        /// Template file
        path: PathBuf,
    },

    /// Write the bundled Croatian ID example template
    Init(InitArgs),
}

#[derive(Args)]
struct InitArgs {
    /// Output path for the template
    #[arg(short, long, default_value = "template.json")]
    output: PathBuf,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: TemplateArgs) -> anyhow::Result<()> {
    match args.command {
        TemplateCommand::Check { path, strict } => check_template(&path, strict),
        TemplateCommand::Show { path } => show_template(&path),
        TemplateCommand::Init(init_args) => init_template(init_args),
    }
}

fn check_template(path: &Path, strict: bool) -> anyhow::Result<()> {
    let template = TemplateFile::load(path)?;
    let classes = template.classes.len();
    let groups = template.groups.len();

    let settings = template
        .into_settings()
        .map_err(|e| anyhow::anyhow!("Invalid template {}: {}", path.display(), e))?;
    let warnings = settings.validate();

    if warnings.is_empty() {
        print_success(format!(
            "{} is valid ({} classes, {} groups)",
            path.display(),
            classes,
            groups
        ));
        return Ok(());
    }

    println!("{}", style("Warnings:").yellow());
    for warning in &warnings {
        println!("  - {}", warning);
    }

    if strict {
        anyhow::bail!("{} has {} warnings", path.display(), warnings.len());
    }

    Ok(())
}

fn show_template(path: &Path) -> anyhow::Result<()> {
    let template = TemplateFile::load(path)?;
    let settings = template.clone().into_settings()?;

    let normalized = TemplateFile {
        name: template.name,
        ..TemplateFile::from_settings(&settings)
    };
    println!("{}", normalized.to_json()?);

    Ok(())
}

fn init_template(args: InitArgs) -> anyhow::Result<()> {
    if args.output.exists() && !args.force {
        anyhow::bail!(
            "Template already exists at {}. Use --force to overwrite.",
            args.output.display()
        );
    }

    if let Some(parent) = args.output.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&args.output, CROATIAN_ID_BACK)?;

    print_success(format!("Created template at {}", args.output.display()));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_template_is_clean() {
        let settings = TemplateFile::from_json(CROATIAN_ID_BACK)
            .unwrap()
            .into_settings()
            .unwrap();

        assert!(settings.validate().is_empty());
        assert_eq!(settings.regions("oldCroId").len(), 3);
        assert_eq!(settings.regions("newCroId")[0].dewarp_height, 300);
        assert!(settings.classifier().is_some());
    }
}
