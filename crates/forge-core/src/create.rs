//! The create workflow: collect arguments, fetch a template, produce a
//! project skeleton, and run the post-creation commands.

use crate::args::resolve::{self, ArgsError, Flags};
use crate::args::spec::{ArgSpec, ResolvedArgs};
use crate::config::bootconfig::bootconfig;
use crate::interact::{CliclackPrompter, TerminalGate};
use crate::product::{AppType, ProductConfig};
use crate::runner::exec::{ExecutionContext, RunOutcome, Runner, SystemShell};
use crate::runtime::check::{self, Tool};
use crate::runtime::tool::cordova_tool;
use crate::templates::manifest::{AppTypeFiles, TemplateManifest};
use crate::templates::{copier, fetcher::TemplateFetcher, version, Substitutions, TemplateSource};
use anyhow::Result;
use std::path::PathBuf;

/// Options for the create command, lowered from the CLI flags.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Argument values supplied as flags, keyed by argument name
    pub flags: Flags,

    /// Local directory to use for templates instead of fetching from remote
    pub template_dir: Option<PathBuf>,

    /// Whether this is createwithtemplate (adds the templaterepouri argument)
    pub with_template: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,
}

/// The ordered argument table for create/createwithtemplate.
pub fn create_arg_specs<C: ProductConfig>(config: &C, with_template: bool) -> Vec<ArgSpec> {
    let apptypes: Vec<&'static str> = config.app_types().iter().map(AppType::flag_name).collect();
    let apptype_list = apptypes.join(", ");

    let mut specs = vec![
        ArgSpec::new("appname")
            .prompt("Enter your application name:")
            .pattern(r"^\S+$")
            .error("Invalid value for application name: '$val'."),
        ArgSpec::new("packagename")
            .prompt("Enter your package name (com.mycompany.myapp):")
            .preprocess(|s| s.to_lowercase())
            .pattern(r"^[a-z]+[a-z0-9_]*(\.[a-z]+[a-z0-9_]*)+$")
            .error("Invalid value for package name: '$val'."),
        ArgSpec::new("organization")
            .prompt("Enter your organization name (Acme, Inc.):")
            .predicate(|s| !s.is_empty())
            .error("Invalid value for organization: '$val'."),
        ArgSpec::new("outputdir")
            .prompt("Enter the output directory (use . for the current directory):"),
        ArgSpec::new("apptype")
            .prompt(format!("Enter your application type ({apptype_list}):"))
            .predicate(move |s| apptypes.contains(&s))
            .error("Invalid value for application type: '$val'."),
        ArgSpec::new("startpage")
            .prompt("Enter the start page for your app:")
            .predicate(|s| !s.is_empty())
            .error("Invalid value for start page: '$val'.")
            .prompt_if(|resolved| resolved.get("apptype") == Some("hybrid_remote")),
    ];

    if with_template {
        specs.push(
            ArgSpec::new("templaterepouri")
                .prompt("Enter the URI of the template repository:")
                .predicate(|s| !s.is_empty())
                .error("Invalid value for template repository URI: '$val'."),
        );
        // Private parameter: selects a template by name within the
        // repository. Only ever filled from flags.
        specs.push(ArgSpec::new("templatepath"));
    }

    specs
}

/// Run the create workflow end to end.
pub async fn run<C: ProductConfig>(config: &C, opts: CreateOptions, cli_version: &str) -> Result<()> {
    cliclack::intro(config.display_name())?;

    // Step 1: Resolve arguments
    let resolved = resolve_args(config, &opts)?;
    let apptype = AppType::parse(resolved.get_or_empty("apptype"))
        .ok_or_else(|| anyhow::anyhow!("Unsupported app type"))?;

    // Step 2: Check tools (Cordova separately; it can be installed on the spot)
    if apptype.is_hybrid() {
        handle_cordova_check(opts.yes).await?;
    }
    check_platform_tools(config, apptype)?;

    // Step 3: Project directory must not exist yet
    let project_dir = project_dir(&resolved)?;
    if project_dir.exists() {
        anyhow::bail!("Output directory already exists: {}", project_dir.display());
    }

    // Step 4: Set up the template fetcher
    let mut fetcher = setup_fetcher(config, &opts, &resolved)?;

    // Step 5: Select a template for the app type
    let (template_name, manifest, apptype_files) = select_template(
        &mut fetcher,
        apptype,
        resolved.get("templatepath"),
        opts.yes,
    )
    .await?;

    // Check version compatibility
    if let Some(warning) =
        version::check_compatibility(cli_version, &manifest.version, config.upgrade_command())
    {
        cliclack::log::warning(format!(
            "Version warning: {}",
            warning.lines().next().unwrap_or(&warning)
        ))?;
    }

    // Step 6: Copy the template
    let subs = Substitutions::from_resolved(&resolved);
    let spinner = cliclack::spinner();
    spinner.start("Creating project...");
    let copied = copier::copy_template(
        &mut fetcher,
        &template_name,
        &manifest,
        &project_dir,
        apptype,
        &apptype_files,
        &subs,
    )
    .await?;
    spinner.stop(format!(
        "Created {} files in {}",
        copied.len(),
        project_dir.display()
    ));

    // Step 7: Write the boot configuration for hybrid apps
    if let Some(boot) = bootconfig(&resolved, apptype) {
        let boot_path = project_dir.join("bootconfig.json");
        std::fs::write(&boot_path, serde_json::to_string_pretty(&boot)?)?;
        cliclack::log::info(format!("Wrote {}", boot_path.display()))?;
    }

    // Step 8: Run post-creation commands
    if let Some(tree) = config.post_create(&project_dir, apptype) {
        let mut shell = SystemShell;
        let mut gate = TerminalGate;
        let ctx = ExecutionContext::new(&project_dir).auto_confirm(opts.yes);
        match Runner::new(&mut shell, &mut gate).run(&ctx, &tree)? {
            RunOutcome::Completed => {}
            RunOutcome::Declined => cliclack::log::info("Skipped post-creation steps")?,
        }
    }

    // Step 9: Show next steps
    print_next_steps(config, &project_dir, apptype)?;

    Ok(())
}

fn resolve_args<C: ProductConfig>(config: &C, opts: &CreateOptions) -> Result<ResolvedArgs> {
    let specs = create_arg_specs(config, opts.with_template);

    let mut flags = opts.flags.clone();
    if opts.yes {
        // Non-interactive runs default the output directory to cwd.
        flags
            .entry("outputdir".to_string())
            .or_insert_with(String::new);
        return resolve::resolve_from_flags(&specs, &flags).map_err(Into::into);
    }

    match resolve::resolve(&specs, &flags, &mut CliclackPrompter) {
        Ok(resolved) => Ok(resolved),
        Err(ArgsError::Cancelled) => anyhow::bail!("Setup cancelled."),
        Err(e) => Err(e.into()),
    }
}

async fn handle_cordova_check(yes: bool) -> Result<()> {
    let tool = cordova_tool();

    if tool.is_installed() {
        let version = tool.get_version().unwrap_or_else(|| "unknown".to_string());
        cliclack::log::success(format!("{} installed ({})", tool.display_name(), version))?;
        return Ok(());
    }

    cliclack::log::warning(format!("{} is not installed", tool.display_name()))?;

    // In non-interactive mode, just continue
    if yes {
        cliclack::log::info(format!(
            "Continuing without {} (--yes mode)",
            tool.display_name()
        ))?;
        return Ok(());
    }

    let action: &str = cliclack::select("What would you like to do?")
        .item(
            "install",
            format!("Install {} automatically", tool.display_name()),
            "",
        )
        .item(
            "docs",
            format!("Open documentation ({})", tool.config().docs_url),
            "",
        )
        .item(
            "skip",
            format!("Skip and continue without {}", tool.display_name()),
            "",
        )
        .interact()?;

    match action {
        "install" => {
            cliclack::log::info(format!("This will execute: {}", tool.install_command()))?;

            let confirm: bool = cliclack::confirm("Proceed with installation?")
                .initial_value(true)
                .interact()?;

            if !confirm {
                cliclack::log::info(format!(
                    "Continuing without {}. See the docs for installation instructions: ({})",
                    tool.display_name(),
                    tool.config().docs_url
                ))?;
                return Ok(());
            }

            match tool.install().await {
                Ok(()) => {
                    cliclack::log::success(format!(
                        "{} installed successfully",
                        tool.display_name()
                    ))?;
                }
                Err(e) => {
                    cliclack::log::error(format!("{e}"))?;

                    let continue_anyway: bool =
                        cliclack::confirm(format!("Continue without {}?", tool.display_name()))
                            .initial_value(false)
                            .interact()?;

                    if !continue_anyway {
                        anyhow::bail!("Setup cancelled.");
                    }
                }
            }
        }
        "docs" => {
            tool.open_docs()?;
            cliclack::outro(format!(
                "After installing {}, run this command again.",
                tool.display_name()
            ))?;
            std::process::exit(0);
        }
        "skip" => {
            cliclack::log::info(format!(
                "Continuing without {}. See the docs for installation instructions: ({})",
                tool.display_name(),
                tool.config().docs_url
            ))?;
        }
        _ => {}
    }

    Ok(())
}

fn check_platform_tools<C: ProductConfig>(config: &C, apptype: AppType) -> Result<()> {
    let required: Vec<Tool> = config
        .required_tools(apptype)
        .into_iter()
        .filter(|t| *t != Tool::Cordova)
        .collect();
    if required.is_empty() {
        return Ok(());
    }

    let spinner = cliclack::spinner();
    spinner.start("Checking tools...");

    match check::check_tools(&required) {
        Ok(tools) => {
            let tool_info: Vec<String> = tools
                .iter()
                .map(|t| {
                    format!(
                        "{} ({})",
                        t.tool.display_name(),
                        t.version.as_deref().unwrap_or("unknown")
                    )
                })
                .collect();
            spinner.stop(format!("Detected tools: {}", tool_info.join(", ")));
            Ok(())
        }
        Err(e) => {
            spinner.stop("Missing tools");
            cliclack::log::error(format!("{e}"))?;
            anyhow::bail!("Please install the missing tools and try again.");
        }
    }
}

/// Resolve the directory the project will be created in: the output
/// directory (default: current directory) joined with the app name.
fn project_dir(resolved: &ResolvedArgs) -> Result<PathBuf> {
    let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let outputdir = resolved.get_or_empty("outputdir");
    let base = if outputdir.is_empty() || outputdir == "." {
        current_dir
    } else {
        let p = PathBuf::from(outputdir);
        if p.is_absolute() {
            p
        } else {
            current_dir.join(p)
        }
    };

    if !base.exists() {
        anyhow::bail!("Output directory does not exist: {}", base.display());
    }

    Ok(base.join(resolved.get_or_empty("appname")))
}

fn setup_fetcher<C: ProductConfig>(
    config: &C,
    opts: &CreateOptions,
    resolved: &ResolvedArgs,
) -> Result<TemplateFetcher> {
    if let Some(path) = &opts.template_dir {
        cliclack::log::info(format!("Using local templates from {}", path.display()))?;
        return Ok(TemplateFetcher::from_local(
            path.clone(),
            config.user_agent(),
        ));
    }

    if let Some(uri) = resolved.get("templaterepouri") {
        cliclack::log::info(format!("Using template repository {uri}"))?;
        let source = TemplateSource::remote(uri)?;
        return Ok(TemplateFetcher::new(source, config.user_agent()));
    }

    cliclack::log::info("Using remote templates")?;
    TemplateFetcher::from_config(config)
}

async fn select_template(
    fetcher: &mut TemplateFetcher,
    apptype: AppType,
    requested: Option<&str>,
    auto: bool,
) -> Result<(String, TemplateManifest, AppTypeFiles)> {
    let spinner = cliclack::spinner();
    spinner.start("Loading templates...");

    let root_manifest = fetcher.fetch_root_manifest().await?;

    // Template patterns extend the root's
    let merge_files = |manifest: &TemplateManifest| -> AppTypeFiles {
        let mut merged = root_manifest.apptype_files.clone();
        merged.merge(&manifest.apptype_files);
        merged
    };

    // An explicitly requested template is used directly
    if let Some(template_name) = requested {
        if !root_manifest.templates.contains(&template_name.to_string()) {
            spinner.stop("Failed to load templates");
            let available = root_manifest.templates.join(", ");
            anyhow::bail!("Template '{template_name}' not found. Available templates: {available}");
        }

        let manifest = fetcher.fetch_template_manifest(template_name).await?;
        if !manifest.supports(apptype) {
            spinner.stop("Failed to load templates");
            anyhow::bail!(
                "Template '{}' does not support app type '{}'",
                template_name,
                apptype
            );
        }
        let apptype_files = merge_files(&manifest);
        spinner.stop(format!(
            "Template: {} - {}",
            manifest.name, manifest.description
        ));
        return Ok((template_name.to_string(), manifest, apptype_files));
    }

    let mut candidates: Vec<(String, TemplateManifest)> = Vec::new();
    for template_name in &root_manifest.templates {
        let manifest = fetcher.fetch_template_manifest(template_name).await?;
        if manifest.supports(apptype) {
            candidates.push((template_name.clone(), manifest));
        }
    }

    spinner.stop("Templates loaded");

    if candidates.is_empty() {
        anyhow::bail!("No template supports app type '{apptype}'.");
    }

    // A single candidate (or --yes mode) skips the selection prompt
    if candidates.len() == 1 || auto {
        let (name, manifest) = candidates.swap_remove(0);
        let apptype_files = merge_files(&manifest);
        cliclack::log::info(format!(
            "Using template: {} - {}",
            manifest.name, manifest.description
        ))?;
        return Ok((name, manifest, apptype_files));
    }

    // Build select prompt - use indices to avoid borrow issues
    let mut select = cliclack::select("Select a template");
    for (idx, (_, manifest)) in candidates.iter().enumerate() {
        select = select.item(idx, &manifest.name, &manifest.description);
    }
    let selected_idx: usize = select.interact()?;

    let (name, manifest) = candidates.swap_remove(selected_idx);
    let apptype_files = merge_files(&manifest);
    Ok((name, manifest, apptype_files))
}

fn print_next_steps<C: ProductConfig>(
    config: &C,
    project_dir: &PathBuf,
    apptype: AppType,
) -> Result<()> {
    let steps = config.next_steps(project_dir, apptype);

    println!();
    println!("  Next steps");
    println!();

    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step);
    }

    cliclack::outro("Happy coding!")?;

    Ok(())
}

/// List the templates available for a product, with the app types each
/// one supports.
pub async fn list_templates<C: ProductConfig>(
    config: &C,
    template_dir: &Option<PathBuf>,
) -> Result<()> {
    cliclack::intro(format!("{} templates", config.display_name()))?;

    let mut fetcher = match template_dir {
        Some(path) => {
            cliclack::log::info(format!("Using local templates from {}", path.display()))?;
            TemplateFetcher::from_local(path.clone(), config.user_agent())
        }
        None => TemplateFetcher::from_config(config)?,
    };

    let spinner = cliclack::spinner();
    spinner.start("Loading templates...");
    let root_manifest = fetcher.fetch_root_manifest().await?;

    let mut listed = Vec::new();
    for template_name in &root_manifest.templates {
        let manifest = fetcher.fetch_template_manifest(template_name).await?;
        listed.push((template_name.clone(), manifest));
    }
    spinner.stop(format!("{} template(s) available", listed.len()));

    println!();
    for (name, manifest) in &listed {
        let apptypes = if manifest.apptypes.is_empty() {
            "any".to_string()
        } else {
            manifest.apptypes.join(", ")
        };
        println!("  {name} - {} ({apptypes})", manifest.description);
    }
    println!();

    cliclack::outro("Use --apptype and the create command to get started.")?;

    Ok(())
}
