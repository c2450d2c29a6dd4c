//! forceios - Project scaffolding for iOS mobile apps

use anyhow::Result;
use clap::{Parser, Subcommand};
use forge_core::args::Flags;
use forge_core::config::{check_config, ConfigKind};
use forge_core::create::CreateOptions;
use forge_core::product::{AppType, ProductConfig};
use forge_core::runner::{CommandNode, Group, Leaf};
use forge_core::runtime::check::Tool;
use std::path::{Path, PathBuf};

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// forceios product configuration
#[derive(Clone)]
pub struct ForceiosConfig;

impl ProductConfig for ForceiosConfig {
    fn name(&self) -> &'static str {
        "forceios"
    }

    fn display_name(&self) -> &'static str {
        "forceios"
    }

    fn default_template_url(&self) -> &'static str {
        "https://raw.githubusercontent.com/force-cli/templates/main/forceios"
    }

    fn template_url_env(&self) -> &'static str {
        "FORCEIOS_TEMPLATE_URL"
    }

    fn docs_url(&self) -> &'static str {
        "https://force-cli.dev/docs/ios"
    }

    fn cli_description(&self) -> &'static str {
        "CLI for creating iOS mobile apps"
    }

    fn upgrade_command(&self) -> &'static str {
        "cargo install forceios --force"
    }

    fn app_types(&self) -> &'static [AppType] {
        &[
            AppType::Native,
            AppType::NativeSwift,
            AppType::ReactNative,
            AppType::HybridLocal,
            AppType::HybridRemote,
        ]
    }

    fn required_tools(&self, apptype: AppType) -> Vec<Tool> {
        let mut tools = vec![Tool::Git, Tool::Node, Tool::Npm];
        match apptype {
            AppType::Native | AppType::NativeSwift => tools.push(Tool::CocoaPods),
            AppType::HybridLocal | AppType::HybridRemote => tools.push(Tool::Cordova),
            _ => {}
        }
        tools
    }

    fn post_create(&self, project_dir: &Path, apptype: AppType) -> Option<CommandNode> {
        let is_native = matches!(apptype, AppType::Native | AppType::NativeSwift);
        let group = Group::new(format!("Preparing {}", project_dir.display()))
            .child(Leaf::new("git init").dir(project_dir).ignore_error())
            .child_if(
                matches!(apptype, AppType::ReactNative)
                    .then(|| Leaf::new("npm install").dir(project_dir)),
            )
            .child_if(is_native.then(|| Leaf::new("pod install").dir(project_dir).ignore_error()));
        Some(CommandNode::Group(group))
    }

    fn next_steps(&self, dir: &Path, apptype: AppType) -> Vec<String> {
        let mut steps = Vec::new();
        let current = std::env::current_dir().ok();

        if current.as_ref() != Some(&dir.to_path_buf()) {
            steps.push(format!("cd {}", dir.display()));
        }

        match apptype {
            AppType::Native | AppType::NativeSwift => {
                steps.push("Open the .xcworkspace in Xcode".to_string());
            }
            AppType::ReactNative => {
                steps.push("npm start".to_string());
            }
            AppType::HybridLocal | AppType::HybridRemote => {
                steps.push("cordova platform add ios".to_string());
                steps.push("cordova build".to_string());
            }
            AppType::NativeKotlin => {}
        }

        steps
    }
}

#[derive(Parser, Debug)]
#[command(name = "forceios")]
#[command(about = "CLI for creating iOS mobile apps")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a mobile app from the standard templates
    Create(CreateCliArgs),
    /// Create a mobile app from a custom template repository
    #[command(name = "createwithtemplate")]
    CreateWithTemplate(CreateWithTemplateCliArgs),
    /// List the templates available for this product
    #[command(name = "listtemplates")]
    ListTemplates(ListTemplatesArgs),
    /// Validate a JSON config file against its schema
    Checkconfig(CheckconfigArgs),
    /// Print the CLI version
    Version,
}

#[derive(Parser, Debug)]
pub struct CreateCliArgs {
    /// Application name (no whitespace)
    #[arg(long)]
    pub appname: Option<String>,

    /// Package identifier (com.mycompany.myapp)
    #[arg(long)]
    pub packagename: Option<String>,

    /// Organization name
    #[arg(long)]
    pub organization: Option<String>,

    /// Directory the app directory is created in
    #[arg(long)]
    pub outputdir: Option<String>,

    /// Application type
    #[arg(long)]
    pub apptype: Option<String>,

    /// Start page (hybrid_remote apps only)
    #[arg(long)]
    pub startpage: Option<String>,

    /// Local directory to use for templates instead of fetching from remote (for development use)
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl CreateCliArgs {
    fn flags(&self) -> Flags {
        let mut flags = Flags::new();
        for (name, value) in [
            ("appname", &self.appname),
            ("packagename", &self.packagename),
            ("organization", &self.organization),
            ("outputdir", &self.outputdir),
            ("apptype", &self.apptype),
            ("startpage", &self.startpage),
        ] {
            if let Some(v) = value {
                flags.insert(name.to_string(), v.clone());
            }
        }
        flags
    }

    fn into_options(self, with_template: bool) -> CreateOptions {
        CreateOptions {
            flags: self.flags(),
            template_dir: self.template_dir,
            with_template,
            yes: self.yes,
        }
    }
}

#[derive(Parser, Debug)]
pub struct CreateWithTemplateCliArgs {
    #[command(flatten)]
    pub base: CreateCliArgs,

    /// URI of the template repository
    #[arg(long)]
    pub templaterepouri: Option<String>,

    /// Template name inside the repository
    #[arg(long, hide = true)]
    pub templatepath: Option<String>,
}

impl CreateWithTemplateCliArgs {
    fn into_options(self) -> CreateOptions {
        let mut options = self.base.into_options(true);
        if let Some(uri) = self.templaterepouri {
            options.flags.insert("templaterepouri".to_string(), uri);
        }
        if let Some(path) = self.templatepath {
            options.flags.insert("templatepath".to_string(), path);
        }
        options
    }
}

#[derive(Parser, Debug)]
pub struct ListTemplatesArgs {
    /// Local directory to use for templates instead of fetching from remote (for development use)
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct CheckconfigArgs {
    /// Path to the JSON config file to validate
    #[arg(long)]
    pub configpath: PathBuf,

    /// Kind of config file (create, createwithtemplate, release)
    #[arg(long)]
    pub configtype: String,
}

fn run_checkconfig(args: &CheckconfigArgs) -> Result<()> {
    let Some(kind) = ConfigKind::parse(&args.configtype) else {
        anyhow::bail!(
            "Unknown config type '{}'. Valid types: {}",
            args.configtype,
            ConfigKind::all_tags().join(", ")
        );
    };

    let report = check_config(&args.configpath, kind)?;
    report.print(&args.configpath);
    if !report.conforms() {
        std::process::exit(1);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    let config = ForceiosConfig;

    match args.command {
        Command::Create(create_args) => {
            let result =
                forge_core::create::run(&config, create_args.into_options(false), CLI_VERSION)
                    .await;

            // Ensure cursor is visible on normal exit
            let _ = console::Term::stderr().show_cursor();

            result
        }
        Command::CreateWithTemplate(create_args) => {
            let result =
                forge_core::create::run(&config, create_args.into_options(), CLI_VERSION).await;

            let _ = console::Term::stderr().show_cursor();

            result
        }
        Command::ListTemplates(list_args) => {
            forge_core::create::list_templates(&config, &list_args.template_dir).await
        }
        Command::Checkconfig(check_args) => run_checkconfig(&check_args),
        Command::Version => {
            println!("forceios {CLI_VERSION}");
            Ok(())
        }
    }
}
