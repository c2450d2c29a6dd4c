//! Installation of missing CLI tools
//!
//! Wraps the "offer to install it" flow for tools that can be installed
//! with a single shell command, streaming installer output to the terminal.

use anyhow::Result;
use colored::Colorize;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

use super::check::Tool;

/// Timeout for installation (120 seconds; npm installs are slow)
const INSTALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for an installable tool
#[derive(Debug, Clone)]
pub struct ToolConfig {
    pub tool: Tool,
    /// Shell command that installs the tool
    pub install_command: &'static str,
    /// URL to the tool's documentation
    pub docs_url: &'static str,
}

/// Manager for checking and installing a CLI tool
pub struct ToolManager {
    config: ToolConfig,
}

impl ToolManager {
    pub fn new(config: ToolConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    pub fn display_name(&self) -> &'static str {
        self.config.tool.display_name()
    }

    pub fn install_command(&self) -> &'static str {
        self.config.install_command
    }

    /// Check if the tool is installed and available in PATH
    pub fn is_installed(&self) -> bool {
        std::process::Command::new("which")
            .arg(self.config.tool.binary_name())
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Get the installed tool version (if available)
    pub fn get_version(&self) -> Option<String> {
        super::check::probe(self.config.tool).version
    }

    /// Install the tool, streaming installer output as it arrives
    pub async fn install(&self) -> Result<()> {
        let cmd = self.install_command();
        println!();
        println!("{} {}", "Running:".dimmed(), cmd.yellow());
        println!();

        let mut child = TokioCommand::new("sh")
            .arg("-c")
            .arg(cmd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow::anyhow!("failed to capture installer stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow::anyhow!("failed to capture installer stderr"))?;

        let mut stdout_lines = BufReader::new(stdout).lines();
        let mut stderr_lines = BufReader::new(stderr).lines();

        let stream_output = async {
            loop {
                tokio::select! {
                    line = stdout_lines.next_line() => {
                        match line {
                            Ok(Some(line)) => println!("  {}", line),
                            Ok(None) => break,
                            Err(e) => {
                                eprintln!("{} {}", "Error reading stdout:".red(), e);
                                break;
                            }
                        }
                    }
                    line = stderr_lines.next_line() => {
                        match line {
                            Ok(Some(line)) => eprintln!("  {}", line.yellow()),
                            Ok(None) => {}
                            Err(e) => {
                                eprintln!("{} {}", "Error reading stderr:".red(), e);
                            }
                        }
                    }
                }
            }
        };

        if timeout(INSTALL_TIMEOUT, stream_output).await.is_err() {
            let _ = child.kill().await;
            println!();
            anyhow::bail!(
                "Installation timed out after {} seconds. Please try again or install manually:\n{}",
                INSTALL_TIMEOUT.as_secs(),
                cmd
            );
        }

        match timeout(Duration::from_secs(5), child.wait()).await {
            Ok(Ok(status)) => {
                println!();
                if status.success() {
                    Ok(())
                } else {
                    anyhow::bail!(
                        "Installation failed with exit code: {}\nPlease try installing manually: {}",
                        status.code().unwrap_or(-1),
                        cmd
                    );
                }
            }
            Ok(Err(e)) => anyhow::bail!("Failed to wait for installer: {}", e),
            Err(_) => {
                let _ = child.kill().await;
                anyhow::bail!("Installation process hung. Please install manually:\n{}", cmd);
            }
        }
    }

    /// Open the tool's documentation in the default browser
    pub fn open_docs(&self) -> Result<()> {
        println!(
            "{}",
            format!("Opening {} documentation in your browser...", self.display_name()).cyan()
        );
        open::that(self.config.docs_url)?;
        Ok(())
    }
}

/// Pre-configured manager for Cordova, needed by hybrid app types
pub fn cordova_tool() -> ToolManager {
    ToolManager::new(ToolConfig {
        tool: Tool::Cordova,
        install_command: "npm install -g cordova",
        docs_url: "https://cordova.apache.org/docs/en/latest/",
    })
}
