//! Sequential tree execution with confirmation gating

use super::node::{CommandNode, Group, Leaf};
use colored::Colorize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command as ProcessCommand;
use thiserror::Error;

/// Errors from running a command tree.
#[derive(Debug, Error)]
pub enum RunError {
    /// A command failed and the user declined to continue. The whole run
    /// stops, including pending sibling and ancestor steps.
    #[error("aborted after failed command: {command}")]
    Aborted { command: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// How a tree run ended when it did not error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every child executed (or was deliberately skipped).
    Completed,
    /// The top-level confirmation was declined; nothing executed.
    Declined,
}

/// Execution state threaded through the tree.
///
/// The auto-confirm flag answers every confirmation with "yes" for the
/// whole run; it is part of the context rather than process-global state.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub cwd: PathBuf,
    pub depth: usize,
    pub auto_confirm: bool,
}

impl ExecutionContext {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            depth: 0,
            auto_confirm: false,
        }
    }

    pub fn auto_confirm(mut self, yes: bool) -> Self {
        self.auto_confirm = yes;
        self
    }

    /// Context for a nested node, one level deeper.
    fn child(&self, cwd: PathBuf) -> Self {
        Self {
            cwd,
            depth: self.depth + 1,
            auto_confirm: self.auto_confirm,
        }
    }
}

/// Executes a single shell command to completion.
pub trait Shell {
    /// Run `command` in `cwd`; returns whether it exited successfully.
    fn run(&mut self, command: &str, cwd: &Path) -> bool;
}

/// Runs commands through `sh -c`, inheriting stdio.
pub struct SystemShell;

impl Shell for SystemShell {
    fn run(&mut self, command: &str, cwd: &Path) -> bool {
        let status = ProcessCommand::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(cwd)
            .status();

        match status {
            Ok(status) => status.success(),
            Err(e) => {
                eprintln!("{} {}: {}", "Failed to spawn".red(), command, e);
                false
            }
        }
    }
}

/// Asks the user to confirm continuing.
pub trait Gate {
    fn confirm(&mut self, message: &str) -> Result<bool, RunError>;
}

/// Executes a command tree depth-first, one child at a time.
pub struct Runner<'a> {
    shell: &'a mut dyn Shell,
    gate: &'a mut dyn Gate,
}

impl<'a> Runner<'a> {
    pub fn new(shell: &'a mut dyn Shell, gate: &'a mut dyn Gate) -> Self {
        Self { shell, gate }
    }

    /// Run a tree rooted at `node`.
    ///
    /// At depth 0 a group prints its banner and asks for confirmation;
    /// declining returns `RunOutcome::Declined` without executing any
    /// child. Nested groups never re-prompt.
    pub fn run(&mut self, ctx: &ExecutionContext, node: &CommandNode) -> Result<RunOutcome, RunError> {
        match node {
            CommandNode::Group(group) => self.run_group(ctx, group),
            CommandNode::Leaf(leaf) => {
                self.exec_leaf(ctx, leaf, 1, 1)?;
                Ok(RunOutcome::Completed)
            }
        }
    }

    fn run_group(&mut self, ctx: &ExecutionContext, group: &Group) -> Result<RunOutcome, RunError> {
        if ctx.depth == 0 {
            println!();
            println!("{}", group.message.cyan().bold());
            if !ctx.auto_confirm && !self.gate.confirm("Proceed?")? {
                return Ok(RunOutcome::Declined);
            }
        }

        let children = group.active_children();
        let total = children.len();

        for (i, child) in children.iter().enumerate() {
            match child {
                CommandNode::Group(sub) => {
                    print_progress(ctx.depth, i + 1, total, &ctx.cwd, &sub.message);
                    let child_ctx = ctx.child(ctx.cwd.clone());
                    self.run_group(&child_ctx, sub)?;
                }
                CommandNode::Leaf(leaf) => {
                    self.exec_leaf(ctx, leaf, i + 1, total)?;
                }
            }
        }

        Ok(RunOutcome::Completed)
    }

    fn exec_leaf(
        &mut self,
        ctx: &ExecutionContext,
        leaf: &Leaf,
        index: usize,
        total: usize,
    ) -> Result<(), RunError> {
        let cwd = leaf.working_dir(&ctx.cwd);
        print_progress(ctx.depth, index, total, &cwd, &leaf.command);

        if self.shell.run(&leaf.command, &cwd) {
            return Ok(());
        }

        if let Some(fallback) = &leaf.fallback {
            let child_ctx = ctx.child(cwd);
            self.run(&child_ctx, fallback)?;
            return Ok(());
        }

        if leaf.ignore_error || ctx.auto_confirm {
            return Ok(());
        }

        let message = format!("Command failed: {}. Continue?", leaf.command);
        if self.gate.confirm(&message)? {
            Ok(())
        } else {
            Err(RunError::Aborted {
                command: leaf.command.clone(),
            })
        }
    }
}

/// One progress line: 1-based index and total at this level, working
/// directory, and the command or group message, indented by depth.
fn render_progress(depth: usize, index: usize, total: usize, cwd: &Path, text: &str) -> String {
    let marker = "*".repeat(depth + 1);
    format!("{} [{}/{}] ({}) {}", marker, index, total, cwd.display(), text)
}

fn print_progress(depth: usize, index: usize, total: usize, cwd: &Path, text: &str) {
    println!("{}", render_progress(depth, index, total, cwd, text));
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Scripted shell: commands listed in `failures` fail, everything else
    /// succeeds. Records every invocation in order.
    struct MockShell {
        failures: Vec<String>,
        calls: Vec<(String, PathBuf)>,
    }

    impl MockShell {
        fn new(failures: &[&str]) -> Self {
            Self {
                failures: failures.iter().map(|s| s.to_string()).collect(),
                calls: Vec::new(),
            }
        }

        fn commands(&self) -> Vec<&str> {
            self.calls.iter().map(|(c, _)| c.as_str()).collect()
        }
    }

    impl Shell for MockShell {
        fn run(&mut self, command: &str, cwd: &Path) -> bool {
            self.calls.push((command.to_string(), cwd.to_path_buf()));
            !self.failures.iter().any(|f| f == command)
        }
    }

    /// Scripted gate: pops pre-seeded answers, records every prompt.
    struct MockGate {
        answers: VecDeque<bool>,
        prompts: Vec<String>,
    }

    impl MockGate {
        fn new(answers: &[bool]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                prompts: Vec::new(),
            }
        }
    }

    impl Gate for MockGate {
        fn confirm(&mut self, message: &str) -> Result<bool, RunError> {
            self.prompts.push(message.to_string());
            Ok(self.answers.pop_front().unwrap_or(true))
        }
    }

    fn ctx() -> ExecutionContext {
        ExecutionContext::new("/work")
    }

    #[test]
    fn runs_children_in_order() {
        let mut shell = MockShell::new(&[]);
        let mut gate = MockGate::new(&[true]);
        let tree = Group::new("setup").child("first").child("second").into();

        let outcome = Runner::new(&mut shell, &mut gate).run(&ctx(), &tree).unwrap();
        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(shell.commands(), vec!["first", "second"]);
    }

    #[test]
    fn declined_top_confirmation_executes_nothing() {
        let mut shell = MockShell::new(&[]);
        let mut gate = MockGate::new(&[false]);
        let tree = Group::new("setup").child("first").child("second").into();

        let outcome = Runner::new(&mut shell, &mut gate).run(&ctx(), &tree).unwrap();
        assert_eq!(outcome, RunOutcome::Declined);
        assert!(shell.calls.is_empty());
    }

    #[test]
    fn placeholder_children_are_skipped_and_not_counted() {
        let mut shell = MockShell::new(&[]);
        let mut gate = MockGate::new(&[true]);
        let group = Group::new("steps")
            .child("cmd-a")
            .child_if(None::<Leaf>)
            .child("cmd-b");

        assert_eq!(group.active_children().len(), 2);
        assert_eq!(
            render_progress(0, 2, group.active_children().len(), Path::new("/w"), "cmd-b"),
            "* [2/2] (/w) cmd-b"
        );

        Runner::new(&mut shell, &mut gate)
            .run(&ctx(), &group.into())
            .unwrap();
        assert_eq!(shell.commands(), vec!["cmd-a", "cmd-b"]);
    }

    #[test]
    fn nested_groups_do_not_reprompt() {
        let mut shell = MockShell::new(&[]);
        let mut gate = MockGate::new(&[true]);
        let tree = Group::new("outer")
            .child(Group::new("inner").child("nested-cmd"))
            .into();

        Runner::new(&mut shell, &mut gate).run(&ctx(), &tree).unwrap();
        assert_eq!(gate.prompts, vec!["Proceed?"]);
        assert_eq!(shell.commands(), vec!["nested-cmd"]);
    }

    #[test]
    fn ignored_failure_continues_without_prompting() {
        let mut shell = MockShell::new(&["flaky"]);
        let mut gate = MockGate::new(&[true]);
        let tree = Group::new("setup")
            .child(Leaf::new("flaky").ignore_error())
            .child("after")
            .into();

        Runner::new(&mut shell, &mut gate).run(&ctx(), &tree).unwrap();
        assert_eq!(shell.commands(), vec!["flaky", "after"]);
        assert_eq!(gate.prompts, vec!["Proceed?"]);
    }

    #[test]
    fn fallback_runs_once_instead_of_escalating() {
        let mut shell = MockShell::new(&["primary"]);
        let mut gate = MockGate::new(&[true]);
        let tree = Group::new("setup")
            .child(Leaf::new("primary").fallback(Leaf::new("backup")))
            .child("after")
            .into();

        Runner::new(&mut shell, &mut gate).run(&ctx(), &tree).unwrap();
        assert_eq!(shell.commands(), vec!["primary", "backup", "after"]);
        // Only the top-level confirmation; no error gate for the fallback.
        assert_eq!(gate.prompts, vec!["Proceed?"]);
    }

    #[test]
    fn fallback_inherits_the_failed_leaf_directory() {
        let mut shell = MockShell::new(&["git clone repo"]);
        let mut gate = MockGate::new(&[true]);
        let tree = Group::new("setup")
            .child(
                Leaf::new("git clone repo")
                    .rel_dir("checkout")
                    .fallback(Leaf::new("git fetch origin")),
            )
            .into();

        Runner::new(&mut shell, &mut gate).run(&ctx(), &tree).unwrap();
        assert_eq!(shell.calls[1].1, PathBuf::from("/work/checkout"));
    }

    #[test]
    fn confirmed_failure_continues_to_next_sibling() {
        let mut shell = MockShell::new(&["broken"]);
        let mut gate = MockGate::new(&[true, true]);
        let tree = Group::new("setup").child("broken").child("after").into();

        Runner::new(&mut shell, &mut gate).run(&ctx(), &tree).unwrap();
        assert_eq!(shell.commands(), vec!["broken", "after"]);
        assert_eq!(gate.prompts.len(), 2);
        assert!(gate.prompts[1].contains("broken"));
    }

    #[test]
    fn declined_failure_aborts_the_whole_run() {
        let mut shell = MockShell::new(&["broken"]);
        let mut gate = MockGate::new(&[true, false]);
        let tree = Group::new("setup").child("broken").child("after").into();

        let err = Runner::new(&mut shell, &mut gate)
            .run(&ctx(), &tree)
            .unwrap_err();
        assert!(matches!(err, RunError::Aborted { command } if command == "broken"));
        assert_eq!(shell.commands(), vec!["broken"]);
    }

    #[test]
    fn declined_failure_in_nested_group_stops_ancestors() {
        let mut shell = MockShell::new(&["inner-broken"]);
        let mut gate = MockGate::new(&[true, false]);
        let tree = Group::new("outer")
            .child(Group::new("inner").child("inner-broken"))
            .child("outer-after")
            .into();

        let err = Runner::new(&mut shell, &mut gate)
            .run(&ctx(), &tree)
            .unwrap_err();
        assert!(matches!(err, RunError::Aborted { .. }));
        assert_eq!(shell.commands(), vec!["inner-broken"]);
    }

    #[test]
    fn auto_confirm_bypasses_every_gate() {
        let mut shell = MockShell::new(&["broken"]);
        let mut gate = MockGate::new(&[]);
        let tree = Group::new("setup").child("broken").child("after").into();
        let ctx = ExecutionContext::new("/work").auto_confirm(true);

        Runner::new(&mut shell, &mut gate).run(&ctx, &tree).unwrap();
        assert!(gate.prompts.is_empty());
        assert_eq!(shell.commands(), vec!["broken", "after"]);
    }

    #[test]
    fn leaf_directories_resolve_against_the_inherited_context() {
        let mut shell = MockShell::new(&[]);
        let mut gate = MockGate::new(&[true]);
        let tree = Group::new("dirs")
            .child(Leaf::new("a").dir("/explicit"))
            .child(Leaf::new("b").rel_dir("sub"))
            .child(Leaf::new("c"))
            .into();

        Runner::new(&mut shell, &mut gate).run(&ctx(), &tree).unwrap();
        let dirs: Vec<&Path> = shell.calls.iter().map(|(_, d)| d.as_path()).collect();
        assert_eq!(
            dirs,
            vec![
                Path::new("/explicit"),
                Path::new("/work/sub"),
                Path::new("/work")
            ]
        );
    }

    #[test]
    fn progress_indents_by_depth() {
        assert_eq!(
            render_progress(2, 1, 3, Path::new("/w"), "cmd"),
            "*** [1/3] (/w) cmd"
        );
    }
}
