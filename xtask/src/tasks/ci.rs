use colored::Colorize;
use std::process::{Command, ExitStatus, Stdio};

use crate::{project_root, DynError};

pub fn ci() -> Result<(), DynError> {
    let tasks = vec![
        ("cargo fmt", vec!["fmt", "--all", "--", "--check"]),
        (
            "cargo check on workspace",
            vec!["check", "--workspace", "--all-targets"],
        ),
        (
            "cargo check with native-tls",
            vec![
                "check",
                "--workspace",
                "--all-targets",
                "--features",
                "ravendb_dependency_injection/native-tls",
            ],
        ),
        (
            "cargo clippy",
            vec!["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
        ),
        ("cargo build on examples", vec!["build", "--workspace", "--examples"]),
        ("cargo nextest", vec!["nextest", "run", "--workspace"]),
        ("cargo test on docs", vec!["test", "--workspace", "--doc"]),
        ("cargo audit", vec!["audit"]),
    ];

    for (name, args) in tasks {
        let mut cmd = cargo_command(args);
        println!(
            "{}{}{}",
            "Running ".truecolor(255, 165, 0),
            name.truecolor(255, 165, 0),
            "...".truecolor(255, 165, 0)
        );
        let status = cmd.status()?;
        print_error_with_status_code(name, status);
        if !status.success() {
            return Err(format!("ci failed at `{}`", name).into());
        }
    }

    println!("{}", "All ci tasks passed".green());
    Ok(())
}

fn print_error_with_status_code(task: &str, status: ExitStatus) {
    let code = match status.code() {
        Some(x) => x.to_string(),
        None => "<< no status code >>".to_string(),
    };
    if !status.success() {
        println!(
            "{} `{}` finished with a non-zero status code: {}",
            "Error:".to_string().red(),
            task.blue(),
            code
        );
    }
}

fn cargo_command(args: Vec<&str>) -> Command {
    let cargo = std::env::var("CARGO").unwrap_or_else(|_| "cargo".to_string());
    let mut cmd = Command::new(cargo);
    cmd.current_dir(project_root())
        .args(args)
        .stdout(Stdio::inherit());
    cmd
}
