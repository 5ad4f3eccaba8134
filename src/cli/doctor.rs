//! Doctor command - check environment

use crate::config::{CiConfig, CONFIG_FILE};
use crate::github::{ENV_GITHUB_REPOSITORY, ENV_GITHUB_TOKEN, ENV_PR_NUMBER};
use crate::runner::{split_command, with_args, CommandRunner, ProcessRunner};
use anyhow::Result;
use std::path::Path;

pub fn run(path: &Path) -> Result<()> {
    println!("🩺 flutter-ci Doctor\n");
    let mut problems = 0;

    let config = CiConfig::load(path);
    if path.join(CONFIG_FILE).exists() {
        println!("✓ Config: {}", path.join(CONFIG_FILE).display());
    } else {
        println!("○ Config: defaults (no {})", CONFIG_FILE);
    }

    // Flutter itself
    let argv = with_args(&split_command(&config.flutter.command), &["--version"]);
    match ProcessRunner::new(60).run(&argv, path) {
        Ok(out) if out.success() => {
            let first = out.stdout.lines().next().unwrap_or("").trim();
            println!("✓ Flutter: {}", first);
        }
        Ok(out) => {
            problems += 1;
            println!("✗ Flutter: `{}` exited with {:?}", out.command, out.code);
        }
        Err(e) => {
            problems += 1;
            println!("✗ Flutter: {}", e);
            println!("  Set FLUTTER_CMD or [flutter].command if Flutter is not on PATH");
        }
    }

    if path.join("pubspec.yaml").exists() {
        println!("✓ Project: pubspec.yaml found");
    } else {
        problems += 1;
        println!("✗ Project: no pubspec.yaml in {}", path.display());
    }

    // PR comments are optional
    let github: Vec<_> = [ENV_PR_NUMBER, ENV_GITHUB_TOKEN, ENV_GITHUB_REPOSITORY]
        .into_iter()
        .map(|key| (key, std::env::var(key).is_ok()))
        .collect();
    if github.iter().all(|(_, set)| *set) {
        println!("✓ GitHub: PR comments enabled");
    } else {
        let missing: Vec<_> = github
            .iter()
            .filter(|(_, set)| !set)
            .map(|(key, _)| *key)
            .collect();
        println!("○ GitHub: PR comments off (missing {})", missing.join(", "));
    }

    if problems == 0 {
        println!("\n✅ All checks passed!");
    } else {
        println!("\n⚠️  {} problem(s) found", problems);
    }
    Ok(())
}
