use anyhow::{anyhow, Result};
use clap::Command;
use clap_complete::{generate, shells};
use std::io::{self, Write};
use std::str::FromStr;

/// Supported shell types for completion generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
}

impl FromStr for Shell {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "bash" => Ok(Shell::Bash),
            "zsh" => Ok(Shell::Zsh),
            "fish" => Ok(Shell::Fish),
            _ => Err(anyhow!(
                "Unsupported shell: {s}. Supported shells: bash, zsh, fish"
            )),
        }
    }
}

impl std::fmt::Display for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shell::Bash => write!(f, "bash"),
            Shell::Zsh => write!(f, "zsh"),
            Shell::Fish => write!(f, "fish"),
        }
    }
}

/// Generate a completion script for `cmd` and write it to stdout.
///
/// ```no_run
/// use annotrack::completions::{generate_completions, Shell};
/// use clap::Command;
///
/// let mut cmd = Command::new("annotrack");
/// generate_completions(&mut cmd, Shell::Zsh);
/// ```
pub fn generate_completions(cmd: &mut Command, shell: Shell) {
    generate_completions_to(cmd, shell, &mut io::stdout());
}

pub fn generate_completions_to(cmd: &mut Command, shell: Shell, out: &mut dyn Write) {
    let bin_name = cmd.get_name().to_string();

    match shell {
        Shell::Bash => generate(shells::Bash, cmd, bin_name, out),
        Shell::Zsh => generate(shells::Zsh, cmd, bin_name, out),
        Shell::Fish => generate(shells::Fish, cmd, bin_name, out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Arg;

    #[test]
    fn test_shell_from_str_valid() {
        assert_eq!(Shell::from_str("bash").unwrap(), Shell::Bash);
        assert_eq!(Shell::from_str("ZSH").unwrap(), Shell::Zsh);
        assert_eq!(Shell::from_str("Fish").unwrap(), Shell::Fish);
    }

    #[test]
    fn test_shell_from_str_error_message() {
        let err = Shell::from_str("powershell").unwrap_err().to_string();
        assert!(err.contains("Unsupported shell"));
        assert!(err.contains("powershell"));
        assert!(err.contains("bash, zsh, fish"));
    }

    #[test]
    fn test_shell_display_round_trips() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish] {
            assert_eq!(Shell::from_str(&shell.to_string()).unwrap(), shell);
        }
    }

    #[test]
    fn test_generated_script_names_subcommands() {
        let mut cmd = Command::new("annotrack")
            .subcommand(Command::new("status"))
            .subcommand(Command::new("skip").arg(Arg::new("work-item").long("work-item")));

        let mut out = Vec::new();
        generate_completions_to(&mut cmd, Shell::Bash, &mut out);
        let script = String::from_utf8(out).unwrap();

        assert!(script.contains("annotrack"));
        assert!(script.contains("status"));
        assert!(script.contains("--work-item"));
    }
}
