//! Command resolution - turns a token list into a host process invocation
//!
//! POSIX hosts run every command through `sh -c`, so each token that is not
//! made of plain shell-safe characters is single-quoted before joining. JSON
//! payloads are the usual reason a token needs quoting.
//!
//! Windows hosts hand the tokens straight to the process launcher as an
//! argument vector. Quoting them as well would double-quote the arguments.

use crate::core::ProvisionError;
use regex::Regex;
use std::borrow::Cow;
use std::fmt;
use std::sync::OnceLock;

/// Host operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Posix,
    Windows,
}

impl Platform {
    /// Platform of the running host
    pub fn host() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }
}

/// What gets handed to the process launcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// A single script string run by a shell
    Shell {
        shell: String,
        flag: String,
        script: String,
    },
    /// A program with an argument vector, no shell involved
    Direct { program: String, args: Vec<String> },
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invocation::Shell { script, .. } => write!(f, "{}", script),
            Invocation::Direct { program, args } => {
                write!(f, "{}", program)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                Ok(())
            }
        }
    }
}

fn shell_safe() -> &'static Regex {
    static SAFE: OnceLock<Regex> = OnceLock::new();
    SAFE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_@%+=:,./-]+$").expect("valid regex"))
}

/// Quote a token for a POSIX shell.
///
/// Tokens made only of shell-safe characters are returned unchanged. Anything
/// else is wrapped in single quotes, with embedded single quotes written as
/// `'\''`, so the shell yields the original bytes as one argument.
pub fn quote_posix(token: &str) -> Cow<'_, str> {
    if shell_safe().is_match(token) {
        return Cow::Borrowed(token);
    }
    Cow::Owned(format!("'{}'", token.replace('\'', r"'\''")))
}

/// Resolve a token list into the invocation for the given platform
pub fn resolve<S: AsRef<str>>(tokens: &[S], platform: Platform) -> Result<Invocation, ProvisionError> {
    let (program, args) = match tokens.split_first() {
        Some((program, args)) if !program.as_ref().is_empty() => (program.as_ref(), args),
        _ => return Err(ProvisionError::Config("cannot resolve an empty command".to_string())),
    };

    let invocation = match platform {
        Platform::Posix => Invocation::Shell {
            shell: "sh".to_string(),
            flag: "-c".to_string(),
            script: tokens
                .iter()
                .map(|t| quote_posix(t.as_ref()))
                .collect::<Vec<_>>()
                .join(" "),
        },
        Platform::Windows => Invocation::Direct {
            program: program.to_string(),
            args: args.iter().map(|a| a.as_ref().to_string()).collect(),
        },
    };

    Ok(invocation)
}
