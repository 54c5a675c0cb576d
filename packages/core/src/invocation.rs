//! Command-line interpretation
//!
//! The launcher forwards its arguments to the commands image untouched; it
//! only peeks at them to learn the subcommand, the component, the version
//! being deployed, and the platform config file to mount.
//!
//! Options are described by [`FLAGS`]. The version is positional: it is
//! read from the argument list after every known option (and its value) has
//! been removed, at index 2 for `deploy` and index 1 for `release`.

use crate::error::CdflowError;
use crate::git;
use std::path::{Path, PathBuf};

/// Whether an option consumes the following token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Switch,
    Value,
}

/// One recognised option and its spellings
#[derive(Debug, Clone, Copy)]
pub struct FlagSpec {
    pub names: &'static [&'static str],
    pub arity: Arity,
}

pub const PLAN_ONLY: FlagSpec = FlagSpec {
    names: &["-p", "--plan-only"],
    arity: Arity::Switch,
};

pub const VERBOSE: FlagSpec = FlagSpec {
    names: &["-v", "--verbose"],
    arity: Arity::Switch,
};

pub const COMPONENT: FlagSpec = FlagSpec {
    names: &["-c", "--component"],
    arity: Arity::Value,
};

pub const PLATFORM_CONFIG: FlagSpec = FlagSpec {
    names: &["--platform-config"],
    arity: Arity::Value,
};

/// Options removed before positional arguments are counted, in removal order
pub const FLAGS: [FlagSpec; 4] = [PLAN_ONLY, VERBOSE, COMPONENT, PLATFORM_CONFIG];

/// The first argument, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subcommand {
    Release,
    Deploy,
    Other(String),
}

impl Subcommand {
    pub fn from_arg(arg: &str) -> Self {
        match arg {
            "release" => Subcommand::Release,
            "deploy" => Subcommand::Deploy,
            other => Subcommand::Other(other.to_string()),
        }
    }

    /// Position of the version among the remaining positional arguments
    fn version_index(&self) -> Option<usize> {
        match self {
            Subcommand::Deploy => Some(2),
            Subcommand::Release => Some(1),
            Subcommand::Other(_) => None,
        }
    }
}

/// The subcommand named by the first argument, if any
pub fn subcommand(args: &[String]) -> Option<Subcommand> {
    args.first().map(|arg| Subcommand::from_arg(arg))
}

/// Token following the first occurrence of any of `flag`'s names
fn flag_value<'a>(args: &'a [String], flag: &FlagSpec) -> Option<&'a str> {
    let index = args
        .iter()
        .position(|arg| flag.names.contains(&arg.as_str()))?;
    args.get(index + 1).map(String::as_str)
}

/// Arguments left after removing known options
///
/// Each spelling is removed once, at its first occurrence; value options
/// take their following token with them.
pub fn strip_options(args: &[String]) -> Vec<String> {
    let mut remaining = args.to_vec();
    for flag in FLAGS {
        for name in flag.names {
            let Some(index) = remaining.iter().position(|arg| arg == name) else {
                continue;
            };
            let end = match flag.arity {
                Arity::Switch => index + 1,
                Arity::Value => (index + 2).min(remaining.len()),
            };
            remaining.drain(index..end);
        }
    }
    remaining
}

/// Version argument for `deploy` and `release`; `None` when not given
pub fn version_from_args(args: &[String]) -> Option<String> {
    let remaining = strip_options(args);
    let index = subcommand(&remaining)?.version_index()?;
    remaining.get(index).cloned()
}

/// Component given with `-c`/`--component`
///
/// A flag with nothing after it counts as not given.
pub fn component_from_args(args: &[String]) -> Option<String> {
    flag_value(args, &COMPONENT).map(str::to_string)
}

/// Value of the required `--platform-config` option
pub fn platform_config_path(args: &[String]) -> Result<PathBuf, CdflowError> {
    if !args.iter().any(|arg| PLATFORM_CONFIG.names.contains(&arg.as_str())) {
        return Err(CdflowError::MissingParameter(
            "--platform-config is required".to_string(),
        ));
    }
    flag_value(args, &PLATFORM_CONFIG)
        .map(PathBuf::from)
        .ok_or_else(|| CdflowError::MissingParameter("--platform-config needs a path".to_string()))
}

/// Component name from the command line, else from the git remote
pub fn component_name(args: &[String], project_root: &Path) -> Result<String, CdflowError> {
    match component_from_args(args) {
        Some(name) => Ok(name),
        None => git::component_name_from_git(project_root),
    }
}

/// One interpreted command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub subcommand: Option<Subcommand>,
    /// Arguments exactly as given, forwarded to the container
    pub args: Vec<String>,
    /// Set for `deploy`
    pub component: Option<String>,
    /// Set for `deploy` when the version position is filled
    pub version: Option<String>,
    /// Set for `release`, as given on the command line
    pub platform_config: Option<PathBuf>,
}

impl Invocation {
    /// Interpret `args`, reading only what the subcommand needs
    ///
    /// `deploy` requires a component (flag or git remote); `release`
    /// requires `--platform-config`.
    pub fn from_args(args: Vec<String>, project_root: &Path) -> Result<Self, CdflowError> {
        let subcommand = subcommand(&args);
        let mut invocation = Self {
            subcommand,
            args,
            component: None,
            version: None,
            platform_config: None,
        };

        match invocation.subcommand {
            Some(Subcommand::Deploy) => {
                // Required even when CDFLOW_IMAGE_ID makes the release lookup unnecessary
                invocation.component = Some(component_name(&invocation.args, project_root)?);
                invocation.version = version_from_args(&invocation.args);
            }
            Some(Subcommand::Release) => {
                invocation.platform_config = Some(platform_config_path(&invocation.args)?);
                invocation.version = version_from_args(&invocation.args);
            }
            Some(Subcommand::Other(_)) | None => {}
        }

        Ok(invocation)
    }

    pub fn is_deploy(&self) -> bool {
        self.subcommand == Some(Subcommand::Deploy)
    }

    pub fn is_release(&self) -> bool {
        self.subcommand == Some(Subcommand::Release)
    }
}
