//! Command-line interface.
//!
//! Setting flags are generated from the [`Registry`], so each flag's help text
//! and advertised default come from the same declaration the resolver uses.
//! Logging flags are declared statically with clap's derive macros.

use crate::config::{ConfigTier, Layer, Registry, SettingSpec, SettingValue};
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Args, Command, FromArgMatches};

/// Logging options (not settings: they are never read from env or files).
#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(long, default_value = "2")]
    pub log: String,
}

/// Parsed command line: logging options plus the setting flags given.
#[derive(Debug, Clone)]
pub struct Cli {
    pub log: LogArgs,
    pub settings: Layer,
}

impl Cli {
    /// Parse process arguments, exiting with usage on error.
    pub fn parse(registry: &Registry) -> Self {
        let matches = command(registry).get_matches();
        Self::from_matches(registry, &matches).unwrap_or_else(|e| e.exit())
    }

    /// Parse the given arguments.
    pub fn try_parse_from<I, T>(registry: &Registry, args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = command(registry).try_get_matches_from(args)?;
        Self::from_matches(registry, &matches)
    }

    fn from_matches(registry: &Registry, matches: &ArgMatches) -> Result<Self, clap::Error> {
        Ok(Self {
            log: LogArgs::from_arg_matches(matches)?,
            settings: settings_layer(registry, matches),
        })
    }
}

/// Build the clap command for the given registry.
pub fn command(registry: &Registry) -> Command {
    let cmd = Command::new(crate::config::APP_NAME)
        .version(env!("CARGO_PKG_VERSION"))
        .about("Yet another gopher daemon");
    let cmd = LogArgs::augment_args(cmd);

    registry
        .iter()
        .filter(|spec| spec.cli_flag)
        .fold(cmd, |cmd, spec| cmd.arg(setting_arg(spec)))
}

fn setting_arg(spec: &SettingSpec) -> Arg {
    let kind = spec.kind;
    let help = match &spec.default {
        Some(default) => format!("{} [default: {}]", spec.help, default),
        None => spec.help.to_string(),
    };

    let mut arg = Arg::new(spec.name)
        .long(spec.name)
        .help(help)
        .action(ArgAction::Set)
        .value_parser(move |raw: &str| kind.parse_str(raw));
    if let Some(short) = spec.short_flag {
        arg = arg.short(short);
    }
    arg
}

/// Collect the setting flags explicitly passed on the command line.
fn settings_layer(registry: &Registry, matches: &ArgMatches) -> Layer {
    let mut layer = Layer::new(ConfigTier::CommandLine);
    for spec in registry.iter().filter(|spec| spec.cli_flag) {
        if matches.value_source(spec.name) != Some(ValueSource::CommandLine) {
            continue;
        }
        if let Some(value) = matches.get_one::<SettingValue>(spec.name) {
            layer.set(spec.name, value.clone());
        }
    }
    layer
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    fn registry() -> Registry {
        Registry::standard(Path::new("/home/gopher")).unwrap()
    }

    #[test]
    fn test_command_is_well_formed() {
        command(&registry()).debug_assert();
    }

    #[test]
    fn test_no_flags_gives_empty_layer() {
        let cli = Cli::try_parse_from(&registry(), ["yagopherd"]).unwrap();
        assert!(cli.settings.is_empty());
        assert!(!cli.log.verbose);
        assert_eq!(cli.log.log, "2");
    }

    #[test]
    fn test_long_and_short_flags() {
        let cli = Cli::try_parse_from(
            &registry(),
            [
                "yagopherd",
                "--port",
                "7071",
                "-g",
                "/srv/gopher",
                "-t",
                "10s",
                "-l",
                "4096",
                "-m",
                "ops@example.com",
                "-a",
                "::",
                "-c",
                "/etc/yagopherd.yaml",
            ],
        )
        .unwrap();

        let layer = &cli.settings;
        assert_eq!(layer.tier, ConfigTier::CommandLine);
        assert_eq!(layer.get("port"), Some(&SettingValue::Integer(7071)));
        assert_eq!(
            layer.get("gopherroot"),
            Some(&SettingValue::Path(PathBuf::from("/srv/gopher")))
        );
        assert_eq!(
            layer.get("selectortimeout"),
            Some(&SettingValue::Duration(Duration::from_secs(10)))
        );
        assert_eq!(layer.get("selectorlimit"), Some(&SettingValue::Integer(4096)));
        assert_eq!(
            layer.get("admin"),
            Some(&SettingValue::String("ops@example.com".into()))
        );
        assert_eq!(layer.get("address"), Some(&SettingValue::String("::".into())));
        assert_eq!(
            layer.get("config"),
            Some(&SettingValue::Path(PathBuf::from("/etc/yagopherd.yaml")))
        );
    }

    #[test]
    fn test_testmode_is_not_a_flag() {
        let result = Cli::try_parse_from(&registry(), ["yagopherd", "--testmode", "true"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_value_rejected_by_parser() {
        let result = Cli::try_parse_from(&registry(), ["yagopherd", "--port", "seventy"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_help_advertises_registry_default() {
        let cmd = command(&registry());
        let arg = cmd
            .get_arguments()
            .find(|arg| arg.get_id() == "selectorlimit")
            .unwrap();
        let help = arg.get_help().unwrap().to_string();
        assert!(help.ends_with("[default: 8192]"));
    }

    #[test]
    fn test_timeout_help_explains_plain_numbers() {
        let cmd = command(&registry());
        let arg = cmd
            .get_arguments()
            .find(|arg| arg.get_id() == "selectortimeout")
            .unwrap();
        let help = arg.get_help().unwrap().to_string();
        assert!(help.contains("a plain number is seconds"));
        assert!(help.ends_with("[default: 5s]"));
    }

    #[test]
    fn test_empty_config_flag_is_accepted() {
        let cli = Cli::try_parse_from(&registry(), ["yagopherd", "-c", ""]).unwrap();
        assert_eq!(
            cli.settings.get("config"),
            Some(&SettingValue::Path(PathBuf::new()))
        );
    }

    #[test]
    fn test_logging_flags() {
        let cli =
            Cli::try_parse_from(&registry(), ["yagopherd", "-v", "--log", "stdout"]).unwrap();
        assert!(cli.log.verbose);
        assert_eq!(cli.log.log, "stdout");
        assert!(cli.settings.is_empty());
    }
}
