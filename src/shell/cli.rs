#[derive(Debug, Default)]
#[cfg_attr(test, derive(PartialEq))]
struct ShellOptions {
    help: bool,
    version: bool,
    positional_args: Vec<String>,
}

#[derive(Debug)]
#[cfg_attr(test, derive(PartialEq))]
pub enum ShellAction {
    Help,
    Version,
    Run,
}

impl ShellAction {
    pub fn from_env() -> Result<Self, String> {
        ShellOptions::parse_arguments(std::env::args())?.validate()
    }
}

type OptionSetter = fn(&mut ShellOptions) -> Result<(), String>;

struct ShellOption {
    short: char,
    long: &'static str,
    set: OptionSetter,
}

impl ShellOptions {
    const SHELL_OPTIONS: &'static [ShellOption] = &[
        ShellOption {
            short: 'h',
            long: "help",
            set: |options| {
                if options.help {
                    Err(more_than_once("--help"))
                } else {
                    options.help = true;
                    Ok(())
                }
            },
        },
        ShellOption {
            short: 'V',
            long: "version",
            set: |options| {
                if options.version {
                    Err(more_than_once("--version"))
                } else {
                    options.version = true;
                    Ok(())
                }
            },
        },
    ];

    /// parse the shell's own arguments; the first one is the program name
    fn parse_arguments(arguments: impl IntoIterator<Item = String>) -> Result<Self, String> {
        let mut options = ShellOptions::default();

        for arg in arguments.into_iter().skip(1) {
            if let Some(unprefixed) = arg.strip_prefix("--") {
                let option = Self::SHELL_OPTIONS
                    .iter()
                    .find(|o| o.long == unprefixed)
                    .ok_or_else(|| format!("unrecognized option '{arg}'"))?;
                (option.set)(&mut options)?;
            } else if let Some(unprefixed) = arg.strip_prefix('-').filter(|s| !s.is_empty()) {
                // flags can be grouped
                for curr in unprefixed.chars() {
                    let option = Self::SHELL_OPTIONS
                        .iter()
                        .find(|o| o.short == curr)
                        .ok_or_else(|| format!("unrecognized option '{curr}'"))?;
                    (option.set)(&mut options)?;
                }
            } else {
                options.positional_args.push(arg);
            }
        }

        Ok(options)
    }

    fn validate(self) -> Result<ShellAction, String> {
        if let Some(arg) = self.positional_args.first() {
            return Err(format!("unexpected argument '{arg}'"));
        }

        let action = match (self.help, self.version) {
            (true, true) => return Err("--help conflicts with --version".to_string()),
            (true, false) => ShellAction::Help,
            (false, true) => ShellAction::Version,
            (false, false) => ShellAction::Run,
        };
        Ok(action)
    }
}

fn more_than_once(flag: &str) -> String {
    format!("argument '{flag}' was provided more than once, but cannot be used multiple times")
}
