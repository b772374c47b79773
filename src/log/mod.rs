#![allow(unused_macros)]
use self::simple_logger::SimpleLogger;
use log::Log;

mod simple_logger;

macro_rules! logger_macro {
    ($name:ident is $rule_level:ident to $target:expr, $d:tt) => {
        macro_rules! $name {
            ($d($d arg:tt)+) => (::log::log!(target: $target, ::log::Level::$rule_level, $d($d arg)+));
        }

        #[allow(unused_imports)]
        pub(crate) use $name;
    };
    ($name:ident is $rule_level:ident to $target:expr) => {
        logger_macro!($name is $rule_level to $target, $);
    };
}

logger_macro!(user_error is Error to "smallsh::user");

macro_rules! dev_logger_macro {
    ($name:ident is $rule_level:ident to $target:expr, $d:tt) => {
        macro_rules! $name {
            ($d($d arg:tt)+) => {
                if std::cfg!(feature = "dev") {
                    (::log::log!(
                        target: $target,
                        ::log::Level::$rule_level,
                        "{}: {}",
                        std::panic::Location::caller(),
                        format_args!($d($d arg)+)
                    ));
                }
            };
        }

        #[allow(unused_imports)]
        pub(crate) use $name;
    };
    ($name:ident is $rule_level:ident to $target:expr) => {
        dev_logger_macro!($name is $rule_level to $target, $);
    };
}

dev_logger_macro!(dev_error is Error to "smallsh::dev");
dev_logger_macro!(dev_warn is Warn to "smallsh::dev");
dev_logger_macro!(dev_info is Info to "smallsh::dev");
dev_logger_macro!(dev_debug is Debug to "smallsh::dev");

/// A logger that only receives records whose target is `target` or lies below it.
struct Route {
    target: &'static str,
    logger: Box<dyn Log>,
}

impl Route {
    fn matches(&self, target: &str) -> bool {
        // `smallsh::user` covers `smallsh::user::cd` but not `smallsh::username`
        match target.strip_prefix(self.target) {
            Some(rest) => rest.is_empty() || rest.starts_with("::"),
            None => false,
        }
    }
}

/// Sends every record to the loggers whose route matches its target.
///
/// `smallsh::user` messages are meant for the person at the prompt and go to stderr.
/// `smallsh::dev` messages are only kept when built with the `dev` feature.
#[derive(Default)]
pub struct ShellLogger {
    routes: Vec<Route>,
}

impl ShellLogger {
    pub fn new(prefix: &'static str) -> Self {
        let mut logger = Self::default();

        logger.route("smallsh::user", SimpleLogger::to_stderr(prefix));

        #[cfg(feature = "dev")]
        {
            let path = option_env!("SMALLSH_DEV_LOGS")
                .map(std::path::PathBuf::from)
                .unwrap_or_else(|| {
                    std::env::temp_dir().join(format!("smallsh-dev-{}.log", std::process::id()))
                });
            match SimpleLogger::to_file(path, "") {
                Ok(file_logger) => logger.route("smallsh::dev", file_logger),
                Err(err) => {
                    eprintln_ignore_io_error!("{prefix}cannot open development log: {err}")
                }
            }
        }

        logger
    }

    pub fn into_global_logger(self) {
        if log::set_boxed_logger(Box::new(self)).is_ok() {
            log::set_max_level(log::LevelFilter::Trace);
        }
    }

    fn route(&mut self, target: &'static str, logger: impl Log + 'static) {
        self.routes.push(Route {
            target,
            logger: Box::new(logger),
        });
    }
}

impl Log for ShellLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
            && self.routes.iter().any(|route| route.matches(metadata.target()))
    }

    fn log(&self, record: &log::Record) {
        self.routes
            .iter()
            .filter(|route| route.matches(record.target()))
            .for_each(|route| route.logger.log(record));
    }

    fn flush(&self) {
        self.routes.iter().for_each(|route| route.logger.flush());
    }
}
