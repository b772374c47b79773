use crate::common::Command;

/// Commands the shell runs itself instead of launching a program.
///
/// Redirections and a trailing `&` are accepted but have no effect on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin<'a> {
    Exit,
    Cd(Option<&'a str>),
    Status,
}

impl<'a> Builtin<'a> {
    pub fn from_command(command: &'a Command) -> Option<Self> {
        let builtin = match command.program.as_str() {
            "exit" => Builtin::Exit,
            "cd" => Builtin::Cd(command.arguments().first().map(String::as_str)),
            "status" => Builtin::Status,
            _ => return None,
        };
        Some(builtin)
    }
}

#[cfg(test)]
mod tests {
    use super::Builtin;
    use crate::{common::command::parse_line, system::interface::ProcessId};

    fn builtin_of(line: &str) -> Option<Builtin<'static>> {
        let command = Box::leak(Box::new(parse_line(line, ProcessId::new(99)).unwrap()));
        Builtin::from_command(command)
    }

    #[test]
    fn recognizes_builtins_by_first_word() {
        assert_eq!(builtin_of("exit"), Some(Builtin::Exit));
        assert_eq!(builtin_of("status > out.txt &"), Some(Builtin::Status));
        assert_eq!(builtin_of("cd"), Some(Builtin::Cd(None)));
        assert_eq!(builtin_of("cd /tmp extra"), Some(Builtin::Cd(Some("/tmp"))));
        assert_eq!(builtin_of("cd dir$$"), Some(Builtin::Cd(Some("dir99"))));
    }

    #[test]
    fn other_words_are_programs() {
        assert_eq!(builtin_of("ls"), None);
        assert_eq!(builtin_of("echo exit"), None);
        assert_eq!(builtin_of("exit2"), None);
    }
}
