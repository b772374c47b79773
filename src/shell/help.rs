pub const USAGE_MSG: &str = "Usage: smallsh [-h|--help] [-V|--version]";

const DESCRIPTOR: &str = "Read commands from standard input and run them, in the foreground or, when
a command ends in '&', in the background.";

const HELP_MSG: &str = "Built-in commands:
exit                            leave the shell
cd [<directory>]                change directory, $HOME if none is given
status                          show how the last command ended

Syntax:
<command> [<arg>...] [< <file>] [> <file>] [&]
$$ is replaced by the process ID of the shell, lines starting with # are ignored.
Ctrl-Z switches foreground-only mode on and off.

Options:
-h, --help                      display this help
-V, --version                   display version
";

pub fn long_help_message() -> String {
    format!("{USAGE_MSG}\n\n{DESCRIPTOR}\n\n{HELP_MSG}")
}
