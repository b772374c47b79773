use std::{fs::File, process::Command};

use common::Result;

mod common;

fn smallsh(args: &[&str]) -> Result<std::process::Output> {
    Ok(Command::new(env!("CARGO_BIN_EXE_smallsh"))
        .args(args)
        .output()?)
}

#[test]
fn version_flag() -> Result<()> {
    let output = smallsh(&["--version"])?;

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout)?,
        format!("smallsh-rs {}\n", env!("CARGO_PKG_VERSION"))
    );

    Ok(())
}

#[test]
fn help_flag() -> Result<()> {
    let output = smallsh(&["-h"])?;

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.starts_with("Usage: smallsh"));
    assert!(stdout.contains("foreground-only"));

    Ok(())
}

#[test]
fn unexpected_arguments_print_usage() -> Result<()> {
    for args in [&["--login"][..], &["script.sh"], &["-h", "-V"]] {
        let output = smallsh(args)?;

        assert_eq!(output.status.code(), Some(1));
        let stderr = String::from_utf8(output.stderr)?;
        assert!(stderr.starts_with("smallsh: "), "{stderr}");
        assert!(stderr.contains("Usage: smallsh"), "{stderr}");
    }

    Ok(())
}

#[test]
fn unreadable_input_is_fatal() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let output = Command::new(env!("CARGO_BIN_EXE_smallsh"))
        .stdin(File::open(dir.path())?)
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(String::from_utf8(output.stdout)?, ": ");
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.starts_with("smallsh: "), "{stderr}");

    Ok(())
}
