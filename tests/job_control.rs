use std::{thread, time::Duration};

use pretty_assertions::assert_eq;

use common::{run, Result, Session};

mod common;

fn background_pid(announcement: &str) -> Result<String> {
    let pid = announcement
        .rsplit("background pid is ")
        .next()
        .ok_or("no background pid announced")?;
    Ok(pid.trim().to_string())
}

#[test]
fn background_job_is_announced_and_reaped() -> Result<()> {
    let mut session = Session::spawn()?;

    session.send("sleep 0.2 &")?;
    let pid = background_pid(&session.expect("\n")?)?;

    session.send("status")?;
    session.expect(": the exit value is: 0\n")?;

    session.send("sleep 1")?;
    session.expect(&format!("background pid {pid} is done: the exit value is: 0\n: "))?;

    let output = session.finish()?;
    assert_eq!(output.stdout.matches("is done").count(), 1);

    Ok(())
}

#[test]
fn background_job_does_not_block_the_prompt() -> Result<()> {
    let mut session = Session::spawn()?;

    session.send("sleep 2 &")?;
    session.expect("background pid is ")?;
    session.send("echo still responsive")?;
    session.expect("still responsive\n")?;
    assert!(!session.stdout().contains("is done"));

    session.send("sleep 2.5")?;
    session.expect("is done: the exit value is: 0\n")?;
    session.finish()?;

    Ok(())
}

#[test]
fn finished_jobs_are_reported_once_before_the_next_prompt() -> Result<()> {
    let output = run("sleep 0.1 &\nsleep 0.1 &\nsleep 1\n")?;

    let notices = output
        .stdout
        .lines()
        .filter(|line| line.contains("is done: the exit value is: 0"))
        .count();
    assert_eq!(notices, 2);
    assert!(output.stdout.ends_with("is done: the exit value is: 0\n: "));

    Ok(())
}

#[test]
fn background_job_killed_by_signal() -> Result<()> {
    let mut session = Session::spawn()?;

    session.send("sleep 30 &")?;
    let pid = background_pid(&session.expect("\n")?)?;

    // SAFETY: `kill` cannot cause UB.
    assert_eq!(unsafe { libc::kill(pid.parse()?, libc::SIGTERM) }, 0);
    thread::sleep(Duration::from_millis(200));
    session.send("")?;
    session.expect(&format!(
        "background pid {pid} is done: the termination signal is: 15\n"
    ))?;

    session.send("status")?;
    session.expect("the termination signal is: 15\n")?;
    session.finish()?;

    Ok(())
}

#[test]
fn background_job_without_redirect_shares_the_output() -> Result<()> {
    let mut session = Session::spawn()?;

    session.send("echo from the background &")?;
    session.expect("from the background\n")?;

    thread::sleep(Duration::from_millis(100));
    session.send("")?;
    session.expect("is done: the exit value is: 0\n")?;
    session.finish()?;

    Ok(())
}

#[test]
fn exit_leaves_background_jobs_running() -> Result<()> {
    let output = run("sleep 0.3 &\nexit\n")?;

    assert!(output.status.success());
    assert!(output.stdout.starts_with(": background pid is "));
    assert!(!output.stdout.contains("is done"));

    Ok(())
}
