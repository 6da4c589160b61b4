//! Low-level async process management utilities.

use std::{
    ffi::OsString,
    io,
    path::Path,
    process::Stdio,
};

use tokio::{
    io::{AsyncRead, AsyncReadExt},
    process::{Child, Command},
};

/// Spawn a new async process with piped stdout and stderr.
///
/// Stdin is connected to `/dev/null` so a program waiting for input sees EOF
/// instead of blocking forever. On unix the child becomes the leader of a new
/// process group, which lets [`stop_child`] reach everything it spawned.
///
/// # Examples
///
/// ```rust
/// use kata_io::process::spawn_process;
///
/// #[tokio::main]
/// async fn main() {
///     let mut child = spawn_process("echo", &["Hello".to_string()], None, &[]).unwrap();
///     let output = child.stdout.take().unwrap();
/// }
/// ```
pub fn spawn_process(
    cmd: &str,
    args: &[String],
    current_dir: Option<&Path>,
    envs: &[(OsString, OsString)],
) -> Result<Child, io::Error> {
    let mut command = Command::new(cmd);
    command
        .args(args)
        .envs(envs.iter().cloned())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if let Some(dir) = current_dir {
        command.current_dir(dir);
    }

    #[cfg(unix)]
    command.process_group(0);

    command.spawn()
}

/// Asynchronously terminate a child process and everything in its group.
///
/// Sends `SIGKILL` to the process group created by [`spawn_process`], then
/// kills and reaps the direct child so no zombie is left behind.
///
/// # Examples
///
/// ```rust
/// use kata_io::process::{spawn_process, stop_child};
///
/// #[tokio::main]
/// async fn main() {
///     let mut child = spawn_process("sleep", &["60".to_string()], None, &[]).unwrap();
///     stop_child(&mut child).await.unwrap();
/// }
/// ```
pub async fn stop_child(child: &mut Child) -> Result<(), io::Error> {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        if let Err(errno) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
            tracing::debug!("Failed to signal process group {pid} - {errno}");
        }
    }
    child.kill().await
}

/// Read a child pipe until EOF.
///
/// A missing pipe yields an empty buffer.
pub async fn drain_pipe<T>(pipe: Option<T>) -> Result<Vec<u8>, io::Error>
where
    T: AsyncRead + Unpin,
{
    let mut buffer = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buffer).await?;
    }
    Ok(buffer)
}
