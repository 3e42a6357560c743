use crate::command::ExitCode;
use crate::error::ShellError;
use crate::lexer::ArgumentVector;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus};

/// Token that asks for background execution when it ends a command line.
pub const BACKGROUND_MARKER: &str = "&";

/// Remove a trailing `&` from `args`, reporting whether it was there.
pub fn split_background(args: &mut ArgumentVector) -> bool {
    if args.last() == Some(BACKGROUND_MARKER) {
        args.pop();
        true
    } else {
        false
    }
}

/// Command that is not a builtin, resolved to an executable on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    name: OsString,
    path: PathBuf,
    args: Vec<OsString>,
    background: bool,
}

/// A child process handed back by [`ExternalCommand::execute`].
#[derive(Debug)]
pub enum Launched {
    /// The command ran in the foreground and finished with this code.
    Finished(ExitCode),
    /// The command keeps running in the background.
    Background(Child),
}

impl ExternalCommand {
    /// Resolve `args[0]` against `search_paths` (the `PATH` value).
    ///
    /// Returns `None` when the vector is empty or the program cannot be found.
    pub fn try_create(
        search_paths: &OsStr,
        args: &ArgumentVector,
        background: bool,
    ) -> Option<Self> {
        let name = args.program()?;
        let path = resolve_program(search_paths, name)?;
        Some(Self {
            name: name.into(),
            path,
            args: args.params().iter().map(OsString::from).collect(),
            background,
        })
    }

    pub fn is_background(&self) -> bool {
        self.background
    }

    /// Spawn the program with the inherited environment and standard streams.
    ///
    /// Foreground commands are waited for; background commands are returned running.
    pub fn execute(self) -> Result<Launched, ShellError> {
        let mut cmd = Command::new(&self.path);
        cmd.args(&self.args);
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.arg0(&self.name);
        }

        let mut child = cmd.spawn().map_err(spawn_error)?;
        log::debug!(
            "spawned {} as pid {}{}",
            self.path.display(),
            child.id(),
            if self.background { " (background)" } else { "" }
        );

        if self.background {
            return Ok(Launched::Background(child));
        }

        let status = child.wait()?;
        let code = exit_code(status);
        log::debug!("pid {} exited with {}", child.id(), code);
        Ok(Launched::Finished(code))
    }
}

/// Only running out of processes or memory means the child could not be created.
/// Any other failure is about the program image and leaves the shell usable.
fn spawn_error(e: io::Error) -> ShellError {
    match e.kind() {
        io::ErrorKind::OutOfMemory | io::ErrorKind::WouldBlock => {
            ShellError::ProcessCreationFailure(e)
        }
        _ => {
            log::debug!("cannot load program: {}", e);
            ShellError::CommandNotFound
        }
    }
}

/// Exit code of a finished child; a signal `n` is reported as `128 + n`.
#[cfg(unix)]
fn exit_code(status: ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(-1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> ExitCode {
    status.code().unwrap_or(-1)
}

/// Background children that have not been waited for yet.
///
/// Only used to collect exit statuses so finished children do not linger; there
/// is no way to address them from the command line.
#[derive(Debug, Default)]
pub struct BackgroundChildren {
    children: Vec<Child>,
}

impl BackgroundChildren {
    pub fn push(&mut self, child: Child) {
        self.children.push(child);
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Collect every child that has finished, without blocking.
    pub fn reap(&mut self) {
        self.children.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                log::info!("background pid {} finished: {}", child.id(), status);
                false
            }
            Ok(None) => true,
            Err(e) => {
                log::warn!("background pid {}: {}", child.id(), e);
                false
            }
        });
    }
}

/// Locate the program a command name refers to.
///
/// A name containing `/` is taken as a path, relative to the working directory
/// unless absolute. A bare name is looked up in each directory of `search_paths`
/// in order; entries that are not executable files are passed over.
pub fn resolve_program(search_paths: &OsStr, name: &str) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }
    if name.contains('/') {
        let path = Path::new(name);
        return path.exists().then(|| path.to_path_buf());
    }
    std::env::split_paths(search_paths)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::normalize::normalize;
    use std::fs;

    fn args(s: &str) -> ArgumentVector {
        tokenize(normalize(s.to_string()).as_ref()).unwrap()
    }

    fn osstr(s: &str) -> &OsStr {
        OsStr::new(s)
    }

    fn system_path() -> OsString {
        std::env::var_os("PATH").unwrap_or_else(|| "/usr/bin:/bin".into())
    }

    /// Fresh directory under the system temp dir, unique to this test process.
    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("osh-{}-{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[cfg(unix)]
    fn write_with_mode(path: &Path, contents: &[u8], mode: u32) {
        use std::os::unix::fs::PermissionsExt;
        fs::write(path, contents).unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
    }

    #[test]
    fn trailing_ampersand_is_stripped() {
        let mut a = args("sleep 5 &");
        assert!(split_background(&mut a));
        assert_eq!(a.join(), "sleep 5");

        let mut b = args("sleep 5");
        assert!(!split_background(&mut b));
        assert_eq!(b.join(), "sleep 5");

        // only a standalone final token counts
        let mut c = args("echo a&");
        assert!(!split_background(&mut c));
        let mut d = args("echo & x");
        assert!(!split_background(&mut d));
    }

    #[test]
    #[cfg(unix)]
    fn absolute_paths_are_used_as_given() {
        assert_eq!(
            resolve_program(osstr("/nowhere"), "/bin/sh"),
            Some(PathBuf::from("/bin/sh"))
        );
        assert!(resolve_program(osstr("/bin"), "/bin/nonexisting").is_none());
    }

    #[test]
    #[cfg(unix)]
    fn bare_names_are_searched_in_path() {
        let found = resolve_program(osstr("/nowhere:/bin"), "sh").expect("sh in /bin");
        assert_eq!(found, PathBuf::from("/bin/sh"));
        assert!(resolve_program(osstr("/bin"), "nonexisting").is_none());
    }

    #[test]
    #[cfg(unix)]
    fn non_executable_entries_do_not_hide_later_ones() {
        let first = scratch_dir("path-first");
        let second = scratch_dir("path-second");
        write_with_mode(&first.join("osh-tool"), b"not a program\n", 0o644);
        write_with_mode(&second.join("osh-tool"), b"#!/bin/sh\n", 0o755);

        let search = std::env::join_paths([&first, &second]).unwrap();
        assert_eq!(
            resolve_program(&search, "osh-tool"),
            Some(second.join("osh-tool"))
        );

        let only_first = std::env::join_paths([&first]).unwrap();
        assert!(resolve_program(&only_first, "osh-tool").is_none());

        let _ = fs::remove_dir_all(&first);
        let _ = fs::remove_dir_all(&second);
    }

    #[test]
    fn relative_paths_resolve_against_current_dir() {
        // cargo runs tests from the package root
        assert_eq!(
            resolve_program(osstr("/does/not/matter"), "src/lib.rs"),
            Some(PathBuf::from("src/lib.rs"))
        );
        assert_eq!(
            resolve_program(osstr("/does/not/matter"), "./Cargo.toml"),
            Some(PathBuf::from("./Cargo.toml"))
        );
        assert!(resolve_program(osstr("/does/not/matter"), "./missing").is_none());
    }

    #[test]
    fn empty_name_is_none() {
        assert!(resolve_program(osstr("/bin"), "").is_none());
    }

    #[test]
    fn unknown_program_is_not_created() {
        let a = args("definitely-not-a-real-program-osh --flag");
        assert!(ExternalCommand::try_create(&system_path(), &a, false).is_none());
        assert!(ExternalCommand::try_create(&system_path(), &ArgumentVector::new(), false).is_none());
    }

    #[test]
    #[cfg(unix)]
    fn foreground_command_reports_exit_code() {
        let ok = ExternalCommand::try_create(&system_path(), &args("true"), false).unwrap();
        assert!(matches!(ok.execute(), Ok(Launched::Finished(0))));

        let fail = ExternalCommand::try_create(&system_path(), &args("false"), false).unwrap();
        assert!(matches!(fail.execute(), Ok(Launched::Finished(1))));
    }

    #[test]
    #[cfg(unix)]
    fn background_command_is_not_waited_for() {
        let mut a = args("sleep 0 &");
        let background = split_background(&mut a);
        let cmd = ExternalCommand::try_create(&system_path(), &a, background).unwrap();
        assert!(cmd.is_background());

        let mut children = BackgroundChildren::default();
        match cmd.execute() {
            Ok(Launched::Background(child)) => children.push(child),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(children.len(), 1);

        for _ in 0..100 {
            children.reap();
            if children.is_empty() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
        assert!(children.is_empty());
    }

    #[test]
    fn only_resource_exhaustion_is_a_creation_failure() {
        for kind in [
            io::ErrorKind::NotFound,
            io::ErrorKind::PermissionDenied,
            io::ErrorKind::ExecutableFileBusy,
            io::ErrorKind::ArgumentListTooLong,
            io::ErrorKind::Other,
        ] {
            assert!(
                matches!(spawn_error(io::Error::from(kind)), ShellError::CommandNotFound),
                "{:?}",
                kind
            );
        }
        for kind in [io::ErrorKind::OutOfMemory, io::ErrorKind::WouldBlock] {
            assert!(
                matches!(
                    spawn_error(io::Error::from(kind)),
                    ShellError::ProcessCreationFailure(_)
                ),
                "{:?}",
                kind
            );
        }
    }

    #[test]
    #[cfg(unix)]
    fn exec_format_error_is_not_fatal() {
        // ENOEXEC
        let err = spawn_error(io::Error::from_raw_os_error(8));
        assert!(matches!(err, ShellError::CommandNotFound));
    }
}
