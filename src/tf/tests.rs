use super::*;

#[test]
fn test_argument_shapes() {
    assert_eq!(
        status_args("/ws"),
        ["status", "/ws", "/recursive", "/format:xml"]
    );
    assert_eq!(checkout_args("/ws/a.txt"), ["checkout", "/ws/a.txt"]);
    assert_eq!(
        checkin_args(&["/ws/a.txt".to_string(), "/ws/b.txt".to_string()], None),
        ["checkin", "/recursive", "/ws/a.txt", "/ws/b.txt"]
    );
    assert_eq!(
        checkin_args(&["/ws".to_string()], Some("fix build")),
        ["checkin", "/recursive", "/comment:fix build", "/ws"]
    );
    assert_eq!(undo_args(&["/ws".to_string()]), ["undo", "/recursive", "/ws"]);
    assert_eq!(workfold_args("/ws"), ["workfold", "/ws"]);
}

#[test]
fn test_error_display() {
    let error = BackendError::new("100", "no appropriate mapping exists");
    assert_eq!(error.to_string(), "no appropriate mapping exists (code: 100)");
}

#[test]
fn test_missing_program() {
    let tf = TfCommand::new(
        "tfvc-scm-test-no-such-program",
        Vec::new(),
        Duration::from_secs(5),
    );

    let error = tf.run(&status_args("/ws")).unwrap_err();

    assert_eq!(error.code, "NotFound");
    assert!(error.message.contains("failed to run"));
}

#[cfg(unix)]
mod script {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// helper to write an executable shell script standing in for tf
    fn fake_tf(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("tf");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn command(path: &Path, timeout_secs: u64) -> TfCommand {
        TfCommand::new(
            path.to_string_lossy(),
            vec!["vc".to_string()],
            Duration::from_secs(timeout_secs),
        )
    }

    #[test]
    fn test_prefix_and_args_are_passed() {
        let dir = TempDir::new().unwrap();
        let tf = fake_tf(&dir, r#"printf '%s|' "$@""#);

        let output = command(&tf, 5).run(&checkout_args("/ws/a b.txt")).unwrap();

        assert_eq!(output, "vc|checkout|/ws/a b.txt|");
    }

    #[test]
    fn test_failure_carries_code_and_stderr() {
        let dir = TempDir::new().unwrap();
        let tf = fake_tf(&dir, "echo partial output\necho 'TF14045: the item is locked' >&2\nexit 100");

        let error = command(&tf, 5).run(&checkout_args("/ws/a.txt")).unwrap_err();

        assert_eq!(error.code, "100");
        assert_eq!(error.message, "TF14045: the item is locked");
    }

    #[test]
    fn test_failure_falls_back_to_stdout() {
        let dir = TempDir::new().unwrap();
        let tf = fake_tf(&dir, "echo 'unable to determine the workspace'\nexit 1");

        let error = command(&tf, 5).run(&workfold_args("/ws")).unwrap_err();

        assert_eq!(error.code, "1");
        assert_eq!(error.message, "unable to determine the workspace");
    }

    #[test]
    fn test_large_output_does_not_block() {
        let dir = TempDir::new().unwrap();
        let tf = fake_tf(&dir, "i=0\nwhile [ $i -lt 20000 ]; do echo \"<PendingChange local=\\\"/ws/$i\\\"/>\"; i=$((i+1)); done");

        let output = command(&tf, 30).run(&status_args("/ws")).unwrap();

        assert_eq!(output.lines().count(), 20000);
    }

    #[test]
    fn test_timeout_kills_process() {
        let dir = TempDir::new().unwrap();
        let tf = fake_tf(&dir, "exec sleep 30");

        let error = command(&tf, 1).run(&status_args("/ws")).unwrap_err();

        assert_eq!(error.code, "timeout");
    }
}
