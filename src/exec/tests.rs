use super::*;

use assert_matches::assert_matches;
use rstest::rstest;

#[rstest]
#[case("ls -la /tmp", &["ls", "-la", "/tmp"])]
#[case("  tar   cf  x.tar ", &["tar", "cf", "x.tar"])]
#[case(r#"tar "c:/My Documents/""#, &["tar", "c:/My Documents/"])]
#[case("echo 'a b' c", &["echo", "a b", "c"])]
#[case(r#"echo "unterminated x"#, &["echo", "\"unterminated", "x"])]
#[case("", &[])]
fn test_split_command_string(#[case] input: &str, #[case] expected: &[&str]) {
    assert_eq!(split_command_string(input), expected);
}

#[rstest]
#[case(r#""quoted""#, "quoted")]
#[case("'single'", "single")]
#[case(r#""mixed'"#, r#""mixed'"#)]
#[case(r#"""#, r#"""#)]
#[case("''", "")]
#[case("plain", "plain")]
#[case("", "")]
fn test_trim_quotes(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(trim_quotes(input), expected);
}

#[rstest]
#[case("a\nb", 2, "  a\n  b\n")]
#[case("single", 1, " single\n")]
#[case("a\nb", 0, "a\nb")]
#[case("", 4, "")]
fn test_left_pad(#[case] input: &str, #[case] pad: usize, #[case] expected: &str) {
    assert_eq!(left_pad(input, pad), expected);
}

#[test]
fn test_look_path_missing() {
    let result = look_path("logkit-surely-missing-command");
    assert_matches!(result, Err(Error::CommandNotFound(ref name, _)) if name == "logkit-surely-missing-command");
}

#[test]
fn test_call_empty() {
    assert_matches!(call_quiet("", |_, _| panic!("must not be called")), Err(Error::EmptyCommand));
    let parts: [&str; 0] = [];
    assert_matches!(call_slice_quiet(&parts, |_, _| {}), Err(Error::EmptyCommand));
}

#[test]
fn test_calling_without_command() {
    let mut calling = Calling::new().quiet();
    assert_matches!(calling.run_and_check_error(), Err(Error::EmptyCommand));
}

#[test]
fn test_output_check() {
    let ok = Output {
        command: "x".into(),
        ..Default::default()
    };
    assert!(ok.clone().check().is_ok());

    let failed = Output {
        command: "x".into(),
        code: 2,
        stdout: String::new(),
        stderr: "oops".into(),
    };
    assert_matches!(failed.check(), Err(Error::CommandFailed { code: 2, ref stderr, .. }) if stderr == "oops");
}

#[cfg(unix)]
mod unix {
    use super::*;

    use tempfile::tempdir;

    #[test]
    fn test_look_path() {
        let path = look_path("sh").unwrap();
        assert!(path.is_absolute());
    }

    #[test]
    fn test_run() {
        run("true", [""; 0]).unwrap();
        assert_matches!(run_quiet("false", [""; 0]), Err(Error::CommandFailed { code: 1, .. }));
        run_quiet("sh", ["-c", "echo hidden"]).unwrap();
    }

    #[test]
    fn test_run_with_output() {
        let output = run_with_output("sh", ["-c", "echo out; echo err >&2; exit 3"]).unwrap();
        assert_eq!(output.code, 3);
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert_eq!(output.command, "sh -c echo out; echo err >&2; exit 3");
        assert!(!output.success());
        assert_matches!(output.check(), Err(Error::CommandFailed { code: 3, .. }));
    }

    #[test]
    fn test_run_terminated() {
        let result = run_with_output("sh", ["-c", "kill -9 $$"]);
        assert_matches!(result, Err(Error::CommandTerminated { .. }));
    }

    #[test]
    fn test_call() {
        let mut seen = None;
        call("echo hello world", |code, out| seen = Some((code, out.to_owned()))).unwrap();
        assert_eq!(seen, Some((0, "hello world\n".to_owned())));

        let mut called = false;
        let result = call_slice_quiet(&["sh", "-c", "exit 2"], |_, _| called = true);
        assert_matches!(result, Err(Error::CommandFailed { code: 2, .. }));
        assert!(!called);
    }

    #[test]
    fn test_calling_capture() {
        let dir = tempdir().unwrap();
        let mut calling = Calling::new()
            .command("sh", ["-c", "echo \"$LOGKIT_TEST_VALUE\"; pwd; echo warn >&2"])
            .env("LOGKIT_TEST_VALUE", "42")
            .env("", "ignored")
            .work_dir(dir.path())
            .capture_stdout()
            .capture_stderr();
        calling.run_and_check_error().unwrap();

        let mut lines = calling.output_text().lines();
        assert_eq!(lines.next(), Some("42"));
        let pwd = lines.next().unwrap();
        assert_eq!(
            std::fs::canonicalize(pwd).unwrap(),
            std::fs::canonicalize(dir.path()).unwrap()
        );
        assert_eq!(calling.slurp_text(), "warn\n");
        assert_eq!(calling.ret_code(), 0);
    }

    #[test]
    fn test_calling_options_before_command() {
        let dir = tempdir().unwrap();
        let mut calling = Calling::new()
            .env("LOGKIT_TEST_EARLY", "early")
            .work_dir(dir.path())
            .command_string("sh -c 'echo \"$LOGKIT_TEST_EARLY\"; pwd'")
            .capture_stdout();
        calling.run_and_check_error().unwrap();

        let mut lines = calling.output_text().lines();
        assert_eq!(lines.next(), Some("early"));
        assert_eq!(
            std::fs::canonicalize(lines.next().unwrap()).unwrap(),
            std::fs::canonicalize(dir.path()).unwrap()
        );
    }

    #[test]
    fn test_calling_writers() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        Calling::new()
            .command_string("sh -c 'echo a; echo b >&2'")
            .capture_stdout_to(&mut out)
            .capture_stderr_to(&mut err)
            .run_and_check_error()
            .unwrap();
        assert_eq!(out, b"a\n");
        assert_eq!(err, b"b\n");
    }

    #[test]
    fn test_calling_callbacks() {
        let mut ok = None;
        Calling::new()
            .command_slice(&["echo", "done"])
            .capture_stdout()
            .on_ok(|code, out| ok = Some((code, out.to_owned())))
            .run();
        assert_eq!(ok, Some((0, "done\n".to_owned())));

        let mut failure = None;
        let mut calling = Calling::new()
            .command("sh", ["-c", "echo partial; echo broken >&2; exit 5"])
            .capture_stdout()
            .capture_stderr()
            .on_error(|e, code, out, err| {
                failure = Some((matches!(e, Error::CommandFailed { .. }), code, out.to_owned(), err.to_owned()))
            });
        assert!(calling.run_and_check_error().is_err());
        assert_eq!(calling.ret_code(), 5);
        drop(calling);
        assert_eq!(failure, Some((true, 5, "partial\n".to_owned(), "broken\n".to_owned())));
    }

    #[test]
    fn test_sudo_as_root() {
        if is_root() {
            let output = sudo("sh", ["-c", "echo root"]).unwrap();
            assert_eq!(output.stdout, "root\n");
        }
    }
}
