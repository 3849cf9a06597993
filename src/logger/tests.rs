use super::*;

use std::sync::{Mutex, Once};

use assert_matches::assert_matches;

// Records everything logged under TARGET, so tests can look for their own unique messages.
struct Capture(Mutex<Vec<(log::Level, String)>>);

static CAPTURE: Capture = Capture(Mutex::new(Vec::new()));
static INIT: Once = Once::new();

impl log::Log for Capture {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.target() == TARGET
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            self.0.lock().unwrap().push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

fn captured(marker: &str) -> Vec<(log::Level, String)> {
    INIT.call_once(|| {
        log::set_logger(&CAPTURE).ok();
        log::set_max_level(log::LevelFilter::Trace);
    });
    CAPTURE
        .0
        .lock()
        .unwrap()
        .iter()
        .filter(|(_, msg)| msg.contains(marker))
        .cloned()
        .collect()
}

#[derive(Default)]
struct Journal(Mutex<Vec<String>>);

impl SystemdLogger for Journal {
    fn error(&self, args: fmt::Arguments) -> io::Result<()> {
        self.0.lock().unwrap().push(format!("E {}", args));
        Ok(())
    }

    fn warning(&self, args: fmt::Arguments) -> io::Result<()> {
        self.0.lock().unwrap().push(format!("W {}", args));
        Ok(())
    }

    fn info(&self, args: fmt::Arguments) -> io::Result<()> {
        self.0.lock().unwrap().push(format!("I {}", args));
        Ok(())
    }
}

#[test]
fn test_std_logger_gating() {
    captured("");
    let logger = StdLogger::new();
    logger.trace(format_args!("gating-1 trace"));
    logger.debug(format_args!("gating-1 debug"));
    logger.info(format_args!("gating-1 info"));
    logger.warn(format_args!("gating-1 warn"));
    logger.error(format_args!("gating-1 error"));

    logger.set_level(Level::Error);
    assert_eq!(logger.level(), Level::Error);
    logger.info(format_args!("gating-1 muted"));
    logger.warn(format_args!("gating-1 still warn"));
    logger.print(format_args!("gating-1 print"));

    assert_eq!(
        captured("gating-1"),
        vec![
            (log::Level::Info, "gating-1 info".to_owned()),
            (log::Level::Warn, "gating-1 warn".to_owned()),
            (log::Level::Error, "gating-1 error".to_owned()),
            (log::Level::Warn, "gating-1 still warn".to_owned()),
            (log::Level::Info, "gating-1 print".to_owned()),
        ]
    );
}

#[test]
fn test_std_logger_trace_level() {
    captured("");
    let logger = StdLogger::with_level(Level::Trace);
    logger.trace(format_args!("trace-level-2 {}", 42));
    logger.debug(format_args!("trace-level-2 debug"));
    assert_eq!(
        captured("trace-level-2"),
        vec![
            (log::Level::Trace, "trace-level-2 42".to_owned()),
            (log::Level::Debug, "trace-level-2 debug".to_owned()),
        ]
    );
}

#[test]
fn test_std_logger_with_fields() {
    captured("");
    let logger = StdLogger::new();
    let scoped = logger.with("user", &"alice").with("id", &7);
    scoped.info(format_args!("fields-3 login"));
    logger.info(format_args!("fields-3 plain"));
    assert_eq!(
        captured("fields-3"),
        vec![
            (log::Level::Info, "fields-3 login user=alice id=7".to_owned()),
            (log::Level::Info, "fields-3 plain".to_owned()),
        ]
    );
}

#[test]
#[should_panic(expected = "fatal-4 boom")]
fn test_std_logger_fatal_panics_in_tests() {
    StdLogger::new().fatal(format_args!("fatal-4 {}", "boom"));
}

#[test]
#[should_panic(expected = "panic-5 boom")]
fn test_std_logger_panic() {
    StdLogger::new().panic(format_args!("panic-5 boom"));
}

#[test]
fn test_dummy_logger() {
    captured("");
    let logger = DummyLogger;
    logger.set_level(Level::Trace);
    assert_eq!(logger.level(), Level::Info);
    logger.error(format_args!("dummy-6 error"));
    logger.fatal(format_args!("dummy-6 fatal"));
    logger.with("k", &1).warn(format_args!("dummy-6 warn"));
    assert!(captured("dummy-6").is_empty());

    let result: std::thread::Result<()> = std::panic::catch_unwind(|| DummyLogger.panic(format_args!("dummy-6 panic")));
    assert_matches!(result, Err(_));
}

#[test]
fn test_as_systemd_logger() {
    captured("");
    let sl = as_systemd_logger(Arc::new(StdLogger::new()));
    sl.error(format_args!("as-systemd-7 e")).unwrap();
    sl.warning(format_args!("as-systemd-7 w")).unwrap();
    sl.info(format_args!("as-systemd-7 i")).unwrap();
    let levels: Vec<_> = captured("as-systemd-7").into_iter().map(|(l, _)| l).collect();
    assert_eq!(levels, vec![log::Level::Error, log::Level::Warn, log::Level::Info]);
}

#[test]
fn test_from_systemd_logger() {
    captured("");
    let journal = Arc::new(Journal::default());
    let logger = from_systemd_logger(journal.clone());
    logger.set_level(Level::Info);
    logger.debug(format_args!("from-systemd-8 debug"));
    logger.info(format_args!("from-systemd-8 info"));
    logger.warn(format_args!("from-systemd-8 warn"));
    logger.error(format_args!("from-systemd-8 error"));

    assert_eq!(
        *journal.0.lock().unwrap(),
        vec![
            "I from-systemd-8 info",
            "W from-systemd-8 warn",
            "E from-systemd-8 error",
        ]
    );
    assert!(!captured("from-systemd-8 debug").iter().any(|(_, m)| m.contains("debug")));
}

// The global logger is shared by the whole test binary, so everything touching it lives here.
#[test]
fn test_global_facade() {
    captured("");
    set_level(Level::Debug);
    assert_eq!(level(), Level::Debug);

    set_logger(Box::new(StdLogger::new()));
    assert_eq!(level(), Level::Debug, "level carries over to the new logger");

    crate::debugf!("global-9 debug {}", 1);
    crate::tracef!("global-9 trace");
    crate::infof!("global-9 info");
    crate::warnf!("global-9 warn");
    crate::errorf!("global-9 error");
    crate::printf!("global-9 print");
    setup();

    let expected: Vec<String> = if VERY_QUIET_ENABLED {
        vec!["global-9 print".into()]
    } else {
        vec![
            "global-9 debug 1".into(),
            "global-9 info".into(),
            "global-9 warn".into(),
            "global-9 error".into(),
            "global-9 print".into(),
        ]
    };
    let messages: Vec<_> = captured("global-9").into_iter().map(|(_, m)| m).collect();
    assert_eq!(messages, expected);

    let result: std::thread::Result<()> = std::panic::catch_unwind(|| crate::panicf!("global-9 {}", "panic"));
    assert_matches!(result, Err(_));

    set_logger(Box::new(DummyLogger));
    crate::errorf!("global-9 swallowed");
    assert!(captured("global-9 swallowed").is_empty());

    set_logger(Box::new(StdLogger::new()));
    set_level(Level::Info);
}
