use async_trait::async_trait;
use parking_lot::Mutex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

use super::*;
use crate::compiler::CompilerCommand;
use crate::events::{ChannelObserver, SessionEvent, TracingObserver};
use crate::paths::{relative_to, to_slash};
use crate::placeholder::is_placeholder_name;
use crate::process::{OutputLine, ProcessHandle};

/// What the fake compiler sees and does
struct Invocation {
    out_dir: Option<PathBuf>,
    out: Option<PathBuf>,
    placeholder: Option<PathBuf>,
}

type Script = dyn Fn(&Invocation) -> (Vec<OutputLine>, i32) + Send + Sync;

/// Writes files the way a script says, then reports a finished process
struct ScriptedRunner {
    script: Box<Script>,
    calls: AtomicUsize,
    last_args: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    fn new<F>(script: F) -> Arc<Self>
    where
        F: Fn(&Invocation) -> (Vec<OutputLine>, i32) + Send + Sync + 'static,
    {
        Arc::new(Self {
            script: Box::new(script),
            calls: AtomicUsize::new(0),
            last_args: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn workspace(&self) -> PathBuf {
        let args = self.last_args.lock();
        let pos = args
            .iter()
            .position(|a| a == "--outDir" || a == "--out")
            .expect("output flag");
        let value = PathBuf::from(&args[pos + 1]);
        if args[pos] == "--out" {
            value.parent().expect("out parent").to_path_buf()
        } else {
            value
        }
    }
}

#[async_trait]
impl ProcessRunner for ScriptedRunner {
    async fn spawn(&self, _command: &CompilerCommand, args: &[OsString]) -> CompileResult<ProcessHandle> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        let value_of = |flag: &str| {
            args.iter()
                .position(|a| a == flag)
                .map(|i| PathBuf::from(&args[i + 1]))
        };
        let invocation = Invocation {
            out_dir: value_of("--outDir"),
            out: value_of("--out"),
            placeholder: args
                .last()
                .filter(|a| {
                    Path::new(a.as_str())
                        .file_name()
                        .map(|n| is_placeholder_name(&n.to_string_lossy()))
                        .unwrap_or(false)
                })
                .map(PathBuf::from),
        };
        *self.last_args.lock() = args.clone();

        let (lines, code) = (self.script)(&invocation);
        Ok(ProcessHandle::finished(lines, code))
    }
}

fn write(path: &Path, contents: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

struct Project {
    root: TempDir,
    tmp: TempDir,
}

impl Project {
    fn new() -> Self {
        Self {
            root: TempDir::new().unwrap(),
            tmp: TempDir::new().unwrap(),
        }
    }

    fn src(&self) -> PathBuf {
        self.root.path().join("src")
    }

    fn build(&self) -> PathBuf {
        self.root.path().join("build")
    }

    fn input(&self, relative: &str) -> SourceFileRef {
        let absolute = self.src().join(relative);
        write(&absolute, "export const x = 1;\n");
        SourceFileRef::new(absolute, relative, self.src())
    }

    fn options(&self) -> SessionOptions {
        SessionOptions {
            tsc_path: Some(PathBuf::from("/fake/bin/tsc")),
            ..Default::default()
        }
        .with_tmp_dir(self.tmp.path())
        .with_out_dir(self.build())
    }

    fn leftovers(&self) -> Vec<String> {
        std::fs::read_dir(self.tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }
}

fn logical(outcome: &SessionOutcome) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = outcome.artifacts.iter().map(|a| a.logical_path.clone()).collect();
    paths.sort();
    paths
}

fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_single_input_compiles_into_out_dir() {
    let project = Project::new();
    let input = project.input("a.ts");
    let runner = ScriptedRunner::new(|inv| {
        let out_dir = inv.out_dir.as_ref().unwrap();
        write(&out_dir.join("a.js"), "var x = 1;\n");
        // the tree keeper compiles too, and must not surface
        let keeper = inv.placeholder.as_ref().unwrap();
        let stem = keeper.file_stem().unwrap().to_string_lossy().into_owned();
        write(&out_dir.join(format!("{}.js", stem)), "var __k = 0;\n");
        (vec![], 0)
    });

    let registry = SessionRegistry::shared();
    let outcome = Session::new(vec![input], project.options(), Arc::clone(&registry))
        .with_runner(runner.clone())
        .compile()
        .await;

    assert_eq!(outcome.state, SessionState::Completed);
    assert!(outcome.error.is_none());
    assert_eq!(logical(&outcome), vec![project.build().join("a.js")]);
    assert_eq!(outcome.artifacts[0].relative_path, "a.js");
    assert_eq!(outcome.artifacts[0].kind, ArtifactKind::Code);
    assert_eq!(outcome.artifacts[0].contents_str(), Some("var x = 1;\n"));
    assert_eq!(runner.calls(), 1);
    assert_eq!(registry.running(), 0);

    // workspace and tree keeper are gone
    assert!(!runner.workspace().exists());
    assert!(project.leftovers().is_empty());
    let keepers: Vec<_> = std::fs::read_dir(project.src())
        .unwrap()
        .filter(|e| is_placeholder_name(&e.as_ref().unwrap().file_name().to_string_lossy()))
        .collect();
    assert!(keepers.is_empty());
}

#[tokio::test]
async fn test_sibling_roots_keep_their_directories() {
    let project = Project::new();
    let inputs = vec![project.input("lib/x.ts"), project.input("app/y.ts")];
    let runner = ScriptedRunner::new(|inv| {
        let out_dir = inv.out_dir.as_ref().unwrap();
        write(&out_dir.join("lib/x.js"), "x");
        write(&out_dir.join("app/y.js"), "y");
        (vec![], 0)
    });

    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let outcome = Session::new(inputs, project.options(), SessionRegistry::shared())
        .with_runner(runner)
        .with_observer(Arc::new(TracingObserver))
        .compile()
        .await;

    assert!(outcome.is_success());
    assert_eq!(
        logical(&outcome),
        vec![project.build().join("app/y.js"), project.build().join("lib/x.js")]
    );
}

#[tokio::test]
async fn test_common_directory_is_not_stripped_twice() {
    let project = Project::new();
    let inputs = vec![project.input("lib/x.ts"), project.input("lib/y.ts")];
    // without a tree keeper the compiler strips the shared `lib` itself
    let runner = ScriptedRunner::new(|inv| {
        assert!(inv.placeholder.is_none());
        let out_dir = inv.out_dir.as_ref().unwrap();
        write(&out_dir.join("x.js"), "x");
        write(&out_dir.join("y.js"), "y");
        (vec![], 0)
    });

    let options = project.options().with_keep_tree(false);
    let outcome = Session::new(inputs, options, SessionRegistry::shared())
        .with_runner(runner)
        .compile()
        .await;

    assert!(outcome.is_success());
    assert_eq!(
        logical(&outcome),
        vec![project.build().join("x.js"), project.build().join("y.js")]
    );
}

#[tokio::test]
async fn test_source_map_sources_follow_the_move() {
    let project = Project::new();
    let input = project.input("a.ts");
    let input_path = input.absolute_path.clone();
    let runner = ScriptedRunner::new(move |inv| {
        let out_dir = inv.out_dir.as_ref().unwrap();
        let source = to_slash(&relative_to(out_dir, &input_path));
        write(&out_dir.join("a.js"), "var x = 1;\n//# sourceMappingURL=a.js.map\n");
        write(
            &out_dir.join("a.js.map"),
            &format!(
                r#"{{"version":3,"file":"a.js","sourceRoot":"","sources":["{}"],"names":[],"mappings":"AAAA"}}"#,
                source
            ),
        );
        (vec![], 0)
    });

    let mut options = project.options().with_keep_tree(false);
    options.switches.sourcemap = true;
    let outcome = Session::new(vec![input], options, SessionRegistry::shared())
        .with_runner(runner)
        .compile()
        .await;

    assert!(outcome.is_success());
    let map = outcome
        .artifacts
        .iter()
        .find(|a| a.kind == ArtifactKind::SourceMap)
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&map.contents).unwrap();
    assert_eq!(value["sources"][0], "../src/a.ts");
    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["version", "file", "sourceRoot", "sources", "names", "mappings"]);
}

#[tokio::test]
async fn test_single_out_file() {
    let project = Project::new();
    let inputs = vec![project.input("a.ts"), project.input("b.ts")];
    let runner = ScriptedRunner::new(|inv| {
        assert!(inv.out_dir.is_none());
        assert!(inv.placeholder.is_none());
        write(inv.out.as_ref().unwrap(), "var a, b;\n");
        (vec![], 0)
    });

    let options = project.options().with_out("bundle.js");
    let outcome = Session::new(inputs, options, SessionRegistry::shared())
        .with_runner(runner)
        .compile()
        .await;

    assert!(outcome.is_success());
    assert_eq!(logical(&outcome), vec![project.build().join("bundle.js")]);
}

#[tokio::test]
async fn test_nonzero_exit_fails_and_streams_output() {
    let project = Project::new();
    let input = project.input("broken.ts");
    let runner = ScriptedRunner::new(|_| {
        (
            vec![
                OutputLine::Stdout("src/broken.ts(1,5): error TS1005: ';' expected.".to_string()),
                OutputLine::Stderr("compilation failed".to_string()),
            ],
            1,
        )
    });
    let (observer, mut rx) = ChannelObserver::new();

    let outcome = Session::new(vec![input], project.options(), SessionRegistry::shared())
        .with_runner(runner.clone())
        .with_observer(Arc::new(observer))
        .compile()
        .await;

    assert_eq!(outcome.state, SessionState::Failed);
    assert_eq!(outcome.error, Some(CompileError::process_exit(Some(1))));
    assert!(outcome.artifacts.is_empty());
    assert!(!runner.workspace().exists());

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(e, SessionEvent::Stdout(l) if l.contains("TS1005"))));
    assert!(events.iter().any(|e| matches!(e, SessionEvent::Stderr(l) if l == "compilation failed")));
    assert!(events.iter().any(|e| matches!(e, SessionEvent::Error(CompileError::ProcessExit { .. }))));

    let states: Vec<SessionState> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::State(s) => Some(*s),
            _ => None,
        })
        .collect();
    assert_eq!(
        states,
        vec![
            SessionState::Starting,
            SessionState::CreatingWorkspace,
            SessionState::CreatingPlaceholder,
            SessionState::RunningProcess,
            SessionState::CollectingOutputs,
            SessionState::CleaningUp,
            SessionState::Failed,
        ]
    );
}

#[tokio::test]
async fn test_partial_output_survives_failure() {
    let project = Project::new();
    let input = project.input("a.ts");
    let runner = ScriptedRunner::new(|inv| {
        write(&inv.out_dir.as_ref().unwrap().join("a.js"), "var x;\n");
        (vec![], 2)
    });

    let outcome = Session::new(vec![input], project.options(), SessionRegistry::shared())
        .with_runner(runner)
        .compile()
        .await;

    assert_eq!(outcome.state, SessionState::Failed);
    assert_eq!(outcome.artifacts.len(), 1);
    assert!(outcome.into_result().is_err());
}

struct FailingRunner;

#[async_trait]
impl ProcessRunner for FailingRunner {
    async fn spawn(&self, command: &CompilerCommand, _args: &[OsString]) -> CompileResult<ProcessHandle> {
        Err(CompileError::process_spawn(&command.program, "No such file or directory"))
    }
}

#[tokio::test]
async fn test_spawn_failure_still_cleans_up() {
    let project = Project::new();
    let input = project.input("a.ts");

    let outcome = Session::new(vec![input], project.options(), SessionRegistry::shared())
        .with_runner(Arc::new(FailingRunner))
        .compile()
        .await;

    assert_eq!(outcome.state, SessionState::Failed);
    assert_eq!(outcome.error.as_ref().map(|e| e.error_code()), Some("TSC_SPAWN"));
    assert!(project.leftovers().is_empty());
}

#[tokio::test]
async fn test_unwritable_tree_keeper_fails_without_compiling() {
    let project = Project::new();
    let mut input = project.input("a.ts");
    // the tree keeper goes into the base directory, which does not exist
    input.base_directory = project.root.path().join("vanished");
    let runner = ScriptedRunner::new(|_| (vec![], 0));
    let (observer, mut rx) = ChannelObserver::new();

    let outcome = Session::new(vec![input], project.options(), SessionRegistry::shared())
        .with_runner(runner.clone())
        .with_observer(Arc::new(observer))
        .compile()
        .await;

    assert_eq!(outcome.state, SessionState::Failed);
    let error = outcome.error.expect("placeholder error");
    assert!(matches!(error, CompileError::Placeholder { .. }));
    assert!(error.to_string().contains("keep_tree disabled"), "{}", error);
    assert_eq!(runner.calls(), 0);
    assert!(outcome.artifacts.is_empty());
    assert!(project.leftovers().is_empty());

    let states: Vec<SessionState> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            SessionEvent::State(s) => Some(s),
            _ => None,
        })
        .collect();
    assert_eq!(
        states,
        vec![
            SessionState::Starting,
            SessionState::CreatingWorkspace,
            SessionState::CreatingPlaceholder,
            SessionState::CollectingOutputs,
            SessionState::CleaningUp,
            SessionState::Failed,
        ]
    );
}

#[tokio::test]
async fn test_invalid_options_fail_before_workspace() {
    let project = Project::new();
    let input = project.input("a.ts");
    let runner = ScriptedRunner::new(|_| (vec![], 0));
    let mut options = project.options();
    options.module = String::new();

    let registry = SessionRegistry::shared();
    let outcome = Session::new(vec![input], options, Arc::clone(&registry))
        .with_runner(runner.clone())
        .compile()
        .await;

    assert_eq!(outcome.state, SessionState::Failed);
    assert_eq!(outcome.error.as_ref().map(|e| e.error_code()), Some("TSC_CONFIG"));
    assert_eq!(runner.calls(), 0);
    assert_eq!(registry.running(), 0);
}

#[tokio::test]
async fn test_empty_input_list_still_runs_compiler() {
    let project = Project::new();
    let runner = ScriptedRunner::new(|inv| {
        assert!(inv.placeholder.is_none());
        (vec![], 0)
    });

    let outcome = Session::new(Vec::new(), project.options(), SessionRegistry::shared())
        .with_runner(runner.clone())
        .compile()
        .await;

    assert!(outcome.is_success());
    assert!(outcome.artifacts.is_empty());
    assert_eq!(runner.calls(), 1);
}

#[tokio::test]
async fn test_abort_before_start_skips_compiler() {
    let project = Project::new();
    let input = project.input("a.ts");
    let runner = ScriptedRunner::new(|_| (vec![], 0));
    let registry = SessionRegistry::shared();

    // another session is still running, so the abort cycle stays open
    let other = registry.enter();
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    registry.abort_all(Some(Box::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })));

    let outcome = Session::new(vec![input], project.options(), Arc::clone(&registry))
        .with_runner(runner.clone())
        .compile()
        .await;

    assert_eq!(outcome.state, SessionState::Aborted);
    assert_eq!(outcome.error, Some(CompileError::Aborted));
    assert_eq!(runner.calls(), 0);
    assert!(project.leftovers().is_empty());
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    drop(other);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(!registry.is_abort_requested());
}

/// Requests an abort while the compiler is "running"
struct AbortingRunner {
    registry: Arc<SessionRegistry>,
}

#[async_trait]
impl ProcessRunner for AbortingRunner {
    async fn spawn(&self, _command: &CompilerCommand, args: &[OsString]) -> CompileResult<ProcessHandle> {
        let pos = args.iter().position(|a| a == "--outDir").unwrap();
        write(&PathBuf::from(&args[pos + 1]).join("a.js"), "var x;\n");
        self.registry.abort_all(None);
        Ok(ProcessHandle::finished(vec![], 0))
    }
}

#[tokio::test]
async fn test_abort_during_compile_still_collects() {
    let project = Project::new();
    let input = project.input("a.ts");
    let registry = SessionRegistry::shared();
    let runner = Arc::new(AbortingRunner {
        registry: Arc::clone(&registry),
    });

    let outcome = Session::new(vec![input], project.options(), Arc::clone(&registry))
        .with_runner(runner)
        .compile()
        .await;

    assert_eq!(outcome.state, SessionState::Aborted);
    assert_eq!(outcome.artifacts.len(), 1);
    assert!(project.leftovers().is_empty());
    assert!(!registry.is_abort_requested());
}

#[tokio::test]
async fn test_concurrent_sessions_use_distinct_workspaces() {
    let project = Project::new();
    let registry = SessionRegistry::shared();
    let mut handles = Vec::new();
    for name in ["a", "b", "c", "d"] {
        let input = project.input(&format!("{}.ts", name));
        let runner = ScriptedRunner::new(move |inv| {
            write(&inv.out_dir.as_ref().unwrap().join(format!("{}.js", name)), name);
            (vec![], 0)
        });
        let session = Session::new(vec![input], project.options().with_keep_tree(false), Arc::clone(&registry))
            .with_runner(runner.clone());
        handles.push((tokio::spawn(session.compile()), runner));
    }

    let mut workspaces = Vec::new();
    for (handle, runner) in handles {
        let outcome = handle.await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.artifacts.len(), 1);
        workspaces.push(runner.workspace());
    }
    workspaces.sort();
    workspaces.dedup();
    assert_eq!(workspaces.len(), 4);
    assert_eq!(registry.running(), 0);
    assert!(project.leftovers().is_empty());
}
