//! Shared test infrastructure for integration tests.
//!
//! Integration tests run the real `rife2x` binary against a directory of fake
//! external tools. Each fake appends one line per invocation to a log file so
//! tests can assert on what was launched and with which arguments.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Stand-in for the compositing engine: metadata query, sequence split and
/// per-frame merge.
const FAKE_MAGICK: &str = r#"#!/bin/sh
echo "magick $*" >> "$FAKE_LOG"
for last; do :; done
case "$1" in
identify)
    [ "$FAKE_FAIL" = identify ] && { echo "identify: no decode delegate" >&2; exit 1; }
    printf '%s %s ' "$FAKE_FRAMES" "$FAKE_DELAY"
    i=1
    while [ "$i" -lt "$FAKE_FRAMES" ]; do
        printf '%s %s ' "$FAKE_FRAMES" "$FAKE_DELAY"
        i=$((i + 1))
    done
    ;;
convert)
    case "$*" in
    *Extract*) channel=alpha ;;
    *) channel=color ;;
    esac
    if [ "$FAKE_FAIL" = "split-$channel" ]; then
        sleep "${FAKE_FAIL_DELAY:-0}"
        echo "convert: $channel extraction exploded" >&2
        exit 1
    fi
    i=0
    while [ "$i" -lt "$FAKE_FRAMES" ]; do
        echo "$channel $i" > "$(printf "$last" "$i")"
        i=$((i + 1))
    done
    if [ "$FAKE_FAIL" = split-extra ] && [ "$channel" = color ]; then
        echo "color stray" > "$(printf "$last" "$FAKE_FRAMES")"
    fi
    ;;
*)
    [ "$FAKE_FAIL" = composite ] && { echo "composite: out of memory" >&2; exit 1; }
    cat "$1" > "$last"
    ;;
esac
"#;

/// Stand-in for the interpolation runner: writes `2 * inputs - 1` frames
/// numbered from 1 with the requested format.
const FAKE_RIFE: &str = r#"#!/bin/sh
echo "rife $*" >> "$FAKE_LOG"
while [ $# -gt 0 ]; do
    case "$1" in
    -i) in="$2"; shift ;;
    -o) out="$2"; shift ;;
    -f) fmt="$2"; shift ;;
    esac
    shift
done
case "$in" in
*/Alpha) channel=alpha ;;
*) channel=color ;;
esac
echo "rife-input $channel $(ls "$in" | tr '\n' ' ')" >> "$FAKE_LOG"
if [ "$FAKE_FAIL" = "rife-$channel" ]; then
    echo "vkCreateInstance failed" >&2
    exit 1
fi
n=$(ls "$in" | wc -l | tr -d ' ')
total=$((n * 2 - 1))
[ "$FAKE_FAIL" = rife-short ] && [ "$channel" = alpha ] && total=$((total - 1))
i=1
while [ "$i" -le "$total" ]; do
    echo "$channel $i" > "$out/$(printf "$fmt" "$i")"
    i=$((i + 1))
done
"#;

/// Stand-in for the assembler; the frame wildcard is expanded by the shell.
const FAKE_APNGASM: &str = r#"#!/bin/sh
echo "apngasm $*" >> "$FAKE_LOG"
[ "$FAKE_FAIL" = assemble ] && { echo "apngasm: cannot open output" >&2; exit 1; }
echo "apngasm-frames $(ls $2 | wc -l | tr -d ' ')" >> "$FAKE_LOG"
printf 'APNG' > "$1"
"#;

const FAKE_APNG2GIF: &str = r#"#!/bin/sh
echo "apng2gif $*" >> "$FAKE_LOG"
[ "$FAKE_FAIL" = convert ] && { echo "apng2gif: bad input" >&2; exit 1; }
cp "$1" "$2"
"#;

/// Isolated run environment: fake tools, a private temp dir and a working dir.
pub struct Harness {
    _root: TempDir,
    pub bin: PathBuf,
    pub tmp: PathBuf,
    pub work: PathBuf,
    pub log: PathBuf,
    frames: u64,
    delay: u64,
    fail: Option<String>,
    env: Vec<(String, String)>,
}

impl Harness {
    /// Fake toolchain reporting `frames` frames of `delay` hundredths each.
    pub fn new(frames: u64, delay: u64) -> Self {
        let root = TempDir::new().expect("create harness root");
        let bin = root.path().join("bin");
        let tmp = root.path().join("tmp");
        let work = root.path().join("work");
        for dir in [&bin, &tmp, &work] {
            fs::create_dir(dir).expect("create harness dir");
        }
        let log = root.path().join("invocations.log");
        fs::write(&log, "").expect("create log");

        for (name, script) in [
            ("magick", FAKE_MAGICK),
            ("rife-ncnn-vulkan", FAKE_RIFE),
            ("apngasm", FAKE_APNGASM),
            ("apng2gif", FAKE_APNG2GIF),
        ] {
            let path = bin.join(name);
            fs::write(&path, script).expect("write fake tool");
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
                .expect("chmod fake tool");
        }

        fs::write(work.join("input.gif"), b"GIF89a").expect("write input");

        Self {
            _root: root,
            bin,
            tmp,
            work,
            log,
            frames,
            delay,
            fail: None,
            env: Vec::new(),
        }
    }

    /// Make one fake step fail (e.g. `split-alpha`, `rife-color`, `composite`).
    pub fn fail(mut self, step: &str) -> Self {
        self.fail = Some(step.to_string());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    pub fn remove_tool(&self, name: &str) {
        fs::remove_file(self.bin.join(name)).expect("remove fake tool");
    }

    /// Command for the binary with a hermetic environment.
    pub fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_rife2x"));
        command
            .args(args)
            .current_dir(&self.work)
            .env_clear()
            .env("PATH", format!("{}:/usr/bin:/bin", self.bin.display()))
            .env("TMPDIR", &self.tmp)
            .env("RIFE2X_DEPENDENCIES", self.bin.join("no-such-dir"))
            .env("FAKE_LOG", &self.log)
            .env("FAKE_FRAMES", self.frames.to_string())
            .env("FAKE_DELAY", self.delay.to_string());
        if let Some(step) = &self.fail {
            command.env("FAKE_FAIL", step);
        }
        for (key, value) in &self.env {
            command.env(key, value);
        }
        command
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.command(args).output().expect("run rife2x")
    }

    pub fn invocations(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .expect("read log")
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Logged invocations whose line starts with `prefix`.
    pub fn invocations_of(&self, prefix: &str) -> Vec<String> {
        self.invocations()
            .into_iter()
            .filter(|line| line.starts_with(prefix))
            .collect()
    }

    /// Entries left in the private temp dir.
    pub fn leftover_temp_entries(&self) -> Vec<PathBuf> {
        fs::read_dir(&self.tmp)
            .expect("read tmp")
            .map(|entry| entry.expect("tmp entry").path())
            .collect()
    }

    pub fn work_file(&self, name: &str) -> PathBuf {
        self.work.join(name)
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

pub fn is_under(path: &str, dir: &Path) -> bool {
    Path::new(path).starts_with(dir)
}
