//! Integration tests for the sampler over a fixture procfs tree.
//!
//! Each test builds a temporary directory shaped like /proc plus a user
//! database and os-release file, then drives the public API against it.

use herakles_proc_sampler::fmt::{format_duration, format_percent};
use herakles_proc_sampler::{
    cpu_percent_between, Pid, ProcessSampler, SamplerConfig, SnapshotReader, SystemSampler,
};
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const STAT_42: &str = "42 (worker) S 1 42 42 0 -1 4194304 100 0 0 0 1000 500 300 200 20 0 3 0 5000 2097152 512 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 1 0 0 0 0 0";
const STAT_1: &str = "1 (init) S 0 1 1 0 -1 4194560 500 0 0 0 10 20 0 0 20 0 1 0 1 1048576 256 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0";

const PROC_STAT: &str = "cpu  100 0 100 800 0 0 0 0 0 0\n\
                         cpu0 50 0 50 400 0 0 0 0 0 0\n\
                         cpu1 50 0 50 400 0 0 0 0 0 0\n\
                         intr 12345\n\
                         processes 1234\n\
                         procs_running 2\n\
                         procs_blocked 0\n";

struct Fixture {
    _dir: TempDir,
    config: SamplerConfig,
}

impl Fixture {
    fn proc_root(&self) -> &Path {
        &self.config.proc_root
    }
}

fn write_process(root: &Path, pid: &str, stat: &str, status: &str, cmdline: &[u8]) {
    let dir = root.join(pid);
    fs::create_dir_all(&dir).expect("Failed to create pid dir");
    fs::write(dir.join("stat"), stat).expect("Failed to write stat");
    fs::write(dir.join("status"), status).expect("Failed to write status");
    fs::write(dir.join("cmdline"), cmdline).expect("Failed to write cmdline");
}

fn fixture() -> Fixture {
    let dir = tempdir().expect("Failed to create temp dir");
    let root = dir.path().join("proc");
    fs::create_dir_all(&root).expect("Failed to create proc root");

    fs::write(root.join("stat"), PROC_STAT).expect("Failed to write stat");
    fs::write(
        root.join("meminfo"),
        "MemTotal:           1000 kB\nMemFree:             400 kB\nBuffers:             100 kB\nCached:              200 kB\n",
    )
    .expect("Failed to write meminfo");
    fs::write(
        root.join("cpuinfo"),
        "processor\t: 0\nmodel name\t: Test CPU\ncpu cores\t: 4\n\nprocessor\t: 1\ncpu cores\t: 4\n",
    )
    .expect("Failed to write cpuinfo");
    fs::write(root.join("uptime"), "150.00 300.00\n").expect("Failed to write uptime");
    fs::write(
        root.join("version"),
        "Linux version 6.1.0-13-amd64 (debian-kernel@lists.debian.org) (gcc-12) #1 SMP\n",
    )
    .expect("Failed to write version");

    write_process(
        &root,
        "1",
        STAT_1,
        "Name:\tinit\nUid:\t0\t0\t0\t0\nVmSize:\t    1024 kB\nThreads:\t1\n",
        b"/sbin/init\0splash\0",
    );
    write_process(
        &root,
        "42",
        STAT_42,
        "Name:\tworker\nUid:\t1000\t1000\t1000\t1000\nVmSize:\t    2048 kB\nThreads:\t3\n",
        b"/usr/bin/worker\0--jobs\0\x38\0",
    );
    // Non-process entries must be ignored
    fs::create_dir_all(root.join("self")).expect("Failed to create self");
    fs::create_dir_all(root.join("sys")).expect("Failed to create sys");

    let passwd = dir.path().join("passwd");
    fs::write(
        &passwd,
        "# local users\nroot:x:0:0:root:/root:/bin/bash\nalice:x:1000:1000:Alice:/home/alice:/bin/bash\nbob:x:10000:10000::/home/bob:/bin/sh\n",
    )
    .expect("Failed to write passwd");

    let os_release = dir.path().join("os-release");
    fs::write(
        &os_release,
        "NAME=\"Debian GNU/Linux\"\nPRETTY_NAME=\"Debian GNU/Linux 12 (bookworm)\"\nID=debian\n",
    )
    .expect("Failed to write os-release");

    let config = SamplerConfig {
        proc_root: root,
        passwd_path: passwd,
        os_release_path: os_release,
        clock_ticks: Some(100),
        ..SamplerConfig::default()
    };
    Fixture { _dir: dir, config }
}

#[test]
fn test_pid_discovery_ignores_non_numeric_entries() {
    let fx = fixture();
    let reader = SnapshotReader::new(&fx.config);
    let mut pids: Vec<String> = reader
        .list_pids()
        .expect("list")
        .iter()
        .map(|p| p.as_str().to_string())
        .collect();
    pids.sort();
    assert_eq!(pids, vec!["1", "42"]);
}

#[test]
fn test_process_metrics() {
    let fx = fixture();
    let sampler = ProcessSampler::new(&fx.config);
    let metrics = sampler
        .sample(&Pid::new("42").expect("pid"))
        .expect("sample")
        .expect("process exists");

    assert_eq!(metrics.user, "alice");
    assert_eq!(metrics.command, "/usr/bin/worker --jobs 8");
    assert!((metrics.vm_size_mb - 2.0).abs() < 1e-9);
    assert!((metrics.start_time_seconds - 50.0).abs() < 1e-9);
    assert!((metrics.elapsed_seconds - 100.0).abs() < 1e-9);
    // (1000 + 500 + 300 + 200) / 100 = 20s busy over 100s
    let cpu = metrics.cpu_percent.expect("positive elapsed");
    assert!((cpu - 20.0).abs() < 1e-9);
    assert_eq!(format_percent(metrics.cpu_percent), "20.000000");
    assert_eq!(format_duration(metrics.elapsed_seconds), "00:01:40");
}

#[test]
fn test_root_process_resolves_root_user() {
    let fx = fixture();
    let sampler = ProcessSampler::new(&fx.config);
    let pid = Pid::new("1").expect("pid");
    assert_eq!(sampler.user(&pid).expect("user"), "root");
    assert_eq!(sampler.command(&pid).expect("cmdline"), "/sbin/init splash");
}

#[test]
fn test_vanished_process_is_none() {
    let fx = fixture();
    let sampler = ProcessSampler::new(&fx.config);
    assert!(sampler
        .sample(&Pid::new("4242").expect("pid"))
        .expect("sample")
        .is_none());
}

#[test]
fn test_system_summary() {
    let fx = fixture();
    let summary = SystemSampler::new(&fx.config).summary().expect("summary");

    assert_eq!(summary.os_name, "Debian GNU/Linux 12 (bookworm)");
    assert_eq!(summary.kernel_version, "6.1.0-13-amd64");
    assert_eq!(summary.cores, 4);
    assert_eq!(summary.uptime_seconds, 150);
    let ram = summary.ram_percent.expect("non-degenerate");
    assert!((ram - 55.555_555).abs() < 1e-4);
    assert_eq!(summary.total_processes, 1234);
    assert_eq!(summary.running_processes, 2);
    assert_eq!(summary.total_threads, 4);
}

#[test]
fn test_thread_total_skips_process_without_status() {
    let fx = fixture();
    write_process(fx.proc_root(), "77", STAT_1, "Threads:\t9\n", b"");
    fs::remove_file(fx.proc_root().join("77").join("status")).expect("remove status");

    let system = SystemSampler::new(&fx.config);
    assert_eq!(system.total_threads().expect("threads"), 4);
}

#[test]
fn test_two_sample_cpu_rate() {
    let fx = fixture();
    let system = SystemSampler::new(&fx.config);
    let earlier = system.cpu_sample(None).expect("read").expect("cpu line");

    // 150 more active ticks and 50 more idle ticks
    fs::write(
        fx.proc_root().join("stat"),
        PROC_STAT.replace("cpu  100 0 100 800", "cpu  200 0 150 850"),
    )
    .expect("Failed to rewrite stat");
    let later = system.cpu_sample(None).expect("read").expect("cpu line");

    let pct = cpu_percent_between(&earlier, &later).expect("ticks elapsed");
    assert!((pct - 75.0).abs() < 1e-9);
    assert_eq!(cpu_percent_between(&later, &later), None);
}

#[test]
fn test_per_core_samples() {
    let fx = fixture();
    let system = SystemSampler::new(&fx.config);
    let all = system.cpu_samples().expect("samples");
    assert_eq!(all.len(), 3);
    assert!(all.contains_key("cpu"));
    assert_eq!(
        system.cpu_sample(Some(1)).expect("read"),
        all.get("cpu1").copied()
    );
    assert_eq!(system.cpu_sample(Some(7)).expect("read"), None);
}

#[test]
fn test_reads_are_idempotent() {
    let fx = fixture();
    let system = SystemSampler::new(&fx.config);
    assert_eq!(
        system.summary().expect("summary"),
        system.summary().expect("summary")
    );
}

#[test]
fn test_missing_proc_root_is_error() {
    let fx = fixture();
    let config = SamplerConfig {
        proc_root: fx.proc_root().join("absent"),
        ..fx.config.clone()
    };
    assert!(SnapshotReader::new(&config).list_pids().is_err());
    assert!(SystemSampler::new(&config).uptime_seconds().is_err());
}
