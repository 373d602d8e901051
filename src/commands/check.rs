//! Check command implementation.
//!
//! Validates procfs access and the layouts of the sources metrics depend on.

use herakles_proc_sampler::fmt::format_percent;
use herakles_proc_sampler::{schema, SamplerConfig, SnapshotReader, SystemSampler};
use nix::unistd::geteuid;

/// Validates system requirements and configuration.
pub fn command_check(config: &SamplerConfig) -> anyhow::Result<()> {
    println!("🔍 Herakles Process Sampler - System Check");
    println!("==========================================");

    let reader = SnapshotReader::new(config);
    let mut all_ok = true;

    println!("\n👤 Checking privileges...");
    if geteuid().is_root() {
        println!("   ✅ Running as root (uid=0)");
    } else {
        println!("   ⚠️  Not running as root - some per-process files may be unreadable");
    }

    println!("\n📁 Checking {} ...", reader.proc_root().display());
    match reader.list_pids() {
        Ok(pids) if !pids.is_empty() => {
            println!("   ✅ Can enumerate {} process entries", pids.len());
        }
        Ok(_) => {
            println!("   ❌ No process entries found");
            all_ok = false;
        }
        Err(e) => {
            println!("   ❌ {}", e);
            all_ok = false;
        }
    }

    println!("\n🧩 Checking source layouts...");
    match schema::validate(&reader) {
        Ok(()) => println!("   ✅ stat layouts match expected field counts"),
        Err(e) => {
            println!("   ❌ {}", e);
            all_ok = false;
        }
    }

    println!("\n📊 Checking system sources...");
    let system = SystemSampler::new(config);
    let probes: [(&str, herakles_proc_sampler::Result<String>); 4] = [
        ("uptime", system.uptime_seconds().map(|v| format!("{}s", v))),
        ("meminfo", system.ram_percent().map(|v| format!("{}% used", format_percent(v)))),
        ("version", system.kernel_version()),
        ("os-release", system.os_name()),
    ];
    for (name, result) in probes {
        match result {
            Ok(v) => println!("   ✅ {}: {}", name, v),
            Err(e) => {
                println!("   ❌ {}: {}", name, e);
                all_ok = false;
            }
        }
    }

    println!("\n👥 Checking user database...");
    match reader.resolve_user_name("0") {
        Ok(name) if !name.is_empty() => println!("   ✅ uid 0 resolves to '{}'", name),
        Ok(_) => println!("   ⚠️  uid 0 not found in {}", reader.passwd_path().display()),
        Err(e) => {
            println!("   ❌ {}", e);
            all_ok = false;
        }
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed - system is ready");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review warnings");
        std::process::exit(1);
    }
}
