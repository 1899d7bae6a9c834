//! Check command implementation.
//!
//! Validates that the /proc interfaces and getrusage() are usable.

use herakles_memlab::Recorder;

use crate::config::{validate_effective_config, Config};
use crate::startup_checks::validate_requirements;

/// Validates system requirements and configuration.
pub fn command_check(config: &Config, recorder: &mut Recorder) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Herakles Memory Lab - System Check");
    println!("====================================");

    let mut all_ok = true;

    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(_) => println!("   ✅ Configuration is valid"),
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }

    let proc_dir = config.proc_dir();
    println!("\n📁 Checking {}...", proc_dir.display());
    match validate_requirements(&proc_dir, recorder.buffer_mut()) {
        Ok(_) => println!("   ✅ status, smaps, maps and getrusage available"),
        Err(e) => {
            println!("   ❌ {}", e);
            all_ok = false;
        }
    }

    if all_ok {
        println!("\n💾 Checking a live capture...");
        match recorder.capture() {
            Ok(record) => println!(
                "   ✅ Capture successful: RSS={}MB, PSS={}MB, minor faults={}",
                record.resident_bytes / 1024 / 1024,
                record.proportional_bytes / 1024 / 1024,
                record.minor_faults
            ),
            Err(e) => {
                println!("   ❌ Capture failed: {}", e);
                all_ok = false;
            }
        }
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review the output above");
        std::process::exit(1);
    }
}
