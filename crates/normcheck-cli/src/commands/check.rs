use normcheck_kernel::{SnapshotDocument, StandardsProfile};
use normcheck_rules::{ConformanceReport, run_conformance};
use std::path::PathBuf;

pub fn run(snapshot: PathBuf, profile: Option<PathBuf>, json_output: bool) {
    let profile = match profile {
        Some(path) => StandardsProfile::load(&path).unwrap_or_else(|err| {
            eprintln!("error: failed to load profile: {err}");
            std::process::exit(2);
        }),
        None => StandardsProfile::default(),
    };

    let document = SnapshotDocument::load(&snapshot).unwrap_or_else(|err| {
        eprintln!("error: failed to load document: {err}");
        std::process::exit(2);
    });

    let report = run_conformance(&document, &profile).unwrap_or_else(|err| {
        eprintln!("error: conformance run failed: {err}");
        std::process::exit(2);
    });

    if json_output {
        let rendered = serde_json::to_string_pretty(&report).unwrap_or_else(|err| {
            eprintln!("error: failed to render conformance report JSON: {err}");
            std::process::exit(2);
        });
        println!("{rendered}");
    } else {
        print_human_summary(&snapshot, &report);
    }

    if !report.is_conformant() {
        std::process::exit(1);
    }
}

fn print_human_summary(snapshot: &std::path::Path, report: &ConformanceReport) {
    println!("normcheck check");
    println!("  Document: {}", snapshot.display());
    println!("  Profile Digest: {}", report.profile_digest);
    println!("  Result: {}", report.result);
    println!("  Checks:");
    for check in &report.checks {
        let status = if check.ok { "ok" } else { "failed" };
        let count_suffix = if check.messages.is_empty() {
            String::new()
        } else {
            format!(" ({} messages)", check.messages.len())
        };
        println!("    - {}: {status}{count_suffix}", check.check_id);
    }
    if !report.messages.is_empty() {
        println!("  Messages:");
        for message in &report.messages {
            let standard_suffix = if message.standard.is_empty() {
                String::new()
            } else {
                format!(" [{}]", message.standard)
            };
            println!(
                "    - {}: {}{standard_suffix}",
                message.position, message.text
            );
        }
    }
}
