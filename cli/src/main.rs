//! hap CLI — driving adapter for the hap rule engine.
//!
//! Subcommands:
//! - `check <rules-file>` — parse and validate a rule configuration
//! - `match <rules-file> --plan <plan> [--platform-region <r>]
//!   [--hyperscaler-region <r>] [--hyperscaler <h>]` — resolve a request
//!   against the configuration and print the winning rule and selector

use std::process;

use hap::{LabelSelector, ProvisioningAttributes, RulesConfig};

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "check" => cmd_check(&args[2..]),
        "match" => cmd_match(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("error: unknown command \"{other}\"");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_check(args: &[String]) -> Result<(), String> {
    if args.is_empty() {
        return Err("check requires a rules file path".into());
    }

    let config = load_config(&args[0])?;
    let rule_set = config
        .build()
        .map_err(|e| format!("rule configuration invalid: {e}"))?;

    println!("Configuration valid ({} rules)", rule_set.len());
    Ok(())
}

fn cmd_match(args: &[String]) -> Result<(), String> {
    if args.is_empty() {
        return Err("match requires a rules file path".into());
    }

    let config = load_config(&args[0])?;
    let attrs = parse_attributes(&args[1..])?;

    let rule_set = config
        .build()
        .map_err(|e| format!("rule configuration invalid: {e}"))?;

    match rule_set.matching(&attrs) {
        Some(m) => {
            println!("rule:     {}", m.rule.original_text);
            println!("type:     {}", m.hyperscaler_type);
            println!("shared:   {}", m.shared);
            println!("euAccess: {}", m.eu_access);
            println!("selector: {}", LabelSelector::for_match(&m));
        }
        None => println!("(no match)"),
    }

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Config loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_config(path: &str) -> Result<RulesConfig, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{path}\": {e}"))?;

    let is_json = std::path::Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        RulesConfig::from_json(&content).map_err(|e| format!("JSON parse error: {e}"))
    } else {
        // Default to YAML (handles .yaml and .yml)
        RulesConfig::from_yaml(&content).map_err(|e| format!("YAML parse error: {e}"))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Argument parsing
// ═══════════════════════════════════════════════════════════════════════════════

fn parse_attributes(args: &[String]) -> Result<ProvisioningAttributes, String> {
    let mut plan = None;
    let mut platform_region = String::new();
    let mut hyperscaler_region = String::new();
    let mut hyperscaler = None;

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = args
            .get(i + 1)
            .ok_or_else(|| format!("{flag} requires a value"))?
            .clone();
        match flag {
            "--plan" => plan = Some(value),
            "--platform-region" => platform_region = value,
            "--hyperscaler-region" => hyperscaler_region = value,
            "--hyperscaler" => hyperscaler = Some(value),
            other => return Err(format!("unexpected argument \"{other}\"")),
        }
        i += 2;
    }

    let plan = plan.ok_or("--plan is required")?;
    // The hyperscaler defaults to the plan name, the common case.
    let hyperscaler = hyperscaler.unwrap_or_else(|| plan.clone());

    Ok(ProvisioningAttributes {
        plan,
        platform_region,
        hyperscaler_region,
        hyperscaler,
    })
}

fn print_usage() {
    eprintln!(
        "Usage: hap <command> [options]

Commands:
  check <rules-file>                        Validate a rule configuration
  match <rules-file> --plan <plan>
        [--platform-region <region>]
        [--hyperscaler-region <region>]
        [--hyperscaler <hyperscaler>]       Resolve a request against the rules
  help                                      Show this help"
    );
}
