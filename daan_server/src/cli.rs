use std::{env, env::VarError};

/// The server takes no arguments. Passing any prints the help text and the current configuration, then exits.
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Secrets are deliberately left off this list
    const DISPLAY_ENVS: [&str; 10] = [
        "RUST_LOG",
        "DAAN_HOST",
        "DAAN_PORT",
        "DAAN_DATABASE_URL",
        "DAAN_RAZORPAY_API_URL",
        "DAAN_RAZORPAY_KEY_ID",
        "DAAN_RAZORPAY_WEBHOOK_CHECKS",
        "DAAN_GATEWAY_TIMEOUT_SECS",
        "DAAN_MIN_DONATION",
        "DAAN_MAX_DONATION",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
