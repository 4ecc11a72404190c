//! Startup banner

use super::config::is_all_interfaces;
use super::constants::APP_NAME;

/// Print the startup banner with the API address and storage paths
pub fn print_banner(
    host: &str,
    port: u16,
    data_dir: &str,
    uploads_dir: &str,
    require_grant_for_published: bool,
) {
    let display_host = if is_all_interfaces(host) {
        "localhost"
    } else {
        host
    };

    // Label width: "Published access:" is 17 chars, pad to 19 for alignment
    const W: usize = 19;

    println!();
    println!(
        "  \x1b[1m\x1b[36m{}\x1b[0m \x1b[90mv{}\x1b[0m",
        APP_NAME,
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!(
        "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m http://{}:{}/api",
        "API:", display_host, port
    );
    if host == "127.0.0.1" || host == "localhost" {
        println!(
            "  \x1b[90m➜  {:<W$} use --host 0.0.0.0 to expose\x1b[0m",
            "Network:"
        );
    }
    let access = if require_grant_for_published {
        "grant required"
    } else {
        "open to all schools"
    };
    println!(
        "  \x1b[33m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
        "Published access:", access
    );
    println!("  \x1b[90m➜  {:<W$} {}\x1b[0m", "Data:", data_dir);
    println!("  \x1b[90m➜  {:<W$} {}\x1b[0m", "Uploads:", uploads_dir);
    println!();
}
