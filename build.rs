use std::env;

fn main() {
    // Packagers may pin the reported version (e.g. "0.3.0-debian1")
    let version = env::var("ROUTE_UPDATER_VERSION")
        .or_else(|_| env::var("CARGO_PKG_VERSION"))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=ROUTE_UPDATER_VERSION={version}");

    println!("cargo:rerun-if-env-changed=ROUTE_UPDATER_VERSION");
    println!("cargo:rerun-if-changed=src/");
    println!("cargo:rerun-if-changed=Cargo.toml");
}
