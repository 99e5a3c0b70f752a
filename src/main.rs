#[cfg(target_arch = "wasm32")]
mod frontend;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use portfolio_site::config::PageConfig;

    // `portfolio-site <page-config.json>` prints the settings the page would run with.
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("This project runs in the browser. Run `trunk serve` or `trunk build --release`.");
        eprintln!("Pass a page-config JSON file to preview the resolved settings.");
        return;
    };

    match std::fs::read_to_string(&path) {
        Ok(raw) => println!("{}", PageConfig::from_json(Some(&raw)).to_json()),
        Err(error) => {
            eprintln!("failed to read {path}: {error}");
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    frontend::run();
}
