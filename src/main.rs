fn main() {
    if let Err(err) = trailmark_lib::run() {
        eprintln!("trailmark: {err:#}");
        std::process::exit(1);
    }
}
